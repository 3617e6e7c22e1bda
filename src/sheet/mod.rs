//! Spreadsheet access.
//!
//! The work log treats the spreadsheet as an external tabular store. Every
//! backend exposes the same small surface: 1-based cell addressing, text
//! reads and writes, styled writes, and a whole-sheet read of effective
//! text colours.

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::AppResult;

pub mod memory;

#[cfg(feature = "web")]
pub mod auth;
#[cfg(feature = "web")]
pub mod google;

pub use memory::MemorySheet;

#[cfg(feature = "web")]
pub use google::GoogleSheet;

/// Foreground text colour in 0..1 channel units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextColor {
    #[serde(default)]
    pub red: f32,
    #[serde(default)]
    pub green: f32,
    #[serde(default)]
    pub blue: f32,
}

impl TextColor {
    pub const RED: TextColor = TextColor {
        red: 1.0,
        green: 0.0,
        blue: 0.0,
    };

    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        TextColor { red, green, blue }
    }
}

/// Text format applied together with a cell value.
///
/// A `None` field clears that part of the format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellStyle {
    pub font_family: Option<String>,
    pub foreground: Option<TextColor>,
}

/// Tabular store backing the work log.
///
/// Rows and columns are 1-based. Reads return rows with trailing blank
/// cells trimmed, the way the Sheets values API does.
pub trait SheetStore: Send + Sync + 'static {
    /// All values of one row.
    fn row_values(&self, row: u32) -> impl Future<Output = AppResult<Vec<String>>> + Send;

    /// Every row of the sheet, top to bottom.
    fn all_values(&self) -> impl Future<Output = AppResult<Vec<Vec<String>>>> + Send;

    /// Write plain text, leaving the cell's format untouched.
    fn update_cell(
        &self,
        row: u32,
        col: u32,
        text: &str,
    ) -> impl Future<Output = AppResult<()>> + Send;

    /// Write text and text format as one atomic update.
    fn write_cell(
        &self,
        row: u32,
        col: u32,
        text: &str,
        style: &CellStyle,
    ) -> impl Future<Output = AppResult<()>> + Send;

    /// Effective foreground colour of every cell, indexed `[row - 1][col - 1]`.
    fn text_colors(&self) -> impl Future<Output = AppResult<Vec<Vec<Option<TextColor>>>>> + Send;

    /// Worksheet title; doubles as a reachability probe.
    fn title(&self) -> impl Future<Output = AppResult<String>> + Send;
}

/// Convert a 1-based column number to its letter name (1 = A, 27 = AA).
///
/// # Examples
/// ```
/// use worklog::sheet::column_letter;
///
/// assert_eq!(column_letter(1), "A");
/// assert_eq!(column_letter(26), "Z");
/// assert_eq!(column_letter(27), "AA");
/// assert_eq!(column_letter(52), "AZ");
/// ```
pub fn column_letter(col: u32) -> String {
    let mut col = col;
    let mut result = String::new();
    while col > 0 {
        col -= 1;
        result.push(((col % 26) as u8 + b'A') as char);
        col /= 26;
    }
    result.chars().rev().collect()
}

/// A1 name of a 1-based cell address.
pub fn a1(row: u32, col: u32) -> String {
    format!("{}{}", column_letter(col), row)
}
