//! Header row parsing.
//!
//! Row 2 of the sheet defines what every column below it means: the `name`
//! and `email` columns are found by their label, log columns by the calendar
//! date written in the header cell.

use chrono::NaiveDate;
use std::collections::HashSet;

/// Canonical date format used for display, lookups and new header cells.
pub const DMY_FORMAT: &str = "%d-%m-%Y";

/// Date formats accepted in header cells, tried in order.
const HEADER_DATE_FORMATS: [&str; 3] = ["%d-%m-%Y", "%d.%m.%Y", "%d/%m/%Y"];

/// One populated cell of the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    /// 0-based column position; add one for the sheet's 1-based addressing.
    pub col_index: usize,
    /// Cell text as stored in the sheet
    pub raw: String,
    /// Parsed date when the header is a log column
    pub date: Option<NaiveDate>,
    /// Trimmed, lowercased text used for name lookups
    pub lower: String,
}

impl HeaderColumn {
    pub fn new(col_index: usize, raw: &str) -> Self {
        HeaderColumn {
            col_index,
            raw: raw.to_string(),
            date: parse_header_date(raw),
            lower: raw.trim().to_lowercase(),
        }
    }

    /// 1-based column number as used by the sheet API.
    pub fn sheet_col(&self) -> u32 {
        self.col_index as u32 + 1
    }
}

/// Parse a header cell as a date.
///
/// Accepts `DD-MM-YYYY`, `DD.MM.YYYY` and `DD/MM/YYYY`. Blank or
/// unparseable text yields `None`.
///
/// # Examples
/// ```
/// use worklog::header::parse_header_date;
///
/// assert!(parse_header_date("07.08.2025").is_some());
/// assert!(parse_header_date("not-a-date").is_none());
/// ```
pub fn parse_header_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    HEADER_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Format a date as `DD-MM-YYYY`.
pub fn format_dmy(date: NaiveDate) -> String {
    date.format(DMY_FORMAT).to_string()
}

/// Strict `DD-MM-YYYY` parse, used for dates coming from URLs.
pub fn parse_dmy(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DMY_FORMAT).ok()
}

/// Parsed header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    columns: Vec<HeaderColumn>,
}

impl HeaderIndex {
    pub fn from_row<T: AsRef<str>>(values: &[T]) -> Self {
        let columns = values
            .iter()
            .enumerate()
            .map(|(i, raw)| HeaderColumn::new(i, raw.as_ref()))
            .collect();
        HeaderIndex { columns }
    }

    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    /// Number of header cells, including blank ones before the last populated cell.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns whose header parses as a date, left to right.
    pub fn date_columns(&self) -> impl Iterator<Item = &HeaderColumn> {
        self.columns.iter().filter(|h| h.date.is_some())
    }

    /// Dates already present, normalised to `DD-MM-YYYY`.
    pub fn dmy_set(&self) -> HashSet<String> {
        self.columns
            .iter()
            .filter_map(|h| h.date.map(format_dmy))
            .collect()
    }

    /// Leftmost column whose date formats back to exactly `target`.
    pub fn find_by_dmy(&self, target: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|h| h.date.map(format_dmy).as_deref() == Some(target))
            .map(|h| h.col_index)
    }

    /// Leftmost column whose trimmed, lowercased label equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.columns
            .iter()
            .find(|h| h.lower == name)
            .map(|h| h.col_index)
    }
}
