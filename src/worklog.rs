//! Work-log operations on top of a [`SheetStore`].
//!
//! Sheet layout: row 1 is left alone, row 2 is the header row (`name`,
//! `email`, then one column per calendar day), rows 3 and below hold one
//! employee each. Nothing is cached between calls; every operation reads the
//! sheet fresh.

use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

use crate::error::AppResult;
use crate::header::{HeaderIndex, format_dmy};
use crate::lock::{
    LEAVE_LABEL, LockReason, LockStatus, SUNDAY_LABEL, is_leave, is_owner_red, is_sunday,
};
use crate::sheet::{CellStyle, SheetStore, TextColor};

/// Row holding the column headers.
pub const HEADER_ROW: u32 = 2;
/// First employee row.
pub const FIRST_DATA_ROW: u32 = 3;
/// Font applied to every cell the app writes.
pub const LOG_FONT: &str = "Times New Roman";
/// How many days, ending today, the work log page lists.
pub const RECENT_DAYS: i64 = 5;

/// One day of an employee's log, computed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLogEntry {
    pub date: NaiveDate,
    pub text: String,
    pub locked: bool,
    pub lock_reason: LockReason,
}

impl WorkLogEntry {
    pub fn new(date: NaiveDate, text: String, red: bool) -> Self {
        let status = LockStatus::evaluate(&text, date, red);
        WorkLogEntry {
            date,
            text,
            locked: status.locked,
            lock_reason: status.reason,
        }
    }

    pub fn dmy(&self) -> String {
        format_dmy(self.date)
    }
}

/// A log cell resolved for editing: where it lives and what it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCell {
    /// 1-based sheet row of the employee
    pub row: u32,
    /// 0-based header column of the date
    pub col_index: usize,
    pub entry: WorkLogEntry,
}

impl EntryCell {
    pub fn sheet_col(&self) -> u32 {
        self.col_index as u32 + 1
    }
}

/// The work log, bound to one sheet.
#[derive(Debug)]
pub struct WorkLog<S> {
    store: S,
    first_log_date: NaiveDate,
}

impl<S: SheetStore> WorkLog<S> {
    pub fn new(store: S, first_log_date: NaiveDate) -> Self {
        WorkLog {
            store,
            first_log_date,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn first_log_date(&self) -> NaiveDate {
        self.first_log_date
    }

    // ---------------------------
    // Header index
    // ---------------------------

    pub async fn headers_raw(&self) -> AppResult<Vec<String>> {
        self.store.row_values(HEADER_ROW).await
    }

    pub async fn headers_info(&self) -> AppResult<HeaderIndex> {
        Ok(HeaderIndex::from_row(&self.headers_raw().await?))
    }

    pub async fn find_header_col_by_dmy(&self, target: &str) -> AppResult<Option<usize>> {
        Ok(self.headers_info().await?.find_by_dmy(target))
    }

    pub async fn find_header_index_by_name(&self, name: &str) -> AppResult<Option<usize>> {
        Ok(self.headers_info().await?.find_by_name(name))
    }

    // ---------------------------
    // Row resolver
    // ---------------------------

    /// First data row whose email cell matches case-insensitively.
    pub async fn find_user_row_by_email(
        &self,
        email: &str,
        email_col: usize,
    ) -> AppResult<Option<u32>> {
        let rows = self.store.all_values().await?;
        Ok(user_row_in(&rows, email, email_col))
    }

    pub async fn row_values(&self, row: u32) -> AppResult<Vec<String>> {
        self.store.row_values(row).await
    }

    // ---------------------------
    // Date column provisioning
    // ---------------------------

    /// Append a header for every day from the first log date through `today`
    /// that has no column yet. Returns how many columns were added.
    pub async fn ensure_date_columns_up_to_today(&self, today: NaiveDate) -> AppResult<usize> {
        let headers = self.headers_info().await?;
        let mut existing = headers.dmy_set();
        let mut next_col = headers.len() as u32 + 1;
        let mut added = 0;

        let mut day = self.first_log_date;
        while day <= today {
            let dmy = format_dmy(day);
            if !existing.contains(&dmy) {
                self.store.update_cell(HEADER_ROW, next_col, &dmy).await?;
                log::info!("added date column {} at column {}", dmy, next_col);
                existing.insert(dmy);
                next_col += 1;
                added += 1;
            }
            day += Duration::days(1);
        }

        Ok(added)
    }

    // ---------------------------
    // Cell formatting
    // ---------------------------

    /// Write log text with the standard font, in red when `red` is set.
    pub async fn format_cell(&self, row: u32, col: u32, text: &str, red: bool) -> AppResult<()> {
        let style = CellStyle {
            font_family: Some(LOG_FONT.to_string()),
            foreground: red.then_some(TextColor::RED),
        };
        self.store.write_cell(row, col, text, &style).await
    }

    // ---------------------------
    // Auto-fill
    // ---------------------------

    /// Normalise leave cells to `Leave` and label blank Sunday cells `Sunday`
    /// (in red) across every employee row. Returns the number of writes.
    pub async fn auto_fill_leave_sunday(&self) -> AppResult<usize> {
        let headers = self.headers_info().await?;
        if headers.find_by_name("email").is_none() {
            return Ok(0);
        }

        let rows = self.store.all_values().await?;
        let mut writes = 0;
        for (offset, values) in rows.iter().enumerate().skip(FIRST_DATA_ROW as usize - 1) {
            let row = offset as u32 + 1;
            for header in headers.date_columns() {
                let Some(date) = header.date else { continue };
                let current = values
                    .get(header.col_index)
                    .map(String::as_str)
                    .unwrap_or("");

                if is_leave(current) {
                    self.format_cell(row, header.sheet_col(), LEAVE_LABEL, false)
                        .await?;
                    writes += 1;
                } else if is_sunday(date) && current.trim().is_empty() {
                    self.format_cell(row, header.sheet_col(), SUNDAY_LABEL, true)
                        .await?;
                    log::debug!("labelled Sunday {} for row {}", format_dmy(date), row);
                    writes += 1;
                }
            }
        }

        Ok(writes)
    }

    // ---------------------------
    // Red-lock detection
    // ---------------------------

    /// 1-based `(row, col)` of every cell whose effective text colour is owner red.
    pub async fn get_red_marked_cells(&self) -> AppResult<HashSet<(u32, u32)>> {
        let colors = self.store.text_colors().await?;
        let mut red = HashSet::new();
        for (r, row) in colors.iter().enumerate() {
            for (c, color) in row.iter().enumerate() {
                if color.as_ref().is_some_and(is_owner_red) {
                    red.insert((r as u32 + 1, c as u32 + 1));
                }
            }
        }
        Ok(red)
    }

    // ---------------------------
    // Views
    // ---------------------------

    /// Log entries of one employee row for the last [`RECENT_DAYS`] days,
    /// never before the first log date, oldest first.
    pub async fn recent_entries(&self, row: u32, today: NaiveDate) -> AppResult<Vec<WorkLogEntry>> {
        let headers = self.headers_info().await?;
        let values = self.store.row_values(row).await?;
        let red_cells = self.get_red_marked_cells().await?;
        let window_start = today - Duration::days(RECENT_DAYS - 1);

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for header in headers.date_columns() {
            let Some(date) = header.date else { continue };
            if date < self.first_log_date || date > today || date < window_start {
                continue;
            }
            if !seen.insert(date) {
                continue;
            }
            let text = values.get(header.col_index).cloned().unwrap_or_default();
            let red = red_cells.contains(&(row, header.sheet_col()));
            entries.push(WorkLogEntry::new(date, text, red));
        }

        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    /// Resolve the log cell of `email` for `date`, adding the date column when
    /// the header row lacks it. `None` when the sheet has no email column or
    /// the employee is unknown.
    pub async fn locate_entry(&self, email: &str, date: NaiveDate) -> AppResult<Option<EntryCell>> {
        let dmy = format_dmy(date);
        let mut headers = self.headers_info().await?;
        if headers.find_by_dmy(&dmy).is_none() {
            self.store
                .update_cell(HEADER_ROW, headers.len() as u32 + 1, &dmy)
                .await?;
            log::info!("added date column {} for edit", dmy);
            headers = self.headers_info().await?;
        }

        let Some(col_index) = headers.find_by_dmy(&dmy) else {
            return Ok(None);
        };
        let Some(email_col) = headers.find_by_name("email") else {
            return Ok(None);
        };
        let Some(row) = self.find_user_row_by_email(email, email_col).await? else {
            return Ok(None);
        };

        let values = self.store.row_values(row).await?;
        let text = values.get(col_index).cloned().unwrap_or_default();
        let red = self
            .get_red_marked_cells()
            .await?
            .contains(&(row, col_index as u32 + 1));

        Ok(Some(EntryCell {
            row,
            col_index,
            entry: WorkLogEntry::new(date, text, red),
        }))
    }

    /// Store new text for an unlocked cell. The text is trimmed and written
    /// in the standard, non-red style.
    pub async fn save_entry(&self, cell: &EntryCell, text: &str) -> AppResult<()> {
        self.format_cell(cell.row, cell.sheet_col(), text.trim(), false)
            .await
    }
}

/// Scan data rows (sheet row 3 onwards) for a case-insensitive email match.
/// A blank email never matches, and neither do blank email cells.
pub fn user_row_in(rows: &[Vec<String>], email: &str, email_col: usize) -> Option<u32> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return None;
    }
    rows.iter()
        .enumerate()
        .skip(FIRST_DATA_ROW as usize - 1)
        .find(|(_, row)| {
            row.get(email_col)
                .is_some_and(|cell| cell.trim().to_lowercase() == email)
        })
        .map(|(i, _)| i as u32 + 1)
}
