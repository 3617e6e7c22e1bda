use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{CellStyle, SheetStore, TextColor};
use crate::error::{AppError, AppResult};

/// One cell of a [`MemorySheet`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryCell {
    pub text: String,
    pub style: CellStyle,
}

/// In-process sheet backed by a growable grid.
///
/// Used by the test suite and for running the app without Google
/// credentials. Owners lock cells here with [`MemorySheet::set_text_color`].
#[derive(Debug)]
pub struct MemorySheet {
    title: String,
    grid: RwLock<Vec<Vec<MemoryCell>>>,
    offline: AtomicBool,
}

impl MemorySheet {
    pub fn new(title: &str) -> Self {
        MemorySheet {
            title: title.to_string(),
            grid: RwLock::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Build a sheet from row-major text, starting at row 1.
    pub fn from_rows<R: AsRef<[&'static str]>>(title: &str, rows: &[R]) -> Self {
        let sheet = MemorySheet::new(title);
        {
            let mut grid = sheet.grid.write().unwrap_or_else(|e| e.into_inner());
            for row in rows {
                grid.push(
                    row.as_ref()
                        .iter()
                        .map(|text| MemoryCell {
                            text: text.to_string(),
                            style: CellStyle::default(),
                        })
                        .collect(),
                );
            }
        }
        sheet
    }

    /// Simulate an unreachable sheet: every call fails while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Change only the text colour of a cell.
    pub fn set_text_color(&self, row: u32, col: u32, color: Option<TextColor>) -> AppResult<()> {
        self.with_cell_mut(row, col, |cell| cell.style.foreground = color)
    }

    /// Snapshot of one cell; cells outside the grid read as blank.
    pub fn cell(&self, row: u32, col: u32) -> MemoryCell {
        let grid = self.grid.read().unwrap_or_else(|e| e.into_inner());
        grid.get((row as usize).wrapping_sub(1))
            .and_then(|r| r.get((col as usize).wrapping_sub(1)))
            .cloned()
            .unwrap_or_default()
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable(format!(
                "sheet '{}' is offline",
                self.title
            )));
        }
        Ok(())
    }

    fn with_cell_mut<F>(&self, row: u32, col: u32, f: F) -> AppResult<()>
    where
        F: FnOnce(&mut MemoryCell),
    {
        if row == 0 || col == 0 {
            return Err(AppError::InvalidAddress { row, col });
        }
        let (r, c) = (row as usize - 1, col as usize - 1);
        let mut grid = self.grid.write().unwrap_or_else(|e| e.into_inner());
        if grid.len() <= r {
            grid.resize_with(r + 1, Vec::new);
        }
        let cells = &mut grid[r];
        if cells.len() <= c {
            cells.resize_with(c + 1, MemoryCell::default);
        }
        f(&mut cells[c]);
        Ok(())
    }
}

fn trimmed_texts(row: &[MemoryCell]) -> Vec<String> {
    let end = row
        .iter()
        .rposition(|cell| !cell.text.is_empty())
        .map_or(0, |i| i + 1);
    row[..end].iter().map(|cell| cell.text.clone()).collect()
}

impl SheetStore for MemorySheet {
    async fn row_values(&self, row: u32) -> AppResult<Vec<String>> {
        self.check_online()?;
        if row == 0 {
            return Err(AppError::InvalidAddress { row, col: 1 });
        }
        let grid = self.grid.read().unwrap_or_else(|e| e.into_inner());
        Ok(grid
            .get(row as usize - 1)
            .map(|r| trimmed_texts(r))
            .unwrap_or_default())
    }

    async fn all_values(&self) -> AppResult<Vec<Vec<String>>> {
        self.check_online()?;
        let grid = self.grid.read().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<Vec<String>> = grid.iter().map(|r| trimmed_texts(r)).collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn update_cell(&self, row: u32, col: u32, text: &str) -> AppResult<()> {
        self.check_online()?;
        self.with_cell_mut(row, col, |cell| cell.text = text.to_string())
    }

    async fn write_cell(&self, row: u32, col: u32, text: &str, style: &CellStyle) -> AppResult<()> {
        self.check_online()?;
        self.with_cell_mut(row, col, |cell| {
            cell.text = text.to_string();
            cell.style = style.clone();
        })
    }

    async fn text_colors(&self) -> AppResult<Vec<Vec<Option<TextColor>>>> {
        self.check_online()?;
        let grid = self.grid.read().unwrap_or_else(|e| e.into_inner());
        Ok(grid
            .iter()
            .map(|r| r.iter().map(|cell| cell.style.foreground).collect())
            .collect())
    }

    async fn title(&self) -> AppResult<String> {
        self.check_online()?;
        Ok(self.title.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_trim_trailing_blanks() {
        let sheet = MemorySheet::from_rows("log", &[["", "", ""], ["Name", "Email", ""]]);
        assert_eq!(sheet.row_values(1).await.unwrap(), Vec::<String>::new());
        assert_eq!(sheet.row_values(2).await.unwrap(), vec!["Name", "Email"]);
        assert_eq!(sheet.row_values(9).await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn writes_grow_the_grid() {
        let sheet = MemorySheet::new("log");
        sheet.update_cell(3, 4, "hello").await.unwrap();
        let rows = sheet.all_values().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec!["", "", "", "hello"]);
    }

    #[tokio::test]
    async fn styled_write_replaces_format() {
        let sheet = MemorySheet::new("log");
        let red = CellStyle {
            font_family: Some("Times New Roman".to_string()),
            foreground: Some(TextColor::RED),
        };
        sheet.write_cell(1, 1, "Sunday", &red).await.unwrap();
        assert_eq!(sheet.cell(1, 1).style, red);

        sheet
            .write_cell(1, 1, "Leave", &CellStyle::default())
            .await
            .unwrap();
        assert_eq!(sheet.cell(1, 1).style.foreground, None);

        // Plain updates keep the colour
        sheet.set_text_color(1, 1, Some(TextColor::RED)).unwrap();
        sheet.update_cell(1, 1, "x").await.unwrap();
        let colors = sheet.text_colors().await.unwrap();
        assert_eq!(colors[0][0], Some(TextColor::RED));
    }

    #[tokio::test]
    async fn zero_address_is_rejected() {
        let sheet = MemorySheet::new("log");
        assert!(matches!(
            sheet.update_cell(0, 1, "x").await,
            Err(AppError::InvalidAddress { row: 0, col: 1 })
        ));
    }

    #[tokio::test]
    async fn offline_sheet_fails() {
        let sheet = MemorySheet::new("log");
        sheet.set_offline(true);
        assert!(sheet.title().await.is_err());
        sheet.set_offline(false);
        assert_eq!(sheet.title().await.unwrap(), "log");
    }
}
