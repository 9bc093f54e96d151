//! In-process spreadsheet backend.
//!
//! Behaves like the hosted store for everything this crate relies on: tabs,
//! a header row, append-after-last-row. Used by tests and for dry runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use mgadl_core::models::cell::CellValue;

use crate::backend::{
    AppendResponse, NEW_TAB_COLS, NEW_TAB_ROWS, Spreadsheet, SpreadsheetMeta, TabRef,
};
use crate::error::SheetsError;

#[derive(Debug, Clone)]
struct MemoryTab {
    title: String,
    capacity: (u32, u32),
    rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Clone)]
struct MemoryBook {
    title: String,
    tabs: Vec<MemoryTab>,
}

#[derive(Debug, Default)]
pub struct MemorySheets {
    books: Mutex<BTreeMap<String, MemoryBook>>,
    appends: Mutex<usize>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty spreadsheet under `spreadsheet_id`.
    pub fn with_spreadsheet(self, spreadsheet_id: &str, title: &str) -> Self {
        if let Ok(mut books) = self.books.lock() {
            books.insert(
                spreadsheet_id.to_string(),
                MemoryBook {
                    title: title.to_string(),
                    tabs: Vec::new(),
                },
            );
        }
        self
    }

    /// Seed a tab with raw rows (row 1 is the header).
    pub fn with_rows(self, spreadsheet_id: &str, tab: &str, rows: Vec<Vec<CellValue>>) -> Self {
        if let Ok(mut books) = self.books.lock()
            && let Some(book) = books.get_mut(spreadsheet_id)
        {
            book.tabs.retain(|t| t.title != tab);
            book.tabs.push(MemoryTab {
                title: tab.to_string(),
                capacity: (NEW_TAB_ROWS, NEW_TAB_COLS),
                rows,
            });
        }
        self
    }

    /// Every row of a tab, header included.
    pub fn rows(&self, spreadsheet_id: &str, tab: &str) -> Option<Vec<Vec<CellValue>>> {
        let books = self.books.lock().ok()?;
        books
            .get(spreadsheet_id)?
            .tabs
            .iter()
            .find(|t| t.title == tab)
            .map(|t| t.rows.clone())
    }

    /// Row and column capacity a tab was created with.
    pub fn capacity(&self, spreadsheet_id: &str, tab: &str) -> Option<(u32, u32)> {
        let books = self.books.lock().ok()?;
        books
            .get(spreadsheet_id)?
            .tabs
            .iter()
            .find(|t| t.title == tab)
            .map(|t| t.capacity)
    }

    /// Number of successful `append_row` calls so far.
    pub fn append_count(&self) -> usize {
        self.appends.lock().map(|n| *n).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, MemoryBook>>, SheetsError> {
        self.books
            .lock()
            .map_err(|_| SheetsError::Transport("memory backend lock poisoned".to_string()))
    }

    fn with_tab<T>(
        &self,
        tab: &TabRef,
        f: impl FnOnce(&mut MemoryTab) -> T,
    ) -> Result<T, SheetsError> {
        let mut books = self.lock()?;
        let book = books
            .get_mut(&tab.spreadsheet_id)
            .ok_or_else(|| SheetsError::NotFound {
                spreadsheet_id: tab.spreadsheet_id.clone(),
            })?;
        let found = book
            .tabs
            .iter_mut()
            .find(|t| t.title == tab.title)
            .ok_or_else(|| SheetsError::Remote {
                status: 400,
                message: format!("Unable to parse range: '{}'", tab.title),
            })?;
        Ok(f(found))
    }
}

impl Spreadsheet for MemorySheets {
    fn open_by_id(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, SheetsError> {
        let books = self.lock()?;
        let book = books
            .get(spreadsheet_id)
            .ok_or_else(|| SheetsError::NotFound {
                spreadsheet_id: spreadsheet_id.to_string(),
            })?;
        Ok(SpreadsheetMeta {
            spreadsheet_id: spreadsheet_id.to_string(),
            title: book.title.clone(),
            tab_titles: book.tabs.iter().map(|t| t.title.clone()).collect(),
        })
    }

    fn get_or_create_tab(
        &self,
        spreadsheet: &SpreadsheetMeta,
        name: &str,
    ) -> Result<TabRef, SheetsError> {
        let mut books = self.lock()?;
        let book = books
            .get_mut(&spreadsheet.spreadsheet_id)
            .ok_or_else(|| SheetsError::NotFound {
                spreadsheet_id: spreadsheet.spreadsheet_id.clone(),
            })?;

        if !book.tabs.iter().any(|t| t.title == name) {
            book.tabs.push(MemoryTab {
                title: name.to_string(),
                capacity: (NEW_TAB_ROWS, NEW_TAB_COLS),
                rows: Vec::new(),
            });
        }

        Ok(TabRef {
            spreadsheet_id: spreadsheet.spreadsheet_id.clone(),
            spreadsheet_title: book.title.clone(),
            title: name.to_string(),
        })
    }

    fn read_header_row(&self, tab: &TabRef) -> Result<Vec<String>, SheetsError> {
        self.with_tab(tab, |t| {
            t.rows
                .first()
                .map(|row| {
                    // Trailing blank cells are not part of the header.
                    let end = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
                    row[..end].iter().map(CellValue::to_string).collect()
                })
                .unwrap_or_default()
        })
    }

    fn write_header_row(&self, tab: &TabRef, columns: &[String]) -> Result<(), SheetsError> {
        self.with_tab(tab, |t| {
            let header: Vec<CellValue> =
                columns.iter().map(|c| CellValue::from(c.as_str())).collect();
            match t.rows.first_mut() {
                Some(first) => *first = header,
                None => t.rows.push(header),
            }
        })
    }

    fn append_row(
        &self,
        tab: &TabRef,
        values: &[CellValue],
    ) -> Result<AppendResponse, SheetsError> {
        let range = self.with_tab(tab, |t| {
            t.rows.push(values.to_vec());
            let row = t.rows.len();
            format!(
                "'{}'!A{row}:{}{row}",
                tab.title,
                column_letters(values.len().max(1))
            )
        })?;

        if let Ok(mut n) = self.appends.lock() {
            *n += 1;
        }

        Ok(AppendResponse {
            updated_range: Some(range),
        })
    }
}

/// 1-based column index to A1 letters (1 → A, 27 → AA).
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
