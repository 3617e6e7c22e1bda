//! HTML pages.
//!
//! Templates live in `src/static/` and are compiled into the binary.
//! Handlebars escapes every interpolated value.

use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::AppResult;
use crate::worklog::WorkLogEntry;

const LOGIN: &str = "login";
const WORKLOG: &str = "worklog";
const EDIT: &str = "edit";

/// One table row of the work log page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogRow {
    pub dmy: String,
    pub text: String,
    pub locked: bool,
    pub reason: &'static str,
    /// Caption of the disabled button on locked rows
    pub label: String,
    /// Locked rows without text show the reason inline
    pub show_reason: bool,
}

impl From<&WorkLogEntry> for LogRow {
    fn from(entry: &WorkLogEntry) -> Self {
        let reason = entry.lock_reason.as_str();
        let label = if entry.text.is_empty() {
            reason.to_string()
        } else {
            entry.text.clone()
        };
        LogRow {
            dmy: entry.dmy(),
            text: entry.text.clone(),
            locked: entry.locked,
            reason,
            label,
            show_reason: entry.locked && entry.text.is_empty(),
        }
    }
}

/// Data for the work log page.
#[derive(Debug, Clone, Serialize)]
pub struct WorklogView {
    pub name: String,
    pub email: String,
    pub flash_msg: Option<String>,
    pub flash_type: &'static str,
    pub logs: Vec<LogRow>,
}

impl WorklogView {
    pub fn new(name: &str, email: &str, entries: &[WorkLogEntry]) -> Self {
        WorklogView {
            name: name.to_string(),
            email: email.to_string(),
            flash_msg: None,
            flash_type: "success",
            logs: entries.iter().map(LogRow::from).collect(),
        }
    }

    /// Page with no rows and an error banner.
    pub fn failure(name: &str, email: &str, message: &str) -> Self {
        WorklogView {
            flash_msg: Some(message.to_string()),
            flash_type: "danger",
            ..WorklogView::new(name, email, &[])
        }
    }
}

#[derive(Serialize)]
struct LoginView<'a> {
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct EditView<'a> {
    dmy: String,
    log_text: &'a str,
    is_locked: bool,
    lock_reason: &'static str,
}

/// Compiled page templates.
#[derive(Debug)]
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_template_string(LOGIN, include_str!("./static/login.hbs"))?;
        registry.register_template_string(WORKLOG, include_str!("./static/worklog.hbs"))?;
        registry.register_template_string(EDIT, include_str!("./static/edit.hbs"))?;
        Ok(Pages { registry })
    }

    pub fn login(&self, error: Option<&str>) -> AppResult<Html<String>> {
        Ok(Html(self.registry.render(LOGIN, &LoginView { error })?))
    }

    pub fn worklog(&self, view: &WorklogView) -> AppResult<Html<String>> {
        Ok(Html(self.registry.render(WORKLOG, view)?))
    }

    pub fn edit(&self, entry: &WorkLogEntry) -> AppResult<Html<String>> {
        let view = EditView {
            dmy: entry.dmy(),
            log_text: &entry.text,
            is_locked: entry.locked,
            lock_reason: entry.lock_reason.as_str(),
        };
        Ok(Html(self.registry.render(EDIT, &view)?))
    }
}
