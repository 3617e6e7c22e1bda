//! Unified application error type.
//! The sheet backends, the work-log service and the web layer all return
//! `AppError` so failures travel up to the request handlers unchanged.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Remote spreadsheet
    // ---------------------------
    #[cfg(feature = "web")]
    #[error("Spreadsheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spreadsheet API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("Spreadsheet unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid cell address R{row}C{col}")]
    InvalidAddress { row: u32, col: u32 },

    // ---------------------------
    // Credentials
    // ---------------------------
    #[error("Credential error: {0}")]
    Credentials(String),

    #[cfg(feature = "web")]
    #[error("Token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Rendering
    // ---------------------------
    #[cfg(feature = "web")]
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[cfg(feature = "web")]
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(feature = "web")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        log::error!("request failed: {}", self);
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
            .into_response()
    }
}
