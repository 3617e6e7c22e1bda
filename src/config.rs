use chrono::NaiveDate;
use lazy_static::lazy_static;
use std::env;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::header::{DMY_FORMAT, parse_dmy};

pub const DEFAULT_SPREADSHEET_NAME: &str = "Employee_worklog";
pub const DEFAULT_CREDENTIALS_FILE: &str = "service_account.json";
pub const DEFAULT_FIRST_LOG_DMY: &str = "07-08-2025";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
/// Minimum length of a persistent session secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Runtime settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Open the spreadsheet by id when set, otherwise by `spreadsheet_name`
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_name: String,
    /// Path of the service-account key file
    pub credentials_file: PathBuf,
    pub host: String,
    pub port: u16,
    /// Persistent cookie-signing secret; `None` means a fresh key per process
    pub session_secret: Option<String>,
    /// First date that gets a log column
    pub first_log_date: NaiveDate,
}

lazy_static! {
    static ref FIRST_LOG_DATE: NaiveDate =
        NaiveDate::parse_from_str(DEFAULT_FIRST_LOG_DMY, DMY_FORMAT)
            .expect("valid default first log date");
}

impl Default for Config {
    fn default() -> Self {
        Config {
            spreadsheet_id: None,
            spreadsheet_name: DEFAULT_SPREADSHEET_NAME.to_string(),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session_secret: None,
            first_log_date: *FIRST_LOG_DATE,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        config.spreadsheet_id = get("SPREADSHEET_ID");
        if let Some(name) = get("SPREADSHEET_NAME") {
            config.spreadsheet_name = name;
        }
        if let Some(path) = get("SERVICE_ACCOUNT_FILE") {
            config.credentials_file = PathBuf::from(path);
        }
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("invalid PORT: {}", port)))?;
        }
        if let Some(secret) = get("SESSION_SECRET") {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(AppError::Config(format!(
                    "SESSION_SECRET must be at least {} bytes",
                    MIN_SESSION_SECRET_LEN
                )));
            }
            config.session_secret = Some(secret);
        }
        if let Some(dmy) = get("FIRST_LOG_DATE") {
            config.first_log_date = parse_dmy(&dmy).ok_or_else(|| {
                AppError::Config(format!("invalid FIRST_LOG_DATE (want DD-MM-YYYY): {}", dmy))
            })?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
