//! Email login and the signed session cookie.
//!
//! There are no passwords: an email that appears in the sheet's email column
//! identifies the employee. The session lives entirely in a cookie signed with
//! the server's key, so rotating the key (or restarting with a per-process
//! key) logs everyone out.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::sheet::SheetStore;
use crate::worklog::WorkLog;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "worklog_session";

/// Authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Lowercased login email
    pub email: String,
    /// Display name from the sheet's name column
    pub name: String,
}

impl Session {
    /// Session carried by the request, if its cookie is present and verifies.
    pub fn from_jar(jar: &SignedCookieJar) -> Option<Session> {
        let cookie = jar.get(SESSION_COOKIE)?;
        let json = urlencoding::decode(cookie.value()).ok()?;
        serde_json::from_str(&json).ok()
    }

    pub fn to_cookie(&self) -> AppResult<Cookie<'static>> {
        let json = serde_json::to_string(self)?;
        let mut cookie = Cookie::new(SESSION_COOKIE, urlencoding::encode(&json).into_owned());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        Ok(cookie)
    }
}

/// Reasons a login is refused, shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    /// Header row lacks a `name` or an `email` column
    MissingHeaders,
    EmailNotFound,
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::MissingHeaders => f.write_str("❌ Sheet missing NAME or EMAIL in row 2."),
            LoginError::EmailNotFound => f.write_str("❌ Email not found. Please try again."),
        }
    }
}

/// Look an email up in the sheet and build the session for it.
///
/// The outer `Result` carries sheet failures, the inner one refusals.
pub async fn resolve_user<S: SheetStore>(
    worklog: &WorkLog<S>,
    email: &str,
) -> AppResult<Result<Session, LoginError>> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Ok(Err(LoginError::EmailNotFound));
    }
    let headers = worklog.headers_info().await?;
    let (Some(name_col), Some(email_col)) =
        (headers.find_by_name("name"), headers.find_by_name("email"))
    else {
        return Ok(Err(LoginError::MissingHeaders));
    };

    let Some(row) = worklog.find_user_row_by_email(&email, email_col).await? else {
        return Ok(Err(LoginError::EmailNotFound));
    };

    let values = worklog.row_values(row).await?;
    let name = values.get(name_col).cloned().unwrap_or_default();
    Ok(Ok(Session { email, name }))
}

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
}

/// Serve the login page
pub async fn serve_login_page<S: SheetStore>(
    State(state): State<AppState<S>>,
) -> Result<Response, AppError> {
    Ok(state.pages.login(None)?.into_response())
}

/// Handle a login form submission.
///
/// Success stores the session and redirects to the work log; a refusal
/// re-renders the form with the reason.
pub async fn handle_login<S: SheetStore>(
    State(state): State<AppState<S>>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match resolve_user(&state.worklog, &form.email).await? {
        Ok(session) => {
            log::info!("login: {}", session.email);
            let jar = jar.add(session.to_cookie()?);
            Ok((jar, Redirect::to("/worklog")).into_response())
        }
        Err(refusal) => {
            log::warn!("login refused for '{}': {}", form.email.trim(), refusal);
            Ok(state.pages.login(Some(&refusal.to_string()))?.into_response())
        }
    }
}

/// Clear the session cookie and go back to the login page.
pub async fn handle_logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemorySheet;
    use axum_extra::extract::cookie::Key;
    use chrono::NaiveDate;

    fn worklog(rows: &[Vec<&'static str>]) -> WorkLog<MemorySheet> {
        WorkLog::new(
            MemorySheet::from_rows("Sheet1", rows),
            NaiveDate::from_ymd_opt(2025, 8, 7).unwrap(),
        )
    }

    #[test]
    fn session_survives_signed_cookie() {
        let session = Session {
            email: "alice@x.com".to_string(),
            name: "Alice; O'Brien, \"Al\"".to_string(),
        };
        let jar = SignedCookieJar::new(Key::generate()).add(session.to_cookie().unwrap());
        assert_eq!(Session::from_jar(&jar), Some(session));
    }

    #[test]
    fn refusal_messages() {
        assert_eq!(
            LoginError::MissingHeaders.to_string(),
            "❌ Sheet missing NAME or EMAIL in row 2."
        );
        assert_eq!(
            LoginError::EmailNotFound.to_string(),
            "❌ Email not found. Please try again."
        );
    }

    #[tokio::test]
    async fn resolves_known_email() {
        let log = worklog(&[
            vec![],
            vec!["Name", "Email"],
            vec!["Alice", "Alice@X.com"],
        ]);
        let session = resolve_user(&log, "  ALICE@x.com ").await.unwrap().unwrap();
        assert_eq!(session.email, "alice@x.com");
        assert_eq!(session.name, "Alice");
    }

    #[tokio::test]
    async fn refuses_unknown_email_and_bad_headers() {
        let log = worklog(&[vec![], vec!["Name", "Email"], vec!["Alice", "alice@x.com"]]);
        assert_eq!(
            resolve_user(&log, "eve@x.com").await.unwrap(),
            Err(LoginError::EmailNotFound)
        );

        let log = worklog(&[vec![], vec!["Name", "Email"], vec!["Carol", "", "notes"]]);
        for blank in ["", "   "] {
            assert_eq!(
                resolve_user(&log, blank).await.unwrap(),
                Err(LoginError::EmailNotFound)
            );
        }

        let log = worklog(&[vec![], vec!["Email"], vec!["alice@x.com"]]);
        assert_eq!(
            resolve_user(&log, "alice@x.com").await.unwrap(),
            Err(LoginError::MissingHeaders)
        );
    }
}
