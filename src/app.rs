use axum::{
    Form, Router,
    extract::{FromRef, Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::header::parse_dmy;
use crate::login::{self, Session};
use crate::pages::{Pages, WorklogView};
use crate::sheet::{GoogleSheet, SheetStore};
use crate::worklog::{EntryCell, WorkLog};

/// Source of "today" for the date window and future-date checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Local calendar date of the server
    System,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

/// Shared state handed to every request handler.
pub struct AppState<S> {
    pub worklog: Arc<WorkLog<S>>,
    pub pages: Arc<Pages>,
    pub key: Key,
    pub clock: Clock,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            worklog: Arc::clone(&self.worklog),
            pages: Arc::clone(&self.pages),
            key: self.key.clone(),
            clock: self.clock,
        }
    }
}

impl<S> FromRef<AppState<S>> for Key {
    fn from_ref(state: &AppState<S>) -> Key {
        state.key.clone()
    }
}

impl<S: SheetStore> AppState<S> {
    pub fn new(worklog: WorkLog<S>, key: Key, clock: Clock) -> AppResult<Self> {
        Ok(AppState {
            worklog: Arc::new(worklog),
            pages: Arc::new(Pages::new()?),
            key,
            clock,
        })
    }
}

/// Cookie signing key: derived from the configured secret, or random for
/// this process only.
pub fn session_key(config: &Config) -> Key {
    match &config.session_secret {
        Some(secret) => Key::derive_from(secret.as_bytes()),
        None => {
            log::info!("no SESSION_SECRET set; sessions will not survive a restart");
            Key::generate()
        }
    }
}

pub fn router<S: SheetStore>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/",
            get(login::serve_login_page::<S>).post(login::handle_login::<S>),
        )
        .route("/worklog", get(serve_worklog::<S>))
        .route("/edit/:dmy", get(serve_edit::<S>).post(handle_edit::<S>))
        .route("/logout", get(login::handle_logout))
        .route("/healthz", get(healthz::<S>))
        .with_state(state)
}

/// Connect to the configured spreadsheet and serve until shutdown.
pub async fn run(config: Config) -> AppResult<()> {
    let sheet = GoogleSheet::connect(&config).await?;
    let worklog = WorkLog::new(sheet, config.first_log_date);
    let state = AppState::new(worklog, session_key(&config), Clock::System)?;

    let listener = TcpListener::bind(config.bind_addr()).await?;
    log::info!("Listening on http://{}", config.bind_addr());
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Work log page: provision today's column, auto-fill labels, then list the
/// user's recent entries with their lock state.
async fn serve_worklog<S: SheetStore>(
    State(state): State<AppState<S>>,
    jar: SignedCookieJar,
) -> Result<Response, AppError> {
    let Some(session) = Session::from_jar(&jar) else {
        return Ok(Redirect::to("/").into_response());
    };
    let today = state.clock.today();
    let worklog = &state.worklog;

    worklog.ensure_date_columns_up_to_today(today).await?;
    worklog.auto_fill_leave_sunday().await?;

    let headers = worklog.headers_info().await?;
    let Some(email_col) = headers.find_by_name("email") else {
        let view = WorklogView::failure(
            &session.name,
            &session.email,
            "❌ Sheet missing EMAIL column",
        );
        return Ok(state.pages.worklog(&view)?.into_response());
    };
    let Some(row) = worklog.find_user_row_by_email(&session.email, email_col).await? else {
        let view =
            WorklogView::failure(&session.name, &session.email, "❌ User row not found");
        return Ok(state.pages.worklog(&view)?.into_response());
    };

    let entries = worklog.recent_entries(row, today).await?;
    let view = WorklogView::new(&session.name, &session.email, &entries);
    Ok(state.pages.worklog(&view)?.into_response())
}

/// Resolve the cell behind `/edit/<dmy>`. `None` sends the user back to the
/// work log: bad or future date, missing email column, unknown user.
async fn edit_target<S: SheetStore>(
    state: &AppState<S>,
    session: &Session,
    dmy: &str,
) -> AppResult<Option<EntryCell>> {
    let Some(date) = parse_dmy(dmy) else {
        return Ok(None);
    };
    if date > state.clock.today() {
        return Ok(None);
    }
    state.worklog.locate_entry(&session.email, date).await
}

async fn serve_edit<S: SheetStore>(
    State(state): State<AppState<S>>,
    jar: SignedCookieJar,
    AxumPath(dmy): AxumPath<String>,
) -> Result<Response, AppError> {
    let Some(session) = Session::from_jar(&jar) else {
        return Ok(Redirect::to("/").into_response());
    };
    let Some(cell) = edit_target(&state, &session, &dmy).await? else {
        return Ok(Redirect::to("/worklog").into_response());
    };
    Ok(state.pages.edit(&cell.entry)?.into_response())
}

/// Edit form fields
#[derive(Debug, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub log: String,
}

async fn handle_edit<S: SheetStore>(
    State(state): State<AppState<S>>,
    jar: SignedCookieJar,
    AxumPath(dmy): AxumPath<String>,
    Form(form): Form<EditForm>,
) -> Result<Response, AppError> {
    let Some(session) = Session::from_jar(&jar) else {
        return Ok(Redirect::to("/").into_response());
    };
    let Some(cell) = edit_target(&state, &session, &dmy).await? else {
        return Ok(Redirect::to("/worklog").into_response());
    };

    if cell.entry.locked {
        log::warn!(
            "rejected edit of locked cell {} for {} ({})",
            cell.entry.dmy(),
            session.email,
            cell.entry.lock_reason
        );
        return Ok(state.pages.edit(&cell.entry)?.into_response());
    }

    state.worklog.save_entry(&cell, &form.log).await?;
    log::info!("saved log {} for {}", cell.entry.dmy(), session.email);
    Ok(Redirect::to("/worklog").into_response())
}

/// Reachability probe for the spreadsheet.
async fn healthz<S: SheetStore>(State(state): State<AppState<S>>) -> Response {
    match state.worklog.store().title().await {
        Ok(_) => (StatusCode::OK, "ok").into_response(),
        Err(e) => {
            log::warn!("health check failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("error: {}", e)).into_response()
        }
    }
}
