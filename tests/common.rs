#![allow(dead_code)]
#![cfg(feature = "web")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum_extra::extract::cookie::Key;
use chrono::NaiveDate;
use tower::ServiceExt;
use worklog::app::{AppState, Clock, router};
use worklog::{MemorySheet, WorkLog};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// First day the test sheets track
pub fn epoch() -> NaiveDate {
    ymd(2025, 8, 7)
}

/// What a handler sent back, with the body read out.
pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

pub struct TestApp {
    pub state: AppState<MemorySheet>,
}

impl TestApp {
    /// App over an in-memory sheet built from `rows`, frozen at `today`.
    pub fn new(rows: &[Vec<&'static str>], today: NaiveDate) -> Self {
        let sheet = MemorySheet::from_rows("Sheet1", rows);
        let state = AppState::new(
            WorkLog::new(sheet, epoch()),
            Key::generate(),
            Clock::Fixed(today),
        )
        .unwrap();
        TestApp { state }
    }

    /// The header row `Name, Email, 07-08-2025` with Alice and Bob below it.
    pub fn standard(today: NaiveDate) -> Self {
        Self::new(
            &[
                vec![],
                vec!["Name", "Email", "07-08-2025"],
                vec!["Alice", "alice@x.com", ""],
                vec!["Bob", "bob@x.com", ""],
            ],
            today,
        )
    }

    pub fn sheet(&self) -> &MemorySheet {
        self.state.worklog.store()
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response: Response = router(self.state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Reply {
            status,
            location,
            set_cookie,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    /// Log in and return the `Cookie` header value for later requests.
    pub async fn login(&self, email: &str) -> String {
        let reply = self
            .post_form("/", &format!("email={}", urlencoding::encode(email)), None)
            .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "login failed: {}", reply.body);
        assert_eq!(reply.location.as_deref(), Some("/worklog"));
        let set_cookie = reply.set_cookie.expect("login sets a session cookie");
        set_cookie.split(';').next().unwrap().to_string()
    }
}

/// Marker the work log template writes for each listed row.
pub fn row_marker(dmy: &str, locked: bool) -> String {
    format!(r#"data-date="{}" data-locked="{}""#, dmy, locked)
}
