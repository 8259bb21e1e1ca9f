use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use chrono::NaiveDate;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

use crate::session;

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod grades;
pub mod reports;
pub mod students;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub key: Key,
    pub report_font: Arc<PathBuf>,
}

impl AppState {
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock means a handler panicked mid-request; the
        // connection itself is still usable.
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/register", get(auth::register_page).post(auth::register_submit))
        .route("/logout", get(auth::logout))
        .route("/classes", get(classes::class_list))
        .route("/class/add", get(classes::add_class_page).post(classes::add_class_submit))
        .route("/class/{id}", get(classes::class_detail))
        .route(
            "/student/add",
            get(students::add_student_page).post(students::add_student_submit),
        )
        .route("/student/delete/{id}", post(students::delete_student))
        .route("/attendance", get(attendance::page).post(attendance::submit))
        .route("/grades", get(grades::page).post(grades::submit))
        .route("/reports", get(reports::page).post(reports::submit))
        .route("/forecast", get(reports::forecast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Submitted form fields in document order; checkbox-style forms carry
/// dynamic field names, so the raw pair list is kept.
pub struct FormMap(Vec<(String, String)>);

impl FormMap {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }
}

pub(crate) enum SelectionError {
    Missing,
    Invalid(String),
}

/// Reads the class/subject/date selection shared by the attendance and
/// grades forms. Empty or absent fields are a validation miss; present but
/// unparseable ones surface as a generic failure.
pub(crate) fn parse_selection(form: &FormMap) -> Result<(i64, i64, NaiveDate), SelectionError> {
    let class_id = non_empty(form, "class_id").ok_or(SelectionError::Missing)?;
    let subject_id = non_empty(form, "subject_id").ok_or(SelectionError::Missing)?;
    let date = non_empty(form, "date").ok_or(SelectionError::Missing)?;

    let class_id = class_id
        .parse::<i64>()
        .map_err(|_| SelectionError::Invalid(format!("неверный класс: {}", class_id)))?;
    let subject_id = subject_id
        .parse::<i64>()
        .map_err(|_| SelectionError::Invalid(format!("неверный предмет: {}", subject_id)))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| SelectionError::Invalid(format!("неверная дата: {}", date)))?;
    Ok((class_id, subject_id, date))
}

pub(crate) fn non_empty<'a>(form: &'a FormMap, key: &str) -> Option<&'a str> {
    form.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Failure surface shared by every mutating handler: one generic notice,
/// back to the originating form.
pub(crate) fn fail(jar: SignedCookieJar, back: &str, err: impl std::fmt::Display) -> Response {
    tracing::warn!("request failed: {}", err);
    let jar = session::flash(jar, "error", format!("Ошибка: {}", err));
    (jar, Redirect::to(back)).into_response()
}

pub(crate) fn notice_redirect(
    jar: SignedCookieJar,
    level: &str,
    message: impl Into<String>,
    to: &str,
) -> Response {
    let jar = session::flash(jar, level, message);
    (jar, Redirect::to(to)).into_response()
}
