use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use super::{notice_redirect, AppState};
use crate::session;
use crate::store;
use crate::views;

pub async fn class_list(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let classes = match store::list_classes(&conn) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/", e),
    };
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::classes_page(&notices, &classes))).into_response()
}

pub async fn class_detail(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(class_id): Path<i64>,
) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let class = match store::get_class(&conn, class_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/classes", e),
    };
    let students = match store::list_students_for_class(&conn, class_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/classes", e),
    };
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::class_detail_page(&notices, &class, &students))).into_response()
}

pub async fn add_class_page(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::class_form_page(&notices))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ClassForm {
    name: String,
}

pub async fn add_class_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ClassForm>,
) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store::create_class(&conn, form.name.trim()) {
        Ok(_) => notice_redirect(jar, "success", "Класс успешно добавлен.", "/classes"),
        Err(store::StoreError::Conflict(msg)) => notice_redirect(jar, "danger", msg, "/class/add"),
        Err(e) => super::fail(jar, "/class/add", e),
    }
}
