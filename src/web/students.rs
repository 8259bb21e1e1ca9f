use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use super::{notice_redirect, AppState};
use crate::session;
use crate::store;
use crate::views;

pub async fn add_student_page(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let classes = match store::list_classes(&conn) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/classes", e),
    };
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::student_form_page(&notices, &classes))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct StudentForm {
    full_name: String,
    class_id: String,
}

pub async fn add_student_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<StudentForm>,
) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let class_id = match form.class_id.trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => return super::fail(jar, "/student/add", "не выбран класс"),
    };
    match store::create_student(&conn, form.full_name.trim(), Some(class_id)) {
        Ok(_) => notice_redirect(
            jar,
            "success",
            "Ученик успешно добавлен",
            &format!("/class/{}", class_id),
        ),
        Err(e) => super::fail(jar, "/student/add", e),
    }
}

pub async fn delete_student(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(student_id): Path<i64>,
) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student = match store::get_student(&conn, student_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/classes", e),
    };
    let back = match student.class_id {
        Some(class_id) => format!("/class/{}", class_id),
        None => "/classes".to_string(),
    };
    match store::delete_student(&conn, student_id) {
        Ok(()) => notice_redirect(jar, "success", "Ученик успешно удалён", &back),
        Err(e) => super::fail(jar, &back, e),
    }
}
