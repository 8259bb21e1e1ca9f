use std::collections::HashMap;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;

use super::{notice_redirect, parse_selection, AppState, FormMap, SelectionError};
use crate::records::{self, GradeEntry};
use crate::session;
use crate::store;
use crate::views::{self, GridSelection};

pub async fn page(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (classes, subjects) = match (store::list_classes(&conn), store::list_subjects(&conn)) {
        (Ok(c), Ok(s)) => (c, s),
        (Err(e), _) | (_, Err(e)) => return super::fail(jar, "/classes", e),
    };
    let (jar, notices) = session::take_flashes(jar);
    (
        jar,
        Html(views::grades_page(&notices, &classes, &subjects, None)),
    )
        .into_response()
}

pub async fn submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormMap::new(pairs);
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (class_id, subject_id, date) = match parse_selection(&form) {
        Ok(v) => v,
        Err(SelectionError::Missing) => {
            return notice_redirect(
                jar,
                "danger",
                "Пожалуйста, выберите класс, предмет и дату.",
                "/grades",
            )
        }
        Err(SelectionError::Invalid(msg)) => return super::fail(jar, "/grades", msg),
    };

    let class = match store::get_class(&conn, class_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/grades", e),
    };
    let subject = match store::get_subject(&conn, subject_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/grades", e),
    };
    let students = match store::list_students_for_class(&conn, class_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/grades", e),
    };

    if form.contains("submit_grades") {
        // An empty or non-numeric field means "no grade change" for that
        // student, silently.
        let entries: HashMap<i64, GradeEntry> = students
            .iter()
            .map(|s| {
                let entry = form
                    .get(&format!("grade_{}", s.id))
                    .map(records::parse_grade_entry)
                    .unwrap_or(GradeEntry::Skip);
                (s.id, entry)
            })
            .collect();
        return match records::apply_grade_batch(&conn, class_id, subject_id, date, &entries) {
            Ok(_) => notice_redirect(jar, "success", "Оценки успешно сохранены.", "/grades"),
            Err(e) => super::fail(jar, "/grades", e),
        };
    }

    let (classes, subjects) = match (store::list_classes(&conn), store::list_subjects(&conn)) {
        (Ok(c), Ok(s)) => (c, s),
        (Err(e), _) | (_, Err(e)) => return super::fail(jar, "/grades", e),
    };
    let selection = GridSelection {
        class: &class,
        subject: &subject,
        date,
        students: &students,
    };
    let (jar, notices) = session::take_flashes(jar);
    (
        jar,
        Html(views::grades_page(
            &notices,
            &classes,
            &subjects,
            Some(&selection),
        )),
    )
        .into_response()
}
