use std::collections::HashMap;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;

use super::{notice_redirect, parse_selection, AppState, FormMap, SelectionError};
use crate::records::{self, AttendanceMark};
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
        Html(views::attendance_page(&notices, &classes, &subjects, None)),
    )
        .into_response()
}

/// One POST serves both steps: the selection submit re-renders the page
/// with the student grid, and the distinguished `submit_attendance` field
/// applies the batch.
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
                "/attendance",
            )
        }
        Err(SelectionError::Invalid(msg)) => return super::fail(jar, "/attendance", msg),
    };

    let class = match store::get_class(&conn, class_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/attendance", e),
    };
    let subject = match store::get_subject(&conn, subject_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/attendance", e),
    };
    let students = match store::list_students_for_class(&conn, class_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/attendance", e),
    };

    if form.contains("submit_attendance") {
        // Checkbox semantics made explicit: every listed student is either
        // checked (present) or not (absent); nobody is left implicit.
        let marks: HashMap<i64, AttendanceMark> = students
            .iter()
            .map(|s| {
                let mark = if form.contains(&format!("present_{}", s.id)) {
                    AttendanceMark::Present
                } else {
                    AttendanceMark::Absent
                };
                (s.id, mark)
            })
            .collect();
        return match records::apply_attendance_batch(&conn, class_id, subject_id, date, &marks) {
            Ok(_) => notice_redirect(
                jar,
                "success",
                "Посещаемость успешно сохранена.",
                "/attendance",
            ),
            Err(e) => super::fail(jar, "/attendance", e),
        };
    }

    let (classes, subjects) = match (store::list_classes(&conn), store::list_subjects(&conn)) {
        (Ok(c), Ok(s)) => (c, s),
        (Err(e), _) | (_, Err(e)) => return super::fail(jar, "/attendance", e),
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
        Html(views::attendance_page(
            &notices,
            &classes,
            &subjects,
            Some(&selection),
        )),
    )
        .into_response()
}
