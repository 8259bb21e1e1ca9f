use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::NaiveDate;

use super::{non_empty, notice_redirect, AppState, FormMap};
use crate::session;
use crate::store;
use crate::views::{self, ReportView};
use crate::{calc, pdf};

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
        Html(views::reports_page(&notices, &classes, &subjects, None)),
    )
        .into_response()
}

fn parse_range(form: &FormMap) -> Option<(i64, i64, NaiveDate, NaiveDate)> {
    let class_id = non_empty(form, "class_id")?.parse::<i64>().ok()?;
    let subject_id = non_empty(form, "subject_id")?.parse::<i64>().ok()?;
    let from = NaiveDate::parse_from_str(non_empty(form, "start_date")?, "%Y-%m-%d").ok()?;
    let to = NaiveDate::parse_from_str(non_empty(form, "end_date")?, "%Y-%m-%d").ok()?;
    Some((class_id, subject_id, from, to))
}

/// Renders the aggregated report; the distinguished `export_pdf` field
/// turns the same rows into a downloadable document instead.
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

    let Some((class_id, subject_id, from, to)) = parse_range(&form) else {
        return notice_redirect(
            jar,
            "danger",
            "Пожалуйста, выберите класс, предмет и период.",
            "/reports",
        );
    };

    let class = match store::get_class(&conn, class_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/reports", e),
    };
    let subject = match store::get_subject(&conn, subject_id) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/reports", e),
    };
    // A reversed range is the caller's mistake and simply selects nothing.
    let rows = match calc::class_subject_report(&conn, class_id, subject_id, from, to) {
        Ok(v) => v,
        Err(e) => return super::fail(jar, "/reports", e),
    };

    if form.contains("export_pdf") {
        let title = pdf::ReportTitle {
            class_name: &class.name,
            subject_name: &subject.name,
            from,
            to,
        };
        return match pdf::render_report(&state.report_font, &title, &rows) {
            Ok(bytes) => (
                jar,
                [
                    (header::CONTENT_TYPE, "application/pdf"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"report.pdf\"",
                    ),
                ],
                bytes,
            )
                .into_response(),
            Err(e) => super::fail(jar, "/reports", e),
        };
    }

    let (classes, subjects) = match (store::list_classes(&conn), store::list_subjects(&conn)) {
        (Ok(c), Ok(s)) => (c, s),
        (Err(e), _) | (_, Err(e)) => return super::fail(jar, "/reports", e),
    };
    let report = ReportView {
        class: &class,
        subject: &subject,
        from,
        to,
        rows: &rows,
    };
    let (jar, notices) = session::take_flashes(jar);
    (
        jar,
        Html(views::reports_page(
            &notices,
            &classes,
            &subjects,
            Some(&report),
        )),
    )
        .into_response()
}

pub async fn forecast(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let conn = state.conn();
    let (jar, _ctx) = match session::require(jar, &conn) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::forecast_page(&notices))).into_response()
}
