use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use super::{notice_redirect, AppState};
use crate::session::{self, credentials};
use crate::store;
use crate::views;

/// Landing page. Visiting it always drops the session (logout-on-home is
/// intentional).
pub async fn index(jar: SignedCookieJar) -> Response {
    let jar = session::clear(jar);
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::index_page(&notices))).into_response()
}

pub async fn login_page(jar: SignedCookieJar) -> Response {
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::login_page(&notices))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

pub async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let conn = state.conn();
    let teacher = match store::find_teacher_by_username(&conn, &form.username) {
        Ok(t) => t,
        Err(e) => return super::fail(jar, "/login", e),
    };
    match teacher {
        Some(t) if credentials::verify(&form.password, &t.password_hash) => {
            let jar = session::establish(jar, t.id);
            notice_redirect(jar, "success", "Вход успешен!", "/classes")
        }
        _ => notice_redirect(jar, "danger", "Неверный логин или пароль.", "/login"),
    }
}

pub async fn register_page(jar: SignedCookieJar) -> Response {
    let (jar, notices) = session::take_flashes(jar);
    (jar, Html(views::register_page(&notices))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    username: String,
    password: String,
    full_name: String,
}

pub async fn register_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let password_hash = match credentials::hash(&form.password) {
        Ok(h) => h,
        Err(e) => return super::fail(jar, "/register", e),
    };
    let conn = state.conn();
    match store::create_teacher(&conn, &form.username, &password_hash, &form.full_name) {
        Ok(teacher_id) => {
            // Auto-login right after registration.
            let jar = session::establish(jar, teacher_id);
            notice_redirect(jar, "success", "Регистрация успешна!", "/classes")
        }
        Err(store::StoreError::Conflict(msg)) => notice_redirect(jar, "danger", msg, "/register"),
        Err(e) => super::fail(jar, "/register", e),
    }
}

pub async fn logout(jar: SignedCookieJar) -> Response {
    let jar = session::clear(jar);
    let jar = session::flash(jar, "success", "Вы вышли из системы.");
    (jar, Redirect::to("/")).into_response()
}
