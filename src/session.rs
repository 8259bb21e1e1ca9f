use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, Key, SignedCookieJar};
use base64::{engine::general_purpose, Engine as _};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::store;

pub const SESSION_COOKIE: &str = "teacher_id";
const FLASH_COOKIE: &str = "flash";

/// Cookie signing key from the configured secret. SHA-256 widens an
/// arbitrary-length secret to the 32 bytes `Key::derive_from` requires.
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha256::digest(secret.as_bytes());
    Key::derive_from(digest.as_slice())
}

/// The authenticated teacher, produced by [`require`] and passed explicitly
/// into every protected handler.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub teacher_id: i64,
    pub full_name: String,
}

/// One transient notice; level is "success", "danger" or "error".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

// The JSON payload is base64-wrapped: notices carry Cyrillic text and raw
// UTF-8 does not survive a cookie header.
fn read_flashes(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| general_purpose::STANDARD.decode(c.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

pub fn flash(jar: SignedCookieJar, level: &str, message: impl Into<String>) -> SignedCookieJar {
    let mut notices = read_flashes(&jar);
    notices.push(Flash {
        level: level.to_string(),
        message: message.into(),
    });
    let payload =
        general_purpose::STANDARD.encode(serde_json::to_vec(&notices).unwrap_or_default());
    jar.add(
        Cookie::build((FLASH_COOKIE, payload))
            .path("/")
            .http_only(true),
    )
}

/// Reads and clears the pending notices; they render once.
pub fn take_flashes(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let notices = read_flashes(&jar);
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, notices)
}

pub fn establish(jar: SignedCookieJar, teacher_id: i64) -> SignedCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, teacher_id.to_string()))
            .path("/")
            .http_only(true),
    )
}

pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn current(jar: &SignedCookieJar, conn: &Connection) -> Option<SessionContext> {
    let id = jar.get(SESSION_COOKIE)?.value().parse::<i64>().ok()?;
    let teacher = store::get_teacher(conn, id).ok()?;
    Some(SessionContext {
        teacher_id: teacher.id,
        full_name: teacher.full_name,
    })
}

/// Protected handlers call this first. Without a valid session the request
/// short-circuits to a login redirect with a notice, before the handler
/// touches any entity.
pub fn require(
    jar: SignedCookieJar,
    conn: &Connection,
) -> Result<(SignedCookieJar, SessionContext), Response> {
    match current(&jar, conn) {
        Some(ctx) => Ok((jar, ctx)),
        None => {
            let jar = flash(jar, "danger", "Пожалуйста, войдите в систему.");
            Err((jar, Redirect::to("/login")).into_response())
        }
    }
}

/// Password handling is isolated here; call sites never see the hash
/// format.
pub mod credentials {
    pub fn hash(password: &str) -> anyhow::Result<String> {
        Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
    }

    pub fn verify(password: &str, stored_hash: &str) -> bool {
        bcrypt::verify(password, stored_hash).unwrap_or(false)
    }
}
