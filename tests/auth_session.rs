mod test_support;

use axum::http::StatusCode;
use test_support::{body_string, location, register, TestClient};

#[tokio::test]
async fn register_establishes_session_and_login_round_trips() {
    let (mut client, _db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let response = client.get("/classes").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Классы"));

    // Log out, then back in with the same credentials.
    client.get("/logout").await;
    let response = client
        .post("/login", &[("username", "teacher1"), ("password", "секрет123")])
        .await;
    assert_eq!(location(&response).as_deref(), Some("/classes"));
    let response = client.get("/classes").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_leaves_no_session() {
    let (mut client, _db) = TestClient::new();
    register(&mut client, "teacher1").await;
    client.get("/logout").await;

    let response = client
        .post("/login", &[("username", "teacher1"), ("password", "мимо")])
        .await;
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let response = client.get("/classes").await;
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn duplicate_username_conflicts_and_keeps_existing_session() {
    let (mut client, db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let response = client
        .post(
            "/register",
            &[
                ("username", "teacher1"),
                ("password", "другой"),
                ("full_name", "Другой Учитель"),
            ],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/register"));

    let count: i64 = {
        let conn = db.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM teachers", [], |r| r.get(0))
            .expect("count")
    };
    assert_eq!(count, 1);

    // The conflict left the first teacher's session intact.
    let response = client.get("/classes").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_redirect_and_do_not_mutate_without_session() {
    let (mut client, db) = TestClient::new();

    for path in ["/classes", "/attendance", "/grades", "/reports", "/forecast"] {
        let response = client.get(path).await;
        assert_eq!(
            location(&response).as_deref(),
            Some("/login"),
            "expected login redirect for {}",
            path
        );
    }

    let response = client.post("/class/add", &[("name", "5А")]).await;
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let count: i64 = {
        let conn = db.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM classes", [], |r| r.get(0))
            .expect("count")
    };
    assert_eq!(count, 0, "unauthenticated POST must not write");
}

#[tokio::test]
async fn landing_page_clears_the_session() {
    let (mut client, _db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let response = client.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get("/classes").await;
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn flash_notice_renders_once() {
    let (mut client, _db) = TestClient::new();
    let response = client.get("/classes").await;
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let body = body_string(client.get("/login").await).await;
    assert!(body.contains("Пожалуйста, войдите в систему."));

    let body = body_string(client.get("/login").await).await;
    assert!(!body.contains("Пожалуйста, войдите в систему."));
}
