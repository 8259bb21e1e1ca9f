mod test_support;

use axum::http::{header, StatusCode};
use classbook::store;
use test_support::{body_bytes, body_string, location, register, TestClient, TEST_FONT};

/// The end-to-end scenario: class 5А, two students, attendance for
/// Математика on 2024-01-10 with one present and one absent, then a report
/// over that day.
#[tokio::test]
async fn report_shows_percentages_grades_and_ordering() {
    let (mut client, _db, class_id, subject_id) = setup_with_day_of_records().await;

    let response = client
        .post(
            "/reports",
            &[
                ("class_id", &class_id.to_string()),
                ("subject_id", &subject_id.to_string()),
                ("start_date", "2024-01-01"),
                ("end_date", "2024-01-31"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    let a = body.find("Антонов Андрей").expect("present student listed");
    let b = body.find("Борисов Борис").expect("absent student listed");
    assert!(a < b, "rows ordered by full name");

    assert!(body.contains("<td>100.00%</td>"), "present student at 100%");
    assert!(body.contains("<td>0.00%</td>"), "absent student at 0%");
    // Grades 4, 5, 5 → average 4.67; the absent student has none.
    assert!(body.contains("4, 5, 5"));
    assert!(body.contains("4.67"));
    assert!(body.contains("нет оценок"));
}

#[tokio::test]
async fn reversed_range_yields_an_empty_report() {
    let (mut client, _db, class_id, subject_id) = setup_with_day_of_records().await;

    let response = client
        .post(
            "/reports",
            &[
                ("class_id", &class_id.to_string()),
                ("subject_id", &subject_id.to_string()),
                ("start_date", "2024-01-31"),
                ("end_date", "2024-01-01"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    // Students still listed, but with no rows in range: 0% and no grades.
    assert!(body.contains("Антонов Андрей"));
    assert!(!body.contains("<td>100.00%</td>"));
    assert!(body.contains("нет оценок"));
}

#[tokio::test]
async fn missing_selection_redirects_with_notice() {
    let (mut client, _db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let response = client.post("/reports", &[("class_id", "1")]).await;
    assert_eq!(location(&response).as_deref(), Some("/reports"));
    let body = body_string(client.get("/reports").await).await;
    assert!(body.contains("Пожалуйста, выберите класс, предмет и период."));
}

#[tokio::test]
async fn pdf_export_returns_a_document_attachment() {
    if !std::path::Path::new(TEST_FONT).exists() {
        eprintln!("skipping: report font {} not installed", TEST_FONT);
        return;
    }
    let (mut client, _db, class_id, subject_id) = setup_with_day_of_records().await;

    let response = client
        .post(
            "/reports",
            &[
                ("class_id", &class_id.to_string()),
                ("subject_id", &subject_id.to_string()),
                ("start_date", "2024-01-01"),
                ("end_date", "2024-01-31"),
                ("export_pdf", "1"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("attachment"))
        .unwrap_or(false));
    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"), "attachment is a PDF document");
}

async fn setup_with_day_of_records() -> (
    TestClient,
    std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>,
    i64,
    i64,
) {
    let (mut client, db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let (class_id, subject_id) = {
        let conn = db.lock().unwrap();
        let class_id = store::create_class(&conn, "5А").expect("class");
        let subject_id = store::create_subject(&conn, "Математика").expect("subject");
        let a = store::create_student(&conn, "Антонов Андрей", Some(class_id)).expect("student");
        let b = store::create_student(&conn, "Борисов Борис", Some(class_id)).expect("student");
        conn.execute(
            "INSERT INTO attendance(date, present, student_id, subject_id) VALUES('2024-01-10', 1, ?, ?)",
            (a, subject_id),
        )
        .expect("attendance");
        conn.execute(
            "INSERT INTO attendance(date, present, student_id, subject_id) VALUES('2024-01-10', 0, ?, ?)",
            (b, subject_id),
        )
        .expect("attendance");
        for (date, value) in [("2024-01-10", 4i64), ("2024-01-11", 5), ("2024-01-12", 5)] {
            conn.execute(
                "INSERT INTO grades(value, date, student_id, subject_id) VALUES(?, ?, ?, ?)",
                (value, date, a, subject_id),
            )
            .expect("grade");
        }
        (class_id, subject_id)
    };
    (client, db, class_id, subject_id)
}
