mod test_support;

use classbook::store;
use test_support::{body_string, location, register, TestClient};

#[tokio::test]
async fn class_add_lists_and_rejects_duplicates() {
    let (mut client, _db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let response = client.post("/class/add", &[("name", "5А")]).await;
    assert_eq!(location(&response).as_deref(), Some("/classes"));

    let body = body_string(client.get("/classes").await).await;
    assert!(body.contains("Класс успешно добавлен."));
    assert!(body.contains("5А"));

    let response = client.post("/class/add", &[("name", "5А")]).await;
    assert_eq!(location(&response).as_deref(), Some("/class/add"));
    let body = body_string(client.get("/class/add").await).await;
    assert!(body.contains("Класс с таким названием уже существует."));
}

#[tokio::test]
async fn class_detail_lists_students_by_name() {
    let (mut client, db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let class_id = {
        let conn = db.lock().unwrap();
        let class_id = store::create_class(&conn, "5А").expect("class");
        store::create_student(&conn, "Борисов Борис", Some(class_id)).expect("student");
        store::create_student(&conn, "Антонов Андрей", Some(class_id)).expect("student");
        class_id
    };

    let body = body_string(client.get(&format!("/class/{}", class_id)).await).await;
    let first = body.find("Антонов Андрей").expect("first student listed");
    let second = body.find("Борисов Борис").expect("second student listed");
    assert!(first < second, "students must be ordered by full name");
}

#[tokio::test]
async fn student_add_redirects_to_class_page() {
    let (mut client, db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let class_id = {
        let conn = db.lock().unwrap();
        store::create_class(&conn, "5А").expect("class")
    };

    let response = client
        .post(
            "/student/add",
            &[
                ("full_name", "Иванов Иван"),
                ("class_id", &class_id.to_string()),
            ],
        )
        .await;
    assert_eq!(
        location(&response).as_deref(),
        Some(format!("/class/{}", class_id).as_str())
    );

    let body = body_string(client.get(&format!("/class/{}", class_id)).await).await;
    assert!(body.contains("Ученик успешно добавлен"));
    assert!(body.contains("Иванов Иван"));
}

#[tokio::test]
async fn deleting_a_student_cascades_attendance_and_grades() {
    let (mut client, db) = TestClient::new();
    register(&mut client, "teacher1").await;

    let (class_id, student_id) = {
        let conn = db.lock().unwrap();
        let class_id = store::create_class(&conn, "5А").expect("class");
        let subject_id = store::create_subject(&conn, "Математика").expect("subject");
        let student_id =
            store::create_student(&conn, "Иванов Иван", Some(class_id)).expect("student");
        conn.execute(
            "INSERT INTO attendance(date, present, student_id, subject_id) VALUES('2024-01-10', 1, ?, ?)",
            (student_id, subject_id),
        )
        .expect("attendance row");
        conn.execute(
            "INSERT INTO grades(value, date, student_id, subject_id) VALUES(5, '2024-01-10', ?, ?)",
            (student_id, subject_id),
        )
        .expect("grade row");
        (class_id, student_id)
    };

    let response = client
        .post(&format!("/student/delete/{}", student_id), &[])
        .await;
    assert_eq!(
        location(&response).as_deref(),
        Some(format!("/class/{}", class_id).as_str())
    );

    let conn = db.lock().unwrap();
    for table in ["attendance", "grades", "students"] {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .expect("count");
        assert_eq!(count, 0, "{} must be empty after the cascade", table);
    }
}
