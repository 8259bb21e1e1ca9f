use rusqlite::Connection;

use crate::session::credentials;
use crate::store;

/// Wipes the store and repopulates it with the fixed demo dataset: six
/// classes, two subjects, one teacher (`teacher1` / `password123`) and two
/// students per class. Used for demos and manual testing, not production.
pub fn seed_demo(conn: &Connection) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    for table in ["grades", "attendance", "students", "subjects", "classes", "teachers"] {
        tx.execute(&format!("DELETE FROM {}", table), [])?;
    }

    let mut class_ids = Vec::new();
    for name in ["5А", "5Б", "6А", "6Б", "7А", "7Б"] {
        class_ids.push(store::create_class(&tx, name)?);
    }

    for name in ["Математика", "Русский язык"] {
        store::create_subject(&tx, name)?;
    }

    let password_hash = credentials::hash("password123")?;
    store::create_teacher(&tx, "teacher1", &password_hash, "Иванов Иван Иванович")?;

    let students = [
        ("Иванов Иван", 0),
        ("Петров Петр", 0),
        ("Сидоров Сидор", 1),
        ("Алексеев Алексей", 1),
        ("Смирнов Сергей", 2),
        ("Козлов Кирилл", 2),
        ("Морозов Максим", 3),
        ("Васильев Виктор", 3),
        ("Егоров Евгений", 4),
        ("Фёдоров Фёдор", 4),
        ("Николаев Николай", 5),
        ("Дмитриев Дмитрий", 5),
    ];
    for (full_name, class_idx) in students {
        store::create_student(&tx, full_name, Some(class_ids[class_idx]))?;
    }

    tx.commit()?;
    Ok(())
}
