use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} не найден")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _) if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[derive(Debug, Clone)]
pub struct Teacher {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Student {
    pub id: i64,
    pub full_name: String,
    pub class_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

// --- teachers ---

pub fn create_teacher(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    full_name: &str,
) -> StoreResult<i64> {
    // Read-before-write gives the friendly message; the UNIQUE constraint
    // is the backstop for concurrent registrations.
    if find_teacher_by_username(conn, username)?.is_some() {
        return Err(StoreError::Conflict(
            "Пользователь с таким логином уже существует.".to_string(),
        ));
    }
    conn.execute(
        "INSERT INTO teachers(username, password_hash, full_name) VALUES(?, ?, ?)",
        (username, password_hash, full_name),
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            StoreError::Conflict("Пользователь с таким логином уже существует.".to_string())
        } else {
            StoreError::Storage(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn find_teacher_by_username(
    conn: &Connection,
    username: &str,
) -> StoreResult<Option<Teacher>> {
    let row = conn
        .query_row(
            "SELECT id, username, password_hash, full_name FROM teachers WHERE username = ?",
            [username],
            |r| {
                Ok(Teacher {
                    id: r.get(0)?,
                    username: r.get(1)?,
                    password_hash: r.get(2)?,
                    full_name: r.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn get_teacher(conn: &Connection, id: i64) -> StoreResult<Teacher> {
    conn.query_row(
        "SELECT id, username, password_hash, full_name FROM teachers WHERE id = ?",
        [id],
        |r| {
            Ok(Teacher {
                id: r.get(0)?,
                username: r.get(1)?,
                password_hash: r.get(2)?,
                full_name: r.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or(StoreError::NotFound("учитель"))
}

// --- classes ---

pub fn create_class(conn: &Connection, name: &str) -> StoreResult<i64> {
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM classes WHERE name = ?", [name], |r| r.get(0))
        .optional()?;
    if exists.is_some() {
        return Err(StoreError::Conflict(
            "Класс с таким названием уже существует.".to_string(),
        ));
    }
    conn.execute("INSERT INTO classes(name) VALUES(?)", [name])
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("Класс с таким названием уже существует.".to_string())
            } else {
                StoreError::Storage(e)
            }
        })?;
    Ok(conn.last_insert_rowid())
}

pub fn list_classes(conn: &Connection) -> StoreResult<Vec<Class>> {
    let mut stmt = conn.prepare("SELECT id, name FROM classes ORDER BY id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Class {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_class(conn: &Connection, id: i64) -> StoreResult<Class> {
    conn.query_row("SELECT id, name FROM classes WHERE id = ?", [id], |r| {
        Ok(Class {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })
    .optional()?
    .ok_or(StoreError::NotFound("класс"))
}

// --- subjects ---

pub fn create_subject(conn: &Connection, name: &str) -> StoreResult<i64> {
    conn.execute("INSERT INTO subjects(name) VALUES(?)", [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn list_subjects(conn: &Connection) -> StoreResult<Vec<Subject>> {
    let mut stmt = conn.prepare("SELECT id, name FROM subjects ORDER BY id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Subject {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_subject(conn: &Connection, id: i64) -> StoreResult<Subject> {
    conn.query_row("SELECT id, name FROM subjects WHERE id = ?", [id], |r| {
        Ok(Subject {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })
    .optional()?
    .ok_or(StoreError::NotFound("предмет"))
}

// --- students ---

pub fn create_student(
    conn: &Connection,
    full_name: &str,
    class_id: Option<i64>,
) -> StoreResult<i64> {
    if full_name.trim().is_empty() {
        return Err(StoreError::Validation(
            "Имя ученика не может быть пустым.".to_string(),
        ));
    }
    // The storage layer does not force class_id to resolve; validate here.
    if let Some(cid) = class_id {
        get_class(conn, cid)?;
    }
    conn.execute(
        "INSERT INTO students(full_name, class_id) VALUES(?, ?)",
        (full_name, class_id),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_student(conn: &Connection, id: i64) -> StoreResult<Student> {
    conn.query_row(
        "SELECT id, full_name, class_id FROM students WHERE id = ?",
        [id],
        |r| {
            Ok(Student {
                id: r.get(0)?,
                full_name: r.get(1)?,
                class_id: r.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(StoreError::NotFound("ученик"))
}

/// Students of a class ordered by full name (byte-wise UTF-8, which is the
/// ordering every report and page uses).
pub fn list_students_for_class(conn: &Connection, class_id: i64) -> StoreResult<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, class_id FROM students WHERE class_id = ? ORDER BY full_name",
    )?;
    let rows = stmt
        .query_map([class_id], |r| {
            Ok(Student {
                id: r.get(0)?,
                full_name: r.get(1)?,
                class_id: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Removes the student together with every attendance and grade row, in one
/// unit of work. The FK cascade covers the children as well; deleting them
/// explicitly keeps the contract independent of the connection pragma.
pub fn delete_student(conn: &Connection, id: i64) -> StoreResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM attendance WHERE student_id = ?", [id])?;
    tx.execute("DELETE FROM grades WHERE student_id = ?", [id])?;
    let n = tx.execute("DELETE FROM students WHERE id = ?", [id])?;
    if n == 0 {
        return Err(StoreError::NotFound("ученик"));
    }
    tx.commit()?;
    Ok(())
}
