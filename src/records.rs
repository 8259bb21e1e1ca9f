use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

use crate::store::{self, StoreResult};

/// Explicit tri-state for a submitted attendance batch. The web form encodes
/// presence as a checkbox, so the handler maps every listed student to
/// `Present` or `Absent` and anything outside the submission to
/// `NotSubmitted`; the engine never has to guess from key absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceMark {
    Present,
    Absent,
    NotSubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeEntry {
    Value(i64),
    Skip,
}

/// A submitted grade field. Only non-negative integer literals count;
/// anything else (empty, "н", "4.5") is a skip, not an error.
pub fn parse_grade_entry(raw: &str) -> GradeEntry {
    let t = raw.trim();
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_digit()) {
        return GradeEntry::Skip;
    }
    match t.parse::<i64>() {
        Ok(v) => GradeEntry::Value(v),
        Err(_) => GradeEntry::Skip,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub written: usize,
    pub skipped: usize,
}

fn student_in_class(conn: &Connection, student_id: i64, class_id: i64) -> StoreResult<bool> {
    let row: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM students WHERE id = ? AND class_id = ?",
            (student_id, class_id),
            |r| r.get(0),
        )
        .optional()?;
    Ok(row.is_some())
}

/// Writes one attendance row per covered student for (student, subject,
/// date), creating or overwriting in place. All-or-nothing: any row failure
/// rolls the whole batch back.
pub fn apply_attendance_batch(
    conn: &Connection,
    class_id: i64,
    subject_id: i64,
    date: NaiveDate,
    marks: &HashMap<i64, AttendanceMark>,
) -> StoreResult<BatchOutcome> {
    store::get_class(conn, class_id)?;
    store::get_subject(conn, subject_id)?;
    let date = date.format("%Y-%m-%d").to_string();

    let tx = conn.unchecked_transaction()?;
    let mut outcome = BatchOutcome::default();
    for (&student_id, mark) in marks {
        let present = match mark {
            AttendanceMark::Present => 1i64,
            AttendanceMark::Absent => 0i64,
            AttendanceMark::NotSubmitted => {
                outcome.skipped += 1;
                continue;
            }
        };
        if !student_in_class(&tx, student_id, class_id)? {
            outcome.skipped += 1;
            continue;
        }
        tx.execute(
            "INSERT INTO attendance(date, present, student_id, subject_id)
             VALUES(?, ?, ?, ?)
             ON CONFLICT(student_id, subject_id, date) DO UPDATE SET
               present = excluded.present",
            (&date, present, student_id, subject_id),
        )?;
        outcome.written += 1;
    }
    tx.commit()?;
    Ok(outcome)
}

/// Same contract as the attendance batch: one row per covered student,
/// update in place on the logical key, `Skip` touches nothing.
pub fn apply_grade_batch(
    conn: &Connection,
    class_id: i64,
    subject_id: i64,
    date: NaiveDate,
    entries: &HashMap<i64, GradeEntry>,
) -> StoreResult<BatchOutcome> {
    store::get_class(conn, class_id)?;
    store::get_subject(conn, subject_id)?;
    let date = date.format("%Y-%m-%d").to_string();

    let tx = conn.unchecked_transaction()?;
    let mut outcome = BatchOutcome::default();
    for (&student_id, entry) in entries {
        let value = match entry {
            GradeEntry::Value(v) => *v,
            GradeEntry::Skip => {
                outcome.skipped += 1;
                continue;
            }
        };
        if !student_in_class(&tx, student_id, class_id)? {
            outcome.skipped += 1;
            continue;
        }
        tx.execute(
            "INSERT INTO grades(value, date, student_id, subject_id)
             VALUES(?, ?, ?, ?)
             ON CONFLICT(student_id, subject_id, date) DO UPDATE SET
               value = excluded.value",
            (value, &date, student_id, subject_id),
        )?;
        outcome.written += 1;
    }
    tx.commit()?;
    Ok(outcome)
}
