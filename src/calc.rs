use chrono::NaiveDate;
use rusqlite::Connection;

use crate::store::{self, StoreResult};

#[derive(Debug, Clone, PartialEq)]
pub struct StudentReportRow {
    pub student_id: i64,
    pub full_name: String,
    pub attendance_percentage: f64,
    pub grades: Vec<i64>,
    pub average_grade: Option<f64>,
}

/// Half-up rounding to two decimals, used on every reported figure
/// (2 of 3 present → 66.67, grades 4,5,5 → 4.67).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Share of present rows among all rows, in percent. No rows means 0,
/// never NaN.
pub fn attendance_percentage<I>(rows: I) -> f64
where
    I: IntoIterator<Item = bool>,
{
    let mut total: usize = 0;
    let mut present: usize = 0;
    for p in rows {
        total += 1;
        if p {
            present += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    round2(100.0 * present as f64 / total as f64)
}

/// Arithmetic mean of the recorded values; `None` when there are none —
/// an empty period reads as "no grades", not as a zero average.
pub fn average_grade(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().sum();
    Some(round2(sum as f64 / values.len() as f64))
}

/// Summary statistics for every student of a class over [from, to]
/// (inclusive) for one subject, ordered by student full name. A reversed
/// range simply selects nothing.
pub fn class_subject_report(
    conn: &Connection,
    class_id: i64,
    subject_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> StoreResult<Vec<StudentReportRow>> {
    let students = store::list_students_for_class(conn, class_id)?;
    let from = from.format("%Y-%m-%d").to_string();
    let to = to.format("%Y-%m-%d").to_string();

    let mut att_stmt = conn.prepare(
        "SELECT present FROM attendance
         WHERE student_id = ? AND subject_id = ? AND date >= ? AND date <= ?",
    )?;
    let mut grade_stmt = conn.prepare(
        "SELECT value FROM grades
         WHERE student_id = ? AND subject_id = ? AND date >= ? AND date <= ?
         ORDER BY date",
    )?;

    let mut rows = Vec::with_capacity(students.len());
    for s in students {
        let flags = att_stmt
            .query_map((s.id, subject_id, &from, &to), |r| r.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let grades = grade_stmt
            .query_map((s.id, subject_id, &from, &to), |r| r.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(StudentReportRow {
            student_id: s.id,
            full_name: s.full_name,
            attendance_percentage: attendance_percentage(flags.into_iter().map(|v| v != 0)),
            average_grade: average_grade(&grades),
            grades,
        });
    }
    Ok(rows)
}
