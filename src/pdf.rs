use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use printpdf::{Mm, PdfDocument};

use crate::calc::StudentReportRow;

pub struct ReportTitle<'a> {
    pub class_name: &'a str,
    pub subject_name: &'a str,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Renders the aggregated report as an A4 PDF, one row per student. The
/// font must be a TrueType file covering the text repertoire — the built-in
/// PDF fonts are single-byte and cannot carry the Cyrillic names.
pub fn render_report(
    font_path: &Path,
    title: &ReportTitle<'_>,
    rows: &[StudentReportRow],
) -> anyhow::Result<Vec<u8>> {
    let heading = format!(
        "Отчёт: {} — {}, {} — {}",
        title.class_name, title.subject_name, title.from, title.to
    );

    let (doc, first_page, first_layer) =
        PdfDocument::new(heading.as_str(), Mm(210.0), Mm(297.0), "report");
    let font_file = File::open(font_path)
        .with_context(|| format!("не удалось открыть шрифт отчёта {}", font_path.display()))?;
    let font = doc
        .add_external_font(BufReader::new(font_file))
        .context("не удалось встроить шрифт отчёта")?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = 280.0;

    layer.use_text(heading.clone(), 14.0, Mm(15.0), Mm(y), &font);
    y -= 12.0;
    for (text, x) in [
        ("Ученик", 15.0),
        ("Посещаемость", 95.0),
        ("Оценки", 130.0),
        ("Средний балл", 170.0),
    ] {
        layer.use_text(text, 11.0, Mm(x), Mm(y), &font);
    }
    y -= 8.0;

    for row in rows {
        if y < 15.0 {
            let (page, new_layer) = doc.add_page(Mm(210.0), Mm(297.0), "report");
            layer = doc.get_page(page).get_layer(new_layer);
            y = 280.0;
        }
        let grades = row
            .grades
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let average = match row.average_grade {
            Some(a) => format!("{:.2}", a),
            None => "нет оценок".to_string(),
        };
        layer.use_text(row.full_name.clone(), 11.0, Mm(15.0), Mm(y), &font);
        layer.use_text(
            format!("{:.2}%", row.attendance_percentage),
            11.0,
            Mm(95.0),
            Mm(y),
            &font,
        );
        layer.use_text(grades, 11.0, Mm(130.0), Mm(y), &font);
        layer.use_text(average, 11.0, Mm(170.0), Mm(y), &font);
        y -= 7.0;
    }

    doc.save_to_bytes().context("не удалось собрать PDF отчёта")
}
