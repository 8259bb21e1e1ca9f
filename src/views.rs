//! Server-rendered pages. Deliberately thin: plain string building, no
//! template engine — the data/aggregation core hands fully-computed values
//! in and this module only lays them out.

use chrono::NaiveDate;

use crate::calc::StudentReportRow;
use crate::session::Flash;
use crate::store::{Class, Student, Subject};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, notices: &[Flash], nav: bool, body: &str) -> String {
    let mut page = String::with_capacity(body.len() + 1024);
    page.push_str("<!DOCTYPE html>\n<html lang=\"ru\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{} — Классный журнал</title>\n", escape(title)));
    page.push_str("</head>\n<body>\n");
    if nav {
        page.push_str(
            "<nav><a href=\"/classes\">Классы</a> | <a href=\"/attendance\">Посещаемость</a> | \
             <a href=\"/grades\">Оценки</a> | <a href=\"/reports\">Отчёты</a> | \
             <a href=\"/forecast\">Прогноз</a> | <a href=\"/logout\">Выход</a></nav>\n",
        );
    }
    for notice in notices {
        page.push_str(&format!(
            "<p class=\"flash {}\">{}</p>\n",
            escape(&notice.level),
            escape(&notice.message)
        ));
    }
    page.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    page.push_str(body);
    page.push_str("</body>\n</html>\n");
    page
}

pub fn index_page(notices: &[Flash]) -> String {
    layout(
        "Классный журнал",
        notices,
        false,
        "<p>Электронный журнал для учителей: классы, посещаемость, оценки и отчёты.</p>\n\
         <p><a href=\"/login\">Вход</a> | <a href=\"/register\">Регистрация</a></p>\n",
    )
}

pub fn login_page(notices: &[Flash]) -> String {
    layout(
        "Вход",
        notices,
        false,
        "<form method=\"post\" action=\"/login\">\n\
         <label>Логин <input type=\"text\" name=\"username\" required></label><br>\n\
         <label>Пароль <input type=\"password\" name=\"password\" required></label><br>\n\
         <button type=\"submit\">Войти</button>\n\
         </form>\n\
         <p><a href=\"/register\">Регистрация</a></p>\n",
    )
}

pub fn register_page(notices: &[Flash]) -> String {
    layout(
        "Регистрация",
        notices,
        false,
        "<form method=\"post\" action=\"/register\">\n\
         <label>Логин <input type=\"text\" name=\"username\" required></label><br>\n\
         <label>Пароль <input type=\"password\" name=\"password\" required></label><br>\n\
         <label>ФИО <input type=\"text\" name=\"full_name\" required></label><br>\n\
         <button type=\"submit\">Зарегистрироваться</button>\n\
         </form>\n\
         <p><a href=\"/login\">Вход</a></p>\n",
    )
}

pub fn classes_page(notices: &[Flash], classes: &[Class]) -> String {
    let mut body = String::from("<ul>\n");
    for class in classes {
        body.push_str(&format!(
            "<li><a href=\"/class/{}\">{}</a></li>\n",
            class.id,
            escape(&class.name)
        ));
    }
    body.push_str("</ul>\n<p><a href=\"/class/add\">Добавить класс</a></p>\n");
    layout("Классы", notices, true, &body)
}

pub fn class_form_page(notices: &[Flash]) -> String {
    layout(
        "Новый класс",
        notices,
        true,
        "<form method=\"post\" action=\"/class/add\">\n\
         <label>Название <input type=\"text\" name=\"name\" required></label>\n\
         <button type=\"submit\">Добавить</button>\n\
         </form>\n",
    )
}

pub fn class_detail_page(notices: &[Flash], class: &Class, students: &[Student]) -> String {
    let mut body = String::from("<ul>\n");
    for student in students {
        body.push_str(&format!(
            "<li>{}\n\
             <form method=\"post\" action=\"/student/delete/{}\" style=\"display:inline\">\
             <button type=\"submit\">Удалить</button></form></li>\n",
            escape(&student.full_name),
            student.id
        ));
    }
    body.push_str("</ul>\n<p><a href=\"/student/add\">Добавить ученика</a></p>\n");
    layout(
        &format!("Класс {}", class.name),
        notices,
        true,
        &body,
    )
}

pub fn student_form_page(notices: &[Flash], classes: &[Class]) -> String {
    let mut body = String::from(
        "<form method=\"post\" action=\"/student/add\">\n\
         <label>ФИО <input type=\"text\" name=\"full_name\" required></label><br>\n\
         <label>Класс <select name=\"class_id\">\n",
    );
    for class in classes {
        body.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            class.id,
            escape(&class.name)
        ));
    }
    body.push_str(
        "</select></label><br>\n\
         <button type=\"submit\">Добавить</button>\n\
         </form>\n",
    );
    layout("Новый ученик", notices, true, &body)
}

/// The class/subject/date grid shown after the selection step of the
/// attendance and grades pages.
pub struct GridSelection<'a> {
    pub class: &'a Class,
    pub subject: &'a Subject,
    pub date: NaiveDate,
    pub students: &'a [Student],
}

fn selection_fields(
    classes: &[Class],
    subjects: &[Subject],
    selection: Option<&GridSelection<'_>>,
) -> String {
    let (class_id, subject_id, date) = match selection {
        Some(sel) => (
            Some(sel.class.id),
            Some(sel.subject.id),
            sel.date.to_string(),
        ),
        None => (None, None, String::new()),
    };
    let mut out = String::from("<label>Класс <select name=\"class_id\">\n");
    for class in classes {
        let selected = if class_id == Some(class.id) { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            class.id,
            selected,
            escape(&class.name)
        ));
    }
    out.push_str("</select></label>\n<label>Предмет <select name=\"subject_id\">\n");
    for subject in subjects {
        let selected = if subject_id == Some(subject.id) { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            subject.id,
            selected,
            escape(&subject.name)
        ));
    }
    out.push_str(&format!(
        "</select></label>\n<label>Дата <input type=\"date\" name=\"date\" value=\"{}\"></label>\n\
         <button type=\"submit\">Показать</button>\n",
        escape(&date)
    ));
    out
}

pub fn attendance_page(
    notices: &[Flash],
    classes: &[Class],
    subjects: &[Subject],
    selection: Option<&GridSelection<'_>>,
) -> String {
    let mut body = String::from("<form method=\"post\" action=\"/attendance\">\n");
    body.push_str(&selection_fields(classes, subjects, selection));
    if let Some(sel) = selection {
        body.push_str("<table>\n<tr><th>Ученик</th><th>Присутствовал</th></tr>\n");
        for student in sel.students {
            body.push_str(&format!(
                "<tr><td>{}</td>\
                 <td><input type=\"checkbox\" name=\"present_{}\" value=\"on\"></td></tr>\n",
                escape(&student.full_name),
                student.id
            ));
        }
        body.push_str(
            "</table>\n\
             <button type=\"submit\" name=\"submit_attendance\" value=\"1\">Сохранить</button>\n",
        );
    }
    body.push_str("</form>\n");
    layout("Посещаемость", notices, true, &body)
}

pub fn grades_page(
    notices: &[Flash],
    classes: &[Class],
    subjects: &[Subject],
    selection: Option<&GridSelection<'_>>,
) -> String {
    let mut body = String::from("<form method=\"post\" action=\"/grades\">\n");
    body.push_str(&selection_fields(classes, subjects, selection));
    if let Some(sel) = selection {
        body.push_str("<table>\n<tr><th>Ученик</th><th>Оценка</th></tr>\n");
        for student in sel.students {
            body.push_str(&format!(
                "<tr><td>{}</td>\
                 <td><input type=\"text\" name=\"grade_{}\" size=\"3\"></td></tr>\n",
                escape(&student.full_name),
                student.id
            ));
        }
        body.push_str(
            "</table>\n\
             <button type=\"submit\" name=\"submit_grades\" value=\"1\">Сохранить</button>\n",
        );
    }
    body.push_str("</form>\n");
    layout("Оценки", notices, true, &body)
}

pub struct ReportView<'a> {
    pub class: &'a Class,
    pub subject: &'a Subject,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: &'a [StudentReportRow],
}

pub fn reports_page(
    notices: &[Flash],
    classes: &[Class],
    subjects: &[Subject],
    report: Option<&ReportView<'_>>,
) -> String {
    let mut body = String::from("<form method=\"post\" action=\"/reports\">\n<label>Класс <select name=\"class_id\">\n");
    let (class_id, subject_id, from, to) = match report {
        Some(r) => (
            Some(r.class.id),
            Some(r.subject.id),
            r.from.to_string(),
            r.to.to_string(),
        ),
        None => (None, None, String::new(), String::new()),
    };
    for class in classes {
        let selected = if class_id == Some(class.id) { " selected" } else { "" };
        body.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            class.id,
            selected,
            escape(&class.name)
        ));
    }
    body.push_str("</select></label>\n<label>Предмет <select name=\"subject_id\">\n");
    for subject in subjects {
        let selected = if subject_id == Some(subject.id) { " selected" } else { "" };
        body.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            subject.id,
            selected,
            escape(&subject.name)
        ));
    }
    body.push_str(&format!(
        "</select></label>\n\
         <label>С <input type=\"date\" name=\"start_date\" value=\"{}\"></label>\n\
         <label>По <input type=\"date\" name=\"end_date\" value=\"{}\"></label>\n\
         <button type=\"submit\">Показать</button>\n\
         <button type=\"submit\" name=\"export_pdf\" value=\"1\">Скачать PDF</button>\n\
         </form>\n",
        escape(&from),
        escape(&to)
    ));

    if let Some(r) = report {
        body.push_str(&format!(
            "<h2>{} — {}, {} — {}</h2>\n",
            escape(&r.class.name),
            escape(&r.subject.name),
            r.from,
            r.to
        ));
        body.push_str(
            "<table>\n<tr><th>Ученик</th><th>Посещаемость</th><th>Оценки</th>\
             <th>Средний балл</th></tr>\n",
        );
        for row in r.rows {
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
            body.push_str(&format!(
                "<tr><td>{}</td><td>{:.2}%</td><td>{}</td><td>{}</td></tr>\n",
                escape(&row.full_name),
                row.attendance_percentage,
                grades,
                average
            ));
        }
        body.push_str("</table>\n");
    }
    layout("Отчёты", notices, true, &body)
}

pub fn forecast_page(notices: &[Flash]) -> String {
    layout(
        "Прогноз",
        notices,
        true,
        "<p>Раздел в разработке.</p>\n",
    )
}
