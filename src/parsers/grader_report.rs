//! Grader report extraction
//!
//! The grader report (`grade/report/grader/index.php?id=<course>`) is one
//! table: heading rows name the grade items, one row per user holds the
//! grades. Meetings show up as a "Pre Test" and a "Post Test" column each,
//! exams as "Ujian" columns. A dash means the activity was never submitted.

use std::collections::HashMap;

use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::{element_text, selector};
use crate::error::ParseError;
use crate::models::{ExamObservation, GraderReport, ParticipantIdentity, SessionObservation};

/// What a grade column measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    PreTest(u32),
    PostTest(u32),
    Exam(u32),
}

/// Heading text classification before exam numbering is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    PreTest(u32),
    PostTest(u32),
    Exam(Option<u32>),
}

struct HeadingClassifier {
    pre_test: Regex,
    post_test: Regex,
    meeting: Regex,
    exam: Regex,
}

impl HeadingClassifier {
    fn new() -> Result<Self, ParseError> {
        Ok(Self {
            pre_test: pattern(r"(?i)\bpre[\s_-]*test\b")?,
            post_test: pattern(r"(?i)\bpost[\s_-]*test\b")?,
            meeting: pattern(r"(?i)\bpertemuan[\s_-]*(\d+)")?,
            exam: pattern(r"(?i)\bujian\b(?:[\s_-]*(\d+))?")?,
        })
    }

    fn classify(&self, text: &str) -> Option<Heading> {
        let meeting = || {
            self.meeting
                .captures(text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        };

        if self.pre_test.is_match(text) {
            return meeting().map(Heading::PreTest);
        }
        if self.post_test.is_match(text) {
            return meeting().map(Heading::PostTest);
        }
        self.exam.captures(text).map(|c| {
            Heading::Exam(c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        })
    }
}

fn pattern(source: &str) -> Result<Regex, ParseError> {
    Regex::new(source).map_err(|e| ParseError::InvalidPattern {
        pattern: source.to_string(),
        message: e.to_string(),
    })
}

/// Split a grader user label `"<name...> <class> <npm>"`.
///
/// Labels with fewer than three words, or whose NPM slot holds a staff role
/// such as `Asisten` or `PJ`, yield `None`.
pub fn parse_student_label(label: &str, assistant_roles: &[String]) -> Option<ParticipantIdentity> {
    let words: Vec<&str> = label.split_whitespace().collect();
    if words.len() < 3 {
        return None;
    }

    let npm = words[words.len() - 1];
    if assistant_roles.iter().any(|role| role == npm) {
        return None;
    }
    let class_label = words[words.len() - 2];
    let name = words[..words.len() - 2].join(" ");

    Some(ParticipantIdentity::new(name, npm, class_label))
}

/// Content of one grade cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GradeCell {
    attempted: bool,
    grade: i32,
}

impl GradeCell {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == "-" {
            return Self {
                attempted: false,
                grade: 0,
            };
        }
        Self {
            attempted: true,
            grade: parse_grade(text).unwrap_or(0),
        }
    }
}

/// Leading number of a grade text, rounded; accepts `85.50` and `85,50`
fn parse_grade(text: &str) -> Option<i32> {
    let numeric: String = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(*c, '.' | ',' | '-'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    numeric.parse::<f64>().ok().map(|g| g.round() as i32)
}

/// Moodle tags every cell of a column with the same `cN` class
fn column_key(cell: ElementRef<'_>, position: usize) -> String {
    cell.value()
        .classes()
        .find(|class| {
            class.len() > 1 && class.starts_with('c') && class[1..].bytes().all(|b| b.is_ascii_digit())
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", position))
}

/// Settle exam numbers: unnumbered exams follow the highest explicit number,
/// in column order.
fn resolve_columns(headings: Vec<(String, Heading)>) -> Vec<(String, ColumnKind)> {
    let mut next_exam = headings
        .iter()
        .filter_map(|(_, heading)| match heading {
            Heading::Exam(n) => *n,
            _ => None,
        })
        .max()
        .unwrap_or(0);

    headings
        .into_iter()
        .map(|(key, heading)| {
            let kind = match heading {
                Heading::PreTest(n) => ColumnKind::PreTest(n),
                Heading::PostTest(n) => ColumnKind::PostTest(n),
                Heading::Exam(Some(n)) => ColumnKind::Exam(n),
                Heading::Exam(None) => {
                    next_exam += 1;
                    ColumnKind::Exam(next_exam)
                }
            };
            (key, kind)
        })
        .collect()
}

/// Extract participants, meetings and exams from a grader report page.
///
/// # Arguments
/// - `html`: grader report page
/// - `assistant_roles`: NPM placeholders used by staff rows
///
/// # Returns
/// A [`GraderReport`] whose rows follow page order: participants top to
/// bottom, meetings in order of their first heading, pre and post columns of
/// the same meeting merged into one observation.
pub fn parse_grader_report(html: &str, assistant_roles: &[String]) -> Result<GraderReport, ParseError> {
    let document = Html::parse_document(html);
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;
    let user_sel = selector("th.c0 a.username")?;
    let value_sel = selector(".gradevalue")?;
    let classifier = HeadingClassifier::new()?;

    // ========== Headings ==========
    let mut headings: Vec<(String, Heading)> = Vec::new();

    for row in document.select(&row_sel) {
        if row.select(&user_sel).next().is_some() {
            continue;
        }
        for (position, cell) in row.select(&cell_sel).enumerate() {
            let Some(heading) = classifier.classify(&element_text(cell)) else {
                continue;
            };
            let key = column_key(cell, position);
            if headings.iter().any(|(k, _)| *k == key) {
                continue;
            }
            headings.push((key, heading));
        }
    }

    let columns = resolve_columns(headings);

    let mut meeting_order: Vec<u32> = Vec::new();
    for (_, kind) in &columns {
        if let ColumnKind::PreTest(n) | ColumnKind::PostTest(n) = *kind {
            if !meeting_order.contains(&n) {
                meeting_order.push(n);
            }
        }
    }
    debug!(
        "Grader report: {} grade columns, meetings {:?}",
        columns.len(),
        meeting_order
    );

    // ========== User rows ==========
    let mut report = GraderReport::default();

    for row in document.select(&row_sel) {
        let Some(user) = row.select(&user_sel).next() else {
            continue;
        };
        let label = element_text(user);
        let Some(identity) = parse_student_label(&label, assistant_roles) else {
            debug!("Skipping row: {}", label);
            continue;
        };

        let mut cells: HashMap<String, GradeCell> = HashMap::new();
        for (position, cell) in row.select(&cell_sel).enumerate() {
            let text = match cell.select(&value_sel).next() {
                Some(value) => element_text(value),
                None => element_text(cell),
            };
            cells.insert(column_key(cell, position), GradeCell::parse(&text));
        }

        let completed = |wanted: ColumnKind| {
            columns
                .iter()
                .filter(|(_, kind)| *kind == wanted)
                .any(|(key, _)| cells.get(key).is_some_and(|cell| cell.attempted))
        };

        for &meeting in &meeting_order {
            report.sessions.push(SessionObservation {
                student_id: identity.student_id.clone(),
                session_index: meeting,
                pre_test_completed: completed(ColumnKind::PreTest(meeting)),
                post_test_completed: completed(ColumnKind::PostTest(meeting)),
            });
        }

        for (key, kind) in &columns {
            if let ColumnKind::Exam(exam_index) = *kind {
                let cell = cells.get(key).copied().unwrap_or(GradeCell {
                    attempted: false,
                    grade: 0,
                });
                report.exams.push(ExamObservation {
                    student_id: identity.student_id.clone(),
                    exam_index,
                    grade: cell.grade,
                    attempted: cell.attempted,
                });
            }
        }

        report.participants.push(identity);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> Vec<String> {
        vec!["Asisten".to_string(), "PJ".to_string()]
    }

    const GRADER: &str = r##"
        <table id="user-grades" class="gradereport-grader-table">
          <tr class="heading">
            <th class="header c0">Nama</th>
            <th class="header c1">Email</th>
            <th class="header c2 item"><a class="gradeitemheader">Pre Test Pertemuan 1</a></th>
            <th class="header c3 item"><a class="gradeitemheader">Post-Test Pertemuan 1</a></th>
            <th class="header c4 item"><a class="gradeitemheader">Pre Test Pertemuan 2</a></th>
            <th class="header c5 item"><a class="gradeitemheader">Post Test Pertemuan 2</a></th>
            <th class="header c6 item"><a class="gradeitemheader">Ujian 1</a></th>
            <th class="header c7 item"><a class="gradeitemheader">Course total</a></th>
          </tr>
          <tr class="userrow">
            <th class="cell c0"><a class="username" href="#">Budi Santoso 3IA01 50421234</a></th>
            <td class="cell c1">budi@student.gunadarma.ac.id</td>
            <td class="cell c2"><span class="gradevalue">80,00</span></td>
            <td class="cell c3"><span class="gradevalue">-</span></td>
            <td class="cell c4"><span class="gradevalue">-</span></td>
            <td class="cell c5"><span class="gradevalue">-</span></td>
            <td class="cell c6"><span class="gradevalue">72.60</span></td>
            <td class="cell c7">152.60</td>
          </tr>
          <tr class="userrow">
            <th class="cell c0"><a class="username" href="#">Rina Asisten</a></th>
            <td class="cell c1">rina@staff</td>
            <td class="cell c2">-</td><td class="cell c3">-</td>
            <td class="cell c4">-</td><td class="cell c5">-</td>
            <td class="cell c6">-</td><td class="cell c7">-</td>
          </tr>
          <tr class="userrow">
            <th class="cell c0"><a class="username" href="#">Andi Wijaya 3IA01 PJ</a></th>
            <td class="cell c1">andi@staff</td>
            <td class="cell c2">-</td><td class="cell c3">-</td>
            <td class="cell c4">-</td><td class="cell c5">-</td>
            <td class="cell c6">-</td><td class="cell c7">-</td>
          </tr>
          <tr class="userrow">
            <th class="cell c0"><a class="username" href="#">Siti Nur Aisyah 3IA02 50421999</a></th>
            <td class="cell c1">siti@student.gunadarma.ac.id</td>
            <td class="cell c2">-</td>
            <td class="cell c3">100.00</td>
            <td class="cell c4">90.00</td>
            <td class="cell c5">95.00</td>
            <td class="cell c6">-</td>
            <td class="cell c7">285.00</td>
          </tr>
          <tr class="avg">
            <th class="header c0">Overall average</th>
            <td class="cell c2">80.00</td>
          </tr>
        </table>
    "##;

    #[test]
    fn test_parse_student_label() {
        let identity = parse_student_label("Siti Nur Aisyah 3IA02 50421999", &roles()).unwrap();
        assert_eq!(identity.name, "Siti Nur Aisyah");
        assert_eq!(identity.class_label, "3IA02");
        assert_eq!(identity.student_id, "50421999");

        assert!(parse_student_label("Andi Wijaya 3IA01 PJ", &roles()).is_none());
        assert!(parse_student_label("Rina Asisten", &roles()).is_none());
        assert!(parse_student_label("", &roles()).is_none());
    }

    #[test]
    fn test_parse_grade() {
        assert_eq!(parse_grade("80,00"), Some(80));
        assert_eq!(parse_grade("72.60"), Some(73));
        assert_eq!(parse_grade("95.00 %"), Some(95));
        assert_eq!(parse_grade("Selesai"), None);
        assert_eq!(GradeCell::parse(" - "), GradeCell { attempted: false, grade: 0 });
        assert_eq!(GradeCell::parse("Selesai"), GradeCell { attempted: true, grade: 0 });
    }

    #[test]
    fn test_classify_headings() {
        let classifier = HeadingClassifier::new().unwrap();
        assert_eq!(classifier.classify("Pre Test Pertemuan 3"), Some(Heading::PreTest(3)));
        assert_eq!(classifier.classify("PRE_TEST - Pertemuan 12"), Some(Heading::PreTest(12)));
        assert_eq!(classifier.classify("Posttest Pertemuan 4"), Some(Heading::PostTest(4)));
        assert_eq!(classifier.classify("Pre Test"), None);
        assert_eq!(classifier.classify("Ujian 2"), Some(Heading::Exam(Some(2))));
        assert_eq!(classifier.classify("Ujian Akhir"), Some(Heading::Exam(None)));
        assert_eq!(classifier.classify("Course total"), None);
    }

    #[test]
    fn test_parse_grader_report_participants() {
        let report = parse_grader_report(GRADER, &roles()).unwrap();

        let ids: Vec<&str> = report
            .participants
            .iter()
            .map(|p| p.student_id.as_str())
            .collect();
        assert_eq!(ids, vec!["50421234", "50421999"]);
        assert_eq!(report.participants[0].name, "Budi Santoso");
    }

    #[test]
    fn test_parse_grader_report_sessions() {
        let report = parse_grader_report(GRADER, &roles()).unwrap();

        let budi: Vec<(u32, bool, bool)> = report
            .sessions
            .iter()
            .filter(|s| s.student_id == "50421234")
            .map(|s| (s.session_index, s.pre_test_completed, s.post_test_completed))
            .collect();
        assert_eq!(budi, vec![(1, true, false), (2, false, false)]);

        let siti: Vec<(u32, bool, bool)> = report
            .sessions
            .iter()
            .filter(|s| s.student_id == "50421999")
            .map(|s| (s.session_index, s.pre_test_completed, s.post_test_completed))
            .collect();
        assert_eq!(siti, vec![(1, false, true), (2, true, true)]);
    }

    #[test]
    fn test_parse_grader_report_exams() {
        let report = parse_grader_report(GRADER, &roles()).unwrap();

        assert_eq!(
            report.exams,
            vec![
                ExamObservation {
                    student_id: "50421234".to_string(),
                    exam_index: 1,
                    grade: 73,
                    attempted: true,
                },
                ExamObservation {
                    student_id: "50421999".to_string(),
                    exam_index: 1,
                    grade: 0,
                    attempted: false,
                },
            ]
        );
    }

    #[test]
    fn test_meeting_order_follows_headings() {
        let html = r#"
            <table>
              <tr>
                <th class="c0">Nama</th>
                <th class="c1">Pre Test Pertemuan 3</th>
                <th class="c2">Pre Test Pertemuan 1</th>
                <th class="c3">Post Test Pertemuan 3</th>
              </tr>
              <tr>
                <th class="cell c0"><a class="username">Ani Lestari 1KA01 10121001</a></th>
                <td class="cell c1">-</td>
                <td class="cell c2">50</td>
                <td class="cell c3">-</td>
              </tr>
            </table>
        "#;
        let report = parse_grader_report(html, &roles()).unwrap();

        let order: Vec<u32> = report.sessions.iter().map(|s| s.session_index).collect();
        assert_eq!(order, vec![3, 1]);
        assert!(!report.sessions[0].pre_test_completed);
        assert!(report.sessions[1].pre_test_completed);
    }

    #[test]
    fn test_unnumbered_exam_follows_numbered_ones() {
        let html = r#"
            <table>
              <tr>
                <th class="c0">Nama</th>
                <th class="c1">Ujian Akhir</th>
                <th class="c2">Ujian 1</th>
                <th class="c3">Ujian 2</th>
              </tr>
              <tr>
                <th class="cell c0"><a class="username">Ani Lestari 1KA01 10121001</a></th>
                <td class="cell c1">80</td>
                <td class="cell c2">-</td>
                <td class="cell c3">65</td>
              </tr>
            </table>
        "#;
        let report = parse_grader_report(html, &roles()).unwrap();

        let exams: Vec<(u32, i32)> = report.exams.iter().map(|e| (e.exam_index, e.grade)).collect();
        assert_eq!(exams, vec![(3, 80), (1, 0), (2, 65)]);
    }

    #[test]
    fn test_page_without_table() {
        let report = parse_grader_report("<html><body>Tidak ada nilai</body></html>", &roles()).unwrap();
        assert!(report.is_empty());
    }
}
