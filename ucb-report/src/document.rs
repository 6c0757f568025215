//! Fixed-layout plain-text rendition of a report for terminal output.

use std::fmt::Write as _;

use crate::report::Report;

pub const TITLE: &str = "Universal Call Bell - Test 1 Results";

const COLUMNS: [(&str, usize); 3] = [("Index", 7), ("TrialLabel", 14), ("Outcome", 14)];

pub fn render(report: &Report) -> String {
    let border = border();
    let width = border.len();
    let mut out = String::new();

    let _ = writeln!(out, "{TITLE:^width$}");
    let _ = writeln!(out);
    if let Some(subject) = report.subject() {
        let _ = writeln!(out, "Subject: {subject}");
    }
    if let Some(started) = report.started_at() {
        let _ = writeln!(out, "Started: {}", started.format("%Y-%m-%d %H:%M"));
    }
    let _ = writeln!(
        out,
        "Generated: {}  Mode: {}",
        report.generated_at().format("%Y-%m-%d %H:%M"),
        report.mode()
    );
    let _ = writeln!(out, "{border}");
    let _ = writeln!(out, "{}", line(COLUMNS.map(|(name, _)| name.to_string())));
    let _ = writeln!(out, "{border}");
    for row in report.rows() {
        let cells = [
            row.index.to_string(),
            row.label.to_string(),
            row.outcome.to_string(),
        ];
        let _ = writeln!(out, "{}", line(cells));
    }
    let _ = writeln!(out, "{border}");
    out
}

fn border() -> String {
    let mut s = String::from("+");
    for (_, w) in COLUMNS {
        s.push_str(&"-".repeat(w));
        s.push('+');
    }
    s
}

fn line(cells: [String; 3]) -> String {
    let mut s = String::from("|");
    for ((_, w), cell) in COLUMNS.iter().zip(cells.iter()) {
        let _ = write!(s, "{cell:^w$}|", w = *w);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_centered_in_fixed_widths() {
        let cells = [
            "1".to_string(),
            "Press".to_string(),
            "Activated".to_string(),
        ];
        assert_eq!(line(cells), "|   1   |    Press     |  Activated   |");
        assert_eq!(border(), "+-------+--------------+--------------+");
    }
}
