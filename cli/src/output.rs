//! Result rendering: pretty JSON or human-readable text and tables

use std::fmt::Display;
use std::io::Write;

use chrono::DateTime;
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

/// Destination for command output
///
/// Results go to `out`; progress, headers and other notes go to `err`
/// so piped output stays clean.
pub struct Printer<'a> {
    mode: OutputMode,
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
}

impl<'a> Printer<'a> {
    pub fn new(mode: OutputMode, out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { mode, out, err }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn err(&mut self) -> &mut dyn Write {
        &mut *self.err
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CliError> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }

    pub fn line(&mut self, text: impl Display) -> Result<(), CliError> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// `Label: value` line with the label padded to a common width
    pub fn field(&mut self, label: &str, value: impl Display) -> Result<(), CliError> {
        let label = format!("{}:", label);
        writeln!(self.out, "{:<14}{}", label.bold(), value)?;
        Ok(())
    }

    pub fn success(&mut self, message: impl Display) -> Result<(), CliError> {
        writeln!(self.out, "{} {}", "✓".green(), message)?;
        Ok(())
    }

    /// Supplementary line on stderr
    pub fn note(&mut self, message: impl Display) -> Result<(), CliError> {
        writeln!(self.err, "{}", message)?;
        Ok(())
    }

    /// Section header on stderr, e.g. `--- SQL ---`
    pub fn section(&mut self, title: &str) -> Result<(), CliError> {
        writeln!(self.err, "\n{}", format!("--- {} ---", title).dimmed())?;
        Ok(())
    }

    pub fn table<R: Tabled>(&mut self, rows: impl IntoIterator<Item = R>) -> Result<(), CliError> {
        let mut table = Table::new(rows);
        table.with(Style::blank());
        writeln!(self.out, "{}", table)?;
        Ok(())
    }

    /// Table with headers known only at runtime
    pub fn grid(&mut self, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<(), CliError> {
        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::psql());
        writeln!(self.out, "{}", table)?;
        Ok(())
    }
}

/// Shorten `s` to at most `max` characters, marking the cut with `...`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Placeholder for absent optional values
pub fn dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// RFC 3339 timestamp as `YYYY-MM-DD HH:MM`; other strings pass through
pub fn short_time(value: Option<&str>) -> String {
    match value {
        Some(raw) if !raw.is_empty() => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| raw.to_string()),
        _ => "-".to_string(),
    }
}

/// Break a single-line SQL statement before its major clauses
pub fn format_sql(sql: &str) -> String {
    const CLAUSES: [&str; 15] = [
        "LEFT JOIN",
        "RIGHT JOIN",
        "INNER JOIN",
        "OUTER JOIN",
        "CROSS JOIN",
        "FULL JOIN",
        "JOIN",
        "FROM",
        "WHERE",
        "GROUP BY",
        "HAVING",
        "ORDER BY",
        "LIMIT",
        "UNION",
        "WITH",
    ];

    let mut out = String::with_capacity(sql.len() + 16);
    let mut rest = sql.trim();
    while let Some(pos) = rest.find(' ') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let clause = CLAUSES
            .iter()
            .find(|kw| after.starts_with(*kw) && after[kw.len()..].starts_with(' '));
        match clause {
            Some(kw) => {
                out.push('\n');
                out.push_str(kw);
                rest = &after[kw.len()..];
            }
            None => {
                out.push(' ');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Indent every line of `text` by `prefix`
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("a longer description", 10), "a longe...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }

    #[test]
    fn test_format_sql() {
        let sql = "SELECT a, b FROM orders o LEFT JOIN customers c ON o.cid = c.id WHERE a > 1 GROUP BY a ORDER BY b LIMIT 5";
        assert_eq!(
            format_sql(sql),
            "SELECT a, b\nFROM orders o\nLEFT JOIN customers c ON o.cid = c.id\nWHERE a > 1\nGROUP BY a\nORDER BY b\nLIMIT 5"
        );
        assert_eq!(format_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_short_time() {
        assert_eq!(
            short_time(Some("2026-03-01T10:15:30Z")),
            "2026-03-01 10:15"
        );
        assert_eq!(short_time(Some("yesterday")), "yesterday");
        assert_eq!(short_time(None), "-");
    }

    #[test]
    fn test_json_and_table_output() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        {
            let mut printer = Printer::new(OutputMode::Json, &mut out, &mut err);
            printer.json(&serde_json::json!({ "id": 1 })).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"id\": 1\n}\n");

        let mut out = Vec::new();
        {
            let mut printer = Printer::new(OutputMode::Text, &mut out, &mut err);
            printer
                .table(vec![Row {
                    id: 7,
                    name: "Sales".into(),
                }])
                .unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ID"));
        assert!(text.contains("Sales"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb", "  "), "  a\n  b");
    }
}
