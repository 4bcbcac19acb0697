//! Text rendering shared by the summarizer and the aggregator.
//!
//! [`render_rows`] turns a bounded [`RowSet`] into the column-aligned layout
//! R prints for a data frame, without capturing any console output.

use crate::config::RULE_WIDTH;
use crate::models::RowSet;
use serde_json::Value as JsonValue;

/// A rule of `RULE_WIDTH` copies of `ch`.
pub fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, RULE_WIDTH).collect()
}

/// Section banner: `=` rule, title, `=` rule.
pub fn banner(title: &str) -> Vec<String> {
    vec![rule('='), title.to_string(), rule('=')]
}

/// Renders a single cell the way R prints it in a data frame.
pub fn format_cell(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NA".to_string(),
        JsonValue::Bool(true) => "TRUE".to_string(),
        JsonValue::Bool(false) => "FALSE".to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.replace(['\n', '\r'], " "),
        other => other.to_string(),
    }
}

fn is_left_aligned(value: &JsonValue) -> bool {
    matches!(value, JsonValue::String(_))
}

/// Renders a row set as aligned text lines.
///
/// Layout: a header of column names, then one line per row prefixed by its
/// 1-based row number. Text columns are left aligned, everything else right
/// aligned. An empty row set renders the header and `<0 rows>`.
pub fn render_rows(rows: &RowSet) -> Vec<String> {
    if rows.columns.is_empty() {
        return vec![format!(
            "data frame with 0 columns and {} rows",
            rows.rows.len()
        )];
    }

    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| {
            (0..rows.columns.len())
                .map(|i| row.get(i).map_or_else(|| "NA".to_string(), format_cell))
                .collect()
        })
        .collect();

    // A column is left aligned only when every non-null value is text
    let left: Vec<bool> = (0..rows.columns.len())
        .map(|i| {
            let mut values = rows.rows.iter().filter_map(|row| row.get(i));
            let mut seen_text = false;
            let all_text = values.all(|v| {
                if v.is_null() {
                    return true;
                }
                seen_text = true;
                is_left_aligned(v)
            });
            all_text && seen_text
        })
        .collect();

    let widths: Vec<usize> = rows
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let gutter = rows.rows.len().to_string().len();

    let mut lines = Vec::with_capacity(cells.len() + 1);
    let mut header = " ".repeat(gutter);
    for (i, name) in rows.columns.iter().enumerate() {
        header.push(' ');
        header.push_str(&pad(name, widths[i], left[i]));
    }
    lines.push(header.trim_end().to_string());

    if cells.is_empty() {
        lines.push("<0 rows>".to_string());
        return lines;
    }

    for (n, row) in cells.iter().enumerate() {
        let mut line = format!("{:<gutter$}", n + 1);
        for (i, cell) in row.iter().enumerate() {
            line.push(' ');
            line.push_str(&pad(cell, widths[i], left[i]));
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

fn pad(text: &str, width: usize, left: bool) -> String {
    let fill = width.saturating_sub(text.chars().count());
    if left {
        format!("{}{}", text, " ".repeat(fill))
    } else {
        format!("{}{}", " ".repeat(fill), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row_set(columns: &[&str], rows: Vec<Vec<JsonValue>>) -> RowSet {
        RowSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_rule_and_banner() {
        assert_eq!(rule('-').len(), 50);
        assert!(rule('=').chars().all(|c| c == '='));
        let lines = banner("PROJECT STRUCTURE");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "PROJECT STRUCTURE");
        assert_eq!(lines[0], lines[2]);
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&JsonValue::Null), "NA");
        assert_eq!(format_cell(&json!(true)), "TRUE");
        assert_eq!(format_cell(&json!(21.5)), "21.5");
        assert_eq!(format_cell(&json!("a\nb")), "a b");
    }

    #[test]
    fn test_render_rows_alignment() {
        let rows = row_set(
            &["name", "cyl"],
            vec![
                vec![json!("Mazda RX4"), json!(6)],
                vec![json!("Datsun 710"), json!(4)],
            ],
        );

        assert_eq!(
            render_rows(&rows),
            vec![
                "  name       cyl",
                "1 Mazda RX4    6",
                "2 Datsun 710   4",
            ]
        );
    }

    #[test]
    fn test_render_rows_nulls_and_short_rows() {
        let rows = row_set(&["a", "b"], vec![vec![json!(1)], vec![JsonValue::Null, json!(2)]]);
        let lines = render_rows(&rows);
        assert_eq!(lines, vec!["   a  b", "1  1 NA", "2 NA  2"]);
    }

    #[test]
    fn test_render_rows_empty() {
        let rows = row_set(&["id", "label"], Vec::new());
        assert_eq!(render_rows(&rows), vec!["  id label", "<0 rows>"]);
    }

    #[test]
    fn test_render_rows_no_columns() {
        let rows = RowSet::default();
        assert_eq!(
            render_rows(&rows),
            vec!["data frame with 0 columns and 0 rows"]
        );
    }

    #[test]
    fn test_render_rows_gutter_grows() {
        let rows = row_set(&["x"], (0..10).map(|i| vec![json!(i)]).collect());
        let lines = render_rows(&rows);
        assert_eq!(lines[0], "   x");
        assert_eq!(lines[1], "1  0");
        assert_eq!(lines[10], "10 9");
    }
}
