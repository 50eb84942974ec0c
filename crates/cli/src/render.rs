//! Terminal rendering for query results.
//!
//! Results print as generated SQL followed by an aligned text table. Cell
//! values keep the column order the server sent; JSON null renders as the
//! `NULL` placeholder rather than an empty cell so it cannot be mistaken
//! for an empty string.

use tabletalk_protocol::QueryResult;
use unicode_width::UnicodeWidthStr;

/// Placeholder for JSON null cells.
const NULL_CELL: &str = "NULL";

/// Shown when a result carries no rows and no message.
const NO_DATA: &str = "No data returned";

/// Render a cell value for display.
fn display_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => NULL_CELL.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the result's rows as an aligned two-space-separated table.
/// Returns the no-data message when the result set is empty.
pub fn render_table(result: &QueryResult) -> String {
    if result.data.is_empty() {
        return result.message.clone().unwrap_or_else(|| NO_DATA.to_string());
    }

    let columns: Vec<String> = result.columns().iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<String>> = result
        .data
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(col).map(display_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &columns, &widths);
    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rules, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        // Pad all but the last column to keep lines free of trailing spaces.
        if i + 1 < cells.len() {
            let pad = widths[i].saturating_sub(cell.width());
            out.push_str(&" ".repeat(pad));
        }
    }
    out.push('\n');
}

/// Render a full query result: SQL header then the rows.
pub fn render_result(result: &QueryResult) -> String {
    format!("sql:\n  {}\n\n{}", result.sql.replace('\n', "\n  "), render_table(result))
}

/// Render the data summary: the introspection SQL plus the first row as
/// `column: value` lines.
pub fn render_summary(summary: &QueryResult) -> String {
    let mut out = format!("  {}\n", summary.sql.replace('\n', "\n  "));
    if let Some(first) = summary.data.first() {
        for (key, value) in first {
            out.push_str(&format!("  {}: {}\n", key, display_cell(value)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(json: serde_json::Value) -> QueryResult {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn table_aligns_columns_and_preserves_order() {
        let r = result(serde_json::json!({
            "sql": "SELECT product, revenue FROM sales ORDER BY revenue DESC LIMIT 5",
            "data": [
                {"product": "Widget", "revenue": 1250.5},
                {"product": "A", "revenue": 90}
            ]
        }));
        let table = render_table(&r);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "product  revenue");
        assert_eq!(lines[1], "-------  -------");
        assert_eq!(lines[2], "Widget   1250.5");
        assert_eq!(lines[3], "A        90");
    }

    #[test]
    fn null_cells_render_placeholder() {
        let r = result(serde_json::json!({
            "sql": "SELECT product, revenue FROM sales",
            "data": [{"product": "Gizmo", "revenue": null}]
        }));
        let table = render_table(&r);
        assert!(table.contains("NULL"), "table: {}", table);
    }

    #[test]
    fn empty_result_prints_message() {
        let r = result(serde_json::json!({
            "sql": "UPDATE sales SET x = 1",
            "data": [],
            "message": "3 rows affected."
        }));
        assert_eq!(render_table(&r), "3 rows affected.");
    }

    #[test]
    fn empty_result_without_message_prints_default() {
        let r = result(serde_json::json!({
            "sql": "SELECT * FROM sales WHERE 1 = 0",
            "data": []
        }));
        assert_eq!(render_table(&r), "No data returned");
    }

    #[test]
    fn strings_render_unquoted() {
        let r = result(serde_json::json!({
            "sql": "SELECT region FROM sales",
            "data": [{"region": "EMEA"}]
        }));
        let table = render_table(&r);
        assert!(table.contains("EMEA"));
        assert!(!table.contains("\"EMEA\""));
    }

    #[test]
    fn summary_lists_first_row_fields() {
        let s = result(serde_json::json!({
            "sql": "SELECT COUNT(*) AS row_count FROM sales",
            "data": [{"row_count": 120, "columns": "product, revenue"}]
        }));
        let rendered = render_summary(&s);
        assert!(rendered.contains("SELECT COUNT(*)"));
        assert!(rendered.contains("row_count: 120"));
        assert!(rendered.contains("columns: product, revenue"));
    }

    #[test]
    fn multiline_sql_is_indented() {
        let r = result(serde_json::json!({
            "sql": "SELECT product\nFROM sales",
            "data": []
        }));
        let rendered = render_result(&r);
        assert!(rendered.contains("  SELECT product\n  FROM sales"));
    }
}
