//! Minimal delimited-text reading and writing for the sheet-shaped surfaces
//! (training input CSV, tab-url map, ingest manifest).

/// A parsed table: first record is the header row, the rest are data rows.
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn parse(text: &str) -> Table {
        let mut records = parse_records(text);
        if records.is_empty() {
            return Table {
                headers: Vec::new(),
                rows: Vec::new(),
            };
        }
        let headers = records
            .remove(0)
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Table {
            headers,
            rows: records,
        }
    }

    /// Look up a field in `row` by header name (case-insensitive).
    pub fn field<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        let idx = self
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))?;
        row.get(idx).map(|s| s.as_str())
    }
}

/// Parse comma-separated records. Handles quoted fields (including embedded
/// commas, newlines and doubled quotes), CRLF line endings, and a leading
/// UTF-8 BOM. Blank lines are skipped.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                end_record(&mut records, &mut row, &mut field);
            }
            '\n' if !in_quotes => end_record(&mut records, &mut row, &mut field),
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        end_record(&mut records, &mut row, &mut field);
    }

    records
}

fn end_record(records: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String) {
    row.push(std::mem::take(field));
    // A lone empty field is a blank line, not a record
    if row.len() == 1 && row[0].is_empty() {
        row.clear();
        return;
    }
    records.push(std::mem::take(row));
}

/// Render one record as a CSV line (no trailing newline), quoting fields
/// that contain delimiters, quotes, or line breaks.
pub fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_records() {
        let records = parse_records("a,b,c\n1,2,3\n");
        assert_eq!(records, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn quoted_fields_with_commas_and_newlines() {
        let records = parse_records("name,note\n\"Doe, Jane\",\"line one\nline two\"\n");
        assert_eq!(records[1][0], "Doe, Jane");
        assert_eq!(records[1][1], "line one\nline two");
    }

    #[test]
    fn doubled_quotes_unescape() {
        let records = parse_records("a\n\"say \"\"hi\"\"\"\n");
        assert_eq!(records[1][0], "say \"hi\"");
    }

    #[test]
    fn bom_and_crlf() {
        let records = parse_records("\u{feff}tab,url\r\nrto,https://example.com\r\n");
        assert_eq!(records[0], vec!["tab", "url"]);
        assert_eq!(records[1][0], "rto");
    }

    #[test]
    fn blank_lines_skipped() {
        let records = parse_records("a,b\n\n1,2\n\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn table_field_lookup_is_case_insensitive() {
        let table = Table::parse("Process_Name,ppt_link\nRTO Bagging,https://x\n");
        let row = &table.rows[0];
        assert_eq!(table.field(row, "process_name"), Some("RTO Bagging"));
        assert_eq!(table.field(row, "PPT_LINK"), Some("https://x"));
        assert_eq!(table.field(row, "missing"), None);
    }

    #[test]
    fn csv_line_escapes() {
        assert_eq!(csv_line(&["a", "b"]), "a,b");
        assert_eq!(csv_line(&["a,b", "c\"d"]), "\"a,b\",\"c\"\"d\"");
    }

    #[test]
    fn empty_input() {
        assert!(parse_records("").is_empty());
        let table = Table::parse("");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }
}
