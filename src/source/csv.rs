//! Hand-rolled CSV document parser shared by the table sources.
//!
//! Handles quoted fields with embedded commas, doubled quotes, and embedded
//! line breaks. Bare CR characters outside quotes are treated as part of a
//! CRLF line ending and dropped.

use crate::source::Table;

/// Parse a full CSV document into a [`Table`]. The first record is the
/// header; a document without any record yields an empty header.
pub fn parse_table(text: &str) -> Table {
    let mut records = parse_records(text);
    if records.is_empty() {
        return Table { header: Vec::new(), rows: Vec::new() };
    }
    let header = records.remove(0);
    Table { header, rows: records }
}

/// Parse CSV text into records, skipping records whose cells are all empty
/// (blank lines).
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // A doubled quote inside a quoted field is an escaped quote.
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    finish_record(&mut records, &mut record);
                }
                _ => field.push(c),
            }
        }
    }

    // Last record when the document does not end with a newline.
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        finish_record(&mut records, &mut record);
    }

    records
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>) {
    if record.iter().any(|cell| !cell.is_empty()) {
        records.push(std::mem::take(record));
    } else {
        record.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let table = parse_table("code,herb\nH1,Ginger\nH2,Turmeric\n");
        assert_eq!(table.header, vec!["code", "herb"]);
        assert_eq!(table.rows, vec![vec!["H1", "Ginger"], vec!["H2", "Turmeric"]]);
    }

    #[test]
    fn test_parse_quoted_field_with_comma() {
        let table = parse_table("code,effect\nH1,\"Digestive aid, mild\"\n");
        assert_eq!(table.rows[0][1], "Digestive aid, mild");
    }

    #[test]
    fn test_parse_escaped_quote() {
        let table = parse_table("code,note\nH1,\"the \"\"hot\"\" root\"\n");
        assert_eq!(table.rows[0][1], "the \"hot\" root");
    }

    #[test]
    fn test_parse_embedded_newline_in_quotes() {
        let table = parse_table("code,description\nH1,\"line one\nline two\"\n");
        assert_eq!(table.rows[0][1], "line one\nline two");
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let table = parse_table("code,herb\r\nH1,Ginger\r\n");
        assert_eq!(table.header, vec!["code", "herb"]);
        assert_eq!(table.rows, vec![vec!["H1", "Ginger"]]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let table = parse_table("code,herb\n\nH1,Ginger\n\n");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_missing_final_newline() {
        let table = parse_table("code,herb\nH1,Ginger");
        assert_eq!(table.rows, vec![vec!["H1", "Ginger"]]);
    }

    #[test]
    fn test_empty_document() {
        let table = parse_table("");
        assert!(table.header.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_header_only_document() {
        let table = parse_table("code,herb,effect\n");
        assert_eq!(table.header.len(), 3);
        assert!(table.rows.is_empty());
    }
}
