//! Minimal RFC 4180 reader for uploaded CSV files.

/// Split CSV text into records of fields.
///
/// Handles quoted fields with embedded commas, doubled quotes and line
/// breaks, and accepts LF or CRLF endings. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => finish_record(&mut records, &mut record, &mut field),
            _ => field.push(c),
        }
    }
    finish_record(&mut records, &mut record, &mut field);
    records
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    record.push(std::mem::take(field));
    let fields = std::mem::take(record);
    if fields.iter().all(|f| f.is_empty()) {
        return;
    }
    records.push(fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_records() {
        let rows = parse_csv("a,b,c\n1,2,3\n");
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_quoted_fields() {
        let rows = parse_csv("name,notes\r\n\"Cruz, Ana\",\"says \"\"hi\"\"\nagain\"\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "Cruz, Ana");
        assert_eq!(rows[1][1], "says \"hi\"\nagain");
    }

    #[test]
    fn test_skips_blank_lines_and_bom() {
        let rows = parse_csv("\u{feff}agency\n\n,\nBIR");
        assert_eq!(rows, vec![vec!["agency"], vec!["BIR"]]);
    }

    #[test]
    fn test_trailing_empty_field_kept() {
        let rows = parse_csv("a,b,\n");
        assert_eq!(rows, vec![vec!["a", "b", ""]]);
    }
}
