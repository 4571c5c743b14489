//! Minimal CSV encoding: comma separated, `"`-quoted when needed, quotes
//! doubled inside quoted fields, `\n` row terminator.

/// A parsed row and the 1-based line it started on.
#[derive(Debug, PartialEq)]
pub(crate) struct Row {
    pub line: usize,
    pub fields: Vec<String>,
}

pub(crate) fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub(crate) fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    // A lone empty field would otherwise be written as a blank line.
    if let [only] = fields
        && only.as_ref().is_empty()
    {
        return "\"\"\n".into();
    }
    let mut line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Parse CSV content into rows. Blank lines are skipped.
pub(crate) fn parse(content: &str) -> Result<Vec<Row>, (usize, String)> {
    let mut rows = Vec::new();
    let mut chars = content.chars().peekable();
    let mut line = 1;

    while chars.peek().is_some() {
        let start_line = line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut was_quoted = false;

        loop {
            let Some(c) = chars.next() else {
                if quoted {
                    return Err((start_line, "unterminated quoted field".into()));
                }
                break;
            };

            if quoted {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => quoted = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if field.is_empty() && !was_quoted => {
                    quoted = true;
                    was_quoted = true;
                }
                '"' => {
                    return Err((line, "unexpected quote inside unquoted field".into()));
                }
                ',' => {
                    fields.push(std::mem::take(&mut field));
                    was_quoted = false;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    break;
                }
                _ if was_quoted => {
                    return Err((line, "text after closing quote".into()));
                }
                _ => field.push(c),
            }
        }

        if fields.is_empty() && field.is_empty() && !was_quoted {
            continue;
        }
        fields.push(field);
        rows.push(Row {
            line: start_line,
            fields,
        });
    }

    Ok(rows)
}
