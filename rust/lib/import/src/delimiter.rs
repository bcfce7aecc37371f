/// Delimiters considered by [`detect_delimiter`], in tie-break order.
pub const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Guess the delimiter from the first two non-empty lines.
///
/// The candidate producing the most columns (more than one) wins, provided
/// the second line splits into the same number of columns. Falls back to `,`.
pub fn detect_delimiter(text: &str) -> char {
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(2)
        .collect();
    let Some(first) = sample.first() else {
        return ',';
    };

    let mut best = (',', 1usize);
    for d in DELIMITERS {
        let count = split_line(first, d).len();
        let consistent = sample
            .get(1)
            .map_or(true, |second| split_line(second, d).len() == count);
        if consistent && count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

/// Split one line on `delimiter`, honouring double quotes.
///
/// Wrapping quotes are removed and `""` inside a quoted cell becomes `"`.
/// Unquoted cells are trimmed.
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == delimiter {
            cells.push(finish(std::mem::take(&mut current), quoted));
            quoted = false;
        } else if c == '"' && !quoted && current.trim().is_empty() {
            current.clear();
            in_quotes = true;
            quoted = true;
        } else if quoted && c.is_whitespace() {
            // Padding after a closing quote.
        } else {
            current.push(c);
        }
    }
    cells.push(finish(current, quoted));
    cells
}

fn finish(cell: String, quoted: bool) -> String {
    if quoted {
        cell
    } else {
        cell.trim().to_string()
    }
}
