use serde::Serialize;

use crate::cell::{coerce_cell, Cell};
use crate::decode::decode_text;
use crate::delimiter::{detect_delimiter, split_line};
use crate::error::ImportError;

/// A parsed spreadsheet export.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub encoding: &'static str,
    pub delimiter: char,
    pub headers: Vec<String>,
    /// Coerced cells, every row exactly `headers.len()` wide.
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip)]
    raw: Vec<Vec<String>>,
}

/// Parse an uploaded CSV/TSV file.
///
/// The first non-empty line is the header. Blank lines are skipped and rows
/// are padded or truncated to the header width. Fails when there is no header.
pub fn parse_table(bytes: &[u8]) -> Result<Table, ImportError> {
    let decoded = decode_text(bytes);
    let text = decoded.text.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(text);

    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines.next().ok_or(ImportError::Empty)?;
    let headers: Vec<String> = split_line(header_line, delimiter)
        .into_iter()
        .enumerate()
        .map(|(i, h)| if h.is_empty() { format!("column_{}", i + 1) } else { h })
        .collect();
    let width = headers.len();

    let mut raw = Vec::new();
    for line in lines {
        let mut cells = split_line(line, delimiter);
        cells.resize(width, String::new());
        raw.push(cells);
    }
    let rows = raw
        .iter()
        .map(|r| r.iter().map(|c| coerce_cell(c)).collect())
        .collect();

    tracing::debug!(
        encoding = decoded.encoding,
        delimiter = ?delimiter,
        columns = width,
        rows = raw.len(),
        "parsed import table"
    );
    Ok(Table {
        encoding: decoded.encoding,
        delimiter,
        headers,
        rows,
        raw,
    })
}

/// Fold a header for lookup: lowercase with Turkish letters mapped to ASCII,
/// so `Kullanıcı Adı`, `KULLANICI ADI` and `kullanici adi` compare equal.
pub fn fold_header(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\u{307}')
        .map(|c| match c {
            'ı' => 'i',
            'ç' => 'c',
            'ğ' => 'g',
            'ö' => 'o',
            'ş' => 's',
            'ü' => 'u',
            other => other,
        })
        .collect()
}

impl Table {
    /// Index of the first header matching any alias.
    pub fn column_index(&self, aliases: &[&str]) -> Option<usize> {
        let wanted: Vec<String> = aliases.iter().map(|a| fold_header(a)).collect();
        self.headers
            .iter()
            .position(|h| wanted.contains(&fold_header(h)))
    }

    /// Header-keyed view of each data row, with the raw (uncoerced) text.
    pub fn records(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.raw.iter().enumerate().map(move |(i, cells)| RowRef {
            table: self,
            index: i,
            cells,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One data row of a [`Table`].
pub struct RowRef<'a> {
    table: &'a Table,
    index: usize,
    cells: &'a [String],
}

impl<'a> RowRef<'a> {
    /// Zero-based data row index (the header is not counted).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Trimmed text under the first header matching an alias; None when the
    /// column is missing or the cell is blank.
    pub fn text(&self, aliases: &[&str]) -> Option<&'a str> {
        let i = self.table.column_index(aliases)?;
        let cells: &'a [String] = self.cells;
        cells
            .get(i)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_semicolon_export_with_padding() {
        let csv = "Ay;Hedef;Gerçekleşen\n\nOcak;100;85,5\nŞubat;100\nMart;100;90;fazla\n";
        let t = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(t.delimiter, ';');
        assert_eq!(t.encoding, "UTF-8");
        assert_eq!(t.headers, ["Ay", "Hedef", "Gerçekleşen"]);
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.rows[0], [Cell::Text("Ocak".into()), Cell::Number(100.0), Cell::Number(85.5)]);
        assert_eq!(t.rows[1][2], Cell::Empty);
        assert_eq!(t.rows[2].len(), 3);
    }

    #[test]
    fn blank_headers_get_names() {
        let t = parse_table(b"a,,c\n1,2,3").unwrap();
        assert_eq!(t.headers, ["a", "column_2", "c"]);
    }

    #[test]
    fn empty_file_is_an_error() {
        assert_eq!(parse_table(b"").unwrap_err(), ImportError::Empty);
        assert_eq!(parse_table(b"\xEF\xBB\xBF\n \n").unwrap_err(), ImportError::Empty);
    }

    #[test]
    fn records_match_turkish_aliases() {
        let csv = "KULLANICI ADI;Ad Soyad;E-posta;Bölüm\nayilmaz;Ayşe Yılmaz;;Kalite\n0042;Ali Veli;ali@example.com;\n";
        let t = parse_table(csv.as_bytes()).unwrap();
        let rows: Vec<_> = t.records().collect();

        let user = &["username", "kullanıcı adı"];
        assert_eq!(rows[0].text(user), Some("ayilmaz"));
        assert_eq!(rows[0].text(&["email", "e-posta"]), None);
        assert_eq!(rows[0].text(&["department", "departman", "bölüm"]), Some("Kalite"));
        assert_eq!(rows[1].text(user), Some("0042"));
        assert_eq!(rows[1].index(), 1);
        assert_eq!(rows[1].text(&["role", "rol"]), None);
    }

    #[test]
    fn fold_header_handles_dotted_capitals() {
        assert_eq!(fold_header("İŞLEM TARİHİ"), "islem tarihi");
        assert_eq!(fold_header(" Şifre "), "sifre");
    }
}
