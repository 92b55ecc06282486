use std::fs;
use std::path::Path;

use tracing::warn;

use super::types::TableError;

const SIGNATURE: &str = "2DA V1.0";

/// A parsed 2DA grid.
///
/// Layout: a signature line, a default-value line, one line of column
/// names, then one line per row starting with the row name. Lines
/// starting with `#` are comments and an empty line ends the data.
/// Cells are whitespace-delimited, lookups by name ignore ASCII case, and
/// a bare `*` cell or an out-of-range coordinate yields the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    name: String,
    default_value: String,
    column_names: Vec<String>,
    row_names: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let bytes = fs::read(path).map_err(|source| TableError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(Self::parse(&name, &String::from_utf8_lossy(&bytes)))
    }

    pub fn parse(name: &str, text: &str) -> Self {
        let mut lines = text.lines();

        let signature = lines.next().unwrap_or_default();
        if !signature.trim_start_matches(' ').starts_with(SIGNATURE) {
            // Some shipped tables lack the signature, they still load.
            warn!(table = name, signature, "table_bad_signature");
        }

        let default_line = lines.next().unwrap_or_default();
        let default_value = default_line
            .split_whitespace()
            .next()
            .unwrap_or(default_line)
            .to_string();

        let mut table = Self {
            name: name.to_string(),
            default_value,
            ..Self::default()
        };

        let mut header_seen = false;
        for line in lines {
            if line.is_empty() {
                break;
            }
            if line.starts_with('#') {
                continue;
            }

            let mut cells = line.split_whitespace().map(str::to_string);
            if !header_seen {
                header_seen = true;
                table.column_names = cells.collect();
                continue;
            }

            let Some(row_name) = cells.next() else {
                continue;
            };
            table.row_names.push(row_name);
            table.rows.push(cells.collect());
        }

        table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names_count(&self) -> usize {
        self.column_names.len()
    }

    /// Number of data cells on `row`, zero for rows past the end.
    pub fn column_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    pub fn query_default(&self) -> &str {
        &self.default_value
    }

    pub fn query_field(&self, row: usize, column: usize) -> &str {
        match self.rows.get(row).and_then(|cells| cells.get(column)) {
            Some(cell) if cell != "*" => cell.as_str(),
            _ => self.default_value.as_str(),
        }
    }

    /// Numeric view of a cell. Non-numeric cells read as zero.
    pub fn query_field_signed(&self, row: usize, column: usize) -> i64 {
        parse_signed(self.query_field(row, column)).unwrap_or(0)
    }

    /// Lookup by row and column names. Unknown names yield the default value.
    pub fn query_by_name(&self, row: &str, column: &str) -> &str {
        match (self.row_index(row), self.column_index(column)) {
            (Some(row), Some(column)) => self.query_field(row, column),
            _ => self.default_value.as_str(),
        }
    }

    pub fn row_index(&self, key: &str) -> Option<usize> {
        self.row_names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(key))
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.column_names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(key))
    }

    pub fn row_name(&self, index: usize) -> &str {
        self.row_names.get(index).map_or("", String::as_str)
    }

    pub fn column_name(&self, index: usize) -> &str {
        self.column_names.get(index).map_or("", String::as_str)
    }

    /// First row at or after `start` whose `column` cell is numerically `value`.
    pub fn find_value(&self, column: usize, value: i64, start: usize) -> Option<usize> {
        (start..self.row_count())
            .find(|&row| parse_signed(self.query_field(row, column)) == Some(value))
    }

    /// First row at or after `start` whose `column` cell equals `value`,
    /// ignoring ASCII case.
    pub fn find_str(&self, column: usize, value: &str, start: usize) -> Option<usize> {
        (start..self.row_count())
            .find(|&row| self.query_field(row, column).eq_ignore_ascii_case(value))
    }
}

/// Parses a whole cell as a signed integer. Accepts an optional sign and a
/// `0x` prefix for hexadecimal values.
pub fn parse_signed(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse::<i64>().ok()?
        }
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XPBONUS: &str = "2DA V1.0\n\
0\n\
# per level experience awards\n\
        LEVEL1 LEVEL2 LEVEL3\n\
XP_LOCKPICK 25 50 *\n\
XP_DISARM   30 60 90\n\
XP_LEARN_SPELL 0x10 -5\n";

    #[test]
    fn parses_header_rows_and_default() {
        let table = Table::parse("xpbonus", XPBONUS);
        assert_eq!(table.query_default(), "0");
        assert_eq!(table.column_names_count(), 3);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_name(1), "LEVEL2");
        assert_eq!(table.row_name(1), "XP_DISARM");
        assert_eq!(table.column_count(2), 2);
        assert_eq!(table.column_count(99), 0);
    }

    #[test]
    fn star_and_out_of_range_cells_yield_default() {
        let table = Table::parse("xpbonus", XPBONUS);
        assert_eq!(table.query_field(0, 2), "0");
        assert_eq!(table.query_field(0, 7), "0");
        assert_eq!(table.query_field(42, 0), "0");
        assert_eq!(table.query_field(1, 2), "90");
    }

    #[test]
    fn name_lookups_ignore_case() {
        let table = Table::parse("xpbonus", XPBONUS);
        assert_eq!(table.row_index("xp_disarm"), Some(1));
        assert_eq!(table.column_index("level3"), Some(2));
        assert_eq!(table.row_index("XP_BASH"), None);
        assert_eq!(table.query_by_name("xp_lockpick", "Level2"), "50");
        assert_eq!(table.query_by_name("missing", "Level2"), "0");
    }

    #[test]
    fn numeric_queries_accept_sign_and_hex() {
        let table = Table::parse("xpbonus", XPBONUS);
        assert_eq!(table.query_field_signed(2, 0), 16);
        assert_eq!(table.query_field_signed(2, 1), -5);
        assert_eq!(table.find_value(0, 30, 0), Some(1));
        assert_eq!(table.find_value(0, 30, 2), None);
        assert_eq!(table.find_str(1, "60", 0), Some(1));
        assert_eq!(parse_signed("12abc"), None);
        assert_eq!(parse_signed("-"), None);
    }

    #[test]
    fn missing_signature_still_loads_and_blank_line_ends_data() {
        let text = "\n*\nNAME QUICK\nSLOT1 12345 0\n\nSLOT2 999 1\n";
        let table = Table::parse("savegame", text);
        assert_eq!(table.query_default(), "*");
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.query_field(0, 1), "0");
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let text = "2DA V1.0\r\n-1\r\nA B\r\nR1 1 2\r\n";
        let table = Table::parse("crlf", text);
        assert_eq!(table.query_field(0, 1), "2");
        assert_eq!(table.query_default(), "-1");
    }
}
