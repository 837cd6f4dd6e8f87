use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RangeError;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9:]").expect("Invalid A1 filter regex"));
static A1_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z]+\d*(:[A-Z]+\d*)?$").expect("Invalid A1 grammar regex")
});

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: u32) -> String {
    let mut label = String::new();
    let mut n = u64::from(col) + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
///
/// Labels are bijective base-26 numbers: there is no zero digit, so every
/// letter after the first adds one before shifting. `A` is 0, `AZ` is 51 and
/// `BA` is 52. Returns `None` for an empty label, a non-letter, or a label too
/// long to fit a `u32`.
pub fn col_from_label(label: &str) -> Option<u32> {
    let mut col: Option<u32> = None;

    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_lowercase() as u32 - 'a' as u32;
        col = Some(match col {
            None => digit,
            Some(prev) => prev.checked_add(1)?.checked_mul(26)?.checked_add(digit)?,
        });
    }

    col
}

/// Which axis a dimension operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

/// A half-open span of rows or columns on one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i32,
    pub dimension: Dimension,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<u32>,
}

impl DimensionRange {
    pub fn new(sheet_id: i32, dimension: Dimension, start: u32, end: u32) -> Self {
        Self {
            sheet_id,
            dimension,
            start_index: Some(start),
            end_index: Some(end),
        }
    }
}

/// A rectangular, half-open region of a sheet.
///
/// Start bounds are inclusive and end bounds exclusive, all zero-based. A
/// missing bound means the region is unbounded on that side, so a range with
/// no row bounds covers whole columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    /// Range covering the whole sheet
    pub fn whole_sheet(sheet_id: i32) -> Self {
        Self {
            sheet_id,
            ..Self::default()
        }
    }

    /// Range from explicit half-open bounds
    pub fn from_bounds(
        sheet_id: i32,
        start_row: Option<u32>,
        start_column: Option<u32>,
        end_row: Option<u32>,
        end_column: Option<u32>,
    ) -> Self {
        Self {
            sheet_id,
            start_row_index: start_row,
            start_column_index: start_column,
            end_row_index: end_row,
            end_column_index: end_column,
        }
    }

    /// Create from A1 notation (e.g. "A1", "C1:D5", "A:B")
    pub fn from_a1(sheet_id: i32, notation: &str) -> Result<Self, RangeError> {
        parse_grid_range(sheet_id, notation)
    }

    /// Number of rows covered, when both row bounds are known
    pub fn row_span(&self) -> Option<u32> {
        self.end_row_index?.checked_sub(self.start_row_index?)
    }

    /// Number of columns covered, when both column bounds are known
    pub fn col_span(&self) -> Option<u32> {
        self.end_column_index?.checked_sub(self.start_column_index?)
    }

    /// Check if this range is exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.row_span() == Some(1) && self.col_span() == Some(1)
    }

    /// Project the range onto one axis
    pub fn dimension_range(&self, dimension: Dimension) -> DimensionRange {
        let (start_index, end_index) = match dimension {
            Dimension::Rows => (self.start_row_index, self.end_row_index),
            Dimension::Columns => (self.start_column_index, self.end_column_index),
        };
        DimensionRange {
            sheet_id: self.sheet_id,
            dimension,
            start_index,
            end_index,
        }
    }

    /// Convert back to A1 notation. Ranges without column bounds have no A1 form.
    pub fn to_a1(&self) -> Option<String> {
        let start_col = self.start_column_index?;
        let last_col = self.end_column_index?.checked_sub(1)?;

        if self.is_single_cell() {
            let row = self.start_row_index? + 1;
            return Some(format!("{}{}", col_to_label(start_col), row));
        }
        if start_col == last_col && self.start_row_index.is_none() && self.end_row_index.is_none()
        {
            return Some(col_to_label(start_col));
        }

        let mut a1 = col_to_label(start_col);
        if let Some(row) = self.start_row_index {
            a1.push_str(&(row + 1).to_string());
        }
        a1.push(':');
        a1.push_str(&col_to_label(last_col));
        if let Some(row) = self.end_row_index {
            a1.push_str(&row.to_string());
        }
        Some(a1)
    }
}

impl fmt::Display for GridRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_a1() {
            Some(a1) => write!(f, "{}", a1),
            None => write!(f, "sheet {} (unbounded)", self.sheet_id),
        }
    }
}

/// One side of a range: column letters plus optional row digits
struct Endpoint {
    col: u32,
    row: Option<u32>,
}

fn parse_endpoint(part: &str, notation: &str) -> Result<Endpoint, RangeError> {
    let letters: String = part.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return Err(RangeError::Malformed(notation.to_string()));
    }
    let col =
        col_from_label(&letters).ok_or_else(|| RangeError::OutOfRange(notation.to_string()))?;

    let digits: String = part.chars().filter(|c| c.is_ascii_digit()).collect();
    let row = if digits.is_empty() {
        None
    } else {
        let row: u32 = digits
            .parse()
            .map_err(|_| RangeError::OutOfRange(notation.to_string()))?;
        if row == 0 {
            return Err(RangeError::OutOfRange(notation.to_string())); // Rows are 1-indexed
        }
        Some(row)
    };

    Ok(Endpoint { col, row })
}

/// Parse A1 notation into a half-open [`GridRange`] on `sheet_id`.
///
/// Characters outside `[A-Za-z0-9:]` are dropped before validation. A single
/// endpoint (`"A1"`, `"AZ"`) widens to a one-cell or one-column span. With two
/// endpoints the closing column becomes exclusive and the closing row is taken
/// as written, so `"C1:D5"` covers rows `0..5` and columns `2..4`.
pub fn parse_grid_range(sheet_id: i32, notation: &str) -> Result<GridRange, RangeError> {
    if notation.is_empty() {
        return Err(RangeError::Empty);
    }
    let cleaned = DISALLOWED.replace_all(notation, "");
    if !A1_GRAMMAR.is_match(&cleaned) {
        return Err(RangeError::Malformed(notation.to_string()));
    }

    let mut parts = cleaned.splitn(2, ':');
    let first = parse_endpoint(parts.next().unwrap_or_default(), &cleaned)?;
    let second = parts
        .next()
        .map(|part| parse_endpoint(part, &cleaned))
        .transpose()?;

    let out_of_range = || RangeError::OutOfRange(cleaned.to_string());
    let start_row = first.row.map(|row| row - 1);
    let range = match second {
        Some(end) => GridRange::from_bounds(
            sheet_id,
            start_row,
            Some(first.col),
            end.row,
            Some(end.col.checked_add(1).ok_or_else(out_of_range)?),
        ),
        None => GridRange::from_bounds(
            sheet_id,
            start_row,
            Some(first.col),
            first.row,
            Some(first.col.checked_add(1).ok_or_else(out_of_range)?),
        ),
    };

    tracing::debug!(
        "Converted [{}] into {:?},{:?},{:?},{:?}",
        cleaned,
        range.start_row_index,
        range.start_column_index,
        range.end_row_index,
        range.end_column_index
    );
    Ok(range)
}
