use crate::error::{Result, SheetError};

/// Parse A1-style cell notation (e.g., "A1", "Z99", "BS2")
/// Returns (row, column) as 0-based indices
pub fn parse_a1(notation: &str) -> Result<(usize, usize)> {
    let upper = notation.to_ascii_uppercase();
    let split_pos = upper
        .bytes()
        .position(|b| b.is_ascii_digit())
        .ok_or_else(|| SheetError::InvalidCellNotation(notation.to_string()))?;

    // Find where letters end and numbers begin
    let (col_part, row_part) = upper.split_at(split_pos);
    if col_part.is_empty() {
        return Err(SheetError::InvalidCellNotation(notation.to_string()));
    }

    let col = parse_column_letters(col_part)?;
    let row = row_part
        .parse::<usize>()
        .map_err(|_| SheetError::InvalidCellNotation(notation.to_string()))?;

    // Convert to 0-based indexing (A1 = 0,0)
    if row == 0 {
        return Err(SheetError::InvalidCellNotation(notation.to_string()));
    }

    Ok((row - 1, col))
}

/// Convert a 0-based column index to its letters: 0 -> A, 25 -> Z, 26 -> AA
#[must_use]
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Convert column letters to 0-based column index
/// A=0, B=1, ... Z=25, AA=26, AB=27, ...
fn parse_column_letters(col_str: &str) -> Result<usize> {
    let mut col = 0usize;

    for b in col_str.bytes() {
        if !b.is_ascii_uppercase() {
            return Err(SheetError::InvalidCellNotation(col_str.to_string()));
        }
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add((b - b'A' + 1) as usize))
            .ok_or_else(|| SheetError::InvalidCellNotation(col_str.to_string()))?;
    }

    Ok(col - 1)
}
