//! Row expansion: splits multi-line cells into aligned sub-rows.
//!
//! Table sources sometimes merge several logical rows into one cell,
//! separated by embedded line breaks. Expansion restores the original
//! row alignment: a row whose widest cell splits into N segments becomes
//! N sub-rows, with shorter columns padded with empty strings. Rows are
//! processed independently and emitted in input order.

/// Expand every row of a grid. Column count and order are preserved.
pub fn expand_rows(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    rows.iter().flat_map(|row| expand_row(row)).collect()
}

/// Expand a single row into one or more sub-rows.
///
/// A row with no embedded line breaks passes through byte-identical.
/// Otherwise, sub-row `i` holds segment `i` of each cell, or the empty
/// string where a cell has fewer segments. Only segment 0 of a
/// single-segment cell is real data; its later sub-row positions are
/// empty, never a repeat of the value.
pub fn expand_row(row: &[String]) -> Vec<Vec<String>> {
    let segments: Vec<Vec<&str>> = row.iter().map(|cell| cell.split('\n').collect()).collect();
    let height = segments.iter().map(Vec::len).max().unwrap_or(1);

    if height <= 1 {
        return vec![row.to_vec()];
    }

    (0..height)
        .map(|i| {
            segments
                .iter()
                .map(|parts| parts.get(i).copied().unwrap_or("").to_string())
                .collect()
        })
        .collect()
}
