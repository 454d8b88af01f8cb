use crate::diagnostics::{Diagnostics, Stage};
use crate::extract::{ColumnLabel, MergedTable};
use once_cell::sync::Lazy;
use regex::Regex;

/// A row number glued onto a date: "1 20250630", "12-20250630", "3|20240131".
static ROW_AND_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9]+)[\s\-_/.,;:|]+([0-9]{8})\s*$").expect("valid regex")
});

/// Split `as_of_date` cells that swallowed the row number.
///
/// Only runs when the table has no `row_number` column at all. Matching cells
/// give their leading integer to a new `row_number` column (inserted before
/// `as_of_date`) and keep just the 8-digit run; other cells are untouched.
pub fn split_row_number_from_date(table: MergedTable, diag: &mut Diagnostics) -> MergedTable {
    if table.column_index("row_number").is_some() {
        return table;
    }
    let Some(date_idx) = table.column_index("as_of_date") else {
        return table;
    };

    let MergedTable { mut columns, mut rows } = table;
    let mut row_numbers: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut split = 0usize;

    for row in rows.iter_mut() {
        let parts = row[date_idx]
            .as_deref()
            .and_then(|cell| ROW_AND_DATE.captures(cell))
            .map(|caps| (caps[1].to_string(), caps[2].to_string()));
        match parts {
            Some((number, date)) => {
                row[date_idx] = Some(date);
                row_numbers.push(Some(number));
                split += 1;
            }
            None => row_numbers.push(None),
        }
    }

    if split == 0 {
        return MergedTable { columns, rows };
    }

    columns.insert(date_idx, ColumnLabel::name("row_number"));
    for (row, number) in rows.iter_mut().zip(row_numbers) {
        row.insert(date_idx, number);
    }
    diag.info(
        Stage::Repair,
        format!(
            "split row_number out of {} of {} as_of_date cells",
            split,
            rows.len()
        ),
    );
    MergedTable { columns, rows }
}
