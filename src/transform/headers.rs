use crate::diagnostics::{Diagnostics, Stage};
use crate::extract::{ColumnLabel, MergedTable};
use std::collections::HashSet;

/// Lowercase, trim, and turn spaces, hyphens and slashes into underscores.
pub fn canonical_name(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .replace([' ', '-', '/'], "_")
}

/// Promote the first row to the header when the current labels carry no
/// information, then canonicalize every label.
pub fn normalize_headers(table: MergedTable, diag: &mut Diagnostics) -> MergedTable {
    let MergedTable { columns, mut rows } = table;

    let mut labels: Vec<String> = columns.iter().map(ToString::to_string).collect();
    if let Some(candidates) = header_candidates(&columns, &rows) {
        diag.debug(
            Stage::Headers,
            format!("promoting first row to header: {:?}", candidates),
        );
        rows.remove(0);
        labels = candidates;
    }

    let columns = dedupe(labels.iter().map(|l| canonical_name(l)).collect(), diag)
        .into_iter()
        .map(ColumnLabel::Name)
        .collect();
    MergedTable { columns, rows }
}

/// Tokens of row 0 when the labels are all numeric/"unnamed" placeholders and
/// at least one token is real text.
fn header_candidates(columns: &[ColumnLabel], rows: &[Vec<Option<String>>]) -> Option<Vec<String>> {
    if columns.is_empty() || !columns.iter().all(ColumnLabel::is_placeholder) {
        return None;
    }
    let first = rows.first()?;
    let candidates: Vec<String> = first
        .iter()
        .map(|cell| cell.as_deref().unwrap_or_default().trim().to_string())
        .collect();
    let informative = candidates
        .iter()
        .any(|h| !h.is_empty() && !h.eq_ignore_ascii_case("nan"));
    informative.then_some(candidates)
}

/// Blank names become `column_<idx>`; repeats get `_2`, `_3`, … in order.
fn dedupe(names: Vec<String>, diag: &mut Diagnostics) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());

    for (idx, name) in names.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("column_{}", idx)
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        if candidate != base {
            diag.warn(
                Stage::Headers,
                format!("duplicate column name {:?} renamed to {:?}", base, candidate),
            );
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    fn names(table: &MergedTable) -> Vec<String> {
        table.columns.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name(" Customer Code "), "customer_code");
        assert_eq!(canonical_name("Customer-Code"), "customer_code");
        assert_eq!(canonical_name("Customer/Code"), "customer_code");
        assert_eq!(canonical_name("Date of Restructure"), "date_of_restructure");
    }

    #[test]
    fn test_promotes_first_row_over_placeholders() {
        let table = MergedTable {
            columns: vec![
                ColumnLabel::Position(1),
                ColumnLabel::name("Unnamed: 1"),
                ColumnLabel::name("unnamed: 2"),
            ],
            rows: vec![
                cells(&["Row Number", "As-Of Date", "Customer Code"]),
                cells(&["1", "20250630", "10023"]),
            ],
        };
        let mut diag = Diagnostics::new();

        let out = normalize_headers(table, &mut diag);

        assert_eq!(names(&out), vec!["row_number", "as_of_date", "customer_code"]);
        assert_eq!(out.rows, vec![cells(&["1", "20250630", "10023"])]);
        assert!(diag.contains(Stage::Headers, "promoting"));
    }

    #[test]
    fn test_no_promotion_for_nan_or_blank_row() {
        let table = MergedTable {
            columns: vec![ColumnLabel::Position(0), ColumnLabel::Position(1)],
            rows: vec![cells(&["NaN", ""]), cells(&["1", "2"])],
        };
        let mut diag = Diagnostics::new();

        let out = normalize_headers(table, &mut diag);

        assert_eq!(names(&out), vec!["0", "1"]);
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn test_real_labels_are_kept() {
        let table = MergedTable {
            columns: vec![ColumnLabel::name("Customer Code"), ColumnLabel::Position(1)],
            rows: vec![cells(&["Row Number", "x"])],
        };
        let mut diag = Diagnostics::new();

        let out = normalize_headers(table, &mut diag);

        assert_eq!(names(&out), vec!["customer_code", "1"]);
        assert_eq!(out.rows.len(), 1);
    }

    #[test]
    fn test_second_pass_does_not_promote_again() {
        let table = MergedTable {
            columns: vec![ColumnLabel::Position(0), ColumnLabel::Position(1)],
            rows: vec![
                cells(&["row_number", "as_of_date"]),
                cells(&["1", "20250630"]),
                cells(&["2", "20250630"]),
            ],
        };
        let mut diag = Diagnostics::new();

        let once = normalize_headers(table, &mut diag);
        let twice = normalize_headers(once.clone(), &mut diag);

        assert_eq!(once, twice);
        assert_eq!(twice.rows.len(), 2);
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let table = MergedTable {
            columns: vec![
                ColumnLabel::name("Customer Code"),
                ColumnLabel::name("customer-code"),
                ColumnLabel::name("customer_code_2"),
                ColumnLabel::name("customer/code"),
                ColumnLabel::name("  "),
            ],
            rows: vec![],
        };
        let mut diag = Diagnostics::new();

        let out = normalize_headers(table, &mut diag);

        assert_eq!(
            names(&out),
            vec![
                "customer_code",
                "customer_code_2",
                "customer_code_2_2",
                "customer_code_3",
                "column_4"
            ]
        );
        assert!(diag.contains(Stage::Headers, "duplicate column name"));
    }
}
