use crate::extract::raw_table::{ColumnLabel, MergedTable, RawTable, Row};

/// Stack `tables` vertically.
///
/// Narrower tables are padded with trailing null columns up to the widest
/// table. When the tables disagree on labels, columns are aligned purely by
/// position and relabelled `0..width`. Row order is table order, then each
/// table's own row order.
pub fn merge_tables(tables: Vec<RawTable>) -> MergedTable {
    let max_cols = tables.iter().map(RawTable::width).max().unwrap_or(0);

    let padded: Vec<(Vec<ColumnLabel>, Vec<Row>)> = tables
        .into_iter()
        .map(|t| pad_to(t, max_cols))
        .map(sort_positional)
        .collect();

    let shared_labels = padded
        .first()
        .map(|(labels, _)| labels.clone())
        .filter(|first| padded.iter().all(|(labels, _)| labels == first));
    let columns =
        shared_labels.unwrap_or_else(|| (0..max_cols).map(ColumnLabel::Position).collect());

    let total: usize = padded.iter().map(|(_, rows)| rows.len()).sum();
    let mut rows = Vec::with_capacity(total);
    for (_, table_rows) in padded {
        rows.extend(table_rows);
    }

    MergedTable { columns, rows }
}

fn pad_to(table: RawTable, width: usize) -> (Vec<ColumnLabel>, Vec<Row>) {
    let RawTable {
        mut columns,
        mut rows,
        ..
    } = table;
    for idx in columns.len()..width {
        columns.push(ColumnLabel::Position(idx));
    }
    for row in rows.iter_mut() {
        row.resize(width, None);
    }
    (columns, rows)
}

/// Order purely positional tables by column index.
fn sort_positional((columns, rows): (Vec<ColumnLabel>, Vec<Row>)) -> (Vec<ColumnLabel>, Vec<Row>) {
    if !columns.iter().all(|c| matches!(c, ColumnLabel::Position(_))) {
        return (columns, rows);
    }
    let mut order: Vec<usize> = (0..columns.len()).collect();
    order.sort_by(|&a, &b| columns[a].cmp(&columns[b]));
    if order.iter().enumerate().all(|(i, &j)| i == j) {
        return (columns, rows);
    }

    let columns = order.iter().map(|&j| columns[j].clone()).collect();
    let rows = rows
        .into_iter()
        .map(|row| order.iter().map(|&j| row[j].clone()).collect())
        .collect();
    (columns, rows)
}
