use std::fmt;

/// Label of a column as reported by a detection backend.
///
/// Backends that do not know the header hand out positional labels; the
/// header stage later decides whether the first data row is the real header.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnLabel {
    Position(usize),
    Name(String),
}

impl ColumnLabel {
    pub fn name(s: impl Into<String>) -> Self {
        ColumnLabel::Name(s.into())
    }

    /// Numeric labels and "Unnamed: N" style labels carry no header information.
    pub fn is_placeholder(&self) -> bool {
        match self {
            ColumnLabel::Position(_) => true,
            ColumnLabel::Name(s) => s.trim().to_lowercase().starts_with("unnamed"),
        }
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnLabel::Position(i) => write!(f, "{}", i),
            ColumnLabel::Name(s) => f.write_str(s),
        }
    }
}

pub type Row = Vec<Option<String>>;

/// One table region as returned by a single backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<ColumnLabel>,
    /// Every row has exactly `columns.len()` cells.
    pub rows: Vec<Row>,
    /// 1-based page the region was found on, when the backend reports it.
    pub page: Option<u32>,
}

impl RawTable {
    /// Build from a text grid, padding ragged rows with nulls and turning
    /// blank cells into nulls. Columns get positional labels.
    pub fn from_grid(grid: Vec<Vec<String>>, page: Option<u32>) -> Self {
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let rows = grid
            .into_iter()
            .map(|row| {
                let mut cells: Row = row
                    .into_iter()
                    .map(|cell| {
                        let trimmed = cell.trim();
                        if trimmed.is_empty() {
                            None
                        } else {
                            Some(trimmed.to_string())
                        }
                    })
                    .collect();
                cells.resize(width, None);
                cells
            })
            .collect();
        RawTable {
            columns: (0..width).map(ColumnLabel::Position).collect(),
            rows,
            page,
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// No rows, or no non-null cell anywhere.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_none)
    }
}

/// All surviving raw tables stacked into one grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedTable {
    pub columns: Vec<ColumnLabel>,
    pub rows: Vec<Row>,
}

impl MergedTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| matches!(c, ColumnLabel::Name(n) if n == name))
    }

    /// First `n` rows rendered as a plain-text grid, for console previews.
    pub fn preview(&self, n: usize) -> String {
        let header: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        let mut out = header.join(" | ");
        for row in self.rows.iter().take(n) {
            out.push('\n');
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("<null>")).collect();
            out.push_str(&cells.join(" | "));
        }
        out
    }
}
