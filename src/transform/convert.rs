use crate::diagnostics::{Diagnostics, Stage};
use crate::extract::MergedTable;
use crate::transform::{date_parser, utils};
use arrow::{
    array::{ArrayRef, Date32Builder, Int32Builder, Int64Builder, StringBuilder},
    datatypes::{DataType, Date32Type, Field, Schema},
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

/// Arrow type a canonical column is coerced to.
pub fn target_type(column: &str) -> DataType {
    match column {
        "row_number" => DataType::Int32,
        "customer_code" => DataType::Int64,
        "as_of_date" | "date_of_restructure" => DataType::Date32,
        _ => DataType::Utf8,
    }
}

/// Convert string columns into their final types.
///
/// A cell that cannot be converted becomes null; each affected column gets
/// one warning with the failure count and a few sample values.
pub fn convert_to_final_types(
    table: &MergedTable,
    diag: &mut Diagnostics,
) -> Result<RecordBatch, ArrowError> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut out: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for (idx, label) in table.columns.iter().enumerate() {
        let name = label.to_string();
        let ty = target_type(&name);
        let cells = table
            .rows
            .iter()
            .map(|row| row.get(idx).and_then(|c| c.as_deref()));
        let mut failures = Failures::default();

        let array: ArrayRef = match ty {
            DataType::Int32 => {
                let mut b = Int32Builder::with_capacity(table.num_rows());
                for cell in cells {
                    let v = cell.and_then(|s| {
                        let parsed = utils::parse_integer(s).and_then(|v| i32::try_from(v).ok());
                        failures.check(s, parsed)
                    });
                    b.append_option(v);
                }
                Arc::new(b.finish())
            }
            DataType::Int64 => {
                let mut b = Int64Builder::with_capacity(table.num_rows());
                for cell in cells {
                    let v = cell.and_then(|s| failures.check(s, utils::parse_integer(s)));
                    b.append_option(v);
                }
                Arc::new(b.finish())
            }
            DataType::Date32 => {
                let mut b = Date32Builder::with_capacity(table.num_rows());
                for cell in cells {
                    let v = cell.and_then(|s| {
                        failures.check(s, date_parser::parse_embedded_date(s))
                    });
                    b.append_option(v.map(Date32Type::from_naive_date));
                }
                Arc::new(b.finish())
            }
            _ => {
                let mut b = StringBuilder::new();
                for cell in cells {
                    b.append_option(cell);
                }
                Arc::new(b.finish())
            }
        };

        if failures.count > 0 {
            diag.warn(
                Stage::Coercion,
                format!(
                    "{} of {} values in {} could not be converted to {} and were set to null (e.g. {:?})",
                    failures.count,
                    table.num_rows(),
                    name,
                    ty,
                    failures.samples
                ),
            );
        }
        fields.push(Field::new(name, ty, true));
        out.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), out, &options)
}

const MAX_SAMPLES: usize = 3;

#[derive(Default)]
struct Failures {
    count: usize,
    samples: Vec<String>,
}

impl Failures {
    /// Pass `parsed` through, remembering `raw` if it failed.
    fn check<T>(&mut self, raw: &str, parsed: Option<T>) -> Option<T> {
        if parsed.is_none() && !raw.trim().is_empty() {
            self.count += 1;
            if self.samples.len() < MAX_SAMPLES {
                self.samples.push(raw.to_string());
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ColumnLabel;
    use arrow::array::{Array, Date32Array, Int32Array, Int64Array, StringArray};
    use chrono::NaiveDate;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> MergedTable {
        MergedTable {
            columns: columns.iter().map(|c| ColumnLabel::name(*c)).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        }
    }

    #[test]
    fn test_converts_business_columns() {
        let input = table(
            &["row_number", "as_of_date", "customer_code", "date_of_restructure", "branch"],
            &[
                &[Some("1"), Some("20250630"), Some("9000000001"), Some("2 20240115"), Some("North")],
                &[Some("two"), Some("30/06/2025"), Some("ACME"), None, None],
            ],
        );
        let mut diag = Diagnostics::new();

        let batch = convert_to_final_types(&input, &mut diag).unwrap();

        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int32);
        assert_eq!(schema.field(2).data_type(), &DataType::Int64);
        assert_eq!(schema.field(4).data_type(), &DataType::Utf8);
        assert!(schema.fields().iter().all(|f| f.is_nullable()));

        let rn = batch.column(0).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(rn.value(0), 1);
        assert!(rn.is_null(1));

        let asof = batch.column(1).as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(asof.value_as_date(0), NaiveDate::from_ymd_opt(2025, 6, 30));
        assert!(asof.is_null(1));

        let cc = batch.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(cc.value(0), 9_000_000_001);
        assert!(cc.is_null(1));

        let dor = batch.column(3).as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(dor.value_as_date(0), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert!(dor.is_null(1));

        let branch = batch.column(4).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(branch.value(0), "North");
        assert!(branch.is_null(1));

        assert!(diag.contains(Stage::Coercion, "1 of 2 values in customer_code"));
        assert!(diag.contains(Stage::Coercion, "ACME"));
        // plain nulls are not failures
        assert!(!diag.contains(Stage::Coercion, "date_of_restructure"));
    }

    #[test]
    fn test_row_number_overflow_is_null() {
        let input = table(&["row_number"], &[&[Some("3000000000")]]);
        let mut diag = Diagnostics::new();

        let batch = convert_to_final_types(&input, &mut diag).unwrap();

        assert!(batch.column(0).is_null(0));
    }

    #[test]
    fn test_empty_table_keeps_schema() {
        let input = table(&["customer_code", "note"], &[]);
        let mut diag = Diagnostics::new();

        let batch = convert_to_final_types(&input, &mut diag).unwrap();

        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 2);
    }
}
