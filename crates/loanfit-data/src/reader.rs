//! CSV loan reader with schema and value validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::DataError;
use crate::record::{COLUMNS, LoanRecord, LoanTable};

/// Reads the loan dataset from a CSV file.
///
/// The header must name each of the 14 [`COLUMNS`] exactly once, in any
/// order. Every cell must parse to its field's type; there is no missing
/// value handling.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`DataError::SchemaMismatch`] | Header columns missing, unknown, or repeated |
/// | [`DataError::CsvParse`] | Malformed record or unparseable cell |
/// | [`DataError::NonFiniteValue`] | Float cell is NaN or infinite |
/// | [`DataError::EmptyDataset`] | Zero data rows after header |
pub struct LoanReader {
    path: PathBuf,
}

impl LoanReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`LoanTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<LoanTable, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|e| DataError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?.clone();
        self.check_header(&header)?;
        debug!(n_columns = header.len(), "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let raw = result.map_err(|e| self.parse_error(e))?;
            let record: LoanRecord = raw.deserialize(Some(&header)).map_err(|e| {
                let position = raw.position();
                DataError::CsvParse {
                    path: self.path.clone(),
                    line: position.map_or(0, csv::Position::line),
                    offset: position.map_or(0, csv::Position::byte),
                    source: e,
                }
            })?;
            if let Some(column) = record.first_non_finite() {
                return Err(DataError::NonFiniteValue {
                    path: self.path.clone(),
                    row_index,
                    column: column.to_string(),
                });
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(DataError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_rows = records.len(), "loan dataset loaded");
        Ok(LoanTable::new_unchecked(records))
    }

    fn check_header(&self, header: &csv::StringRecord) -> Result<(), DataError> {
        let mut seen = HashSet::new();
        let mut unexpected = Vec::new();
        for name in header {
            if !COLUMNS.contains(&name) || !seen.insert(name) {
                unexpected.push(name.to_string());
            }
        }
        let missing: Vec<String> = COLUMNS
            .iter()
            .filter(|c| !seen.contains(*c))
            .map(|c| (*c).to_string())
            .collect();
        if missing.is_empty() && unexpected.is_empty() {
            return Ok(());
        }
        Err(DataError::SchemaMismatch {
            path: self.path.clone(),
            missing,
            unexpected,
        })
    }

    fn parse_error(&self, e: csv::Error) -> DataError {
        DataError::CsvParse {
            path: self.path.clone(),
            line: e.position().map_or(0, csv::Position::line),
            offset: e.position().map_or(0, csv::Position::byte),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "credit.policy,purpose,int.rate,installment,log.annual.inc,dti,fico,days.with.cr.line,revol.bal,revol.util,inq.last.6mths,delinq.2yrs,pub.rec,not.fully.paid";

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_rows() {
        let csv = format!(
            "{HEADER}\n\
             1,debt_consolidation,0.1189,829.1,11.35040654,19.48,737,5639.958333,28854,52.1,0,0,0,0\n\
             1,credit_card,0.1071,228.22,11.08214255,14.29,707,2760,33623,76.7,0,0,0,0\n\
             0,all_other,0.1496,194.02,10.71441777,4,667,3180.041667,3839,76.8,0,0,1,1\n"
        );
        let f = write_csv(&csv);
        let table = LoanReader::new(f.path()).read().unwrap();
        assert_eq!(table.len(), 3);
        let first = &table.records()[0];
        assert!(first.credit_policy);
        assert_eq!(first.purpose, "debt_consolidation");
        assert_eq!(first.fico_score, 737);
        assert!((first.interest_rate - 0.1189).abs() < f64::EPSILON);
        assert!(table.records()[2].not_fully_paid);
        assert_eq!(table.records()[2].public_records, 1);
    }

    #[test]
    fn header_order_does_not_matter() {
        let csv = "not.fully.paid,purpose,credit.policy,int.rate,installment,log.annual.inc,dti,fico,days.with.cr.line,revol.bal,revol.util,inq.last.6mths,delinq.2yrs,pub.rec\n\
                   true,educational,false,0.12,100,10.5,3,700,1000,500,10,1,0,0\n";
        let f = write_csv(csv);
        let table = LoanReader::new(f.path()).read().unwrap();
        let record = &table.records()[0];
        assert!(record.not_fully_paid);
        assert!(!record.credit_policy);
        assert_eq!(record.purpose, "educational");
    }

    #[test]
    fn file_not_found_error() {
        let err = LoanReader::new(Path::new("/no/such/loan_data.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, DataError::FileNotFound { .. }));
    }

    #[test]
    fn schema_mismatch_lists_missing_and_unexpected() {
        let csv = HEADER.replace("fico", "fico_score") + "\n";
        let f = write_csv(&csv);
        let err = LoanReader::new(f.path()).read().unwrap_err();
        match err {
            DataError::SchemaMismatch {
                missing,
                unexpected,
                ..
            } => {
                assert_eq!(missing, vec!["fico".to_string()]);
                assert_eq!(unexpected, vec!["fico_score".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_column_is_unexpected() {
        let csv = format!("{HEADER},dti\n");
        let f = write_csv(&csv);
        let err = LoanReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            DataError::SchemaMismatch { ref unexpected, .. } if unexpected == &["dti".to_string()]
        ));
    }

    #[test]
    fn bad_flag_is_a_parse_error() {
        let csv = format!("{HEADER}\n2,credit_card,0.1,100,10,1,700,100,10,10,0,0,0,0\n");
        let f = write_csv(&csv);
        let err = LoanReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, DataError::CsvParse { line: 2, .. }));
    }

    #[test]
    fn empty_cell_is_a_parse_error() {
        let csv = format!("{HEADER}\n1,credit_card,0.1,100,10,1,,100,10,10,0,0,0,0\n");
        let f = write_csv(&csv);
        let err = LoanReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, DataError::CsvParse { .. }));
    }

    #[test]
    fn empty_purpose_is_a_parse_error() {
        for purpose in ["", "   "] {
            let csv = format!("{HEADER}\n1,{purpose},0.1,100,10,1,700,100,10,10,0,0,0,0\n");
            let f = write_csv(&csv);
            let err = LoanReader::new(f.path()).read().unwrap_err();
            assert!(matches!(err, DataError::CsvParse { line: 2, .. }), "{err:?}");
        }
    }

    #[test]
    fn short_row_is_a_parse_error() {
        let csv = format!("{HEADER}\n1,credit_card,0.1\n");
        let f = write_csv(&csv);
        let err = LoanReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, DataError::CsvParse { .. }));
    }

    #[test]
    fn nan_is_rejected() {
        let csv = format!("{HEADER}\n1,credit_card,NaN,100,10,1,700,100,10,10,0,0,0,0\n");
        let f = write_csv(&csv);
        let err = LoanReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFiniteValue { row_index: 0, ref column, .. } if column == "int.rate"
        ));
    }

    #[test]
    fn empty_dataset_error() {
        let f = write_csv(&format!("{HEADER}\n"));
        let err = LoanReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset { .. }));
    }
}
