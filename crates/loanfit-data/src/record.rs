//! Loan application records and the loaded table.

use serde::{Deserialize, Deserializer, de};

use crate::frame::{Column, Frame};
use crate::DataError;

/// CSV header names, in the order the public dataset ships them.
pub const COLUMNS: [&str; 14] = [
    "credit.policy",
    "purpose",
    "int.rate",
    "installment",
    "log.annual.inc",
    "dti",
    "fico",
    "days.with.cr.line",
    "revol.bal",
    "revol.util",
    "inq.last.6mths",
    "delinq.2yrs",
    "pub.rec",
    "not.fully.paid",
];

/// One loan application.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoanRecord {
    /// Meets the lender's underwriting criteria.
    #[serde(rename = "credit.policy", deserialize_with = "flag")]
    pub credit_policy: bool,
    #[serde(deserialize_with = "non_empty")]
    pub purpose: String,
    /// Proportion, e.g. 0.1189 for 11.89%.
    #[serde(rename = "int.rate")]
    pub interest_rate: f64,
    pub installment: f64,
    /// Natural log of self-reported annual income.
    #[serde(rename = "log.annual.inc")]
    pub log_annual_income: f64,
    #[serde(rename = "dti")]
    pub debt_to_income_ratio: f64,
    #[serde(rename = "fico")]
    pub fico_score: u32,
    #[serde(rename = "days.with.cr.line")]
    pub days_with_credit_line: f64,
    #[serde(rename = "revol.bal")]
    pub revolving_balance: f64,
    #[serde(rename = "revol.util")]
    pub revolving_utilization: f64,
    #[serde(rename = "inq.last.6mths")]
    pub inquiries_last_6_months: u32,
    #[serde(rename = "delinq.2yrs")]
    pub delinquencies_2yrs: u32,
    #[serde(rename = "pub.rec")]
    pub public_records: u32,
    /// Label: the loan was not paid back in full.
    #[serde(rename = "not.fully.paid", deserialize_with = "flag")]
    pub not_fully_paid: bool,
}

impl LoanRecord {
    /// Name of the first float column holding NaN or infinity.
    pub(crate) fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("int.rate", self.interest_rate),
            ("installment", self.installment),
            ("log.annual.inc", self.log_annual_income),
            ("dti", self.debt_to_income_ratio),
            ("days.with.cr.line", self.days_with_credit_line),
            ("revol.bal", self.revolving_balance),
            ("revol.util", self.revolving_utilization),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// `0`/`1` flags, with `true`/`false` also accepted.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"0, 1, true or false",
        )),
    }
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let value = raw.trim();
    if value.is_empty() {
        return Err(de::Error::invalid_length(0, &"a non-empty category"));
    }
    Ok(value.to_string())
}

/// The immutable set of loaded loan records.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTable {
    records: Vec<LoanRecord>,
}

impl LoanTable {
    /// Wrap already-validated records.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NonFiniteField`] if a float field is NaN or infinite.
    pub fn from_records(records: Vec<LoanRecord>) -> Result<Self, DataError> {
        for (row_index, record) in records.iter().enumerate() {
            if let Some(column) = record.first_non_finite() {
                return Err(DataError::NonFiniteField {
                    row_index,
                    column: column.to_string(),
                });
            }
        }
        Ok(Self { records })
    }

    pub(crate) fn new_unchecked(records: Vec<LoanRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[LoanRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columnar view using the CSV names; flags become 0.0/1.0 and `purpose`
    /// is the only categorical column.
    #[must_use]
    pub fn to_frame(&self) -> Frame {
        let numeric = |get: fn(&LoanRecord) -> f64| {
            Column::Numeric(self.records.iter().map(get).collect())
        };
        let columns = vec![
            numeric(|r| f64::from(u8::from(r.credit_policy))),
            Column::Categorical(self.records.iter().map(|r| r.purpose.clone()).collect()),
            numeric(|r| r.interest_rate),
            numeric(|r| r.installment),
            numeric(|r| r.log_annual_income),
            numeric(|r| r.debt_to_income_ratio),
            numeric(|r| f64::from(r.fico_score)),
            numeric(|r| r.days_with_credit_line),
            numeric(|r| r.revolving_balance),
            numeric(|r| r.revolving_utilization),
            numeric(|r| f64::from(r.inquiries_last_6_months)),
            numeric(|r| f64::from(r.delinquencies_2yrs)),
            numeric(|r| f64::from(r.public_records)),
            numeric(|r| f64::from(u8::from(r.not_fully_paid))),
        ];
        Frame::from_parts(COLUMNS.iter().map(|c| (*c).to_string()).collect(), columns)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_record(purpose: &str, fico: u32, not_fully_paid: bool) -> LoanRecord {
        LoanRecord {
            credit_policy: true,
            purpose: purpose.to_string(),
            interest_rate: 0.1189,
            installment: 829.1,
            log_annual_income: 11.35,
            debt_to_income_ratio: 19.48,
            fico_score: fico,
            days_with_credit_line: 5639.958,
            revolving_balance: 28854.0,
            revolving_utilization: 52.1,
            inquiries_last_6_months: 0,
            delinquencies_2yrs: 0,
            public_records: 0,
            not_fully_paid,
        }
    }

    #[test]
    fn frame_has_every_column_in_csv_order() {
        let table = LoanTable::from_records(vec![
            sample_record("credit_card", 737, false),
            sample_record("educational", 682, true),
        ])
        .unwrap();
        let frame = table.to_frame();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.column_names(), COLUMNS.map(String::from));
        assert_eq!(
            frame.column("fico").unwrap().as_numeric().unwrap(),
            &[737.0, 682.0]
        );
        assert_eq!(
            frame.column("not.fully.paid").unwrap().as_numeric().unwrap(),
            &[0.0, 1.0]
        );
        assert!(frame.column("purpose").unwrap().as_categorical().is_some());
    }

    #[test]
    fn non_finite_records_are_rejected() {
        let mut record = sample_record("all_other", 700, false);
        record.debt_to_income_ratio = f64::NAN;
        let err = LoanTable::from_records(vec![record]).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFiniteField { row_index: 0, ref column } if column == "dti"
        ));
        assert_eq!(err.to_string(), "non-finite value in record 0, column dti");
    }
}
