//! Full chart set rendered from an in-memory loan table.

use loanfit_data::{LoanRecord, LoanTable};
use loanfit_plot::{ChartConfig, PlotError, render_loan_charts};

fn record(i: u32) -> LoanRecord {
    let purposes = ["debt_consolidation", "credit_card", "all_other", "educational"];
    let fico = 640 + (i * 7) % 150;
    LoanRecord {
        credit_policy: fico > 680,
        purpose: purposes[(i % 4) as usize].to_string(),
        interest_rate: 0.06 + f64::from(850 - fico) / 1500.0,
        installment: 150.0 + f64::from(i),
        log_annual_income: 11.0,
        debt_to_income_ratio: 12.5,
        fico_score: fico,
        days_with_credit_line: 4000.0,
        revolving_balance: 12_000.0,
        revolving_utilization: 40.0,
        inquiries_last_6_months: i % 3,
        delinquencies_2yrs: 0,
        public_records: 0,
        not_fully_paid: i % 5 == 0,
    }
}

fn table(n: u32) -> LoanTable {
    LoanTable::from_records((0..n).map(record).collect()).unwrap()
}

#[test]
fn writes_five_named_svgs_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("charts");
    let paths = render_loan_charts(&table(60), &ChartConfig::new().with_bins(10), &out).unwrap();

    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "fico_by_credit_policy.svg",
            "fico_by_not_fully_paid.svg",
            "purpose_counts.svg",
            "fico_vs_int_rate_joint.svg",
            "fico_vs_int_rate_lm.svg",
        ]
    );
    for path in &paths {
        assert!(path.starts_with(&out));
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.starts_with("<svg"), "{}", path.display());
    }
    let legend = std::fs::read_to_string(&paths[0]).unwrap();
    assert!(legend.contains("credit.policy = 1"));
    assert!(legend.contains("credit.policy = 0"));
}

#[test]
fn empty_table_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = render_loan_charts(&table(0), &ChartConfig::new(), dir.path()).unwrap_err();
    assert!(matches!(err, PlotError::EmptySeries { .. }));
}

#[test]
fn zero_bins_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err =
        render_loan_charts(&table(10), &ChartConfig::new().with_bins(0), dir.path()).unwrap_err();
    assert!(matches!(err, PlotError::InvalidBinCount { bins: 0 }));
}

#[test]
fn output_dir_under_a_file_fails() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = render_loan_charts(&table(10), &ChartConfig::new(), &file.path().join("sub"))
        .unwrap_err();
    assert!(matches!(err, PlotError::OutputDir { .. }));
}
