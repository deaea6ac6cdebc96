//! Text summaries of a frame: column info, numeric statistics, first rows.

use std::fmt;

use crate::frame::Frame;

/// Name, non-null count and dtype of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: &'static str,
}

/// Column overview, see [`Frame::info`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub n_rows: usize,
    pub columns: Vec<ColumnInfo>,
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1); NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Per-column statistics, see [`Frame::describe`].
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub columns: Vec<ColumnStats>,
}

/// The first rows of a frame, see [`Frame::head`].
#[derive(Debug, Clone, PartialEq)]
pub struct Head {
    pub names: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    #[must_use]
    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            n_rows: self.n_rows(),
            columns: self
                .iter()
                .map(|(name, column)| ColumnInfo {
                    name: name.to_string(),
                    non_null: column.len(),
                    dtype: column.dtype(),
                })
                .collect(),
        }
    }

    /// Statistics for every numeric column; categorical columns are skipped.
    #[must_use]
    pub fn describe(&self) -> Describe {
        Describe {
            columns: self
                .iter()
                .filter_map(|(name, column)| {
                    column.as_numeric().map(|values| column_stats(name, values))
                })
                .collect(),
        }
    }

    /// The first `n` rows (fewer if the frame is shorter).
    #[must_use]
    pub fn head(&self, n: usize) -> Head {
        let n = n.min(self.n_rows());
        Head {
            names: self.column_names().to_vec(),
            rows: (0..n)
                .map(|row| self.iter().map(|(_, c)| c.cell(row)).collect())
                .collect(),
        }
    }
}

fn column_stats(name: &str, values: &[f64]) -> ColumnStats {
    let count = values.len();
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    ColumnStats {
        name: name.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Linear interpolation between closest ranks of an ascending slice.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Right-aligned columns separated by two spaces.
fn write_table(f: &mut fmt::Formatter<'_>, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].len())
                .chain(std::iter::once(header[i].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    for line in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:>w$}"))
            .collect();
        writeln!(f, "{}", cells.join("  ").trim_end())?;
    }
    Ok(())
}

fn number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.4}")
    }
}

impl fmt::Display for FrameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} entries, {} columns", self.n_rows, self.columns.len())?;
        let header = ["#", "Column", "Non-Null Count", "Dtype"].map(String::from);
        let rows: Vec<Vec<String>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                vec![
                    i.to_string(),
                    c.name.clone(),
                    format!("{} non-null", c.non_null),
                    c.dtype.to_string(),
                ]
            })
            .collect();
        write_table(f, &header, &rows)
    }
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.columns.iter().map(|c| c.name.clone()))
            .collect();
        let stat = |label: &str, get: fn(&ColumnStats) -> String| -> Vec<String> {
            std::iter::once(label.to_string())
                .chain(self.columns.iter().map(get))
                .collect()
        };
        let rows = vec![
            stat("count", |c| c.count.to_string()),
            stat("mean", |c| number(c.mean)),
            stat("std", |c| number(c.std)),
            stat("min", |c| number(c.min)),
            stat("25%", |c| number(c.q25)),
            stat("50%", |c| number(c.q50)),
            stat("75%", |c| number(c.q75)),
            stat("max", |c| number(c.max)),
        ];
        write_table(f, &header, &rows)
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.names.iter().cloned())
            .collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| std::iter::once(i.to_string()).chain(row.iter().cloned()).collect())
            .collect();
        write_table(f, &header, &rows)
    }
}
