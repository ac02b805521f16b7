//! Pairwise return correlation across tickers.
//!
//! Closes are aligned on a shared date axis, gaps are forward-filled, and returns
//! are computed only where both the current and the previous close exist. Each
//! pair then uses the dates on which both tickers have a return.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Symmetric matrix of Pearson correlations of daily returns.
///
/// A cell is NaN when the pair shares fewer than two returns or either side has
/// zero variance over the shared returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Tickers in row/column order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// The raw matrix.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of tickers.
    pub fn size(&self) -> usize {
        self.tickers.len()
    }

    /// Correlation between two tickers.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        Some(self.values[[i, j]])
    }
}

/// Carry the last seen value forward over gaps. Leading gaps stay empty.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

/// Returns aligned with `closes`; position 0 and any position lacking a close
/// on either side is `None`.
pub fn aligned_returns(closes: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(closes.len());
    if !closes.is_empty() {
        returns.push(None);
    }
    for w in closes.windows(2) {
        returns.push(match (w[0], w[1]) {
            (Some(prev), Some(cur)) if prev != 0.0 => Some(cur / prev - 1.0),
            _ => None,
        });
    }
    returns
}

/// Pearson correlation over the positions where both inputs are present.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// Correlation matrix of `columns`, each a ticker with its closes on a shared date axis.
pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let returns: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|(_, closes)| aligned_returns(&forward_fill(closes)))
        .collect();

    let n = columns.len();
    let mut values = Array2::<f64>::from_elem((n, n), f64::NAN);
    for i in 0..n {
        for j in i..n {
            let r = pearson(&returns[i], &returns[j]);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    CorrelationMatrix {
        tickers: columns.iter().map(|(t, _)| t.clone()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(ticker: &str, closes: &[Option<f64>]) -> (String, Vec<Option<f64>>) {
        (ticker.to_string(), closes.to_vec())
    }

    #[test]
    fn test_forward_fill() {
        let filled = forward_fill(&[None, Some(1.0), None, None, Some(2.0), None]);
        assert_eq!(
            filled,
            vec![None, Some(1.0), Some(1.0), Some(1.0), Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn test_aligned_returns_skip_gaps() {
        let returns = aligned_returns(&[None, Some(100.0), Some(110.0)]);
        assert_eq!(returns.len(), 3);
        assert_eq!(returns[0], None);
        assert_eq!(returns[1], None);
        assert_relative_eq!(returns[2].unwrap(), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_perfectly_correlated() {
        let a = [Some(100.0), Some(110.0), Some(99.0), Some(105.0)];
        let b = [Some(50.0), Some(55.0), Some(49.5), Some(52.5)];
        let matrix = correlation_matrix(&[column("A", &a), column("B", &b)]);

        assert_relative_eq!(matrix.get("A", "B").unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(matrix.get("A", "A").unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_anti_correlated() {
        let a = [Some(100.0), Some(110.0), Some(100.0), Some(110.0)];
        let b = [Some(100.0), Some(90.0), Some(100.0), Some(90.0)];
        let r = pearson(&aligned_returns(&a), &aligned_returns(&b));
        assert!(r < -0.9);
    }

    #[test]
    fn test_symmetric() {
        let a = [Some(10.0), Some(11.0), Some(10.5), Some(12.0), Some(11.0)];
        let b = [Some(20.0), Some(19.0), Some(21.0), Some(22.0), Some(20.5)];
        let c = [Some(5.0), None, Some(5.5), Some(5.2), Some(5.9)];
        let matrix = correlation_matrix(&[column("A", &a), column("B", &b), column("C", &c)]);

        let values = matrix.values();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(values[[i, j]].to_bits(), values[[j, i]].to_bits());
            }
        }
    }

    #[test]
    fn test_constant_series_is_nan() {
        let a = [Some(10.0), Some(10.0), Some(10.0)];
        let b = [Some(10.0), Some(11.0), Some(12.0)];
        let matrix = correlation_matrix(&[column("A", &a), column("B", &b)]);
        assert!(matrix.get("A", "B").unwrap().is_nan());
    }

    #[test]
    fn test_unavailable_column_is_nan() {
        let a = [Some(10.0), Some(11.0), Some(12.0)];
        let b = [None, None, None];
        let matrix = correlation_matrix(&[column("A", &a), column("B", &b)]);
        assert!(matrix.get("A", "B").unwrap().is_nan());
        assert!(matrix.get("B", "B").unwrap().is_nan());
        assert_eq!(matrix.size(), 2);
    }
}
