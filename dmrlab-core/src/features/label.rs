//! Forward-looking drawdown labels.

/// `label[t] = Some(true)` iff the worst daily return over the next `horizon`
/// days (t+1 ..= t+horizon) is below `threshold`.
///
/// The last `horizon` dates have no complete lookahead and get `None`, as
/// does any date whose lookahead contains a NaN return.
pub fn risk_labels(returns: &[f64], horizon: usize, threshold: f64) -> Vec<Option<bool>> {
    let n = returns.len();
    (0..n)
        .map(|t| {
            if horizon == 0 || t + horizon >= n {
                return None;
            }
            let window = &returns[t + 1..=t + horizon];
            if window.iter().any(|r| r.is_nan()) {
                return None;
            }
            let worst = window.iter().copied().fold(f64::INFINITY, f64::min);
            Some(worst < threshold)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_looks_strictly_forward() {
        // A crash on day 0 itself must not label day 0
        let returns = [-0.10, 0.01, 0.01, 0.01, -0.03, 0.0];
        let labels = risk_labels(&returns, 2, -0.025);
        assert_eq!(labels[0], Some(false));
        assert_eq!(labels[1], Some(false));
        // day 2 sees days 3 and 4
        assert_eq!(labels[2], Some(true));
        assert_eq!(labels[3], Some(true));
        assert_eq!(labels[4], None);
        assert_eq!(labels[5], None);
    }

    #[test]
    fn threshold_is_strict() {
        let returns = [0.0, -0.025, 0.0];
        let labels = risk_labels(&returns, 1, -0.025);
        assert_eq!(labels[0], Some(false));
    }

    #[test]
    fn nan_in_lookahead_yields_none() {
        let returns = [0.0, f64::NAN, 0.0, 0.0];
        let labels = risk_labels(&returns, 1, -0.025);
        assert_eq!(labels[0], None);
        assert_eq!(labels[1], Some(false));
    }
}
