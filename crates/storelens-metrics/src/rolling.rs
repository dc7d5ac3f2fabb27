//! Centered moving averages.

use crate::error::{MetricsError, Result};
use polars::prelude::*;
use storelens_data::frame::require_columns;

/// Name of the moving-average column for `column` over `window` rows.
pub fn rolling_column_name(column: &str, window: usize) -> String {
    format!("{column}_ma{window}")
}

/// Add a centered moving average of `column` for each window size.
///
/// Each window needs all of its rows, so the first and last `window / 2`
/// rows of every new column are null. Rows are used in their current order.
pub fn rolling_means(frame: &DataFrame, column: &str, windows: &[usize]) -> Result<DataFrame> {
    require_columns(frame, &[column])?;
    if let Some(bad) = windows.iter().find(|w| **w == 0) {
        return Err(MetricsError::InvalidParameter(format!(
            "rolling window must be positive, got {bad}"
        )));
    }

    let means: Vec<Expr> = windows
        .iter()
        .map(|&window| {
            col(column)
                .cast(DataType::Float64)
                .rolling_mean(RollingOptionsFixedWindow {
                    window_size: window,
                    min_periods: window,
                    center: true,
                    ..Default::default()
                })
                .alias(rolling_column_name(column, window))
        })
        .collect();

    Ok(frame.clone().lazy().with_columns(means).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use storelens_data::frame::f64_values;

    #[test]
    fn test_centered_window() {
        let df = DataFrame::new(vec![
            Series::new("sales".into(), [1i64, 2, 3, 4, 5]).into(),
        ])
        .unwrap();
        let out = rolling_means(&df, "sales", &[3]).unwrap();
        let ma = f64_values(&out, "sales_ma3").unwrap();

        assert_eq!(ma[0], None);
        assert_relative_eq!(ma[1].unwrap(), 2.0);
        assert_relative_eq!(ma[3].unwrap(), 4.0);
        assert_eq!(ma[4], None);
    }

    #[test]
    fn test_zero_window_rejected() {
        let df = DataFrame::new(vec![Series::new("sales".into(), [1i64]).into()]).unwrap();
        assert!(matches!(
            rolling_means(&df, "sales", &[0]),
            Err(MetricsError::InvalidParameter(_))
        ));
    }
}
