//! Derived business metrics over `sales` and `customers`.
//!
//! [`augment_with_metrics`] works on any frame that carries the two base
//! columns: the joined table, one store's slice, or a resampled timeline.
//! Rows are processed in their existing order, so running sums and changes
//! follow whatever order the caller sorted by.

use crate::error::Result;
use polars::prelude::*;
use storelens_data::frame::require_columns;
use storelens_data::schema::{CUSTOMERS, SALES};

/// Sales per customer.
pub const SPC: &str = "spc";
/// Running total of sales.
pub const CUM_SALES: &str = "cum_sales";
/// Running total of customers.
pub const CUM_CUSTOMERS: &str = "cum_customers";
/// Relative change of sales against the previous row.
pub const PCT_CHANGE_SALES: &str = "pct_change_sales";
/// Relative change of customers against the previous row.
pub const PCT_CHANGE_CUSTOMERS: &str = "pct_change_customers";
/// Absolute change of sales against the previous row.
pub const DIFF_SALES: &str = "diff_sales";
/// Absolute change of customers against the previous row.
pub const DIFF_CUSTOMERS: &str = "diff_customers";

/// Every column added by [`augment_with_metrics`], in insertion order.
pub const METRIC_COLUMNS: [&str; 7] = [
    SPC,
    CUM_SALES,
    CUM_CUSTOMERS,
    PCT_CHANGE_SALES,
    PCT_CHANGE_CUSTOMERS,
    DIFF_SALES,
    DIFF_CUSTOMERS,
];

/// Add the derived metric columns.
///
/// * `spc` is `sales / customers`, and `0.0` when there were no customers.
/// * `cum_*` are running sums.
/// * `pct_change_*` is null on the first row and where the previous value is 0.
/// * `diff_*` is null on the first row.
///
/// Existing metric columns are recomputed, so the operation is idempotent.
///
/// # Errors
///
/// Returns [`MetricsError::MissingColumn`](crate::MetricsError::MissingColumn)
/// if `sales` or `customers` is absent.
pub fn augment_with_metrics(frame: &DataFrame) -> Result<DataFrame> {
    require_columns(frame, &[SALES, CUSTOMERS])?;

    let augmented = frame
        .clone()
        .lazy()
        .with_columns([
            spc_expr(col(SALES), col(CUSTOMERS), lit(0.0)).alias(SPC),
            col(SALES).cast(DataType::Int64).cum_sum(false).alias(CUM_SALES),
            col(CUSTOMERS)
                .cast(DataType::Int64)
                .cum_sum(false)
                .alias(CUM_CUSTOMERS),
            pct_change(SALES).alias(PCT_CHANGE_SALES),
            pct_change(CUSTOMERS).alias(PCT_CHANGE_CUSTOMERS),
            diff(SALES).alias(DIFF_SALES),
            diff(CUSTOMERS).alias(DIFF_CUSTOMERS),
        ])
        .collect()?;

    Ok(augmented)
}

/// `numerator / denominator` as floats, or `fallback` when the denominator is 0.
pub(crate) fn spc_expr(numerator: Expr, denominator: Expr, fallback: Expr) -> Expr {
    when(denominator.clone().eq(lit(0)))
        .then(fallback)
        .otherwise(numerator.cast(DataType::Float64) / denominator.cast(DataType::Float64))
}

fn pct_change(name: &str) -> Expr {
    let previous = col(name).cast(DataType::Float64).shift(lit(1));
    when(previous.clone().eq(lit(0.0)))
        .then(lit(NULL).cast(DataType::Float64))
        .otherwise((col(name).cast(DataType::Float64) - previous.clone()) / previous)
}

fn diff(name: &str) -> Expr {
    let current = col(name).cast(DataType::Int64);
    current.clone() - current.shift(lit(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use storelens_data::frame::{f64_values, i64_values};

    fn frame(sales: &[i64], customers: &[i64]) -> DataFrame {
        DataFrame::new(vec![
            Series::new(SALES.into(), sales.to_vec()).into(),
            Series::new(CUSTOMERS.into(), customers.to_vec()).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_spc_zero_customers() {
        let df = augment_with_metrics(&frame(&[100, 0, 50], &[10, 0, 0])).unwrap();
        let spc = f64_values(&df, SPC).unwrap();

        assert_relative_eq!(spc[0].unwrap(), 10.0);
        assert_eq!(spc[1], Some(0.0));
        assert_eq!(spc[2], Some(0.0));
        assert!(spc.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_running_sums_and_diffs() {
        let df = augment_with_metrics(&frame(&[100, 0, 50], &[10, 0, 5])).unwrap();

        assert_eq!(
            i64_values(&df, CUM_SALES).unwrap(),
            vec![Some(100), Some(100), Some(150)]
        );
        assert_eq!(
            i64_values(&df, CUM_CUSTOMERS).unwrap(),
            vec![Some(10), Some(10), Some(15)]
        );
        assert_eq!(
            i64_values(&df, DIFF_SALES).unwrap(),
            vec![None, Some(-100), Some(50)]
        );
    }

    #[test]
    fn test_pct_change_after_zero_is_null() {
        let df = augment_with_metrics(&frame(&[100, 0, 50, 75], &[10, 0, 5, 5])).unwrap();
        let pct = f64_values(&df, PCT_CHANGE_SALES).unwrap();

        assert_eq!(pct[0], None);
        assert_relative_eq!(pct[1].unwrap(), -1.0);
        assert_eq!(pct[2], None);
        assert_relative_eq!(pct[3].unwrap(), 0.5);
    }

    #[test]
    fn test_idempotent() {
        let once = augment_with_metrics(&frame(&[3, 6, 0, 9], &[1, 2, 0, 3])).unwrap();
        let twice = augment_with_metrics(&once).unwrap();

        assert_eq!(once.width(), 2 + METRIC_COLUMNS.len());
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_missing_customers() {
        let df = DataFrame::new(vec![Series::new(SALES.into(), [1i64]).into()]).unwrap();
        assert!(matches!(
            augment_with_metrics(&df),
            Err(crate::MetricsError::MissingColumn(name)) if name == CUSTOMERS
        ));
    }
}
