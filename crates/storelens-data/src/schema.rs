//! Column names shared by every table in the pipeline.
//!
//! All frames use snake_case column names. Loaders produce them, the joiner
//! carries them through and the downstream crates refer to them through these
//! constants rather than string literals.

use std::ops::RangeInclusive;

/// Valid store ids in the dataset.
pub const STORE_ID_RANGE: RangeInclusive<i64> = 1..=1115;

/// Store id.
pub const STORE: &str = "store";
/// Calendar date of a daily record (or period end after resampling).
pub const DATE: &str = "date";
/// Day of week, 1 = Monday through 7 = Sunday.
pub const DAY_OF_WEEK: &str = "day_of_week";
/// Sales amount in currency units.
pub const SALES: &str = "sales";
/// Customer count.
pub const CUSTOMERS: &str = "customers";
/// Whether the store was open.
pub const OPEN: &str = "open";
/// Whether a daily promotion ran.
pub const PROMO: &str = "promo";
/// State holiday code, `"0"` for none.
pub const STATE_HOLIDAY: &str = "state_holiday";
/// Whether schools were on holiday.
pub const SCHOOL_HOLIDAY: &str = "school_holiday";
/// Derived: state holiday code differs from `"0"`.
pub const IS_HOLIDAY: &str = "is_holiday";

/// Store type code.
pub const STORE_TYPE: &str = "store_type";
/// Assortment level name.
pub const ASSORTMENT: &str = "assortment";
/// Distance to the nearest competitor in meters.
pub const COMPETITION_DISTANCE: &str = "competition_distance";
/// Date the nearest competitor opened.
pub const COMPETITION_SINCE: &str = "competition_since";
/// Whether the store takes part in the recurring promotion.
pub const PROMO2: &str = "promo2";
/// Date the store joined the recurring promotion.
pub const PROMO2_SINCE: &str = "promo2_since";
/// Months in which the recurring promotion restarts.
pub const PROMO_INTERVAL: &str = "promo_interval";

/// Columns of a daily table, in order.
pub const DAILY_COLUMNS: [&str; 10] = [
    STORE,
    DATE,
    DAY_OF_WEEK,
    SALES,
    CUSTOMERS,
    OPEN,
    PROMO,
    STATE_HOLIDAY,
    SCHOOL_HOLIDAY,
    IS_HOLIDAY,
];

/// Columns of a store metadata frame, in order.
pub const STORE_META_COLUMNS: [&str; 8] = [
    STORE,
    STORE_TYPE,
    ASSORTMENT,
    COMPETITION_DISTANCE,
    COMPETITION_SINCE,
    PROMO2,
    PROMO2_SINCE,
    PROMO_INTERVAL,
];

/// Whether `store` is a valid store id.
pub fn is_valid_store_id(store: i64) -> bool {
    STORE_ID_RANGE.contains(&store)
}
