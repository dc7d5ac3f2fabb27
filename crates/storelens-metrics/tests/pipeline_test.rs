//! Join, derive and rank over a small two-file dataset.

use storelens_data::frame::{f64_values, i64_values, str_values};
use storelens_data::schema::{ASSORTMENT, SALES, STORE};
use storelens_data::{DailyTable, LoadConfig, StoreMetaTable, load_daily_records, load_store_meta};
use storelens_metrics::{
    CUM_SALES, CohortMetric, JoinPolicy, MetricsError, SPC, augment_with_metrics, join,
    rank_all, rank_store, store_slice,
};

const DAILY: &str = "\
Store,DayOfWeek,Date,Sales,Customers,Open,Promo,StateHoliday,SchoolHoliday
1,1,2015-07-27,5000,500,1,1,0,1
1,2,2015-07-28,4000,400,1,1,0,1
1,7,2015-08-02,0,0,0,0,0,0
2,1,2015-07-27,9000,600,1,1,0,1
2,2,2015-07-28,8000,0,1,0,0,0
2,7,2015-08-02,0,0,0,0,0,0
3,1,2015-07-27,2000,300,1,0,0,0
3,2,2015-07-28,2500,350,1,0,a,0
3,7,2015-08-02,0,0,0,0,0,0
";

const STORES: &str = "\
Store,StoreType,Assortment,CompetitionDistance,CompetitionOpenSinceMonth,CompetitionOpenSinceYear,Promo2,Promo2SinceWeek,Promo2SinceYear,PromoInterval
1,c,a,1270,9,2008,0,,,
2,a,c,570,11,2007,1,13,2010,\"Jan,Apr,Jul,Oct\"
3,a,b,14130,12,2006,1,14,2011,\"Jan,Apr,Jul,Oct\"
";

fn tables() -> (DailyTable, StoreMetaTable) {
    let config = LoadConfig::default();
    (
        load_daily_records(DAILY.as_bytes(), &config).unwrap(),
        load_store_meta(STORES.as_bytes(), &config).unwrap(),
    )
}

#[test]
fn test_join_then_filter_matches_store_rows() {
    let (daily, meta) = tables();
    let combined = join(&daily, &meta, JoinPolicy::FailFast).unwrap();

    for store in [1, 2, 3] {
        let joined = store_slice(combined.frame(), store).unwrap();
        let raw = daily.store_rows(store).unwrap();

        assert_eq!(joined.height(), raw.height());
        assert_eq!(
            i64_values(&joined, SALES).unwrap(),
            i64_values(&raw, SALES).unwrap()
        );
        let expected = meta.get(store).unwrap().assortment.to_string();
        assert!(
            str_values(&joined, ASSORTMENT)
                .unwrap()
                .iter()
                .all(|a| a.as_deref() == Some(expected.as_str()))
        );
    }
}

#[test]
fn test_augmented_store_view() {
    let (daily, meta) = tables();
    let combined = join(&daily, &meta, JoinPolicy::FailFast).unwrap();
    let augmented = augment_with_metrics(&combined.store_rows(2).unwrap()).unwrap();

    assert!(
        f64_values(&augmented, SPC)
            .unwrap()
            .iter()
            .all(|v| v.is_some_and(f64::is_finite))
    );
    let cum: Vec<i64> = i64_values(&augmented, CUM_SALES)
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert!(cum.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(cum.last(), Some(&17000));
}

#[test]
fn test_rank_properties() {
    let (daily, meta) = tables();
    let combined = join(&daily, &meta, JoinPolicy::FailFast).unwrap();

    let top = rank_store(2, combined.frame(), CohortMetric::TotalSales).unwrap();
    assert_eq!(top.rank, 1);

    let mut ranks: Vec<usize> = [1, 2, 3]
        .into_iter()
        .map(|s| {
            rank_store(s, combined.frame(), CohortMetric::SalesPerCustomer)
                .unwrap()
                .rank
        })
        .collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 3]);

    assert_eq!(rank_all(3, combined.frame()).unwrap().len(), 7);
    assert!(matches!(
        rank_store(9999, combined.frame(), CohortMetric::TotalSales),
        Err(MetricsError::NotFound { store: 9999, .. })
    ));
}

#[test]
fn test_join_policies_on_unknown_store() {
    let (daily, _) = tables();
    let partial = load_store_meta(
        STORES.lines().take(3).collect::<Vec<_>>().join("\n").as_bytes(),
        &LoadConfig::default(),
    )
    .unwrap();

    assert!(matches!(
        join(&daily, &partial, JoinPolicy::FailFast),
        Err(MetricsError::ReferentialIntegrity { stores }) if stores == vec![3]
    ));

    let dropped = join(&daily, &partial, JoinPolicy::DropUnmatched).unwrap();
    assert_eq!(dropped.len(), 6);
    assert!(
        i64_values(dropped.frame(), STORE)
            .unwrap()
            .iter()
            .all(|s| *s != Some(3))
    );
}
