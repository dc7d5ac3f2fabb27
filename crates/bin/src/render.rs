//! Plain-text tables for the terminal.

use storelens::events::{EventKind, EventWindow, ImpactMetric, ImpactRecord};
use storelens::metrics::CohortRank;

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

pub(crate) fn heading(title: &str) {
    println!("{title}");
    println!("{}\n", "=".repeat(title.len()));
}

pub(crate) fn print_ranks(store: i64, ranks: &[CohortRank]) {
    heading(&format!("Store {store} cohort ranks"));
    println!("{:<30} {:>8} {:>8} {:>16}", "Metric", "Rank", "Of", "Value");
    println!("{}", "-".repeat(65));
    for rank in ranks {
        println!(
            "{:<30} {:>8} {:>8} {:>16.2}",
            rank.metric.label(),
            rank.rank,
            rank.cohort_size,
            rank.value
        );
    }
}

pub(crate) fn print_impact(
    kind: EventKind,
    sort: ImpactMetric,
    total: usize,
    records: &[&ImpactRecord],
) {
    heading(&format!("{kind} impact"));
    println!(
        "Stores with a new event: {total} (showing {}, ordered by {sort})\n",
        records.len()
    );
    println!(
        "{:>6} {:>11} {:>9} {:>6} {:>6} {:>10} {:>10} {:>9} {:>12}",
        "Store", "Since", "Distance", "Pre", "Post", "Pre SPC", "Post SPC", "SPC diff", "Sales diff"
    );
    println!("{}", "-".repeat(87));
    for record in records {
        println!(
            "{:>6} {:>11} {:>9} {:>6} {:>6} {:>10} {:>10} {:>9} {:>12}",
            record.store,
            record.since.to_string(),
            record
                .distance
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
            record.pre_days,
            record.post_days,
            or_na(record.pre_spc),
            or_na(record.post_spc),
            or_na(record.spc_diff),
            or_na(record.daily_mean_sales_diff),
        );
    }
}

pub(crate) fn print_event(kind: EventKind, window: Option<&EventWindow>) {
    let label = kind.to_string();
    match window {
        Some(window) => {
            let detail = window
                .distance
                .map(|d| format!(", {d} m away"))
                .or_else(|| window.promo_interval.as_ref().map(|i| format!(", {i}")))
                .unwrap_or_default();
            println!(
                "  {label:<12} since {}{detail} ({} of {} days active)",
                window.since,
                window.active_days(),
                window.len()
            );
        }
        None => println!("  {label:<12} no new event in the analysis horizon"),
    }
}
