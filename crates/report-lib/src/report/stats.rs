//! Summary statistics and number formatting

use crate::models::{ReportData, SummaryRow};

/// Format a value with scale-dependent precision and a unit suffix.
///
/// Below 1 the value keeps two decimals, below 100 one decimal, below
/// 1,000 none; larger values are scaled to K or M with one decimal.
pub fn format_value(value: f64, unit: &str) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M{}", value / 1_000_000.0, unit)
    } else if value >= 1_000.0 {
        format!("{:.1}K{}", value / 1_000.0, unit)
    } else if value >= 100.0 {
        format!("{:.0}{}", value, unit)
    } else if value >= 1.0 {
        format!("{:.1}{}", value, unit)
    } else {
        format!("{:.2}{}", value, unit)
    }
}

/// Round to the given number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn min_avg_max(values: &[f64]) -> (f64, f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    (min, avg, max)
}

/// Row for a rate-like series: non-positive samples are excluded and
/// the total is estimated as average rate times elapsed time (or "-"
/// when no cumulative total is meaningful, as for CPU).
fn rate_row(
    name: &str,
    values: &[f64],
    unit: &str,
    duration_secs: f64,
    total_unit: Option<&str>,
) -> Option<SummaryRow> {
    let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() {
        return None;
    }
    let (min, avg, max) = min_avg_max(&positive);
    let total = match total_unit {
        Some(total_unit) => format!("~{}", format_value(avg * duration_secs, total_unit)),
        None => "-".to_string(),
    };
    Some(SummaryRow {
        name: name.to_string(),
        min: format_value(min, unit),
        avg: format_value(avg, unit),
        max: format_value(max, unit),
        total,
    })
}

/// Row for a level-like series (memory): all samples count, no total
fn level_row(name: &str, values: &[f64], unit: &str) -> Option<SummaryRow> {
    if values.is_empty() {
        return None;
    }
    let (min, avg, max) = min_avg_max(values);
    Some(SummaryRow {
        name: name.to_string(),
        min: format_value(min, unit),
        avg: format_value(avg, unit),
        max: format_value(max, unit),
        total: "-".to_string(),
    })
}

/// Row for a counter-like series: total is the observed delta
fn counter_row(name: &str, values: &[f64]) -> Option<SummaryRow> {
    if values.is_empty() {
        return None;
    }
    let (min, avg, max) = min_avg_max(values);
    Some(SummaryRow {
        name: name.to_string(),
        min: format_value(min, ""),
        avg: format_value(avg, ""),
        max: format_value(max, ""),
        total: format!("+{}", format_value(max - min, "")),
    })
}

/// Build the summary table in its fixed row order: CPU, memory,
/// network RX/TX, filesystem read/write, rate expressions, total
/// expressions - each section in declaration order.
pub fn summary_table(data: &ReportData, duration_secs: f64) -> Vec<SummaryRow> {
    let mut rows = Vec::new();

    for series in &data.cpu_series {
        rows.extend(rate_row(
            &format!("{} CPU", series.name),
            &series.values,
            "%",
            duration_secs,
            None,
        ));
    }

    for series in &data.memory_series {
        rows.extend(level_row(
            &format!("{} Memory", series.name),
            &series.values,
            " MB",
        ));
    }

    let byte_rate_sections = [
        (&data.network_rx_series, "Net RX"),
        (&data.network_tx_series, "Net TX"),
        (&data.fs_read_series, "FS Read"),
        (&data.fs_write_series, "FS Write"),
    ];
    for (section, label) in byte_rate_sections {
        for series in section {
            rows.extend(rate_row(
                &format!("{} {}", series.name, label),
                &series.values,
                " B/s",
                duration_secs,
                Some(" B"),
            ));
        }
    }

    for series in &data.rate_series {
        rows.extend(rate_row(
            &series.name,
            &series.values,
            "/s",
            duration_secs,
            Some(""),
        ));
    }

    for series in &data.total_series {
        rows.extend(counter_row(&series.name, &series.values));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesData;

    fn series(name: &str, values: &[f64]) -> SeriesData {
        SeriesData {
            name: name.to_string(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn format_value_boundary_cases() {
        assert_eq!(format_value(0.5, ""), "0.50");
        assert_eq!(format_value(99.9, ""), "99.9");
        assert_eq!(format_value(100.0, ""), "100");
        assert_eq!(format_value(999.0, ""), "999");
        assert_eq!(format_value(1_000.0, ""), "1.0K");
        assert_eq!(format_value(1_000_000.0, ""), "1.0M");
    }

    #[test]
    fn format_value_appends_unit_after_scale_suffix() {
        assert_eq!(format_value(42.0, "%"), "42.0%");
        assert_eq!(format_value(1_500.0, " B/s"), "1.5K B/s");
        assert_eq!(format_value(2_500_000.0, " B"), "2.5M B");
    }

    #[test]
    fn round_to_decimal_places() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(1.2345, 1), 1.2);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn cpu_rows_filter_non_positive_samples_and_have_no_total() {
        let data = ReportData {
            cpu_series: vec![series("db", &[0.0, 10.0, 20.0, 30.0, 0.0])],
            ..Default::default()
        };
        let rows = summary_table(&data, 600.0);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "db CPU");
        assert_eq!(rows[0].min, "10.0%");
        assert_eq!(rows[0].avg, "20.0%");
        assert_eq!(rows[0].max, "30.0%");
        assert_eq!(rows[0].total, "-");
    }

    #[test]
    fn cpu_row_is_omitted_when_all_samples_are_zero() {
        let data = ReportData {
            cpu_series: vec![series("idle", &[0.0, 0.0])],
            ..Default::default()
        };
        assert!(summary_table(&data, 600.0).is_empty());
    }

    #[test]
    fn memory_rows_keep_all_samples() {
        let data = ReportData {
            memory_series: vec![series("db", &[0.0, 512.0, 1024.0])],
            ..Default::default()
        };
        let rows = summary_table(&data, 600.0);

        assert_eq!(rows[0].name, "db Memory");
        assert_eq!(rows[0].min, "0.00 MB");
        assert_eq!(rows[0].avg, "512 MB");
        assert_eq!(rows[0].max, "1.0K MB");
        assert_eq!(rows[0].total, "-");
    }

    #[test]
    fn byte_rate_rows_estimate_total_from_average() {
        let data = ReportData {
            network_rx_series: vec![series("db", &[100.0, 200.0, 300.0])],
            ..Default::default()
        };
        let rows = summary_table(&data, 600.0);

        assert_eq!(rows[0].name, "db Net RX");
        assert_eq!(rows[0].avg, "200 B/s");
        // 200 B/s over 600 s
        assert_eq!(rows[0].total, "~120.0K B");
    }

    #[test]
    fn rate_expression_total_is_marked_as_estimate() {
        let data = ReportData {
            rate_series: vec![series("events_total", &[10.0, 20.0, 30.0, 40.0, 50.0])],
            ..Default::default()
        };
        let rows = summary_table(&data, 600.0);

        assert_eq!(rows[0].name, "events_total");
        assert_eq!(rows[0].min, "10.0/s");
        assert_eq!(rows[0].avg, "30.0/s");
        assert_eq!(rows[0].max, "50.0/s");
        assert_eq!(rows[0].total, "~18.0K");
    }

    #[test]
    fn counter_total_is_the_observed_delta() {
        let data = ReportData {
            total_series: vec![series("bytes_sent", &[1_000.0, 5_000.0, 9_000.0])],
            ..Default::default()
        };
        let rows = summary_table(&data, 600.0);

        assert_eq!(rows[0].name, "bytes_sent");
        assert_eq!(rows[0].total, "+8.0K");
    }

    #[test]
    fn row_order_is_fixed_across_categories() {
        let data = ReportData {
            cpu_series: vec![series("a", &[1.0]), series("b", &[1.0])],
            memory_series: vec![series("a", &[1.0])],
            network_rx_series: vec![series("a", &[1.0])],
            network_tx_series: vec![series("a", &[1.0])],
            fs_read_series: vec![series("a", &[1.0])],
            fs_write_series: vec![series("a", &[1.0])],
            rate_series: vec![series("r", &[1.0])],
            total_series: vec![series("t", &[1.0])],
            ..Default::default()
        };
        let names: Vec<String> = summary_table(&data, 60.0)
            .into_iter()
            .map(|row| row.name)
            .collect();

        assert_eq!(
            names,
            vec![
                "a CPU", "b CPU", "a Memory", "a Net RX", "a Net TX", "a FS Read", "a FS Write",
                "r", "t"
            ]
        );
    }
}
