//! Text report generation for the stock command.

use crate::stock::models::{category_records, AggregatedStock, Category, StockRecord};
use chrono::{DateTime, Duration, Utc};

/// Fallback body for a section without a usable `records` array.
pub const NO_DATA: &str = "No data";

/// Shop clock is Philippine time (UTC+8), no DST.
const SHOP_UTC_OFFSET_HOURS: i64 = 8;

/// Render the report stamped with the current time.
pub fn render(stock: &AggregatedStock) -> String {
    render_at(stock, Utc::now())
}

/// Render the report stamped with `now`.
pub fn render_at(stock: &AggregatedStock, now: DateTime<Utc>) -> String {
    let mut sections = Vec::with_capacity(Category::ALL.len() + 1);
    sections.push(format!("📦 GrowAGarden Stocks ({})", shop_time(now)));

    for category in Category::ALL {
        sections.push(format!(
            "{} {}:\n{}",
            category.emoji(),
            category.title(),
            format_section(stock.get(category))
        ));
    }

    sections.join("\n\n")
}

/// `hh:mm AM` in shop time.
pub fn shop_time(now: DateTime<Utc>) -> String {
    (now + Duration::hours(SHOP_UTC_OFFSET_HOURS))
        .format("%I:%M %p")
        .to_string()
}

fn format_section(response: Option<&serde_json::Value>) -> String {
    match response.and_then(category_records) {
        Some(records) => records
            .iter()
            .map(format_record)
            .collect::<Vec<_>>()
            .join("\n"),
        None => NO_DATA.to_string(),
    }
}

fn format_record(record: &StockRecord) -> String {
    format!(" {}: {}", record.name, record.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        // 15:05 in Manila.
        Utc.with_ymd_and_hms(2024, 6, 1, 7, 5, 0).unwrap()
    }

    fn full_stock() -> AggregatedStock {
        Category::ALL
            .iter()
            .map(|&c| {
                (
                    c,
                    json!({"data": {"records": [{"Data": {"Name": c.title()}, "Amount": 2}]}}),
                )
            })
            .collect()
    }

    #[test]
    fn test_shop_time() {
        assert_eq!(shop_time(fixed_now()), "03:05 PM");
        let morning = Utc.with_ymd_and_hms(2024, 6, 1, 16, 30, 0).unwrap();
        assert_eq!(shop_time(morning), "12:30 AM");
    }

    #[test]
    fn test_render_full_report() {
        let report = render_at(&full_stock(), fixed_now());

        let expected = "📦 GrowAGarden Stocks (03:05 PM)\n\n\
            🔧 Gears:\n Gears: 2\n\n\
            🌱 Seeds:\n Seeds: 2\n\n\
            🥚 Eggs:\n Eggs: 2\n\n\
            🐝 Event Shop:\n Event Shop: 2\n\n\
            🎨 Cosmetics:\n Cosmetics: 2";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_render_record_line() {
        let mut stock = AggregatedStock::new();
        stock.insert(
            Category::Seeds,
            json!({"data": {"records": [{"Data": {"Name": "Carrot"}, "Amount": 5}]}}),
        );

        let report = render_at(&stock, fixed_now());
        assert!(report.contains("🌱 Seeds:\n Carrot: 5\n\n"));
        assert!(report.lines().any(|line| line == " Carrot: 5"));
    }

    #[test]
    fn test_render_missing_records_only_affects_that_section() {
        let mut stock = full_stock();
        stock.insert(Category::Eggs, json!({"data": {}}));

        let report = render_at(&stock, fixed_now());
        assert!(report.contains("🥚 Eggs:\nNo data\n\n"));
        assert_eq!(report.matches(NO_DATA).count(), 1);
        assert!(report.contains("🔧 Gears:\n Gears: 2"));
        assert!(report.contains("🎨 Cosmetics:\n Cosmetics: 2"));
    }

    #[test]
    fn test_render_absent_category() {
        let stock = AggregatedStock::new();
        let report = render_at(&stock, fixed_now());
        assert_eq!(report.matches(NO_DATA).count(), 5);
    }

    #[test]
    fn test_render_empty_records_array() {
        let mut stock = full_stock();
        stock.insert(Category::Gears, json!({"data": {"records": []}}));

        let report = render_at(&stock, fixed_now());
        assert!(report.contains("🔧 Gears:\n\n\n🌱 Seeds:"));
        assert!(!report.contains(NO_DATA));
    }

    #[test]
    fn test_render_defaults_for_malformed_records() {
        let mut stock = AggregatedStock::new();
        stock.insert(
            Category::Cosmetics,
            json!({"data": {"records": [{"Data": {"Name": "Sign"}}, {"Amount": 3}, null]}}),
        );

        let report = render_at(&stock, fixed_now());
        assert!(report.ends_with("🎨 Cosmetics:\n Sign: 0\n Unknown: 3\n Unknown: 0"));
    }
}
