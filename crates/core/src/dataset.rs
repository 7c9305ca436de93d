use crate::domain::record::DailyRecord;
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read-only per-day business records, ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: BTreeMap<NaiveDate, DailyRecord>,
}

impl Dataset {
    pub fn new(records: BTreeMap<NaiveDate, DailyRecord>) -> anyhow::Result<Self> {
        for (date, record) in &records {
            record
                .validate()
                .with_context(|| format!("invalid record for {date}"))?;
        }
        Ok(Self { records })
    }

    /// Built-in ten-day sample used when no dataset file is configured.
    pub fn sample() -> Self {
        let rows: [(u32, f64, f64, u32); 10] = [
            (1, 8000.0, 5000.0, 80),
            (2, 10000.0, 6000.0, 100),
            (3, 7500.0, 4800.0, 75),
            (4, 11000.0, 7000.0, 110),
            (5, 9500.0, 6200.0, 95),
            (6, 5000.0, 7000.0, 50),
            (7, 12000.0, 7500.0, 120),
            (8, 9000.0, 5800.0, 90),
            (9, 8500.0, 5500.0, 85),
            (10, 10500.0, 6500.0, 105),
        ];

        let records = rows
            .into_iter()
            .filter_map(|(day, revenue, cost, customers)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, day)?;
                Some((date, DailyRecord::new(revenue, cost, customers)))
            })
            .collect();

        Self { records }
    }

    /// Parses a JSON object keyed by `YYYY-MM-DD`.
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let raw: BTreeMap<String, DailyRecord> =
            serde_json::from_str(text).context("dataset is not a JSON object of daily records")?;

        let mut records = BTreeMap::new();
        for (key, record) in raw {
            let date = parse_canonical_date(&key)
                .with_context(|| format!("dataset key is not a YYYY-MM-DD date: {key:?}"))?;
            records.insert(date, record);
        }

        Self::new(records)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.get(&date)
    }

    /// Exact-match lookup on the canonical date key.
    pub fn lookup(&self, key: &str) -> Option<(NaiveDate, &DailyRecord)> {
        let date = parse_canonical_date(key)?;
        self.records.get(&date).map(|record| (date, record))
    }

    pub fn previous_day(&self, date: NaiveDate) -> Option<(NaiveDate, &DailyRecord)> {
        let prev = date.pred_opt()?;
        self.records.get(&prev).map(|record| (prev, record))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.records.keys().copied()
    }

    pub fn render_table(&self) -> String {
        let mut out = String::from("📊 **Available Business Data:**\n```\n");
        out.push_str(&format!(
            "{:<10} | {:>12} | {:>10} | {:>9}\n",
            "Date", "Revenue ($)", "Cost ($)", "Customers"
        ));
        out.push_str(&format!(
            "{:-<10}-|-{:->12}-|-{:->10}-|-{:->9}\n",
            "", "", "", ""
        ));
        for (date, record) in &self.records {
            out.push_str(&format!(
                "{:<10} | {:>12} | {:>10} | {:>9}\n",
                date.format(DATE_FORMAT).to_string(),
                format_money(record.revenue),
                format_money(record.cost),
                record.customers
            ));
        }
        out.push_str("```");
        out
    }
}

/// Parses `YYYY-MM-DD` and rejects anything that does not format back to the same string.
fn parse_canonical_date(key: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(key, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == key).then_some(date)
}

/// `$12,345` for whole amounts, `$12,345.67` otherwise.
pub fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative && cents != 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn sample_has_ten_days() {
        let ds = Dataset::sample();
        assert_eq!(ds.len(), 10);
        assert_eq!(ds.get(date(6)).map(|r| r.revenue), Some(5000.0));
    }

    #[test]
    fn lookup_requires_exact_canonical_key() {
        let ds = Dataset::sample();
        assert!(ds.lookup("2024-01-05").is_some());
        assert!(ds.lookup("2024-1-5").is_none());
        assert!(ds.lookup("2024-13-45").is_none());
        assert!(ds.lookup(" 2024-01-05").is_none());
        assert!(ds.lookup("2024-02-01").is_none());
    }

    #[test]
    fn previous_day_is_missing_for_first_date() {
        let ds = Dataset::sample();
        assert!(ds.previous_day(date(1)).is_none());
        let (prev, record) = ds.previous_day(date(2)).unwrap();
        assert_eq!(prev, date(1));
        assert_eq!(record.customers, 80);
    }

    #[test]
    fn loads_json_and_rejects_bad_keys() {
        let ds = Dataset::from_json_str(
            r#"{"2024-03-01": {"revenue": 100, "cost": 40, "customers": 2, "marketing_cost": 10}}"#,
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.lookup("2024-03-01").unwrap().1.marketing_cost, 10.0);

        assert!(Dataset::from_json_str(r#"{"March 1": {"revenue": 1, "cost": 1, "customers": 1}}"#).is_err());
        assert!(Dataset::from_json_str(r#"{"2024-03-01": {"revenue": -1, "cost": 1, "customers": 1}}"#).is_err());
    }

    #[test]
    fn table_lists_every_date_in_order() {
        let table = Dataset::sample().render_table();
        let first = table.find("2024-01-01").unwrap();
        let last = table.find("2024-01-10").unwrap();
        assert!(first < last);
        assert!(table.contains("$10,000"));
        assert!(table.starts_with("📊"));
    }

    #[test]
    fn money_formatting_groups_thousands() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(999.0), "$999");
        assert_eq!(format_money(1234567.0), "$1,234,567");
        assert_eq!(format_money(-2000.0), "-$2,000");
        assert_eq!(format_money(13.5), "$13.50");
    }
}
