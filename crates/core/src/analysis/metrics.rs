use crate::domain::record::DailyRecord;
use crate::domain::report::ProfitStatus;
use serde::{Deserialize, Serialize};

/// Day-over-day comparison. All values are rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub today_profit: f64,
    pub yesterday_profit: f64,
    pub today_cac: f64,
    pub yesterday_cac: f64,
    pub revenue_change_pct: f64,
    pub cost_change_pct: f64,
    pub profit_change_pct: f64,
    pub cac_change_pct: f64,
    pub customer_growth_pct: f64,
    pub today_roi: f64,
    pub yesterday_roi: f64,
}

impl Metrics {
    pub fn compute(today: &DailyRecord, yesterday: &DailyRecord) -> Self {
        let today_profit = today.profit();
        let yesterday_profit = yesterday.profit();
        let today_cac = cac(today);
        let yesterday_cac = cac(yesterday);

        Self {
            today_profit: round2(today_profit),
            yesterday_profit: round2(yesterday_profit),
            today_cac: round2(today_cac),
            yesterday_cac: round2(yesterday_cac),
            revenue_change_pct: round2(pct_change(today.revenue, yesterday.revenue)),
            cost_change_pct: round2(pct_change(today.cost, yesterday.cost)),
            profit_change_pct: round2(pct_change(today_profit, yesterday_profit)),
            cac_change_pct: round2(pct_change(today_cac, yesterday_cac)),
            customer_growth_pct: round2(pct_change(
                f64::from(today.customers),
                f64::from(yesterday.customers),
            )),
            today_roi: round2(roi(today_profit, today.cost)),
            yesterday_roi: round2(roi(yesterday_profit, yesterday.cost)),
        }
    }

    pub fn profit_status(&self) -> ProfitStatus {
        ProfitStatus::from_profit(self.today_profit)
    }
}

/// `(today - yesterday) / |yesterday| * 100`, or 0 when yesterday is 0.
pub fn pct_change(today: f64, yesterday: f64) -> f64 {
    if yesterday == 0.0 {
        return 0.0;
    }
    (today - yesterday) / yesterday.abs() * 100.0
}

fn cac(record: &DailyRecord) -> f64 {
    if record.customers == 0 {
        return 0.0;
    }
    record.marketing_cost / f64::from(record.customers)
}

fn roi(profit: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        profit / cost * 100.0
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
