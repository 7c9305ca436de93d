use crate::analysis::metrics::Metrics;
use crate::domain::record::DailyRecord;
use crate::domain::report::{ActionPriority, KeyMetrics, Report, ReportSummary};
use chrono::NaiveDate;

pub fn assemble(
    date: NaiveDate,
    today: &DailyRecord,
    metrics: &Metrics,
    alerts: Vec<String>,
    recommendations: Vec<String>,
) -> Report {
    let action_priority = action_priority(metrics, &alerts);

    Report {
        summary: ReportSummary {
            date,
            status: metrics.profit_status(),
            total_profit: metrics.today_profit,
            revenue: today.revenue,
            cost: today.cost,
            customers: today.customers,
        },
        key_metrics: KeyMetrics {
            cac_today: metrics.today_cac,
            roi_today: metrics.today_roi,
            revenue_change: percent(metrics.revenue_change_pct),
            cost_change: percent(metrics.cost_change_pct),
            profit_change: percent(metrics.profit_change_pct),
            customer_growth: percent(metrics.customer_growth_pct),
        },
        alerts,
        recommendations,
        action_priority,
    }
}

/// Worst signal wins: a loss is always high, any alert is medium.
pub fn action_priority(metrics: &Metrics, alerts: &[String]) -> ActionPriority {
    if metrics.today_profit <= 0.0 {
        ActionPriority::High
    } else if !alerts.is_empty() {
        ActionPriority::Medium
    } else {
        ActionPriority::Low
    }
}

/// Always keeps a decimal point: `20.0%`, `6.67%`.
fn percent(value: f64) -> String {
    format!("{value:?}%")
}
