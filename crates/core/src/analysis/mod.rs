pub mod alerts;
pub mod metrics;
pub mod recommendations;
pub mod report;

use crate::analysis::alerts::AlertThresholds;
use crate::analysis::metrics::Metrics;
use crate::domain::record::DailyRecord;
use chrono::NaiveDate;

/// Everything computed locally for one day-over-day comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    pub date: NaiveDate,
    pub previous_date: NaiveDate,
    pub today: DailyRecord,
    pub yesterday: DailyRecord,
    pub metrics: Metrics,
    pub alerts: Vec<String>,
}

impl AnalysisContext {
    pub fn new(
        date: NaiveDate,
        today: DailyRecord,
        previous_date: NaiveDate,
        yesterday: DailyRecord,
        thresholds: &AlertThresholds,
    ) -> Self {
        let metrics = Metrics::compute(&today, &yesterday);
        let alerts = alerts::render(&alerts::evaluate(&metrics, thresholds));
        Self {
            date,
            previous_date,
            today,
            yesterday,
            metrics,
            alerts,
        }
    }
}
