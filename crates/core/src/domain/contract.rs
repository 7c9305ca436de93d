use crate::domain::report::ProfitStatus;
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Profit figures from the model must agree with the local computation within this tolerance.
const PROFIT_TOLERANCE: f64 = 0.01;

/// Structured summary as emitted by the model. Loosely typed on purpose; see
/// [`LlmAnalysisSummary::validate_and_into_summary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAnalysisSummary {
    #[serde(alias = "status")]
    pub profit_loss_status: String,
    #[serde(alias = "profit")]
    pub current_profit: f64,
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, alias = "metrics")]
    pub key_metrics: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Oracle,
    ParseFailure,
    OracleUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub profit_loss_status: ProfitStatus,
    pub current_profit: f64,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
    pub key_metrics: BTreeMap<String, Value>,
    #[serde(skip)]
    pub source: SummarySource,
}

impl LlmAnalysisSummary {
    pub fn validate_and_into_summary(self, expected_profit: f64) -> anyhow::Result<AnalysisSummary> {
        let status = match self.profit_loss_status.trim().to_ascii_lowercase().as_str() {
            "positive" => ProfitStatus::Positive,
            "negative" => ProfitStatus::Negative,
            other => anyhow::bail!("profit_loss_status must be positive|negative (got {other:?})"),
        };

        ensure!(
            self.current_profit.is_finite()
                && (self.current_profit - expected_profit).abs() <= PROFIT_TOLERANCE,
            "current_profit mismatch: expected {expected_profit}, got {}",
            self.current_profit
        );
        ensure!(
            status == ProfitStatus::from_profit(expected_profit),
            "profit_loss_status {status} contradicts profit {expected_profit}"
        );

        Ok(AnalysisSummary {
            profit_loss_status: status,
            current_profit: expected_profit,
            alerts: non_empty_lines(self.alerts),
            recommendations: non_empty_lines(self.recommendations),
            key_metrics: self.key_metrics,
            source: SummarySource::Oracle,
        })
    }
}

fn non_empty_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
