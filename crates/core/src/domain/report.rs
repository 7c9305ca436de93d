use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfitStatus {
    Positive,
    Negative,
}

impl ProfitStatus {
    pub fn from_profit(profit: f64) -> Self {
        if profit > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for ProfitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

impl fmt::Display for ActionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub key_metrics: KeyMetrics,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
    pub action_priority: ActionPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub date: NaiveDate,
    pub status: ProfitStatus,
    pub total_profit: f64,
    pub revenue: f64,
    pub cost: f64,
    pub customers: u32,
}

/// Presentation subset of the metrics. Change fields carry a `%` suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub cac_today: f64,
    pub roi_today: f64,
    pub revenue_change: String,
    pub cost_change: String,
    pub profit_change: String,
    pub customer_growth: String,
}

impl Report {
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
