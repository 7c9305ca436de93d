use crate::analysis::metrics::Metrics;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    /// CAC growth (percent) above which the growth warning fires.
    pub cac_growth_pct: f64,
    /// Absolute CAC above which the level warning fires, in dataset currency units.
    pub cac_level: f64,
    /// Revenue change (percent, negative) below which the drop warning fires.
    pub revenue_drop_pct: f64,
    pub min_roi_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cac_growth_pct: 20.0,
            cac_level: 50.0,
            revenue_drop_pct: -10.0,
            min_roi_pct: 10.0,
        }
    }
}

impl AlertThresholds {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset, unparseable or non-finite values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| {
            lookup(key)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let mut out = Self::default();

        if let Some(v) = number("ALERT_CAC_GROWTH_PCT") {
            out.cac_growth_pct = v;
        }
        if let Some(v) = number("ALERT_CAC_LEVEL") {
            out.cac_level = v;
        }
        if let Some(v) = number("ALERT_REVENUE_DROP_PCT") {
            out.revenue_drop_pct = v;
        }
        if let Some(v) = number("ALERT_MIN_ROI_PCT") {
            out.min_roi_pct = v;
        }

        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Loss,
    CacGrowth { threshold_pct: f64 },
    CacLevel,
    CostsOutpaceRevenue,
    RevenueDrop { threshold_pct: f64 },
    LowRoi { threshold_pct: f64 },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loss => write!(f, "🚨 CRITICAL: You have losses today!"),
            Self::CacGrowth { threshold_pct } => write!(
                f,
                "⚠️ WARNING: Customer acquisition cost increased by more than {threshold_pct}%"
            ),
            Self::CacLevel => write!(f, "⚠️ ALERT: Customer acquisition cost is higher than optimal"),
            Self::CostsOutpaceRevenue => write!(f, "⚠️ CAUTION: Costs are growing faster than revenue"),
            Self::RevenueDrop { threshold_pct } => write!(
                f,
                "🚨 URGENT: Revenue decreased by more than {}%",
                threshold_pct.abs()
            ),
            Self::LowRoi { threshold_pct } => write!(
                f,
                "⚠️ LOW ROI: Return on investment is less than {threshold_pct}%"
            ),
        }
    }
}

/// Every rule is checked in a fixed order; CAC growth and CAC level are exclusive.
pub fn evaluate(metrics: &Metrics, thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if metrics.today_profit <= 0.0 {
        alerts.push(Alert::Loss);
    }

    if metrics.cac_change_pct > thresholds.cac_growth_pct {
        alerts.push(Alert::CacGrowth {
            threshold_pct: thresholds.cac_growth_pct,
        });
    } else if metrics.today_cac > thresholds.cac_level {
        alerts.push(Alert::CacLevel);
    }

    if metrics.cost_change_pct > metrics.revenue_change_pct && metrics.revenue_change_pct > 0.0 {
        alerts.push(Alert::CostsOutpaceRevenue);
    }

    if metrics.revenue_change_pct < thresholds.revenue_drop_pct {
        alerts.push(Alert::RevenueDrop {
            threshold_pct: thresholds.revenue_drop_pct,
        });
    }

    if metrics.today_roi < thresholds.min_roi_pct {
        alerts.push(Alert::LowRoi {
            threshold_pct: thresholds.min_roi_pct,
        });
    }

    alerts
}

pub fn render(alerts: &[Alert]) -> Vec<String> {
    alerts.iter().map(ToString::to_string).collect()
}
