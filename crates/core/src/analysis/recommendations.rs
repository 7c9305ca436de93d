use crate::analysis::alerts::AlertThresholds;
use crate::analysis::metrics::Metrics;
use crate::domain::contract::{AnalysisSummary, SummarySource};

const LIST_MARKERS: [&str; 7] = ["-", "•", "1.", "2.", "3.", "4.", "5."];

/// Revenue growth (percent) above which the baseline suggests leaning into marketing.
const GROWTH_MOMENTUM_PCT: f64 = 15.0;

/// Picks recommendations from the best available source: validated summary, then list lines from
/// the model's answer to the recommendations prompt, then the deterministic baseline.
///
/// `recommendation_text` must be that dedicated answer, never the analysis narrative: the
/// narrative's figure bullets would otherwise be taken for advice.
pub fn select(
    summary: &AnalysisSummary,
    recommendation_text: Option<&str>,
    metrics: &Metrics,
    thresholds: &AlertThresholds,
) -> Vec<String> {
    if let Some(from_summary) = from_summary(summary) {
        return from_summary;
    }

    if let Some(text) = recommendation_text {
        let from_text = from_narrative_text(text);
        if !from_text.is_empty() {
            return from_text;
        }
    }

    fallback(metrics, thresholds)
}

/// Recommendations carried by a summary the model produced and that passed validation.
pub fn from_summary(summary: &AnalysisSummary) -> Option<Vec<String>> {
    (summary.source == SummarySource::Oracle && !summary.recommendations.is_empty())
        .then(|| summary.recommendations.clone())
}

/// List-like lines from free text. Fewer than two hits means the text was not a list, so the
/// whole text becomes a single item.
pub fn from_narrative_text(text: &str) -> Vec<String> {
    let items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && is_list_line(line))
        .map(str::to_string)
        .collect();

    if items.len() >= 2 {
        return items;
    }

    let whole = text.trim();
    if whole.is_empty() {
        Vec::new()
    } else {
        vec![whole.to_string()]
    }
}

fn is_list_line(line: &str) -> bool {
    if LIST_MARKERS.iter().any(|m| line.starts_with(m)) {
        return true;
    }
    line.chars().take(5).any(|c| c == '.')
}

pub fn fallback(metrics: &Metrics, thresholds: &AlertThresholds) -> Vec<String> {
    let mut out = vec![
        "Model unavailable - using baseline recommendations".to_string(),
        "Review and control operational costs".to_string(),
        "Analyze marketing channel performance".to_string(),
        "Optimize product pricing strategy".to_string(),
    ];

    if metrics.today_profit <= 0.0 {
        out.push("🚨 URGENT: Reduce unnecessary expenses".to_string());
    }
    if metrics.cac_change_pct > thresholds.cac_growth_pct {
        out.push("📊 Review and optimize marketing campaigns".to_string());
    }
    if metrics.revenue_change_pct > GROWTH_MOMENTUM_PCT {
        out.push("📈 Increase marketing budget to leverage growth momentum".to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::DailyRecord;
    use crate::domain::report::ProfitStatus;
    use std::collections::BTreeMap;

    fn metrics() -> Metrics {
        Metrics::compute(
            &DailyRecord::new(12000.0, 8000.0, 150).with_marketing_cost(2000.0),
            &DailyRecord::new(10000.0, 7500.0, 120).with_marketing_cost(1800.0),
        )
    }

    fn summary(source: SummarySource, recommendations: &[&str]) -> AnalysisSummary {
        AnalysisSummary {
            profit_loss_status: ProfitStatus::Positive,
            current_profit: 4000.0,
            alerts: Vec::new(),
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
            key_metrics: BTreeMap::new(),
            source,
        }
    }

    #[test]
    fn extracts_bullets_and_numbered_lines() {
        let text = "Here is my advice:\n\n1. Cut shipping costs\n- Raise prices on top sellers\n• Retarget lapsed customers\nThanks!";
        assert_eq!(
            from_narrative_text(text),
            vec![
                "1. Cut shipping costs".to_string(),
                "- Raise prices on top sellers".to_string(),
                "• Retarget lapsed customers".to_string(),
            ]
        );
    }

    #[test]
    fn non_list_text_becomes_single_item() {
        assert_eq!(
            from_narrative_text("  Keep doing what you are doing  "),
            vec!["Keep doing what you are doing".to_string()]
        );
        assert!(from_narrative_text("   ").is_empty());
    }

    #[test]
    fn fallback_adds_metric_driven_items() {
        let recs = fallback(&metrics(), &AlertThresholds::default());
        assert_eq!(recs.len(), 5);
        assert!(recs[4].contains("growth momentum"));

        let mut loss = metrics();
        loss.today_profit = -10.0;
        loss.revenue_change_pct = 0.0;
        loss.cac_change_pct = 40.0;
        let recs = fallback(&loss, &AlertThresholds::default());
        assert!(recs.iter().any(|r| r.contains("Reduce unnecessary expenses")));
        assert!(recs.iter().any(|r| r.contains("marketing campaigns")));
    }

    #[test]
    fn selection_prefers_validated_summary() {
        let m = metrics();
        let t = AlertThresholds::default();
        let s = summary(SummarySource::Oracle, &["Do A", "Do B"]);
        assert_eq!(select(&s, Some("- x\n- y"), &m, &t), vec!["Do A", "Do B"]);

        let s = summary(SummarySource::ParseFailure, &["Review analysis manually"]);
        assert_eq!(select(&s, Some("- x\n- y"), &m, &t), vec!["- x", "- y"]);

        let s = summary(SummarySource::OracleUnavailable, &[]);
        assert_eq!(select(&s, None, &m, &t), fallback(&m, &t));
    }

    #[test]
    fn only_validated_summaries_supply_recommendations() {
        assert_eq!(
            from_summary(&summary(SummarySource::Oracle, &["Do A"])),
            Some(vec!["Do A".to_string()])
        );
        assert_eq!(from_summary(&summary(SummarySource::Oracle, &[])), None);
        assert_eq!(
            from_summary(&summary(SummarySource::ParseFailure, &["Review analysis manually"])),
            None
        );
    }
}
