use crate::domain::contract::{AnalysisSummary, LlmAnalysisSummary};
use anyhow::Context;

/// Body of a Markdown fence when the text starts with one, otherwise the span from the first `{`
/// to the last `}`.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if let Some(fenced) = trimmed.strip_prefix("```") {
        let body = fenced.split_once('\n').map_or("", |(_, rest)| rest);
        let body = body.rfind("```").map_or(body, |end| &body[..end]);
        return Some(body.trim().to_string());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| trimmed[start..=end].trim().to_string())
}

pub fn parse_summary(text: &str, expected_profit: f64) -> anyhow::Result<AnalysisSummary> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    let parsed = serde_json::from_str::<LlmAnalysisSummary>(&json_str)
        .with_context(|| format!("LLM output is not valid JSON for summary schema: {json_str}"))?;
    parsed.validate_and_into_summary(expected_profit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::SummarySource;
    use serde_json::json;

    fn summary_json(profit: f64) -> String {
        json!({
            "profit_loss_status": if profit > 0.0 { "positive" } else { "negative" },
            "current_profit": profit,
            "alerts": ["Revenue down 47%"],
            "recommendations": ["Cut costs", "Run a promotion"],
            "key_metrics": {"revenue_change": "-47.4%"},
        })
        .to_string()
    }

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "Sure! Here it is: {\"a\":1} Let me know.";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn parse_summary_accepts_valid_json() {
        let text = format!("```json\n{}\n```", summary_json(-2000.0));
        let summary = parse_summary(&text, -2000.0).unwrap();
        assert_eq!(summary.recommendations.len(), 2);
        assert_eq!(summary.source, SummarySource::Oracle);
    }

    #[test]
    fn parse_summary_rejects_prose_and_mismatches() {
        assert!(parse_summary("The business did well today.", 10.0).is_err());
        assert!(parse_summary(&summary_json(4000.0), 3200.0).is_err());
        assert!(parse_summary("{\"current_profit\": 1}", 1.0).is_err());
    }
}
