use crate::analysis::metrics::pct_change;
use crate::analysis::AnalysisContext;
use crate::dataset::format_money;
use crate::domain::contract::{AnalysisSummary, SummarySource};
use crate::llm::error::OracleError;
use crate::llm::{json, prompts, CompletionRequest, NarrativeOracle, Provider};
use serde_json::{json as json_value, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeSource {
    Oracle,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub text: String,
    pub source: NarrativeSource,
}

/// Asks the oracle for prose and a structured summary, degrading to local fallbacks.
#[derive(Clone)]
pub struct Narrator {
    oracle: Arc<dyn NarrativeOracle>,
    repair_attempts: u32,
}

impl Narrator {
    pub fn new(oracle: Arc<dyn NarrativeOracle>, repair_attempts: u32) -> Self {
        Self {
            oracle,
            repair_attempts,
        }
    }

    pub fn provider(&self) -> Provider {
        self.oracle.provider()
    }

    /// Narrative first; the summary is only requested when the oracle answered.
    pub async fn analyze(&self, ctx: &AnalysisContext) -> (Narrative, AnalysisSummary) {
        let narrative = self.narrate(ctx).await;
        let summary = match narrative.source {
            NarrativeSource::Oracle => self.summarize(ctx).await,
            NarrativeSource::Fallback => unavailable_summary(ctx),
        };
        (narrative, summary)
    }

    pub async fn narrate(&self, ctx: &AnalysisContext) -> Narrative {
        let request = CompletionRequest::new(prompts::analysis_prompt(ctx))
            .with_system(prompts::analyst_system_prompt());

        match self.oracle.complete(request).await {
            Ok(text) => Narrative {
                text: text.trim().to_string(),
                source: NarrativeSource::Oracle,
            },
            Err(err) => {
                tracing::warn!(
                    date = %ctx.date,
                    provider = ?err.provider,
                    stage = err.stage,
                    error = %err,
                    "narrative unavailable; using fallback analysis"
                );
                trace_raw_output(&err);
                Narrative {
                    text: fallback_narrative(ctx),
                    source: NarrativeSource::Fallback,
                }
            }
        }
    }

    pub async fn summarize(&self, ctx: &AnalysisContext) -> AnalysisSummary {
        let expected_profit = ctx.metrics.today_profit;

        let initial = match self.oracle.complete(summary_request(prompts::summary_prompt(ctx))).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(date = %ctx.date, error = %err, "summary unavailable; using fallback");
                trace_raw_output(&err);
                return unavailable_summary(ctx);
            }
        };

        let mut last_err = match json::parse_summary(&initial, expected_profit) {
            Ok(summary) => return summary,
            Err(err) => err,
        };
        let mut last_text = initial;

        for attempt in 1..=self.repair_attempts {
            let repair = summary_request(prompts::repair_prompt(&last_text, expected_profit));
            let text = match self.oracle.complete(repair).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(attempt, date = %ctx.date, error = %err, "summary repair call failed");
                    trace_raw_output(&err);
                    break;
                }
            };
            match json::parse_summary(&text, expected_profit) {
                Ok(summary) => return summary,
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        date = %ctx.date,
                        error = %err,
                        "LLM summary still invalid after repair attempt"
                    );
                    last_err = err;
                    last_text = text;
                }
            }
        }

        tracing::warn!(date = %ctx.date, error = %last_err, "could not parse LLM summary; using fallback");
        parse_failure_summary(ctx)
    }

    /// Answer to the dedicated recommendations prompt, or `None` when the oracle fails.
    pub async fn recommend(&self, ctx: &AnalysisContext) -> Option<String> {
        let request = CompletionRequest::new(prompts::recommendation_prompt(ctx))
            .with_system(prompts::consultant_system_prompt());

        match self.oracle.complete(request).await {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(
                    date = %ctx.date,
                    error = %err,
                    "recommendations unavailable; using baseline"
                );
                trace_raw_output(&err);
                None
            }
        }
    }
}

fn trace_raw_output(err: &OracleError) {
    if let Some(raw) = err.raw_output_excerpt() {
        tracing::debug!(
            provider = ?err.provider,
            stage = err.stage,
            raw_output = raw,
            "oracle raw output"
        );
    }
}

fn summary_request(prompt: String) -> CompletionRequest {
    CompletionRequest::new(prompt).with_system(prompts::summary_system_prompt())
}

pub fn fallback_narrative(ctx: &AnalysisContext) -> String {
    let m = &ctx.metrics;
    let revenue_change = pct_change(ctx.today.revenue, ctx.yesterday.revenue);
    let cost_change = pct_change(ctx.today.cost, ctx.yesterday.cost);

    let profit_line = if m.today_profit > 0.0 {
        "Profitable day"
    } else {
        "Loss incurred"
    };
    let revenue_line = if revenue_change > 0.0 {
        "Revenue increased compared to previous day"
    } else if revenue_change < 0.0 {
        "Revenue decreased compared to previous day"
    } else {
        "Revenue was unchanged compared to previous day"
    };
    let cost_line = if cost_change > revenue_change {
        "Cost efficiency needs attention: costs grew faster than revenue"
    } else {
        "Costs are in line with revenue"
    };

    let mut out = format!(
        "📊 **Business Analysis for {date}** (Fallback Mode)\n\n\
💰 **Financial Summary:**\n\
- Current Profit: {profit}\n\
- Revenue Change: {revenue_change:.1}%\n\
- Cost Change: {cost_change:.1}%\n\n\
📈 **Key Insights:**\n\
- {profit_line}\n\
- {revenue_line}\n\
- {cost_line}\n",
        date = ctx.date,
        profit = format_money(m.today_profit),
    );

    if !ctx.alerts.is_empty() {
        out.push_str("\n🚨 **Alerts:**\n");
        for alert in &ctx.alerts {
            out.push_str(&format!("- {alert}\n"));
        }
    }

    out.push_str("\n⚠️ **Note:** This is a basic analysis because the language model could not be reached.");
    out
}

pub fn unavailable_summary(ctx: &AnalysisContext) -> AnalysisSummary {
    let revenue_change = pct_change(ctx.today.revenue, ctx.yesterday.revenue);
    let cost_change = pct_change(ctx.today.cost, ctx.yesterday.cost);

    let mut key_metrics = BTreeMap::new();
    key_metrics.insert(
        "revenue_change".to_string(),
        Value::String(format!("{revenue_change:.1}%")),
    );
    key_metrics.insert(
        "cost_change".to_string(),
        Value::String(format!("{cost_change:.1}%")),
    );
    key_metrics.insert("profit".to_string(), json_value!(ctx.metrics.today_profit));

    AnalysisSummary {
        profit_loss_status: ctx.metrics.profit_status(),
        current_profit: ctx.metrics.today_profit,
        alerts: vec!["LLM unavailable - basic analysis provided".to_string()],
        recommendations: vec![
            "Review detailed financials".to_string(),
            "Check operational efficiency".to_string(),
        ],
        key_metrics,
        source: SummarySource::OracleUnavailable,
    }
}

pub fn parse_failure_summary(ctx: &AnalysisContext) -> AnalysisSummary {
    let mut key_metrics = BTreeMap::new();
    key_metrics.insert(
        "error".to_string(),
        Value::String("JSON parsing failed".to_string()),
    );

    AnalysisSummary {
        profit_loss_status: ctx.metrics.profit_status(),
        current_profit: ctx.metrics.today_profit,
        alerts: vec!["Unable to parse LLM JSON response".to_string()],
        recommendations: vec!["Review analysis manually".to_string()],
        key_metrics,
        source: SummarySource::ParseFailure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::alerts::AlertThresholds;
    use crate::domain::record::DailyRecord;
    use crate::domain::report::ProfitStatus;
    use crate::llm::scripted::ScriptedOracle;
    use chrono::NaiveDate;

    fn ctx() -> AnalysisContext {
        AnalysisContext::new(
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            DailyRecord::new(5000.0, 7000.0, 50),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            DailyRecord::new(9500.0, 6200.0, 95),
            &AlertThresholds::default(),
        )
    }

    fn valid_summary() -> String {
        json_value!({
            "profit_loss_status": "negative",
            "current_profit": -2000,
            "alerts": ["Loss today"],
            "recommendations": ["Cut overtime", "Pause low-yield ads"],
            "key_metrics": {"revenue_change": "-47.4%"},
        })
        .to_string()
    }

    fn narrator(responses: Vec<Result<String, OracleError>>) -> (Arc<ScriptedOracle>, Narrator) {
        let oracle = Arc::new(ScriptedOracle::new(responses));
        let narrator = Narrator::new(oracle.clone(), 1);
        (oracle, narrator)
    }

    #[tokio::test]
    async fn uses_oracle_text_and_summary() {
        let (oracle, narrator) = narrator(vec![
            Ok("  A rough day.\n1. Cut costs\n2. Promote  ".to_string()),
            Ok(format!("```json\n{}\n```", valid_summary())),
        ]);
        let (narrative, summary) = narrator.analyze(&ctx()).await;

        assert_eq!(narrative.source, NarrativeSource::Oracle);
        assert_eq!(narrative.text, "A rough day.\n1. Cut costs\n2. Promote");
        assert_eq!(summary.source, SummarySource::Oracle);
        assert_eq!(summary.recommendations.len(), 2);
        assert_eq!(oracle.prompts().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_oracle_falls_back_without_summary_call() {
        let (oracle, narrator) = narrator(vec![ScriptedOracle::failure("timeout")]);
        let (narrative, summary) = narrator.analyze(&ctx()).await;

        assert_eq!(narrative.source, NarrativeSource::Fallback);
        assert!(narrative.text.contains("Fallback Mode"));
        assert!(narrative.text.contains("- Current Profit: -$2,000"));
        assert!(narrative.text.contains("- Revenue Change: -47.4%"));
        assert!(narrative.text.contains("Loss incurred"));
        assert_eq!(summary.source, SummarySource::OracleUnavailable);
        assert_eq!(summary.alerts, vec!["LLM unavailable - basic analysis provided"]);
        assert_eq!(summary.key_metrics["cost_change"], "12.9%");
        assert_eq!(oracle.prompts().len(), 1);
    }

    #[tokio::test]
    async fn repairs_malformed_summary_once() {
        let (oracle, narrator) = narrator(vec![
            Ok("Narrative".to_string()),
            Ok("Here is your summary: profit was bad".to_string()),
            Ok(valid_summary()),
        ]);
        let (_, summary) = narrator.analyze(&ctx()).await;

        assert_eq!(summary.source, SummarySource::Oracle);
        let prompts = oracle.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("INVALID OUTPUT"));
    }

    #[tokio::test]
    async fn persistent_garbage_records_parse_failure() {
        let (_, narrator) = narrator(vec![
            Ok("Narrative".to_string()),
            Ok("not json".to_string()),
            Ok("{\"profit_loss_status\": \"positive\", \"current_profit\": 5}".to_string()),
        ]);
        let (narrative, summary) = narrator.analyze(&ctx()).await;

        assert_eq!(narrative.source, NarrativeSource::Oracle);
        assert_eq!(summary.source, SummarySource::ParseFailure);
        assert_eq!(summary.profit_loss_status, ProfitStatus::Negative);
        assert_eq!(summary.alerts, vec!["Unable to parse LLM JSON response"]);
        assert_eq!(summary.recommendations, vec!["Review analysis manually"]);
    }

    #[tokio::test]
    async fn recommend_sends_the_recommendations_prompt() {
        let (oracle, narrator) = narrator(vec![Ok("1. Cut overtime\n2. Pause ads".to_string())]);
        let text = narrator.recommend(&ctx()).await;

        assert_eq!(text.as_deref(), Some("1. Cut overtime\n2. Pause ads"));
        assert!(oracle.prompts()[0].contains("actionable recommendations"));
    }

    #[tokio::test]
    async fn recommend_failure_yields_nothing() {
        let (_, narrator) = narrator(vec![ScriptedOracle::failure("timeout")]);
        assert_eq!(narrator.recommend(&ctx()).await, None);
    }

    #[tokio::test]
    async fn summary_call_failure_is_unavailable() {
        let (_, narrator) = narrator(vec![Ok("Narrative".to_string()), ScriptedOracle::failure("http")]);
        let (_, summary) = narrator.analyze(&ctx()).await;
        assert_eq!(summary.source, SummarySource::OracleUnavailable);
    }
}
