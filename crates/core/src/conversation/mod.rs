use crate::analysis::alerts::AlertThresholds;
use crate::analysis::{recommendations, report, AnalysisContext};
use crate::dataset::Dataset;
use crate::domain::report::Report;
use crate::llm::narrator::{NarrativeSource, Narrator};
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub mod messages;

const AFFIRMATIVE: [&str; 4] = ["yes", "y", "yeah", "sure"];
const NEGATIVE: [&str; 3] = ["no", "n", "nope"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Greeting,
    DateSelection,
    ConfirmAnalysis,
    Analysis,
    Complete,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    pub stage: Stage,
    pub selected_date: Option<NaiveDate>,
    pub accumulated_report: Option<Report>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            stage: Stage::Greeting,
            selected_date: None,
            accumulated_report: None,
        }
    }
}

impl ConversationState {
    fn at(self, stage: Stage) -> Self {
        Self { stage, ..self }
    }

    fn with_selected_date(self, selected_date: Option<NaiveDate>) -> Self {
        Self {
            selected_date,
            ..self
        }
    }
}

/// Result of one user turn: the next state plus one message per transition taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub state: ConversationState,
    pub messages: Vec<String>,
}

impl Turn {
    fn single(state: ConversationState, message: String) -> Self {
        Self {
            state,
            messages: vec![message],
        }
    }

    pub fn reply(&self) -> String {
        self.messages.join("\n\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The conversation reached `end`; start a new one instead.
    Ended,
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ended => write!(f, "conversation has ended; start a new session"),
        }
    }
}

impl std::error::Error for ConversationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    Other,
}

fn classify(input: &str) -> Answer {
    let normalized = input.trim().to_lowercase();
    if AFFIRMATIVE.contains(&normalized.as_str()) {
        Answer::Yes
    } else if NEGATIVE.contains(&normalized.as_str()) {
        Answer::No
    } else {
        Answer::Other
    }
}

pub struct Controller {
    dataset: Arc<Dataset>,
    narrator: Narrator,
    thresholds: AlertThresholds,
    session_id: Uuid,
}

impl Controller {
    pub fn new(dataset: Arc<Dataset>, narrator: Narrator, thresholds: AlertThresholds) -> Self {
        Self {
            dataset,
            narrator,
            thresholds,
            session_id: Uuid::new_v4(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn start(&self) -> ConversationState {
        ConversationState::default()
    }

    /// Consumes the previous state and returns the next one. Fails only after `end`.
    pub async fn step(
        &self,
        state: ConversationState,
        input: &str,
    ) -> Result<Turn, ConversationError> {
        let span = tracing::debug_span!("turn", session_id = %self.session_id, stage = ?state.stage);
        async move {
            let from = state.stage;
            let turn = self.transition(state, input.trim()).await?;
            tracing::debug!(?from, to = ?turn.state.stage, messages = turn.messages.len(), "transition");
            Ok(turn)
        }
        .instrument(span)
        .await
    }

    async fn transition(
        &self,
        state: ConversationState,
        input: &str,
    ) -> Result<Turn, ConversationError> {
        let turn = match state.stage {
            Stage::Greeting => Turn::single(
                state.at(Stage::DateSelection),
                messages::greeting(&self.dataset.render_table(), self.example_date()),
            ),
            Stage::DateSelection => self.select_date(state, input),
            Stage::ConfirmAnalysis => match classify(input) {
                Answer::Yes => {
                    let started = messages::analysis_started();
                    let mut turn = self.analyze(state.at(Stage::Analysis)).await;
                    turn.messages.insert(0, started);
                    turn
                }
                Answer::No => self.back_to_selection(state),
                Answer::Other => Turn::single(state, messages::confirm_reprompt()),
            },
            Stage::Analysis => self.analyze(state).await,
            Stage::Complete => match classify(input) {
                Answer::Yes => self.back_to_selection(state),
                Answer::No => Turn::single(state.at(Stage::End), messages::goodbye()),
                Answer::Other => Turn::single(state, messages::another_reprompt()),
            },
            Stage::End => return Err(ConversationError::Ended),
        };
        Ok(turn)
    }

    fn select_date(&self, state: ConversationState, input: &str) -> Turn {
        let Some((date, _)) = self.dataset.lookup(input) else {
            return Turn::single(state, messages::invalid_date(input));
        };

        if self.dataset.previous_day(date).is_none() {
            return Turn::single(
                state,
                messages::missing_previous_day(date, date.pred_opt()),
            );
        }

        Turn::single(
            state
                .at(Stage::ConfirmAnalysis)
                .with_selected_date(Some(date)),
            messages::confirm(date),
        )
    }

    fn back_to_selection(&self, state: ConversationState) -> Turn {
        Turn::single(
            state.at(Stage::DateSelection).with_selected_date(None),
            messages::date_prompt(&self.dataset.render_table()),
        )
    }

    async fn analyze(&self, state: ConversationState) -> Turn {
        let Some(ctx) = state.selected_date.and_then(|date| self.context_for(date)) else {
            tracing::warn!(selected_date = ?state.selected_date, "analysis requested without a comparable date");
            return self.back_to_selection(state);
        };

        let (narrative, summary) = self.narrator.analyze(&ctx).await;
        let recommendation_text = match (narrative.source, recommendations::from_summary(&summary)) {
            (NarrativeSource::Oracle, None) => self.narrator.recommend(&ctx).await,
            _ => None,
        };
        let recommendations = recommendations::select(
            &summary,
            recommendation_text.as_deref(),
            &ctx.metrics,
            &self.thresholds,
        );
        let report = report::assemble(
            ctx.date,
            &ctx.today,
            &ctx.metrics,
            ctx.alerts.clone(),
            recommendations,
        );

        tracing::info!(
            date = %ctx.date,
            provider = ?self.narrator.provider(),
            narrative = ?narrative.source,
            summary = ?summary.source,
            priority = %report.action_priority,
            alerts = report.alerts.len(),
            "analysis complete"
        );

        let message = messages::analysis_complete(&narrative.text, &report, &summary);
        let state = ConversationState {
            stage: Stage::Complete,
            selected_date: state.selected_date,
            accumulated_report: Some(report),
        };
        Turn::single(state, message)
    }

    fn context_for(&self, date: NaiveDate) -> Option<AnalysisContext> {
        let today = *self.dataset.get(date)?;
        let (previous_date, yesterday) = self.dataset.previous_day(date)?;
        Some(AnalysisContext::new(
            date,
            today,
            previous_date,
            *yesterday,
            &self.thresholds,
        ))
    }

    fn example_date(&self) -> Option<NaiveDate> {
        self.dataset
            .dates()
            .find(|d| self.dataset.previous_day(*d).is_some())
    }
}
