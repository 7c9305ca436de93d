use anyhow::Context;
use bizchat_core::domain::report::Report;
use std::path::{Path, PathBuf};

/// Destination for finished reports.
pub trait ReportSink {
    fn destination(&self) -> String;

    fn save(&self, report: &Report) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonFileSink {
    fn destination(&self) -> String {
        self.path.display().to_string()
    }

    fn save(&self, report: &Report) -> anyhow::Result<()> {
        let body = report.to_json_pretty()?;
        std::fs::write(&self.path, body)
            .with_context(|| format!("failed to write report to {}", self.path.display()))
    }
}

/// Never fails the session: outcomes are logged and echoed to the user.
pub fn save_report(sink: &dyn ReportSink, report: Option<&Report>) -> String {
    let Some(report) = report else {
        return "❌ No analysis result to save yet.".to_string();
    };

    match sink.save(report) {
        Ok(()) => {
            tracing::info!(destination = %sink.destination(), date = %report.summary.date, "report saved");
            format!("✅ Analysis saved to {}", sink.destination())
        }
        Err(err) => {
            tracing::warn!(destination = %sink.destination(), error = %format!("{err:#}"), "report save failed");
            format!("⚠️ Could not save the analysis: {err:#}")
        }
    }
}
