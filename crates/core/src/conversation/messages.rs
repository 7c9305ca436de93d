use crate::domain::contract::AnalysisSummary;
use crate::domain::report::Report;
use chrono::NaiveDate;

pub fn greeting(table: &str, example: Option<NaiveDate>) -> String {
    let example = example
        .map(|d| format!(" (e.g., {d})"))
        .unwrap_or_default();
    format!(
        "Hello! I'm your Business Analytics Assistant. 🤖\n\n\
To analyze your sales and cost data, please select a date from the available data.\n\n\
{table}\n\n\
💡 Please enter the date you'd like to analyze in YYYY-MM-DD format{example}"
    )
}

pub fn date_prompt(table: &str) -> String {
    format!("{table}\n\n💡 Please enter the date you'd like to analyze:")
}

pub fn invalid_date(input: &str) -> String {
    if input.is_empty() {
        "❌ Please enter a date from the table in YYYY-MM-DD format.".to_string()
    } else {
        format!(
            "❌ The entered date ({input}) is not in the available data. Please select one of the dates from the table."
        )
    }
}

pub fn missing_previous_day(date: NaiveDate, previous: Option<NaiveDate>) -> String {
    let previous = previous
        .map(|d| format!(" ({d})"))
        .unwrap_or_default();
    format!(
        "⚠️ Sorry, no data is available for the day before {date}{previous}. \
Please select a date that has previous day data for comparison."
    )
}

pub fn confirm(date: NaiveDate) -> String {
    format!("✅ Date {date} selected.\n\nDo you want me to analyze the business data for this date? (yes/no)")
}

pub fn confirm_reprompt() -> String {
    "Please answer with 'yes' or 'no'. Do you want me to analyze the business data?".to_string()
}

pub fn analysis_started() -> String {
    "🔍 Starting business data analysis...".to_string()
}

pub fn analysis_complete(narrative: &str, report: &Report, summary: &AnalysisSummary) -> String {
    let report_json = serde_json::to_string_pretty(report).unwrap_or_default();
    let summary_json = serde_json::to_string_pretty(summary).unwrap_or_default();
    format!(
        "{narrative}\n\n\
📋 **Report:**\n```json\n{report_json}\n```\n\n\
🧾 **Model summary:**\n```json\n{summary_json}\n```\n\n\
Would you like to analyze another date? (yes/no)"
    )
}

pub fn another_reprompt() -> String {
    "Please answer with 'yes' or 'no'. Would you like to analyze another date?".to_string()
}

pub fn goodbye() -> String {
    "Thank you for using Business Analytics Chat! 👋".to_string()
}
