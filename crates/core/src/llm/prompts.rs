use crate::analysis::AnalysisContext;
use crate::dataset::format_money;
use crate::domain::record::DailyRecord;

pub fn analyst_system_prompt() -> String {
    [
        "You are a business analyst for a small business.",
        "Work only from the figures you are given; do not invent data.",
        "Be concise, concrete, and actionable.",
    ]
    .join("\n")
}

pub fn analysis_prompt(ctx: &AnalysisContext) -> String {
    let m = &ctx.metrics;
    let alerts = if ctx.alerts.is_empty() {
        "none".to_string()
    } else {
        ctx.alerts.join("; ")
    };

    format!(
        "Analyze the following business data and provide insights.\n\n\
Selected date: {date}\n{today}\n\
Previous day ({prev}):\n{yesterday}\n\
Computed changes:\n\
- Revenue change: {rev}%\n\
- Cost change: {cost}%\n\
- Profit change: {profit}%\n\
- CAC change: {cac}%\n\
- Customer growth: {growth}%\n\
- ROI today: {roi}%\n\n\
Alerts: {alerts}\n\n\
Please provide:\n\
1. A comparison of the two days\n\
2. An interpretation of the key metrics (profit/loss, percentage changes, customer acquisition cost)\n\
3. Any further warnings the data suggests\n\
4. 3-5 specific, actionable recommendations as a numbered list\n\
5. An overall assessment of business performance\n\n\
Use clear section headings.",
        date = ctx.date,
        today = day_block("Current day", &ctx.today, m.today_profit),
        prev = ctx.previous_date,
        yesterday = day_block("Previous day", &ctx.yesterday, m.yesterday_profit),
        rev = m.revenue_change_pct,
        cost = m.cost_change_pct,
        profit = m.profit_change_pct,
        cac = m.cac_change_pct,
        growth = m.customer_growth_pct,
        roi = m.today_roi,
    )
}

pub fn consultant_system_prompt() -> String {
    [
        "You are a business consultant for a small business.",
        "Answer with a short list of recommendations only, one per line.",
        "Do not restate the figures you are given.",
    ]
    .join("\n")
}

pub fn recommendation_prompt(ctx: &AnalysisContext) -> String {
    let m = &ctx.metrics;
    let alerts = if ctx.alerts.is_empty() {
        "none".to_string()
    } else {
        ctx.alerts.join("; ")
    };

    format!(
        "Based on the following data, provide actionable recommendations.\n\n\
{today}\n\
{yesterday}\n\
Changes:\n\
- Revenue change: {rev}%\n\
- Cost change: {cost}%\n\
- Profit change: {profit}%\n\
- CAC change: {cac}%\n\
- Customer growth: {growth}%\n\n\
Alerts: {alerts}\n\n\
Please provide 3-5 specific and actionable recommendations covering:\n\
1. Immediate actions (if needed)\n\
2. Cost optimization\n\
3. Growth strategies\n\
4. Risk management\n\n\
Write the response as a clear and actionable list.",
        today = day_block("Today's", &ctx.today, m.today_profit),
        yesterday = day_block("Yesterday's", &ctx.yesterday, m.yesterday_profit),
        rev = m.revenue_change_pct,
        cost = m.cost_change_pct,
        profit = m.profit_change_pct,
        cac = m.cac_change_pct,
        growth = m.customer_growth_pct,
    )
}

fn day_block(label: &str, record: &DailyRecord, profit: f64) -> String {
    format!(
        "{label} data:\n\
- Revenue: {}\n\
- Cost: {}\n\
- Customers: {}\n\
- Marketing cost: {}\n\
- Profit: {}\n",
        format_money(record.revenue),
        format_money(record.cost),
        record.customers,
        format_money(record.marketing_cost),
        format_money(profit),
    )
}

pub fn summary_system_prompt() -> String {
    [
        "You produce machine-readable business summaries.",
        "Return ONLY valid JSON. Do not wrap in markdown. Do not include any extra keys.",
        "No trailing commas. No comments. Use double quotes for all JSON strings.",
    ]
    .join("\n")
}

pub fn summary_prompt(ctx: &AnalysisContext) -> String {
    format!(
        "Create a structured JSON summary of the business analysis for {date}.\n\n\
Current day: revenue {rev}, cost {cost}, customers {cust}\n\
Previous day: revenue {prev_rev}, cost {prev_cost}, customers {prev_cust}\n\
Profit today: {profit}\n\n\
{schema}",
        date = ctx.date,
        rev = format_money(ctx.today.revenue),
        cost = format_money(ctx.today.cost),
        cust = ctx.today.customers,
        prev_rev = format_money(ctx.yesterday.revenue),
        prev_cost = format_money(ctx.yesterday.cost),
        prev_cust = ctx.yesterday.customers,
        profit = ctx.metrics.today_profit,
        schema = summary_schema(),
    )
}

fn summary_schema() -> String {
    [
        "Output schema:",
        "{",
        "  \"profit_loss_status\": \"positive\" | \"negative\",",
        "  \"current_profit\": <number>,",
        "  \"alerts\": [\"...\"],",
        "  \"recommendations\": [\"...\"],",
        "  \"key_metrics\": { \"<name>\": <number or string> }",
        "}",
    ]
    .join("\n")
}

pub fn repair_prompt(previous_output: &str, expected_profit: f64) -> String {
    format!(
        "Your previous message was NOT a valid summary.\n\n\
TASK: Output ONLY a single JSON object that exactly matches the schema.\n\
- Do NOT include any markdown, prose, or code fences.\n\
- current_profit MUST be {expected_profit}.\n\
- profit_loss_status MUST be \"positive\" when current_profit > 0, otherwise \"negative\".\n\n\
{schema}\n\n\
INVALID OUTPUT (for reference only; DO NOT copy verbatim):\n{previous_output}",
        schema = summary_schema(),
    )
}
