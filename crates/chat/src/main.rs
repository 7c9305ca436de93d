use anyhow::Context;
use bizchat_core::analysis::alerts::AlertThresholds;
use bizchat_core::config::Settings;
use bizchat_core::conversation::{Controller, Stage, Turn};
use bizchat_core::dataset::Dataset;
use bizchat_core::llm::narrator::Narrator;
use bizchat_core::llm::offline::OfflineOracle;
use bizchat_core::llm::NarrativeOracle;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod save;

use save::{save_report, JsonFileSink};

#[derive(Debug, Parser)]
#[command(name = "bizchat")]
struct Args {
    /// JSON dataset keyed by YYYY-MM-DD. Falls back to BIZCHAT_DATASET, then the built-in sample.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Never call a language model; use the deterministic fallback narrative.
    #[arg(long)]
    offline: bool,

    /// Where the `save` command writes the last report.
    #[arg(long, default_value = "analysis_result.json")]
    save_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "chat session failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let dataset = load_dataset(args.dataset.as_deref(), settings)?;
    let oracle: Arc<dyn NarrativeOracle> = if args.offline {
        Arc::new(OfflineOracle)
    } else {
        bizchat_core::llm::oracle_from_settings(settings)?
    };

    let narrator = Narrator::new(oracle, settings.summary_repair_attempts);
    let controller = Controller::new(Arc::new(dataset), narrator, AlertThresholds::from_env());
    let sink = JsonFileSink::new(args.save_path);

    tracing::info!(
        session_id = %controller.session_id(),
        days = controller.dataset().len(),
        "chat session started"
    );

    println!("🤖 Business Analytics Chat");
    println!("{}", "=".repeat(55));

    let turn = controller.step(controller.start(), "").await?;
    print_turn(&turn);
    let mut state = turn.state;

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    while state.stage != Stage::End {
        print!("\nYou: ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!("\n👋 Goodbye!");
            break;
        };
        let line = line.context("failed to read from stdin")?;
        let input = line.trim();

        match input.to_lowercase().as_str() {
            "exit" | "quit" | "q" => {
                println!("\n👋 Goodbye!");
                break;
            }
            "save" => {
                println!("\n{}", save_report(&sink, state.accumulated_report.as_ref()));
                continue;
            }
            _ => {}
        }

        let turn = controller.step(state, input).await?;
        print_turn(&turn);
        state = turn.state;
    }

    tracing::info!(session_id = %controller.session_id(), "chat session finished");
    Ok(())
}

fn load_dataset(path_arg: Option<&Path>, settings: &Settings) -> anyhow::Result<Dataset> {
    let path = path_arg
        .map(Path::to_path_buf)
        .or_else(|| settings.dataset_path.as_ref().map(PathBuf::from));

    match path {
        Some(path) => {
            let dataset = Dataset::from_json_file(&path)?;
            anyhow::ensure!(
                !dataset.is_empty(),
                "dataset {} contains no records",
                path.display()
            );
            tracing::info!(path = %path.display(), days = dataset.len(), "loaded dataset");
            Ok(dataset)
        }
        None => Ok(Dataset::sample()),
    }
}

fn print_turn(turn: &Turn) {
    for message in &turn.messages {
        println!("\n{message}");
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
