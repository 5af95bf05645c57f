use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use ielts_coach::adapter::Adapter;
use ielts_coach::config::{KeyStore, Settings};
use ielts_coach::consts::{API_KEY_VAR, DEFAULT_ENV_FILE, mask_secret};
use ielts_coach::llm::ChatClient;
use ielts_coach::logging;
use ielts_coach::pipeline::{Pipeline, bounded};
use ielts_coach::scorer::rubric::RubricScorer;
use ielts_coach::staging::StagedImage;
use ielts_coach::submission::{Task1Submission, Task2Submission, require_api_key};

#[derive(Parser)]
#[command(
    name = "ielts-coach",
    version,
    about = "Examiner-style feedback on IELTS Writing Task 1 and Task 2 responses."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Credential store in KEY=value format
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Scoring model (overrides IELTS_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL (overrides OPENAI_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Give up on a scoring request after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Directory for app.log and its backups
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Score a Task 1 response against its chart, graph or diagram
    Task1 {
        /// The Task 1 image
        #[arg(short, long)]
        image: Option<PathBuf>,

        #[command(flatten)]
        essay: EssayArgs,
    },
    /// Score a Task 2 essay against its question
    Task2 {
        /// The Task 2 question
        #[arg(short, long)]
        question: Option<String>,

        /// Read the question from a file
        #[arg(long, conflicts_with = "question")]
        question_file: Option<PathBuf>,

        #[command(flatten)]
        essay: EssayArgs,
    },
    /// Manage the scoring API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args)]
struct EssayArgs {
    /// The essay text
    #[arg(short, long)]
    essay: Option<String>,

    /// Read the essay from a file
    #[arg(long, conflicts_with = "essay")]
    essay_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save the API key (prompts when no value is given)
    Set { value: Option<String> },
    /// Show whether a key is configured
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let keys = Arc::new(KeyStore::open(&cli.env_file)?);
    let mut settings = Settings::from_store(&keys);
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(base_url) = cli.base_url {
        settings.api_base_url = base_url;
    }
    if let Some(secs) = cli.timeout {
        settings.timeout = Duration::from_secs(secs);
    }
    if let Some(dir) = cli.log_dir {
        settings.log_dir = dir;
    }

    let log_path = logging::init(&settings.log_dir)?;
    debug!(log = %log_path.display(), model = %settings.model, "starting");

    match cli.command {
        Command::Key { action } => handle_key(&keys, action),
        Command::Task1 { image, essay } => {
            require_api_key(&keys)?;
            let submission = Task1Submission::new(image, &read_text(essay.essay, essay.essay_file)?)?;
            let staged = StagedImage::copy_from(submission.image())?;

            let pipeline = build_pipeline(Arc::clone(&keys), &settings);
            let doc = bounded(
                settings.timeout,
                pipeline.analyze_task1(staged.path(), &submission.essay),
                tokio::signal::ctrl_c(),
            )
            .await;
            println!("{doc}");
            Ok(())
        }
        Command::Task2 {
            question,
            question_file,
            essay,
        } => {
            require_api_key(&keys)?;
            let submission = Task2Submission::new(
                &read_text(question, question_file)?,
                &read_text(essay.essay, essay.essay_file)?,
            )?;

            let pipeline = build_pipeline(Arc::clone(&keys), &settings);
            let doc = bounded(
                settings.timeout,
                pipeline.analyze_task2(&submission.question, &submission.essay),
                tokio::signal::ctrl_c(),
            )
            .await;
            println!("{doc}");
            Ok(())
        }
    }
}

fn build_pipeline(keys: Arc<KeyStore>, settings: &Settings) -> Pipeline {
    let scorer = Arc::new(RubricScorer::new(ChatClient::new(keys, settings)));
    Pipeline::new(Adapter::new(scorer.clone(), scorer))
}

/// Inline text wins; otherwise read the file; otherwise empty (validation
/// reports what is missing).
fn read_text(inline: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

fn handle_key(keys: &KeyStore, action: KeyAction) -> anyhow::Result<()> {
    match action {
        KeyAction::Set { value } => {
            let value = match value {
                Some(v) => v,
                None => {
                    print!("Paste your {API_KEY_VAR}: ");
                    io::stdout().flush()?;
                    let mut line = String::new();
                    io::stdin().read_line(&mut line)?;
                    line
                }
            };
            if value.trim().is_empty() {
                bail!("no API key provided");
            }
            keys.set(API_KEY_VAR, &value)?;
            println!("✓ API key saved to {}", keys.path().display());
        }
        KeyAction::Status => match keys.get(API_KEY_VAR) {
            Some(key) => println!("{API_KEY_VAR}: configured ({})", mask_secret(&key)),
            None => println!("{API_KEY_VAR}: not configured"),
        },
    }
    Ok(())
}
