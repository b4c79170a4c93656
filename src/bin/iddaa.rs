use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use iddaa_scraper::{
    Competition, CompetitionPreset, Dataset, GithubPublisher, IddaaClient, IddaaError,
};

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "iddaa", about = "Betting-program odds scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Collect a range of past weeks, newest first
    History {
        #[arg(long)]
        from: u32,
        #[arg(long)]
        to: u32,
    },

    /// Refresh the current week inside the existing dataset
    Current,

    /// Extract records from a saved program page
    Extract {
        #[arg(short, long)]
        input: PathBuf,
        /// Week to tag the records with
        #[arg(long, default_value_t = 0)]
        week: u32,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Built-in competition
    #[arg(long, global = true, default_value = "super-lig")]
    competition: CompetitionPreset,

    /// Section header label, overriding the preset
    #[arg(long, global = true, requires = "code")]
    label: Option<String>,

    /// League code, overriding the preset
    #[arg(long, global = true, requires = "label")]
    code: Option<String>,

    /// Only accept rows whose filter attribute contains this token
    #[arg(long, global = true)]
    row_filter: Option<String>,
}

impl TargetArgs {
    fn competition(&self) -> Competition {
        let mut competition = match (&self.label, &self.code) {
            (Some(label), Some(code)) => Competition::new(label, code),
            _ => self.competition.into(),
        };
        if let Some(token) = &self.row_filter {
            competition.row_filter = Some(token.clone());
        }
        competition
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Local CSV file to read from and write to
    #[arg(short, long, global = true, default_value = "matchodds.csv")]
    output: PathBuf,

    /// Publish to a GitHub repository given as `owner/name`
    #[arg(long, global = true, env = "TARGET_REPO")]
    publish: Option<String>,

    /// Path of the CSV file inside the repository
    #[arg(long, global = true, default_value = "matchodds.csv")]
    path: String,

    #[arg(long, global = true, env = "TARGET_REPO_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl OutputArgs {
    fn publisher(&self) -> CliResult<Option<GithubPublisher>> {
        let Some(slug) = &self.publish else {
            return Ok(None);
        };
        let (owner, repo) = slug
            .split_once('/')
            .ok_or_else(|| format!("expected owner/name, got `{slug}`"))?;
        let token = self
            .token
            .clone()
            .ok_or("publishing requires TARGET_REPO_TOKEN")?;
        Ok(Some(GithubPublisher::new(owner, repo, token)))
    }

    /// The dataset already stored at the destination, remote taking priority.
    async fn read_existing(&self) -> CliResult<Dataset> {
        if let Some(publisher) = self.publisher()? {
            return match publisher.read_file(&self.path).await? {
                Some(file) => Ok(Dataset::from_csv(&file.content)?),
                None => Ok(Dataset::default()),
            };
        }
        match std::fs::read_to_string(&self.output) {
            Ok(content) => Ok(Dataset::from_csv(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Dataset::default()),
            Err(e) => Err(IddaaError::from(e).into()),
        }
    }

    async fn write(&self, dataset: &Dataset, message: &str) -> CliResult<()> {
        let csv = dataset.to_csv()?;
        std::fs::write(&self.output, &csv).map_err(IddaaError::from)?;
        info!(path = %self.output.display(), rows = dataset.len(), "wrote dataset");

        if let Some(publisher) = self.publisher()? {
            let outcome = publisher.put_file(&self.path, &csv, message).await?;
            info!(path = %self.path, %outcome, "published dataset");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "iddaa_scraper=info,iddaa=info,warn",
        1 => "iddaa_scraper=debug,iddaa=debug,info",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let competition = cli.target.competition();
    let started = std::time::Instant::now();

    match cli.command {
        Command::History { from, to } => {
            let client = IddaaClient::new()?;
            let mut dataset = client.collect_weeks(from, to, &competition).await?;
            if dataset.is_empty() {
                warn!("no records collected");
                return Ok(());
            }
            dataset.sort_by_kickoff_desc();
            cli.output
                .write(&dataset, &format!("Update {}", cli.output.path))
                .await?;
        }

        Command::Current => {
            let client = IddaaClient::new()?;
            let week = client.get_current_week().await?;
            info!(week, "current week");

            let batch = client.get_week(week, &competition).await?;
            if batch.is_empty() {
                warn!(week, diagnostic = ?batch.diagnostic, "no records for current week");
                return Ok(());
            }

            let mut dataset = cli.output.read_existing().await?;
            dataset.replace_week(batch);
            dataset.sort_by_kickoff_desc();
            cli.output
                .write(&dataset, &format!("Update for week {week}"))
                .await?;
        }

        Command::Extract { input, week } => {
            let html = std::fs::read_to_string(&input).map_err(IddaaError::from)?;
            let batch = iddaa_scraper::Extractor::new()?
                .run_html(&html, &competition)
                .with_week(week);
            if batch.is_empty() {
                warn!(diagnostic = ?batch.diagnostic, "no records extracted");
            }
            let mut dataset = Dataset::default();
            dataset.push_batch(batch);
            cli.output
                .write(&dataset, &format!("Update {}", cli.output.path))
                .await?;
        }
    }

    info!(elapsed = ?started.elapsed(), "done");
    Ok(())
}
