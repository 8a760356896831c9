//! `algoplayer`: play a clinical decision algorithm in the terminal, or check
//! an algorithm document for structural problems.

mod session;
mod sources;
mod validate;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use algorithm_core::{AlgorithmPlayer, PlayerConfig, ValidationMode, init_observability};
use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "algoplayer", version, about = "Clinical decision algorithm player")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Step through an algorithm interactively.
    Play(PlayArgs),
    /// Report structural problems in an algorithm document. Exits 1 on errors.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Play a single algorithm document.
    #[arg(long, conflicts_with_all = ["dir", "demo", "api_url"])]
    file: Option<PathBuf>,
    /// Directory holding `<id>.json` documents; needs `--id`.
    #[arg(long, requires = "id", conflicts_with_all = ["demo", "api_url"])]
    dir: Option<PathBuf>,
    /// Algorithm id, read from `--dir` or the API.
    #[arg(long)]
    id: Option<i64>,
    /// API root; defaults to `ALGOPLAYER_API_BASE_URL`.
    #[arg(long, requires = "id")]
    api_url: Option<String>,
    /// Play the bundled chest pain algorithm.
    #[arg(long, conflicts_with = "id")]
    demo: bool,
    /// Play graphs with structural errors instead of refusing them.
    #[arg(long)]
    lenient: bool,
    /// Do not report views and usages.
    #[arg(long)]
    no_telemetry: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Algorithm document to check.
    path: PathBuf,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

impl PlayArgs {
    fn player_config(&self) -> PlayerConfig {
        let mut config = PlayerConfig::from_env();
        if self.lenient {
            config = config.with_validation(ValidationMode::Lenient);
        }
        if self.no_telemetry {
            config = config.with_telemetry(false);
        }
        config
    }
}

async fn play(args: PlayArgs) -> anyhow::Result<ExitCode> {
    let target = sources::Target::from_args(&args)?;
    let (source, algorithm_id) = target.open().await?;
    let mut player = AlgorithmPlayer::new(source, args.player_config());
    player
        .initialize(algorithm_id)
        .await
        .with_context(|| format!("could not load algorithm {algorithm_id}"))?;

    let (mut player, _) =
        session::run_blocking(player, io::BufReader::new(io::stdin()), io::stdout()).await?;
    player.flush_telemetry().await;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_observability();
    let cli = Cli::parse();
    match cli.command {
        Command::Play(args) => play(args).await,
        Command::Validate(args) => {
            let clean = validate::run(&args.path, args.json, &mut io::stdout()).await?;
            Ok(if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
