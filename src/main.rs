#![allow(missing_docs)]

//! CrisisBench CLI: thin glue over the library entry points.
//!
//! Three subcommands: `generate` a scenario package, `run` a scenario
//! against an agent model, `inspect` a package's integrity.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use crisisbench::config::RunConfig;
use crisisbench::generator::{generate_to_dir, GeneratorParams};
use crisisbench::providers::openai::OpenAiCompatClient;
use crisisbench::runtime::run_benchmark;
use crisisbench::scenario::package::load_package;
use crisisbench::scenario::types::{CrisisType, NoiseTier};

#[derive(Parser)]
#[command(name = "crisisbench", version, about = "Scenario generator and agent runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a scenario package.
    Generate {
        /// Crisis type (currently `cardiac_arrest`).
        #[arg(long, default_value = "cardiac_arrest")]
        crisis_type: CrisisType,
        /// Noise tier: t1, t2, t3, or t4.
        #[arg(long)]
        tier: NoiseTier,
        /// Seed for the shared random source.
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Scenario date (YYYY-MM-DD); year must be 2027 or later.
        #[arg(long, default_value = "2027-06-12")]
        date: NaiveDate,
        /// Parent directory for the package.
        #[arg(long, default_value = "scenarios")]
        out: PathBuf,
    },
    /// Run a scenario against an agent model.
    Run {
        /// Scenario package directory.
        #[arg(long)]
        scenario: PathBuf,
        /// Run configuration JSON file.
        #[arg(long)]
        config: PathBuf,
        /// Where to write the transcript JSON.
        #[arg(long, default_value = "transcript.json")]
        out: PathBuf,
        /// Logs directory for the JSON file layer.
        #[arg(long, default_value = "logs")]
        logs_dir: PathBuf,
    },
    /// Verify a package and print summary counts.
    Inspect {
        /// Scenario package directory.
        #[arg(long)]
        scenario: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            crisis_type,
            tier,
            seed,
            date,
            out,
        } => {
            crisisbench::logging::init_cli();
            let params = GeneratorParams {
                crisis_type,
                noise_tier: tier,
                seed,
                scenario_date: date,
            };
            let dir = generate_to_dir(&params, &out).context("generation failed")?;
            println!("{}", dir.display());
        }
        Command::Run {
            scenario,
            config,
            out,
            logs_dir,
        } => {
            let _guard = crisisbench::logging::init_production(&logs_dir)?;
            let run_config = RunConfig::load(&config)?;
            let client = OpenAiCompatClient::from_env(run_config.api_base.as_deref())
                .context("model client setup failed")?;
            let transcript = run_benchmark(&scenario, run_config, Arc::new(client))
                .await
                .context("run failed")?;

            let serialized =
                serde_json::to_string_pretty(&transcript).context("transcript serialization")?;
            std::fs::write(&out, serialized)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(run_id = %transcript.run_id, path = %out.display(), "transcript written");
            println!("{}", out.display());
        }
        Command::Inspect { scenario } => {
            crisisbench::logging::init_cli();
            let package = load_package(&scenario).context("package failed verification")?;
            println!("scenario_id:         {}", package.scenario_id);
            println!("noise_tier:          {}", package.noise_tier);
            println!("seed:                {}", package.seed);
            println!("heartbeats:          {}", package.heartbeats.len());
            println!("crisis_heartbeat_id: {}", package.crisis_heartbeat_id);
            println!("tools:               {}", package.tool_definitions.len());
            println!(
                "modules:             {}",
                crisisbench::generator::tiers::visible_modules(package.noise_tier).join(", ")
            );
            println!("memory_files:        {}", package.memory_files.len());
            println!("content_hash:        {}", package.manifest.content_hash);
        }
    }

    Ok(())
}
