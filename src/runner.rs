use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;

use crate::config::ModelConfig;
use crate::error::SentinelError;
use crate::execution_stats::{log_execution_statistics, ExecutionTimer};
use crate::handle::SimulationHandle;
use crate::log::configure_from_str;
use crate::model::OutbreakModel;
use crate::web_api;

#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(about = "Simulate a clinic network and detect outbreak signals")]
pub struct Cli {
    /// Log level, either a single level (`info`) or a list such as `warn,sentinel::model=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the simulation over HTTP
    Serve(ServeArgs),
    /// Run a simulation without a server and print the final state as JSON
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,
}

/// Model options shared by commands that build a model. Values given here override the config
/// file.
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// Optional path to a JSON model config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub num_clinics: Option<usize>,

    /// Outbreak probability in percent
    #[arg(long)]
    pub outbreak_probability: Option<u32>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Number of days to simulate
    #[arg(short, long, default_value_t = 30)]
    pub days: u32,

    /// Optional directory for CSV reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl ModelArgs {
    /// Builds the model configuration from the config file, if any, and the overrides.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn to_config(&self) -> Result<ModelConfig, SentinelError> {
        let mut config = match &self.config {
            Some(path) => {
                info!("loading model config from {}", path.display());
                ModelConfig::from_json_file(path)?
            }
            None => ModelConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(num_clinics) = self.num_clinics {
            config.num_clinics = num_clinics;
        }
        if let Some(outbreak_probability) = self.outbreak_probability {
            config.outbreak_probability = outbreak_probability;
        }
        Ok(config)
    }
}

/// Builds a model, steps it `args.days` times, and writes reports if an output directory was
/// given. Returns the finished model.
///
/// # Errors
/// Returns an error if the configuration is invalid or the reports cannot be written.
pub fn run_headless(args: &RunArgs) -> Result<OutbreakModel, SentinelError> {
    let mut model = OutbreakModel::new(args.model.to_config()?)?;

    let timer = ExecutionTimer::start();
    for _ in 0..args.days {
        model.step();
    }
    log_execution_statistics(&timer.finish(args.days));

    if let Some(output_dir) = &args.output_dir {
        model.collector().write_csv(output_dir)?;
    }
    Ok(model)
}

/// Runs the command described by `cli`.
///
/// # Errors
/// Returns an error if logging, the model, or the server cannot be set up.
pub async fn run_cli(cli: Cli) -> Result<(), SentinelError> {
    if let Some(spec) = &cli.log_level {
        configure_from_str(spec)?;
    }

    match cli.command {
        Commands::Serve(args) => {
            web_api::serve(SocketAddr::new(args.host, args.port), SimulationHandle::new()).await
        }
        Commands::Run(args) => {
            let model = run_headless(&args)?;
            println!("{}", serde_json::to_string_pretty(&model.get_state())?);
            Ok(())
        }
    }
}
