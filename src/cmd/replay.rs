use crate::reports;
use clap::{ArgMatches, Args};
use std::sync::Arc;
use tracing::info;
use wandforge::config::Config;
use wandforge::engine::replay_recording;
use wandforge::error::WfResult;
use wandforge::loader::load_recording_from_file;
use wandforge::spell::TemplateRegistry;

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub config: Config,

    /// CSV of samples: id,timestamp_ms,x_delta,y_delta[,abs_x,abs_y]
    #[arg(short, long)]
    pub recording: String,

    #[arg(short = 'p', long)]
    pub spell: String,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Emit matches as JSON lines instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// File config (or defaults), then explicit CLI flags on top.
pub fn resolve_config(
    args: &ReplayArgs,
    config_file: Option<&str>,
    matches: &ArgMatches,
) -> WfResult<Config> {
    let mut config = match config_file {
        Some(path) => {
            info!("loading config from '{}'", path);
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };
    config.merge_from_cli(&args.config, matches);
    config.validate()?;
    Ok(config)
}

pub fn run(args: &ReplayArgs, config: Config, registry: Arc<TemplateRegistry>) -> WfResult<()> {
    let samples = load_recording_from_file(&args.recording)?;
    info!(
        "replaying {} samples from '{}' against '{}'",
        samples.len(),
        args.recording,
        args.spell
    );

    let matches = replay_recording(&config, registry, &args.spell, samples, args.seed)?;

    if args.json {
        for m in &matches {
            println!("{}", serde_json::to_string(m)?);
        }
    } else {
        println!("{} match(es)", matches.len());
        if !matches.is_empty() {
            reports::print_match_table(&matches);
        }
    }
    Ok(())
}
