use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use std::sync::Arc;
use tracing::Level;
use wandforge::spell::TemplateRegistry;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/spells.json")]
    spells: String,

    /// JSON tuning file; explicit command-line flags still win
    #[arg(global = true, long = "config")]
    config_file: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile every spell in the library and print a summary
    Validate(cmd::validate::ValidateArgs),
    /// Run a recorded sample stream through the matcher
    Replay(cmd::replay::ReplayArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let registry = match TemplateRegistry::load_from_file(&cli.spells) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            eprintln!("failed to load spell library '{}': {}", cli.spells, e);
            process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::Validate(args) => cmd::validate::run(args, &registry),
        Commands::Replay(args) => {
            let Some(sub_matches) = matches.subcommand_matches("replay") else {
                process::exit(2);
            };
            cmd::replay::resolve_config(args, cli.config_file.as_deref(), sub_matches)
                .and_then(|config| cmd::replay::run(args, config, registry))
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
