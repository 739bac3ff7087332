mod command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use command::{CommandAction, CommandHandler};
use context_resolver::ResolverConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "context-symbols")]
#[command(about = "Resolve symbol reports into one deduplicated symbol graph", long_about = None)]
#[command(version)]
struct Cli {
    /// Resolver configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a batch and print the full result as JSON
    Resolve {
        /// Batch file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print counts and findings
    Summary {
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Search symbols by name
    Search {
        term: String,

        #[arg(short, long, default_value = "-")]
        input: String,

        /// Maximum number of hits (defaults to the configured search limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Classes and modules that depend on a symbol
    Dependents {
        fqname: String,

        #[arg(short, long, default_value = "-")]
        input: String,

        /// Maximum number of dependency edges to follow
        #[arg(long, default_value_t = 1)]
        hops: usize,
    },

    /// Print dependency, inheritance and mixin cycles
    Cycles {
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Print the JSON schema of the input batch
    Schema,
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.target(env_logger::Target::Stderr);
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        2 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => ResolverConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    let action = match cli.command {
        Commands::Resolve { input, pretty } => CommandAction::Resolve { input, pretty },
        Commands::Summary { input } => CommandAction::Summary { input },
        Commands::Search { term, input, limit } => CommandAction::Search { term, input, limit },
        Commands::Dependents {
            fqname,
            input,
            hops,
        } => CommandAction::Dependents {
            fqname,
            input,
            hops,
        },
        Commands::Cycles { input } => CommandAction::Cycles { input },
        Commands::Schema => CommandAction::Schema,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    CommandHandler::new(config).execute(action, &mut out)
}
