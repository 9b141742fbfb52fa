use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxcalc::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxcalc::AppCommand {
    fn from(cmd: Commands) -> fxcalc::AppCommand {
        match cmd {
            Commands::Rates => fxcalc::AppCommand::Rates,
            Commands::Convert {
                amount,
                from,
                to,
                swap,
            } => fxcalc::AppCommand::Convert {
                amount,
                from,
                to,
                swap,
            },
            Commands::Calc { keys, from, to } => fxcalc::AppCommand::Calc { keys, from, to },
            Commands::Widget { json } => fxcalc::AppCommand::Widget { json },
            Commands::Watch { cycles } => fxcalc::AppCommand::Watch { cycles },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display all exchange rates
    Rates,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert, "1,5" and "1.5" are both accepted
        amount: String,
        /// Source currency code
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency code
        #[arg(short, long)]
        to: Option<String>,
        /// Exchange source and target before converting
        #[arg(short, long)]
        swap: bool,
    },
    /// Replay calculator keys and convert the result
    Calc {
        /// Keys such as `12+3=`; use `<` to delete and `C` to clear
        #[arg(required = true, allow_hyphen_values = true)]
        keys: Vec<String>,
        /// Source currency code
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency code
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Display the widget rate snapshot
    Widget {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh rates periodically and display the widget snapshot
    Watch {
        /// Stop after this many refreshes
        #[arg(long)]
        cycles: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxcalc::cli::setup::setup(),
        Some(cmd) => fxcalc::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
