pub mod commands;

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::Level;

use orderflow_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use orderflow_core::domain::status::StatusCategory;
use orderflow_core::workflow::permissions::StatusView;
use orderflow_core::workflow::registry::ReorderDirection;

use crate::commands::edit::EditAction;
use crate::commands::gate::GateArgs;

#[derive(Debug, Parser)]
#[command(
    name = "orderflow",
    about = "Orderflow status workflow CLI",
    long_about = "Manage quote and order status configuration, check transitions and evaluate payment gates.",
    after_help = "Examples:\n  orderflow seed\n  orderflow statuses --category quote\n  orderflow check-transition --from approved --to pending_payment\n  orderflow gate --status processing --paid 60"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Seed the default quote and order statuses into an empty store")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "List the statuses of one category with permissions and reachable targets")]
    Statuses {
        #[arg(long)]
        category: StatusCategory,
        #[arg(long, value_enum, help = "Only list statuses visible in this view")]
        view: Option<ViewArg>,
    },
    #[command(about = "Validate the stored status configuration as a whole")]
    Validate,
    #[command(about = "Check whether an entity may move between two statuses")]
    CheckTransition {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    #[command(about = "Evaluate the ship and completion payment gates for a status")]
    Gate {
        #[arg(long)]
        status: String,
        #[arg(long, help = "Category to resolve the status name in first")]
        category: Option<StatusCategory>,
        #[arg(long, help = "Percentage of the total already paid")]
        paid: Decimal,
        #[arg(long)]
        phone_verified: bool,
        #[arg(long)]
        cod_collected: bool,
    },
    #[command(subcommand, about = "Edit the status configuration and persist it")]
    Edit(EditCommand),
}

#[derive(Debug, Subcommand)]
enum EditCommand {
    #[command(about = "Append a new status to a category")]
    Add {
        #[arg(long)]
        category: StatusCategory,
        #[arg(long, help = "Name for the new status (defaults to a generated placeholder)")]
        name: Option<String>,
    },
    #[command(about = "Merge a camelCase JSON object into an existing status")]
    Patch {
        #[arg(long)]
        category: StatusCategory,
        #[arg(long)]
        name: String,
        #[arg(long)]
        json: String,
    },
    #[command(about = "Remove a status and renumber the rest of its category")]
    Remove {
        #[arg(long)]
        category: StatusCategory,
        #[arg(long)]
        name: String,
    },
    #[command(about = "Swap a status with its neighbour")]
    Move {
        #[arg(long)]
        category: StatusCategory,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        direction: DirectionArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ViewArg {
    QuotesList,
    OrdersList,
    Customer,
    Admin,
}

impl From<ViewArg> for StatusView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::QuotesList => StatusView::QuotesList,
            ViewArg::OrdersList => StatusView::OrdersList,
            ViewArg::Customer => StatusView::Customer,
            ViewArg::Admin => StatusView::Admin,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for ReorderDirection {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::Up => ReorderDirection::Up,
            DirectionArg::Down => ReorderDirection::Down,
        }
    }
}

impl From<EditCommand> for EditAction {
    fn from(command: EditCommand) -> Self {
        match command {
            EditCommand::Add { category, name } => EditAction::Add { category, name },
            EditCommand::Patch { category, name, json } => {
                EditAction::Patch { category, name, json }
            }
            EditCommand::Remove { category, name } => EditAction::Remove { category, name },
            EditCommand::Move { category, name, direction } => {
                EditAction::Move { category, name, direction: direction.into() }
            }
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays a
/// single JSON document per command.
pub fn init_logging(config: &LoggingConfig) {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(io::stderr);

    // A subscriber may already be installed when commands run in-process.
    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config.logging);
    }

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Statuses { category, view } => {
            commands::statuses::run(category, view.map(StatusView::from))
        }
        Command::Validate => commands::validate::run(),
        Command::CheckTransition { from, to } => commands::check_transition::run(&from, &to),
        Command::Gate { status, category, paid, phone_verified, cod_collected } => {
            commands::gate::run(GateArgs { status, category, paid, phone_verified, cod_collected })
        }
        Command::Edit(edit) => commands::edit::run(edit.into()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
