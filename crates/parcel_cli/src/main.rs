//! `parcel` command-line front end.
//!
//! # Responsibility
//! - Parse arguments, open the tracker database, run one parcel command.
//! - Print results as JSON on stdout and errors on stderr.
//!
//! # Invariants
//! - The connection is opened here and dropped when `run` returns.
//! - A non-zero exit code is returned for every failed command.

use clap::{Parser, Subcommand};
use log::{error, info};
use parcel_core::db::open_db;
use parcel_core::{
    default_log_level, init_logging, ClientId, ParcelNumber, ParcelRepository, ParcelService,
    ParcelStatus, SqliteParcelRepository,
};
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "parcel", version, about = "Track parcels through their delivery lifecycle")]
struct Cli {
    #[arg(long, default_value = "tracker.db", help = "SQLite database file")]
    db: PathBuf,
    #[arg(long, help = "Absolute directory for rolling log files; logging is off when omitted")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Log level: trace|debug|info|warn|error")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new parcel.
    Add {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
    },
    /// Show one parcel.
    Get { number: ParcelNumber },
    /// List all parcels of a client.
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Change the address of a registered parcel.
    SetAddress { number: ParcelNumber, address: String },
    /// Overwrite the status without lifecycle checks.
    SetStatus {
        number: ParcelNumber,
        #[arg(help = "registered|sent|delivered")]
        status: ParcelStatus,
    },
    /// Advance a parcel to its next status.
    Next { number: ParcelNumber },
    /// Delete a registered parcel.
    Delete { number: ParcelNumber },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Get { .. } => "get",
            Self::List { .. } => "list",
            Self::SetAddress { .. } => "set-address",
            Self::SetStatus { .. } => "set-status",
            Self::Next { .. } => "next",
            Self::Delete { .. } => "delete",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();
    let code = match run(cli) {
        Ok(output) => {
            info!("event=cli_command module=cli status=ok command={command}");
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error command={command} error={err}");
            eprintln!("{}", json!({ "error": err.to_string() }));
            ExitCode::FAILURE
        }
    };
    log::logger().flush();
    code
}

fn run(cli: Cli) -> Result<serde_json::Value, Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let conn = open_db(&cli.db)?;
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn)?);

    let output = match cli.command {
        Command::Add { client, address } => {
            serde_json::to_value(service.register(client, address)?)?
        }
        Command::Get { number } => serde_json::to_value(service.get(number)?)?,
        Command::List { client } => serde_json::to_value(service.client_parcels(client)?)?,
        Command::SetAddress { number, address } => {
            service.change_address(number, &address)?;
            json!({ "number": number, "address": address })
        }
        Command::SetStatus { number, status } => {
            SqliteParcelRepository::try_new(&conn)?.set_status(number, status)?;
            json!({ "number": number, "status": status })
        }
        Command::Next { number } => {
            let status = service.next_status(number)?;
            json!({ "number": number, "status": status })
        }
        Command::Delete { number } => {
            service.delete(number)?;
            json!({ "number": number, "deleted": true })
        }
    };

    Ok(output)
}
