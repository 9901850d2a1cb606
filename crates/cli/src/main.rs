//! orderarchive: one-shot Firestore → XML order migration.
//!
//! ```text
//! orderarchive [OPTIONS] <ARCHIVE> <CREDENTIALS>
//! ```
//!
//! Exit codes: 0 ok, 2 usage, 3 precondition (staging file, existing
//! archive, lock held), 4 store, 5 document shape, 6 archive write,
//! 7 delete failed after the archive was committed.

mod args;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use orderarchive_durability::LocalFs;
use orderarchive_engine::{
    preflight, ErrorClass, TransferCoordinator, TransferError, TransferErrorKind, TransferReport,
};
use orderarchive_store::{FirestoreStore, StoreError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Cli;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Usage errors exit with code 2 inside clap
    let cli = Cli::parse();
    tracing::debug!(?cli, "Parsed arguments");

    match run(&cli) {
        Ok(report) => {
            println!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<TransferReport> {
    let options = cli.migration_options();
    // A blocked run must report as blocked even when the credentials are bad
    preflight(Arc::new(LocalFs::new()), &options)?;

    let store = FirestoreStore::from_credentials_file(&cli.credentials, |config| {
        cli.firestore_config(config)
    })
    .context("cannot set up the Firestore client")?;

    let coordinator = TransferCoordinator::local(store, options);
    Ok(coordinator.run()?)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let class = if let Some(transfer) = err.downcast_ref::<TransferError>() {
        transfer.class()
    } else if let Some(kind) = err.downcast_ref::<TransferErrorKind>() {
        kind.class()
    } else if err.downcast_ref::<StoreError>().is_some() {
        ErrorClass::Store
    } else {
        ErrorClass::Archive
    };
    // exit codes are all in 0..=7
    class.exit_code() as u8
}
