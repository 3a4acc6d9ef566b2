// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::Context;
use clap::{Parser, Subcommand};
use csv::Writer;
use job_ledger_rs::{Engine, MemoryStore, Profile, ProfileId, ProfileType, Seed, api};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Job Ledger - contracts, jobs and balances between clients and contractors
#[derive(Parser, Debug)]
#[command(name = "job-ledger-rs")]
#[command(about = "Serves the job ledger API over a seeded in-memory store", long_about = None)]
struct Args {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "LEDGER_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Seed document with profiles, contracts and jobs
        #[arg(long, value_name = "FILE", env = "LEDGER_SEED")]
        seed: PathBuf,

        /// Address to listen on
        #[arg(long, env = "LEDGER_BIND", default_value = "127.0.0.1:3001")]
        bind: SocketAddr,
    },
    /// Print every profile's balance as CSV
    ///
    /// Example: cargo run -- balances --seed fixtures/seed.json > balances.csv
    Balances {
        #[arg(long, value_name = "FILE", env = "LEDGER_SEED")]
        seed: PathBuf,
    },
}

fn init_logging(verbose: bool, json: bool) {
    let default = if verbose {
        "job_ledger_rs=debug,info"
    } else {
        "job_ledger_rs=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_target(false);
    if json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer.compact()).init();
    }
}

fn load_store(path: &Path) -> anyhow::Result<MemoryStore> {
    let file = File::open(path)
        .with_context(|| format!("opening seed file '{}'", path.display()))?;
    let seed = Seed::from_reader(BufReader::new(file))
        .with_context(|| format!("reading seed file '{}'", path.display()))?;
    let store = MemoryStore::from_seed(seed)
        .with_context(|| format!("validating seed file '{}'", path.display()))?;
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_json);

    match args.command {
        Command::Serve { seed, bind } => serve(&seed, bind).await,
        Command::Balances { seed } => {
            let store = load_store(&seed)?;
            write_balances(&store.profiles(), std::io::stdout())?;
            Ok(())
        }
    }
}

async fn serve(seed: &Path, bind: SocketAddr) -> anyhow::Result<()> {
    let store = load_store(seed)?;
    info!(profiles = store.profiles().len(), seed = %seed.display(), "store loaded");

    let app = api::router(Arc::new(Engine::new(store)));
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(address = %listener.local_addr()?, "job ledger API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

/// One CSV output row per profile.
#[derive(Debug, Serialize)]
struct BalanceRow {
    id: ProfileId,
    name: String,
    #[serde(rename = "type")]
    kind: ProfileType,
    balance: Decimal,
}

const DECIMAL_PRECISION: u32 = 2;

/// Write profile balances to a CSV writer
///
/// # CSV Format
///
/// Columns: `id, name, type, balance`
///
/// ```csv
/// id,name,type,balance
/// 1,Harry Potter,client,1150.00
/// 5,John Lenon,contractor,64.00
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_balances<W: Write>(profiles: &[Profile], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for profile in profiles {
        let mut balance = profile.balance.round_dp(DECIMAL_PRECISION);
        balance.rescale(DECIMAL_PRECISION);
        wtr.serialize(BalanceRow {
            id: profile.id,
            name: profile.full_name(),
            kind: profile.kind,
            balance,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
