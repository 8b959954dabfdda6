use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use counterfill_core::{
    AuditTrail, Engine, ExternalLookupResult, LocalRecord, Reconciliation, SeedTarget, classify,
    prepare_for_display, prepare_for_submit,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod display;

#[derive(Parser)]
#[command(name = "counterfill")]
#[command(about = "Reconcile counterparty records with registry lookups", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a tax identifier by its shape
    Classify { tax_id: String },

    /// Merge a saved lookup response into a record
    Reconcile {
        #[command(flatten)]
        input: RecordArgs,

        /// Lookup response JSON
        #[arg(long, required_unless_present = "transport_failure")]
        lookup: Option<PathBuf>,

        /// Treat the lookup as failed with this message instead of reading a response
        #[arg(long, conflicts_with = "lookup")]
        transport_failure: Option<String>,

        #[command(flatten)]
        seed: SeedArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Query the registry lookup service, optionally reconciling a record
    Fetch {
        tax_id: String,

        #[command(flatten)]
        service: ServiceArgs,

        /// Record to reconcile against the response
        #[arg(long)]
        record: Option<PathBuf>,

        /// Audit trail JSON for --record
        #[arg(long, requires = "record")]
        audit: Option<PathBuf>,

        #[command(flatten)]
        seed: SeedArgs,
    },

    /// Prepare a record for persistence
    Submit {
        #[command(flatten)]
        input: RecordArgs,
    },

    /// Show a stored record as a card
    Show {
        #[command(flatten)]
        input: RecordArgs,
    },
}

#[derive(clap::Args)]
struct RecordArgs {
    /// Counterparty record JSON
    #[arg(long)]
    record: PathBuf,

    /// Audit trail JSON
    #[arg(long)]
    audit: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Copy)]
struct SeedArgs {
    /// Financial-year slots in the form
    #[arg(long, default_value_t = 3)]
    capacity: usize,

    /// Financial years already saved for this counterparty
    #[arg(long, default_value_t = 0)]
    persisted: usize,
}

impl From<SeedArgs> for SeedTarget {
    fn from(args: SeedArgs) -> Self {
        SeedTarget::new(args.capacity, args.persisted)
    }
}

#[derive(clap::Args)]
struct ServiceArgs {
    /// Lookup service base URL
    #[arg(long, env = "COUNTERFILL_LOOKUP_URL", default_value = "http://localhost:8000")]
    url: String,

    /// Lookup endpoint path
    #[arg(
        long,
        env = "COUNTERFILL_LOOKUP_PATH",
        default_value = counterfill_sync::http::DEFAULT_LOOKUP_PATH
    )]
    path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    tracing::debug!("counterfill v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Classify { tax_id } => {
            println!("{}", classify(&tax_id)?);
        }
        Commands::Reconcile {
            input,
            lookup,
            transport_failure,
            seed,
            json,
        } => {
            let (record, audit) = input.load()?;
            let engine = Engine::new();
            let out = match (transport_failure, lookup) {
                (Some(reason), _) => engine.reconcile_failure(&record, &audit, &reason)?,
                (None, Some(path)) => {
                    let external = ExternalLookupResult::from_json(&read(&path)?);
                    engine.reconcile(&record, &external, &audit, seed.into())?
                }
                (None, None) => anyhow::bail!("either --lookup or --transport-failure is required"),
            };
            emit(&out, json)?;
        }
        Commands::Fetch {
            tax_id,
            service,
            record,
            audit,
            seed,
        } => {
            let id = counterfill_core::TaxId::parse(&tax_id)?;
            let client =
                counterfill_sync::LookupClient::new(service.url).with_path(&service.path);
            let engine = Engine::new();

            match record {
                Some(path) => {
                    let input = RecordArgs { record: path, audit };
                    let (record, audit) = input.load()?;
                    let out = match client.lookup(&id).await {
                        Ok(resp) => engine.reconcile(&record, &resp.result, &audit, seed.into())?,
                        Err(e) => {
                            tracing::warn!(error = %e, "lookup failed");
                            engine.reconcile_failure(&record, &audit, &e.to_string())?
                        }
                    };
                    emit(&out, false)?;
                }
                None => {
                    let resp = client.lookup(&id).await?;
                    tracing::info!(fetched_at = %resp.fetched_at, "lookup response");
                    let value = serde_json::Value::from(resp.result);
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
        }
        Commands::Submit { input } => {
            let (record, audit) = input.load()?;
            let submission = prepare_for_submit(&record, &audit)?;
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        Commands::Show { input } => {
            let (record, audit) = input.load()?;
            display::print_record_card(&prepare_for_display(&record), &audit);
        }
    }

    Ok(())
}

impl RecordArgs {
    fn load(&self) -> anyhow::Result<(LocalRecord, AuditTrail)> {
        let record = LocalRecord::from_json(&read(&self.record)?)
            .with_context(|| format!("parsing record {}", self.record.display()))?;
        let audit = match &self.audit {
            Some(path) => AuditTrail::from_json(&read(path)?),
            None => AuditTrail::new(),
        };
        Ok((record, audit))
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn emit(out: &Reconciliation, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(out)?);
    } else {
        display::print_reconciliation(out);
    }
    Ok(())
}
