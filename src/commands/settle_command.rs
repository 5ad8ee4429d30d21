use crate::{Transaction, TransactionId, TxHandler, UtxoPool};
use clap::{App, Arg, ArgMatches};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use tracing::info;

pub struct SettleCliOptions {
    snapshot: String,
    candidates: String,
    verbose: bool,
}

impl SettleCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            snapshot: matches
                .value_of("snapshot")
                .ok_or("Missing --snapshot")?
                .to_string(),
            candidates: matches
                .value_of("candidates")
                .ok_or("Missing --candidates")?
                .to_string(),
            verbose: matches.is_present("verbose"),
        })
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RejectedTransaction {
    pub id: TransactionId,
    pub reason: String,
}

/// What `settle` prints: the outcome of the epoch and the pool it leaves behind.
#[derive(Debug, Serialize, Deserialize)]
pub struct SettleReport {
    pub committed: Vec<TransactionId>,
    pub rejected: Vec<RejectedTransaction>,
    pub passes: usize,
    pub pool: UtxoPool,
}

pub fn settle_command() -> App<'static> {
    App::new("settle")
        .version("0.1")
        .about("Settles one epoch of candidate transactions against a UTXO pool snapshot.")
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .value_name("FILE")
                .help("JSON file with the UTXO pool: a list of {utxo, output} entries.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("candidates")
                .long("candidates")
                .value_name("FILE")
                .help("JSON file with the list of candidate transactions.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Logs the validation outcome of every candidate.")
                .required(false),
        )
}

pub fn run_settle_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SettleCliOptions::parse(matches)?;
    super::init_logging(if options.verbose() { "debug" } else { "info" });

    let snapshot = fs::read_to_string(&options.snapshot)?;
    let candidates = fs::read_to_string(&options.candidates)?;
    info!(snapshot = %options.snapshot, candidates = %options.candidates, "settling epoch");

    let report = settle_json(&snapshot, &candidates)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Settles the JSON-encoded `candidates` against the JSON-encoded `snapshot`.
pub fn settle_json(snapshot: &str, candidates: &str) -> Result<SettleReport, Box<dyn Error>> {
    let pool: UtxoPool = serde_json::from_str(snapshot)?;
    let candidates: Vec<Transaction> = serde_json::from_str(candidates)?;

    let mut handler = TxHandler::new(&pool);
    let settlement = handler.settle(&candidates);
    Ok(SettleReport {
        committed: settlement.committed.iter().map(|tx| *tx.id()).collect(),
        rejected: settlement
            .rejected
            .into_iter()
            .map(|(id, reason)| RejectedTransaction {
                id,
                reason: reason.to_string(),
            })
            .collect(),
        passes: settlement.passes,
        pool: handler.into_pool(),
    })
}
