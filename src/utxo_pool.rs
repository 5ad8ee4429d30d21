use crate::{Coin, OutputIndex, TransactionId, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::FromIterator;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum PoolError {
    #[error("no unspent output found for: {0}")]
    NotFound(Utxo),
}

/// Identifies a transaction output by the transaction that created it and its position.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct Utxo {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Utxo {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// One pool entry in its serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub utxo: Utxo,
    pub output: TransactionOutput,
}

/// A pool of confirmed and unspent transaction outputs.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<UtxoEntry>", into = "Vec<UtxoEntry>")]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by their transaction ID and their index in the
    // transaction.
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    /// Creates an independent copy of `snapshot`.
    pub fn from_snapshot(snapshot: &UtxoPool) -> Self {
        snapshot.clone()
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn get(&self, utxo: &Utxo) -> Result<&TransactionOutput, PoolError> {
        self.utxos.get(utxo).ok_or(PoolError::NotFound(*utxo))
    }

    /// Adds the output, replacing any output previously stored under the same id.
    pub fn insert(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    pub fn remove(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        self.utxos.remove(utxo)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Entries ordered by their id.
    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &TransactionOutput)> {
        let mut entries = self.utxos.iter().collect::<Vec<_>>();
        entries.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        entries.into_iter()
    }

    /// The sum of all unspent amounts, or `None` if it does not fit in a [`Coin`].
    pub fn total_value(&self) -> Option<Coin> {
        Coin::checked_sum(self.utxos.values().map(TransactionOutput::amount))
    }
}

impl FromIterator<(Utxo, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (Utxo, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<UtxoEntry>> for UtxoPool {
    fn from(entries: Vec<UtxoEntry>) -> Self {
        entries
            .into_iter()
            .map(|entry| (entry.utxo, entry.output))
            .collect()
    }
}

impl From<UtxoPool> for Vec<UtxoEntry> {
    fn from(pool: UtxoPool) -> Self {
        let mut entries = pool
            .utxos
            .into_iter()
            .map(|(utxo, output)| UtxoEntry { utxo, output })
            .collect::<Vec<_>>();
        entries.sort_by(|lhs, rhs| lhs.utxo.cmp(&rhs.utxo));
        entries
    }
}
