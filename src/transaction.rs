use crate::{Coin, PrivateKey, PublicKey, Sha256, Signature, Utxo};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("failed to serialize transaction data: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("input index: {index} is out of range for a transaction with {len} inputs")]
    InputIndexOutOfRange { index: usize, len: usize },
}

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }
}

/// The index of the transaction output.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // The number of UTXO to be spent, the first one is 0.
    output_index: OutputIndex,
    // Signature by the owner of the spent output over the signing payload of this input.
    signature: Signature,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    /// Creates an input that is not signed yet.
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            utxo_id,
            output_index,
            signature: Signature::empty(),
        }
    }

    pub fn spending(utxo: &Utxo) -> Self {
        Self::new(*utxo.transaction_id(), *utxo.output_index())
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The pool key of the output this input consumes.
    pub fn utxo(&self) -> Utxo {
        Utxo::new(self.utxo_id, self.output_index)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Coin,
    owner: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(amount: Coin, owner: PublicKey) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }
}

/// The data an input signature commits to: the position of the input, the UTXOs spent by
/// every input and every output of the transaction. Signatures themselves are excluded.
#[derive(Serialize)]
struct SigningPayload<'a> {
    input_index: u32,
    spent: Utxo,
    inputs: Vec<Utxo>,
    outputs: &'a [TransactionOutput],
}

// The id is never trusted from the wire; it is recomputed from inputs and outputs.
#[derive(Deserialize)]
struct TransactionData {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TryFrom<TransactionData> for Transaction {
    type Error = TransactionError;

    fn try_from(data: TransactionData) -> Result<Self, Self::Error> {
        Transaction::new(data.inputs, data.outputs)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionData")]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, TransactionError> {
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// Pool keys of the outputs this transaction creates once committed.
    pub fn created_utxos(&self) -> impl Iterator<Item = (Utxo, &TransactionOutput)> + '_ {
        self.outputs.iter().enumerate().map(move |(index, output)| {
            (Utxo::new(self.id, OutputIndex::new(index as u32)), output)
        })
    }

    /// Canonical bytes that the owner of the output spent by input `index` must sign.
    pub fn raw_data_to_sign(&self, index: usize) -> Result<Vec<u8>, TransactionError> {
        let input = self
            .inputs
            .get(index)
            .ok_or(TransactionError::InputIndexOutOfRange {
                index,
                len: self.inputs.len(),
            })?;
        let payload = SigningPayload {
            input_index: index as u32,
            spent: input.utxo(),
            inputs: self.inputs.iter().map(TransactionInput::utxo).collect(),
            outputs: &self.outputs,
        };
        Ok(bincode::serialize(&payload)?)
    }

    /// Attaches `signature` to input `index` and recomputes the transaction id.
    pub fn with_signature(
        mut self,
        index: usize,
        signature: Signature,
    ) -> Result<Self, TransactionError> {
        let len = self.inputs.len();
        let input = self
            .inputs
            .get_mut(index)
            .ok_or(TransactionError::InputIndexOutOfRange { index, len })?;
        input.signature = signature;
        self.id = Self::hash_transaction_data(&self.inputs, &self.outputs)?;
        Ok(self)
    }

    /// Signs input `index` with `key`.
    pub fn sign_input(self, index: usize, key: &PrivateKey) -> Result<Self, TransactionError> {
        let signature = key.sign(&self.raw_data_to_sign(index)?);
        self.with_signature(index, signature)
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> Result<TransactionId, TransactionError> {
        let data = bincode::serialize(&(inputs, outputs))?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}
