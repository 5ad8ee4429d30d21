use crate::crypto::verify_signature;
use crate::{Coin, Transaction, TransactionError, TransactionOutput, Utxo, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;

/// The reason a transaction was rejected. Only the first violated rule is reported.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("input: {index} spends: {utxo} which is not in the UTXO pool")]
    MissingUtxo { index: usize, utxo: Utxo },

    #[error("input: {index} has an invalid signature for the owner of: {utxo}")]
    InvalidSignature { index: usize, utxo: Utxo },

    #[error("input: {index} spends: {utxo} which is already claimed by another input")]
    DuplicateInput { index: usize, utxo: Utxo },

    #[error("unable to build the signing payload of input: {index}: {reason}")]
    SigningPayload { index: usize, reason: String },

    #[error("output: {index} has a negative amount: {amount}")]
    NegativeOutput { index: usize, amount: Coin },

    #[error("total input value: {total_input} is less than total output value: {total_output}")]
    InsufficientInput { total_input: i128, total_output: i128 },
}

// Responsible for checking a single transaction against the current UTXO pool.
// Checks, in order:
//   1. Every input spends an output that is in the pool.
//   2. Every input signature verifies against the owner of the spent output.
//   3. No output is spent twice by the same transaction.
//   4. No output amount is negative.
//   5. Inputs are worth at least as much as the outputs. The difference is the fee.
pub struct TransactionValidator {}

impl TransactionValidator {
    pub fn is_valid(pool: &UtxoPool, transaction: &Transaction) -> bool {
        Self::validate(pool, transaction).is_ok()
    }

    pub fn validate(pool: &UtxoPool, transaction: &Transaction) -> Result<(), ValidationError> {
        let total_input = Self::validate_inputs(pool, transaction)?;
        let total_output = Self::validate_outputs(transaction.outputs())?;
        if total_input < total_output {
            return Err(ValidationError::InsufficientInput {
                total_input,
                total_output,
            });
        }
        Ok(())
    }

    /// Runs the per-input checks and returns the total value of the spent outputs.
    fn validate_inputs(
        pool: &UtxoPool,
        transaction: &Transaction,
    ) -> Result<i128, ValidationError> {
        let mut spent_amounts = vec![];
        let mut claimed = HashSet::new();

        for (index, input) in transaction.inputs().iter().enumerate() {
            let utxo = input.utxo();
            let spent_output = pool
                .get(&utxo)
                .map_err(|_| ValidationError::MissingUtxo { index, utxo })?;

            let payload = transaction
                .raw_data_to_sign(index)
                .map_err(|e| Self::payload_error(index, e))?;
            if !verify_signature(spent_output.owner(), &payload, input.signature()) {
                return Err(ValidationError::InvalidSignature { index, utxo });
            }

            if !claimed.insert(utxo) {
                return Err(ValidationError::DuplicateInput { index, utxo });
            }

            spent_amounts.push(spent_output.amount());
        }
        Ok(Coin::wide_sum(spent_amounts))
    }

    /// Checks output amounts and returns their total.
    fn validate_outputs(outputs: &[TransactionOutput]) -> Result<i128, ValidationError> {
        for (index, output) in outputs.iter().enumerate() {
            if output.amount().is_negative() {
                return Err(ValidationError::NegativeOutput {
                    index,
                    amount: output.amount(),
                });
            }
        }
        Ok(Coin::wide_sum(outputs.iter().map(TransactionOutput::amount)))
    }

    fn payload_error(index: usize, error: TransactionError) -> ValidationError {
        ValidationError::SigningPayload {
            index,
            reason: error.to_string(),
        }
    }
}
