pub mod coin;
pub mod commands;
pub mod crypto;
pub mod hash;
pub mod public_key;
pub mod transaction;
pub mod tx_handler;
pub mod utxo_pool;
pub mod validation;

pub use self::{
    coin::*,
    crypto::{verify_signature, PrivateKey, Signature},
    hash::*,
    public_key::*,
    transaction::*,
    tx_handler::*,
    utxo_pool::*,
    validation::*,
};
