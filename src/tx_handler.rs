use crate::{Transaction, TransactionId, TransactionValidator, UtxoPool, ValidationError};
use std::collections::HashSet;
use tracing::{debug, info};

/// The outcome of settling one epoch.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Committed transactions in commitment order.
    pub committed: Vec<Transaction>,
    /// Candidates that were never committed, with the reason they failed on the last pass.
    pub rejected: Vec<(TransactionId, ValidationError)>,
    /// Number of passes over the candidates, including the final pass that committed nothing.
    pub passes: usize,
}

/// Maintains the ledger's UTXO pool and applies epochs of proposed transactions to it.
pub struct TxHandler {
    pool: UtxoPool,
}

impl TxHandler {
    /// Creates a handler over a private copy of `pool`.
    pub fn new(pool: &UtxoPool) -> Self {
        Self {
            pool: UtxoPool::from_snapshot(pool),
        }
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        TransactionValidator::is_valid(&self.pool, transaction)
    }

    pub fn validate_tx(&self, transaction: &Transaction) -> Result<(), ValidationError> {
        TransactionValidator::validate(&self.pool, transaction)
    }

    /// Commits a mutually valid subset of `candidates` and returns it in commitment order.
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.settle(candidates).committed
    }

    /// Repeatedly passes over `candidates` in the given order, committing every transaction
    /// that is valid against the pool at that moment, until a pass commits nothing.
    ///
    /// A commit is visible to the candidates that follow it, within the same pass and in later
    /// ones. This resolves chains of transactions spending each other's outputs regardless of
    /// their order. Among transactions spending the same output, the first one to validate wins.
    pub fn settle(&mut self, candidates: &[Transaction]) -> Settlement {
        let mut committed_ids = HashSet::new();
        let mut committed = vec![];
        let mut passes = 0;

        loop {
            passes += 1;
            let mut progress = false;
            for transaction in candidates {
                if committed_ids.contains(transaction.id()) {
                    continue;
                }
                match self.validate_tx(transaction) {
                    Ok(()) => {
                        debug!(pass = passes, id = %transaction.id(), "committing transaction");
                        self.apply(transaction);
                        committed_ids.insert(*transaction.id());
                        committed.push(transaction.clone());
                        progress = true;
                    }
                    Err(e) => {
                        debug!(
                            pass = passes,
                            id = %transaction.id(),
                            reason = %e,
                            "transaction not valid yet"
                        );
                    }
                }
            }
            if !progress {
                break;
            }
        }

        let rejected = self.rejection_reasons(candidates, &committed_ids);
        info!(
            candidates = candidates.len(),
            committed = committed.len(),
            rejected = rejected.len(),
            passes,
            "epoch settled"
        );
        Settlement {
            committed,
            rejected,
            passes,
        }
    }

    // Adds the new outputs and removes the spent ones.
    fn apply(&mut self, transaction: &Transaction) {
        for (utxo, output) in transaction.created_utxos() {
            self.pool.insert(utxo, output.clone());
        }
        for input in transaction.inputs() {
            self.pool.remove(&input.utxo());
        }
    }

    fn rejection_reasons(
        &self,
        candidates: &[Transaction],
        committed_ids: &HashSet<TransactionId>,
    ) -> Vec<(TransactionId, ValidationError)> {
        let mut reported = HashSet::new();
        candidates
            .iter()
            .filter(|transaction| !committed_ids.contains(transaction.id()))
            .filter(|transaction| reported.insert(*transaction.id()))
            .filter_map(|transaction| {
                self.validate_tx(transaction)
                    .err()
                    .map(|e| (*transaction.id(), e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Coin, OutputIndex, PrivateKey, PublicKey, Sha256, TransactionInput, TransactionOutput,
        Utxo,
    };

    fn key(seed: u8) -> PrivateKey {
        PrivateKey::from_seed(&[seed; 32])
    }

    fn genesis_utxo() -> Utxo {
        Utxo::new(
            TransactionId::new(Sha256::digest(b"genesis")),
            OutputIndex::new(0),
        )
    }

    // A pool with a single output of 10 owned by `owner`.
    fn pool_owned_by(owner: &PrivateKey) -> UtxoPool {
        let mut pool = UtxoPool::new();
        pool.insert(
            genesis_utxo(),
            TransactionOutput::new(Coin::new(10), owner.public_key()),
        );
        pool
    }

    fn pay(spends: Utxo, signer: &PrivateKey, amount: i64, to: PublicKey) -> Transaction {
        Transaction::new(
            vec![TransactionInput::spending(&spends)],
            vec![TransactionOutput::new(Coin::new(amount), to)],
        )
        .unwrap()
        .sign_input(0, signer)
        .unwrap()
    }

    fn first_output(transaction: &Transaction) -> Utxo {
        Utxo::new(*transaction.id(), OutputIndex::new(0))
    }

    fn ids(transactions: &[Transaction]) -> Vec<TransactionId> {
        transactions.iter().map(|tx| *tx.id()).collect()
    }

    #[test]
    fn handler_does_not_alias_the_snapshot() {
        let (a, b) = (key(1), key(2));
        let snapshot = pool_owned_by(&a);
        let mut handler = TxHandler::new(&snapshot);

        let tx = pay(genesis_utxo(), &a, 10, b.public_key());
        assert_eq!(handler.handle_txs(&[tx.clone()]), vec![tx.clone()]);

        assert!(snapshot.contains(&genesis_utxo()));
        assert!(!snapshot.contains(&first_output(&tx)));
        assert!(!handler.pool().contains(&genesis_utxo()));
        assert!(handler.pool().contains(&first_output(&tx)));
    }

    #[test]
    fn settles_chain_in_one_call() {
        let (a, b, c) = (key(1), key(2), key(3));
        let mut handler = TxHandler::new(&pool_owned_by(&a));
        let tx1 = pay(genesis_utxo(), &a, 10, b.public_key());
        let tx2 = pay(first_output(&tx1), &b, 10, c.public_key());
        assert!(!handler.is_valid_tx(&tx2));

        let committed = handler.handle_txs(&[tx1.clone(), tx2.clone()]);

        assert_eq!(ids(&committed), ids(&[tx1.clone(), tx2.clone()]));
        assert_eq!(handler.pool().len(), 1);
        assert_eq!(
            handler.pool().get(&first_output(&tx2)).unwrap().owner(),
            &c.public_key()
        );
        assert!(!handler.pool().contains(&first_output(&tx1)));
    }

    #[test]
    fn settles_chain_given_in_reverse_order() {
        let (a, b, c) = (key(1), key(2), key(3));
        let mut handler = TxHandler::new(&pool_owned_by(&a));
        let tx1 = pay(genesis_utxo(), &a, 10, b.public_key());
        let tx2 = pay(first_output(&tx1), &b, 9, c.public_key());
        let tx3 = pay(first_output(&tx2), &c, 8, a.public_key());

        let settlement = handler.settle(&[tx3.clone(), tx2.clone(), tx1.clone()]);

        assert_eq!(ids(&settlement.committed), ids(&[tx1, tx2, tx3.clone()]));
        assert!(settlement.rejected.is_empty());
        assert_eq!(settlement.passes, 4);
        assert_eq!(handler.pool().len(), 1);
        assert!(handler.pool().contains(&first_output(&tx3)));
    }

    #[test]
    fn commits_exactly_one_of_two_double_spends() {
        let (a, b, c) = (key(1), key(2), key(3));
        let mut handler = TxHandler::new(&pool_owned_by(&a));
        let to_b = pay(genesis_utxo(), &a, 10, b.public_key());
        let to_c = pay(genesis_utxo(), &a, 10, c.public_key());

        let committed = handler.handle_txs(&[to_b.clone(), to_c.clone()]);

        assert_eq!(ids(&committed), ids(&[to_b.clone()]));
        assert_eq!(handler.pool().len(), 1);
        assert!(handler.pool().contains(&first_output(&to_b)));
        assert!(!handler.pool().contains(&first_output(&to_c)));
    }

    #[test]
    fn double_spend_winner_follows_candidate_order() {
        let (a, b, c) = (key(1), key(2), key(3));
        let mut handler = TxHandler::new(&pool_owned_by(&a));
        let to_b = pay(genesis_utxo(), &a, 10, b.public_key());
        let to_c = pay(genesis_utxo(), &a, 10, c.public_key());

        let settlement = handler.settle(&[to_c.clone(), to_b.clone()]);

        assert_eq!(ids(&settlement.committed), ids(&[to_c]));
        assert_eq!(
            settlement.rejected,
            vec![(
                *to_b.id(),
                ValidationError::MissingUtxo {
                    index: 0,
                    utxo: genesis_utxo()
                }
            )]
        );
    }

    #[test]
    fn accepts_transaction_paying_a_fee() {
        let (a, b) = (key(1), key(2));
        let mut handler = TxHandler::new(&pool_owned_by(&a));
        let tx = pay(genesis_utxo(), &a, 7, b.public_key());
        assert!(handler.is_valid_tx(&tx));

        handler.handle_txs(&[tx.clone()]);
        assert_eq!(handler.pool().total_value(), Some(Coin::new(7)));
    }

    #[test]
    fn batch_without_valid_transactions_changes_nothing() {
        let (a, b) = (key(1), key(2));
        let snapshot = pool_owned_by(&a);
        let mut handler = TxHandler::new(&snapshot);
        let stolen = pay(genesis_utxo(), &b, 10, b.public_key());
        let inflated = pay(genesis_utxo(), &a, 11, b.public_key());

        let settlement = handler.settle(&[stolen, inflated]);

        assert!(settlement.committed.is_empty());
        assert_eq!(settlement.rejected.len(), 2);
        assert_eq!(settlement.passes, 1);
        assert_eq!(handler.pool(), &snapshot);
        assert!(handler.handle_txs(&[]).is_empty());
        assert_eq!(handler.into_pool(), snapshot);
    }

    #[test]
    fn identical_candidates_commit_once() {
        let a = key(1);
        let mut handler = TxHandler::new(&pool_owned_by(&a));
        let zero_value = Transaction::new(
            vec![],
            vec![TransactionOutput::new(Coin::zero(), a.public_key())],
        )
        .unwrap();

        let committed = handler.handle_txs(&[zero_value.clone(), zero_value.clone()]);

        assert_eq!(committed, vec![zero_value]);
        assert_eq!(handler.pool().len(), 2);
    }

    #[test]
    fn settle_agrees_with_handle_txs() {
        let (a, b, c) = (key(1), key(2), key(3));
        let snapshot = pool_owned_by(&a);
        let tx1 = pay(genesis_utxo(), &a, 10, b.public_key());
        let tx2 = pay(first_output(&tx1), &b, 10, c.public_key());
        let conflict = pay(genesis_utxo(), &a, 5, c.public_key());
        let candidates = vec![tx2, conflict.clone(), tx1];

        let committed = TxHandler::new(&snapshot).handle_txs(&candidates);
        let settlement = TxHandler::new(&snapshot).settle(&candidates);

        // The conflicting spend is reached before tx1, which strands tx2.
        assert_eq!(committed, settlement.committed);
        assert_eq!(ids(&settlement.committed), ids(&[conflict]));
        assert_eq!(settlement.rejected.len(), 2);
    }

    #[test]
    fn handler_keeps_state_across_epochs() {
        let (a, b, c) = (key(1), key(2), key(3));
        let mut handler = TxHandler::new(&pool_owned_by(&a));
        let tx1 = pay(genesis_utxo(), &a, 10, b.public_key());
        let tx2 = pay(first_output(&tx1), &b, 10, c.public_key());

        assert_eq!(handler.handle_txs(&[tx1.clone()]).len(), 1);
        assert!(handler.handle_txs(&[tx1]).is_empty());
        assert_eq!(handler.handle_txs(&[tx2]).len(), 1);
    }
}
