use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A monetary amount. Signed, since a transaction may declare negative outputs which
/// validation then rejects.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Coin(i64);

impl Coin {
    pub const fn new(amount: i64) -> Self {
        Coin(amount)
    }

    pub const fn zero() -> Self {
        Self::new(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Sums the amounts, returning `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Coin>>(iter: I) -> Option<Self> {
        iter.into_iter()
            .try_fold(Self::zero(), |sum, el| sum.checked_add(el))
    }

    /// Sums the amounts as `i128`. Overflowing it would take more than 2^64 maximal amounts.
    pub fn wide_sum<I: IntoIterator<Item = Coin>>(iter: I) -> i128 {
        iter.into_iter().map(|el| i128::from(el.0)).sum()
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
