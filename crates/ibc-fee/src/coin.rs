//! Token amounts and sorted coin sets, the currency in which fees are expressed.

use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use derive_more::{Display as DeriveDisplay, From, Into};
use flex_error::define_error;
use ibc_proto::cosmos::base::v1beta1::Coin as RawCoin;
use primitive_types::U256;
use serde_derive::{Deserialize, Serialize};

use crate::prelude::*;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    CoinError {
        InvalidAmount
            { amount: String }
            | e | { format_args!("invalid amount: {0}", e.amount) },

        InvalidDenom
            { denom: String }
            | e | { format_args!("invalid denomination: {0}", e.denom) },

        InvalidCoin
            { coin: String }
            | e | { format_args!("invalid coin: {0}", e.coin) },

        Overflow
            | _ | { "coin amount overflow" },

        InsufficientAmount
            { denom: String }
            | e | { format_args!("insufficient amount of {0}", e.denom) },
    }
}

/// A type for representing token amounts.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    DeriveDisplay,
    From,
    Into,
)]
pub struct Amount(U256);

impl Amount {
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl FromStr for Amount {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            U256::from_dec_str(s).map_err(|_| CoinError::invalid_amount(s.to_string()))?;
        Ok(Self(amount))
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(v.into())
    }
}

/// A single denomination and amount pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl TryFrom<RawCoin> for Coin {
    type Error = CoinError;

    fn try_from(raw: RawCoin) -> Result<Self, Self::Error> {
        validate_denom(&raw.denom)?;
        let amount = Amount::from_str(&raw.amount)?;
        Ok(Self {
            denom: raw.denom,
            amount,
        })
    }
}

impl From<Coin> for RawCoin {
    fn from(coin: Coin) -> Self {
        RawCoin {
            denom: coin.denom,
            amount: coin.amount.to_string(),
        }
    }
}

/// Checks a denomination against the cosmos-sdk denom grammar:
/// `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let mut chars = denom.chars();
    let starts_with_letter = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));

    if !(3..=128).contains(&denom.len()) || !starts_with_letter || !valid_rest {
        return Err(CoinError::invalid_denom(denom.to_string()));
    }

    Ok(())
}

/// A set of coins, kept sorted by denomination with at most one entry per denomination.
///
/// Arithmetic on `Coins` always produces a normalized set (sorted, no zero amounts). A set
/// deserialized or converted from raw input may not be normalized; [`Coins::is_valid`]
/// reports whether it is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a normalized set, summing duplicate denominations.
    pub fn from_coins(coins: impl IntoIterator<Item = Coin>) -> Result<Self, CoinError> {
        coins
            .into_iter()
            .try_fold(Self::new(), |acc, coin| acc.checked_add(&Self(vec![coin])))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the set holds no coin with a non-zero amount.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|coin| coin.amount.is_zero())
    }

    /// Returns the amount held for `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> Amount {
        self.0
            .iter()
            .find(|coin| coin.denom == denom)
            .map(|coin| coin.amount)
            .unwrap_or_default()
    }

    /// A set is valid when it is sorted by denomination, has no duplicates, every
    /// denomination is well-formed and every amount is positive. The empty set is valid.
    pub fn is_valid(&self) -> bool {
        let well_formed = self
            .0
            .iter()
            .all(|coin| validate_denom(&coin.denom).is_ok() && !coin.amount.is_zero());
        let strictly_sorted = self.0.windows(2).all(|w| w[0].denom < w[1].denom);

        well_formed && strictly_sorted
    }

    pub fn checked_add(&self, other: &Coins) -> Result<Coins, CoinError> {
        let mut result = self.0.clone();

        for coin in other.iter() {
            match result.binary_search_by(|c| c.denom.as_str().cmp(coin.denom.as_str())) {
                Ok(pos) => {
                    result[pos].amount = result[pos]
                        .amount
                        .checked_add(coin.amount)
                        .ok_or_else(CoinError::overflow)?;
                }
                Err(pos) => result.insert(pos, coin.clone()),
            }
        }

        result.retain(|coin| !coin.amount.is_zero());
        Ok(Coins(result))
    }

    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, CoinError> {
        let mut result = self.0.clone();

        for coin in other.iter().filter(|coin| !coin.amount.is_zero()) {
            let pos = result
                .binary_search_by(|c| c.denom.as_str().cmp(coin.denom.as_str()))
                .map_err(|_| CoinError::insufficient_amount(coin.denom.clone()))?;

            result[pos].amount = result[pos]
                .amount
                .checked_sub(coin.amount)
                .ok_or_else(|| CoinError::insufficient_amount(coin.denom.clone()))?;
        }

        result.retain(|coin| !coin.amount.is_zero());
        Ok(Coins(result))
    }

    /// True if, for every denomination in `other`, this set holds at least as much.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other
            .iter()
            .all(|coin| self.amount_of(&coin.denom) >= coin.amount)
    }
}

impl Display for Coins {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let joined = self
            .0
            .iter()
            .map(|coin| coin.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", joined)
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        if coin.amount.is_zero() {
            Self::new()
        } else {
            Self(vec![coin])
        }
    }
}

/// Raw coin lists are taken as given, so that `is_valid` can later reject unsorted or
/// duplicated input instead of silently normalizing it.
impl TryFrom<Vec<RawCoin>> for Coins {
    type Error = CoinError;

    fn try_from(raw: Vec<RawCoin>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(Coin::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Coins)
    }
}

impl From<Coins> for Vec<RawCoin> {
    fn from(coins: Coins) -> Self {
        coins.0.into_iter().map(RawCoin::from).collect()
    }
}
