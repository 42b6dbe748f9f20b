use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const NGN_CURRENCY_CODE: &str = "NGN";
pub const NGN_CURRENCY_CODE_LOWER: &str = "ngn";

//--------------------------------------        Kobo        ----------------------------------------------------------
/// An amount of money in kobo, the minor unit of the Naira (100 kobo = ₦1).
///
/// All prices, totals and ledger balances in the gateway are expressed in kobo, matching the integer amounts the
/// payment gateway reports on its wire format.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Kobo(i64);

op!(binary Kobo, Add, add);
op!(binary Kobo, Sub, sub);
op!(inplace Kobo, SubAssign, sub_assign);
op!(unary Kobo, Neg, neg);

impl Mul<i64> for Kobo {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Kobo {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in kobo: {0}")]
pub struct KoboConversionError(String);

impl From<i64> for Kobo {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Kobo {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Kobo {}

impl TryFrom<u64> for Kobo {
    type Error = KoboConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(KoboConversionError(format!("Value {} is too large to convert to Kobo", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Kobo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let naira = self.0 as f64 / 100.0;
        write!(f, "₦{naira:0.2}")
    }
}

impl Kobo {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_naira(naira: i64) -> Self {
        Self(naira * 100)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
