//! Arbitrary-precision signed token amounts (spec §3.1).
//!
//! All balances, capacities, and diffs are exact integers. Floating point
//! must never appear in state transitions or hashing (spec §9).

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// An arbitrary-precision signed integer, wide enough for token units scaled
/// by `10^decimals`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(pub BigInt);

impl Amount {
    pub fn zero() -> Self {
        Amount(BigInt::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn abs(&self) -> Amount {
        Amount(self.0.abs())
    }

    pub fn min(a: Amount, b: Amount) -> Amount {
        if a <= b {
            a
        } else {
            b
        }
    }

    pub fn max(a: Amount, b: Amount) -> Amount {
        if a >= b {
            a
        } else {
            b
        }
    }

    /// Canonical big-endian two's-complement encoding, length-prefixed with
    /// a `u32` (little-endian) byte count. Used wherever an `Amount` enters
    /// a hash preimage (spec §11: canonical encoding).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let be = self.0.to_signed_bytes_be();
        let mut out = Vec::with_capacity(4 + be.len());
        out.extend_from_slice(&(be.len() as u32).to_le_bytes());
        out.extend_from_slice(&be);
        out
    }
}

impl From<i64> for Amount {
    fn from(v: i64) -> Self {
        Amount(BigInt::from(v))
    }
}

impl From<i128> for Amount {
    fn from(v: i128) -> Self {
        Amount(BigInt::from(v))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl<'a, 'b> Add<&'b Amount> for &'a Amount {
    type Output = Amount;
    fn add(self, rhs: &'b Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl<'a, 'b> Sub<&'b Amount> for &'a Amount {
    type Output = Amount;
    fn sub(self, rhs: &'b Amount) -> Amount {
        Amount(&self.0 - &rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Mul for Amount {
    type Output = Amount;
    fn mul(self, rhs: Amount) -> Amount {
        Amount(self.0 * rhs.0)
    }
}

impl<'a, 'b> Mul<&'b Amount> for &'a Amount {
    type Output = Amount;
    fn mul(self, rhs: &'b Amount) -> Amount {
        Amount(&self.0 * &rhs.0)
    }
}

/// Integer division, truncating toward zero. Used for proportional fill and
/// fee-ratio math, which only ever operates on already-scaled integer amounts.
impl Div for Amount {
    type Output = Amount;
    fn div(self, rhs: Amount) -> Amount {
        Amount(self.0 / rhs.0)
    }
}

impl<'a, 'b> Div<&'b Amount> for &'a Amount {
    type Output = Amount;
    fn div(self, rhs: &'b Amount) -> Amount {
        Amount(&self.0 / &rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, x| acc + x)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_exact_for_large_values() {
        let a = Amount::from(10i128.pow(30));
        let b = Amount::from(1i64);
        let sum = a + b;
        assert_eq!(sum.to_string(), "1000000000000000000000000000001");
    }

    #[test]
    fn canonical_bytes_round_trip_sign() {
        let pos = Amount::from(100i64);
        let neg = Amount::from(-100i64);
        assert_ne!(pos.canonical_bytes(), neg.canonical_bytes());
    }

    #[test]
    fn min_max() {
        let a = Amount::from(5i64);
        let b = Amount::from(-5i64);
        assert_eq!(Amount::min(a.clone(), b.clone()), b.clone());
        assert_eq!(Amount::max(a.clone(), b), a);
    }

    #[test]
    fn mul_div_support_proportional_math() {
        let amount = Amount::from(300i64);
        let bps = Amount::from(5_000i64);
        let scaled = (amount * bps) / Amount::from(10_000i64);
        assert_eq!(scaled, Amount::from(150i64));
    }
}
