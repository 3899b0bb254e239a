//! `Num`: an arbitrary-precision integer extended with ±∞ (spec §3.1).

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// An arbitrary-precision integer, or one of the two infinities.
///
/// Comparison is total with `MInf < IntNum(_) < PInf`. Arithmetic is total:
/// every operation below is defined for every pair of operands, following
/// the usual conventions for infinite operands (`0 * ∞ = 0`; signs of
/// infinities in multiplication follow ordinary sign rules).
#[derive(Debug, Clone, Eq)]
pub enum Num {
    IntNum(BigInt),
    PInf,
    MInf,
}

impl Num {
    pub fn int(n: impl Into<BigInt>) -> Self {
        Num::IntNum(n.into())
    }

    pub fn zero() -> Self {
        Num::IntNum(BigInt::zero())
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Num::PInf | Num::MInf)
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Num::IntNum(n) => Some(n),
            _ => None,
        }
    }

    fn rank(&self) -> i8 {
        match self {
            Num::MInf => -1,
            Num::IntNum(_) => 0,
            Num::PInf => 1,
        }
    }

    pub(crate) fn sign(&self) -> i32 {
        match self {
            Num::MInf => -1,
            Num::PInf => 1,
            Num::IntNum(n) => {
                if n.is_positive() {
                    1
                } else if n.is_negative() {
                    -1
                } else {
                    0
                }
            }
        }
    }
}

impl PartialEq for Num {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Num::PInf, Num::PInf) | (Num::MInf, Num::MInf) => true,
            (Num::IntNum(a), Num::IntNum(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Num {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Num {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Num::IntNum(a), Num::IntNum(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::IntNum(n) => write!(f, "{}", n),
            Num::PInf => write!(f, "+inf"),
            Num::MInf => write!(f, "-inf"),
        }
    }
}

impl Add for Num {
    type Output = Num;

    /// `+∞ + -∞` is mathematically undefined; we over-approximate to `+∞`
    /// so callers never observe a partial result (interval arithmetic
    /// treats this case specially by widening to `FULL` before it occurs
    /// in practice, since it only arises from corner products the interval
    /// layer discards).
    fn add(self, rhs: Num) -> Num {
        match (&self, &rhs) {
            (Num::IntNum(a), Num::IntNum(b)) => Num::IntNum(a + b),
            (Num::PInf, Num::MInf) | (Num::MInf, Num::PInf) => Num::PInf,
            (Num::PInf, _) | (_, Num::PInf) => Num::PInf,
            (Num::MInf, _) | (_, Num::MInf) => Num::MInf,
        }
    }
}

impl Sub for Num {
    type Output = Num;

    fn sub(self, rhs: Num) -> Num {
        self + (-rhs)
    }
}

impl Neg for Num {
    type Output = Num;

    fn neg(self) -> Num {
        match self {
            Num::IntNum(n) => Num::IntNum(-n),
            Num::PInf => Num::MInf,
            Num::MInf => Num::PInf,
        }
    }
}

impl Mul for Num {
    type Output = Num;

    /// `0 * ∞ = 0` per spec §3.1; otherwise infinities absorb with the sign
    /// of the product of signs.
    fn mul(self, rhs: Num) -> Num {
        match (&self, &rhs) {
            (Num::IntNum(a), Num::IntNum(b)) => Num::IntNum(a * b),
            (Num::IntNum(a), _) if a.is_zero() => Num::zero(),
            (_, Num::IntNum(b)) if b.is_zero() => Num::zero(),
            _ => {
                let sign = self.sign() * rhs.sign();
                if sign >= 0 {
                    Num::PInf
                } else {
                    Num::MInf
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: i64) -> Num {
        Num::IntNum(BigInt::from(x))
    }

    #[test]
    fn total_order_with_infinities() {
        assert!(Num::MInf < n(-1_000_000));
        assert!(n(5) < Num::PInf);
        assert!(Num::MInf < Num::PInf);
        assert_eq!(n(3).cmp(&n(3)), Ordering::Equal);
    }

    #[test]
    fn zero_times_infinity_is_zero() {
        assert_eq!(Num::zero() * Num::PInf, Num::zero());
        assert_eq!(Num::PInf * Num::zero(), Num::zero());
    }

    #[test]
    fn infinities_propagate_through_addition() {
        assert_eq!(Num::PInf + n(5), Num::PInf);
        assert_eq!(Num::MInf + n(5), Num::MInf);
    }

    #[test]
    fn multiplication_sign_rules() {
        assert_eq!(Num::PInf * n(-2), Num::MInf);
        assert_eq!(Num::MInf * n(-2), Num::PInf);
        assert_eq!(Num::PInf * Num::PInf, Num::PInf);
        assert_eq!(Num::PInf * Num::MInf, Num::MInf);
    }

    #[test]
    fn negation_flips_infinities() {
        assert_eq!(-Num::PInf, Num::MInf);
        assert_eq!(-Num::MInf, Num::PInf);
        assert_eq!(-n(4), n(-4));
    }
}
