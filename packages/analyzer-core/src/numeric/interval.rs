//! Closed intervals over [`Num`] (spec §3.2).

use super::Num;
use std::fmt;

/// A closed interval `[low, high]`. `EMPTY` (`high < low`, represented as
/// `[+∞, -∞]`) is the least element; `FULL` (`[-∞, +∞]`) is the greatest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub low: Num,
    pub high: Num,
}

impl Interval {
    pub fn new(low: Num, high: Num) -> Self {
        Self { low, high }
    }

    pub fn point(n: Num) -> Self {
        Self::new(n.clone(), n)
    }

    pub fn exact(low: i64, high: i64) -> Self {
        Self::new(Num::int(low), Num::int(high))
    }

    pub fn full() -> Self {
        Self::new(Num::MInf, Num::PInf)
    }

    pub fn empty() -> Self {
        Self::new(Num::PInf, Num::MInf)
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    pub fn is_full(&self) -> bool {
        self.low == Num::MInf && self.high == Num::PInf
    }

    /// True if `0` lies within `[low, high]`. An empty interval never does.
    pub fn contains_zero(&self) -> bool {
        !self.is_empty() && self.low <= Num::zero() && Num::zero() <= self.high
    }

    pub fn contains(&self, n: &Num) -> bool {
        !self.is_empty() && &self.low <= n && n <= &self.high
    }

    /// `leq` for the interval lattice: subset-or-equal as a range, with
    /// `EMPTY` below everything.
    pub fn leq(&self, other: &Interval) -> bool {
        if self.is_empty() {
            return true;
        }
        if other.is_empty() {
            return false;
        }
        other.low <= self.low && self.high <= other.high
    }

    /// Least upper bound: `[min(a,c), max(b,d)]`, with `EMPTY` neutral.
    pub fn join(&self, other: &Interval) -> Interval {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Interval::new(
            self.low.clone().min(other.low.clone()),
            self.high.clone().max(other.high.clone()),
        )
    }

    pub fn add(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::empty();
        }
        Interval::new(
            self.low.clone() + other.low.clone(),
            self.high.clone() + other.high.clone(),
        )
    }

    pub fn neg(&self) -> Interval {
        if self.is_empty() {
            return Interval::empty();
        }
        Interval::new(-self.high.clone(), -self.low.clone())
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        self.add(&other.neg())
    }

    /// Product taken over the four corner products, componentwise min/max.
    pub fn mul(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::empty();
        }
        let corners = [
            self.low.clone() * other.low.clone(),
            self.low.clone() * other.high.clone(),
            self.high.clone() * other.low.clone(),
            self.high.clone() * other.high.clone(),
        ];
        Interval::from_corners(corners)
    }

    /// Reciprocal-style inversion used by `div`; not a true `1/x` (there is
    /// no rational domain here) — `div` handles the zero-containing case
    /// directly instead of calling this for anything but sign bookkeeping.
    pub fn inv(&self) -> Interval {
        if self.is_empty() {
            return Interval::empty();
        }
        if self.contains_zero() {
            return Interval::full();
        }
        Interval::new(-self.high.clone(), -self.low.clone())
    }

    /// Division by an interval containing zero is undecidable at this
    /// precision and yields `FULL` (spec §3.2, §8 interval laws).
    pub fn div(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::empty();
        }
        if other.contains_zero() {
            return Interval::full();
        }
        let corners = [
            divide(&self.low, &other.low),
            divide(&self.low, &other.high),
            divide(&self.high, &other.low),
            divide(&self.high, &other.high),
        ];
        Interval::from_corners(corners)
    }

    fn from_corners(corners: [Num; 4]) -> Interval {
        let mut low = corners[0].clone();
        let mut high = corners[0].clone();
        for c in &corners[1..] {
            if *c < low {
                low = c.clone();
            }
            if *c > high {
                high = c.clone();
            }
        }
        Interval::new(low, high)
    }

    /// Widening `∇`: unstable bounds jump to the matching infinity,
    /// stable coordinates are preserved (spec §4.A).
    pub fn widen(&self, new: &Interval) -> Interval {
        if self.is_empty() {
            return new.clone();
        }
        if new.is_empty() {
            return self.clone();
        }
        let low = if new.low < self.low {
            Num::MInf
        } else {
            self.low.clone()
        };
        let high = if new.high > self.high {
            Num::PInf
        } else {
            self.high.clone()
        };
        Interval::new(low, high)
    }
}

/// Division at a single pair of corner values. The divisor is guaranteed
/// nonzero by `div`'s zero-containment check before corners are taken.
fn divide(a: &Num, b: &Num) -> Num {
    match (a, b) {
        (Num::IntNum(x), Num::IntNum(y)) => Num::IntNum(x / y),
        (Num::IntNum(_), _) => {
            // finite / infinite -> 0
            Num::zero()
        }
        (_, Num::IntNum(_)) => {
            // infinite / finite nonzero -> infinite, sign of the product of signs
            let sign = a.sign() * b.sign();
            if sign >= 0 {
                Num::PInf
            } else {
                Num::MInf
            }
        }
        _ => {
            // infinite / infinite is mathematically undefined; over-approximate.
            Num::PInf
        }
    }
}

impl crate::lattice::Semilattice for Interval {
    fn leq(&self, other: &Self) -> bool {
        Interval::leq(self, other)
    }
}

impl crate::lattice::JoinSemilattice for Interval {
    fn bottom() -> Self {
        Interval::empty()
    }

    fn join(&self, other: &Self) -> Self {
        Interval::join(self, other)
    }
}

impl crate::lattice::WideningLattice for Interval {
    fn widen(&self, new: &Self) -> Self {
        Interval::widen(self, new)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "EMPTY")
        } else {
            write!(f, "[{}, {}]", self.low, self.high)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_takes_componentwise_min_max() {
        let a = Interval::exact(1, 5);
        let b = Interval::exact(-2, 3);
        let j = a.join(&b);
        assert_eq!(j, Interval::exact(-2, 5));
    }

    #[test]
    fn empty_is_neutral_for_join() {
        let a = Interval::exact(1, 5);
        assert_eq!(a.join(&Interval::empty()), a);
        assert_eq!(Interval::empty().join(&a), a);
    }

    #[test]
    fn empty_leq_everything() {
        assert!(Interval::empty().leq(&Interval::exact(1, 1)));
        assert!(Interval::empty().leq(&Interval::empty()));
    }

    #[test]
    fn add_matches_corner_sums() {
        let a = Interval::exact(1, 5);
        let b = Interval::exact(10, 20);
        let s = a.add(&b);
        assert_eq!(s.low, Num::int(11));
        assert_eq!(s.high, Num::int(25));
    }

    #[test]
    fn sub_is_add_of_negation() {
        let a = Interval::exact(1, 5);
        let b = Interval::exact(1, 1);
        assert_eq!(a.sub(&b), a.add(&b.inv()));
    }

    #[test]
    fn division_by_zero_containing_interval_is_full() {
        let a = Interval::exact(1, 5);
        let b = Interval::exact(-1, 1);
        assert_eq!(a.div(&b), Interval::full());
    }

    #[test]
    fn widen_jumps_unstable_bounds_to_infinity() {
        let old = Interval::exact(0, 10);
        let grown = Interval::exact(-1, 20);
        let w = old.widen(&grown);
        assert_eq!(w, Interval::new(Num::MInf, Num::PInf));

        let stable = Interval::exact(0, 10);
        assert_eq!(old.widen(&stable), old);
    }
}
