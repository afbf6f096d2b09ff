//! A tiny rational number type, used to show the assertion primitives on a
//! real domain object.

use std::fmt::{self, Display, Formatter};
use std::ops::{Add, AddAssign};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioError {
    #[error("denominator must not be zero")]
    DivideByZero,
}

/// `numerator / denominator`, never normalized. Equality compares values,
/// so `1/2 == 2/4`.
#[derive(Debug, Clone, Copy)]
pub struct Ratio {
    num: i64,
    den: i64,
}

impl Ratio {
    pub fn new(num: i64, den: i64) -> Result<Self, RatioError> {
        if den == 0 {
            return Err(RatioError::DivideByZero);
        }
        Ok(Self { num, den })
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Sum computed in `i128`, reduced only when the plain result does not
    /// fit. `None` if even the reduced sum overflows `i64`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let num = (self.num as i128 * rhs.den as i128)
            .checked_add(rhs.num as i128 * self.den as i128)?;
        let den = self.den as i128 * rhs.den as i128;
        if let (Ok(num), Ok(den)) = (i64::try_from(num), i64::try_from(den)) {
            return Some(Self { num, den });
        }
        let divisor = gcd(num, den);
        Some(Self {
            num: i64::try_from(num / divisor).ok()?,
            den: i64::try_from(den / divisor).ok()?,
        })
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

impl Default for Ratio {
    fn default() -> Self {
        Self { num: 0, den: 1 }
    }
}

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        self.num as i128 * other.den as i128 == other.num as i128 * self.den as i128
    }
}

/// Panics if the sum is not representable, like integer `+`. Use
/// [`Ratio::checked_add`] to handle that case.
impl AddAssign for Ratio {
    fn add_assign(&mut self, rhs: Self) {
        match self.checked_add(rhs) {
            Some(sum) => *self = sum,
            None => panic!("attempt to add {} and {} with overflow", self, rhs),
        }
    }
}

impl Add for Ratio {
    type Output = Ratio;

    fn add(mut self, rhs: Self) -> Ratio {
        self += rhs;
        self
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
