//! Element traits for the generic math types

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Numeric element usable in vectors and matrices
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + 'static
{
    /// Additive identity
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;
}

/// Floating point element, required for lengths, normalization and inversion
pub trait Float: Scalar {
    /// Square root
    fn sqrt(self) -> Self;
    /// Absolute value
    fn abs(self) -> Self;
    /// Smallest magnitude treated as non-zero by guarded operations
    const EPSILON: Self;
}

macro_rules! impl_scalar {
    ($($ty:ty => $zero:expr, $one:expr);* $(;)?) => {
        $(
            impl Scalar for $ty {
                const ZERO: Self = $zero;
                const ONE: Self = $one;
            }
        )*
    };
}

impl_scalar! {
    f32 => 0.0, 1.0;
    f64 => 0.0, 1.0;
    i32 => 0, 1;
    i64 => 0, 1;
}

impl Float for f32 {
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    fn abs(self) -> Self {
        f32::abs(self)
    }

    const EPSILON: Self = f32::EPSILON;
}

impl Float for f64 {
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn abs(self) -> Self {
        f64::abs(self)
    }

    const EPSILON: Self = f64::EPSILON;
}
