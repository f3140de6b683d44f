//! Scalar trait for matrix element types.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

use faer_traits::ComplexField;

pub use faer::c64;

/// Trait for scalar types supported by blockpatch.
///
/// This trait wraps faer's `ComplexField` with the arithmetic and threading
/// bounds required for block-matrix operations. The real unit is pinned to
/// `f64`, so eigenvalues of self-adjoint matrices come back as plain `f64`
/// for every element type. The `re` and `modulus` accessors are what phase
/// canonicalization needs: the sign of the real part of a coefficient and
/// its magnitude.
pub trait Scalar:
    ComplexField<Real = f64>
    + Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + Mul<Output = Self>
    + MulAssign
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    /// Embed a real value into this scalar type.
    fn from_f64(v: f64) -> Self;

    /// The real part, as `f64`.
    fn re(&self) -> f64;

    /// The magnitude |z|, as `f64`.
    fn modulus(&self) -> f64;

    /// The complex conjugate.
    fn conjugate(&self) -> Self;
}

impl Scalar for f64 {
    fn one() -> Self {
        1.0
    }

    fn from_f64(v: f64) -> Self {
        v
    }

    fn re(&self) -> f64 {
        *self
    }

    fn modulus(&self) -> f64 {
        self.abs()
    }

    fn conjugate(&self) -> Self {
        *self
    }
}

impl Scalar for c64 {
    fn one() -> Self {
        c64::new(1.0, 0.0)
    }

    fn from_f64(v: f64) -> Self {
        c64::new(v, 0.0)
    }

    fn re(&self) -> f64 {
        self.re
    }

    fn modulus(&self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }

    fn conjugate(&self) -> Self {
        c64::new(self.re, -self.im)
    }
}
