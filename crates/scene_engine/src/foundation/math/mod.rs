//! Math kernel
//!
//! Fixed-size vectors, quaternions and row-major matrices used by the
//! transform hierarchy. All types are plain values; every operation is a pure
//! function of its inputs. Domain violations (indexing out of range, transposing
//! a non-square matrix, normalizing a zero vector) are reported through
//! [`MathError`] instead of being clamped.
//!
//! ## Conventions
//!
//! - Matrices are stored row-major and multiply **column** vectors
//!   (`m * v`). Translation lives in the last column.
//! - `a * b` for quaternions applies `b` first, then `a`.

mod scalar;
mod vector;
mod quaternion;
mod matrix;
pub mod interop;

pub use scalar::{Float, Scalar};
pub use vector::Vector;
pub use quaternion::Quaternion;
pub use matrix::{ColumnView, Matrix, SquareMatrix};

use thiserror::Error;

/// 2D vector type
pub type Vec2 = Vector<f32, 2>;

/// 3D vector type
pub type Vec3 = Vector<f32, 3>;

/// 4D vector type
pub type Vec4 = Vector<f32, 4>;

/// 3x3 matrix type
pub type Mat3 = SquareMatrix<f32, 3>;

/// 4x4 matrix type
pub type Mat4 = SquareMatrix<f32, 4>;

/// Errors raised by math operations that fall outside their domain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// The operation is not defined for the given operands
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// An index was outside the valid range
    #[error("Index {index} out of range (len {len})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of valid indices
        len: usize,
    },
}

/// Result type for fallible math operations
pub type MathResult<T> = Result<T, MathError>;

pub(crate) fn check_index(index: usize, len: usize) -> MathResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(MathError::OutOfRange { index, len })
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// Tolerance used by unit-length checks
    pub const UNIT_EPSILON: f32 = 1e-6;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Square of a value
    pub fn square(value: f32) -> f32 {
        value * value
    }
}
