//! Quaternion rotations

use super::{constants::UNIT_EPSILON, MathError, MathResult, Vec3};
use approx::{AbsDiffEq, RelativeEq};
use std::ops::{Div, Mul, MulAssign};

/// Rotation quaternion `(x, y, z, w)`
///
/// Unit quaternions represent rotations. Multiplication is the Hamilton
/// product, so `a * b` rotates by `b` first and then by `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// Imaginary i part
    pub x: f32,
    /// Imaginary j part
    pub y: f32,
    /// Imaginary k part
    pub z: f32,
    /// Real part
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The identity rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a quaternion from raw components
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Embed a vector as a pure imaginary quaternion (`w = 0`)
    pub fn from_vector(v: Vec3) -> Self {
        Self::new(v.x(), v.y(), v.z(), 0.0)
    }

    /// Rotation of `angle` radians around `axis`
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> MathResult<Self> {
        let axis = axis.normalized()?;
        let half_angle = angle * 0.5;
        let sin_half = half_angle.sin();

        Ok(Self::new(
            axis.x() * sin_half,
            axis.y() * sin_half,
            axis.z() * sin_half,
            half_angle.cos(),
        ))
    }

    /// Shortest rotation taking direction `from` onto direction `to`
    pub fn rotate_between(from: Vec3, to: Vec3) -> MathResult<Self> {
        let from = from.normalized()?;
        let to = to.normalized()?;
        let cos_theta = from.dot(&to);

        if cos_theta >= 1.0 - UNIT_EPSILON {
            return Ok(Self::IDENTITY);
        }

        if cos_theta <= -1.0 + UNIT_EPSILON {
            // Opposite directions: any axis orthogonal to `from` works
            let mut axis = Vec3::new(1.0, 0.0, 0.0).cross(&from);
            if axis.magnitude_squared() < UNIT_EPSILON {
                axis = Vec3::new(0.0, 1.0, 0.0).cross(&from);
            }
            return Self::from_axis_angle(axis, std::f32::consts::PI);
        }

        let axis = from.cross(&to);
        Ok(Self::new(axis.x(), axis.y(), axis.z(), 1.0 + cos_theta).normalized())
    }

    /// Components as `[x, y, z, w]`
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Imaginary part as a vector
    pub fn vector_part(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Replace the imaginary part
    pub fn set_xyz(&mut self, v: Vec3) {
        self.x = v.x();
        self.y = v.y();
        self.z = v.z();
    }

    /// Four-dimensional dot product
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Squared norm
    pub fn norm_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Norm
    pub fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }

    /// Conjugate: the inverse rotation for unit quaternions
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse
    pub fn inverse(&self) -> MathResult<Self> {
        let norm_squared = self.norm_squared();
        if norm_squared == 0.0 {
            return Err(MathError::InvalidOperation(
                "cannot invert a zero quaternion".to_string(),
            ));
        }
        Ok(self.conjugate() / norm_squared)
    }

    /// Unit-length copy; a zero quaternion is returned unchanged
    pub fn normalized(&self) -> Self {
        let mut clone = *self;
        clone.normalize();
        clone
    }

    /// Normalize in place; a zero quaternion is left untouched
    pub fn normalize(&mut self) {
        let n = self.norm();
        if n == 0.0 {
            return;
        }
        *self = *self / n;
    }

    /// Whether `|q|²` is within 1e-6 of one
    pub fn is_unit(&self) -> bool {
        (self.norm_squared() - 1.0).abs() < UNIT_EPSILON
    }

    /// Rotate a vector: `q * v * q⁻¹` for unit `q`
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        (*self * Self::from_vector(v) * self.conjugate()).vector_part()
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Div<f32> for Quaternion {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar, self.w / scalar)
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
