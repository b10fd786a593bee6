//! Fixed-size numeric vectors

use super::{check_index, Float, MathError, MathResult, Scalar};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// Fixed-size numeric tuple with value semantics
///
/// `N` is usually 2, 3 or 4. Out-of-range access through [`Vector::get`]
/// returns [`MathError::OutOfRange`]; the `Index` operator panics instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<T, const N: usize> {
    data: [T; N],
}

impl<T: Scalar, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Scalar, const N: usize> Vector<T, N> {
    /// Create a vector from its components
    pub const fn from_array(data: [T; N]) -> Self {
        Self { data }
    }

    /// Vector with every component set to zero
    pub fn zeros() -> Self {
        Self { data: [T::ZERO; N] }
    }

    /// Vector with every component set to `value`
    pub fn splat(value: T) -> Self {
        Self { data: [value; N] }
    }

    /// Number of components
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false; vectors have at least one component
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Components as an array
    pub const fn as_array(&self) -> &[T; N] {
        &self.data
    }

    /// Components as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over the components
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Checked component read
    pub fn get(&self, index: usize) -> MathResult<T> {
        check_index(index, N)?;
        Ok(self.data[index])
    }

    /// Checked component write
    pub fn set(&mut self, index: usize, value: T) -> MathResult<()> {
        check_index(index, N)?;
        self.data[index] = value;
        Ok(())
    }

    /// Apply `f` to every component
    pub fn map(self, f: impl Fn(T) -> T) -> Self {
        Self {
            data: std::array::from_fn(|i| f(self.data[i])),
        }
    }

    /// Combine two vectors component by component
    pub fn zip_with(self, other: Self, f: impl Fn(T, T) -> T) -> Self {
        Self {
            data: std::array::from_fn(|i| f(self.data[i], other.data[i])),
        }
    }

    /// Component-wise product
    pub fn component_mul(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a * b)
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> T {
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(T::ZERO, |acc, (&a, &b)| acc + a * b)
    }

    /// Squared length
    pub fn magnitude_squared(&self) -> T {
        self.dot(self)
    }
}

impl<T: Float, const N: usize> Vector<T, N> {
    /// Euclidean length
    pub fn magnitude(&self) -> T {
        self.magnitude_squared().sqrt()
    }

    /// Unit-length copy of this vector
    ///
    /// A zero-length vector has no direction and yields
    /// [`MathError::InvalidOperation`].
    pub fn normalized(&self) -> MathResult<Self> {
        let magnitude = self.magnitude();
        if magnitude <= T::EPSILON {
            return Err(MathError::InvalidOperation(
                "cannot normalize a zero-length vector".to_string(),
            ));
        }
        Ok(*self / magnitude)
    }

    /// Normalize in place, see [`Vector::normalized`]
    pub fn normalize(&mut self) -> MathResult<()> {
        *self = self.normalized()?;
        Ok(())
    }
}

macro_rules! impl_accessors {
    ($n:literal: $($name:ident / $setter:ident => $idx:literal),*) => {
        impl<T: Scalar> Vector<T, $n> {
            $(
                #[doc = concat!("Component ", stringify!($idx))]
                pub fn $name(&self) -> T {
                    self.data[$idx]
                }

                #[doc = concat!("Set component ", stringify!($idx))]
                pub fn $setter(&mut self, value: T) {
                    self.data[$idx] = value;
                }
            )*
        }
    };
}

impl_accessors!(2: x / set_x => 0, y / set_y => 1);
impl_accessors!(3: x / set_x => 0, y / set_y => 1, z / set_z => 2);
impl_accessors!(4: x / set_x => 0, y / set_y => 1, z / set_z => 2, w / set_w => 3);

impl<T: Scalar> Vector<T, 2> {
    /// Create a 2D vector
    pub const fn new(x: T, y: T) -> Self {
        Self { data: [x, y] }
    }

    /// 2D cross product (determinant of the two vectors)
    pub fn det(&self, other: &Self) -> T {
        self.data[0] * other.data[1] - self.data[1] * other.data[0]
    }
}

impl<T: Scalar> Vector<T, 3> {
    /// Create a 3D vector
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { data: [x, y, z] }
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.data;
        let [bx, by, bz] = other.data;
        Self::new(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx)
    }

    /// First two components
    pub fn xy(&self) -> Vector<T, 2> {
        Vector::<T, 2>::new(self.data[0], self.data[1])
    }

    /// Append a fourth component
    pub fn extend(&self, w: T) -> Vector<T, 4> {
        Vector::<T, 4>::new(self.data[0], self.data[1], self.data[2], w)
    }
}

impl<T: Scalar> Vector<T, 4> {
    /// Create a 4D vector
    pub const fn new(x: T, y: T, z: T, w: T) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// First three components
    pub fn xyz(&self) -> Vector<T, 3> {
        Vector::<T, 3>::new(self.data[0], self.data[1], self.data[2])
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(data: [T; N]) -> Self {
        Self { data }
    }
}

impl<T: Scalar, const N: usize> From<Vector<T, N>> for [T; N] {
    fn from(vector: Vector<T, N>) -> Self {
        vector.data
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T: Scalar, const N: usize> Add for Vector<T, N> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }
}

impl<T: Scalar, const N: usize> AddAssign for Vector<T, N> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<T: Scalar, const N: usize> Sub for Vector<T, N> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }
}

impl<T: Scalar, const N: usize> SubAssign for Vector<T, N> {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl<T: Scalar, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|a| -a)
    }
}

impl<T: Scalar, const N: usize> Mul<T> for Vector<T, N> {
    type Output = Self;

    fn mul(self, scalar: T) -> Self {
        self.map(|a| a * scalar)
    }
}

impl<T: Scalar, const N: usize> MulAssign<T> for Vector<T, N> {
    fn mul_assign(&mut self, scalar: T) {
        *self = *self * scalar;
    }
}

impl<T: Scalar, const N: usize> Div<T> for Vector<T, N> {
    type Output = Self;

    fn div(self, scalar: T) -> Self {
        self.map(|a| a / scalar)
    }
}

impl<T: Scalar, const N: usize> DivAssign<T> for Vector<T, N> {
    fn div_assign(&mut self, scalar: T) {
        *self = *self / scalar;
    }
}

impl<T: Scalar + fmt::Display, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec{{")?;
        for (i, value) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "}}")
    }
}

impl<T, const N: usize> approx::AbsDiffEq for Vector<T, N>
where
    T: Scalar + approx::AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T, const N: usize> approx::RelativeEq for Vector<T, N>
where
    T: Scalar + approx::RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_componentwise_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(b / 2.0, Vec3::new(2.0, 2.5, 3.0));
    }

    #[test]
    fn test_dot_and_cross() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);

        assert_eq!(x.dot(&y), 0.0);
        assert_eq!(x.cross(&y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_normalization() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        assert_relative_eq!(v.magnitude(), 5.0);
        assert_relative_eq!(v.normalized().unwrap(), Vec3::new(0.6, 0.0, 0.8));
        assert_relative_eq!(v.normalized().unwrap().magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_vector_normalization_is_rejected() {
        let zero = Vec3::zeros();
        assert!(matches!(zero.normalized(), Err(MathError::InvalidOperation(_))));
    }

    #[test]
    fn test_checked_access() {
        let mut v = Vector::<i32, 2>::new(7, 9);
        assert_eq!(v.get(1), Ok(9));
        assert_eq!(v.get(2), Err(MathError::OutOfRange { index: 2, len: 2 }));
        assert!(v.set(5, 1).is_err());
        v.set(0, 1).unwrap();
        assert_eq!(v.x(), 1);
    }

    #[test]
    #[should_panic]
    fn test_index_operator_panics_out_of_range() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let _ = v[3];
    }

    #[test]
    fn test_extend_and_truncate() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let v4 = v.extend(1.0);
        assert_eq!(v4.w(), 1.0);
        assert_eq!(v4.xyz(), v);
        assert_eq!(v.xy(), Vector::<f32, 2>::new(1.0, 2.0));
    }

    #[test]
    fn test_display() {
        let v = Vector::<i32, 3>::new(1, 2, 3);
        assert_eq!(v.to_string(), "Vec{1, 2, 3}");
    }
}
