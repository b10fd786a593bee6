//! Row-major fixed-size matrices

use super::{check_index, utils::square, Float, MathError, MathResult, Quaternion, Scalar, Vec3, Vector};
use std::ops::{Mul, MulAssign};

/// `W` columns by `H` rows, stored row-major
///
/// Matrices multiply column vectors: `m * v` treats `v` as a column and the
/// product of `Matrix<_, W, H>` with `Matrix<_, W2, W>` is a
/// `Matrix<_, W2, H>`. Mismatched dimensions do not type-check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<T, const W: usize, const H: usize> {
    rows: [[T; W]; H],
}

/// Square matrix alias
pub type SquareMatrix<T, const S: usize> = Matrix<T, S, S>;

/// Read-only view of one matrix column
///
/// Borrows the matrix; nothing is copied until the caller asks for values.
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a, T, const W: usize, const H: usize> {
    matrix: &'a Matrix<T, W, H>,
    col: usize,
}

impl<'a, T: Scalar, const W: usize, const H: usize> ColumnView<'a, T, W, H> {
    /// Column index within the matrix
    pub fn index(&self) -> usize {
        self.col
    }

    /// Number of elements in the column
    pub fn len(&self) -> usize {
        H
    }

    /// Whether the column has no elements
    pub fn is_empty(&self) -> bool {
        H == 0
    }

    /// Element at `row`
    pub fn get(&self, row: usize) -> MathResult<T> {
        check_index(row, H)?;
        Ok(self.matrix.rows[row][self.col])
    }

    /// Iterate the column from top to bottom
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let matrix = self.matrix;
        let col = self.col;
        (0..H).map(move |row| matrix.rows[row][col])
    }

    /// Copy the column out as a vector
    pub fn to_vector(&self) -> Vector<T, H> {
        Vector::from_array(std::array::from_fn(|row| self.matrix.rows[row][self.col]))
    }
}

impl<T: Scalar, const W: usize, const H: usize> Matrix<T, W, H> {
    /// Matrix with every element zero
    pub fn zeros() -> Self {
        Self {
            rows: [[T::ZERO; W]; H],
        }
    }

    /// Build from row arrays
    pub const fn from_rows(rows: [[T; W]; H]) -> Self {
        Self { rows }
    }

    /// Build from row vectors
    pub fn from_row_vectors(rows: [Vector<T, W>; H]) -> Self {
        Self {
            rows: rows.map(<[T; W]>::from),
        }
    }

    /// Build from a flat row-major slice of exactly `W * H` elements
    pub fn from_slice(data: &[T]) -> MathResult<Self> {
        if data.len() != W * H {
            return Err(MathError::InvalidOperation(format!(
                "matrix data size mismatch: expected {} elements, got {}",
                W * H,
                data.len()
            )));
        }

        Ok(Self {
            rows: std::array::from_fn(|row| std::array::from_fn(|col| data[row * W + col])),
        })
    }

    /// Number of columns
    pub const fn width(&self) -> usize {
        W
    }

    /// Number of rows
    pub const fn height(&self) -> usize {
        H
    }

    /// All rows
    pub fn rows(&self) -> &[[T; W]; H] {
        &self.rows
    }

    /// Borrow one row
    pub fn row(&self, row: usize) -> MathResult<&[T; W]> {
        check_index(row, H)?;
        Ok(&self.rows[row])
    }

    /// Mutably borrow one row
    pub fn row_mut(&mut self, row: usize) -> MathResult<&mut [T; W]> {
        check_index(row, H)?;
        Ok(&mut self.rows[row])
    }

    /// Copy one row out as a vector
    pub fn row_vector(&self, row: usize) -> MathResult<Vector<T, W>> {
        self.row(row).map(|r| Vector::from_array(*r))
    }

    /// View one column
    pub fn col(&self, col: usize) -> MathResult<ColumnView<'_, T, W, H>> {
        check_index(col, W)?;
        Ok(ColumnView { matrix: self, col })
    }

    /// Views of every column, left to right
    pub fn cols(&self) -> impl Iterator<Item = ColumnView<'_, T, W, H>> {
        (0..W).map(move |col| ColumnView { matrix: self, col })
    }

    /// Element at (`row`, `col`)
    pub fn get(&self, row: usize, col: usize) -> MathResult<T> {
        check_index(row, H)?;
        check_index(col, W)?;
        Ok(self.rows[row][col])
    }

    /// Mutable element at (`row`, `col`)
    pub fn get_mut(&mut self, row: usize, col: usize) -> MathResult<&mut T> {
        check_index(row, H)?;
        check_index(col, W)?;
        Ok(&mut self.rows[row][col])
    }

    /// Overwrite the element at (`row`, `col`)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> MathResult<()> {
        *self.get_mut(row, col)? = value;
        Ok(())
    }

    /// Elements as a flat row-major slice
    pub fn as_slice(&self) -> &[T] {
        self.rows.as_flattened()
    }

    /// Mirror across the diagonal into a new `H x W` matrix
    pub fn transposed(&self) -> Matrix<T, H, W> {
        Matrix {
            rows: std::array::from_fn(|row| std::array::from_fn(|col| self.rows[col][row])),
        }
    }

    /// Transpose in place
    ///
    /// Only square matrices can be transposed in place; anything else is an
    /// [`MathError::InvalidOperation`].
    pub fn transpose(&mut self) -> MathResult<&mut Self> {
        if W != H {
            return Err(MathError::InvalidOperation(format!(
                "cannot transpose a non-square {W}x{H} matrix in place"
            )));
        }

        for i in 0..H {
            for j in (i + 1)..W {
                let upper = self.rows[i][j];
                self.rows[i][j] = self.rows[j][i];
                self.rows[j][i] = upper;
            }
        }

        Ok(self)
    }
}

impl<T: Scalar, const S: usize> Matrix<T, S, S> {
    /// Identity matrix
    pub fn identity() -> Self {
        let mut matrix = Self::zeros();
        for i in 0..S {
            matrix.rows[i][i] = T::ONE;
        }
        matrix
    }
}

/// Square matrices default to the identity
impl<T: Scalar, const S: usize> Default for Matrix<T, S, S> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Float, const S: usize> Matrix<T, S, S> {
    /// Inverse by Gauss-Jordan elimination with partial pivoting
    pub fn inverse(&self) -> MathResult<Self> {
        let mut a = self.rows;
        let mut inv = Self::identity().rows;

        for col in 0..S {
            let mut pivot = col;
            let mut best = a[col][col].abs();
            for row in (col + 1)..S {
                let candidate = a[row][col].abs();
                if candidate > best {
                    best = candidate;
                    pivot = row;
                }
            }

            if best <= T::EPSILON {
                return Err(MathError::InvalidOperation("matrix is singular".to_string()));
            }

            a.swap(col, pivot);
            inv.swap(col, pivot);

            let p = a[col][col];
            for c in 0..S {
                a[col][c] = a[col][c] / p;
                inv[col][c] = inv[col][c] / p;
            }

            for row in 0..S {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == T::ZERO {
                    continue;
                }
                for c in 0..S {
                    let da = factor * a[col][c];
                    let di = factor * inv[col][c];
                    a[row][c] -= da;
                    inv[row][c] -= di;
                }
            }
        }

        Ok(Self { rows: inv })
    }
}

impl Matrix<f32, 4, 4> {
    /// Translation by `t`
    pub fn translation(t: Vec3) -> Self {
        let mut matrix = Self::identity();
        matrix.rows[0][3] = t.x();
        matrix.rows[1][3] = t.y();
        matrix.rows[2][3] = t.z();
        matrix
    }

    /// Non-uniform scaling by `s`
    pub fn scaling(s: Vec3) -> Self {
        let mut matrix = Self::identity();
        for i in 0..3 {
            matrix.rows[i][i] = s[i];
        }
        matrix
    }

    /// Rotation matrix of a (unit) quaternion
    pub fn rotation(q: Quaternion) -> Self {
        let Quaternion { x, y, z, w } = q;
        Self::from_rows([
            [
                1.0 - 2.0 * square(y) - 2.0 * square(z),
                2.0 * x * y - 2.0 * z * w,
                2.0 * x * z + 2.0 * y * w,
                0.0,
            ],
            [
                2.0 * x * y + 2.0 * z * w,
                1.0 - 2.0 * square(x) - 2.0 * square(z),
                2.0 * y * z - 2.0 * x * w,
                0.0,
            ],
            [
                2.0 * x * z - 2.0 * y * w,
                2.0 * y * z + 2.0 * x * w,
                1.0 - 2.0 * square(x) - 2.0 * square(y),
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-multiply a scaling
    pub fn scale(&mut self, s: Vec3) -> &mut Self {
        *self *= Self::scaling(s);
        self
    }

    /// Right-multiply a translation
    pub fn translate(&mut self, t: Vec3) -> &mut Self {
        *self *= Self::translation(t);
        self
    }

    /// Right-multiply a rotation
    pub fn rotate(&mut self, q: Quaternion) -> &mut Self {
        *self *= Self::rotation(q);
        self
    }

    /// Right-handed perspective projection
    ///
    /// `homogeneous_depth` selects a `[-1, 1]` clip-space depth range,
    /// otherwise depth maps to `[0, 1]`.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32, homogeneous_depth: bool) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        let mut matrix = Self::zeros();

        matrix.rows[0][0] = f / aspect;
        matrix.rows[1][1] = f;
        if homogeneous_depth {
            matrix.rows[2][2] = (far + near) / (near - far);
            matrix.rows[2][3] = 2.0 * far * near / (near - far);
        } else {
            matrix.rows[2][2] = far / (near - far);
            matrix.rows[2][3] = near * far / (near - far);
        }
        matrix.rows[3][2] = -1.0;

        matrix
    }

    /// Transform a point (implicit `w = 1`, translation applies)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * p.extend(1.0)).xyz()
    }

    /// Transform a direction (implicit `w = 0`, translation ignored)
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        (*self * d.extend(0.0)).xyz()
    }

    /// Translation component (last column)
    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }

    /// The 16 elements in row-major order
    pub fn to_row_major_array(&self) -> [f32; 16] {
        std::array::from_fn(|i| self.rows[i / 4][i % 4])
    }

    /// The 16 elements in column-major order, as most GPU APIs expect
    pub fn to_column_major_array(&self) -> [f32; 16] {
        std::array::from_fn(|i| self.rows[i % 4][i / 4])
    }
}

impl<T: Scalar, const W: usize, const H: usize, const W2: usize> Mul<Matrix<T, W2, W>> for Matrix<T, W, H> {
    type Output = Matrix<T, W2, H>;

    fn mul(self, other: Matrix<T, W2, W>) -> Matrix<T, W2, H> {
        let mut result = Matrix::<T, W2, H>::zeros();
        for i in 0..H {
            for j in 0..W2 {
                let mut sum = T::ZERO;
                for k in 0..W {
                    sum += self.rows[i][k] * other.rows[k][j];
                }
                result.rows[i][j] = sum;
            }
        }
        result
    }
}

impl<T: Scalar, const S: usize> MulAssign for Matrix<T, S, S> {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl<T: Scalar, const W: usize, const H: usize> Mul<Vector<T, W>> for Matrix<T, W, H> {
    type Output = Vector<T, H>;

    fn mul(self, v: Vector<T, W>) -> Vector<T, H> {
        Vector::from_array(std::array::from_fn(|row| {
            self.rows[row]
                .iter()
                .zip(v.iter())
                .fold(T::ZERO, |acc, (&a, &b)| acc + a * b)
        }))
    }
}

impl<T, const W: usize, const H: usize> approx::AbsDiffEq for Matrix<T, W, H>
where
    T: Scalar + approx::AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.as_slice()
            .iter()
            .zip(other.as_slice().iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T, const W: usize, const H: usize> approx::RelativeEq for Matrix<T, W, H>
where
    T: Scalar + approx::RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.as_slice()
            .iter()
            .zip(other.as_slice().iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use crate::foundation::math::{Mat4, Vec4};
    use approx::assert_relative_eq;

    fn sample_4x4() -> Mat4 {
        Mat4::from_rows([
            [2.0, 0.5, -1.0, 3.0],
            [0.0, 1.5, 4.0, -2.0],
            [1.0, -3.0, 0.25, 0.0],
            [0.5, 2.0, 1.0, 1.0],
        ])
    }

    #[test]
    fn test_square_default_is_identity() {
        let m = SquareMatrix::<f32, 3>::default();
        assert_eq!(m.row_vector(0).unwrap(), Vector::<f32, 3>::new(1.0, 0.0, 0.0));
        assert_eq!(m.row_vector(1).unwrap(), Vector::<f32, 3>::new(0.0, 1.0, 0.0));
        assert_eq!(m.row_vector(2).unwrap(), Vector::<f32, 3>::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rows_and_cols_views() {
        let m = SquareMatrix::<f32, 2>::from_row_vectors([
            Vector::<f32, 2>::new(1.0, 2.0),
            Vector::<f32, 2>::new(3.0, 4.0),
        ]);

        assert_eq!(m.row(0).unwrap(), &[1.0, 2.0]);
        assert_eq!(m.row(1).unwrap(), &[3.0, 4.0]);

        let cols: Vec<Vec<f32>> = m.cols().map(|c| c.iter().collect()).collect();
        assert_eq!(cols, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
        assert_eq!(m.col(1).unwrap().get(0), Ok(2.0));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut m = Mat4::identity();
        assert_eq!(m.row(4).unwrap_err(), MathError::OutOfRange { index: 4, len: 4 });
        assert!(m.col(7).is_err());
        assert!(m.get(0, 4).is_err());
        assert!(m.set(9, 0, 1.0).is_err());
        assert!(m.col(0).unwrap().get(4).is_err());
    }

    #[test]
    fn test_2x2_multiplication() {
        let a = SquareMatrix::<f32, 2>::from_rows([[1.0, 2.0], [3.0, 4.0]]);
        let b = SquareMatrix::<f32, 2>::from_rows([[5.0, 6.0], [7.0, 8.0]]);
        let result = a * b;
        assert_eq!(result.rows(), &[[19.0, 22.0], [43.0, 50.0]]);
    }

    #[test]
    fn test_3x3_multiplication() {
        let a = SquareMatrix::<f32, 3>::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let b = SquareMatrix::<f32, 3>::from_rows([[9.0, 8.0, 7.0], [6.0, 5.0, 4.0], [3.0, 2.0, 1.0]]);
        let result = a * b;
        assert_eq!(
            result.rows(),
            &[[30.0, 24.0, 18.0], [84.0, 69.0, 54.0], [138.0, 114.0, 90.0]]
        );
    }

    #[test]
    fn test_rectangular_multiplication_dimensions() {
        // 3 columns x 2 rows times 2 columns x 3 rows gives 2 x 2
        let a = Matrix::<i32, 3, 2>::from_rows([[1, 2, 3], [4, 5, 6]]);
        let b = Matrix::<i32, 2, 3>::from_rows([[7, 8], [9, 10], [11, 12]]);
        let c: Matrix<i32, 2, 2> = a * b;
        assert_eq!(c.rows(), &[[58, 64], [139, 154]]);
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = sample_4x4();
        assert_eq!(Mat4::identity() * m, m);
        assert_eq!(m * Mat4::identity(), m);
    }

    #[test]
    fn test_double_transpose_roundtrip() {
        let m = sample_4x4();
        let mut t = m;
        t.transpose().unwrap();
        assert_eq!(t, m.transposed());
        t.transpose().unwrap();
        assert_eq!(t, m);
    }

    #[test]
    fn test_non_square_transpose_in_place_fails() {
        let mut m = Matrix::<f32, 3, 2>::zeros();
        assert!(matches!(m.transpose(), Err(MathError::InvalidOperation(_))));
        assert_eq!(m.transposed().height(), 3);
    }

    #[test]
    fn test_from_slice_size_mismatch() {
        assert!(Matrix::<f32, 3, 1>::from_slice(&[1.0, 2.0]).is_err());
        let m = Matrix::<f32, 3, 1>::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.row(0).unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_translate_identity() {
        let mut m = Mat4::identity();
        m.translate(Vec3::new(10.0, 20.0, 30.0));

        assert_eq!(m.row(0).unwrap(), &[1.0, 0.0, 0.0, 10.0]);
        assert_eq!(m.row(1).unwrap(), &[0.0, 1.0, 0.0, 20.0]);
        assert_eq!(m.row(2).unwrap(), &[0.0, 0.0, 1.0, 30.0]);
        assert_eq!(m.row(3).unwrap(), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_composition_order_matters() {
        let t = Vec3::new(1.0, 2.0, 3.0);
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), HALF_PI).unwrap();
        let s = Vec3::new(2.0, 2.0, 2.0);

        let mut trs = Mat4::identity();
        trs.translate(t).rotate(q).scale(s);
        let mut srt = Mat4::identity();
        srt.scale(s).rotate(q).translate(t);

        // T * R * S scales first, then rotates, then translates
        let p = Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(trs.transform_point(p), Vec3::new(1.0, 4.0, 3.0), epsilon = 1e-5);
        assert!(approx::relative_ne!(trs, srt, epsilon = 1e-3));
    }

    #[test]
    fn test_matrix_vector_product() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m * Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(m.transform_direction(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_inverse() {
        let m = sample_4x4();
        let inv = m.inverse().unwrap();
        assert_relative_eq!(m * inv, Mat4::identity(), epsilon = 1e-5);

        let singular = Mat4::zeros();
        assert!(matches!(singular.inverse(), Err(MathError::InvalidOperation(_))));
    }

    #[test]
    fn test_major_order_exports() {
        let m = Mat4::translation(Vec3::new(4.0, 5.0, 6.0));
        let rows = m.to_row_major_array();
        let cols = m.to_column_major_array();
        assert_eq!(rows[3], 4.0);
        assert_eq!(cols[12], 4.0);
        assert_eq!(cols[13], 5.0);
        assert_eq!(cols[14], 6.0);
    }
}
