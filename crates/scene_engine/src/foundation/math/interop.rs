//! Conversions to and from nalgebra
//!
//! Lets callers hand engine math to code written against nalgebra and
//! back without going through raw arrays.

use super::{Mat4, Quaternion, Vec3, Vec4};

impl From<nalgebra::Vector3<f32>> for Vec3 {
    fn from(v: nalgebra::Vector3<f32>) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for nalgebra::Vector3<f32> {
    fn from(v: Vec3) -> Self {
        nalgebra::Vector3::new(v.x(), v.y(), v.z())
    }
}

impl From<nalgebra::Vector4<f32>> for Vec4 {
    fn from(v: nalgebra::Vector4<f32>) -> Self {
        Vec4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vec4> for nalgebra::Vector4<f32> {
    fn from(v: Vec4) -> Self {
        nalgebra::Vector4::new(v.x(), v.y(), v.z(), v.w())
    }
}

impl From<nalgebra::Matrix4<f32>> for Mat4 {
    fn from(m: nalgebra::Matrix4<f32>) -> Self {
        Mat4::from_rows(std::array::from_fn(|row| std::array::from_fn(|col| m[(row, col)])))
    }
}

impl From<Mat4> for nalgebra::Matrix4<f32> {
    fn from(m: Mat4) -> Self {
        nalgebra::Matrix4::from_row_slice(m.as_slice())
    }
}

impl From<nalgebra::Quaternion<f32>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f32>) -> Self {
        Quaternion::new(q.i, q.j, q.k, q.w)
    }
}

impl From<nalgebra::UnitQuaternion<f32>> for Quaternion {
    fn from(q: nalgebra::UnitQuaternion<f32>) -> Self {
        q.into_inner().into()
    }
}

impl From<Quaternion> for nalgebra::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        nalgebra::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}
