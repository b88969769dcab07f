//! # 三维向量运算
//!
//! 以 `[f64; 3]` 表示向量，提供点积、叉积、归一化等纯函数。
//!
//! ## 依赖关系
//! - 被 `geometry/shapes.rs`, `geometry/rotation.rs` 和 `rowland/` 使用

use crate::error::{RowlandError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;

/// 三维向量
pub type Vec3 = [f64; 3];

/// 判断零向量、共线等退化情况的默认容差
pub const EPSILON: f64 = 1e-10;

/// 实验室坐标系中的点 (x, y, z)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GeometryPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        GeometryPoint { x, y, z }
    }

    /// 坐标原点（样品位置）
    pub fn origin() -> Self {
        Self::default()
    }

    pub fn to_array(self) -> Vec3 {
        [self.x, self.y, self.z]
    }

    /// 到另一点的距离
    pub fn distance(&self, other: &GeometryPoint) -> f64 {
        distance(&self.to_array(), &other.to_array())
    }
}

impl From<Vec3> for GeometryPoint {
    fn from(v: Vec3) -> Self {
        GeometryPoint::new(v[0], v[1], v[2])
    }
}

impl From<GeometryPoint> for Vec3 {
    fn from(p: GeometryPoint) -> Self {
        p.to_array()
    }
}

impl fmt::Display for GeometryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

/// 向量点积
pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 向量叉积
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: &Vec3, factor: f64) -> Vec3 {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

/// 向量长度
pub fn norm(v: &Vec3) -> f64 {
    dot(v, v).sqrt()
}

/// 两点间距离
pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    norm(&sub(a, b))
}

/// 单位向量，零向量时返回 `DegenerateVector`
pub fn unit(v: &Vec3) -> Result<Vec3> {
    unit_within(v, EPSILON)
}

/// 单位向量，使用自定义容差
pub fn unit_within(v: &Vec3, epsilon: f64) -> Result<Vec3> {
    let length = norm(v);
    if !length.is_finite() || length <= epsilon {
        return Err(RowlandError::DegenerateVector { epsilon });
    }
    Ok(scale(v, 1.0 / length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cross_right_handed() {
        let z = cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_eq!(z, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unit_length() {
        let u = unit(&[3.0, 4.0, 12.0]).unwrap();
        assert_abs_diff_eq!(norm(&u), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[2], 12.0 / 13.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unit_zero_vector() {
        assert!(matches!(
            unit(&[0.0, 0.0, 0.0]),
            Err(RowlandError::DegenerateVector { .. })
        ));
    }

    #[test]
    fn test_unit_custom_epsilon() {
        let tiny = [1e-6, 0.0, 0.0];
        assert!(unit(&tiny).is_ok());
        assert!(unit_within(&tiny, 1e-3).is_err());
    }

    #[test]
    fn test_geometry_point_distance() {
        let a = GeometryPoint::new(1.0, 2.0, 2.0);
        assert_abs_diff_eq!(a.distance(&GeometryPoint::origin()), 3.0, epsilon = 1e-12);
        assert_eq!(GeometryPoint::from(a.to_array()), a);
    }
}
