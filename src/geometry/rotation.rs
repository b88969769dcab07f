//! # 三维旋转
//!
//! Euler–Rodrigues 旋转矩阵，右手定则（绕轴逆时针为正）。
//!
//! ## 依赖关系
//! - 被 `rowland/horizontal.rs`, `rowland/vertical.rs` 使用
//! - 使用 `geometry/vector.rs`

use crate::error::Result;
use crate::geometry::vector::{unit, Vec3};

/// 3x3 矩阵，行优先
pub type Matrix3 = [[f64; 3]; 3];

/// 绕 `axis` 旋转 `angle`（弧度）的旋转矩阵
pub fn rotation_matrix(axis: &Vec3, angle: f64) -> Result<Matrix3> {
    let k = unit(axis)?;
    let a = (angle / 2.0).cos();
    let s = (angle / 2.0).sin();
    let (b, c, d) = (-k[0] * s, -k[1] * s, -k[2] * s);

    Ok([
        [
            a * a + b * b - c * c - d * d,
            2.0 * (b * c + a * d),
            2.0 * (b * d - a * c),
        ],
        [
            2.0 * (b * c - a * d),
            a * a + c * c - b * b - d * d,
            2.0 * (c * d + a * b),
        ],
        [
            2.0 * (b * d + a * c),
            2.0 * (c * d - a * b),
            a * a + d * d - b * b - c * c,
        ],
    ])
}

/// 矩阵乘向量
pub fn apply(m: &Matrix3, v: &Vec3) -> Vec3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// 绕过原点的轴 `axis` 旋转向量 `v`，角度为弧度
pub fn rotate(v: &Vec3, axis: &Vec3, angle: f64) -> Result<Vec3> {
    Ok(apply(&rotation_matrix(axis, angle)?, v))
}
