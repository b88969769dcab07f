//! # 几何基础模块
//!
//! 无状态的三维向量、圆、平面与旋转运算。
//!
//! ## 子模块
//! - `vector`: 向量运算与 `GeometryPoint`
//! - `shapes`: 三点定角/定圆/定平面、投影、二维直线求交
//! - `rotation`: Euler–Rodrigues 旋转
//!
//! ## 依赖关系
//! - 被 `rowland/` 使用
//! - 仅依赖 `error.rs`

pub mod rotation;
pub mod shapes;
pub mod vector;

pub use rotation::{rotate, rotation_matrix, Matrix3};
pub use shapes::{
    angle_three_points, circle_three_points, circle_three_points_within, circular_segment_height,
    intersect_two_lines_2d, plane_three_points, plane_three_points_within,
    project_point_onto_plane, Circle, Line2, Plane,
};
pub use vector::{
    add, cross, distance, dot, norm, scale, sub, unit, unit_within, GeometryPoint, Vec3, EPSILON,
};
