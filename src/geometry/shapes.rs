//! # 圆、平面与直线
//!
//! 三点定角、三点定圆、三点定平面、点到平面投影、二维直线求交。
//!
//! ## 依赖关系
//! - 被 `rowland/` 使用（测试中独立验证 Rowland 圆不变量）
//! - 使用 `geometry/vector.rs`

use crate::error::{RowlandError, Result};
use crate::geometry::vector::{add, cross, dot, norm, scale, sub, unit, unit_within, Vec3, EPSILON};

use serde::Serialize;

/// 空间中的圆
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub center: Vec3,
    pub radius: f64,
    /// 圆所在平面的单位法向量
    pub normal: Vec3,
}

/// 平面：单位法向量 + 平面上一点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Plane {
    pub normal: Vec3,
    pub point: Vec3,
}

impl Plane {
    /// 平面方程系数 (A, B, C, D)，满足 Ax + By + Cz + D = 0
    pub fn coefficients(&self) -> [f64; 4] {
        let n = self.normal;
        [n[0], n[1], n[2], -dot(&n, &self.point)]
    }

    /// 点到平面的有向距离
    pub fn signed_distance(&self, p: &Vec3) -> f64 {
        dot(&self.normal, &sub(p, &self.point))
    }
}

/// 二维直线，由两点确定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2 {
    pub p0: [f64; 2],
    pub p1: [f64; 2],
}

impl Line2 {
    pub fn new(p0: [f64; 2], p1: [f64; 2]) -> Self {
        Line2 { p0, p1 }
    }

    fn direction(&self) -> [f64; 2] {
        [self.p1[0] - self.p0[0], self.p1[1] - self.p0[1]]
    }
}

/// 以 `b` 为顶点、射线 b→a 与 b→c 的夹角（弧度，[0, π]）
pub fn angle_three_points(a: &Vec3, b: &Vec3, c: &Vec3) -> Result<f64> {
    let u = unit(&sub(a, b))?;
    let v = unit(&sub(c, b))?;
    // 舍入误差可能让余弦略超出 [-1, 1]
    Ok(dot(&u, &v).clamp(-1.0, 1.0).acos())
}

/// 过三点的唯一圆
pub fn circle_three_points(a: &Vec3, b: &Vec3, c: &Vec3) -> Result<Circle> {
    circle_three_points_within(a, b, c, EPSILON)
}

/// 过三点的唯一圆，使用自定义共线容差
pub fn circle_three_points_within(a: &Vec3, b: &Vec3, c: &Vec3, epsilon: f64) -> Result<Circle> {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let n = cross(&ab, &ac);
    let n_sq = dot(&n, &n);
    if norm(&n) <= epsilon {
        return Err(RowlandError::CollinearPoints);
    }

    // 外心：a + (|ac|²(n×ab) + |ab|²(ac×n)) / (2|n|²)
    let term1 = scale(&cross(&n, &ab), dot(&ac, &ac));
    let term2 = scale(&cross(&ac, &n), dot(&ab, &ab));
    let offset = scale(&add(&term1, &term2), 1.0 / (2.0 * n_sq));
    let center = add(a, &offset);

    Ok(Circle {
        center,
        radius: norm(&offset),
        normal: unit_within(&n, epsilon)?,
    })
}

/// 过三点的平面
pub fn plane_three_points(a: &Vec3, b: &Vec3, c: &Vec3) -> Result<Plane> {
    plane_three_points_within(a, b, c, EPSILON)
}

/// 过三点的平面，使用自定义共线容差
pub fn plane_three_points_within(a: &Vec3, b: &Vec3, c: &Vec3, epsilon: f64) -> Result<Plane> {
    let n = cross(&sub(b, a), &sub(c, a));
    if norm(&n) <= epsilon {
        return Err(RowlandError::CollinearPoints);
    }
    Ok(Plane {
        normal: unit_within(&n, epsilon)?,
        point: *a,
    })
}

/// 点到平面的正交投影
pub fn project_point_onto_plane(p: &Vec3, plane: &Plane) -> Vec3 {
    sub(p, &scale(&plane.normal, plane.signed_distance(p)))
}

/// 二维直线交点
pub fn intersect_two_lines_2d(l1: &Line2, l2: &Line2) -> Result<[f64; 2]> {
    let d1 = l1.direction();
    let d2 = l2.direction();
    let denom = d1[0] * d2[1] - d1[1] * d2[0];
    let scale_ref = (d1[0].hypot(d1[1]) * d2[0].hypot(d2[1])).max(1.0);
    if denom.abs() <= EPSILON * scale_ref {
        return Err(RowlandError::ParallelLines);
    }

    let w = [l2.p0[0] - l1.p0[0], l2.p0[1] - l1.p0[1]];
    let t = (w[0] * d2[1] - w[1] * d2[0]) / denom;
    Ok([l1.p0[0] + t * d1[0], l1.p0[1] + t * d1[1]])
}

/// 圆弓形高度：半径 `radius`、弦长 `chord`
///
/// 弦长不小于直径时返回半径（最大高度）并记录警告。
pub fn circular_segment_height(chord: f64, radius: f64) -> f64 {
    if chord >= 2.0 * radius {
        log::warn!(
            "chord {:.4} is not shorter than the diameter {:.4}, returning the radius",
            chord,
            2.0 * radius
        );
        return radius;
    }
    radius - (radius * radius - chord * chord / 4.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vector::distance;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_right_angle() {
        let angle = angle_three_points(&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0], &[0.0, 5.0, 0.0]).unwrap();
        assert_abs_diff_eq!(angle, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_straight_and_zero() {
        let o = [0.0, 0.0, 0.0];
        let straight = angle_three_points(&[1.0, 0.0, 0.0], &o, &[-2.0, 0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(straight, PI, epsilon = 1e-12);
        let zero = angle_three_points(&[1.0, 1.0, 0.0], &o, &[2.0, 2.0, 0.0]).unwrap();
        assert_abs_diff_eq!(zero, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_angle_degenerate_ray() {
        let o = [1.0, 1.0, 1.0];
        assert!(angle_three_points(&o, &o, &[0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_circle_three_points_unit_circle() {
        let circle = circle_three_points(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[-1.0, 0.0, 0.0])
            .unwrap();
        assert_abs_diff_eq!(circle.radius, 1.0, epsilon = 1e-12);
        for (c, e) in circle.center.iter().zip([0.0, 0.0, 0.0]) {
            assert_abs_diff_eq!(*c, e, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(circle.normal[2].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_circle_three_points_tilted() {
        // 圆心 (1, 2, 3)，半径 5，位于倾斜平面
        let c = [1.0, 2.0, 3.0];
        let u = [0.6, 0.0, 0.8];
        let v = [0.0, 1.0, 0.0];
        let pt = |t: f64| add(&c, &add(&scale(&u, 5.0 * t.cos()), &scale(&v, 5.0 * t.sin())));
        let circle = circle_three_points(&pt(0.3), &pt(1.7), &pt(4.0)).unwrap();
        assert_abs_diff_eq!(circle.radius, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(distance(&circle.center, &c), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_collinear() {
        let res = circle_three_points(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0]);
        assert!(matches!(res, Err(RowlandError::CollinearPoints)));
    }

    #[test]
    fn test_plane_and_projection() {
        let plane =
            plane_three_points(&[0.0, 0.0, 2.0], &[1.0, 0.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
        assert_abs_diff_eq!(plane.normal[2].abs(), 1.0, epsilon = 1e-12);

        let coeffs = plane.coefficients();
        let p = project_point_onto_plane(&[3.0, -4.0, 7.5], &plane);
        assert_abs_diff_eq!(p[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], -4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            coeffs[0] * p[0] + coeffs[1] * p[1] + coeffs[2] * p[2] + coeffs[3],
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_plane_collinear() {
        let res = plane_three_points(&[0.0, 0.0, 0.0], &[0.0, 0.0, 1.0], &[0.0, 0.0, 5.0]);
        assert!(matches!(res, Err(RowlandError::CollinearPoints)));
    }

    #[test]
    fn test_intersect_lines() {
        let l1 = Line2::new([0.0, 0.0], [1.0, 1.0]);
        let l2 = Line2::new([0.0, 2.0], [2.0, 0.0]);
        let p = intersect_two_lines_2d(&l1, &l2).unwrap();
        assert_abs_diff_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_intersect_parallel() {
        let l1 = Line2::new([0.0, 0.0], [1.0, 2.0]);
        let l2 = Line2::new([5.0, 0.0], [7.0, 4.0]);
        assert!(matches!(
            intersect_two_lines_2d(&l1, &l2),
            Err(RowlandError::ParallelLines)
        ));
    }

    #[test]
    fn test_circular_segment_height() {
        // 弦长等于半径时，h = R(1 - √3/2)
        let h = circular_segment_height(10.0, 10.0);
        assert_abs_diff_eq!(h, 10.0 * (1.0 - 3.0_f64.sqrt() / 2.0), epsilon = 1e-12);
        assert_eq!(circular_segment_height(25.0, 10.0), 10.0);
    }
}
