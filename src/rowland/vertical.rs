//! # 垂直 Rowland 圆
//!
//! 色散平面竖直 (x, y)，y 竖直向上。样品-探测器轴沿 +x：
//! 分析晶体 = (弧矢偏移, 轴向偏移, 0)，探测器 = (sd, 0, 0)，弧矢方向沿 z。
//! 可选将坐标系绕 z 轴旋转，使样品 → 分析晶体光路水平。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `scan/` 使用
//! - 使用 `rowland/frame.rs`, `rowland/core.rs`, `geometry/rotation.rs`

use crate::error::Result;
use crate::geometry::{add, rotate, scale, GeometryPoint, Vec3};
use crate::rowland::config::RowlandConfig;
use crate::rowland::core::RowlandCircle;
use crate::rowland::frame::RowlandFrame;

use serde::Serialize;

/// 分析晶体、探测器与转轴位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerticalPosition {
    pub bragg_angle: f64,
    pub analyzer: GeometryPoint,
    pub detector: GeometryPoint,
    /// 分析晶体转轴：沿表面外法线距晶体中心 aL
    pub pivot: GeometryPoint,
    /// 转轴高度（y 坐标）
    pub pivot_height: f64,
}

/// 垂直 Rowland 圆
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RcVert {
    circle: RowlandCircle,
    rotate_to_horizontal: bool,
}

impl RcVert {
    pub fn new(circle: RowlandCircle) -> Self {
        RcVert {
            circle,
            rotate_to_horizontal: false,
        }
    }

    pub fn with_config(config: RowlandConfig) -> Result<Self> {
        Ok(RcVert::new(RowlandCircle::with_config(config)?))
    }

    /// 旋转坐标系，使样品 → 分析晶体光路沿 +x
    pub fn rotated_to_horizontal(mut self, rotate: bool) -> Self {
        self.rotate_to_horizontal = rotate;
        self
    }

    pub fn rotates_to_horizontal(&self) -> bool {
        self.rotate_to_horizontal
    }

    pub fn circle_mut(&mut self) -> &mut RowlandCircle {
        &mut self.circle
    }

    /// 分析晶体、探测器与转轴的完整位置
    pub fn position(&self, angle: f64) -> Result<VerticalPosition> {
        let solution = self.circle.solution(angle)?;
        let pivot_core = add(
            &solution.analyzer.to_array(),
            &scale(&solution.outward_normal(), solution.layout.pivot_distance),
        );
        let pivot = GeometryPoint::from(self.from_core(angle, &pivot_core)?);

        Ok(VerticalPosition {
            bragg_angle: angle,
            analyzer: self.map_point(angle, solution.analyzer)?,
            detector: self.map_point(angle, solution.detector)?,
            pivot,
            pivot_height: pivot.y,
        })
    }
}

impl RowlandFrame for RcVert {
    fn circle(&self) -> &RowlandCircle {
        &self.circle
    }

    fn frame_name(&self) -> &'static str {
        if self.rotate_to_horizontal {
            "vertical (rotated)"
        } else {
            "vertical"
        }
    }

    fn from_core(&self, angle: f64, v: &Vec3) -> Result<Vec3> {
        let (sagittal, axial, along) = (v[0], v[1], v[2]);
        let lab = [along, axial, -sagittal];
        if !self.rotate_to_horizontal {
            return Ok(lab);
        }
        let phi = (angle + self.circle.miscut()?).to_radians();
        rotate(&lab, &[0.0, 0.0, 1.0], -phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowland::config::AnalyserLayout;
    use approx::assert_abs_diff_eq;

    fn vert(miscut: f64, pivot_distance: f64) -> RcVert {
        let config = RowlandConfig::new(500.0, 3.1356, 75.0)
            .with_miscut(miscut)
            .with_analyser(AnalyserLayout {
                pivot_distance,
                ..Default::default()
            });
        RcVert::with_config(config).unwrap()
    }

    #[test]
    fn test_positions_match_offsets() {
        let rc = vert(0.0, 0.0);
        let angle = 65.0;
        let a = rc.analyzer_position(angle).unwrap().point;
        assert_abs_diff_eq!(a.x, rc.circle().sagittal_offset(angle).unwrap(), epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, rc.circle().axial_offset(angle).unwrap(), epsilon = 1e-9);
        assert_abs_diff_eq!(a.z, 0.0, epsilon = 1e-12);

        let d = rc.detector_position(angle).unwrap().point;
        let sd = 1000.0 * (2.0 * angle).to_radians().sin();
        assert_abs_diff_eq!(d.x, sd, epsilon = 1e-9);
        assert_abs_diff_eq!(d.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pivot_height() {
        let rc = vert(0.0, 60.0);
        let pos = rc.position(70.0).unwrap();
        assert_abs_diff_eq!(pos.pivot_height, pos.analyzer.y + 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.pivot.x, pos.analyzer.x, epsilon = 1e-9);

        let rc = vert(4.0, 60.0);
        let pos = rc.position(70.0).unwrap();
        let expected = pos.analyzer.y + 60.0 * 8.0_f64.to_radians().cos();
        assert_abs_diff_eq!(pos.pivot_height, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.pivot.distance(&pos.analyzer), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_to_horizontal() {
        for miscut in [0.0, 3.0] {
            let rc = vert(miscut, 0.0).rotated_to_horizontal(true);
            assert!(rc.rotates_to_horizontal());
            let angle = 55.0;
            let s = rc.circle().solution(angle).unwrap();
            let a = rc.analyzer_position(angle).unwrap().point;
            assert_abs_diff_eq!(a.x, s.p, epsilon = 1e-9);
            assert_abs_diff_eq!(a.y, 0.0, epsilon = 1e-9);
            let d = rc.detector_position(angle).unwrap().point;
            assert_abs_diff_eq!(
                d.distance(&GeometryPoint::origin()),
                s.sample_detector,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(d.distance(&a), s.q, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_miscut_correction_in_dispersion_plane() {
        let rc = vert(5.0, 0.0);
        let c = rc.miscut_correction(60.0).unwrap();
        assert_abs_diff_eq!(c.shift.x, c.sagittal, epsilon = 1e-12);
        assert_abs_diff_eq!(c.shift.y, c.axial, epsilon = 1e-12);
        assert_abs_diff_eq!(c.shift.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_side_analyzer_leaves_plane() {
        let rc = vert(0.0, 0.0);
        let side = rc.side_analyzer_position(75.0, 5.0).unwrap().point;
        let centre = rc.analyzer_position(75.0).unwrap().point;
        assert_abs_diff_eq!(side.x, centre.x, epsilon = 1e-9);
        assert!(side.z.abs() > 1.0);
    }
}
