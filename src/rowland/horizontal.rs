//! # 水平 Rowland 圆
//!
//! 色散平面水平 (x, z)，y 竖直向上。样品 → 分析晶体沿 +x：
//! 分析晶体 = (p, 0, 0)，探测器 = (p + q·cos2θ, 0, q·sin2θ)，弧矢方向沿 y。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `scan/` 使用
//! - 使用 `rowland/frame.rs`, `rowland/core.rs`

use crate::error::Result;
use crate::geometry::Vec3;
use crate::rowland::config::RowlandConfig;
use crate::rowland::core::RowlandCircle;
use crate::rowland::frame::RowlandFrame;

use serde::Serialize;

/// 探测器平移台读数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectorStagePosition {
    /// 沿平移台主轴
    pub parallel: f64,
    /// 垂直于平移台主轴
    pub perpendicular: f64,
}

/// 水平 Rowland 圆
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RcHoriz {
    circle: RowlandCircle,
}

impl RcHoriz {
    pub fn new(circle: RowlandCircle) -> Self {
        RcHoriz { circle }
    }

    pub fn with_config(config: RowlandConfig) -> Result<Self> {
        Ok(RcHoriz::new(RowlandCircle::with_config(config)?))
    }

    pub fn circle_mut(&mut self) -> &mut RowlandCircle {
        &mut self.circle
    }

    /// 探测器在平移台坐标中的位置
    ///
    /// 平移台坐标系原点在样品处，绕弧矢轴 (y) 转过 `stage_rotation` (deg)；
    /// `offsets` 为平移台原点的 (主轴, 垂直轴) 偏移。
    pub fn detector_stage_position(
        &self,
        angle: f64,
        stage_rotation: f64,
        offsets: [f64; 2],
    ) -> Result<DetectorStagePosition> {
        let detector = self.detector_position(angle)?.point;
        let (x, z) = (detector.x, detector.z);
        let dr = x.hypot(z);
        let alpha = z.atan2(x) - stage_rotation.to_radians();
        Ok(DetectorStagePosition {
            parallel: dr * alpha.cos() - offsets[0],
            perpendicular: offsets[1] - dr * alpha.sin(),
        })
    }
}

impl RowlandFrame for RcHoriz {
    fn circle(&self) -> &RowlandCircle {
        &self.circle
    }

    fn frame_name(&self) -> &'static str {
        "horizontal"
    }

    fn from_core(&self, angle: f64, v: &Vec3) -> Result<Vec3> {
        // 绕弧矢轴转动，使样品 → 分析晶体沿 +x
        let phi = (angle + self.circle.miscut()?).to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sagittal, axial, along) = (v[0], v[1], v[2]);
        Ok([
            along * cos_phi + axial * sin_phi,
            -sagittal,
            along * sin_phi - axial * cos_phi,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowlandError;
    use crate::geometry::{circle_three_points, GeometryPoint};
    use crate::rowland::config::{AnalyserLayout, BenderParameters, BenderVersion};
    use approx::assert_abs_diff_eq;

    fn horiz(miscut: f64) -> RcHoriz {
        RcHoriz::with_config(RowlandConfig::new(500.0, 3.1356, 75.0).with_miscut(miscut)).unwrap()
    }

    #[test]
    fn test_analyzer_on_beam_axis() {
        for miscut in [0.0, 6.0] {
            let rc = horiz(miscut);
            for angle in [30.0, 55.0, 80.0] {
                let s = rc.circle().solution(angle).unwrap();
                let a = rc.analyzer_position(angle).unwrap().point;
                assert_abs_diff_eq!(a.x, s.p, epsilon = 1e-9);
                assert_abs_diff_eq!(a.y, 0.0, epsilon = 1e-9);
                assert_abs_diff_eq!(a.z, 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_detector_position() {
        for miscut in [0.0, -4.0] {
            let rc = horiz(miscut);
            let angle = 62.0;
            let s = rc.circle().solution(angle).unwrap();
            let two_theta = (2.0 * angle).to_radians();
            let d = rc.detector_position(angle).unwrap().point;
            assert_abs_diff_eq!(d.x, s.p + s.q * two_theta.cos(), epsilon = 1e-9);
            assert_abs_diff_eq!(d.y, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(d.z, s.q * two_theta.sin(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_circle_invariant_in_lab_frame() {
        let rc = horiz(3.0);
        let a = rc.analyzer_position(70.0).unwrap().point;
        let d = rc.detector_position(70.0).unwrap().point;
        let circle =
            circle_three_points(&[0.0, 0.0, 0.0], &a.to_array(), &d.to_array()).unwrap();
        assert_abs_diff_eq!(circle.radius, 500.0, epsilon = 1e-8);
        // 色散平面为水平面
        assert_abs_diff_eq!(circle.normal[1].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_side_analyzer_keeps_distances() {
        let rc = horiz(0.0);
        let angle = 70.0;
        let centre = rc.analyzer_position(angle).unwrap().point;
        let side = rc.side_analyzer_position(angle, 8.0).unwrap().point;
        let d = rc.detector_position(angle).unwrap().point;
        let o = GeometryPoint::origin();
        assert_abs_diff_eq!(side.distance(&o), centre.distance(&o), epsilon = 1e-9);
        assert_abs_diff_eq!(side.distance(&d), centre.distance(&d), epsilon = 1e-9);
        assert!(side.y.abs() > 1.0);
    }

    #[test]
    fn test_miscut_correction() {
        let rc = horiz(0.0);
        let c = rc.miscut_correction(60.0).unwrap();
        assert_abs_diff_eq!(c.shift.distance(&GeometryPoint::origin()), 0.0, epsilon = 1e-12);

        let rc = horiz(5.0);
        let c = rc.miscut_correction(60.0).unwrap();
        let len = (c.axial.powi(2) + c.sagittal.powi(2)).sqrt();
        assert_abs_diff_eq!(c.shift.distance(&GeometryPoint::origin()), len, epsilon = 1e-9);
        assert_abs_diff_eq!(c.shift.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_detector_stage_position() {
        let rc = horiz(0.0);
        let angle = 60.0;
        let d = rc.detector_position(angle).unwrap().point;
        let dr = d.x.hypot(d.z);

        // 平移台主轴指向探测器时，垂直分量为 0
        let along = d.z.atan2(d.x).to_degrees();
        let stage = rc.detector_stage_position(angle, along, [0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(stage.parallel, dr, epsilon = 1e-9);
        assert_abs_diff_eq!(stage.perpendicular, 0.0, epsilon = 1e-9);

        let stage = rc.detector_stage_position(angle, along, [10.0, 2.0]).unwrap();
        assert_abs_diff_eq!(stage.parallel, dr - 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stage.perpendicular, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bender_anchor_in_sagittal_plane() {
        let config = RowlandConfig::new(500.0, 3.1356, 75.0)
            .with_analyser(AnalyserLayout {
                width: 25.0,
                extended_width: 27.0,
                sagittal_radius_ext: 0.0,
                pivot_distance: 60.0,
            })
            .with_bender(BenderParameters {
                version: BenderVersion::Prototype,
                arm0: 40.0,
                arm1: 60.0,
                third: 90.0,
                actuator_axial: 250.0,
                actuator_arm: 150.0,
                ..Default::default()
            });
        let rc = RcHoriz::with_config(config).unwrap();
        let pos = rc.bender_motor_position(75.0).unwrap();
        // 轴向偏移沿弧矢方向 (y)
        assert_abs_diff_eq!(pos.anchor.y, -pos.anchor_axial_offset, epsilon = 1e-9);
    }

    #[test]
    fn test_unconfigured_variant() {
        let rc = RcHoriz::default();
        assert!(matches!(
            rc.analyzer_position(60.0),
            Err(RowlandError::NotConfigured)
        ));
    }
}
