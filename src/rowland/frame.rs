//! # 坐标系变体的公共接口
//!
//! 水平与垂直两种 Rowland 圆都通过组合持有一个 `RowlandCircle`，
//! 只需给出核心坐标到实验室坐标的线性映射，其余操作由默认实现完成。
//!
//! ## 依赖关系
//! - 被 `rowland/horizontal.rs`, `rowland/vertical.rs`, `scan/` 使用
//! - 使用 `rowland/core.rs`, `rowland/bender.rs`, `geometry/rotation.rs`

use crate::error::Result;
use crate::geometry::{rotate, GeometryPoint, Vec3};
use crate::rowland::bender::BenderMotorPosition;
use crate::rowland::core::{AnalyzerPosition, DetectorPosition, RowlandCircle, RowlandInfo};

use serde::Serialize;

/// 斜切角引起的分析晶体偏移
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiscutCorrection {
    /// 轴向分量 Rs(α) − Rs(0)
    pub axial: f64,
    /// 弧矢分量（沿 SD 轴）
    pub sagittal: f64,
    /// 所在坐标系中的位移向量
    pub shift: GeometryPoint,
}

/// Rowland 圆在某一实验室坐标系中的表示
pub trait RowlandFrame {
    /// 内部的 Rowland 圆核心
    fn circle(&self) -> &RowlandCircle;

    /// 坐标系名称
    fn frame_name(&self) -> &'static str;

    /// 核心坐标 → 本坐标系；映射为线性，点与位移向量通用
    fn from_core(&self, angle: f64, v: &Vec3) -> Result<Vec3>;

    fn map_point(&self, angle: f64, p: GeometryPoint) -> Result<GeometryPoint> {
        Ok(GeometryPoint::from(self.from_core(angle, &p.to_array())?))
    }

    fn analyzer_position(&self, angle: f64) -> Result<AnalyzerPosition> {
        let core = self.circle().analyzer_position(angle)?;
        Ok(AnalyzerPosition {
            point: self.map_point(angle, core.point)?,
            ..core
        })
    }

    fn detector_position(&self, angle: f64) -> Result<DetectorPosition> {
        let core = self.circle().detector_position(angle)?;
        Ok(DetectorPosition {
            point: self.map_point(angle, core.point)?,
            ..core
        })
    }

    /// 绕 SD 轴转过 `chi` (deg) 的侧分析晶体中心
    fn side_analyzer_position(&self, angle: f64, chi: f64) -> Result<AnalyzerPosition> {
        let core = self.circle().analyzer_position(angle)?;
        let rotated = rotate(&core.point.to_array(), &[0.0, 0.0, 1.0], chi.to_radians())?;
        Ok(AnalyzerPosition {
            point: GeometryPoint::from(self.from_core(angle, &rotated)?),
            ..core
        })
    }

    fn miscut_correction(&self, angle: f64) -> Result<MiscutCorrection> {
        let (axial, sagittal) = self.circle().miscut_shift(angle)?;
        let shift = self.from_core(angle, &[0.0, axial, sagittal])?;
        Ok(MiscutCorrection {
            axial,
            sagittal,
            shift: GeometryPoint::from(shift),
        })
    }

    fn bender_motor_position(&self, angle: f64) -> Result<BenderMotorPosition> {
        let core = self.circle().bender_motor_position(angle)?;
        Ok(BenderMotorPosition {
            anchor: self.map_point(angle, core.anchor)?,
            ..core
        })
    }

    /// 单个扫描点的汇总记录（本坐标系）
    fn info(&self, angle: f64) -> Result<RowlandInfo> {
        let core = self.circle().info(angle)?;
        Ok(RowlandInfo {
            analyzer: self.map_point(angle, core.analyzer)?,
            detector: self.map_point(angle, core.detector)?,
            ..core
        })
    }
}
