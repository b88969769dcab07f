//! # 弧矢聚焦：侧分析晶体
//!
//! 多块分析晶体沿弧矢圆（半径 Rs + aL，圆心在 SD 轴上）排列时，
//! 各晶体的 χ 转角、轴向/弧矢偏移和间隙。
//!
//! 局部弧矢坐标：原点为中心晶体的转轴，弧矢偏移指向弧矢圆心，
//! 轴向偏移在面向弧矢圆心时指向右侧。角度单位 deg。
//!
//! ## 依赖关系
//! - 被 `rowland/bender.rs` 和 `commands/info.rs` 使用
//! - 使用 `rowland/core.rs` 中的 `RowlandSolution`

use crate::error::{checked_div, RowlandError, Result};
use crate::geometry::circular_segment_height;
use crate::rowland::core::RowlandSolution;

use serde::Serialize;

/// 侧分析晶体偏移：转轴处与晶体表面处 (aL = 0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideOffsets {
    /// 转轴处 χ (deg)
    pub chi: f64,
    pub axial: f64,
    pub sagittal: f64,
    /// 晶体表面处 χ (deg)
    pub chi0: f64,
    pub axial0: f64,
    pub sagittal0: f64,
}

impl RowlandSolution {
    /// 转轴所在的弧矢圆半径 Rs + aL
    pub fn pivot_radius(&self) -> f64 {
        self.sagittal_radius + self.layout.pivot_distance
    }

    /// 由转轴处的轴向偏移求 χ (deg)
    pub fn chi(&self, axial_offset: f64) -> Result<f64> {
        Ok(chi_on_radius(axial_offset, self.pivot_radius())?.to_degrees())
    }

    /// 相邻晶体相切时第 `n` 块晶体的 χ (deg)
    ///
    /// χ/2 = atan((aWext/2) / (Rs + rSext))，第 n 块为 n·χ
    pub fn chi_touching(&self, n: f64) -> Result<f64> {
        let rsp = self.sagittal_radius + self.layout.sagittal_radius_ext;
        let half = checked_div(self.layout.extended_width / 2.0, rsp, "touching analyser chi")?;
        Ok((2.0 * half.atan() * n).to_degrees())
    }

    /// 相邻晶体边缘间距（位于 Rs 处）
    ///
    /// `chi` 为第 `n` 块晶体的 χ (deg)；`n = 0` 时 `chi` 视为相邻晶体的 χ 差
    pub fn analyser_gap(&self, chi: f64, n: f64) -> f64 {
        let dchi = if n != 0.0 { chi / n } else { chi };
        let half = (dchi / 2.0).to_radians();
        2.0 * self.sagittal_radius * half.sin() - self.layout.width * half.cos()
    }

    /// 转轴处的轴向偏移：(Rs + aL)·sinχ
    pub fn pivot_axial_offset(&self, chi: f64) -> f64 {
        self.pivot_radius() * chi.to_radians().sin()
    }

    /// 晶体表面处的轴向偏移：Rs·sinχ
    pub fn surface_axial_offset(&self, chi: f64) -> f64 {
        self.sagittal_radius * chi.to_radians().sin()
    }

    /// 转轴沿直线轨迹运动时与弧矢圆的交点，返回轴向偏移
    ///
    /// 轨迹经过 (`sagittal_min`, `axial_min`)，与弧矢方向夹角 `rotation` (deg)：
    /// x = x0 − t·cosφ, y = y0 + t·sinφ, 与 (x − R')² + y² = R'² 联立取较大根。
    pub fn pivot_on_line(&self, axial_min: f64, sagittal_min: f64, rotation: f64) -> Result<f64> {
        let phi = rotation.to_radians();
        if phi == 0.0 {
            return Ok(axial_min);
        }
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (x0, y0) = (sagittal_min, axial_min);
        let r = self.pivot_radius();

        let b = -2.0 * x0 * cos_phi + 2.0 * r * cos_phi + 2.0 * y0 * sin_phi;
        let c = x0 * x0 + y0 * y0 - 2.0 * r * x0;
        let discriminant = b * b - 4.0 * c;
        if !discriminant.is_finite() || discriminant < 0.0 {
            return Err(RowlandError::MechanismOutOfReach(format!(
                "linear pivot trajectory at {:.3} deg does not meet the sagittal circle",
                rotation
            )));
        }
        let t = (-b + discriminant.sqrt()) / 2.0;
        Ok(t * sin_phi + axial_min)
    }

    /// 给定转轴处的轴向偏移，求转轴与晶体表面的 χ、轴向、弧矢偏移
    pub fn side_offsets(&self, axial_offset: f64) -> Result<SideOffsets> {
        let rs = self.sagittal_radius;
        let al = self.layout.pivot_distance;

        let rchi = chi_on_radius(axial_offset, rs + al)?;
        let axial0 = axial_offset - al * rchi.sin();
        let rchi0 = chi_on_radius(axial0, rs)?;
        let sagittal0 = circular_segment_height(2.0 * axial0.abs(), rs);
        let sagittal = sagittal0 - al * rchi.cos() + al;

        log::debug!(
            "side analyser: chi = {:.5} deg, axial = {:.5}, sagittal = {:.5} (surface: {:.5} deg, {:.5}, {:.5})",
            rchi.to_degrees(),
            axial_offset,
            sagittal,
            rchi0.to_degrees(),
            axial0,
            sagittal0
        );

        Ok(SideOffsets {
            chi: rchi.to_degrees(),
            axial: axial_offset,
            sagittal,
            chi0: rchi0.to_degrees(),
            axial0,
            sagittal0,
        })
    }
}

/// 第 `n` 块分析晶体（中心为 0）沿排列方向的中心坐标
pub fn analyser_center_x(n: i32, size: f64, gap: f64) -> f64 {
    (size + gap) * n as f64
}

/// 半径 `radius` 的弧矢圆上，轴向偏移 `axial_offset` 处的 χ (rad)
fn chi_on_radius(axial_offset: f64, radius: f64) -> Result<f64> {
    if radius <= 0.0 {
        return Err(RowlandError::division_by_zero("chi (sagittal radius is zero)"));
    }
    if !axial_offset.is_finite() || axial_offset.abs() > radius {
        return Err(RowlandError::invalid_parameter(
            "axial offset",
            axial_offset,
            format!("must not exceed the sagittal radius {:.4}", radius),
        ));
    }
    Ok(axial_offset.atan2((radius * radius - axial_offset * axial_offset).sqrt()))
}
