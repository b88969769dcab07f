//! # 弯晶器机构
//!
//! 最外侧分析晶体的弯晶器锚点 B（局部弧矢坐标）和作动器行程。
//! 两种机构：原型机（两臂夹角固定）与 2017 年缩放仪版本。
//!
//! ## 依赖关系
//! - 被 `rowland/core.rs`（`bender_motor_position`）使用
//! - 使用 `rowland/sagittal.rs`

use crate::error::{checked_div, checked_unit_interval, RowlandError, Result};
use crate::geometry::{add, scale, GeometryPoint};
use crate::rowland::config::{BenderParameters, BenderVersion};
use crate::rowland::core::{RowlandCircle, RowlandSolution};

use serde::Serialize;
use std::f64::consts::PI;

/// 弯晶器作动器空间的量（不是 Rowland 圆上的点）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenderMotorPosition {
    pub bragg_angle: f64,
    /// 弯晶器连接的分析晶体序号
    pub analyser_index: u32,
    /// 锚点 B 的轴向偏移（已按转轴侧取符号）
    pub anchor_axial_offset: f64,
    /// 锚点 B 的弧矢偏移
    pub anchor_sagittal_offset: f64,
    /// 作动器行程
    pub motor_travel: f64,
    /// 锚点 B 在所在坐标系中的位置
    pub anchor: GeometryPoint,
}

fn out_of_reach(what: &str, value: f64) -> impl FnOnce() -> RowlandError + '_ {
    move || {
        RowlandError::MechanismOutOfReach(format!(
            "{} requires asin/acos of {:.6}",
            what, value
        ))
    }
}

fn acos_checked(value: f64, what: &str) -> Result<f64> {
    Ok(checked_unit_interval(value, out_of_reach(what, value))?.acos())
}

fn asin_checked(value: f64, what: &str) -> Result<f64> {
    Ok(checked_unit_interval(value, out_of_reach(what, value))?.asin())
}

impl RowlandSolution {
    /// 第 `n` 块分析晶体（n ≥ 3）上弯晶器锚点 B 的 (轴向, 弧矢) 偏移
    ///
    /// 结果位于右侧局部坐标；转轴侧的镜像由调用方处理。
    ///
    /// 原型弯晶器的弧矢分量以最后一个转轴的弧矢偏移为基点（而非其轴向偏移），
    /// 因此锚点到该转轴的距离恰为 arm0。
    pub fn bender_anchor(&self, n: u32, bender: &BenderParameters) -> Result<(f64, f64)> {
        if n < 3 {
            return Err(RowlandError::invalid_parameter(
                "analyser index",
                n as f64,
                "bender anchor needs the analyser index n >= 3",
            ));
        }
        if bender.arm0 == 0.0 || bender.arm1 == 0.0 {
            return Err(RowlandError::division_by_zero("bender arm length"));
        }

        let n = n as f64;
        let chis = [
            self.chi_touching(n - 2.0)?,
            self.chi_touching(n - 1.0)?,
            self.chi_touching(n)?,
        ];
        let dchi = chis[2] - chis[0];
        let last = self.side_offsets(self.pivot_axial_offset(chis[2]))?;

        // 最后两块晶体转轴之间的弦
        let rp = self.pivot_radius();
        let half_dchi = (dchi / 2.0).to_radians();
        let h = rp * (1.0 - half_dchi.cos());
        let chord_half = rp * half_dchi.sin();
        let ra = acos_checked(
            checked_div(chord_half, bender.arm1, "bender arm1")?,
            "bender arm1 angle",
        )?;
        // 缩放仪沿半径方向的张开量
        let dc = bender.arm1 * ra.sin() - h;

        let anchor = match bender.version {
            BenderVersion::Prototype => {
                let sc = (self.pivot_radius() + dc) * chis[1].to_radians().sin();
                let rb = acos_checked(
                    checked_div(last.axial - sc, bender.arm1, "bender arm1")?,
                    "prototype arm angle",
                )?;
                let rc = PI - bender.third.to_radians() - rb;
                (
                    last.axial + bender.arm0 * rc.cos(),
                    last.sagittal - bender.arm0 * rc.sin(),
                )
            }
            BenderVersion::Pantograph2017 => {
                let adc = asin_checked(
                    checked_div(dc / 2.0, bender.arm0, "bender arm0")?,
                    "pantograph aperture",
                )?;
                let pdc = bender.arm0 * adc.cos();
                let pb_ang = checked_div(pdc, rp + dc / 2.0, "pantograph anchor angle")?.atan();
                let pb_h = rp * (1.0 - pb_ang.cos());
                let pb_chord_half = rp * pb_ang.sin();
                let pb_ra = acos_checked(
                    checked_div(pb_chord_half, bender.arm0, "bender arm0")?,
                    "pantograph anchor chord",
                )?;
                let pb_dc = bender.arm0 * pb_ra.sin() - pb_h;
                let pb_chi = pb_ang + chis[2].to_radians();
                let pb_rs = rp + pb_dc;
                (pb_rs * pb_chi.sin(), rp - pb_rs * pb_chi.cos())
            }
        };

        log::debug!(
            "bender anchor ({}): axial = {:.5}, sagittal = {:.5}, dchi = {:.5} deg",
            bender.version,
            anchor.0,
            anchor.1,
            dchi
        );
        Ok(anchor)
    }

    /// 锚点 (轴向, 弧矢) 对应的作动器行程
    pub fn bender_motor_travel(&self, anchor: (f64, f64), bender: &BenderParameters) -> Result<f64> {
        let reach = match bender.version {
            BenderVersion::Prototype => bender.actuator_axial - anchor.0,
            BenderVersion::Pantograph2017 => bender.actuator_axial - bender.third - anchor.0,
        };
        let rd = asin_checked(
            checked_div(reach, bender.actuator_arm, "actuator arm")?,
            "actuator angle",
        )?;
        Ok(bender.actuator_arm * rd.cos() + anchor.1)
    }
}

impl RowlandCircle {
    /// 核心坐标系中的弯晶器锚点与作动器行程
    pub fn bender_motor_position(&self, angle: f64) -> Result<BenderMotorPosition> {
        let bender = self.config()?.bender;
        let solution = self.solution(angle)?;

        let anchor = solution.bender_anchor(bender.analyser_index, &bender)?;
        let motor_travel = solution.bender_motor_travel(anchor, &bender)?;
        let axial = bender.pivot_side.sign() * anchor.0;

        // 局部坐标 → 核心坐标：原点为中心转轴，弧矢方向指向 Rowland 圆内侧
        let outward = solution.outward_normal();
        let pivot = add(
            &solution.analyzer.to_array(),
            &scale(&outward, solution.layout.pivot_distance),
        );
        let point = add(
            &add(&pivot, &scale(&[1.0, 0.0, 0.0], axial)),
            &scale(&outward, -anchor.1),
        );

        Ok(BenderMotorPosition {
            bragg_angle: angle,
            analyser_index: bender.analyser_index,
            anchor_axial_offset: axial,
            anchor_sagittal_offset: anchor.1,
            motor_travel,
            anchor: GeometryPoint::from(point),
        })
    }
}
