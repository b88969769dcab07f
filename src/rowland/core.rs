//! # Rowland 圆核心
//!
//! 状态机（未配置 / 已配置）+ Bragg 角 → 几何位置映射。
//!
//! 核心坐标系：样品位于原点，Z 沿样品-探测器 (SD) 轴，Y 为到 SD 轴的距离，
//! X 为弧矢方向（垂直于色散平面）。
//!
//! ## 依赖关系
//! - 被 `rowland/horizontal.rs`, `rowland/vertical.rs`, `scan/` 使用
//! - 使用 `bragg/`, `geometry/vector.rs`, `rowland/config.rs`

use crate::bragg;
use crate::error::{checked_div, RowlandError, Result};
use crate::geometry::{GeometryPoint, Vec3};
use crate::rowland::config::{AnalyserLayout, RowlandConfig};

use serde::Serialize;

/// 小于此值的能量差 (eV) 视为 0
pub const ENERGY_DELTA_ZERO: f64 = 1e-4;
/// 小于此值的高度差 (mm) 视为 0
pub const HEIGHT_DELTA_ZERO: f64 = 1e-4;

/// 分析晶体中心位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalyzerPosition {
    pub point: GeometryPoint,
    /// Bragg 角 (deg)
    pub bragg_angle: f64,
    /// 能量 (eV)
    pub energy: f64,
}

/// 探测器中心位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectorPosition {
    pub point: GeometryPoint,
    pub bragg_angle: f64,
    pub energy: f64,
}

/// 某一 Bragg 角下的派生几何量
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowlandSolution {
    /// Bragg 角 (deg)
    pub bragg_angle: f64,
    /// 斜切角 (deg)
    pub miscut: f64,
    /// Rowland 圆半径 (mm)
    pub radius: f64,
    /// 样品-分析晶体距离 p
    pub p: f64,
    /// 分析晶体-探测器距离 q
    pub q: f64,
    /// 样品-探测器距离
    pub sample_detector: f64,
    /// 弧矢聚焦半径 Rs
    pub sagittal_radius: f64,
    /// 核心坐标系中的圆心
    pub center: GeometryPoint,
    /// 核心坐标系中的分析晶体
    pub analyzer: GeometryPoint,
    /// 核心坐标系中的探测器
    pub detector: GeometryPoint,
    pub layout: AnalyserLayout,
}

impl RowlandSolution {
    /// 分析晶体表面外法线（指向远离 Rowland 圆心的方向），核心坐标
    pub fn outward_normal(&self) -> Vec3 {
        let two_alpha = 2.0 * self.miscut.to_radians();
        [0.0, two_alpha.cos(), -two_alpha.sin()]
    }
}

/// 扫描记录
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowlandInfo {
    pub bragg_angle: f64,
    pub energy: f64,
    pub axial_offset: f64,
    pub sagittal_offset: f64,
    pub analyzer: GeometryPoint,
    pub detector: GeometryPoint,
    pub p: f64,
    pub q: f64,
    pub sample_detector: f64,
    pub sagittal_radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Configured {
    config: RowlandConfig,
    reference_energy: f64,
}

impl Configured {
    /// 参考角本身必须是可计算位置的角度
    fn new(config: RowlandConfig) -> Result<Self> {
        config.validate_static()?;
        check_bragg_angle(config.reference_angle, config.miscut)?;
        let reference_energy =
            bragg::bragg_angle_to_energy(config.reference_angle, config.d_spacing)?;
        Ok(Configured {
            config,
            reference_energy,
        })
    }
}

/// Rowland 圆
///
/// `RowlandCircle::new()` 处于未配置状态，所有查询返回 `NotConfigured`。
/// 修改操作在副本上校验，成功后整体提交，失败时保持原状态。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowlandCircle {
    state: Option<Configured>,
}

impl RowlandCircle {
    /// 未配置的 Rowland 圆
    pub fn new() -> Self {
        RowlandCircle { state: None }
    }

    pub fn with_config(config: RowlandConfig) -> Result<Self> {
        let mut circle = RowlandCircle::new();
        circle.configure(config)?;
        Ok(circle)
    }

    /// 应用配置；失败时保持原状态
    pub fn configure(&mut self, config: RowlandConfig) -> Result<()> {
        let state = Configured::new(config)?;
        log::debug!(
            "Rowland circle configured: Rm = {:.3} mm, d = {:.5} A, theta0 = {:.4} deg, E0 = {:.2} eV",
            state.config.radius,
            state.config.d_spacing,
            state.config.reference_angle,
            state.reference_energy
        );
        self.state = Some(state);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    fn state(&self) -> Result<&Configured> {
        self.state.as_ref().ok_or(RowlandError::NotConfigured)
    }

    pub fn config(&self) -> Result<&RowlandConfig> {
        Ok(&self.state()?.config)
    }

    pub fn radius(&self) -> Result<f64> {
        Ok(self.config()?.radius)
    }

    pub fn d_spacing(&self) -> Result<f64> {
        Ok(self.config()?.d_spacing)
    }

    pub fn miscut(&self) -> Result<f64> {
        Ok(self.config()?.miscut)
    }

    /// 参考 Bragg 角 (deg)
    pub fn reference_angle(&self) -> Result<f64> {
        Ok(self.config()?.reference_angle)
    }

    /// 参考能量 (eV)，始终与参考角满足 Bragg 定律
    pub fn reference_energy(&self) -> Result<f64> {
        Ok(self.state()?.reference_energy)
    }

    // ─────────────────────────────────────────────────────────────
    // 修改操作
    // ─────────────────────────────────────────────────────────────

    fn update(&mut self, apply: impl FnOnce(&mut RowlandConfig) -> Result<()>) -> Result<()> {
        let mut config = self.state()?.config.clone();
        apply(&mut config)?;
        let next = Configured::new(config)?;
        self.state = Some(next);
        Ok(())
    }

    /// 修改晶面间距：参考角保持不变，重新计算参考能量
    pub fn set_d_spacing(&mut self, d_spacing: f64) -> Result<()> {
        self.update(|c| {
            c.d_spacing = d_spacing;
            Ok(())
        })
    }

    /// 修改参考能量 (eV)：重新计算参考角
    pub fn set_reference_energy(&mut self, energy: f64) -> Result<()> {
        self.update(|c| {
            c.reference_angle = bragg::energy_to_bragg_angle(energy, c.d_spacing)?;
            Ok(())
        })
    }

    /// 修改参考角 (deg)：重新计算参考能量
    pub fn set_reference_angle(&mut self, angle: f64) -> Result<()> {
        self.update(|c| {
            c.reference_angle = angle;
            Ok(())
        })
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.update(|c| {
            c.radius = radius;
            Ok(())
        })
    }

    pub fn set_miscut(&mut self, miscut: f64) -> Result<()> {
        self.update(|c| {
            c.miscut = miscut;
            Ok(())
        })
    }

    pub fn set_zero_offsets(&mut self, axial_offset0: f64, sagittal_offset0: f64) -> Result<()> {
        self.update(|c| {
            c.axial_offset0 = axial_offset0;
            c.sagittal_offset0 = sagittal_offset0;
            Ok(())
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Bragg 换算
    // ─────────────────────────────────────────────────────────────

    pub fn bragg_angle_for_energy(&self, energy: f64) -> Result<f64> {
        bragg::energy_to_bragg_angle(energy, self.d_spacing()?)
    }

    pub fn energy_for_bragg_angle(&self, angle: f64) -> Result<f64> {
        bragg::bragg_angle_to_energy(angle, self.d_spacing()?)
    }

    // ─────────────────────────────────────────────────────────────
    // 偏移量（闭式，任意有限角度）
    // ─────────────────────────────────────────────────────────────

    /// 轴向偏移：分析晶体到 SD 轴的距离减去零点
    ///
    /// Rs(θ) = 2Rm·sin(θ−α)·sin(θ+α)
    ///
    /// 该距离即分析晶体的 Y 坐标，斜切使分析晶体沿圆移动，所以随 α 变化。
    /// α = 0 时退化为 2Rm·sin²θ。
    pub fn axial_offset(&self, angle: f64) -> Result<f64> {
        let config = self.config()?;
        finite_angle(angle)?;
        Ok(sagittal_radius(config.radius, angle, config.miscut) - config.axial_offset0)
    }

    /// 弧矢偏移：分析晶体沿 SD 轴的坐标减去零点
    ///
    /// 2Rm·sin(θ−α)·cos(θ+α) = Rm·(sin2θ − sin2α)
    pub fn sagittal_offset(&self, angle: f64) -> Result<f64> {
        let config = self.config()?;
        finite_angle(angle)?;
        Ok(along_axis(config.radius, angle, config.miscut) - config.sagittal_offset0)
    }

    // ─────────────────────────────────────────────────────────────
    // 位置
    // ─────────────────────────────────────────────────────────────

    /// 给定 Bragg 角 (deg) 的完整几何解
    pub fn solution(&self, angle: f64) -> Result<RowlandSolution> {
        let config = self.config()?;
        check_bragg_angle(angle, config.miscut)?;

        let rm = config.radius;
        let th = angle.to_radians();
        let al = config.miscut.to_radians();

        let p = 2.0 * rm * (th - al).sin();
        let q = 2.0 * rm * (th + al).sin();
        let sample_detector = 2.0 * rm * (2.0 * th).sin();
        let rs = sagittal_radius(rm, angle, config.miscut);

        let solution = RowlandSolution {
            bragg_angle: angle,
            miscut: config.miscut,
            radius: rm,
            p,
            q,
            sample_detector,
            sagittal_radius: rs,
            center: GeometryPoint::new(0.0, -rm * (2.0 * th).cos(), rm * (2.0 * th).sin()),
            analyzer: GeometryPoint::new(0.0, rs, along_axis(rm, angle, config.miscut)),
            detector: GeometryPoint::new(0.0, 0.0, sample_detector),
            layout: config.analyser,
        };
        log::trace!(
            "theta = {:.4} deg: p = {:.4}, q = {:.4}, sd = {:.4}, Rs = {:.4}",
            angle,
            p,
            q,
            sample_detector,
            rs
        );
        Ok(solution)
    }

    /// 参考角处的几何解
    pub fn reference_solution(&self) -> Result<RowlandSolution> {
        self.solution(self.reference_angle()?)
    }

    /// 核心坐标系中的分析晶体位置
    pub fn analyzer_position(&self, angle: f64) -> Result<AnalyzerPosition> {
        let solution = self.solution(angle)?;
        Ok(AnalyzerPosition {
            point: solution.analyzer,
            bragg_angle: angle,
            energy: self.energy_for_bragg_angle(angle)?,
        })
    }

    /// 核心坐标系中的探测器位置
    pub fn detector_position(&self, angle: f64) -> Result<DetectorPosition> {
        let solution = self.solution(angle)?;
        Ok(DetectorPosition {
            point: solution.detector,
            bragg_angle: angle,
            energy: self.energy_for_bragg_angle(angle)?,
        })
    }

    /// 单个扫描点的汇总记录（核心坐标系）
    pub fn info(&self, angle: f64) -> Result<RowlandInfo> {
        let solution = self.solution(angle)?;
        Ok(RowlandInfo {
            bragg_angle: angle,
            energy: self.energy_for_bragg_angle(angle)?,
            axial_offset: self.axial_offset(angle)?,
            sagittal_offset: self.sagittal_offset(angle)?,
            analyzer: solution.analyzer,
            detector: solution.detector,
            p: solution.p,
            q: solution.q,
            sample_detector: solution.sample_detector,
            sagittal_radius: solution.sagittal_radius,
        })
    }

    /// 斜切角引起的分析晶体偏移（核心坐标），返回 (Δ轴向, Δ弧矢)
    ///
    /// Δaxial = Rs(α) − Rs(0) = −Rm(1 − cos2α)，Δsagittal = −Rm·sin2α
    pub fn miscut_shift(&self, angle: f64) -> Result<(f64, f64)> {
        let config = self.config()?;
        check_bragg_angle(angle, config.miscut)?;
        let rm = config.radius;
        let axial = sagittal_radius(rm, angle, config.miscut) - sagittal_radius(rm, angle, 0.0);
        let sagittal = along_axis(rm, angle, config.miscut) - along_axis(rm, angle, 0.0);
        Ok((axial, sagittal))
    }

    // ─────────────────────────────────────────────────────────────
    // 参考角附近的能量跟踪
    // ─────────────────────────────────────────────────────────────

    /// 能量偏移 ΔE (eV) 对应的角度变化 (rad)
    pub fn delta_theta(&self, e_delta: f64) -> Result<f64> {
        let state = self.state()?;
        if e_delta.abs() <= ENERGY_DELTA_ZERO {
            return Ok(0.0);
        }
        bragg::delta_theta(e_delta, state.reference_energy, state.config.reference_angle)
    }

    /// 能量偏移对应的分析晶体高度偏移：2Rm·sinθ0·tanΔθ
    pub fn analyser_height_offset(&self, e_delta: f64) -> Result<f64> {
        let config = self.config()?;
        let dth = self.delta_theta(e_delta)?;
        Ok(2.0 * config.radius * config.reference_angle.to_radians().sin() * dth.tan())
    }

    /// 能量偏移对应的分析晶体深度偏移：2Rm·tanθ0·tanΔθ
    pub fn analyser_depth_offset(&self, e_delta: f64) -> Result<f64> {
        let config = self.config()?;
        let dth = self.delta_theta(e_delta)?;
        Ok(2.0 * config.radius * config.reference_angle.to_radians().tan() * dth.tan())
    }

    /// 分析晶体高度偏移 Δz (mm) 对应的能量偏移 (eV)
    ///
    /// 符号约定与 `analyser_height_offset` 一致：Δz > 0 使 θ 增大，能量降低，
    /// 返回值为负。两者互为反函数。
    pub fn energy_offset(&self, dz: f64) -> Result<f64> {
        let state = self.state()?;
        if dz.abs() <= HEIGHT_DELTA_ZERO {
            return Ok(0.0);
        }
        let th0 = state.config.reference_angle.to_radians();
        let dth = checked_div(dz, 2.0 * state.config.radius * th0.sin(), "energy offset")?.atan();
        Ok(-checked_div(state.reference_energy * dth, th0.tan(), "energy offset")?)
    }
}

/// 2Rm·sin(θ−α)·sin(θ+α)
pub(crate) fn sagittal_radius(radius: f64, angle: f64, miscut: f64) -> f64 {
    let th = angle.to_radians();
    let al = miscut.to_radians();
    2.0 * radius * (th - al).sin() * (th + al).sin()
}

/// 2Rm·sin(θ−α)·cos(θ+α)
fn along_axis(radius: f64, angle: f64, miscut: f64) -> f64 {
    let th = angle.to_radians();
    let al = miscut.to_radians();
    2.0 * radius * (th - al).sin() * (th + al).cos()
}

fn finite_angle(angle: f64) -> Result<()> {
    if angle.is_finite() {
        Ok(())
    } else {
        Err(RowlandError::invalid_parameter("bragg angle", angle, "angle must be finite"))
    }
}

/// 位置计算要求 θ ∈ (0, 90) 且 θ − α ∈ (0, 90)
fn check_bragg_angle(angle: f64, miscut: f64) -> Result<()> {
    finite_angle(angle)?;
    if angle <= 0.0 || angle >= 90.0 {
        return Err(RowlandError::out_of_range(
            format!("Bragg angle {} deg", angle),
            "positions require 0 < theta < 90 deg",
        ));
    }
    let grazing = angle - miscut;
    if grazing <= 0.0 || grazing >= 90.0 {
        return Err(RowlandError::out_of_range(
            format!("Bragg angle {} deg", angle),
            format!(
                "theta - miscut = {} deg must lie in (0, 90) deg",
                grazing
            ),
        ));
    }
    Ok(())
}
