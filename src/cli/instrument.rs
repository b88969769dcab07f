//! # 谱仪参数 CLI 定义
//!
//! `info` 与 `scan` 共用的 Rowland 圆、分析晶体排布和弯晶器参数。
//!
//! ## 依赖关系
//! - 被 `cli/info.rs`, `cli/scan.rs` 使用
//! - 由 `commands/instrument.rs` 转换为 `RowlandConfig`

use clap::{Args, ValueEnum};

/// 实验室坐标系
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Frame {
    /// Horizontal dispersion plane, beam along x
    Horizontal,
    /// Vertical dispersion plane, sample-detector axis along x
    Vertical,
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::Horizontal => write!(f, "horizontal"),
            Frame::Vertical => write!(f, "vertical"),
        }
    }
}

/// 谱仪参数
#[derive(Args, Debug, Clone)]
pub struct InstrumentArgs {
    /// Rowland circle radius Rm in mm (crystal bending radius is 2*Rm)
    #[arg(long, default_value_t = 500.0)]
    pub radius: f64,

    /// Crystal d-spacing in Å
    #[arg(long, required_unless_present = "reflection", conflicts_with = "reflection")]
    pub dspacing: Option<f64>,

    /// Analyser reflection, e.g. 'Si(111)', 'Ge(440)', 'SiO2(100)'
    #[arg(long)]
    pub reflection: Option<String>,

    /// Reference Bragg angle in degrees
    #[arg(long, required_unless_present = "energy0", conflicts_with = "energy0")]
    pub theta0: Option<f64>,

    /// Reference energy in eV (the Bragg angle is computed from it)
    #[arg(long)]
    pub energy0: Option<f64>,

    /// Miscut angle in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub miscut: f64,

    /// Zero reference of the axial offset in mm
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub axial_offset0: f64,

    /// Zero reference of the sagittal offset in mm
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub sagittal_offset0: f64,

    /// Analyser optical width in mm
    #[arg(long, default_value_t = 0.0)]
    pub analyser_width: f64,

    /// Analyser extended width in mm (touching condition of neighbours)
    #[arg(long, default_value_t = 0.0)]
    pub analyser_width_ext: f64,

    /// Sagittal radius offset at which the extended width applies, in mm
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub rs_ext: f64,

    /// Distance of the analyser centre from the chi rotation axis in mm
    #[arg(long, default_value_t = 0.0)]
    pub pivot_distance: f64,

    /// Bender mechanism version (0 = prototype, 1 = pantograph 2017)
    #[arg(long, default_value = "0")]
    pub bender_version: String,

    /// Bender arm 0 length in mm
    #[arg(long, default_value_t = 0.0)]
    pub arm0: f64,

    /// Bender arm 1 length in mm
    #[arg(long, default_value_t = 0.0)]
    pub arm1: f64,

    /// Angle between arms in deg (prototype) or anchor-actuator length in mm (pantograph)
    #[arg(long, default_value_t = 0.0)]
    pub bender_third: f64,

    /// Actuator axial offset in mm
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub actuator_axial: f64,

    /// Actuator arm length in mm
    #[arg(long, default_value_t = 0.0)]
    pub actuator_arm: f64,

    /// Side of the bender pivot ('left'/-1 or 'right'/+1)
    #[arg(long, default_value = "right", allow_hyphen_values = true)]
    pub pivot_side: String,

    /// Index of the outermost analyser driven by the bender (centre is 0)
    #[arg(long, default_value_t = 5)]
    pub bender_analyser: u32,

    /// Laboratory frame
    #[arg(long, value_enum, default_value_t = Frame::Horizontal)]
    pub frame: Frame,

    /// Vertical frame only: rotate so that the sample-analyser ray is horizontal
    #[arg(long)]
    pub rotate_horizontal: bool,
}
