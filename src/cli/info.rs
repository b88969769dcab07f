//! # info 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/info.rs`

use crate::cli::instrument::InstrumentArgs;

use clap::Args;

/// info 子命令参数
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub instrument: InstrumentArgs,

    /// Bragg angle in degrees (defaults to the reference angle)
    #[arg(long, conflicts_with = "energy")]
    pub theta: Option<f64>,

    /// Photon energy in eV
    #[arg(long)]
    pub energy: Option<f64>,

    /// Also show side analysers 1..=N in touching configuration
    #[arg(long, default_value_t = 0)]
    pub side_analysers: u32,

    /// Also show the bender anchor point and actuator travel
    #[arg(long)]
    pub bender: bool,

    /// Show analyser offsets for this energy shift from the reference, in eV
    #[arg(long, allow_hyphen_values = true)]
    pub delta_e: Option<f64>,

    /// Horizontal frame only: detector stage rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub stage_rotation: Option<f64>,
}
