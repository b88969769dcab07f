//! # scan 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/scan.rs`

use crate::cli::instrument::InstrumentArgs;

use clap::Args;

/// scan 子命令参数
#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub instrument: InstrumentArgs,

    /// Bragg angle range in degrees (e.g., '35-85' or '35:85')
    #[arg(
        long,
        required_unless_present = "energy",
        conflicts_with = "energy",
        allow_hyphen_values = true
    )]
    pub theta: Option<String>,

    /// Energy range in eV (e.g., '8000-9000' or '8000:9000')
    #[arg(long, allow_hyphen_values = true)]
    pub energy: Option<String>,

    /// Number of scan points (end points included)
    #[arg(long, default_value_t = 51)]
    pub points: usize,

    /// Number of parallel jobs (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Write the scan as CSV to standard output instead of a table
    #[arg(long)]
    pub csv: bool,
}
