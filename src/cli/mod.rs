//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `info`: 单个 Bragg 角/能量处的谱仪几何
//! - `scan`: 角度或能量区间扫描，可输出 CSV
//! - `bragg`: Bragg 角与能量互换
//! - `dspacing`: 晶系面间距
//! - `findhkl`: 按能量搜索 Si/Ge 反射
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: instrument, info, scan, crystal

pub mod crystal;
pub mod info;
pub mod instrument;
pub mod scan;

use clap::{Parser, Subcommand};

/// Rowland - Rowland 圆 X 射线谱仪几何计算
#[derive(Parser)]
#[command(name = "rowland")]
#[command(version)]
#[command(about = "Geometry of Rowland-circle X-ray spectrometers", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Spectrometer geometry at one Bragg angle or energy
    Info(info::InfoArgs),

    /// Scan a Bragg angle or energy range
    Scan(scan::ScanArgs),

    /// Convert between Bragg angle and photon energy
    Bragg(crystal::BraggArgs),

    /// Interplanar spacing for a lattice system
    Dspacing(crystal::DspacingArgs),

    /// Find Si/Ge reflections above a minimum Bragg angle
    Findhkl(crystal::FindhklArgs),
}
