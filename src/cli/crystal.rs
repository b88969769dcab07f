//! # 晶体相关子命令 CLI 定义
//!
//! - `bragg`: Bragg 角与能量互换
//! - `dspacing`: 晶系面间距
//! - `findhkl`: 反射搜索
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/crystal.rs`

use clap::{Args, ValueEnum};

// ─────────────────────────────────────────────────────────────
// bragg 子命令
// ─────────────────────────────────────────────────────────────

/// bragg 子命令参数
#[derive(Args, Debug)]
pub struct BraggArgs {
    /// Crystal d-spacing in Å
    #[arg(long, required_unless_present = "reflection", conflicts_with = "reflection")]
    pub dspacing: Option<f64>,

    /// Analyser reflection, e.g. 'Si(111)'
    #[arg(long)]
    pub reflection: Option<String>,

    /// Bragg angle in degrees
    #[arg(long, required_unless_present = "energy", conflicts_with = "energy")]
    pub theta: Option<f64>,

    /// Photon energy in eV
    #[arg(long)]
    pub energy: Option<f64>,

    /// Diffraction order
    #[arg(long, default_value_t = 1)]
    pub order: u32,

    /// Angular step in µrad used to report the energy resolution
    #[arg(long)]
    pub dtheta_urad: Option<f64>,
}

// ─────────────────────────────────────────────────────────────
// dspacing 子命令
// ─────────────────────────────────────────────────────────────

/// dspacing 子命令参数
#[derive(Args, Debug)]
pub struct DspacingArgs {
    /// Lattice system (cubic, tetragonal, orthorhombic, hexagonal,
    /// rhombohedral, monoclinic, triclinic)
    #[arg(long, default_value = "cubic")]
    pub system: String,

    /// Lattice constant a in Å
    #[arg(short, long)]
    pub a: f64,

    /// Lattice constant b in Å (defaults to a)
    #[arg(short, long)]
    pub b: Option<f64>,

    /// Lattice constant c in Å (defaults to a)
    #[arg(short, long)]
    pub c: Option<f64>,

    /// Cell angle alpha in degrees
    #[arg(long, default_value_t = 90.0)]
    pub alpha: f64,

    /// Cell angle beta in degrees
    #[arg(long, default_value_t = 90.0)]
    pub beta: f64,

    /// Cell angle gamma in degrees (hexagonal cells use 120)
    #[arg(long, default_value_t = 90.0)]
    pub gamma: f64,

    /// Miller indices, e.g. '1 1 1' or '111'
    #[arg(long)]
    pub hkl: String,
}

// ─────────────────────────────────────────────────────────────
// findhkl 子命令
// ─────────────────────────────────────────────────────────────

/// 反射搜索的晶体
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CrystalChoice {
    /// Silicon
    Si,
    /// Germanium
    Ge,
    /// Silicon and germanium
    All,
}

impl std::fmt::Display for CrystalChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrystalChoice::Si => write!(f, "si"),
            CrystalChoice::Ge => write!(f, "ge"),
            CrystalChoice::All => write!(f, "all"),
        }
    }
}

/// findhkl 子命令参数
#[derive(Args, Debug)]
pub struct FindhklArgs {
    /// Photon energy in eV
    #[arg(long)]
    pub energy: f64,

    /// Minimum Bragg angle in degrees
    #[arg(long, default_value_t = 65.0)]
    pub theta_min: f64,

    /// Crystal(s) to search
    #[arg(long, value_enum, default_value_t = CrystalChoice::All)]
    pub crystal: CrystalChoice,
}
