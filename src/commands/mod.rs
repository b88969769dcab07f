//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `rowland/`, `scan/`, `bragg/`, `utils/`
//! - 子模块: instrument, info, scan, crystal

pub mod crystal;
pub mod info;
pub mod instrument;
pub mod scan;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Info(args) => info::execute(args),
        Commands::Scan(args) => scan::execute(args),
        Commands::Bragg(args) => crystal::execute_bragg(args),
        Commands::Dspacing(args) => crystal::execute_dspacing(args),
        Commands::Findhkl(args) => crystal::execute_findhkl(args),
    }
}
