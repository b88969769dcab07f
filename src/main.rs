//! # rowland 命令行入口
//!
//! ## 子命令
//! - `info`     - 单个 Bragg 角/能量处的谱仪几何
//! - `scan`     - 角度或能量区间扫描
//! - `bragg`    - Bragg 角与能量互换
//! - `dspacing` - 晶系面间距
//! - `findhkl`  - 按能量搜索 Si/Ge 反射

use clap::Parser;
use rowland::cli::Cli;
use rowland::{commands, utils};

/// 按 `-v` 次数设置日志级别：默认 info，-v debug，-vv trace
fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stderr);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        _ => builder.filter_level(log::LevelFilter::Trace),
    };
    builder.init();
}

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    setup_logging(cli.verbosity);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
