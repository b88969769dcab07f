//! # scan 子命令实现
//!
//! 在角度或能量区间上并行计算谱仪几何。
//!
//! ## 依赖关系
//! - 使用 `cli/scan.rs` 定义的 ScanArgs
//! - 使用 `scan/` 执行扫描与 CSV 输出
//! - 使用 `utils/progress.rs` 显示进度

use crate::cli::scan::ScanArgs;
use crate::commands::instrument::build_instrument;
use crate::error::{Result, RowlandError};
use crate::rowland::RowlandInfo;
use crate::scan::{write_csv, ScanAxis, ScanRange, ScanRunner};
use crate::utils::{output, progress};

use std::io;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "θ (°)")]
    theta: String,
    #[tabled(rename = "E (eV)")]
    energy: String,
    #[tabled(rename = "p")]
    p: String,
    #[tabled(rename = "q")]
    q: String,
    #[tabled(rename = "Axial")]
    axial: String,
    #[tabled(rename = "Sagittal")]
    sagittal: String,
    #[tabled(rename = "Analyser")]
    analyzer: String,
    #[tabled(rename = "Detector")]
    detector: String,
}

impl From<&RowlandInfo> for ScanRow {
    fn from(info: &RowlandInfo) -> Self {
        ScanRow {
            theta: format!("{:.4}", info.bragg_angle),
            energy: format!("{:.2}", info.energy),
            p: format!("{:.3}", info.p),
            q: format!("{:.3}", info.q),
            axial: format!("{:.3}", info.axial_offset),
            sagittal: format!("{:.3}", info.sagittal_offset),
            analyzer: info.analyzer.to_string(),
            detector: info.detector.to_string(),
        }
    }
}

/// 执行 scan
pub fn execute(args: ScanArgs) -> Result<()> {
    let range = match (&args.theta, &args.energy) {
        (Some(expr), _) => ScanRange::parse(ScanAxis::Angle, expr, args.points)?,
        (None, Some(expr)) => ScanRange::parse(ScanAxis::Energy, expr, args.points)?,
        (None, None) => {
            return Err(RowlandError::InvalidArgument(
                "either --theta or --energy range is required".to_string(),
            ))
        }
    };

    let instrument = build_instrument(&args.instrument)?;
    let runner = ScanRunner::new(args.jobs);

    // CSV 直接写到 stdout，不混入其他输出
    if args.csv {
        let result = runner.run(instrument.frame(), &range, || {})?;
        write_csv(&result.records, io::stdout().lock())?;
        return Ok(());
    }

    output::print_header("Rowland Circle Scan");
    output::print_info(&format!(
        "{} points of {} from {} to {} ({} frame, {} jobs)",
        range.points,
        range.axis,
        range.start,
        range.end,
        instrument.frame().frame_name(),
        runner.jobs()
    ));

    let pb = progress::create_progress_bar(range.points as u64, "Scanning");
    let result = runner.run(instrument.frame(), &range, || pb.inc(1))?;
    pb.finish_with_message("Done");

    if !result.records.is_empty() {
        let rows: Vec<ScanRow> = result.records.iter().map(ScanRow::from).collect();
        println!("\n{}", Table::new(&rows));
    }

    println!();
    output::print_separator();
    println!(
        "Total: {} | Computed: {} | Out of range: {}",
        result.total(),
        result.records.len(),
        result.failures.len()
    );

    if !result.failures.is_empty() {
        output::print_warning("Skipped scan points:");
        for (value, error) in &result.failures {
            println!("  - {} = {}: {}", range.axis, value, error);
        }
    }

    if result.records.is_empty() {
        return Err(RowlandError::InvalidRange(
            "no scan point lies within the reachable Bragg range".to_string(),
        ));
    }

    output::print_done("Scan finished");
    Ok(())
}
