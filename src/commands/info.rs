//! # info 子命令实现
//!
//! 打印单个 Bragg 角（或能量）处的谱仪几何。
//!
//! ## 功能
//! - 距离、偏移、分析晶体与探测器位置
//! - 可选：侧分析晶体、弯晶器、能量跟踪偏移、探测器平移台读数
//!
//! ## 依赖关系
//! - 使用 `cli/info.rs` 定义的 InfoArgs
//! - 使用 `commands/instrument.rs` 构造谱仪
//! - 使用 `tabled` 打印表格

use crate::cli::info::InfoArgs;
use crate::commands::instrument::{build_instrument, Instrument};
use crate::error::Result;
use crate::rowland::{analyser_center_x, RowlandFrame};
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Quantity")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

fn row(name: &str, value: f64, precision: usize, unit: &str) -> ValueRow {
    ValueRow {
        name: name.to_string(),
        value: format!("{:.*}", precision, value),
        unit: unit.to_string(),
    }
}

fn point_row(name: &str, point: impl std::fmt::Display) -> ValueRow {
    ValueRow {
        name: name.to_string(),
        value: point.to_string(),
        unit: "mm".to_string(),
    }
}

/// 执行 info
pub fn execute(args: InfoArgs) -> Result<()> {
    output::print_header("Rowland Circle Geometry");

    let instrument = build_instrument(&args.instrument)?;
    let frame = instrument.frame();
    let circle = frame.circle();

    output::print_info(&format!(
        "Rm = {:.3} mm, d = {:.5} Å, theta0 = {:.4} deg, E0 = {:.2} eV ({} frame)",
        circle.radius()?,
        circle.d_spacing()?,
        circle.reference_angle()?,
        circle.reference_energy()?,
        frame.frame_name()
    ));

    let angle = match (args.theta, args.energy) {
        (Some(theta), _) => theta,
        (None, Some(energy)) => circle.bragg_angle_for_energy(energy)?,
        (None, None) => circle.reference_angle()?,
    };

    let info = frame.info(angle)?;
    let mut rows = vec![
        row("Bragg angle", info.bragg_angle, 4, "deg"),
        row("Energy", info.energy, 3, "eV"),
        row("p (sample-analyser)", info.p, 4, "mm"),
        row("q (analyser-detector)", info.q, 4, "mm"),
        row("Sample-detector", info.sample_detector, 4, "mm"),
        row("Sagittal radius Rs", info.sagittal_radius, 4, "mm"),
        row("Axial offset", info.axial_offset, 4, "mm"),
        row("Sagittal offset", info.sagittal_offset, 4, "mm"),
        point_row("Analyser", info.analyzer),
        point_row("Detector", info.detector),
    ];

    if circle.miscut()? != 0.0 {
        let correction = frame.miscut_correction(angle)?;
        rows.push(point_row("Miscut correction", correction.shift));
    }

    match &instrument {
        Instrument::Vertical(rc) => {
            let position = rc.position(angle)?;
            rows.push(point_row("Analyser pivot", position.pivot));
            rows.push(row("Pivot height", position.pivot_height, 4, "mm"));
        }
        Instrument::Horizontal(rc) => {
            if let Some(rotation) = args.stage_rotation {
                let stage = rc.detector_stage_position(angle, rotation, [0.0, 0.0])?;
                rows.push(row("Detector stage (parallel)", stage.parallel, 4, "mm"));
                rows.push(row("Detector stage (perpendicular)", stage.perpendicular, 4, "mm"));
            }
        }
    }

    println!("{}", Table::new(&rows));

    if args.side_analysers > 0 {
        print_side_analysers(frame, angle, args.side_analysers)?;
    }

    if args.bender {
        print_bender(frame, angle)?;
    }

    if let Some(delta_e) = args.delta_e {
        print_energy_tracking(frame, delta_e)?;
    }

    output::print_done("Geometry computed");
    Ok(())
}

/// 打印相切排列的侧分析晶体
fn print_side_analysers(frame: &dyn RowlandFrame, angle: f64, count: u32) -> Result<()> {
    #[derive(Tabled)]
    struct SideRow {
        #[tabled(rename = "#")]
        index: u32,
        #[tabled(rename = "χ (°)")]
        chi: String,
        #[tabled(rename = "Axial (pivot)")]
        axial: String,
        #[tabled(rename = "Sagittal (pivot)")]
        sagittal: String,
        #[tabled(rename = "Gap")]
        gap: String,
        #[tabled(rename = "Flat x")]
        flat_x: String,
        #[tabled(rename = "Position")]
        position: String,
    }

    let solution = frame.circle().solution(angle)?;
    if solution.layout.extended_width == 0.0 {
        output::print_warning("--analyser-width-ext is 0, side analysers coincide with the centre one");
    }
    let mut rows = Vec::new();
    for n in 1..=count {
        let chi = solution.chi_touching(n as f64)?;
        let offsets = solution.side_offsets(solution.pivot_axial_offset(chi))?;
        let position = frame.side_analyzer_position(angle, chi)?;
        rows.push(SideRow {
            index: n,
            chi: format!("{:.4}", offsets.chi),
            axial: format!("{:.4}", offsets.axial),
            sagittal: format!("{:.4}", offsets.sagittal),
            gap: format!("{:.4}", solution.analyser_gap(chi, n as f64)),
            flat_x: format!("{:.1}", analyser_center_x(n as i32, solution.layout.width, 0.0)),
            position: position.point.to_string(),
        });
    }

    output::print_header("Side Analysers");
    println!("{}", Table::new(&rows));
    Ok(())
}

/// 打印弯晶器锚点与作动器行程
fn print_bender(frame: &dyn RowlandFrame, angle: f64) -> Result<()> {
    let bender = frame.bender_motor_position(angle)?;
    let rows = vec![
        ValueRow {
            name: "Analyser index".to_string(),
            value: bender.analyser_index.to_string(),
            unit: String::new(),
        },
        row("Anchor axial offset", bender.anchor_axial_offset, 4, "mm"),
        row("Anchor sagittal offset", bender.anchor_sagittal_offset, 4, "mm"),
        row("Actuator travel", bender.motor_travel, 4, "mm"),
        point_row("Anchor", bender.anchor),
    ];
    output::print_header("Bender");
    println!("{}", Table::new(&rows));
    Ok(())
}

/// 打印参考角附近的能量跟踪偏移
fn print_energy_tracking(frame: &dyn RowlandFrame, delta_e: f64) -> Result<()> {
    let circle = frame.circle();
    let rows = vec![
        row("Energy shift", delta_e, 3, "eV"),
        row("Delta theta", circle.delta_theta(delta_e)? * 1e6, 2, "µrad"),
        row("Analyser height offset", circle.analyser_height_offset(delta_e)?, 5, "mm"),
        row("Analyser depth offset", circle.analyser_depth_offset(delta_e)?, 5, "mm"),
    ];
    output::print_header("Energy Tracking (reference angle)");
    println!("{}", Table::new(&rows));
    Ok(())
}
