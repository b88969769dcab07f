//! # 晶体相关子命令实现
//!
//! - `bragg`: Bragg 角 ↔ 能量，附带 n 级衍射与角分辨率对应的能量分辨率
//! - `dspacing`: 任意晶系的面间距
//! - `findhkl`: 给定能量下 Bragg 角不小于阈值的 Si/Ge 反射
//!
//! ## 依赖关系
//! - 使用 `cli/crystal.rs` 定义的参数
//! - 使用 `bragg/` 模块

use crate::bragg::{
    bragg_angle_to_energy_order, d_spacing_for_lattice, energy_resolution,
    energy_to_bragg_angle_order, energy_to_wavelength, find_reflections, Crystal,
    LatticeConstants, LatticeSystem, Miller,
};
use crate::cli::crystal::{BraggArgs, CrystalChoice, DspacingArgs, FindhklArgs};
use crate::commands::instrument::resolve_d_spacing;
use crate::error::{Result, RowlandError};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 执行 bragg
pub fn execute_bragg(args: BraggArgs) -> Result<()> {
    let d_spacing = resolve_d_spacing(args.dspacing, args.reflection.as_deref())?;

    let (theta, energy) = match (args.theta, args.energy) {
        (Some(theta), _) => (theta, bragg_angle_to_energy_order(theta, d_spacing, args.order)?),
        (None, Some(energy)) => (energy_to_bragg_angle_order(energy, d_spacing, args.order)?, energy),
        (None, None) => {
            return Err(RowlandError::InvalidArgument(
                "either --theta or --energy is required".to_string(),
            ))
        }
    };
    let wavelength = energy_to_wavelength(energy)?;

    output::print_success(&format!(
        "d = {:.5} Å, order {}: theta = {:.5} deg <-> E = {:.3} eV (λ = {:.5} Å)",
        d_spacing, args.order, theta, energy, wavelength
    ));

    if let Some(dtheta_urad) = args.dtheta_urad {
        let relative = energy_resolution(theta, dtheta_urad * 1e-6)?;
        output::print_info(&format!(
            "Δθ = {} µrad -> ΔE/E = {:.3e}, ΔE = {:.4} eV",
            dtheta_urad,
            relative,
            relative * energy
        ));
    }
    Ok(())
}

/// 执行 dspacing
pub fn execute_dspacing(args: DspacingArgs) -> Result<()> {
    let system: LatticeSystem = args.system.parse()?;
    let hkl: Miller = args.hkl.parse()?;
    let lattice = LatticeConstants::new(
        args.a,
        args.b.unwrap_or(args.a),
        args.c.unwrap_or(args.a),
        args.alpha,
        args.beta,
        args.gamma,
    );
    log::debug!("{} lattice: {:?}", system, lattice);

    let d = d_spacing_for_lattice(system, &lattice, hkl)?;
    output::print_success(&format!("{} {}: d = {:.6} Å", system, hkl, d));
    Ok(())
}

#[derive(Tabled)]
struct ReflectionRow {
    #[tabled(rename = "Reflection")]
    reflection: String,
    #[tabled(rename = "d (Å)")]
    d_spacing: String,
    #[tabled(rename = "θ (°)")]
    theta: String,
}

/// 执行 findhkl
pub fn execute_findhkl(args: FindhklArgs) -> Result<()> {
    let crystals: Vec<Crystal> = match args.crystal {
        CrystalChoice::Si => vec![Crystal::silicon()],
        CrystalChoice::Ge => vec![Crystal::germanium()],
        CrystalChoice::All => vec![Crystal::silicon(), Crystal::germanium()],
    };

    output::print_header(&format!(
        "Reflections at {} eV with theta >= {} deg",
        args.energy, args.theta_min
    ));

    let matches = find_reflections(args.energy, args.theta_min, &crystals)?;
    if matches.is_empty() {
        output::print_warning("No reflection satisfies the Bragg condition in this range");
        return Ok(());
    }

    let rows: Vec<ReflectionRow> = matches
        .iter()
        .map(|m| ReflectionRow {
            reflection: m.reflection.to_string(),
            d_spacing: format!("{:.5}", m.d_spacing),
            theta: format!("{:.3}", m.bragg_angle),
        })
        .collect();
    println!("{}", Table::new(&rows));

    output::print_done(&format!("{} reflection(s) found", matches.len()));
    Ok(())
}
