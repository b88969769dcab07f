//! # 谱仪参数 → Rowland 圆
//!
//! 把 `InstrumentArgs` 转换为 `RowlandConfig`，并按 `--frame` 构造坐标系变体。
//!
//! ## 依赖关系
//! - 被 `commands/info.rs`, `commands/scan.rs` 使用
//! - 使用 `cli/instrument.rs`, `rowland/`, `bragg/`

use crate::bragg::Reflection;
use crate::cli::instrument::{Frame, InstrumentArgs};
use crate::error::{RowlandError, Result};
use crate::rowland::{
    AnalyserLayout, BenderParameters, BenderVersion, PivotSide, RcHoriz, RcVert, RowlandCircle,
    RowlandConfig, RowlandFrame,
};

/// 由 `--dspacing` 或 `--reflection` 得到面间距
pub fn resolve_d_spacing(dspacing: Option<f64>, reflection: Option<&str>) -> Result<f64> {
    match (dspacing, reflection) {
        (Some(d), _) => Ok(d),
        (None, Some(text)) => {
            let reflection: Reflection = text.parse()?;
            let d = reflection.d_spacing()?;
            log::info!("{}: d = {:.5} A", reflection, d);
            Ok(d)
        }
        (None, None) => Err(RowlandError::InvalidArgument(
            "either --dspacing or --reflection is required".to_string(),
        )),
    }
}

/// 构造 Rowland 圆配置
pub fn build_config(args: &InstrumentArgs) -> Result<RowlandConfig> {
    let d_spacing = resolve_d_spacing(args.dspacing, args.reflection.as_deref())?;

    let base = match (args.theta0, args.energy0) {
        (Some(theta0), _) => RowlandConfig::new(args.radius, d_spacing, theta0),
        (None, Some(energy0)) => RowlandConfig::from_energy(args.radius, d_spacing, energy0)?,
        (None, None) => {
            return Err(RowlandError::InvalidArgument(
                "either --theta0 or --energy0 is required".to_string(),
            ))
        }
    };

    let analyser = AnalyserLayout {
        width: args.analyser_width,
        extended_width: args.analyser_width_ext,
        sagittal_radius_ext: args.rs_ext,
        pivot_distance: args.pivot_distance,
    };

    let bender = BenderParameters {
        version: args.bender_version.parse::<BenderVersion>()?,
        arm0: args.arm0,
        arm1: args.arm1,
        third: args.bender_third,
        actuator_axial: args.actuator_axial,
        actuator_arm: args.actuator_arm,
        pivot_side: args.pivot_side.parse::<PivotSide>()?,
        analyser_index: args.bender_analyser,
    };

    Ok(base
        .with_miscut(args.miscut)
        .with_zero_offsets(args.axial_offset0, args.sagittal_offset0)
        .with_analyser(analyser)
        .with_bender(bender))
}

/// 已配置的坐标系变体
pub enum Instrument {
    Horizontal(RcHoriz),
    Vertical(RcVert),
}

impl Instrument {
    pub fn frame(&self) -> &(dyn RowlandFrame + Sync) {
        match self {
            Instrument::Horizontal(rc) => rc,
            Instrument::Vertical(rc) => rc,
        }
    }
}

/// 构造并配置坐标系变体
pub fn build_instrument(args: &InstrumentArgs) -> Result<Instrument> {
    let circle = RowlandCircle::with_config(build_config(args)?)?;

    if args.rotate_horizontal && args.frame != Frame::Vertical {
        log::warn!("--rotate-horizontal only applies to the vertical frame, ignored");
    }

    Ok(match args.frame {
        Frame::Horizontal => Instrument::Horizontal(RcHoriz::new(circle)),
        Frame::Vertical => {
            Instrument::Vertical(RcVert::new(circle).rotated_to_horizontal(args.rotate_horizontal))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::cli::Commands;
    use clap::Parser;

    fn instrument(argv: &[&str]) -> InstrumentArgs {
        let mut full = vec!["rowland", "info"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Info(args) => args.instrument,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_build_config_from_reflection_and_energy() {
        let args = instrument(&["--reflection", "Si(111)", "--energy0", "2500"]);
        let config = build_config(&args).unwrap();
        assert!((config.d_spacing - 3.1356).abs() < 1e-4);
        let rc = RowlandCircle::with_config(config).unwrap();
        assert!((rc.reference_energy().unwrap() - 2500.0).abs() < 1e-6);
    }

    #[test]
    fn test_build_config_bad_pivot_side() {
        let args = instrument(&["--dspacing", "3.1356", "--theta0", "75", "--pivot-side", "up"]);
        assert!(matches!(
            build_config(&args),
            Err(RowlandError::InvalidPivotSide(_))
        ));
    }

    #[test]
    fn test_build_config_bad_bender_version() {
        let args = instrument(&[
            "--dspacing",
            "3.1356",
            "--theta0",
            "75",
            "--bender-version",
            "7",
        ]);
        assert!(matches!(
            build_config(&args),
            Err(RowlandError::UnsupportedBenderVersion(_))
        ));
    }

    #[test]
    fn test_build_vertical_instrument() {
        let args = instrument(&[
            "--dspacing",
            "3.1356",
            "--theta0",
            "75",
            "--frame",
            "vertical",
            "--miscut",
            "-2.5",
        ]);
        let inst = build_instrument(&args).unwrap();
        assert_eq!(inst.frame().frame_name(), "vertical");
        assert_eq!(inst.frame().circle().miscut().unwrap(), -2.5);
    }
}
