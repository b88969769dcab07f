//! # Bragg 定律换算模块
//!
//! 能量、波长与 Bragg 角之间的换算（n λ = 2 d sin θ），以及
//! Bragg 定律微分形式给出的角度/能量分辨率。
//!
//! ## 子模块
//! - `lattice`: 七种晶系的面间距公式
//! - `crystals`: 常用分析晶体预设、反射记号解析、反射搜索
//!
//! ## 依赖关系
//! - 被 `rowland/core.rs` 和 `commands/` 使用
//! - 使用 `error.rs`

pub mod crystals;
pub mod lattice;

pub use crystals::{find_reflections, Crystal, Reflection, ReflectionMatch};
pub use lattice::{d_spacing_for_lattice, LatticeConstants, LatticeSystem, Miller};

use crate::error::{checked_div, RowlandError, Result};

/// h·c (eV·m)
pub const HC: f64 = 1.2398418743309972e-6;

/// h·c (eV·Å)
pub const HC_EV_ANGSTROM: f64 = HC * 1e10;

/// 光子能量 (eV) → 波长 (Å)
pub fn energy_to_wavelength(energy: f64) -> Result<f64> {
    checked_div(HC_EV_ANGSTROM, energy, "energy to wavelength conversion")
}

/// 波长 (Å) → 光子能量 (eV)
pub fn wavelength_to_energy(wavelength: f64) -> Result<f64> {
    checked_div(HC_EV_ANGSTROM, wavelength, "wavelength to energy conversion")
}

/// 能量 (eV) 与面间距 (Å) → 一级 Bragg 角 (deg)
pub fn energy_to_bragg_angle(energy: f64, d_spacing: f64) -> Result<f64> {
    energy_to_bragg_angle_order(energy, d_spacing, 1)
}

/// 能量 (eV) 与面间距 (Å) → n 级 Bragg 角 (deg)
pub fn energy_to_bragg_angle_order(energy: f64, d_spacing: f64, order: u32) -> Result<f64> {
    check_order(order)?;
    let wavelength = energy_to_wavelength(energy)?;
    let sin_theta = checked_div(
        wavelength * order as f64,
        2.0 * d_spacing,
        "Bragg angle (d-spacing is zero)",
    )?;
    // θ = 90° 处背散射能量，等号也不可达
    let edge_energy = order as f64 * HC_EV_ANGSTROM / (2.0 * d_spacing);

    if sin_theta <= 0.0 || sin_theta >= 1.0 || energy <= edge_energy {
        return Err(RowlandError::out_of_range(
            format!("Energy {:.3} eV", energy),
            format!(
                "sin(theta) = {:.6} for d = {:.6} A, order {}",
                sin_theta, d_spacing, order
            ),
        ));
    }
    Ok(sin_theta.asin().to_degrees())
}

/// Bragg 角 (deg) 与面间距 (Å) → 一级能量 (eV)
pub fn bragg_angle_to_energy(theta_deg: f64, d_spacing: f64) -> Result<f64> {
    bragg_angle_to_energy_order(theta_deg, d_spacing, 1)
}

/// Bragg 角 (deg) 与面间距 (Å) → n 级能量 (eV)
pub fn bragg_angle_to_energy_order(theta_deg: f64, d_spacing: f64, order: u32) -> Result<f64> {
    check_order(order)?;
    if theta_deg == 0.0 {
        return Err(RowlandError::division_by_zero("Bragg energy (sin(theta) = 0)"));
    }
    if !theta_deg.is_finite() || theta_deg < 0.0 || theta_deg >= 90.0 {
        return Err(RowlandError::out_of_range(
            format!("Bragg angle {} deg", theta_deg),
            "expected 0 < theta < 90 deg",
        ));
    }
    let wavelength = checked_div(
        2.0 * d_spacing * theta_deg.to_radians().sin(),
        order as f64,
        "Bragg energy",
    )?;
    wavelength_to_energy(wavelength)
}

/// 微分 Bragg 定律：Δθ = −(ΔE/E)·tanθ，返回弧度
pub fn delta_theta(e_delta: f64, energy: f64, theta_deg: f64) -> Result<f64> {
    let ratio = checked_div(e_delta, energy, "relative energy offset")?;
    Ok(-ratio * theta_deg.to_radians().tan())
}

/// 能量分辨率 ΔE/E = Δθ·cotθ（Δθ 为弧度）
pub fn energy_resolution(theta_deg: f64, dtheta_rad: f64) -> Result<f64> {
    checked_div(dtheta_rad, theta_deg.to_radians().tan(), "energy resolution (tan(theta) = 0)")
}

fn check_order(order: u32) -> Result<()> {
    if order == 0 {
        return Err(RowlandError::invalid_parameter(
            "order",
            0.0,
            "diffraction order must be >= 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const SI111: f64 = 3.1356;

    #[test]
    fn test_wavelength_energy() {
        assert_relative_eq!(energy_to_wavelength(12398.418743309972).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(wavelength_to_energy(1.0).unwrap(), 12398.418743309972, epsilon = 1e-9);
        assert!(matches!(
            energy_to_wavelength(0.0),
            Err(RowlandError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_si111_at_75_deg() {
        let energy = bragg_angle_to_energy(75.0, SI111).unwrap();
        let expected = 12398.418743309972 / (2.0 * SI111 * 75.0_f64.to_radians().sin());
        assert_relative_eq!(energy, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(energy / 1000.0, 2.0468, epsilon = 1e-3);
    }

    #[test]
    fn test_round_trip() {
        for theta in [15.0, 35.0, 60.0, 75.0, 88.0] {
            let e = bragg_angle_to_energy(theta, SI111).unwrap();
            let back = energy_to_bragg_angle(e, SI111).unwrap();
            assert_abs_diff_eq!(back, theta, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_higher_order() {
        let e1 = bragg_angle_to_energy(70.0, SI111).unwrap();
        let e3 = bragg_angle_to_energy_order(70.0, SI111, 3).unwrap();
        assert_relative_eq!(e3, 3.0 * e1, epsilon = 1e-9);
        let theta = energy_to_bragg_angle_order(e3, SI111, 3).unwrap();
        assert_abs_diff_eq!(theta, 70.0, epsilon = 1e-9);
        assert!(bragg_angle_to_energy_order(70.0, SI111, 0).is_err());
    }

    #[test]
    fn test_out_of_bragg_range() {
        // λ/2d > 1
        let res = energy_to_bragg_angle(1000.0, SI111);
        assert!(matches!(res, Err(RowlandError::OutOfBraggRange { .. })));
        let res = bragg_angle_to_energy(95.0, SI111);
        assert!(matches!(res, Err(RowlandError::OutOfBraggRange { .. })));
    }

    #[test]
    fn test_exact_backscattering_rejected() {
        assert!(matches!(
            bragg_angle_to_energy(90.0, SI111),
            Err(RowlandError::OutOfBraggRange { .. })
        ));
        let edge = HC_EV_ANGSTROM / (2.0 * SI111);
        assert!(matches!(
            energy_to_bragg_angle(edge, SI111),
            Err(RowlandError::OutOfBraggRange { .. })
        ));
        assert!(matches!(
            energy_to_bragg_angle_order(2.0 * edge, SI111, 2),
            Err(RowlandError::OutOfBraggRange { .. })
        ));
        // 略高于边界仍可达
        let theta = energy_to_bragg_angle(edge * 1.001, SI111).unwrap();
        assert!(theta > 80.0 && theta < 90.0);
        assert!(bragg_angle_to_energy(89.999, SI111).is_ok());
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            energy_to_bragg_angle(8000.0, 0.0),
            Err(RowlandError::DivisionByZero { .. })
        ));
        assert!(matches!(
            bragg_angle_to_energy(0.0, SI111),
            Err(RowlandError::DivisionByZero { .. })
        ));
        assert!(matches!(
            bragg_angle_to_energy(45.0, 0.0),
            Err(RowlandError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_monotonic_energy() {
        let mut last = f64::INFINITY;
        for i in 1..90 {
            let e = bragg_angle_to_energy(i as f64, SI111).unwrap();
            assert!(e < last);
            last = e;
        }
    }

    #[test]
    fn test_delta_theta_and_resolution() {
        let dth = delta_theta(1.0, 8000.0, 45.0).unwrap();
        assert_abs_diff_eq!(dth, -1.0 / 8000.0, epsilon = 1e-15);
        let de = energy_resolution(45.0, dth).unwrap();
        assert_abs_diff_eq!(de, dth, epsilon = 1e-15);
        assert!(delta_theta(1.0, 0.0, 45.0).is_err());
    }
}
