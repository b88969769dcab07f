//! # 晶系面间距
//!
//! 七种晶系的 d(hkl) 公式，晶格常数单位 Å，角度单位 deg。
//!
//! ## 依赖关系
//! - 被 `bragg/crystals.rs` 和 `commands/crystal.rs` 使用

use crate::error::{RowlandError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 晶系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatticeSystem {
    Cubic,
    Tetragonal,
    Orthorhombic,
    Hexagonal,
    /// 菱方（三方）晶系，a = b = c, α = β = γ
    Rhombohedral,
    Monoclinic,
    Triclinic,
}

impl LatticeSystem {
    pub const ALL: [LatticeSystem; 7] = [
        LatticeSystem::Cubic,
        LatticeSystem::Tetragonal,
        LatticeSystem::Orthorhombic,
        LatticeSystem::Hexagonal,
        LatticeSystem::Rhombohedral,
        LatticeSystem::Monoclinic,
        LatticeSystem::Triclinic,
    ];
}

impl FromStr for LatticeSystem {
    type Err = RowlandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cubic" => Ok(LatticeSystem::Cubic),
            "tetragonal" => Ok(LatticeSystem::Tetragonal),
            "orthorhombic" => Ok(LatticeSystem::Orthorhombic),
            "hexagonal" => Ok(LatticeSystem::Hexagonal),
            "rhombohedral" | "trigonal" => Ok(LatticeSystem::Rhombohedral),
            "monoclinic" => Ok(LatticeSystem::Monoclinic),
            "triclinic" => Ok(LatticeSystem::Triclinic),
            _ => Err(RowlandError::UnsupportedLattice(s.to_string())),
        }
    }
}

impl fmt::Display for LatticeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LatticeSystem::Cubic => "cubic",
            LatticeSystem::Tetragonal => "tetragonal",
            LatticeSystem::Orthorhombic => "orthorhombic",
            LatticeSystem::Hexagonal => "hexagonal",
            LatticeSystem::Rhombohedral => "rhombohedral",
            LatticeSystem::Monoclinic => "monoclinic",
            LatticeSystem::Triclinic => "triclinic",
        };
        write!(f, "{}", name)
    }
}

/// 晶格常数
///
/// 各晶系只读取需要的字段：立方只用 `a`，六方用 `a`/`c`，
/// 单斜额外用 `beta`，菱方用 `a`/`alpha`，三斜全部使用。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeConstants {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl LatticeConstants {
    pub fn cubic(a: f64) -> Self {
        Self::new(a, a, a, 90.0, 90.0, 90.0)
    }

    pub fn tetragonal(a: f64, c: f64) -> Self {
        Self::new(a, a, c, 90.0, 90.0, 90.0)
    }

    pub fn hexagonal(a: f64, c: f64) -> Self {
        Self::new(a, a, c, 90.0, 90.0, 120.0)
    }

    pub fn rhombohedral(a: f64, alpha: f64) -> Self {
        Self::new(a, a, a, alpha, alpha, alpha)
    }

    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        LatticeConstants {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }
}

/// Miller 指数 (h, k, l)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Miller {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl Miller {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        Miller { h, k, l }
    }

    pub fn is_zero(&self) -> bool {
        self.h == 0 && self.k == 0 && self.l == 0
    }
}

impl FromStr for Miller {
    type Err = RowlandError;

    /// 接受 `"1 1 1"`、`"1,1,-1"` 或紧凑的 `"111"`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .collect();

        let indices: Vec<i32> = if parts.len() == 1 && parts[0].len() == 3 {
            parts[0]
                .chars()
                .map(|c| c.to_digit(10).map(|d| d as i32))
                .collect::<Option<_>>()
                .ok_or_else(|| RowlandError::InvalidReflection(s.to_string()))?
        } else {
            parts
                .iter()
                .map(|p| p.parse::<i32>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| RowlandError::InvalidReflection(s.to_string()))?
        };

        match indices.as_slice() {
            [h, k, l] => Ok(Miller::new(*h, *k, *l)),
            _ => Err(RowlandError::InvalidReflection(s.to_string())),
        }
    }
}

impl fmt::Display for Miller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..10).contains(&self.h) && (0..10).contains(&self.k) && (0..10).contains(&self.l) {
            write!(f, "({}{}{})", self.h, self.k, self.l)
        } else {
            write!(f, "({} {} {})", self.h, self.k, self.l)
        }
    }
}

/// 给定晶系、晶格常数和 Miller 指数计算面间距 d (Å)
pub fn d_spacing_for_lattice(
    system: LatticeSystem,
    lattice: &LatticeConstants,
    hkl: Miller,
) -> Result<f64> {
    if hkl.is_zero() {
        return Err(RowlandError::division_by_zero("d-spacing for (000)"));
    }
    check_lengths(system, lattice)?;

    let (h, k, l) = (hkl.h as f64, hkl.k as f64, hkl.l as f64);
    let LatticeConstants { a, b, c, .. } = *lattice;

    let inv_d2 = match system {
        LatticeSystem::Cubic => (h * h + k * k + l * l) / (a * a),
        LatticeSystem::Tetragonal => (h * h + k * k) / (a * a) + l * l / (c * c),
        LatticeSystem::Orthorhombic => h * h / (a * a) + k * k / (b * b) + l * l / (c * c),
        LatticeSystem::Hexagonal => {
            4.0 / 3.0 * (h * h + h * k + k * k) / (a * a) + l * l / (c * c)
        }
        LatticeSystem::Rhombohedral => {
            let al = lattice.alpha.to_radians();
            let (sin_a, cos_a) = al.sin_cos();
            let denom = a * a * (1.0 - 3.0 * cos_a * cos_a + 2.0 * cos_a.powi(3));
            if denom.abs() < f64::EPSILON {
                return Err(RowlandError::division_by_zero(
                    "rhombohedral d-spacing (degenerate cell)",
                ));
            }
            ((h * h + k * k + l * l) * sin_a * sin_a
                + 2.0 * (h * k + k * l + h * l) * (cos_a * cos_a - cos_a))
                / denom
        }
        LatticeSystem::Monoclinic => {
            let sin_b = lattice.beta.to_radians().sin();
            let cos_b = lattice.beta.to_radians().cos();
            if sin_b.abs() < f64::EPSILON {
                return Err(RowlandError::division_by_zero("monoclinic d-spacing (sin beta = 0)"));
            }
            (h * h / (a * a) + k * k * sin_b * sin_b / (b * b) + l * l / (c * c)
                - 2.0 * h * l * cos_b / (a * c))
                / (sin_b * sin_b)
        }
        LatticeSystem::Triclinic => triclinic_inv_d2(lattice, h, k, l)?,
    };

    if !inv_d2.is_finite() || inv_d2 <= 0.0 {
        return Err(RowlandError::invalid_parameter(
            "1/d^2",
            inv_d2,
            format!("lattice constants give no real d-spacing for {}", hkl),
        ));
    }
    Ok((1.0 / inv_d2).sqrt())
}

fn triclinic_inv_d2(lattice: &LatticeConstants, h: f64, k: f64, l: f64) -> Result<f64> {
    let LatticeConstants { a, b, c, .. } = *lattice;
    let (sa, ca) = lattice.alpha.to_radians().sin_cos();
    let (sb, cb) = lattice.beta.to_radians().sin_cos();
    let (sg, cg) = lattice.gamma.to_radians().sin_cos();

    let volume_term = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
    if volume_term <= f64::EPSILON {
        return Err(RowlandError::division_by_zero(
            "triclinic d-spacing (degenerate cell volume)",
        ));
    }
    let v2 = (a * b * c).powi(2) * volume_term;

    Ok((h * h * b * b * c * c * sa * sa
        + k * k * a * a * c * c * sb * sb
        + l * l * a * a * b * b * sg * sg
        + 2.0 * h * k * a * b * c * c * (ca * cb - cg)
        + 2.0 * k * l * a * a * b * c * (cb * cg - ca)
        + 2.0 * h * l * a * b * b * c * (ca * cg - cb))
        / v2)
}

fn check_lengths(system: LatticeSystem, lattice: &LatticeConstants) -> Result<()> {
    let used: &[(&str, f64)] = match system {
        LatticeSystem::Cubic | LatticeSystem::Rhombohedral => &[("a", lattice.a)],
        LatticeSystem::Tetragonal | LatticeSystem::Hexagonal => {
            &[("a", lattice.a), ("c", lattice.c)]
        }
        LatticeSystem::Orthorhombic | LatticeSystem::Monoclinic | LatticeSystem::Triclinic => {
            &[("a", lattice.a), ("b", lattice.b), ("c", lattice.c)]
        }
    };
    for (name, value) in used {
        if *value == 0.0 {
            return Err(RowlandError::division_by_zero(format!(
                "{} d-spacing (lattice constant {} = 0)",
                system, name
            )));
        }
        if !value.is_finite() || *value < 0.0 {
            return Err(RowlandError::invalid_parameter(
                *name,
                *value,
                "lattice constant must be positive",
            ));
        }
    }
    Ok(())
}
