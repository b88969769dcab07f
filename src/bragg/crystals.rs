//! # 分析晶体与反射
//!
//! 常用分析晶体预设（Si、Ge、InSb、SiO2）、反射记号解析
//! （`Si(111)`、`ge 4 4 0`、`SiO2(100)`）以及按能量搜索可用反射。
//!
//! ## 依赖关系
//! - 被 `commands/instrument.rs`（`--reflection`）和 `commands/crystal.rs` 使用
//! - 使用 `bragg/lattice.rs`, `bragg/mod.rs`

use crate::bragg::energy_to_bragg_angle;
use crate::bragg::lattice::{d_spacing_for_lattice, LatticeConstants, LatticeSystem, Miller};
use crate::error::{RowlandError, Result};

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Si 晶格常数 (Å, 25 °C)
pub const SI_ALAT: f64 = 5.431065;
/// Ge 晶格常数 (Å, 25 °C)
pub const GE_ALAT: f64 = 5.6579060;
/// InSb 晶格常数 (Å)
pub const INSB_ALAT: f64 = 6.48;
/// β-石英 (六方) 晶格常数 a, c (Å)
pub const SIO2_A: f64 = 4.913;
pub const SIO2_C: f64 = 5.405;

/// 反射搜索时 Miller 指数的上限（不含）
pub const HKL_MAX: i32 = 30;

const REFLECTION_PATTERN: &str = r"^\s*([A-Za-z]+\d*?)\s*\(?\s*(\d+(?:\s+\d+){2}|\d{3})\s*\)?\s*$";

lazy_static::lazy_static! {
    static ref REFLECTION_RE: std::result::Result<Regex, regex::Error> =
        Regex::new(REFLECTION_PATTERN);
}

/// 分析晶体
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Crystal {
    pub name: &'static str,
    pub system: LatticeSystem,
    pub lattice: LatticeConstants,
}

impl Crystal {
    pub fn silicon() -> Self {
        Crystal {
            name: "Si",
            system: LatticeSystem::Cubic,
            lattice: LatticeConstants::cubic(SI_ALAT),
        }
    }

    pub fn germanium() -> Self {
        Crystal {
            name: "Ge",
            system: LatticeSystem::Cubic,
            lattice: LatticeConstants::cubic(GE_ALAT),
        }
    }

    pub fn indium_antimonide() -> Self {
        Crystal {
            name: "InSb",
            system: LatticeSystem::Cubic,
            lattice: LatticeConstants::cubic(INSB_ALAT),
        }
    }

    pub fn quartz() -> Self {
        Crystal {
            name: "SiO2",
            system: LatticeSystem::Hexagonal,
            lattice: LatticeConstants::hexagonal(SIO2_A, SIO2_C),
        }
    }

    /// 所有预设
    pub fn presets() -> [Crystal; 4] {
        [
            Crystal::silicon(),
            Crystal::germanium(),
            Crystal::indium_antimonide(),
            Crystal::quartz(),
        ]
    }

    /// 按名称查找预设（不区分大小写）
    pub fn by_name(name: &str) -> Option<Crystal> {
        Crystal::presets()
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn d_spacing(&self, hkl: Miller) -> Result<f64> {
        d_spacing_for_lattice(self.system, &self.lattice, hkl)
    }
}

/// 晶体 + 反射面
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reflection {
    pub crystal: Crystal,
    pub hkl: Miller,
}

impl Reflection {
    pub fn new(crystal: Crystal, hkl: Miller) -> Self {
        Reflection { crystal, hkl }
    }

    pub fn d_spacing(&self) -> Result<f64> {
        self.crystal.d_spacing(self.hkl)
    }
}

impl FromStr for Reflection {
    type Err = RowlandError;

    fn from_str(s: &str) -> Result<Self> {
        let re = REFLECTION_RE
            .as_ref()
            .map_err(|e| RowlandError::InvalidReflection(e.to_string()))?;
        let caps = re
            .captures(s)
            .ok_or_else(|| RowlandError::InvalidReflection(s.to_string()))?;

        let name = &caps[1];
        let crystal = Crystal::by_name(name).ok_or_else(|| {
            RowlandError::InvalidReflection(format!("unknown crystal '{}' in '{}'", name, s))
        })?;

        let raw = &caps[2];
        let indices: Vec<i32> = if raw.contains(char::is_whitespace) {
            raw.split_whitespace()
                .map(|t| t.parse::<i32>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| RowlandError::InvalidReflection(s.to_string()))?
        } else {
            raw.chars()
                .filter_map(|c| c.to_digit(10))
                .map(|d| d as i32)
                .collect()
        };

        match indices.as_slice() {
            [h, k, l] => {
                let hkl = Miller::new(*h, *k, *l);
                if hkl.is_zero() {
                    return Err(RowlandError::InvalidReflection(format!(
                        "(000) is not a reflection: '{}'",
                        s
                    )));
                }
                Ok(Reflection::new(crystal, hkl))
            }
            _ => Err(RowlandError::InvalidReflection(s.to_string())),
        }
    }
}

impl fmt::Display for Reflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.crystal.name, self.hkl)
    }
}

/// 反射搜索结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReflectionMatch {
    pub reflection: Reflection,
    pub d_spacing: f64,
    pub bragg_angle: f64,
}

/// 金刚石/闪锌矿结构的允许反射：全奇，或全偶且 h+k+l ≡ 0 (mod 4)
fn is_allowed_fcc(h: i32, k: i32, l: i32) -> bool {
    let all_odd = h % 2 == 1 && k % 2 == 1 && l % 2 == 1;
    let all_even = h % 2 == 0 && k % 2 == 0 && l % 2 == 0;
    all_odd || (all_even && (h + k + l) % 4 == 0)
}

/// h ≥ k ≥ l 的指数组合，从大到小
fn descending_triplets(values: &[i32]) -> Vec<Miller> {
    let mut out = Vec::new();
    for (i, &h) in values.iter().enumerate() {
        for (j, &k) in values.iter().enumerate().skip(i) {
            for &l in values.iter().skip(j) {
                out.push(Miller::new(h, k, l));
            }
        }
    }
    out
}

/// 在给定能量 (eV) 下搜索 Bragg 角 ≥ `theta_min` (deg) 的反射
///
/// 只考虑立方晶体预设；非立方晶体被跳过。
pub fn find_reflections(
    energy: f64,
    theta_min: f64,
    crystals: &[Crystal],
) -> Result<Vec<ReflectionMatch>> {
    if !energy.is_finite() || energy <= 0.0 {
        return Err(RowlandError::invalid_parameter(
            "energy",
            energy,
            "photon energy must be positive",
        ));
    }

    let odd: Vec<i32> = (1..HKL_MAX).step_by(2).rev().collect();
    let even: Vec<i32> = (0..HKL_MAX).step_by(2).rev().collect();

    let mut matches = Vec::new();
    for crystal in crystals {
        if crystal.system != LatticeSystem::Cubic {
            log::debug!("skipping non-cubic crystal {} in reflection search", crystal.name);
            continue;
        }
        for hkl in descending_triplets(&odd)
            .into_iter()
            .chain(descending_triplets(&even))
        {
            if hkl.is_zero() || !is_allowed_fcc(hkl.h, hkl.k, hkl.l) {
                continue;
            }
            let d = crystal.d_spacing(hkl)?;
            // 能量不足以满足该反射的 Bragg 条件
            let Ok(theta) = energy_to_bragg_angle(energy, d) else {
                continue;
            };
            if theta >= theta_min {
                matches.push(ReflectionMatch {
                    reflection: Reflection::new(*crystal, hkl),
                    d_spacing: d,
                    bragg_angle: theta,
                });
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_parse_compact() {
        let r: Reflection = "Si(111)".parse().unwrap();
        assert_eq!(r.crystal.name, "Si");
        assert_eq!(r.hkl, Miller::new(1, 1, 1));
        assert_abs_diff_eq!(r.d_spacing().unwrap(), 3.1356, epsilon = 1e-4);
        assert_eq!(r.to_string(), "Si(111)");
    }

    #[test]
    fn test_parse_spaced_and_case() {
        let r: Reflection = "ge 4 4 0".parse().unwrap();
        assert_eq!(r.crystal.name, "Ge");
        assert_eq!(r.hkl, Miller::new(4, 4, 0));

        let r: Reflection = "Si(12 4 0)".parse().unwrap();
        assert_eq!(r.hkl, Miller::new(12, 4, 0));
    }

    #[test]
    fn test_parse_quartz() {
        let r: Reflection = "SiO2(100)".parse().unwrap();
        assert_eq!(r.crystal.name, "SiO2");
        assert_eq!(r.crystal.system, LatticeSystem::Hexagonal);
        assert_abs_diff_eq!(r.d_spacing().unwrap(), SIO2_A * 3.0_f64.sqrt() / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["Xx(111)", "Si(11)", "Si(000)", "", "111"] {
            assert!(
                matches!(bad.parse::<Reflection>(), Err(RowlandError::InvalidReflection(_))),
                "'{}' should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_shared_pattern_across_threads() {
        assert!(REFLECTION_RE.is_ok());
        let parsed: Vec<Miller> = std::thread::scope(|scope| {
            let handles: Vec<_> = ["Si(111)", "Ge(440)", "si 3 3 3", "InSb(220)"]
                .into_iter()
                .map(|text| scope.spawn(move || text.parse::<Reflection>().unwrap().hkl))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(
            parsed,
            vec![
                Miller::new(1, 1, 1),
                Miller::new(4, 4, 0),
                Miller::new(3, 3, 3),
                Miller::new(2, 2, 0)
            ]
        );
    }

    #[test]
    fn test_allowed_reflections() {
        assert!(is_allowed_fcc(1, 1, 1));
        assert!(is_allowed_fcc(4, 4, 0));
        assert!(!is_allowed_fcc(2, 0, 0));
        assert!(!is_allowed_fcc(2, 1, 0));
    }

    #[test]
    fn test_find_reflections_cu_kalpha() {
        // Cu Kα1 8047.8 eV：Si(444) 约 79.3 deg
        let found = find_reflections(8047.8, 75.0, &[Crystal::silicon()]).unwrap();
        assert!(!found.is_empty());
        let si444 = found
            .iter()
            .find(|m| m.reflection.hkl == Miller::new(4, 4, 4))
            .unwrap();
        assert!(si444.bragg_angle > 79.0 && si444.bragg_angle < 80.0);
        assert!(found.iter().all(|m| m.bragg_angle >= 75.0));
        assert!(found
            .iter()
            .all(|m| m.reflection.hkl.h >= m.reflection.hkl.k && m.reflection.hkl.k >= m.reflection.hkl.l));
    }

    #[test]
    fn test_find_reflections_skips_quartz() {
        let found = find_reflections(8047.8, 10.0, &[Crystal::quartz()]).unwrap();
        assert!(found.is_empty());
        assert!(find_reflections(0.0, 10.0, &[Crystal::silicon()]).is_err());
    }
}
