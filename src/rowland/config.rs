//! # Rowland 圆配置
//!
//! 圆半径、晶面间距、参考角、斜切角、零点偏移，以及分析晶体排布
//! 和弯晶器机构参数。所有结构都可用 `serde` 序列化，便于嵌入上层配置。
//!
//! ## 依赖关系
//! - 被 `rowland/core.rs`, `rowland/sagittal.rs`, `rowland/bender.rs` 使用
//! - 被 `commands/instrument.rs` 构造

use crate::bragg::energy_to_bragg_angle;
use crate::error::{RowlandError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rowland 圆配置
///
/// 参考角 `reference_angle` 是权威值，参考能量由 `RowlandCircle` 计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowlandConfig {
    /// Rowland 圆半径 Rm (mm)，晶体弯曲半径为 2·Rm
    pub radius: f64,
    /// 晶面间距 d (Å)
    pub d_spacing: f64,
    /// 中心分析晶体的 Bragg 角 (deg)
    pub reference_angle: f64,
    /// 斜切角 α (deg)，对称晶体为 0
    #[serde(default)]
    pub miscut: f64,
    /// 轴向零点偏移 (mm)
    #[serde(default)]
    pub axial_offset0: f64,
    /// 弧矢零点偏移 (mm)
    #[serde(default)]
    pub sagittal_offset0: f64,
    #[serde(default)]
    pub analyser: AnalyserLayout,
    #[serde(default)]
    pub bender: BenderParameters,
}

impl RowlandConfig {
    pub fn new(radius: f64, d_spacing: f64, reference_angle: f64) -> Self {
        RowlandConfig {
            radius,
            d_spacing,
            reference_angle,
            miscut: 0.0,
            axial_offset0: 0.0,
            sagittal_offset0: 0.0,
            analyser: AnalyserLayout::default(),
            bender: BenderParameters::default(),
        }
    }

    /// 由参考能量 (eV) 构造，参考角按 Bragg 定律求出
    pub fn from_energy(radius: f64, d_spacing: f64, energy: f64) -> Result<Self> {
        let angle = energy_to_bragg_angle(energy, d_spacing)?;
        Ok(Self::new(radius, d_spacing, angle))
    }

    pub fn with_miscut(mut self, miscut: f64) -> Self {
        self.miscut = miscut;
        self
    }

    pub fn with_zero_offsets(mut self, axial_offset0: f64, sagittal_offset0: f64) -> Self {
        self.axial_offset0 = axial_offset0;
        self.sagittal_offset0 = sagittal_offset0;
        self
    }

    pub fn with_analyser(mut self, analyser: AnalyserLayout) -> Self {
        self.analyser = analyser;
        self
    }

    pub fn with_bender(mut self, bender: BenderParameters) -> Self {
        self.bender = bender;
        self
    }

    /// 检查与参考角无关的静态参数
    pub(crate) fn validate_static(&self) -> Result<()> {
        positive("radius", self.radius)?;
        positive("d_spacing", self.d_spacing)?;
        finite("miscut", self.miscut)?;
        if self.miscut.abs() >= 90.0 {
            return Err(RowlandError::invalid_parameter(
                "miscut",
                self.miscut,
                "miscut must lie in (-90, 90) deg",
            ));
        }
        finite("axial_offset0", self.axial_offset0)?;
        finite("sagittal_offset0", self.sagittal_offset0)?;
        self.analyser.validate()?;
        self.bender.validate()
    }
}

/// 分析晶体排布
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyserLayout {
    /// 光学宽度 aW (mm)
    pub width: f64,
    /// 扩展宽度 aWext (mm)，相邻晶体相切的条件
    pub extended_width: f64,
    /// `extended_width` 所对应的弧矢半径增量 rSext (mm)
    pub sagittal_radius_ext: f64,
    /// 晶体中心到 χ 转轴的距离 aL (mm)
    pub pivot_distance: f64,
}

impl AnalyserLayout {
    fn validate(&self) -> Result<()> {
        non_negative("analyser width", self.width)?;
        non_negative("analyser extended width", self.extended_width)?;
        finite("sagittal radius offset", self.sagittal_radius_ext)?;
        non_negative("pivot distance", self.pivot_distance)
    }
}

/// 弯晶器机构版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BenderVersion {
    /// 原型机：两臂夹角固定
    #[default]
    Prototype,
    /// 2017 年缩放仪版本
    Pantograph2017,
}

impl TryFrom<u8> for BenderVersion {
    type Error = RowlandError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(BenderVersion::Prototype),
            1 => Ok(BenderVersion::Pantograph2017),
            other => Err(RowlandError::UnsupportedBenderVersion(other.to_string())),
        }
    }
}

impl From<BenderVersion> for u8 {
    fn from(v: BenderVersion) -> u8 {
        match v {
            BenderVersion::Prototype => 0,
            BenderVersion::Pantograph2017 => 1,
        }
    }
}

impl FromStr for BenderVersion {
    type Err = RowlandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "prototype" => Ok(BenderVersion::Prototype),
            "1" | "pantograph" | "pantograph2017" => Ok(BenderVersion::Pantograph2017),
            _ => Err(RowlandError::UnsupportedBenderVersion(s.to_string())),
        }
    }
}

impl fmt::Display for BenderVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenderVersion::Prototype => write!(f, "prototype"),
            BenderVersion::Pantograph2017 => write!(f, "pantograph 2017"),
        }
    }
}

/// 弯晶器所在的一侧（沿轴向看向样品）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotSide {
    Left,
    #[default]
    Right,
}

impl PivotSide {
    /// 轴向坐标符号：左侧 -1，右侧 +1
    pub fn sign(&self) -> f64 {
        match self {
            PivotSide::Left => -1.0,
            PivotSide::Right => 1.0,
        }
    }
}

impl TryFrom<i8> for PivotSide {
    type Error = RowlandError;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            -1 => Ok(PivotSide::Left),
            1 => Ok(PivotSide::Right),
            other => Err(RowlandError::InvalidPivotSide(other.to_string())),
        }
    }
}

impl FromStr for PivotSide {
    type Err = RowlandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "-1" => Ok(PivotSide::Left),
            "right" | "1" | "+1" => Ok(PivotSide::Right),
            _ => Err(RowlandError::InvalidPivotSide(s.to_string())),
        }
    }
}

impl fmt::Display for PivotSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotSide::Left => write!(f, "left"),
            PivotSide::Right => write!(f, "right"),
        }
    }
}

/// 弯晶器机构参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenderParameters {
    pub version: BenderVersion,
    /// 臂 0 长度 (mm)
    pub arm0: f64,
    /// 臂 1 长度 (mm)
    pub arm1: f64,
    /// 原型机：两臂夹角 (deg)；2017 版：锚点到作动器的长度 (mm)
    pub third: f64,
    /// 作动器轴向偏移 (mm)
    pub actuator_axial: f64,
    /// 作动器臂长 (mm)
    pub actuator_arm: f64,
    pub pivot_side: PivotSide,
    /// 弯晶器所连接的最外侧分析晶体序号（中心为 0）
    pub analyser_index: u32,
}

impl Default for BenderParameters {
    fn default() -> Self {
        BenderParameters {
            version: BenderVersion::Prototype,
            arm0: 0.0,
            arm1: 0.0,
            third: 0.0,
            actuator_axial: 0.0,
            actuator_arm: 0.0,
            pivot_side: PivotSide::Right,
            analyser_index: 5,
        }
    }
}

impl BenderParameters {
    fn validate(&self) -> Result<()> {
        non_negative("bender arm0", self.arm0)?;
        non_negative("bender arm1", self.arm1)?;
        finite("bender third parameter", self.third)?;
        finite("actuator axial offset", self.actuator_axial)?;
        non_negative("actuator arm", self.actuator_arm)
    }
}

fn finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RowlandError::invalid_parameter(name, value, "value must be finite"))
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(RowlandError::invalid_parameter(name, value, "value must be positive"));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(RowlandError::invalid_parameter(
            name,
            value,
            "value must not be negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_side_parsing() {
        assert_eq!("left".parse::<PivotSide>().unwrap(), PivotSide::Left);
        assert_eq!("+1".parse::<PivotSide>().unwrap(), PivotSide::Right);
        assert_eq!(PivotSide::try_from(-1).unwrap(), PivotSide::Left);
        assert!(matches!(
            PivotSide::try_from(0),
            Err(RowlandError::InvalidPivotSide(_))
        ));
        assert!(matches!(
            "up".parse::<PivotSide>(),
            Err(RowlandError::InvalidPivotSide(_))
        ));
        assert_eq!(PivotSide::Left.sign(), -1.0);
    }

    #[test]
    fn test_bender_version_parsing() {
        assert_eq!(BenderVersion::try_from(0).unwrap(), BenderVersion::Prototype);
        assert_eq!(
            "pantograph".parse::<BenderVersion>().unwrap(),
            BenderVersion::Pantograph2017
        );
        assert!(matches!(
            BenderVersion::try_from(2),
            Err(RowlandError::UnsupportedBenderVersion(_))
        ));
        assert_eq!(u8::from(BenderVersion::Pantograph2017), 1);
    }

    #[test]
    fn test_validate_static() {
        assert!(RowlandConfig::new(500.0, 3.1356, 75.0).validate_static().is_ok());
        assert!(RowlandConfig::new(0.0, 3.1356, 75.0).validate_static().is_err());
        assert!(RowlandConfig::new(500.0, -1.0, 75.0).validate_static().is_err());
        assert!(RowlandConfig::new(500.0, 3.1356, 75.0)
            .with_miscut(95.0)
            .validate_static()
            .is_err());
        let bad_layout = AnalyserLayout {
            width: -1.0,
            ..Default::default()
        };
        assert!(RowlandConfig::new(500.0, 3.1356, 75.0)
            .with_analyser(bad_layout)
            .validate_static()
            .is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = RowlandConfig::new(500.0, 3.1356, 75.0)
            .with_miscut(4.0)
            .with_bender(BenderParameters {
                version: BenderVersion::Pantograph2017,
                pivot_side: PivotSide::Left,
                arm0: 80.0,
                ..Default::default()
            });
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"version\":1"));
        assert!(json.contains("\"pivot_side\":\"left\""));
        let back: RowlandConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_json_defaults_and_rejects() {
        let config: RowlandConfig =
            serde_json::from_str(r#"{"radius": 1000.0, "d_spacing": 1.92, "reference_angle": 80.0}"#)
                .unwrap();
        assert_eq!(config, RowlandConfig::new(1000.0, 1.92, 80.0));

        let bad_version = r#"{"radius": 500.0, "d_spacing": 3.1356, "reference_angle": 75.0,
            "bender": {"version": 7, "arm0": 0.0, "arm1": 0.0, "third": 0.0,
                       "actuator_axial": 0.0, "actuator_arm": 0.0,
                       "pivot_side": "right", "analyser_index": 5}}"#;
        let err = serde_json::from_str::<RowlandConfig>(bad_version).unwrap_err();
        assert!(err.to_string().contains("7"));

        // 反序列化只检查格式，数值由 RowlandCircle 重新校验
        let negative: RowlandConfig =
            serde_json::from_str(r#"{"radius": -5.0, "d_spacing": 3.1356, "reference_angle": 75.0}"#)
                .unwrap();
        assert!(matches!(
            crate::rowland::RowlandCircle::with_config(negative),
            Err(RowlandError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_from_energy() {
        let config = RowlandConfig::from_energy(500.0, 3.1356, 2046.8).unwrap();
        assert!((config.reference_angle - 75.0).abs() < 0.01);
        assert!(RowlandConfig::from_energy(500.0, 3.1356, 100.0).is_err());
    }
}
