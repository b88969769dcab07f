//! # 扫描模块
//!
//! 在 Bragg 角或能量区间上批量计算 `info(θ)`，并导出 CSV 表格。
//!
//! ## 子模块
//! - `runner`: 基于 rayon 的并行扫描
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 使用
//! - 使用 `rowland/frame.rs`
//! - 使用 `csv` 输出

pub mod runner;

pub use runner::{ScanResult, ScanRunner};

use crate::error::{RowlandError, Result};
use crate::rowland::RowlandInfo;

use serde::Serialize;
use std::fmt;
use std::io::Write;

/// 扫描变量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAxis {
    /// Bragg 角 (deg)
    Angle,
    /// 能量 (eV)
    Energy,
}

impl fmt::Display for ScanAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanAxis::Angle => write!(f, "theta"),
            ScanAxis::Energy => write!(f, "energy"),
        }
    }
}

/// 等间距扫描区间（含端点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanRange {
    pub axis: ScanAxis,
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl ScanRange {
    pub fn new(axis: ScanAxis, start: f64, end: f64, points: usize) -> Result<Self> {
        if points == 0 {
            return Err(RowlandError::InvalidRange(format!(
                "{}-{} with zero points",
                start, end
            )));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(RowlandError::InvalidRange(format!("{}-{}", start, end)));
        }
        Ok(ScanRange {
            axis,
            start,
            end,
            points,
        })
    }

    /// 解析 `"start-end"` 或 `"start:end"` 形式的区间
    ///
    /// 起点可以为负（`"-5-5"`）；开头的负号不作分隔符。
    pub fn parse(axis: ScanAxis, expr: &str, points: usize) -> Result<Self> {
        let invalid = || RowlandError::InvalidRange(expr.to_string());
        let text = expr.trim();
        let split = match text.find(':') {
            Some(pos) => Some(pos),
            None => text
                .char_indices()
                .skip(1)
                .find(|&(_, c)| c == '-')
                .map(|(pos, _)| pos),
        };
        let pos = split.ok_or_else(invalid)?;
        let start: f64 = text[..pos].trim().parse().map_err(|_| invalid())?;
        let end: f64 = text[pos + 1..].trim().parse().map_err(|_| invalid())?;
        Self::new(axis, start, end, points)
    }

    /// 区间内的采样值
    pub fn values(&self) -> Vec<f64> {
        if self.points == 1 {
            return vec![self.start];
        }
        let step = (self.end - self.start) / (self.points - 1) as f64;
        (0..self.points)
            .map(|i| {
                if i == self.points - 1 {
                    self.end
                } else {
                    self.start + step * i as f64
                }
            })
            .collect()
    }
}

/// CSV 中的一行（坐标展开为独立列）
#[derive(Debug, Clone, Serialize)]
pub struct ScanRecord {
    pub theta_deg: f64,
    pub energy_ev: f64,
    pub axial_offset: f64,
    pub sagittal_offset: f64,
    pub analyzer_x: f64,
    pub analyzer_y: f64,
    pub analyzer_z: f64,
    pub detector_x: f64,
    pub detector_y: f64,
    pub detector_z: f64,
    pub p: f64,
    pub q: f64,
    pub sample_detector: f64,
    pub sagittal_radius: f64,
}

impl From<&RowlandInfo> for ScanRecord {
    fn from(info: &RowlandInfo) -> Self {
        ScanRecord {
            theta_deg: info.bragg_angle,
            energy_ev: info.energy,
            axial_offset: info.axial_offset,
            sagittal_offset: info.sagittal_offset,
            analyzer_x: info.analyzer.x,
            analyzer_y: info.analyzer.y,
            analyzer_z: info.analyzer.z,
            detector_x: info.detector.x,
            detector_y: info.detector.y,
            detector_z: info.detector.z,
            p: info.p,
            q: info.q,
            sample_detector: info.sample_detector,
            sagittal_radius: info.sagittal_radius,
        }
    }
}

/// 将扫描结果写为 CSV
pub fn write_csv<W: Write>(records: &[RowlandInfo], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for info in records {
        wtr.serialize(ScanRecord::from(info))?;
    }
    wtr.flush()?;
    Ok(())
}
