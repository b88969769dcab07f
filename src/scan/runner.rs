//! # 并行扫描执行器
//!
//! 在不可变的 Rowland 圆快照上并行计算各扫描点。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，结果按扫描顺序返回
//! - 每完成一个点调用一次进度回调
//! - 越界的扫描点单独收集，不影响其他点
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 调用
//! - 使用 `rowland/frame.rs`
//! - 使用 `rayon` 进行并行计算

use crate::error::Result;
use crate::rowland::{RowlandFrame, RowlandInfo};
use crate::scan::{ScanAxis, ScanRange};

use rayon::prelude::*;

/// 扫描结果统计
#[derive(Debug, Default)]
pub struct ScanResult {
    /// 成功计算的扫描点（按扫描顺序）
    pub records: Vec<RowlandInfo>,
    /// 失败的扫描点：(扫描值, 错误信息)
    pub failures: Vec<(f64, String)>,
}

impl ScanResult {
    /// 总扫描点数
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// 扫描执行器
pub struct ScanRunner {
    /// 并行作业数
    jobs: usize,
}

impl ScanRunner {
    /// 创建新的扫描执行器，`jobs = 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行扫描
    pub fn run<F, P>(&self, frame: &F, range: &ScanRange, on_point: P) -> Result<ScanResult>
    where
        F: RowlandFrame + Sync + ?Sized,
        P: Fn() + Sync + Send,
    {
        let values = range.values();
        log::debug!(
            "scanning {} points of {} on {} thread(s) in the {} frame",
            values.len(),
            range.axis,
            self.jobs,
            frame.frame_name()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;

        let outcomes: Vec<(f64, Result<RowlandInfo>)> = pool.install(|| {
            values
                .par_iter()
                .map(|&value| {
                    let outcome = match range.axis {
                        ScanAxis::Angle => frame.info(value),
                        ScanAxis::Energy => frame
                            .circle()
                            .bragg_angle_for_energy(value)
                            .and_then(|angle| frame.info(angle)),
                    };
                    on_point();
                    (value, outcome)
                })
                .collect()
        });

        // 汇总结果
        let mut result = ScanResult::default();
        for (value, outcome) in outcomes {
            match outcome {
                Ok(info) => result.records.push(info),
                Err(e) => {
                    log::warn!("scan point {} = {} skipped: {}", range.axis, value, e);
                    result.failures.push((value, e.to_string()));
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowland::{RcHoriz, RcVert, RowlandConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> RowlandConfig {
        RowlandConfig::new(500.0, 3.1356, 75.0)
    }

    #[test]
    fn test_scan_angles_in_order() {
        let rc = RcHoriz::with_config(config()).unwrap();
        let range = ScanRange::parse(ScanAxis::Angle, "35-85", 26).unwrap();
        let counter = AtomicUsize::new(0);
        let result = ScanRunner::new(4)
            .run(&rc, &range, || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(counter.load(Ordering::Relaxed), 26);
        assert_eq!(result.records.len(), 26);
        assert!(result.failures.is_empty());
        for pair in result.records.windows(2) {
            assert!(pair[0].bragg_angle < pair[1].bragg_angle);
            assert!(pair[0].energy > pair[1].energy);
        }
    }

    #[test]
    fn test_scan_energy_collects_failures() {
        let rc = RcVert::with_config(config()).unwrap();
        // 1500 eV 低于 Si(111) 的截止能量
        let range = ScanRange::parse(ScanAxis::Energy, "1500-2500", 11).unwrap();
        let result = ScanRunner::new(2).run(&rc, &range, || {}).unwrap();
        assert_eq!(result.total(), 11);
        assert!(!result.failures.is_empty());
        assert!(!result.records.is_empty());
        for info in &result.records {
            assert!(info.energy >= 1500.0 && info.energy <= 2500.0 + 1e-6);
        }
    }

    #[test]
    fn test_jobs_default() {
        assert!(ScanRunner::new(0).jobs() >= 1);
        assert_eq!(ScanRunner::new(3).jobs(), 3);
    }
}
