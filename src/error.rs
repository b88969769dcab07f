//! # 统一错误处理模块
//!
//! 定义 Rowland 几何引擎的所有错误类型，使用 `thiserror` 派生。
//!
//! 所有错误都是单次计算的前置条件违例：相同输入重试得到相同结果，
//! 不返回部分结果，也从不把错误静默转换成 `NaN`/`Inf`。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Rowland 统一错误类型
#[derive(Error, Debug)]
pub enum RowlandError {
    // ─────────────────────────────────────────────────────────────
    // 状态错误
    // ─────────────────────────────────────────────────────────────
    #[error("Rowland circle is not configured (radius and d-spacing required)")]
    NotConfigured,

    // ─────────────────────────────────────────────────────────────
    // Bragg / 数值错误
    // ─────────────────────────────────────────────────────────────
    #[error("{what} is outside the Bragg range: {reason}")]
    OutOfBraggRange { what: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 几何错误
    // ─────────────────────────────────────────────────────────────
    #[error("Points are collinear, no unique circle or plane through them")]
    CollinearPoints,

    #[error("Degenerate vector (norm below {epsilon:e})")]
    DegenerateVector { epsilon: f64 },

    #[error("Lines are parallel, no intersection")]
    ParallelLines,

    // ─────────────────────────────────────────────────────────────
    // 晶体 / 机构配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported lattice system: {0}")]
    UnsupportedLattice(String),

    #[error("Invalid reflection notation: {0}")]
    InvalidReflection(String),

    #[error("Invalid pivot side '{0}' (expected 'left'/-1 or 'right'/+1)")]
    InvalidPivotSide(String),

    #[error("Unsupported bender version: {0} (expected 0 = prototype, 1 = pantograph 2017)")]
    UnsupportedBenderVersion(String),

    #[error("Bender mechanism cannot reach the requested position: {0}")]
    MechanismOutOfReach(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 并行执行错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    // ─────────────────────────────────────────────────────────────
    // 输出错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to write output")]
    Io(#[from] std::io::Error),
}

impl RowlandError {
    /// 构造 Bragg 范围错误
    pub(crate) fn out_of_range(what: impl Into<String>, reason: impl Into<String>) -> Self {
        RowlandError::OutOfBraggRange {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// 构造除零错误
    pub(crate) fn division_by_zero(context: impl Into<String>) -> Self {
        RowlandError::DivisionByZero {
            context: context.into(),
        }
    }

    /// 构造参数错误
    pub(crate) fn invalid_parameter(
        name: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        RowlandError::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, RowlandError>;

/// 检查除数，避免 `NaN`/`Inf` 向外传播
pub(crate) fn checked_div(numerator: f64, divisor: f64, context: &str) -> Result<f64> {
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(RowlandError::division_by_zero(context));
    }
    let value = numerator / divisor;
    if !value.is_finite() {
        return Err(RowlandError::division_by_zero(context));
    }
    Ok(value)
}

/// 检查 `asin`/`acos` 的参数，越界时返回给定的错误
pub(crate) fn checked_unit_interval(value: f64, err: impl FnOnce() -> RowlandError) -> Result<f64> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(err())
    }
}
