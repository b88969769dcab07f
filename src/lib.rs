//! # Rowland - Rowland 圆 X 射线谱仪几何
//!
//! 给定 Bragg 角（或能量），计算样品、分析晶体、探测器在 Rowland 圆上的位置，
//! 以及侧分析晶体、弯晶器等机械量。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── geometry/   (向量、圆、平面、旋转)
//!   ├── bragg/      (Bragg 定律、晶系面间距、反射)
//!   ├── rowland/    (Rowland 圆核心与水平/垂直坐标系)
//!   ├── scan/       (并行扫描与 CSV 输出)
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   ├── utils/      (输出与进度条)
//!   └── error.rs    (错误处理)
//! ```

pub mod bragg;
pub mod cli;
pub mod commands;
pub mod error;
pub mod geometry;
pub mod rowland;
pub mod scan;
pub mod utils;

pub use error::{Result, RowlandError};
