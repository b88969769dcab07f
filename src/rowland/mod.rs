//! # Rowland 圆几何模块
//!
//! 弯晶分析晶体、探测器、侧分析晶体以及弯晶器随 Bragg 角扫描的几何位置。
//!
//! ## 子模块
//! - `config`: 配置与机构参数
//! - `core`: Rowland 圆核心（状态机、θ → 位置）
//! - `sagittal`: 侧分析晶体的弧矢聚焦
//! - `bender`: 弯晶器锚点与作动器行程
//! - `frame`: 坐标系变体的公共接口
//! - `horizontal`, `vertical`: 水平与垂直两种坐标系
//!
//! ## 依赖关系
//! - 被 `scan/` 和 `commands/` 使用
//! - 使用 `bragg/`, `geometry/`

pub mod bender;
pub mod config;
pub mod core;
pub mod frame;
pub mod horizontal;
pub mod sagittal;
pub mod vertical;

pub use self::core::{
    AnalyzerPosition, DetectorPosition, RowlandCircle, RowlandInfo, RowlandSolution,
};
pub use bender::BenderMotorPosition;
pub use config::{AnalyserLayout, BenderParameters, BenderVersion, PivotSide, RowlandConfig};
pub use frame::{MiscutCorrection, RowlandFrame};
pub use horizontal::{DetectorStagePosition, RcHoriz};
pub use sagittal::{analyser_center_x, SideOffsets};
pub use vertical::{RcVert, VerticalPosition};
