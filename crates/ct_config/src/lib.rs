// crates/ct_config/src/lib.rs

//! CvTurb Config Layer
//!
//! 配置层，提供求解选项与湍流模型常数表。
//!
//! # 模块概览
//!
//! - [`turb_constants`]: `TurbConstant` 标识与 SST 默认常数表
//! - [`solution_options`]: `SolutionOptions` 求解选项（JSON 读写、验证）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 3: ct_physics    ─> 核函数/算法在构造期查询常数
//! Layer 2: ct_config     ─> SolutionOptions, TurbModelConstants (本层)
//! Layer 1: ct_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod solution_options;
pub mod turb_constants;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use error::ConfigError;
pub use solution_options::{AssemblyOptions, ParallelStrategy, SolutionOptions, TurbulenceConfig};
pub use turb_constants::{TurbConstant, TurbModelConstants};
