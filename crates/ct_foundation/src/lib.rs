// crates/ct_foundation/src/lib.rs

//! CvTurb Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`index`]: 强类型索引（节点/单元）
//! - [`error`]: 统一错误类型
//! - [`validation`]: 运行时验证报告
//!
//! # 示例
//!
//! ```
//! use ct_foundation::{CtError, CtResult, NodeIndex};
//!
//! fn lookup(n: NodeIndex, len: usize) -> CtResult<usize> {
//!     CtError::check_index("Node", n.get(), len)?;
//!     Ok(n.get())
//! }
//!
//! assert!(lookup(NodeIndex::new(3), 4).is_ok());
//! assert!(lookup(NodeIndex::new(4), 4).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod validation;

// 重导出常用类型
pub use error::{CtError, CtResult};
pub use index::{ElemIndex, Idx, NodeIndex};
pub use validation::{ValidationReport, ValidationWarning};

