// crates/ct_physics/src/algorithms/mod.rs

//! 节点诊断算法
//!
//! 独立于求解过程、直接写入节点字段的算法。

pub mod resolution_adequacy;

pub use resolution_adequacy::{resolution_adequacy, ComputeResolutionAdequacyElemAlgorithm};
