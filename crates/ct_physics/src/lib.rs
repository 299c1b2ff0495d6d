// crates/ct_physics/src/lib.rs

//! SST 湍流模型的 CVFEM 单元核函数
//!
//! 提供控制体有限元离散下的湍流源项计算，包括：
//! - 单元拓扑 (topology) - 编译期拓扑特征与运行时分派
//! - 参考单元 (master_element) - 子控制体体积与梯度算子
//! - 节点字段 (fields) - 字段注册与存储
//! - 网格 (mesh) - 单元、选择器、周期配对
//! - 数据需求 (requests) / 临时数据 (scratch) - 批次收集与几何量共享
//! - 核函数 (kernels) - k / k-DES / ω 方程源项
//! - 装配 (assemble, registry) - 批次装配与按拓扑分派
//! - 诊断算法 (algorithms) - 分辨率充分性参数
//!
//! # 数据流
//!
//! ```text
//! 网格批次 → 收集节点字段 + 几何量 → 核函数逐积分点计算
//!          → 累加到单元 rhs/lhs → 散射到全局系统
//! ```
//!
//! 诊断算法独立运行：逐单元张量缩并 → 节点标量场 → 周期同步。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod assemble;
pub mod fields;
pub mod kernels;
pub mod linsys;
pub mod master_element;
pub mod mesh;
pub mod registry;
pub mod requests;
pub mod scratch;
pub mod topology;

pub use algorithms::ComputeResolutionAdequacyElemAlgorithm;
pub use assemble::{AssembleElemSolverAlgorithm, AssemblyStats, ElemSolverAlgorithm};
pub use fields::{FieldHandle, FieldKind, FieldRegistry, FieldStore};
pub use kernels::{
    Kernel, SdrSstSrcKernel, SstSourceKernel, SstSourceKind, TkeSstDesSrcKernel, TkeSstSrcKernel,
};
pub use linsys::{DenseLinearSystem, LinearSystemSink, LocalMatrix};
pub use master_element::{MasterElement, MasterElementRepo, ScvMasterElement};
pub use mesh::{ElementMesh, PeriodicFieldUpdate, PeriodicPairing, PeriodicPolicy, Selector};
pub use registry::SourceAlgorithmRegistry;
pub use requests::{CoordsConfig, ElemDataRequests, MeOperator};
pub use scratch::{MasterElementViews, ScratchViews};
pub use topology::{AlgTraits, TopologyKind, TopologyVisitor};
