// crates/ct_physics/src/kernels/mod.rs

//! 单元核函数
//!
//! 每个核函数对应湍流方程中的一个源项，消费批次临时数据，
//! 向单元局部残差与 Jacobian 累加贡献。
//!
//! # 设计
//!
//! | 变体 | 方程 | 额外收集字段 |
//! |------|------|--------------|
//! | [`TkeSstSrcKernel`] | k | - |
//! | [`TkeSstDesSrcKernel`] | k (DES) | `sst_max_length_scale`, `sst_f_one_blending` |
//! | [`SdrSstSrcKernel`] | ω | `sst_f_one_blending` |
//!
//! 核函数以拓扑特征 `T: AlgTraits` 为泛型参数单态化。装配算法持有封闭枚举
//! [`SstSourceKernel`]，按变体静态分派，不经过虚函数表。
//!
//! 三个变体共享同一积分骨架：外层积分点、内层单元节点、最内层空间维度。
//! 秩 2 张量按行主序 `dim * row + col` 寻址。

mod common;
mod sdr_sst;
mod tke_sst;
mod tke_sst_des;

pub use common::{check_master_element, nodal_production, SstFields};
pub use sdr_sst::SdrSstSrcKernel;
pub use tke_sst::TkeSstSrcKernel;
pub use tke_sst_des::TkeSstDesSrcKernel;

use crate::fields::FieldRegistry;
use crate::linsys::LocalMatrix;
use crate::requests::ElemDataRequests;
use crate::scratch::ScratchViews;
use crate::topology::AlgTraits;
use ct_config::SolutionOptions;
use ct_foundation::CtResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单元核函数接口
///
/// # 约定
///
/// - 只向 `lhs`/`rhs` 累加，不清零、不读回本次调用已累加的值
/// - 单元循环内不返回错误，数值退化以非有限值传播
pub trait Kernel<T: AlgTraits>: Send + Sync {
    /// 核函数名称
    fn name(&self) -> &'static str;

    /// 计算单个单元的贡献
    fn execute(&self, lhs: &mut LocalMatrix, rhs: &mut [f64], scratch: &ScratchViews<T>);
}

/// SST 源项种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SstSourceKind {
    /// 湍动能
    TkeSst,
    /// 湍动能（DES）
    TkeSstDes,
    /// 比耗散率
    SdrSst,
}

impl SstSourceKind {
    /// 全部种类
    pub const ALL: [SstSourceKind; 3] = [Self::TkeSst, Self::TkeSstDes, Self::SdrSst];

    /// 名称
    pub fn name(self) -> &'static str {
        match self {
            Self::TkeSst => "tke_sst",
            Self::TkeSstDes => "tke_sst_des",
            Self::SdrSst => "sdr_sst",
        }
    }
}

impl fmt::Display for SstSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SST 源项核函数（封闭变体集）
#[derive(Debug, Clone)]
pub enum SstSourceKernel<T: AlgTraits> {
    /// 湍动能
    TkeSst(TkeSstSrcKernel<T>),
    /// 湍动能（DES）
    TkeSstDes(TkeSstDesSrcKernel<T>),
    /// 比耗散率
    SdrSst(SdrSstSrcKernel<T>),
}

impl<T: AlgTraits> SstSourceKernel<T> {
    /// 构建指定种类的核函数
    ///
    /// 解析字段与模型常数，并向 `requests` 声明数据需求。
    /// 任一字段或常数缺失均在此返回配置错误。
    pub fn build(
        kind: SstSourceKind,
        fields: &FieldRegistry,
        options: &SolutionOptions,
        requests: &mut ElemDataRequests,
    ) -> CtResult<Self> {
        Ok(match kind {
            SstSourceKind::TkeSst => Self::TkeSst(TkeSstSrcKernel::new(fields, options, requests)?),
            SstSourceKind::TkeSstDes => {
                Self::TkeSstDes(TkeSstDesSrcKernel::new(fields, options, requests)?)
            }
            SstSourceKind::SdrSst => Self::SdrSst(SdrSstSrcKernel::new(fields, options, requests)?),
        })
    }

    /// 种类
    pub fn kind(&self) -> SstSourceKind {
        match self {
            Self::TkeSst(_) => SstSourceKind::TkeSst,
            Self::TkeSstDes(_) => SstSourceKind::TkeSstDes,
            Self::SdrSst(_) => SstSourceKind::SdrSst,
        }
    }
}

impl<T: AlgTraits> Kernel<T> for SstSourceKernel<T> {
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    #[inline]
    fn execute(&self, lhs: &mut LocalMatrix, rhs: &mut [f64], scratch: &ScratchViews<T>) {
        match self {
            Self::TkeSst(k) => k.execute(lhs, rhs, scratch),
            Self::TkeSstDes(k) => k.execute(lhs, rhs, scratch),
            Self::SdrSst(k) => k.execute(lhs, rhs, scratch),
        }
    }
}
