// crates/ct_physics/src/requests.rs

//! 单元数据需求声明
//!
//! 核函数在构造期向共享的 [`ElemDataRequests`] 声明：
//! - 所需参考单元（拓扑）
//! - 需要收集的节点字段及分量数
//! - 需要计算的几何量（子体积、梯度算子）及其坐标配置
//!
//! 声明只修改注册表，不做任何计算。批次迭代器据此规划所有活动核函数
//! 共享的最小收集/几何计算量。
//!
//! # 示例
//!
//! ```rust
//! use ct_physics::fields::{FieldKind, FieldStore};
//! use ct_physics::requests::{CoordsConfig, ElemDataRequests, MeOperator};
//! use ct_physics::topology::TopologyKind;
//!
//! let mut store = FieldStore::new(3, 8);
//! let coords = store.register("coordinates", FieldKind::Vector).unwrap();
//! let tke = store.register("turbulent_ke", FieldKind::Scalar).unwrap();
//!
//! let mut reqs = ElemDataRequests::new();
//! reqs.add_cvfem_volume_me(TopologyKind::Hex8).unwrap();
//! reqs.add_coordinates_field(coords, 3, CoordsConfig::Current).unwrap();
//! reqs.add_gathered_nodal_field(tke, 1).unwrap();
//! reqs.add_gathered_nodal_field(tke, 1).unwrap();
//! reqs.add_master_element_call(MeOperator::ScvVolume, CoordsConfig::Current);
//!
//! assert_eq!(reqs.fields().len(), 1);
//! assert!(reqs.validate().is_ok());
//! ```

use crate::fields::FieldHandle;
use crate::topology::TopologyKind;
use ct_foundation::{CtError, CtResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 坐标配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordsConfig {
    /// 当前（可能已变形的）坐标
    Current,
    /// 模型（初始）坐标
    Model,
}

impl CoordsConfig {
    /// 全部配置
    pub const ALL: [CoordsConfig; 2] = [Self::Current, Self::Model];

    /// 数组下标
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Model => 1,
        }
    }
}

/// 参考单元几何算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeOperator {
    /// 子控制体体积
    ScvVolume,
    /// 子控制体梯度算子
    ScvGradOp,
}

/// 需要收集的节点字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatheredField {
    /// 字段句柄
    pub field: FieldHandle,
    /// 每节点收集的分量数
    pub n_comp: usize,
}

/// 坐标字段声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordsRequest {
    /// 坐标字段
    pub field: FieldHandle,
    /// 空间维数
    pub dim: usize,
}

/// 单元数据需求注册表
#[derive(Debug, Clone, Default)]
pub struct ElemDataRequests {
    topology: Option<TopologyKind>,
    fields: Vec<GatheredField>,
    coords: [Option<CoordsRequest>; 2],
    me_calls: BTreeSet<(CoordsConfig, MeOperator)>,
}

impl ElemDataRequests {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明 CVFEM 体参考单元
    ///
    /// 一个注册表只服务一种拓扑，再次声明不同拓扑返回 `TopologyMismatch`。
    pub fn add_cvfem_volume_me(&mut self, kind: TopologyKind) -> CtResult<()> {
        match self.topology {
            Some(existing) if existing != kind => Err(CtError::topology_mismatch(format!(
                "数据需求已绑定 {existing}, 不能再声明 {kind}"
            ))),
            _ => {
                self.topology = Some(kind);
                Ok(())
            }
        }
    }

    /// 声明坐标字段
    pub fn add_coordinates_field(
        &mut self,
        field: FieldHandle,
        dim: usize,
        config: CoordsConfig,
    ) -> CtResult<()> {
        if field.components() != dim {
            return Err(CtError::field_rank_mismatch(
                format!("coordinates#{}", field.id()),
                dim,
                field.components(),
            ));
        }
        let slot = &mut self.coords[config.index()];
        if let Some(existing) = slot {
            if existing.field != field {
                return Err(CtError::config(format!(
                    "坐标配置 {config:?} 已绑定字段 #{}",
                    existing.field.id()
                )));
            }
        }
        *slot = Some(CoordsRequest { field, dim });
        Ok(())
    }

    /// 声明需要收集的节点字段
    ///
    /// 重复声明去重并保留首次声明顺序；分量数冲突返回 `FieldRankMismatch`。
    pub fn add_gathered_nodal_field(&mut self, field: FieldHandle, n_comp: usize) -> CtResult<()> {
        if n_comp == 0 || n_comp > field.components() {
            return Err(CtError::field_rank_mismatch(
                format!("field#{}", field.id()),
                n_comp,
                field.components(),
            ));
        }
        if let Some(existing) = self.fields.iter().find(|g| g.field == field) {
            if existing.n_comp != n_comp {
                return Err(CtError::field_rank_mismatch(
                    format!("field#{}", field.id()),
                    existing.n_comp,
                    n_comp,
                ));
            }
            return Ok(());
        }
        self.fields.push(GatheredField { field, n_comp });
        Ok(())
    }

    /// 声明几何算子调用（集合语义）
    pub fn add_master_element_call(&mut self, op: MeOperator, config: CoordsConfig) {
        self.me_calls.insert((config, op));
    }

    /// 绑定的拓扑
    #[inline]
    pub fn topology(&self) -> Option<TopologyKind> {
        self.topology
    }

    /// 需要收集的字段（声明顺序）
    #[inline]
    pub fn fields(&self) -> &[GatheredField] {
        &self.fields
    }

    /// 指定配置的坐标字段
    #[inline]
    pub fn coordinates(&self, config: CoordsConfig) -> Option<CoordsRequest> {
        self.coords[config.index()]
    }

    /// 是否声明了某个几何算子
    #[inline]
    pub fn has_me_call(&self, op: MeOperator, config: CoordsConfig) -> bool {
        self.me_calls.contains(&(config, op))
    }

    /// 全部几何算子调用（按配置、算子排序）
    pub fn me_calls(&self) -> impl Iterator<Item = (CoordsConfig, MeOperator)> + '_ {
        self.me_calls.iter().copied()
    }

    /// 检查声明的一致性
    ///
    /// 几何算子需要参考单元和对应配置的坐标字段，坐标维数需与拓扑一致。
    pub fn validate(&self) -> CtResult<()> {
        if self.me_calls.is_empty() {
            return Ok(());
        }
        let topo = self
            .topology
            .ok_or_else(|| CtError::config("声明了几何算子但未声明参考单元"))?;
        for (config, op) in self.me_calls() {
            let coords = self.coordinates(config).ok_or_else(|| {
                CtError::config(format!("{op:?} 需要 {config:?} 坐标字段"))
            })?;
            if coords.dim != topo.n_dim() {
                return Err(CtError::topology_mismatch(format!(
                    "{topo} 需要 {} 维坐标, 声明为 {}",
                    topo.n_dim(),
                    coords.dim
                )));
            }
        }
        Ok(())
    }
}
