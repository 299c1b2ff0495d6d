// crates/ct_physics/src/mesh/periodic.rs

//! 周期边界节点配对
//!
//! 周期边界上成对的节点在物理上重合，必须携带相同的字段值。
//! 诊断类算法在逐单元写入节点值后调用 [`PeriodicFieldUpdate`] 使两侧一致。

use crate::fields::{FieldHandle, FieldStore};
use ct_foundation::NodeIndex;
use serde::{Deserialize, Serialize};

/// 两侧取值的聚合策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodicPolicy {
    /// 从节点复制主节点的值
    #[default]
    First,
    /// 两侧取较大值
    Max,
    /// 两侧求和（用于累加型字段）
    Sum,
}

impl PeriodicPolicy {
    #[inline]
    fn combine(self, master: f64, slave: f64) -> f64 {
        match self {
            Self::First => master,
            Self::Max => master.max(slave),
            Self::Sum => master + slave,
        }
    }
}

/// 周期字段同步接口
pub trait PeriodicFieldUpdate {
    /// 按聚合策略同步字段的前 `n_comp` 个分量
    fn periodic_field_update(&self, store: &mut FieldStore, field: FieldHandle, n_comp: usize);
}

/// 周期节点配对 `(master, slave)`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodicPairing {
    pairs: Vec<(NodeIndex, NodeIndex)>,
    #[serde(default)]
    policy: PeriodicPolicy,
}

impl PeriodicPairing {
    /// 以指定策略创建空配对
    pub fn new(policy: PeriodicPolicy) -> Self {
        Self {
            pairs: Vec::new(),
            policy,
        }
    }

    /// 添加节点对
    pub fn add_pair(&mut self, master: NodeIndex, slave: NodeIndex) {
        self.pairs.push((master, slave));
    }

    /// 构建器风格添加节点对
    pub fn with_pair(mut self, master: usize, slave: usize) -> Self {
        self.add_pair(NodeIndex::new(master), NodeIndex::new(slave));
        self
    }

    /// 全部节点对
    #[inline]
    pub fn pairs(&self) -> &[(NodeIndex, NodeIndex)] {
        &self.pairs
    }

    /// 聚合策略
    #[inline]
    pub fn policy(&self) -> PeriodicPolicy {
        self.policy
    }

    /// 节点对数
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PeriodicFieldUpdate for PeriodicPairing {
    fn periodic_field_update(&self, store: &mut FieldStore, field: FieldHandle, n_comp: usize) {
        let stride = field.components();
        let n_comp = n_comp.min(stride);
        let values = store.values_mut(field);
        for &(master, slave) in &self.pairs {
            let (m, s) = (master.get() * stride, slave.get() * stride);
            for c in 0..n_comp {
                let v = self.policy.combine(values[m + c], values[s + c]);
                values[m + c] = v;
                values[s + c] = v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKind;

    fn store_with(values: &[f64]) -> (FieldStore, FieldHandle) {
        let mut store = FieldStore::new(3, values.len());
        let f = store.register("resolution_adequacy_parameter", FieldKind::Scalar).unwrap();
        store.values_mut(f).copy_from_slice(values);
        (store, f)
    }

    #[test]
    fn test_first_policy_copies_master() {
        let (mut store, f) = store_with(&[1.0, 2.0, 3.0, 4.0]);
        let pairing = PeriodicPairing::new(PeriodicPolicy::First).with_pair(0, 3);
        pairing.periodic_field_update(&mut store, f, 1);
        assert_eq!(store.values(f), &[1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_max_policy() {
        let (mut store, f) = store_with(&[1.0, 2.0, 3.0, 4.0]);
        let pairing = PeriodicPairing::new(PeriodicPolicy::Max).with_pair(0, 3);
        pairing.periodic_field_update(&mut store, f, 1);
        assert_eq!(store.values(f), &[4.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sum_policy() {
        let (mut store, f) = store_with(&[1.0, 2.0, 3.0, 4.0]);
        let pairing = PeriodicPairing::new(PeriodicPolicy::Sum).with_pair(1, 2);
        pairing.periodic_field_update(&mut store, f, 1);
        assert_eq!(store.values(f), &[1.0, 5.0, 5.0, 4.0]);
    }

    #[test]
    fn test_policy_serde() {
        let p: PeriodicPolicy = serde_json::from_str("\"max\"").unwrap();
        assert_eq!(p, PeriodicPolicy::Max);
    }
}
