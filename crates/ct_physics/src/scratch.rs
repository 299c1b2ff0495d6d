// crates/ct_physics/src/scratch.rs

//! 批次临时数据（Scratch Views）
//!
//! 按 [`ElemDataRequests`] 一次性分配，每个单元重新填充：
//! - 收集的节点字段：标量 `[node]`，向量/张量 `[node][comp]`
//! - 每种坐标配置的节点坐标
//! - 每种坐标配置的参考单元几何量 [`MasterElementViews`]
//!
//! 核函数在单次调用内只读借用，不得在调用之外保留引用。

use crate::fields::{FieldHandle, FieldStore};
use crate::master_element::{MasterElement, MasterElementRepo};
use crate::requests::{CoordsConfig, ElemDataRequests, MeOperator};
use crate::topology::AlgTraits;
use ct_foundation::{CtError, CtResult, NodeIndex};
use std::marker::PhantomData;
use std::ops::Index;

// ============================================================
// 视图类型
// ============================================================

/// 标量视图 `[node]`
#[derive(Debug, Clone, Copy)]
pub struct ScalarView<'a> {
    data: &'a [f64],
}

impl<'a> ScalarView<'a> {
    /// 底层切片
    #[inline]
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }
}

impl Index<usize> for ScalarView<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, ic: usize) -> &f64 {
        &self.data[ic]
    }
}

/// 多分量视图 `[node][comp]`
#[derive(Debug, Clone, Copy)]
pub struct VectorView<'a> {
    data: &'a [f64],
    n_comp: usize,
}

impl<'a> VectorView<'a> {
    /// 每节点分量数
    #[inline]
    pub fn components(&self) -> usize {
        self.n_comp
    }

    /// 单个节点的全部分量
    #[inline]
    pub fn node(&self, ic: usize) -> &'a [f64] {
        &self.data[ic * self.n_comp..(ic + 1) * self.n_comp]
    }
}

impl Index<(usize, usize)> for VectorView<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, (ic, comp): (usize, usize)) -> &f64 {
        &self.data[ic * self.n_comp + comp]
    }
}

/// 参考单元几何量
#[derive(Debug, Clone, Default)]
pub struct MasterElementViews {
    npe: usize,
    n_dim: usize,
    /// 子控制体体积 `[ip]`
    pub scv_volume: Vec<f64>,
    /// 梯度算子 `[ip][node][dim]`
    pub dndx_scv: Vec<f64>,
}

impl MasterElementViews {
    fn new(npe: usize, n_ip: usize, n_dim: usize, volume: bool, grad: bool) -> Self {
        Self {
            npe,
            n_dim,
            scv_volume: if volume { vec![0.0; n_ip] } else { Vec::new() },
            dndx_scv: if grad {
                vec![0.0; n_ip * npe * n_dim]
            } else {
                Vec::new()
            },
        }
    }

    /// 积分点子体积
    #[inline]
    pub fn scv_volume(&self, ip: usize) -> f64 {
        self.scv_volume[ip]
    }

    /// 积分点 `ip` 处节点 `ic` 形函数的 `dim` 方向导数
    #[inline]
    pub fn dndx(&self, ip: usize, ic: usize, dim: usize) -> f64 {
        self.dndx_scv[(ip * self.npe + ic) * self.n_dim + dim]
    }
}

// ============================================================
// ScratchViews
// ============================================================

#[derive(Debug, Clone, Copy)]
struct FieldSlot {
    field: FieldHandle,
    n_comp: usize,
    offset: usize,
}

/// 批次临时数据
#[derive(Debug, Clone)]
pub struct ScratchViews<T: AlgTraits> {
    slots: Vec<FieldSlot>,
    data: Vec<f64>,
    coords: [Option<(FieldHandle, Vec<f64>)>; 2],
    me_views: [MasterElementViews; 2],
    me: &'static dyn MasterElement,
    _topo: PhantomData<T>,
}

impl<T: AlgTraits> ScratchViews<T> {
    /// 按数据需求分配
    ///
    /// # 错误
    /// - 数据需求绑定的拓扑与 `T` 不一致
    /// - 数据需求自身不一致（见 [`ElemDataRequests::validate`]）
    pub fn new(requests: &ElemDataRequests) -> CtResult<Self> {
        requests.validate()?;
        if let Some(topo) = requests.topology() {
            if topo != T::TOPO {
                return Err(CtError::topology_mismatch(format!(
                    "数据需求为 {topo}, 批次为 {}",
                    T::TOPO
                )));
            }
        }

        let npe = T::NODES_PER_ELEMENT;
        let mut offset = 0;
        let slots: Vec<FieldSlot> = requests
            .fields()
            .iter()
            .map(|g| {
                let slot = FieldSlot {
                    field: g.field,
                    n_comp: g.n_comp,
                    offset,
                };
                offset += npe * g.n_comp;
                slot
            })
            .collect();

        let coords = CoordsConfig::ALL.map(|config| {
            requests
                .coordinates(config)
                .map(|c| (c.field, vec![0.0; npe * c.dim]))
        });
        let me_views = CoordsConfig::ALL.map(|config| {
            MasterElementViews::new(
                npe,
                T::NUM_SCV_IP,
                T::N_DIM,
                requests.has_me_call(MeOperator::ScvVolume, config),
                requests.has_me_call(MeOperator::ScvGradOp, config),
            )
        });

        Ok(Self {
            slots,
            data: vec![0.0; offset],
            coords,
            me_views,
            me: MasterElementRepo::volume(T::TOPO),
            _topo: PhantomData,
        })
    }

    /// 收集单元节点数据并计算几何量
    ///
    /// `nodes` 为单元连接关系，长度必须为 `T::NODES_PER_ELEMENT`。
    pub fn gather(&mut self, store: &FieldStore, nodes: &[NodeIndex]) {
        debug_assert_eq!(nodes.len(), T::NODES_PER_ELEMENT);

        for slot in &self.slots {
            let dst = &mut self.data[slot.offset..slot.offset + nodes.len() * slot.n_comp];
            for (ic, &node) in nodes.iter().enumerate() {
                let src = store.node_values(slot.field, node);
                dst[ic * slot.n_comp..(ic + 1) * slot.n_comp].copy_from_slice(&src[..slot.n_comp]);
            }
        }

        for config in CoordsConfig::ALL {
            let i = config.index();
            let Some((field, buf)) = self.coords[i].as_mut() else {
                continue;
            };
            let dim = field.components();
            for (ic, &node) in nodes.iter().enumerate() {
                buf[ic * dim..(ic + 1) * dim].copy_from_slice(store.node_values(*field, node));
            }

            let views = &mut self.me_views[i];
            if !views.scv_volume.is_empty() {
                self.me.scv_volume(buf, &mut views.scv_volume);
            }
            if !views.dndx_scv.is_empty() {
                self.me.scv_grad_op(buf, &mut views.dndx_scv);
            }
        }
    }

    fn slot(&self, field: FieldHandle) -> FieldSlot {
        match self.slots.iter().find(|s| s.field == field) {
            Some(&slot) => slot,
            None => panic!("字段 #{} 未在数据需求中声明", field.id()),
        }
    }

    /// 标量视图
    ///
    /// # Panics
    /// 字段未在数据需求中声明时 panic（构造期声明保证不会发生）。
    #[inline]
    pub fn scalar_view(&self, field: FieldHandle) -> ScalarView<'_> {
        let slot = self.slot(field);
        ScalarView {
            data: &self.data[slot.offset..slot.offset + T::NODES_PER_ELEMENT],
        }
    }

    /// 多分量视图
    ///
    /// # Panics
    /// 字段未在数据需求中声明时 panic。
    #[inline]
    pub fn vector_view(&self, field: FieldHandle) -> VectorView<'_> {
        let slot = self.slot(field);
        VectorView {
            data: &self.data[slot.offset..slot.offset + T::NODES_PER_ELEMENT * slot.n_comp],
            n_comp: slot.n_comp,
        }
    }

    /// 指定配置的节点坐标 `[node][dim]`
    pub fn coordinates(&self, config: CoordsConfig) -> Option<VectorView<'_>> {
        self.coords[config.index()]
            .as_ref()
            .map(|(field, buf)| VectorView {
                data: buf,
                n_comp: field.components(),
            })
    }

    /// 指定配置的几何量
    #[inline]
    pub fn me_views(&self, config: CoordsConfig) -> &MasterElementViews {
        &self.me_views[config.index()]
    }

    /// 参考单元
    #[inline]
    pub fn master_element(&self) -> &'static dyn MasterElement {
        self.me
    }
}
