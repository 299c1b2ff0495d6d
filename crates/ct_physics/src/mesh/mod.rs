// crates/ct_physics/src/mesh/mod.rs

//! 非结构单元网格
//!
//! 只保存核函数和诊断算法需要的部分：单元拓扑、连接关系、
//! 本地拥有标记、所属分区以及可选的周期配对。节点坐标等
//! 节点数据由 [`FieldStore`](crate::fields::FieldStore) 持有。
//!
//! # 示例
//!
//! ```rust
//! use ct_physics::mesh::{ElementMesh, Selector};
//! use ct_physics::topology::TopologyKind;
//!
//! let mut mesh = ElementMesh::new(2, 6);
//! mesh.add_element("block_1", TopologyKind::Quad4, &[0, 1, 4, 3], true).unwrap();
//! mesh.add_element("block_1", TopologyKind::Quad4, &[1, 2, 5, 4], false).unwrap();
//!
//! let owned = Selector::LocallyOwned & Selector::part("block_1");
//! assert_eq!(mesh.select_elements(&owned).len(), 1);
//! assert_eq!(mesh.select_nodes(&Selector::part("block_1")).len(), 6);
//! ```

mod periodic;
mod selector;

pub use periodic::{PeriodicFieldUpdate, PeriodicPairing, PeriodicPolicy};
pub use selector::Selector;

use crate::topology::TopologyKind;
use ct_foundation::{CtError, CtResult, ElemIndex, NodeIndex};

/// 网格单元
#[derive(Debug, Clone)]
pub struct MeshElement {
    /// 拓扑
    pub topology: TopologyKind,
    /// 连接关系（按参考单元节点顺序）
    pub nodes: Vec<NodeIndex>,
    /// 是否由本进程拥有
    pub locally_owned: bool,
    /// 所属分区序号
    pub part: usize,
}

/// 单元网格
#[derive(Debug, Clone)]
pub struct ElementMesh {
    n_dim: usize,
    n_nodes: usize,
    parts: Vec<String>,
    elements: Vec<MeshElement>,
    periodic: Option<PeriodicPairing>,
}

impl ElementMesh {
    /// 创建空网格
    pub fn new(n_dim: usize, n_nodes: usize) -> Self {
        Self {
            n_dim,
            n_nodes,
            parts: Vec::new(),
            elements: Vec::new(),
            periodic: None,
        }
    }

    /// 空间维数
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 单元数
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// 添加命名分区，已存在时返回原序号
    pub fn add_part(&mut self, name: &str) -> usize {
        if let Some(id) = self.part_id(name) {
            return id;
        }
        self.parts.push(name.to_string());
        self.parts.len() - 1
    }

    /// 分区序号
    pub fn part_id(&self, name: &str) -> Option<usize> {
        self.parts.iter().position(|p| p == name)
    }

    /// 分区名
    #[inline]
    pub fn part_name(&self, id: usize) -> &str {
        &self.parts[id]
    }

    /// 添加单元
    ///
    /// # 错误
    /// - 拓扑维数与网格不符
    /// - 节点数与拓扑不符
    /// - 节点索引越界
    pub fn add_element(
        &mut self,
        part: &str,
        topology: TopologyKind,
        nodes: &[usize],
        locally_owned: bool,
    ) -> CtResult<ElemIndex> {
        if topology.n_dim() != self.n_dim {
            return Err(CtError::invalid_mesh(format!(
                "{topology} 为 {} 维单元, 网格为 {} 维",
                topology.n_dim(),
                self.n_dim
            )));
        }
        if nodes.len() != topology.nodes_per_element() {
            return Err(CtError::invalid_mesh(format!(
                "{topology} 需要 {} 个节点, 实际 {}",
                topology.nodes_per_element(),
                nodes.len()
            )));
        }
        for &n in nodes {
            CtError::check_index("Node", n, self.n_nodes)?;
        }

        let part = self.add_part(part);
        self.elements.push(MeshElement {
            topology,
            nodes: nodes.iter().map(|&n| NodeIndex::new(n)).collect(),
            locally_owned,
            part,
        });
        Ok(ElemIndex::new(self.elements.len() - 1))
    }

    /// 单元
    #[inline]
    pub fn element(&self, elem: ElemIndex) -> &MeshElement {
        &self.elements[elem.get()]
    }

    /// 全部单元
    #[inline]
    pub fn elements(&self) -> &[MeshElement] {
        &self.elements
    }

    /// 设置周期配对
    pub fn set_periodic(&mut self, pairing: PeriodicPairing) -> CtResult<()> {
        for &(m, s) in pairing.pairs() {
            CtError::check_index("Node", m.get(), self.n_nodes)?;
            CtError::check_index("Node", s.get(), self.n_nodes)?;
        }
        self.periodic = Some(pairing);
        Ok(())
    }

    /// 周期配对
    #[inline]
    pub fn periodic(&self) -> Option<&PeriodicPairing> {
        self.periodic.as_ref()
    }

    /// 检查选择器引用的分区都存在
    pub fn validate_selector(&self, selector: &Selector) -> CtResult<()> {
        for name in selector.part_names() {
            if self.part_id(name).is_none() {
                return Err(CtError::config(format!("未知网格分区: {name}")));
            }
        }
        Ok(())
    }

    #[inline]
    fn is_selected(&self, e: &MeshElement, selector: &Selector) -> bool {
        selector.matches(&self.parts[e.part], e.locally_owned)
    }

    /// 选中的单元（按单元序号升序）
    pub fn select_elements(&self, selector: &Selector) -> Vec<ElemIndex> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| self.is_selected(e, selector))
            .map(|(i, _)| ElemIndex::new(i))
            .collect()
    }

    /// 选中单元的节点（升序、去重）
    pub fn select_nodes(&self, selector: &Selector) -> Vec<NodeIndex> {
        let mut mark = vec![false; self.n_nodes];
        for e in self.elements.iter().filter(|e| self.is_selected(e, selector)) {
            for n in &e.nodes {
                mark[n.get()] = true;
            }
        }
        mark.iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| NodeIndex::new(i))
            .collect()
    }
}
