// crates/ct_physics/src/fields.rs

//! 节点字段注册与存储
//!
//! 提供网格节点字段的元数据查询和数据存储。
//!
//! # 设计原则
//!
//! 1. **构造期解析**：核函数/算法在构造时通过 [`FieldRegistry::get_field`]
//!    把字段名解析为不可变的 [`FieldHandle`]，单元循环中不再按名查找
//! 2. **缺失即失败**：字段不存在或秩不符立即返回配置错误
//! 3. **名称验证**：强制 snake_case 命名规范
//!
//! # 示例
//!
//! ```rust
//! use ct_physics::fields::{FieldKind, FieldStore, names};
//!
//! let mut store = FieldStore::new(3, 8);
//! let tke = store.register(names::TURBULENT_KE, FieldKind::Scalar).unwrap();
//! store.fill(tke, 0.5);
//! assert_eq!(store.registry().get_field(FieldKind::Scalar, "turbulent_ke").unwrap(), tke);
//! assert!(store.registry().get_field(FieldKind::Vector, "turbulent_ke").is_err());
//! ```

use ct_foundation::{CtError, CtResult, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 标准字段名
pub mod names {
    /// 节点坐标
    pub const COORDINATES: &str = "coordinates";
    /// 湍动能 k
    pub const TURBULENT_KE: &str = "turbulent_ke";
    /// 比耗散率 ω
    pub const SPECIFIC_DISSIPATION_RATE: &str = "specific_dissipation_rate";
    /// 密度 ρ
    pub const DENSITY: &str = "density";
    /// 速度
    pub const VELOCITY: &str = "velocity";
    /// 涡粘性 μ_t
    pub const TURBULENT_VISCOSITY: &str = "turbulent_viscosity";
    /// SST 最大网格长度尺度（DES 亚格子尺度）
    pub const SST_MAX_LENGTH_SCALE: &str = "sst_max_length_scale";
    /// SST F1 混合函数
    pub const SST_F_ONE_BLENDING: &str = "sst_f_one_blending";
    /// 速度梯度张量 ∂u_i/∂x_j
    pub const DUDX: &str = "dudx";
    /// 各向异性网格度量张量
    pub const METRIC_TENSOR: &str = "metric_tensor";
    /// 分辨率充分性参数
    pub const RESOLUTION_ADEQUACY: &str = "resolution_adequacy_parameter";
}

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// 标量（1 个分量）
    Scalar,
    /// 向量（n_dim 个分量）
    Vector,
    /// 二阶张量（n_dim² 个分量，行主序 `dim * row + col`）
    Tensor,
    /// 任意分量数
    Generic(usize),
}

impl FieldKind {
    /// 分量数
    #[inline]
    pub fn components(self, n_dim: usize) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector => n_dim,
            Self::Tensor => n_dim * n_dim,
            Self::Generic(n) => n,
        }
    }
}

/// 字段句柄（不可变、非拥有）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldHandle {
    id: u32,
    n_comp: u32,
}

impl FieldHandle {
    /// 注册序号
    #[inline]
    pub fn id(self) -> usize {
        self.id as usize
    }

    /// 每节点分量数
    #[inline]
    pub fn components(self) -> usize {
        self.n_comp as usize
    }
}

/// 字段元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    /// 字段名称（唯一标识符）
    pub name: String,
    /// 字段类型
    pub kind: FieldKind,
    /// 每节点分量数
    pub components: usize,
    /// 描述文本
    #[serde(default)]
    pub description: String,
}

/// 验证字段名是否符合 snake_case 规范
///
/// # 规则
/// - 仅允许小写字母 a-z、数字 0-9 和下划线 `_`
/// - 不能以下划线开头或结尾
/// - 不能包含连续下划线
fn is_valid_field_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('_') || name.ends_with('_') {
        return false;
    }
    let mut prev = ' ';
    for ch in name.chars() {
        match ch {
            'a'..='z' | '0'..='9' => {}
            '_' if prev != '_' => {}
            _ => return false,
        }
        prev = ch;
    }
    true
}

/// 字段注册表（网格元数据）
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    n_dim: usize,
    metas: Vec<FieldMeta>,
    by_name: HashMap<String, usize>,
}

impl FieldRegistry {
    /// 创建空注册表
    pub fn new(n_dim: usize) -> Self {
        Self {
            n_dim,
            metas: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// 空间维数
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// 注册新字段
    ///
    /// 同名同类型重复注册返回已有句柄；同名不同类型为错误。
    pub fn register(&mut self, name: &str, kind: FieldKind) -> CtResult<FieldHandle> {
        if !is_valid_field_name(name) {
            return Err(CtError::invalid_config(
                "field.name",
                name,
                "字段名必须为 snake_case (a-z, 0-9, _)",
            ));
        }

        let n_comp = kind.components(self.n_dim);
        if let Some(&id) = self.by_name.get(name) {
            let meta = &self.metas[id];
            if meta.components != n_comp {
                return Err(CtError::field_rank_mismatch(name, meta.components, n_comp));
            }
            return Ok(Self::handle(id, n_comp));
        }

        let id = self.metas.len();
        self.metas.push(FieldMeta {
            name: name.to_string(),
            kind,
            components: n_comp,
            description: String::new(),
        });
        self.by_name.insert(name.to_string(), id);
        Ok(Self::handle(id, n_comp))
    }

    #[inline]
    fn handle(id: usize, n_comp: usize) -> FieldHandle {
        FieldHandle {
            id: id as u32,
            n_comp: n_comp as u32,
        }
    }

    /// 按类型和名称解析字段
    ///
    /// # 错误
    /// - `MissingField`: 字段未注册
    /// - `FieldRankMismatch`: 分量数与期望类型不符
    pub fn get_field(&self, kind: FieldKind, name: &str) -> CtResult<FieldHandle> {
        let &id = self
            .by_name
            .get(name)
            .ok_or_else(|| CtError::missing_field(name))?;
        let meta = &self.metas[id];
        let expected = kind.components(self.n_dim);
        if meta.components != expected {
            return Err(CtError::field_rank_mismatch(name, expected, meta.components));
        }
        Ok(Self::handle(id, expected))
    }

    /// 检查字段是否存在
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// 字段元数据
    #[inline]
    pub fn meta(&self, handle: FieldHandle) -> &FieldMeta {
        &self.metas[handle.id()]
    }

    /// 字段名
    #[inline]
    pub fn name(&self, handle: FieldHandle) -> &str {
        &self.metas[handle.id()].name
    }

    /// 字段数量
    #[inline]
    pub fn len(&self) -> usize {
        self.metas.len()
    }

    /// 检查注册表是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }
}

/// 节点字段存储
///
/// 数据按节点主序排列：`values[node * n_comp + comp]`。
#[derive(Debug, Clone)]
pub struct FieldStore {
    registry: FieldRegistry,
    n_nodes: usize,
    data: Vec<Vec<f64>>,
}

impl FieldStore {
    /// 创建空存储
    pub fn new(n_dim: usize, n_nodes: usize) -> Self {
        Self {
            registry: FieldRegistry::new(n_dim),
            n_nodes,
            data: Vec::new(),
        }
    }

    /// 注册字段并分配零初始化的存储
    pub fn register(&mut self, name: &str, kind: FieldKind) -> CtResult<FieldHandle> {
        let handle = self.registry.register(name, kind)?;
        if handle.id() == self.data.len() {
            self.data.push(vec![0.0; self.n_nodes * handle.components()]);
        }
        Ok(handle)
    }

    /// 字段元数据
    #[inline]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 空间维数
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.registry.n_dim()
    }

    /// 按类型和名称解析字段
    pub fn get_field(&self, kind: FieldKind, name: &str) -> CtResult<FieldHandle> {
        self.registry.get_field(kind, name)
    }

    /// 全部数据
    #[inline]
    pub fn values(&self, field: FieldHandle) -> &[f64] {
        &self.data[field.id()]
    }

    /// 全部数据（可变）
    #[inline]
    pub fn values_mut(&mut self, field: FieldHandle) -> &mut [f64] {
        &mut self.data[field.id()]
    }

    /// 单个节点的数据
    #[inline]
    pub fn node_values(&self, field: FieldHandle, node: NodeIndex) -> &[f64] {
        let n = field.components();
        let base = node.get() * n;
        &self.data[field.id()][base..base + n]
    }

    /// 单个节点的数据（可变）
    #[inline]
    pub fn node_values_mut(&mut self, field: FieldHandle, node: NodeIndex) -> &mut [f64] {
        let n = field.components();
        let base = node.get() * n;
        &mut self.data[field.id()][base..base + n]
    }

    /// 以常数填充
    pub fn fill(&mut self, field: FieldHandle, value: f64) {
        self.data[field.id()].fill(value);
    }

    /// 逐节点填充
    pub fn fill_with<F>(&mut self, field: FieldHandle, mut f: F)
    where
        F: FnMut(NodeIndex, &mut [f64]),
    {
        let n = field.components();
        for (i, chunk) in self.data[field.id()].chunks_exact_mut(n).enumerate() {
            f(NodeIndex::new(i), chunk);
        }
    }

    /// 字段均方根范数 `sqrt(Σ v² / len)`
    pub fn field_norm(&self, field: FieldHandle) -> f64 {
        let values = self.values(field);
        if values.is_empty() {
            return 0.0;
        }
        let sum: f64 = values.iter().map(|v| v * v).sum();
        (sum / values.len() as f64).sqrt()
    }
}
