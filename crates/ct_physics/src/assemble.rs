// crates/ct_physics/src/assemble.rs

//! 单元批次装配
//!
//! [`AssembleElemSolverAlgorithm`] 持有共享的数据需求、按注册顺序排列的核函数、
//! 单元选择器和装配选项。执行流程：
//!
//! 1. 选出区域内拓扑为 `T` 的本地拥有单元
//! 2. 按 `batch_size` 分批
//! 3. 每个单元：收集数据、计算几何量、清零局部 `lhs`/`rhs`、按顺序执行核函数、
//!    把 `(nodes, lhs, rhs)` 交给 [`LinearSystemSink`]
//!
//! # 并行策略
//!
//! - `Sequential`: 完全串行
//! - `CollectThenAccumulate`: 各批次并行计算局部贡献（每批独占一份临时数据），
//!   再按单元顺序串行散射。结果与串行逐位一致。

use crate::fields::FieldStore;
use crate::kernels::{Kernel, SstSourceKernel};
use crate::linsys::{LinearSystemSink, LocalMatrix};
use crate::mesh::{ElementMesh, Selector};
use crate::requests::ElemDataRequests;
use crate::scratch::ScratchViews;
use crate::topology::{AlgTraits, TopologyKind};
use ct_config::{AssemblyOptions, ParallelStrategy};
use ct_foundation::{ensure, CtError, CtResult, ElemIndex, NodeIndex};
use std::marker::PhantomData;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ============================================================
// 统计
// ============================================================

/// 装配统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyStats {
    /// 处理的单元数
    pub n_elements: usize,
    /// 批次数
    pub n_batches: usize,
    /// 是否并行执行
    pub parallel: bool,
    /// 耗时
    pub duration: Duration,
}

impl AssemblyStats {
    /// 合并另一次装配的统计
    pub fn merge(&mut self, other: &AssemblyStats) {
        self.n_elements += other.n_elements;
        self.n_batches += other.n_batches;
        self.parallel |= other.parallel;
        self.duration += other.duration;
    }
}

/// 单元级贡献
#[cfg(feature = "parallel")]
#[derive(Debug, Clone)]
struct ElementContribution {
    elem: ElemIndex,
    lhs: LocalMatrix,
    rhs: Vec<f64>,
}

// ============================================================
// 装配算法
// ============================================================

/// 单拓扑单元装配算法
#[derive(Debug)]
pub struct AssembleElemSolverAlgorithm<T: AlgTraits, K: Kernel<T> = SstSourceKernel<T>> {
    selector: Selector,
    options: AssemblyOptions,
    requests: ElemDataRequests,
    kernels: Vec<K>,
    _topo: PhantomData<T>,
}

impl<T: AlgTraits, K: Kernel<T>> AssembleElemSolverAlgorithm<T, K> {
    /// 创建空算法
    pub fn new(selector: Selector, options: AssemblyOptions) -> Self {
        Self {
            selector,
            options,
            requests: ElemDataRequests::new(),
            kernels: Vec::new(),
            _topo: PhantomData,
        }
    }

    /// 共享数据需求（供核函数构造时声明）
    #[inline]
    pub fn data_needed_mut(&mut self) -> &mut ElemDataRequests {
        &mut self.requests
    }

    /// 共享数据需求
    #[inline]
    pub fn data_needed(&self) -> &ElemDataRequests {
        &self.requests
    }

    /// 追加核函数（执行顺序即注册顺序）
    pub fn add_kernel(&mut self, kernel: K) {
        self.kernels.push(kernel);
    }

    /// 已注册的核函数
    #[inline]
    pub fn kernels(&self) -> &[K] {
        &self.kernels
    }

    /// 拓扑
    #[inline]
    pub fn topology(&self) -> TopologyKind {
        T::TOPO
    }

    /// 区域内拓扑为 `T` 的本地拥有单元
    pub fn select_elements(&self, mesh: &ElementMesh) -> CtResult<Vec<ElemIndex>> {
        mesh.validate_selector(&self.selector)?;
        let owned = Selector::LocallyOwned & self.selector.clone();
        Ok(mesh
            .select_elements(&owned)
            .into_iter()
            .filter(|&e| mesh.element(e).topology == T::TOPO)
            .collect())
    }

    /// 执行装配
    ///
    /// # 错误
    /// - 字段存储的节点数或维数与网格不一致
    /// - 区域引用了未知分区
    /// - 数据需求与拓扑 `T` 不一致
    pub fn execute<S>(
        &self,
        mesh: &ElementMesh,
        store: &FieldStore,
        sink: &mut S,
    ) -> CtResult<AssemblyStats>
    where
        S: LinearSystemSink + ?Sized,
    {
        let start = Instant::now();
        CtError::check_size("nodes", mesh.n_nodes(), store.n_nodes())?;
        ensure!(
            store.n_dim() == mesh.n_dim(),
            CtError::invalid_mesh(format!(
                "{}: 网格 {} 维, 字段 {} 维",
                T::TOPO,
                mesh.n_dim(),
                store.n_dim()
            ))
        );
        let elems = self.select_elements(mesh)?;
        let batch_size = self.options.batch_size.max(1);

        let mut stats = AssemblyStats {
            n_elements: elems.len(),
            n_batches: elems.len().div_ceil(batch_size),
            ..Default::default()
        };

        if self.kernels.is_empty() || elems.is_empty() {
            stats.duration = start.elapsed();
            return Ok(stats);
        }

        stats.parallel = self.options.strategy == ParallelStrategy::CollectThenAccumulate
            && cfg!(feature = "parallel");

        if stats.parallel {
            #[cfg(feature = "parallel")]
            self.execute_collect(mesh, store, sink, &elems, batch_size)?;
        } else {
            let mut scratch = ScratchViews::<T>::new(&self.requests)?;
            let mut lhs = LocalMatrix::zeros(T::NODES_PER_ELEMENT);
            let mut rhs = vec![0.0; T::NODES_PER_ELEMENT];
            for (b, batch) in elems.chunks(batch_size).enumerate() {
                log::trace!("{} 批次 {b}: {} 个单元", T::TOPO, batch.len());
                for &e in batch {
                    let nodes = &mesh.element(e).nodes;
                    self.evaluate_element(&mut scratch, store, nodes, &mut lhs, &mut rhs);
                    sink.sum_into(nodes, &lhs, &rhs);
                }
            }
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }

    /// 单个单元：收集、清零、按顺序执行核函数
    fn evaluate_element(
        &self,
        scratch: &mut ScratchViews<T>,
        store: &FieldStore,
        nodes: &[NodeIndex],
        lhs: &mut LocalMatrix,
        rhs: &mut [f64],
    ) {
        scratch.gather(store, nodes);
        lhs.set_zero();
        rhs.fill(0.0);
        for kernel in &self.kernels {
            kernel.execute(lhs, rhs, scratch);
        }
    }

    #[cfg(feature = "parallel")]
    fn execute_collect<S>(
        &self,
        mesh: &ElementMesh,
        store: &FieldStore,
        sink: &mut S,
        elems: &[ElemIndex],
        batch_size: usize,
    ) -> CtResult<()>
    where
        S: LinearSystemSink + ?Sized,
    {
        let batches: Vec<CtResult<Vec<ElementContribution>>> = elems
            .par_chunks(batch_size)
            .map(|batch| {
                let mut scratch = ScratchViews::<T>::new(&self.requests)?;
                let mut out = Vec::with_capacity(batch.len());
                for &e in batch {
                    let mut lhs = LocalMatrix::zeros(T::NODES_PER_ELEMENT);
                    let mut rhs = vec![0.0; T::NODES_PER_ELEMENT];
                    let nodes = &mesh.element(e).nodes;
                    self.evaluate_element(&mut scratch, store, nodes, &mut lhs, &mut rhs);
                    out.push(ElementContribution { elem: e, lhs, rhs });
                }
                Ok(out)
            })
            .collect();

        for (b, batch) in batches.into_iter().enumerate() {
            let batch = batch?;
            log::trace!("{} 批次 {b}: 散射 {} 个单元", T::TOPO, batch.len());
            for c in &batch {
                sink.sum_into(&mesh.element(c.elem).nodes, &c.lhs, &c.rhs);
            }
        }
        Ok(())
    }
}

// ============================================================
// 类型擦除接口
// ============================================================

/// 单元求解算法（按拓扑擦除类型）
pub trait ElemSolverAlgorithm: Send + Sync {
    /// 拓扑
    fn topology(&self) -> TopologyKind;

    /// 核函数名称（注册顺序）
    fn kernel_names(&self) -> Vec<&'static str>;

    /// 执行装配
    fn execute(
        &self,
        mesh: &ElementMesh,
        store: &FieldStore,
        sink: &mut dyn LinearSystemSink,
    ) -> CtResult<AssemblyStats>;
}

impl<T: AlgTraits, K: Kernel<T> + 'static> ElemSolverAlgorithm for AssembleElemSolverAlgorithm<T, K> {
    fn topology(&self) -> TopologyKind {
        T::TOPO
    }

    fn kernel_names(&self) -> Vec<&'static str> {
        self.kernels.iter().map(|k| k.name()).collect()
    }

    fn execute(
        &self,
        mesh: &ElementMesh,
        store: &FieldStore,
        sink: &mut dyn LinearSystemSink,
    ) -> CtResult<AssemblyStats> {
        AssembleElemSolverAlgorithm::<T, K>::execute(self, mesh, store, sink)
    }
}
