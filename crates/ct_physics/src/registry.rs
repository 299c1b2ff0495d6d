// crates/ct_physics/src/registry.rs

//! 源项装配算法注册中心
//!
//! 每种拓扑一个 [`AssembleElemSolverAlgorithm`]，以 [`ElemSolverAlgorithm`]
//! 擦除拓扑类型后统一管理。构建时按区域内实际出现的拓扑经
//! [`TopologyKind::dispatch`] 实例化对应的单态化路径。
//!
//! # 示例
//!
//! ```rust
//! use ct_config::SolutionOptions;
//! use ct_physics::fields::{names, FieldKind, FieldStore};
//! use ct_physics::kernels::SstSourceKind;
//! use ct_physics::linsys::DenseLinearSystem;
//! use ct_physics::mesh::{ElementMesh, Selector};
//! use ct_physics::registry::SourceAlgorithmRegistry;
//! use ct_physics::topology::TopologyKind;
//!
//! let mut mesh = ElementMesh::new(3, 4);
//! mesh.add_element("fluid", TopologyKind::Tet4, &[0, 1, 2, 3], true).unwrap();
//!
//! let mut store = FieldStore::new(3, 4);
//! let coords = store.register(names::COORDINATES, FieldKind::Vector).unwrap();
//! let xyz = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
//! store.fill_with(coords, |n, v| v.copy_from_slice(&xyz[n.get()]));
//! for name in [names::TURBULENT_KE, names::SPECIFIC_DISSIPATION_RATE,
//!              names::DENSITY, names::TURBULENT_VISCOSITY] {
//!     let f = store.register(name, FieldKind::Scalar).unwrap();
//!     store.fill(f, 1.0);
//! }
//! store.register(names::VELOCITY, FieldKind::Vector).unwrap();
//!
//! let registry = SourceAlgorithmRegistry::build(
//!     &mesh,
//!     store.registry(),
//!     &SolutionOptions::default(),
//!     &Selector::part("fluid"),
//!     &[SstSourceKind::TkeSst],
//! )
//! .unwrap();
//!
//! let mut sys = DenseLinearSystem::new(4);
//! let stats = registry.execute_all(&mesh, &store, &mut sys).unwrap();
//! assert_eq!(stats.n_elements, 1);
//! assert!(sys.rhs().iter().all(|&r| r < 0.0));
//! ```

use crate::assemble::{AssembleElemSolverAlgorithm, AssemblyStats, ElemSolverAlgorithm};
use crate::fields::{FieldRegistry, FieldStore};
use crate::kernels::{SstSourceKernel, SstSourceKind};
use crate::linsys::LinearSystemSink;
use crate::mesh::{ElementMesh, Selector};
use crate::topology::{AlgTraits, TopologyKind, TopologyVisitor};
use ct_config::SolutionOptions;
use ct_foundation::{CtError, CtResult};
use std::collections::BTreeSet;

/// 源项装配算法注册中心
#[derive(Default)]
pub struct SourceAlgorithmRegistry {
    /// 已注册的算法（按拓扑升序）
    algorithms: Vec<Box<dyn ElemSolverAlgorithm>>,
}

impl SourceAlgorithmRegistry {
    /// 创建空注册中心
    pub fn new() -> Self {
        Self::default()
    }

    /// 为区域内出现的每种拓扑构建 SST 源项算法
    ///
    /// `kinds` 的顺序即每个单元内核函数的执行顺序。
    pub fn build(
        mesh: &ElementMesh,
        fields: &FieldRegistry,
        options: &SolutionOptions,
        selector: &Selector,
        kinds: &[SstSourceKind],
    ) -> CtResult<Self> {
        mesh.validate_selector(selector)?;

        let owned = Selector::LocallyOwned & selector.clone();
        let topologies: BTreeSet<TopologyKind> = mesh
            .select_elements(&owned)
            .into_iter()
            .map(|e| mesh.element(e).topology)
            .collect();

        let mut registry = Self::new();
        for topo in topologies {
            let alg = topo.dispatch(BuildSstAlgorithm {
                fields,
                options,
                selector,
                kinds,
            })?;
            registry.register(alg)?;
        }

        log::debug!(
            "构建源项算法: 拓扑 {:?}, 核函数 {:?}",
            registry.topologies(),
            kinds
        );
        Ok(registry)
    }

    /// 注册算法
    ///
    /// 同一拓扑只能注册一次。
    pub fn register(&mut self, alg: Box<dyn ElemSolverAlgorithm>) -> CtResult<usize> {
        let topo = alg.topology();
        match self.algorithms.binary_search_by_key(&topo, |a| a.topology()) {
            Ok(_) => Err(CtError::topology_mismatch(format!("{topo} 已注册装配算法"))),
            Err(pos) => {
                self.algorithms.insert(pos, alg);
                Ok(pos)
            }
        }
    }

    /// 按拓扑获取算法
    pub fn get(&self, topo: TopologyKind) -> Option<&dyn ElemSolverAlgorithm> {
        self.algorithms
            .iter()
            .find(|a| a.topology() == topo)
            .map(|a| a.as_ref())
    }

    /// 已注册的拓扑（升序）
    pub fn topologies(&self) -> Vec<TopologyKind> {
        self.algorithms.iter().map(|a| a.topology()).collect()
    }

    /// 算法数量
    #[inline]
    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// 依拓扑顺序执行全部算法
    pub fn execute_all(
        &self,
        mesh: &ElementMesh,
        store: &FieldStore,
        sink: &mut dyn LinearSystemSink,
    ) -> CtResult<AssemblyStats> {
        let mut total = AssemblyStats::default();
        for alg in &self.algorithms {
            let stats = alg.execute(mesh, store, sink)?;
            total.merge(&stats);
        }
        Ok(total)
    }
}

/// 按拓扑构建 SST 源项算法
struct BuildSstAlgorithm<'a> {
    fields: &'a FieldRegistry,
    options: &'a SolutionOptions,
    selector: &'a Selector,
    kinds: &'a [SstSourceKind],
}

impl TopologyVisitor for BuildSstAlgorithm<'_> {
    type Output = CtResult<Box<dyn ElemSolverAlgorithm>>;

    fn visit<T: AlgTraits>(self) -> Self::Output {
        let mut alg =
            AssembleElemSolverAlgorithm::<T>::new(self.selector.clone(), self.options.assembly);
        for &kind in self.kinds {
            let kernel =
                SstSourceKernel::<T>::build(kind, self.fields, self.options, alg.data_needed_mut())?;
            alg.add_kernel(kernel);
        }
        Ok(Box::new(alg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{names, FieldKind, FieldStore};
    use crate::topology::AlgTraitsTet4;

    fn registry_store() -> FieldStore {
        let mut store = FieldStore::new(3, 5);
        store.register(names::COORDINATES, FieldKind::Vector).unwrap();
        for name in [
            names::TURBULENT_KE,
            names::SPECIFIC_DISSIPATION_RATE,
            names::DENSITY,
            names::TURBULENT_VISCOSITY,
            names::SST_F_ONE_BLENDING,
        ] {
            store.register(name, FieldKind::Scalar).unwrap();
        }
        store.register(names::VELOCITY, FieldKind::Vector).unwrap();
        store
    }

    #[test]
    fn test_one_algorithm_per_topology() {
        let mut mesh = ElementMesh::new(3, 6);
        mesh.add_element("fluid", TopologyKind::Tet4, &[0, 1, 2, 3], true).unwrap();
        mesh.add_element("fluid", TopologyKind::Pyr5, &[0, 1, 2, 3, 4], true).unwrap();
        mesh.add_element("fluid", TopologyKind::Tet4, &[1, 2, 3, 4], true).unwrap();
        // 非本地单元的拓扑不参与构建
        mesh.add_element("fluid", TopologyKind::Wedge6, &[0, 1, 2, 3, 4, 5], false).unwrap();

        let store = registry_store();
        let registry = SourceAlgorithmRegistry::build(
            &mesh,
            store.registry(),
            &SolutionOptions::default(),
            &Selector::part("fluid"),
            &[SstSourceKind::SdrSst, SstSourceKind::TkeSst],
        )
        .unwrap();

        assert_eq!(registry.topologies(), vec![TopologyKind::Tet4, TopologyKind::Pyr5]);
        let tet = registry.get(TopologyKind::Tet4).unwrap();
        assert_eq!(tet.kernel_names(), vec!["sdr_sst", "tke_sst"]);
        assert!(registry.get(TopologyKind::Wedge6).is_none());
    }

    #[test]
    fn test_duplicate_topology_rejected() {
        let mut registry = SourceAlgorithmRegistry::new();
        let options = SolutionOptions::default();
        let alg = || {
            Box::new(AssembleElemSolverAlgorithm::<AlgTraitsTet4>::new(
                Selector::part("fluid"),
                options.assembly,
            ))
        };
        registry.register(alg()).unwrap();
        assert!(registry.register(alg()).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_part() {
        let mut mesh = ElementMesh::new(3, 4);
        mesh.add_element("fluid", TopologyKind::Tet4, &[0, 1, 2, 3], true).unwrap();
        let store = registry_store();
        let result = SourceAlgorithmRegistry::build(
            &mesh,
            store.registry(),
            &SolutionOptions::default(),
            &Selector::part("solid"),
            &[SstSourceKind::TkeSst],
        );
        assert!(result.is_err());
    }
}
