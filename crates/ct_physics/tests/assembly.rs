// crates/ct_physics/tests/assembly.rs

//! 批次装配与注册中心集成测试

mod common;

use common::{assert_close, hex_block};
use ct_config::{AssemblyOptions, ParallelStrategy, SolutionOptions};
use ct_foundation::CtError;
use ct_physics::fields::FieldStore;
use ct_physics::kernels::{SstSourceKernel, SstSourceKind};
use ct_physics::linsys::DenseLinearSystem;
use ct_physics::mesh::{ElementMesh, Selector};
use ct_physics::topology::{AlgTraitsHex8, TopologyKind};
use ct_physics::{AssembleElemSolverAlgorithm, ElemSolverAlgorithm, SourceAlgorithmRegistry};

fn options_with(batch_size: usize, strategy: ParallelStrategy) -> SolutionOptions {
    let mut options = SolutionOptions::default();
    options.assembly = AssemblyOptions {
        batch_size,
        strategy,
    };
    options
}

fn assemble(
    mesh: &ElementMesh,
    store: &FieldStore,
    options: &SolutionOptions,
    kinds: &[SstSourceKind],
) -> DenseLinearSystem {
    let registry = SourceAlgorithmRegistry::build(
        mesh,
        store.registry(),
        options,
        &Selector::part("block_1"),
        kinds,
    )
    .unwrap();
    let mut system = DenseLinearSystem::new(mesh.n_nodes());
    registry.execute_all(mesh, store, &mut system).unwrap();
    system
}

fn hex_algorithm(
    store: &FieldStore,
    options: &SolutionOptions,
    kinds: &[SstSourceKind],
) -> AssembleElemSolverAlgorithm<AlgTraitsHex8> {
    let mut alg = AssembleElemSolverAlgorithm::<AlgTraitsHex8>::new(
        Selector::part("block_1"),
        options.assembly,
    );
    for &kind in kinds {
        let kernel =
            SstSourceKernel::build(kind, store.registry(), options, alg.data_needed_mut()).unwrap();
        alg.add_kernel(kernel);
    }
    alg
}

#[test]
fn test_parallel_matches_sequential_bitwise() {
    let (mesh, store) = hex_block(3, 2, 2);
    let kinds = SstSourceKind::ALL;
    let reference = assemble(&mesh, &store, &options_with(1, ParallelStrategy::Sequential), &kinds);

    for batch_size in [1, 3, 5, 64] {
        for strategy in [ParallelStrategy::Sequential, ParallelStrategy::CollectThenAccumulate] {
            let system = assemble(&mesh, &store, &options_with(batch_size, strategy), &kinds);
            assert_eq!(system, reference, "batch_size={batch_size}, {strategy:?}");
        }
    }
}

#[test]
fn test_batch_statistics() {
    let (mesh, store) = hex_block(3, 2, 2);
    let options = options_with(5, ParallelStrategy::CollectThenAccumulate);
    let alg = hex_algorithm(&store, &options, &[SstSourceKind::TkeSst]);

    let mut system = DenseLinearSystem::new(mesh.n_nodes());
    let stats = alg.execute(&mesh, &store, &mut system).unwrap();
    assert_eq!(stats.n_elements, 12);
    assert_eq!(stats.n_batches, 3);
    assert_eq!(stats.parallel, cfg!(feature = "parallel"));
}

#[test]
fn test_no_kernels_is_noop() {
    let (mesh, store) = hex_block(2, 1, 1);
    let alg = hex_algorithm(&store, &SolutionOptions::default(), &[]);
    let mut system = DenseLinearSystem::new(mesh.n_nodes());
    let stats = alg.execute(&mesh, &store, &mut system).unwrap();
    assert_eq!(stats.n_elements, 2);
    assert_eq!(system, DenseLinearSystem::new(mesh.n_nodes()));
}

#[test]
fn test_non_owned_elements_skipped() {
    let (full_mesh, store) = hex_block(2, 1, 1);
    let options = SolutionOptions::default();

    // 同样的两个单元，第二个非本地拥有
    let mut mesh = ElementMesh::new(3, full_mesh.n_nodes());
    for (i, e) in full_mesh.elements().iter().enumerate() {
        let conn: Vec<usize> = e.nodes.iter().map(|n| n.get()).collect();
        mesh.add_element("block_1", e.topology, &conn, i == 0).unwrap();
    }
    let mut first_only = ElementMesh::new(3, full_mesh.n_nodes());
    let conn: Vec<usize> = full_mesh.elements()[0].nodes.iter().map(|n| n.get()).collect();
    first_only.add_element("block_1", TopologyKind::Hex8, &conn, true).unwrap();

    let kinds = [SstSourceKind::TkeSst];
    assert_eq!(
        assemble(&mesh, &store, &options, &kinds),
        assemble(&first_only, &store, &options, &kinds)
    );

    let alg = hex_algorithm(&store, &options, &kinds);
    assert_eq!(alg.select_elements(&mesh).unwrap().len(), 1);
}

#[test]
fn test_kernel_contributions_accumulate() {
    let (mesh, store) = hex_block(2, 2, 1);
    let options = SolutionOptions::default();
    let tke = assemble(&mesh, &store, &options, &[SstSourceKind::TkeSst]);
    let sdr = assemble(&mesh, &store, &options, &[SstSourceKind::SdrSst]);
    let both = assemble(&mesh, &store, &options, &[SstSourceKind::TkeSst, SstSourceKind::SdrSst]);

    for i in 0..mesh.n_nodes() {
        assert_close(both.rhs()[i], tke.rhs()[i] + sdr.rhs()[i], 1e-12);
        assert_close(both.lhs(i, i), tke.lhs(i, i) + sdr.lhs(i, i), 1e-12);
    }
}

#[test]
fn test_registry_mixed_topologies() {
    let (mut mesh, store) = hex_block(1, 1, 1);
    mesh.add_element("block_1", TopologyKind::Tet4, &[0, 1, 2, 4], true)
        .unwrap();
    let registry = SourceAlgorithmRegistry::build(
        &mesh,
        store.registry(),
        &SolutionOptions::default(),
        &Selector::part("block_1"),
        &[SstSourceKind::TkeSstDes, SstSourceKind::SdrSst],
    )
    .unwrap();

    assert_eq!(registry.topologies(), vec![TopologyKind::Tet4, TopologyKind::Hex8]);
    let hex = registry.get(TopologyKind::Hex8).unwrap();
    assert_eq!(hex.kernel_names(), vec!["tke_sst_des", "sdr_sst"]);

    let mut system = DenseLinearSystem::new(mesh.n_nodes());
    let stats = registry.execute_all(&mesh, &store, &mut system).unwrap();
    assert_eq!(stats.n_elements, 2);
    assert!(system.rhs().iter().all(|v| v.is_finite()));
}

#[test]
fn test_registry_rejects_duplicate_topology() {
    let (_, store) = hex_block(1, 1, 1);
    let options = SolutionOptions::default();
    let mut registry = SourceAlgorithmRegistry::new();
    registry
        .register(Box::new(hex_algorithm(&store, &options, &[SstSourceKind::TkeSst])))
        .unwrap();
    let err = registry
        .register(Box::new(hex_algorithm(&store, &options, &[SstSourceKind::SdrSst])))
        .unwrap_err();
    assert!(matches!(err, CtError::TopologyMismatch { .. }));
}

#[test]
fn test_unknown_part_rejected() {
    let (mesh, store) = hex_block(1, 1, 1);
    let result = SourceAlgorithmRegistry::build(
        &mesh,
        store.registry(),
        &SolutionOptions::default(),
        &Selector::part("missing"),
        &[SstSourceKind::TkeSst],
    );
    assert!(matches!(result, Err(CtError::Config { .. })));
}

#[test]
fn test_mismatched_store_rejected() {
    let (mesh, store) = hex_block(2, 1, 1);
    let registry = SourceAlgorithmRegistry::build(
        &mesh,
        store.registry(),
        &SolutionOptions::default(),
        &Selector::part("block_1"),
        &SstSourceKind::ALL,
    )
    .unwrap();
    let mut system = DenseLinearSystem::new(mesh.n_nodes());

    let small = FieldStore::new(3, 4);
    let err = registry.execute_all(&mesh, &small, &mut system).unwrap_err();
    assert!(matches!(
        err,
        CtError::SizeMismatch { expected: 12, actual: 4, .. }
    ));

    let flat = FieldStore::new(2, mesh.n_nodes());
    let err = registry.execute_all(&mesh, &flat, &mut system).unwrap_err();
    assert!(matches!(err, CtError::InvalidMesh { .. }));

    // 出错时不向系统写入任何贡献
    assert_eq!(system, DenseLinearSystem::new(mesh.n_nodes()));
}
