// crates/ct_physics/tests/common/mod.rs

//! 集成测试公共夹具

#![allow(dead_code)]

use ct_config::SolutionOptions;
use ct_foundation::NodeIndex;
use ct_physics::fields::{names, FieldKind, FieldStore};
use ct_physics::kernels::{Kernel, SstSourceKernel, SstSourceKind};
use ct_physics::linsys::LocalMatrix;
use ct_physics::master_element::reference_nodes;
use ct_physics::mesh::ElementMesh;
use ct_physics::requests::ElemDataRequests;
use ct_physics::scratch::ScratchViews;
use ct_physics::topology::AlgTraits;

/// 仿射映射 x = A ξ + b
const AFFINE_A: [[f64; 3]; 3] = [[1.3, 0.2, 0.1], [0.1, 0.9, -0.2], [0.0, 0.3, 1.1]];
const AFFINE_B: [f64; 3] = [0.5, -0.25, 2.0];

/// 在所有节点字段中注册核函数和诊断算法需要的字段
pub fn register_all(store: &mut FieldStore) {
    store.register(names::COORDINATES, FieldKind::Vector).unwrap();
    for name in [
        names::TURBULENT_KE,
        names::SPECIFIC_DISSIPATION_RATE,
        names::DENSITY,
        names::TURBULENT_VISCOSITY,
        names::SST_MAX_LENGTH_SCALE,
        names::SST_F_ONE_BLENDING,
        names::RESOLUTION_ADEQUACY,
    ] {
        store.register(name, FieldKind::Scalar).unwrap();
    }
    store.register(names::VELOCITY, FieldKind::Vector).unwrap();
    store.register(names::DUDX, FieldKind::Tensor).unwrap();
    store.register(names::METRIC_TENSOR, FieldKind::Tensor).unwrap();
}

/// 按坐标填充确定性的合成字段
///
/// `velocity_scale` 只缩放速度，用于控制产生项相对耗散项的大小。
pub fn fill_synthetic(store: &mut FieldStore, velocity_scale: f64) {
    let dim = store.n_dim();
    let coords = store.get_field(FieldKind::Vector, names::COORDINATES).unwrap();
    let xyz: Vec<[f64; 3]> = (0..store.n_nodes())
        .map(|n| {
            let c = store.node_values(coords, NodeIndex::new(n));
            [c[0], c[1], if dim == 3 { c[2] } else { 0.0 }]
        })
        .collect();

    let scalar = |store: &mut FieldStore, name: &str, f: &dyn Fn([f64; 3]) -> f64| {
        let h = store.get_field(FieldKind::Scalar, name).unwrap();
        store.fill_with(h, |n, v| v[0] = f(xyz[n.get()]));
    };
    scalar(store, names::DENSITY, &|_| 1.0);
    scalar(store, names::TURBULENT_KE, &|[x, _, z]| 1.0 + 0.2 * x + 0.1 * z);
    scalar(store, names::SPECIFIC_DISSIPATION_RATE, &|[_, y, _]| 2.0 + 0.5 * y);
    scalar(store, names::TURBULENT_VISCOSITY, &|[x, _, _]| 0.1 + 0.05 * x.abs());
    scalar(store, names::SST_F_ONE_BLENDING, &|[x, _, _]| 0.3 + 0.1 * x.abs().min(1.0));
    scalar(store, names::SST_MAX_LENGTH_SCALE, &|_| 0.5);

    let vel = store.get_field(FieldKind::Vector, names::VELOCITY).unwrap();
    store.fill_with(vel, |n, v| {
        let [x, y, z] = xyz[n.get()];
        let u = [1.0 + 0.3 * x + 0.1 * y, -0.2 + 0.5 * z + 0.4 * x, 0.4 * x * y];
        for d in 0..dim {
            v[d] = velocity_scale * u[d];
        }
    });
}

/// 单个 `T` 拓扑单元：参考节点经仿射映射后的坐标与合成字段
pub fn single_element<T: AlgTraits>(velocity_scale: f64) -> (ElementMesh, FieldStore) {
    let dim = T::N_DIM;
    let npe = T::NODES_PER_ELEMENT;

    let mut store = FieldStore::new(dim, npe);
    register_all(&mut store);
    let coords = store.get_field(FieldKind::Vector, names::COORDINATES).unwrap();
    let nodes = reference_nodes(T::TOPO);
    store.fill_with(coords, |n, v| {
        let r = nodes[n.get()];
        for i in 0..dim {
            v[i] = AFFINE_B[i] + (0..dim).map(|j| AFFINE_A[i][j] * r[j]).sum::<f64>();
        }
    });
    fill_synthetic(&mut store, velocity_scale);

    let mut mesh = ElementMesh::new(dim, npe);
    let conn: Vec<usize> = (0..npe).collect();
    mesh.add_element("block_1", T::TOPO, &conn, true).unwrap();
    (mesh, store)
}

/// 构建单个核函数并在 `0..npe` 连接关系的单元上求值
pub fn evaluate<T: AlgTraits>(
    kind: SstSourceKind,
    store: &FieldStore,
    options: &SolutionOptions,
) -> (LocalMatrix, Vec<f64>, ScratchViews<T>) {
    let mut reqs = ElemDataRequests::new();
    let kernel = SstSourceKernel::<T>::build(kind, store.registry(), options, &mut reqs).unwrap();
    let mut scratch = ScratchViews::<T>::new(&reqs).unwrap();
    let nodes: Vec<NodeIndex> = (0..T::NODES_PER_ELEMENT).map(NodeIndex::new).collect();
    scratch.gather(store, &nodes);

    let mut lhs = LocalMatrix::zeros(T::NODES_PER_ELEMENT);
    let mut rhs = vec![0.0; T::NODES_PER_ELEMENT];
    kernel.execute(&mut lhs, &mut rhs, &scratch);
    (lhs, rhs, scratch)
}

/// `nx × ny × nz` 个单位六面体组成的结构化块
///
/// 节点按 x 最快编号，单元全部属于 `block_1` 且本地拥有。
pub fn hex_block(nx: usize, ny: usize, nz: usize) -> (ElementMesh, FieldStore) {
    let (px, py, pz) = (nx + 1, ny + 1, nz + 1);
    let n_nodes = px * py * pz;
    let id = |i: usize, j: usize, k: usize| i + px * (j + py * k);

    let mut store = FieldStore::new(3, n_nodes);
    register_all(&mut store);
    let coords = store.get_field(FieldKind::Vector, names::COORDINATES).unwrap();
    store.fill_with(coords, |n, v| {
        let n = n.get();
        let (i, j, k) = (n % px, (n / px) % py, n / (px * py));
        // 轻微扭曲，避免所有单元完全相同
        v[0] = i as f64 + 0.05 * (j * k) as f64;
        v[1] = j as f64 + 0.03 * (i * k) as f64;
        v[2] = k as f64 * 0.8;
    });
    fill_synthetic(&mut store, 1.0);

    let mut mesh = ElementMesh::new(3, n_nodes);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let conn = [
                    id(i, j, k),
                    id(i + 1, j, k),
                    id(i + 1, j + 1, k),
                    id(i, j + 1, k),
                    id(i, j, k + 1),
                    id(i + 1, j, k + 1),
                    id(i + 1, j + 1, k + 1),
                    id(i, j + 1, k + 1),
                ];
                mesh.add_element("block_1", ct_physics::topology::TopologyKind::Hex8, &conn, true)
                    .unwrap();
            }
        }
    }
    (mesh, store)
}

/// 相对误差比较
pub fn assert_close(a: f64, b: f64, rtol: f64) {
    let scale = a.abs().max(b.abs()).max(1e-300);
    assert!((a - b).abs() <= rtol * scale, "{a} vs {b}");
}
