// crates/ct_physics/src/master_element/mod.rs

//! 参考单元（Master Element）
//!
//! 为控制体有限元（CVFEM）提供子控制体（SCV）几何量：
//! - `ip_node_map`: 积分点 → 最近节点
//! - `scv_volume`: 每个积分点对应的子控制体体积
//! - `scv_grad_op`: 积分点处形函数的物理空间梯度 `dndx[ip][node][dim]`
//!
//! # 积分规则
//!
//! 积分点 `ip` 位于参考空间中节点 `ip` 与单元形心连线的中点，
//! 子体积取 `det J(ip) × |参考单元| / 节点数`。对仿射单元（四面体、
//! 平行六面体等）子体积之和精确等于单元体积。
//!
//! 求解器内核只消费这些预计算张量，不关心其来源；
//! 需要其他积分规则时实现 [`MasterElement`] 即可。

mod shape;

pub use shape::{reference_measure, reference_nodes, shape_derivatives, shape_values};

use crate::topology::TopologyKind;
use glam::{DMat2, DMat3, DVec2, DVec3};
use std::fmt;
use std::sync::OnceLock;

/// 参考单元接口
pub trait MasterElement: Send + Sync + fmt::Debug {
    /// 拓扑
    fn topology(&self) -> TopologyKind;

    /// 单元节点数
    fn nodes_per_element(&self) -> usize;

    /// 空间维数
    fn n_dim(&self) -> usize;

    /// 积分点数
    fn num_integration_points(&self) -> usize;

    /// 积分点 → 最近节点
    fn ip_node_map(&self) -> &[usize];

    /// 子控制体体积
    ///
    /// # 参数
    /// - `coords`: 节点坐标，节点主序，长度 `nodes × n_dim`
    /// - `volume`: 输出，长度 `num_ip`
    fn scv_volume(&self, coords: &[f64], volume: &mut [f64]);

    /// 子控制体梯度算子
    ///
    /// # 参数
    /// - `coords`: 节点坐标，节点主序
    /// - `dndx`: 输出，`(ip × nodes + node) × n_dim + dim`
    fn scv_grad_op(&self, coords: &[f64], dndx: &mut [f64]);
}

/// 等参子控制体参考单元
#[derive(Debug, Clone)]
pub struct ScvMasterElement {
    kind: TopologyKind,
    ip_node_map: Vec<usize>,
    /// 积分点处 ∂N/∂ξ，`ip × nodes`
    ref_derivs: Vec<[f64; 3]>,
    /// 每个子控制体在参考空间的测度
    sub_measure: f64,
}

impl ScvMasterElement {
    /// 按拓扑构建
    pub fn new(kind: TopologyKind) -> Self {
        let nodes = reference_nodes(kind);
        let npe = nodes.len();

        let mut centroid = [0.0; 3];
        for r in nodes {
            for j in 0..3 {
                centroid[j] += r[j] / npe as f64;
            }
        }

        let mut ref_derivs = vec![[0.0; 3]; npe * npe];
        for (ip, r) in nodes.iter().enumerate() {
            let xi = [
                0.5 * (r[0] + centroid[0]),
                0.5 * (r[1] + centroid[1]),
                0.5 * (r[2] + centroid[2]),
            ];
            shape_derivatives(kind, xi, &mut ref_derivs[ip * npe..(ip + 1) * npe]);
        }

        Self {
            kind,
            ip_node_map: (0..npe).collect(),
            ref_derivs,
            sub_measure: reference_measure(kind) / npe as f64,
        }
    }

    #[inline]
    fn derivs(&self, ip: usize) -> &[[f64; 3]] {
        let npe = self.ip_node_map.len();
        &self.ref_derivs[ip * npe..(ip + 1) * npe]
    }

    /// 积分点处的 Jacobian（3D），列 j 为 ∂x/∂ξ_j
    fn jacobian_3d(&self, ip: usize, coords: &[f64]) -> DMat3 {
        let mut cols = [DVec3::ZERO; 3];
        for (n, d) in self.derivs(ip).iter().enumerate() {
            let x = DVec3::new(coords[3 * n], coords[3 * n + 1], coords[3 * n + 2]);
            for j in 0..3 {
                cols[j] += x * d[j];
            }
        }
        DMat3::from_cols(cols[0], cols[1], cols[2])
    }

    /// 积分点处的 Jacobian（2D）
    fn jacobian_2d(&self, ip: usize, coords: &[f64]) -> DMat2 {
        let mut cols = [DVec2::ZERO; 2];
        for (n, d) in self.derivs(ip).iter().enumerate() {
            let x = DVec2::new(coords[2 * n], coords[2 * n + 1]);
            for j in 0..2 {
                cols[j] += x * d[j];
            }
        }
        DMat2::from_cols(cols[0], cols[1])
    }
}

impl MasterElement for ScvMasterElement {
    fn topology(&self) -> TopologyKind {
        self.kind
    }

    fn nodes_per_element(&self) -> usize {
        self.ip_node_map.len()
    }

    fn n_dim(&self) -> usize {
        self.kind.n_dim()
    }

    fn num_integration_points(&self) -> usize {
        self.ip_node_map.len()
    }

    fn ip_node_map(&self) -> &[usize] {
        &self.ip_node_map
    }

    fn scv_volume(&self, coords: &[f64], volume: &mut [f64]) {
        for (ip, v) in volume.iter_mut().enumerate().take(self.num_integration_points()) {
            let det = match self.n_dim() {
                2 => self.jacobian_2d(ip, coords).determinant(),
                _ => self.jacobian_3d(ip, coords).determinant(),
            };
            *v = det * self.sub_measure;
        }
    }

    fn scv_grad_op(&self, coords: &[f64], dndx: &mut [f64]) {
        let npe = self.nodes_per_element();
        let dim = self.n_dim();
        for ip in 0..self.num_integration_points() {
            let derivs = self.derivs(ip);
            match dim {
                2 => {
                    let inv_t = self.jacobian_2d(ip, coords).inverse().transpose();
                    for (n, d) in derivs.iter().enumerate() {
                        let g = inv_t * DVec2::new(d[0], d[1]);
                        let base = (ip * npe + n) * 2;
                        dndx[base] = g.x;
                        dndx[base + 1] = g.y;
                    }
                }
                _ => {
                    let inv_t = self.jacobian_3d(ip, coords).inverse().transpose();
                    for (n, d) in derivs.iter().enumerate() {
                        let g = inv_t * DVec3::new(d[0], d[1], d[2]);
                        let base = (ip * npe + n) * 3;
                        dndx[base] = g.x;
                        dndx[base + 1] = g.y;
                        dndx[base + 2] = g.z;
                    }
                }
            }
        }
    }
}

/// 参考单元仓库（进程内共享实例）
pub struct MasterElementRepo;

impl MasterElementRepo {
    /// 获取体参考单元
    pub fn volume(kind: TopologyKind) -> &'static ScvMasterElement {
        static REPO: OnceLock<Vec<ScvMasterElement>> = OnceLock::new();
        let repo = REPO.get_or_init(|| {
            TopologyKind::ALL
                .iter()
                .map(|&k| ScvMasterElement::new(k))
                .collect()
        });
        // 与 ALL 的顺序一致
        let slot = match kind {
            TopologyKind::Tri3 => 0,
            TopologyKind::Quad4 => 1,
            TopologyKind::Tet4 => 2,
            TopologyKind::Pyr5 => 3,
            TopologyKind::Wedge6 => 4,
            TopologyKind::Hex8 => 5,
        };
        &repo[slot]
    }
}
