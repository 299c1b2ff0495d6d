// crates/ct_physics/src/master_element/shape.rs

//! 参考单元形函数
//!
//! 参考坐标约定：
//! - Tri3 / Tet4: 单位单纯形，顶点在原点与各坐标轴的 1 处
//! - Quad4 / Hex8: [-1, 1]^d
//! - Pyr5: 底面 [-1, 1]^2 位于 ζ=0，顶点 (0, 0, 1)
//! - Wedge6: 单位三角形 × ζ∈[-1, 1]，节点 0-2 在 ζ=-1

use crate::topology::TopologyKind;

const TRI3_NODES: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

const QUAD4_NODES: [[f64; 3]; 4] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
];

const TET4_NODES: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

const PYR5_NODES: [[f64; 3]; 5] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

const WEDGE6_NODES: [[f64; 3]; 6] = [
    [0.0, 0.0, -1.0],
    [1.0, 0.0, -1.0],
    [0.0, 1.0, -1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
];

const HEX8_NODES: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// 参考单元节点坐标
pub fn reference_nodes(kind: TopologyKind) -> &'static [[f64; 3]] {
    match kind {
        TopologyKind::Tri3 => &TRI3_NODES,
        TopologyKind::Quad4 => &QUAD4_NODES,
        TopologyKind::Tet4 => &TET4_NODES,
        TopologyKind::Pyr5 => &PYR5_NODES,
        TopologyKind::Wedge6 => &WEDGE6_NODES,
        TopologyKind::Hex8 => &HEX8_NODES,
    }
}

/// 参考单元的面积/体积
pub fn reference_measure(kind: TopologyKind) -> f64 {
    match kind {
        TopologyKind::Tri3 => 0.5,
        TopologyKind::Quad4 => 4.0,
        TopologyKind::Tet4 => 1.0 / 6.0,
        TopologyKind::Pyr5 => 4.0 / 3.0,
        TopologyKind::Wedge6 => 1.0,
        TopologyKind::Hex8 => 8.0,
    }
}

/// 形函数值
pub fn shape_values(kind: TopologyKind, xi: [f64; 3], out: &mut [f64]) {
    let [x, y, z] = xi;
    match kind {
        TopologyKind::Tri3 => {
            out[0] = 1.0 - x - y;
            out[1] = x;
            out[2] = y;
        }
        TopologyKind::Tet4 => {
            out[0] = 1.0 - x - y - z;
            out[1] = x;
            out[2] = y;
            out[3] = z;
        }
        TopologyKind::Quad4 => {
            for (n, r) in QUAD4_NODES.iter().enumerate() {
                out[n] = 0.25 * (1.0 + r[0] * x) * (1.0 + r[1] * y);
            }
        }
        TopologyKind::Hex8 => {
            for (n, r) in HEX8_NODES.iter().enumerate() {
                out[n] = 0.125 * (1.0 + r[0] * x) * (1.0 + r[1] * y) * (1.0 + r[2] * z);
            }
        }
        TopologyKind::Wedge6 => {
            let tri = [1.0 - x - y, x, y];
            for a in 0..3 {
                out[a] = tri[a] * 0.5 * (1.0 - z);
                out[a + 3] = tri[a] * 0.5 * (1.0 + z);
            }
        }
        TopologyKind::Pyr5 => {
            let t = x * y * z / (1.0 - z);
            for (n, r) in PYR5_NODES.iter().take(4).enumerate() {
                out[n] = 0.25 * ((1.0 + r[0] * x) * (1.0 + r[1] * y) - z + r[0] * r[1] * t);
            }
            out[4] = z;
        }
    }
}

/// 形函数对参考坐标的导数，`out[n][j] = ∂N_n/∂ξ_j`
pub fn shape_derivatives(kind: TopologyKind, xi: [f64; 3], out: &mut [[f64; 3]]) {
    let [x, y, z] = xi;
    match kind {
        TopologyKind::Tri3 => {
            out[0] = [-1.0, -1.0, 0.0];
            out[1] = [1.0, 0.0, 0.0];
            out[2] = [0.0, 1.0, 0.0];
        }
        TopologyKind::Tet4 => {
            out[0] = [-1.0, -1.0, -1.0];
            out[1] = [1.0, 0.0, 0.0];
            out[2] = [0.0, 1.0, 0.0];
            out[3] = [0.0, 0.0, 1.0];
        }
        TopologyKind::Quad4 => {
            for (n, r) in QUAD4_NODES.iter().enumerate() {
                out[n] = [
                    0.25 * r[0] * (1.0 + r[1] * y),
                    0.25 * r[1] * (1.0 + r[0] * x),
                    0.0,
                ];
            }
        }
        TopologyKind::Hex8 => {
            for (n, r) in HEX8_NODES.iter().enumerate() {
                out[n] = [
                    0.125 * r[0] * (1.0 + r[1] * y) * (1.0 + r[2] * z),
                    0.125 * r[1] * (1.0 + r[0] * x) * (1.0 + r[2] * z),
                    0.125 * r[2] * (1.0 + r[0] * x) * (1.0 + r[1] * y),
                ];
            }
        }
        TopologyKind::Wedge6 => {
            let tri = [1.0 - x - y, x, y];
            let dtri = [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]];
            for a in 0..3 {
                let lo = 0.5 * (1.0 - z);
                let hi = 0.5 * (1.0 + z);
                out[a] = [dtri[a][0] * lo, dtri[a][1] * lo, -0.5 * tri[a]];
                out[a + 3] = [dtri[a][0] * hi, dtri[a][1] * hi, 0.5 * tri[a]];
            }
        }
        TopologyKind::Pyr5 => {
            let w = 1.0 - z;
            for (n, r) in PYR5_NODES.iter().take(4).enumerate() {
                let s = r[0] * r[1];
                out[n] = [
                    0.25 * (r[0] * (1.0 + r[1] * y) + s * y * z / w),
                    0.25 * (r[1] * (1.0 + r[0] * x) + s * x * z / w),
                    0.25 * (-1.0 + s * x * y / (w * w)),
                ];
            }
            out[4] = [0.0, 0.0, 1.0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points(kind: TopologyKind) -> Vec<[f64; 3]> {
        match kind {
            TopologyKind::Tri3 => vec![[0.2, 0.3, 0.0], [0.6, 0.1, 0.0]],
            TopologyKind::Tet4 => vec![[0.1, 0.2, 0.3], [0.25, 0.25, 0.25]],
            TopologyKind::Quad4 => vec![[0.3, -0.4, 0.0], [0.9, 0.1, 0.0]],
            TopologyKind::Hex8 => vec![[0.3, -0.4, 0.5], [-0.9, 0.1, 0.2]],
            TopologyKind::Wedge6 => vec![[0.2, 0.3, -0.5], [0.1, 0.6, 0.7]],
            TopologyKind::Pyr5 => vec![[0.1, -0.2, 0.3], [0.4, 0.3, 0.5]],
        }
    }

    #[test]
    fn test_partition_of_unity() {
        for kind in TopologyKind::ALL {
            let n = kind.nodes_per_element();
            let mut vals = vec![0.0; n];
            let mut ders = vec![[0.0; 3]; n];
            for xi in sample_points(kind) {
                shape_values(kind, xi, &mut vals);
                shape_derivatives(kind, xi, &mut ders);
                let sum: f64 = vals.iter().sum();
                assert!((sum - 1.0).abs() < 1e-14, "{kind}: Σ N = {sum}");
                for j in 0..3 {
                    let dsum: f64 = ders.iter().map(|d| d[j]).sum();
                    assert!(dsum.abs() < 1e-14, "{kind}: Σ dN/dξ{j} = {dsum}");
                }
            }
        }
    }

    #[test]
    fn test_kronecker_property() {
        for kind in TopologyKind::ALL {
            let n = kind.nodes_per_element();
            let mut vals = vec![0.0; n];
            for (a, r) in reference_nodes(kind).iter().enumerate() {
                // 金字塔顶点处有理项奇异，跳过
                if kind == TopologyKind::Pyr5 && a == 4 {
                    continue;
                }
                shape_values(kind, *r, &mut vals);
                for (b, v) in vals.iter().enumerate() {
                    let expected = if a == b { 1.0 } else { 0.0 };
                    assert!((v - expected).abs() < 1e-14, "{kind}: N{b}(x{a}) = {v}");
                }
            }
        }
    }

    #[test]
    fn test_derivatives_match_finite_difference() {
        let h = 1e-6;
        for kind in TopologyKind::ALL {
            let n = kind.nodes_per_element();
            let dim = kind.n_dim();
            let mut ders = vec![[0.0; 3]; n];
            let mut plus = vec![0.0; n];
            let mut minus = vec![0.0; n];
            for xi in sample_points(kind) {
                shape_derivatives(kind, xi, &mut ders);
                for j in 0..dim {
                    let mut xp = xi;
                    let mut xm = xi;
                    xp[j] += h;
                    xm[j] -= h;
                    shape_values(kind, xp, &mut plus);
                    shape_values(kind, xm, &mut minus);
                    for a in 0..n {
                        let fd = (plus[a] - minus[a]) / (2.0 * h);
                        assert!((fd - ders[a][j]).abs() < 1e-7, "{kind}: dN{a}/dξ{j}");
                    }
                }
            }
        }
    }
}
