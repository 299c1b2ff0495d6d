// crates/ct_physics/src/algorithms/resolution_adequacy.rs

//! 分辨率充分性诊断
//!
//! 衡量局部网格尺度相对湍流模型长度尺度是否足够精细：
//!
//! ```text
//! P_ij = Σ_k ∂_k u_j (∂_k u_i + ∂_i u_k) + ∂_k u_i (∂_k u_j + ∂_j u_k)
//! r    = C_h Σ_ij M_ij P_ij / (μ_t ω / C_hμ)
//! ```
//!
//! 其中 `dudx[n_dim * i + k] = ∂u_i/∂x_k`，`M` 为各向异性网格度量张量。
//!
//! # 执行流程
//!
//! 1. 区域内全部节点（不限于本地拥有）重置为 1.0
//! 2. 遍历区域内本地拥有的单元，逐节点覆盖写入 `r`
//! 3. 网格存在周期配对时同步字段
//! 4. 检查区域节点与周期节点上的非有限值
//!
//! 输入张量本身是节点量，同一节点无论由哪个单元写入结果都相同。
//! `μ_t ω = 0` 不做特殊处理，非有限值由返回的 [`ValidationReport`] 报告。

use crate::fields::{names, FieldHandle, FieldKind, FieldRegistry, FieldStore};
use crate::mesh::{ElementMesh, PeriodicFieldUpdate, Selector};
use ct_config::{SolutionOptions, TurbConstant};
use ct_foundation::{ensure, CtError, CtResult, ValidationReport};

/// 单节点分辨率充分性参数
///
/// `dudx` 与 `mij` 为行主序 `n_dim × n_dim` 张量。
pub fn resolution_adequacy(
    dudx: &[f64],
    mij: &[f64],
    tvisc: f64,
    sdr: f64,
    ch: f64,
    ch_mu: f64,
    n_dim: usize,
) -> f64 {
    let mut ra = 0.0;
    for i in 0..n_dim {
        for j in 0..n_dim {
            let mut pij = 0.0;
            for k in 0..n_dim {
                pij += dudx[n_dim * j + k] * (dudx[n_dim * i + k] + dudx[n_dim * k + i])
                    + dudx[n_dim * i + k] * (dudx[n_dim * j + k] + dudx[n_dim * k + j]);
            }
            ra += mij[n_dim * i + j] * pij;
        }
    }
    let v2 = tvisc * sdr / ch_mu;
    ra * ch / v2
}

/// 分辨率充分性算法
#[derive(Debug, Clone)]
pub struct ComputeResolutionAdequacyElemAlgorithm {
    region: Selector,
    n_dim: usize,
    sdr: FieldHandle,
    tvisc: FieldHandle,
    dudx: FieldHandle,
    metric_tensor: FieldHandle,
    resolution_adequacy: FieldHandle,
    ch: f64,
    ch_mu: f64,
}

impl ComputeResolutionAdequacyElemAlgorithm {
    /// 解析字段与常数
    ///
    /// `parts` 为算法作用的网格分区，区域取其并集；未知分区名为配置错误。
    pub fn new<S: AsRef<str>>(
        mesh: &ElementMesh,
        fields: &FieldRegistry,
        options: &SolutionOptions,
        parts: &[S],
    ) -> CtResult<Self> {
        let ch = options.turb_model_constant(TurbConstant::Ch)?;
        let ch_mu = options.turb_model_constant(TurbConstant::ChMu)?;

        let region = Selector::select_union(parts.iter().map(|p| p.as_ref().to_string()));
        mesh.validate_selector(&region)?;

        fields.get_field(FieldKind::Vector, options.coordinates_name())?;
        let alg = Self {
            region,
            n_dim: fields.n_dim(),
            sdr: fields.get_field(FieldKind::Scalar, names::SPECIFIC_DISSIPATION_RATE)?,
            tvisc: fields.get_field(FieldKind::Scalar, names::TURBULENT_VISCOSITY)?,
            dudx: fields.get_field(FieldKind::Tensor, names::DUDX)?,
            metric_tensor: fields.get_field(FieldKind::Tensor, names::METRIC_TENSOR)?,
            resolution_adequacy: fields.get_field(FieldKind::Scalar, names::RESOLUTION_ADEQUACY)?,
            ch,
            ch_mu,
        };

        log::debug!(
            "构建分辨率充分性算法: 分区 {}, ch={ch}, ch_mu={ch_mu}",
            parts.len()
        );
        Ok(alg)
    }

    /// 作用区域
    #[inline]
    pub fn region(&self) -> &Selector {
        &self.region
    }

    /// 输出字段
    #[inline]
    pub fn output_field(&self) -> FieldHandle {
        self.resolution_adequacy
    }

    /// 执行诊断
    ///
    /// 返回输出字段的有限性检查报告。
    pub fn execute(&self, mesh: &ElementMesh, store: &mut FieldStore) -> CtResult<ValidationReport> {
        mesh.validate_selector(&self.region)?;
        CtError::check_size("nodes", mesh.n_nodes(), store.n_nodes())?;
        ensure!(
            mesh.n_dim() == self.n_dim,
            CtError::invalid_mesh(format!(
                "网格为 {} 维, 字段按 {} 维注册",
                mesh.n_dim(),
                self.n_dim
            ))
        );

        let ra = self.resolution_adequacy;

        // 重置
        let nodes = mesh.select_nodes(&self.region);
        for &node in &nodes {
            store.node_values_mut(ra, node)[0] = 1.0;
        }

        // 逐单元覆盖写入
        let owned = Selector::LocallyOwned & self.region.clone();
        let elems = mesh.select_elements(&owned);
        for &e in &elems {
            for &node in &mesh.element(e).nodes {
                let value = resolution_adequacy(
                    store.node_values(self.dudx, node),
                    store.node_values(self.metric_tensor, node),
                    store.node_values(self.tvisc, node)[0],
                    store.node_values(self.sdr, node)[0],
                    self.ch,
                    self.ch_mu,
                    self.n_dim,
                );
                store.node_values_mut(ra, node)[0] = value;
            }
        }

        if let Some(pairing) = mesh.periodic() {
            pairing.periodic_field_update(store, ra, 1);
        }

        // 只检查本算法写入的节点
        let mut checked = nodes.clone();
        if let Some(pairing) = mesh.periodic() {
            checked.extend(pairing.pairs().iter().flat_map(|&(m, s)| [m, s]));
            checked.sort_unstable();
            checked.dedup();
        }
        let report =
            ValidationReport::scan_finite(names::RESOLUTION_ADEQUACY, store.values(ra), 1, &checked);
        if !report.is_clean() {
            log::warn!(
                "{}: {} 个非有限值 (μ_t ω 可能为零)",
                names::RESOLUTION_ADEQUACY,
                report.non_finite_count()
            );
        }
        log::debug!(
            "分辨率充分性: 重置 {} 个节点, 处理 {} 个本地单元, 范数 {:.6e}",
            nodes.len(),
            elems.len(),
            store.field_norm(ra)
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pure_shear_2d() {
        // u = (γ y, 0): dudx = [0 γ; 0 0]
        let g = 3.0;
        let dudx = [0.0, g, 0.0, 0.0];
        let identity = [1.0, 0.0, 0.0, 1.0];
        let ra = resolution_adequacy(&dudx, &identity, 1.0, 1.0, 1.0, 1.0, 2);
        // tr P = Σ_ik 2 dudx_ik (dudx_ik + dudx_ki) = 2 γ²
        assert_relative_eq!(ra, 2.0 * g * g);
    }

    #[test]
    fn test_normalization() {
        let dudx = [0.1, 0.2, -0.3, 0.05, 0.0, 0.4, 0.2, -0.1, 0.3];
        let m = [1.0, 0.1, 0.0, 0.1, 2.0, 0.3, 0.0, 0.3, 0.5];
        let base = resolution_adequacy(&dudx, &m, 1.0, 1.0, 1.0, 1.0, 3);
        let scaled = resolution_adequacy(&dudx, &m, 2.0, 0.5, 2.0, 2.7, 3);
        assert_relative_eq!(scaled, base * 2.0 * 2.7, max_relative = 1e-14);
    }

    #[test]
    fn test_quadratic_in_gradient() {
        let dudx = [0.1, 0.2, -0.3, 0.05, 0.0, 0.4, 0.2, -0.1, 0.3];
        let m = [1.0, 0.1, 0.0, 0.1, 2.0, 0.3, 0.0, 0.3, 0.5];
        let s = 3.5;
        let dudx_s: Vec<f64> = dudx.iter().map(|v| v * s).collect();
        let a = resolution_adequacy(&dudx, &m, 0.3, 1.7, 2.0, 2.7, 3);
        let b = resolution_adequacy(&dudx_s, &m, 0.3, 1.7, 2.0, 2.7, 3);
        assert_relative_eq!(b, a * s * s, max_relative = 1e-13);
    }

    #[test]
    fn test_zero_scale_product_is_not_finite() {
        let dudx = [0.0, 1.0, 0.0, 0.0];
        let identity = [1.0, 0.0, 0.0, 1.0];
        let ra = resolution_adequacy(&dudx, &identity, 0.0, 1.0, 2.0, 2.7, 2);
        assert!(!ra.is_finite());
    }
}
