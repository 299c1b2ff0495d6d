// crates/ct_physics/src/kernels/tke_sst.rs

//! SST 湍动能方程源项
//!
//! 对每个子控制体积分点 `ip`（最近节点 `nn`）和每个单元节点 `ic`：
//!
//! ```text
//! P_k = μ_t Σ_i Σ_j dN_j u_i (dN_j u_i + dN_i u_j)
//! D_k = β* ρ ω k
//! P_k = min(P_k, r D_k)
//!
//! rhs[nn]     += (P_k - D_k) V_scv
//! lhs[nn][nn] += β* ρ ω V_scv
//! ```
//!
//! 产生项显式处理，只有耗散项进入 Jacobian 对角。

use super::common::{check_master_element, nodal_production, SstFields};
use super::Kernel;
use crate::fields::FieldRegistry;
use crate::linsys::LocalMatrix;
use crate::requests::{CoordsConfig, ElemDataRequests};
use crate::scratch::ScratchViews;
use crate::topology::AlgTraits;
use ct_config::{SolutionOptions, TurbConstant};
use ct_foundation::CtResult;
use std::marker::PhantomData;

/// SST 湍动能源项核函数
#[derive(Debug, Clone)]
pub struct TkeSstSrcKernel<T: AlgTraits> {
    fields: SstFields,
    beta_star: f64,
    tke_prod_limit_ratio: f64,
    ip_node_map: &'static [usize],
    _topo: PhantomData<T>,
}

impl<T: AlgTraits> TkeSstSrcKernel<T> {
    /// 解析字段与常数并声明数据需求
    pub fn new(
        fields: &FieldRegistry,
        options: &SolutionOptions,
        requests: &mut ElemDataRequests,
    ) -> CtResult<Self> {
        let beta_star = options.turb_model_constant(TurbConstant::BetaStar)?;
        let tke_prod_limit_ratio = options.turb_model_constant(TurbConstant::TkeProdLimitRatio)?;
        let ip_node_map = check_master_element::<T>()?;
        let fields = SstFields::resolve::<T>(fields, options, requests)?;

        log::debug!(
            "构建 tke_sst 核函数: topo={}, beta_star={beta_star}, limit_ratio={tke_prod_limit_ratio}",
            T::TOPO
        );

        Ok(Self {
            fields,
            beta_star,
            tke_prod_limit_ratio,
            ip_node_map,
            _topo: PhantomData,
        })
    }
}

impl<T: AlgTraits> Kernel<T> for TkeSstSrcKernel<T> {
    fn name(&self) -> &'static str {
        "tke_sst"
    }

    fn execute(&self, lhs: &mut LocalMatrix, rhs: &mut [f64], scratch: &ScratchViews<T>) {
        let tke = scratch.scalar_view(self.fields.tke);
        let sdr = scratch.scalar_view(self.fields.sdr);
        let density = scratch.scalar_view(self.fields.density);
        let tvisc = scratch.scalar_view(self.fields.tvisc);
        let velocity = scratch.vector_view(self.fields.velocity);
        let me = scratch.me_views(CoordsConfig::Current);

        for ip in 0..T::NUM_SCV_IP {
            let nn = self.ip_node_map[ip];
            let scv = me.scv_volume(ip);

            for ic in 0..T::NODES_PER_ELEMENT {
                let pk = tvisc[ic] * nodal_production(me, &velocity, ip, ic, T::N_DIM);

                let tke_fac = self.beta_star * density[ic] * sdr[ic];
                let dk = tke_fac * tke[ic];
                let pk = pk.min(self.tke_prod_limit_ratio * dk);

                rhs[nn] += (pk - dk) * scv;
                lhs[(nn, nn)] += tke_fac * scv;
            }
        }
    }
}
