// crates/ct_physics/src/kernels/sdr_sst.rs

//! SST 比耗散率方程源项
//!
//! ```text
//! P_k  = min(μ_t Σ_i Σ_j dN_j u_i (dN_j u_i + dN_i u_j), r β* ρ ω k)
//! CD   = Σ_j (dN_j k)(dN_j ω)
//! σ_d  = 2 (1 - F1) σ_ω2
//! γ    = F1 γ_1 + (1 - F1) γ_2
//! β    = F1 β_1 + (1 - F1) β_2
//!
//! P_ω  = γ ρ P_k / μ_t
//! D_ω  = β ρ ω²
//! S_ω  = σ_d ρ CD / ω
//!
//! rhs[nn]     += (P_ω - D_ω + S_ω) V_scv
//! lhs[nn][nn] += (2 β ρ ω + max(-S_ω / ω, 0)) V_scv
//! ```
//!
//! 交叉扩散项为负时隐式处理，为正时留在右端。

use super::common::{check_master_element, nodal_production, SstFields};
use super::Kernel;
use crate::fields::{names, FieldHandle, FieldKind, FieldRegistry};
use crate::linsys::LocalMatrix;
use crate::requests::{CoordsConfig, ElemDataRequests};
use crate::scratch::ScratchViews;
use crate::topology::AlgTraits;
use ct_config::{SolutionOptions, TurbConstant};
use ct_foundation::CtResult;
use std::marker::PhantomData;

/// SST 模型中按 F1 混合的一组常数
#[derive(Debug, Clone, Copy, PartialEq)]
struct BlendedPair {
    one: f64,
    two: f64,
}

impl BlendedPair {
    #[inline]
    fn blend(self, f_one: f64) -> f64 {
        f_one * self.one + (1.0 - f_one) * self.two
    }
}

/// SST 比耗散率源项核函数
#[derive(Debug, Clone)]
pub struct SdrSstSrcKernel<T: AlgTraits> {
    fields: SstFields,
    f_one_blending: FieldHandle,
    beta_star: f64,
    tke_prod_limit_ratio: f64,
    sigma_w_two: f64,
    beta: BlendedPair,
    gamma: BlendedPair,
    ip_node_map: &'static [usize],
    _topo: PhantomData<T>,
}

impl<T: AlgTraits> SdrSstSrcKernel<T> {
    /// 解析字段与常数并声明数据需求
    pub fn new(
        fields: &FieldRegistry,
        options: &SolutionOptions,
        requests: &mut ElemDataRequests,
    ) -> CtResult<Self> {
        let constant = |id| options.turb_model_constant(id);
        let beta_star = constant(TurbConstant::BetaStar)?;
        let tke_prod_limit_ratio = constant(TurbConstant::TkeProdLimitRatio)?;
        let sigma_w_two = constant(TurbConstant::SigmaWTwo)?;
        let beta = BlendedPair {
            one: constant(TurbConstant::BetaOne)?,
            two: constant(TurbConstant::BetaTwo)?,
        };
        let gamma = BlendedPair {
            one: constant(TurbConstant::GammaOne)?,
            two: constant(TurbConstant::GammaTwo)?,
        };
        let ip_node_map = check_master_element::<T>()?;

        let f_one_blending = fields.get_field(FieldKind::Scalar, names::SST_F_ONE_BLENDING)?;
        let sst = SstFields::resolve::<T>(fields, options, requests)?;
        requests.add_gathered_nodal_field(f_one_blending, 1)?;

        log::debug!(
            "构建 sdr_sst 核函数: topo={}, beta=({}, {}), gamma=({}, {})",
            T::TOPO,
            beta.one,
            beta.two,
            gamma.one,
            gamma.two
        );

        Ok(Self {
            fields: sst,
            f_one_blending,
            beta_star,
            tke_prod_limit_ratio,
            sigma_w_two,
            beta,
            gamma,
            ip_node_map,
            _topo: PhantomData,
        })
    }
}

impl<T: AlgTraits> Kernel<T> for SdrSstSrcKernel<T> {
    fn name(&self) -> &'static str {
        "sdr_sst"
    }

    fn execute(&self, lhs: &mut LocalMatrix, rhs: &mut [f64], scratch: &ScratchViews<T>) {
        let tke = scratch.scalar_view(self.fields.tke);
        let sdr = scratch.scalar_view(self.fields.sdr);
        let density = scratch.scalar_view(self.fields.density);
        let tvisc = scratch.scalar_view(self.fields.tvisc);
        let f_one = scratch.scalar_view(self.f_one_blending);
        let velocity = scratch.vector_view(self.fields.velocity);
        let me = scratch.me_views(CoordsConfig::Current);

        for ip in 0..T::NUM_SCV_IP {
            let nn = self.ip_node_map[ip];
            let scv = me.scv_volume(ip);

            for ic in 0..T::NODES_PER_ELEMENT {
                let (rho, k, w, mut_t, f1) = (density[ic], tke[ic], sdr[ic], tvisc[ic], f_one[ic]);

                let pk = mut_t * nodal_production(me, &velocity, ip, ic, T::N_DIM);
                let mut cross_diff = 0.0;
                for j in 0..T::N_DIM {
                    let dnj = me.dndx(ip, ic, j);
                    cross_diff += dnj * k * dnj * w;
                }

                let dk = self.beta_star * rho * w * k;
                let pk = pk.min(self.tke_prod_limit_ratio * dk);

                let sigma_d = 2.0 * (1.0 - f1) * self.sigma_w_two;
                let gamma = self.gamma.blend(f1);
                let beta = self.beta.blend(f1);

                let pw = gamma * rho * pk / mut_t;
                let dw = beta * rho * w * w;
                let sw = sigma_d * rho * cross_diff / w;

                rhs[nn] += (pw - dw + sw) * scv;
                lhs[(nn, nn)] += (2.0 * beta * rho * w + (-sw / w).max(0.0)) * scv;
            }
        }
    }
}
