// crates/ct_physics/src/kernels/tke_sst_des.rs

//! SST-DES 湍动能方程源项
//!
//! 与 [`TkeSstSrcKernel`](super::TkeSstSrcKernel) 相同的积分结构，
//! 耗散项按亚格子尺度放大：
//!
//! ```text
//! l_SST = √k / (β* ω)
//! C_DES = F1 C_DES,kε + (1 - F1) C_DES,kω
//! f_DES = max(l_SST / (C_DES Δ_max), 1)
//! D_k   = β* ρ ω f_DES k
//! ```

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

/// SST-DES 湍动能源项核函数
#[derive(Debug, Clone)]
pub struct TkeSstDesSrcKernel<T: AlgTraits> {
    fields: SstFields,
    max_length_scale: FieldHandle,
    f_one_blending: FieldHandle,
    beta_star: f64,
    tke_prod_limit_ratio: f64,
    c_des_ke: f64,
    c_des_kw: f64,
    ip_node_map: &'static [usize],
    _topo: PhantomData<T>,
}

impl<T: AlgTraits> TkeSstDesSrcKernel<T> {
    /// 解析字段与常数并声明数据需求
    pub fn new(
        fields: &FieldRegistry,
        options: &SolutionOptions,
        requests: &mut ElemDataRequests,
    ) -> CtResult<Self> {
        let beta_star = options.turb_model_constant(TurbConstant::BetaStar)?;
        let tke_prod_limit_ratio = options.turb_model_constant(TurbConstant::TkeProdLimitRatio)?;
        let c_des_ke = options.turb_model_constant(TurbConstant::CDesKe)?;
        let c_des_kw = options.turb_model_constant(TurbConstant::CDesKw)?;
        let ip_node_map = check_master_element::<T>()?;

        let max_length_scale = fields.get_field(FieldKind::Scalar, names::SST_MAX_LENGTH_SCALE)?;
        let f_one_blending = fields.get_field(FieldKind::Scalar, names::SST_F_ONE_BLENDING)?;
        let sst = SstFields::resolve::<T>(fields, options, requests)?;
        requests.add_gathered_nodal_field(max_length_scale, 1)?;
        requests.add_gathered_nodal_field(f_one_blending, 1)?;

        log::debug!(
            "构建 tke_sst_des 核函数: topo={}, c_des=({c_des_ke}, {c_des_kw})",
            T::TOPO
        );

        Ok(Self {
            fields: sst,
            max_length_scale,
            f_one_blending,
            beta_star,
            tke_prod_limit_ratio,
            c_des_ke,
            c_des_kw,
            ip_node_map,
            _topo: PhantomData,
        })
    }
}

impl<T: AlgTraits> Kernel<T> for TkeSstDesSrcKernel<T> {
    fn name(&self) -> &'static str {
        "tke_sst_des"
    }

    fn execute(&self, lhs: &mut LocalMatrix, rhs: &mut [f64], scratch: &ScratchViews<T>) {
        let tke = scratch.scalar_view(self.fields.tke);
        let sdr = scratch.scalar_view(self.fields.sdr);
        let density = scratch.scalar_view(self.fields.density);
        let tvisc = scratch.scalar_view(self.fields.tvisc);
        let max_len = scratch.scalar_view(self.max_length_scale);
        let f_one = scratch.scalar_view(self.f_one_blending);
        let velocity = scratch.vector_view(self.fields.velocity);
        let me = scratch.me_views(CoordsConfig::Current);

        for ip in 0..T::NUM_SCV_IP {
            let nn = self.ip_node_map[ip];
            let scv = me.scv_volume(ip);

            for ic in 0..T::NODES_PER_ELEMENT {
                let pk = tvisc[ic] * nodal_production(me, &velocity, ip, ic, T::N_DIM);

                let l_sst = tke[ic].sqrt() / (self.beta_star * sdr[ic]);
                let c_des = f_one[ic] * self.c_des_ke + (1.0 - f_one[ic]) * self.c_des_kw;
                let f_des = (l_sst / (c_des * max_len[ic])).max(1.0);

                let tke_fac = self.beta_star * density[ic] * sdr[ic] * f_des;
                let dk = tke_fac * tke[ic];
                let pk = pk.min(self.tke_prod_limit_ratio * dk);

                rhs[nn] += (pk - dk) * scv;
                lhs[(nn, nn)] += tke_fac * scv;
            }
        }
    }
}
