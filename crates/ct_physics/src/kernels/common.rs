// crates/ct_physics/src/kernels/common.rs

//! SST 源项核函数的公共部分
//!
//! - 共享字段的解析与数据需求声明
//! - 参考单元与拓扑特征的一致性检查
//! - 节点速度梯度缩并（湍流产生项）

use crate::fields::{names, FieldHandle, FieldKind, FieldRegistry};
use crate::master_element::{MasterElement, MasterElementRepo};
use crate::requests::{CoordsConfig, ElemDataRequests, MeOperator};
use crate::scratch::{MasterElementViews, VectorView};
use crate::topology::AlgTraits;
use ct_config::SolutionOptions;
use ct_foundation::{ensure, CtError, CtResult};

/// 三个 SST 源项核函数共同收集的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SstFields {
    /// 湍动能 k
    pub tke: FieldHandle,
    /// 比耗散率 ω
    pub sdr: FieldHandle,
    /// 密度 ρ
    pub density: FieldHandle,
    /// 速度
    pub velocity: FieldHandle,
    /// 涡粘性 μ_t
    pub tvisc: FieldHandle,
}

impl SstFields {
    /// 解析字段并声明数据需求
    ///
    /// 声明内容：体参考单元、当前坐标、五个节点字段、子体积与梯度算子。
    pub fn resolve<T: AlgTraits>(
        fields: &FieldRegistry,
        options: &SolutionOptions,
        requests: &mut ElemDataRequests,
    ) -> CtResult<Self> {
        let coordinates = fields.get_field(FieldKind::Vector, options.coordinates_name())?;
        let resolved = Self {
            tke: fields.get_field(FieldKind::Scalar, names::TURBULENT_KE)?,
            sdr: fields.get_field(FieldKind::Scalar, names::SPECIFIC_DISSIPATION_RATE)?,
            density: fields.get_field(FieldKind::Scalar, names::DENSITY)?,
            velocity: fields.get_field(FieldKind::Vector, names::VELOCITY)?,
            tvisc: fields.get_field(FieldKind::Scalar, names::TURBULENT_VISCOSITY)?,
        };

        check_master_element::<T>()?;
        requests.add_cvfem_volume_me(T::TOPO)?;
        requests.add_coordinates_field(coordinates, T::N_DIM, CoordsConfig::Current)?;
        requests.add_gathered_nodal_field(resolved.tke, 1)?;
        requests.add_gathered_nodal_field(resolved.sdr, 1)?;
        requests.add_gathered_nodal_field(resolved.density, 1)?;
        requests.add_gathered_nodal_field(resolved.velocity, T::N_DIM)?;
        requests.add_gathered_nodal_field(resolved.tvisc, 1)?;
        requests.add_master_element_call(MeOperator::ScvVolume, CoordsConfig::Current);
        requests.add_master_element_call(MeOperator::ScvGradOp, CoordsConfig::Current);

        Ok(resolved)
    }
}

/// 检查参考单元与拓扑特征一致，返回积分点 → 最近节点映射
pub fn check_master_element<T: AlgTraits>() -> CtResult<&'static [usize]> {
    let me = MasterElementRepo::volume(T::TOPO);
    ensure!(
        me.nodes_per_element() == T::NODES_PER_ELEMENT
            && me.num_integration_points() == T::NUM_SCV_IP
            && me.n_dim() == T::N_DIM,
        CtError::topology_mismatch(format!(
            "{}: 参考单元 {} 节点/{} 积分点/{} 维, 拓扑特征 {}/{}/{}",
            T::TOPO,
            me.nodes_per_element(),
            me.num_integration_points(),
            me.n_dim(),
            T::NODES_PER_ELEMENT,
            T::NUM_SCV_IP,
            T::N_DIM
        ))
    );
    Ok(me.ip_node_map())
}

/// 节点速度梯度缩并
///
/// ```text
/// P = Σ_i Σ_j dN_j u_i (dN_j u_i + dN_i u_j)
/// ```
///
/// 其中 `dN_i = dndx(ip, ic, i)`，`u_i = u(ic, i)`。结果尚未乘涡粘性。
#[inline]
pub fn nodal_production(
    me: &MasterElementViews,
    velocity: &VectorView<'_>,
    ip: usize,
    ic: usize,
    n_dim: usize,
) -> f64 {
    let mut pk = 0.0;
    for i in 0..n_dim {
        let dni = me.dndx(ip, ic, i);
        let ui = velocity[(ic, i)];
        for j in 0..n_dim {
            let dnj = me.dndx(ip, ic, j);
            pk += dnj * ui * (dnj * ui + dni * velocity[(ic, j)]);
        }
    }
    pk
}
