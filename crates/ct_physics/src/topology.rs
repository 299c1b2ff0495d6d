// crates/ct_physics/src/topology.rs

//! 单元拓扑描述
//!
//! 每种拓扑对应一个零尺寸标记类型并实现 [`AlgTraits`]，核函数以其为泛型参数
//! 单态化，节点数、维数、积分点数均为编译期常量。
//!
//! 运行时只持有 [`TopologyKind`] 标签，经 [`TopologyKind::dispatch`]
//! 转入对应的单态化路径。
//!
//! | 拓扑 | 节点数 | 维数 | SCV 积分点数 |
//! |------|--------|------|--------------|
//! | Tri3 | 3 | 2 | 3 |
//! | Quad4 | 4 | 2 | 4 |
//! | Tet4 | 4 | 3 | 4 |
//! | Pyr5 | 5 | 3 | 5 |
//! | Wedge6 | 6 | 3 | 6 |
//! | Hex8 | 8 | 3 | 8 |

use serde::{Deserialize, Serialize};
use std::fmt;

/// 拓扑标签（闭集）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    /// 三节点三角形
    Tri3,
    /// 四节点四边形
    Quad4,
    /// 四节点四面体
    Tet4,
    /// 五节点金字塔
    Pyr5,
    /// 六节点三棱柱
    Wedge6,
    /// 八节点六面体
    Hex8,
}

impl TopologyKind {
    /// 全部支持的拓扑
    pub const ALL: [TopologyKind; 6] = [
        Self::Tri3,
        Self::Quad4,
        Self::Tet4,
        Self::Pyr5,
        Self::Wedge6,
        Self::Hex8,
    ];

    /// 单元节点数
    pub const fn nodes_per_element(self) -> usize {
        match self {
            Self::Tri3 => 3,
            Self::Quad4 | Self::Tet4 => 4,
            Self::Pyr5 => 5,
            Self::Wedge6 => 6,
            Self::Hex8 => 8,
        }
    }

    /// 空间维数
    pub const fn n_dim(self) -> usize {
        match self {
            Self::Tri3 | Self::Quad4 => 2,
            _ => 3,
        }
    }

    /// 转入单态化路径
    pub fn dispatch<V: TopologyVisitor>(self, visitor: V) -> V::Output {
        match self {
            Self::Tri3 => visitor.visit::<AlgTraitsTri3>(),
            Self::Quad4 => visitor.visit::<AlgTraitsQuad4>(),
            Self::Tet4 => visitor.visit::<AlgTraitsTet4>(),
            Self::Pyr5 => visitor.visit::<AlgTraitsPyr5>(),
            Self::Wedge6 => visitor.visit::<AlgTraitsWedge6>(),
            Self::Hex8 => visitor.visit::<AlgTraitsHex8>(),
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tri3 => "tri3",
            Self::Quad4 => "quad4",
            Self::Tet4 => "tet4",
            Self::Pyr5 => "pyr5",
            Self::Wedge6 => "wedge6",
            Self::Hex8 => "hex8",
        };
        f.write_str(name)
    }
}

/// 编译期拓扑特征
///
/// 同一核函数实例的拓扑在生命周期内固定。
pub trait AlgTraits: Send + Sync + 'static {
    /// 单元节点数
    const NODES_PER_ELEMENT: usize;
    /// 空间维数
    const N_DIM: usize;
    /// 子控制体积分点数
    const NUM_SCV_IP: usize;
    /// 运行时标签
    const TOPO: TopologyKind;
}

/// 按拓扑标签执行泛型操作
pub trait TopologyVisitor {
    /// 返回类型
    type Output;

    /// 以具体拓扑执行
    fn visit<T: AlgTraits>(self) -> Self::Output;
}

macro_rules! alg_traits {
    ($(#[$doc:meta])* $name:ident, $kind:ident, $npe:expr, $dim:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl AlgTraits for $name {
            const NODES_PER_ELEMENT: usize = $npe;
            const N_DIM: usize = $dim;
            const NUM_SCV_IP: usize = $npe;
            const TOPO: TopologyKind = TopologyKind::$kind;
        }
    };
}

alg_traits!(
    /// 三节点三角形
    AlgTraitsTri3, Tri3, 3, 2
);
alg_traits!(
    /// 四节点四边形
    AlgTraitsQuad4, Quad4, 4, 2
);
alg_traits!(
    /// 四节点四面体
    AlgTraitsTet4, Tet4, 4, 3
);
alg_traits!(
    /// 五节点金字塔
    AlgTraitsPyr5, Pyr5, 5, 3
);
alg_traits!(
    /// 六节点三棱柱
    AlgTraitsWedge6, Wedge6, 6, 3
);
alg_traits!(
    /// 八节点六面体
    AlgTraitsHex8, Hex8, 8, 3
);
