// crates/ct_config/src/turb_constants.rs

//! 湍流模型常数
//!
//! 以 `TurbConstant` 为键的常数表。核函数和算法在构造期按标识查询，
//! 查不到即为配置错误。
//!
//! # SST 默认参数（Menter 2003）
//!
//! | 常数 | 值 |
//! |------|-----|
//! | β* | 0.09 |
//! | 产生项限制比 | 10.0 |
//! | β₁ / β₂ | 0.075 / 0.0828 |
//! | γ₁ / γ₂ | 5/9 / 0.44 |
//! | σ_ω2 | 0.856 |
//! | C_DES(k-ε) / C_DES(k-ω) | 0.61 / 0.78 |
//! | C_h / C_hμ | 2.0 / 2.7 |

use ct_foundation::{CtError, CtResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 湍流模型常数标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurbConstant {
    /// β*，k 方程耗散系数
    BetaStar,
    /// 产生项限制比 P_k ≤ ratio × D_k
    TkeProdLimitRatio,
    /// β₁（内层）
    BetaOne,
    /// β₂（外层）
    BetaTwo,
    /// γ₁（内层）
    GammaOne,
    /// γ₂（外层）
    GammaTwo,
    /// σ_ω2，交叉扩散系数
    SigmaWTwo,
    /// DES 常数（k-ε 分支）
    CDesKe,
    /// DES 常数（k-ω 分支）
    CDesKw,
    /// 分辨率充分性系数 C_h
    Ch,
    /// 分辨率充分性归一化系数 C_hμ
    ChMu,
}

impl TurbConstant {
    /// 全部标识
    pub const ALL: [TurbConstant; 11] = [
        Self::BetaStar,
        Self::TkeProdLimitRatio,
        Self::BetaOne,
        Self::BetaTwo,
        Self::GammaOne,
        Self::GammaTwo,
        Self::SigmaWTwo,
        Self::CDesKe,
        Self::CDesKw,
        Self::Ch,
        Self::ChMu,
    ];

    /// 配置文件中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            Self::BetaStar => "beta_star",
            Self::TkeProdLimitRatio => "tke_prod_limit_ratio",
            Self::BetaOne => "beta_one",
            Self::BetaTwo => "beta_two",
            Self::GammaOne => "gamma_one",
            Self::GammaTwo => "gamma_two",
            Self::SigmaWTwo => "sigma_w_two",
            Self::CDesKe => "c_des_ke",
            Self::CDesKw => "c_des_kw",
            Self::Ch => "ch",
            Self::ChMu => "ch_mu",
        }
    }

    /// SST 默认值
    pub fn sst_default(self) -> f64 {
        match self {
            Self::BetaStar => 0.09,
            Self::TkeProdLimitRatio => 10.0,
            Self::BetaOne => 0.075,
            Self::BetaTwo => 0.0828,
            Self::GammaOne => 5.0 / 9.0,
            Self::GammaTwo => 0.44,
            Self::SigmaWTwo => 0.856,
            Self::CDesKe => 0.61,
            Self::CDesKw => 0.78,
            Self::Ch => 2.0,
            Self::ChMu => 2.7,
        }
    }
}

impl fmt::Display for TurbConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 湍流模型常数表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurbModelConstants {
    values: BTreeMap<TurbConstant, f64>,
}

impl Default for TurbModelConstants {
    fn default() -> Self {
        Self::sst()
    }
}

impl TurbModelConstants {
    /// SST 默认常数表
    pub fn sst() -> Self {
        let values = TurbConstant::ALL
            .iter()
            .map(|&id| (id, id.sst_default()))
            .collect();
        Self { values }
    }

    /// 空表（所有查询都会失败）
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// 查询常数
    pub fn get(&self, id: TurbConstant) -> CtResult<f64> {
        self.values
            .get(&id)
            .copied()
            .ok_or_else(|| CtError::missing_constant(id.name()))
    }

    /// 设置常数
    pub fn set(&mut self, id: TurbConstant, value: f64) {
        self.values.insert(id, value);
    }

    /// 移除常数
    pub fn remove(&mut self, id: TurbConstant) -> Option<f64> {
        self.values.remove(&id)
    }

    /// 用覆盖表更新
    pub fn merge(&mut self, overrides: &BTreeMap<TurbConstant, f64>) {
        for (&id, &value) in overrides {
            self.values.insert(id, value);
        }
    }

    /// 遍历全部常数
    pub fn iter(&self) -> impl Iterator<Item = (TurbConstant, f64)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sst_defaults_complete() {
        let c = TurbModelConstants::sst();
        for id in TurbConstant::ALL {
            assert!(c.get(id).is_ok(), "missing {id}");
        }
        assert!((c.get(TurbConstant::BetaStar).unwrap() - 0.09).abs() < 1e-15);
        assert!((c.get(TurbConstant::GammaOne).unwrap() - 5.0 / 9.0).abs() < 1e-15);
    }

    #[test]
    fn test_missing_constant_is_config_error() {
        let c = TurbModelConstants::empty();
        let err = c.get(TurbConstant::Ch).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("ch"));
    }

    #[test]
    fn test_merge_overrides() {
        let mut c = TurbModelConstants::sst();
        let mut overrides = BTreeMap::new();
        overrides.insert(TurbConstant::TkeProdLimitRatio, 20.0);
        c.merge(&overrides);
        assert_eq!(c.get(TurbConstant::TkeProdLimitRatio).unwrap(), 20.0);
        assert_eq!(c.get(TurbConstant::BetaStar).unwrap(), 0.09);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TurbConstant::TkeProdLimitRatio).unwrap();
        assert_eq!(json, "\"tke_prod_limit_ratio\"");
        for id in TurbConstant::ALL {
            let s = serde_json::to_string(&id).unwrap();
            assert_eq!(s.trim_matches('"'), id.name());
        }
    }
}
