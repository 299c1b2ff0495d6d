// crates/ct_config/src/solution_options.rs

//! SolutionOptions - 求解选项
//!
//! 核函数构造期读取的全部配置：坐标字段名、湍流模型常数、装配选项。
//! 可从 JSON 文件加载，未给出的字段取默认值。
//!
//! ```json
//! {
//!   "coordinates_name": "coordinates",
//!   "turbulence": { "overrides": { "tke_prod_limit_ratio": 20.0 } },
//!   "assembly": { "batch_size": 64, "strategy": "collect_then_accumulate" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::turb_constants::{TurbConstant, TurbModelConstants};
use ct_foundation::CtResult;

/// 求解选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionOptions {
    /// 坐标字段名
    #[serde(default = "default_coordinates_name")]
    pub coordinates_name: String,

    /// 是否启用网格运动（决定坐标配置键）
    #[serde(default)]
    pub mesh_motion: bool,

    /// 湍流模型配置
    #[serde(default)]
    pub turbulence: TurbulenceConfig,

    /// 装配配置
    #[serde(default)]
    pub assembly: AssemblyOptions,

    /// 生效的常数表（默认值 + 覆盖）
    #[serde(skip)]
    constants: TurbModelConstants,
}

/// 网格运动时的坐标字段名
pub const CURRENT_COORDINATES_NAME: &str = "current_coordinates";

fn default_coordinates_name() -> String {
    "coordinates".to_string()
}

/// 湍流模型配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurbulenceConfig {
    /// 覆盖 SST 默认值的常数
    #[serde(default)]
    pub overrides: BTreeMap<TurbConstant, f64>,
}

/// 装配并行策略
///
/// - `Sequential`: 完全串行
/// - `CollectThenAccumulate`: 并行计算各批次的局部矩阵，再按单元顺序串行散射
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParallelStrategy {
    /// 串行执行
    #[default]
    Sequential,
    /// 收集后累加
    CollectThenAccumulate,
}

/// 装配配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// 每批单元数
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// 并行策略
    #[serde(default)]
    pub strategy: ParallelStrategy,
}

fn default_batch_size() -> usize {
    32
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            strategy: ParallelStrategy::default(),
        }
    }
}

impl Default for SolutionOptions {
    fn default() -> Self {
        let mut options = Self {
            coordinates_name: default_coordinates_name(),
            mesh_motion: false,
            turbulence: TurbulenceConfig::default(),
            assembly: AssemblyOptions::default(),
            constants: TurbModelConstants::empty(),
        };
        options.initialize_turbulence_constants();
        options
    }
}

impl SolutionOptions {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串加载
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let mut options: SolutionOptions =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.initialize_turbulence_constants();
        options.validate()?;
        log::debug!(
            "加载求解选项: coordinates={}, 覆盖常数 {} 个",
            options.coordinates_name,
            options.turbulence.overrides.len()
        );
        Ok(options)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 以 SST 默认值重建常数表，再应用覆盖
    pub fn initialize_turbulence_constants(&mut self) {
        let mut constants = TurbModelConstants::sst();
        constants.merge(&self.turbulence.overrides);
        self.constants = constants;
    }

    /// 直接替换常数表
    pub fn with_constants(mut self, constants: TurbModelConstants) -> Self {
        self.constants = constants;
        self
    }

    /// 生效的常数表
    pub fn constants(&self) -> &TurbModelConstants {
        &self.constants
    }

    /// 查询湍流模型常数
    pub fn turb_model_constant(&self, id: TurbConstant) -> CtResult<f64> {
        self.constants.get(id)
    }

    /// 坐标字段名
    ///
    /// 启用网格运动时几何量取自变形后的坐标 `current_coordinates`。
    pub fn coordinates_name(&self) -> &str {
        if self.mesh_motion {
            CURRENT_COORDINATES_NAME
        } else {
            &self.coordinates_name
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coordinates_name.is_empty() {
            return Err(ConfigError::Missing("coordinates_name".to_string()));
        }

        if self.assembly.batch_size == 0 {
            return Err(ConfigError::invalid(
                "assembly.batch_size",
                self.assembly.batch_size,
                "批大小必须为正",
            ));
        }

        for (id, value) in self.constants.iter() {
            if !value.is_finite() {
                return Err(ConfigError::invalid(
                    format!("turbulence.{}", id.name()),
                    value,
                    "常数必须为有限值",
                ));
            }
        }

        if let Ok(ratio) = self.constants.get(TurbConstant::TkeProdLimitRatio) {
            if ratio <= 0.0 {
                return Err(ConfigError::invalid(
                    "turbulence.tke_prod_limit_ratio",
                    ratio,
                    "限制比必须为正",
                ));
            }
        }

        if let Ok(ch_mu) = self.constants.get(TurbConstant::ChMu) {
            if ch_mu == 0.0 {
                return Err(ConfigError::invalid("turbulence.ch_mu", ch_mu, "不能为零"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_options() {
        let options = SolutionOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.coordinates_name(), "coordinates");
        assert_relative_eq!(
            options.turb_model_constant(TurbConstant::BetaStar).unwrap(),
            0.09
        );
    }

    #[test]
    fn test_from_json_with_overrides() {
        let json = r#"{
            "turbulence": { "overrides": { "tke_prod_limit_ratio": 20.0, "ch": 1.5 } },
            "assembly": { "batch_size": 4, "strategy": "collect_then_accumulate" }
        }"#;
        let options = SolutionOptions::from_json(json).unwrap();
        assert_relative_eq!(
            options.turb_model_constant(TurbConstant::TkeProdLimitRatio).unwrap(),
            20.0
        );
        assert_relative_eq!(options.turb_model_constant(TurbConstant::Ch).unwrap(), 1.5);
        assert_relative_eq!(options.turb_model_constant(TurbConstant::ChMu).unwrap(), 2.7);
        assert_eq!(options.assembly.batch_size, 4);
        assert_eq!(options.assembly.strategy, ParallelStrategy::CollectThenAccumulate);
    }

    #[test]
    fn test_mesh_motion_selects_current_coordinates() {
        let options = SolutionOptions::from_json(r#"{ "mesh_motion": true }"#).unwrap();
        assert_eq!(options.coordinates_name(), CURRENT_COORDINATES_NAME);
    }

    #[test]
    fn test_invalid_batch_size() {
        let json = r#"{ "assembly": { "batch_size": 0 } }"#;
        assert!(SolutionOptions::from_json(json).is_err());
    }

    #[test]
    fn test_invalid_limit_ratio() {
        let json = r#"{ "turbulence": { "overrides": { "tke_prod_limit_ratio": -1.0 } } }"#;
        let err = SolutionOptions::from_json(json).unwrap_err();
        assert!(err.to_string().contains("tke_prod_limit_ratio"));
    }

    #[test]
    fn test_unknown_constant_rejected() {
        let json = r#"{ "turbulence": { "overrides": { "c_mu_bogus": 1.0 } } }"#;
        assert!(matches!(
            SolutionOptions::from_json(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_constant_after_replacement() {
        let options = SolutionOptions::default().with_constants(TurbModelConstants::empty());
        assert!(options.turb_model_constant(TurbConstant::BetaStar).is_err());
    }

    #[test]
    fn test_serialize_deserialize() {
        let mut options = SolutionOptions::default();
        options.turbulence.overrides.insert(TurbConstant::BetaStar, 0.1);
        let json = serde_json::to_string(&options).unwrap();
        let parsed = SolutionOptions::from_json(&json).unwrap();
        assert_relative_eq!(parsed.turb_model_constant(TurbConstant::BetaStar).unwrap(), 0.1);
    }
}
