// crates/ct_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `CtError` 枚举和 `CtResult` 类型别名。
//!
//! 所有错误都属于构造期的配置错误：缺失字段、缺失模型常数、拓扑不匹配等。
//! 单元循环内部不产生错误，数值退化（如除零）直接以非有限值传播。
//!
//! # 示例
//!
//! ```
//! use ct_foundation::error::{CtError, CtResult};
//!
//! fn resolve() -> CtResult<()> {
//!     Err(CtError::missing_field("turbulent_ke"))
//! }
//! assert!(resolve().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type CtResult<T> = Result<T, CtError>;

/// CvTurb 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CtError {
    // ========================================================================
    // 配置错误（构造期，致命）
    // ========================================================================
    /// 网格元数据中不存在请求的字段
    #[error("字段不存在: {name}")]
    MissingField {
        /// 字段名
        name: String,
    },

    /// 字段存在但秩/分量数与请求不符
    #[error("字段秩不匹配: {name} 期望{expected}个分量, 实际{actual}")]
    FieldRankMismatch {
        /// 字段名
        name: String,
        /// 期望分量数
        expected: usize,
        /// 实际分量数
        actual: usize,
    },

    /// 拓扑不一致（同一注册表混用拓扑，或节点数与参考单元不符）
    #[error("拓扑不匹配: {message}")]
    TopologyMismatch {
        /// 具体错误信息
        message: String,
    },

    /// 缺少湍流模型常数
    #[error("缺少湍流模型常数: {name}")]
    MissingConstant {
        /// 常数标识
        name: String,
    },

    /// 无效网格
    #[error("无效的网格: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    // ========================================================================
    // 数据一致性
    // ========================================================================
    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl CtError {
    /// 字段不存在
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField { name: name.into() }
    }

    /// 字段秩不匹配
    pub fn field_rank_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::FieldRankMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 拓扑不匹配
    pub fn topology_mismatch(message: impl Into<String>) -> Self {
        Self::TopologyMismatch {
            message: message.into(),
        }
    }

    /// 缺少模型常数
    pub fn missing_constant(name: impl Into<String>) -> Self {
        Self::MissingConstant { name: name.into() }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 是否为构造期配置错误
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::FieldRankMismatch { .. }
                | Self::TopologyMismatch { .. }
                | Self::MissingConstant { .. }
                | Self::Config { .. }
                | Self::InvalidConfig { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl CtError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> CtResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> CtResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CtError::missing_field("specific_dissipation_rate");
        assert!(err.to_string().contains("specific_dissipation_rate"));
    }

    #[test]
    fn test_rank_mismatch_display() {
        let err = CtError::field_rank_mismatch("velocity", 3, 1);
        let msg = err.to_string();
        assert!(msg.contains("velocity"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_is_configuration() {
        assert!(CtError::missing_constant("beta_star").is_configuration());
        assert!(CtError::topology_mismatch("hex8 vs tet4").is_configuration());
        assert!(!CtError::size_mismatch("rhs", 8, 4).is_configuration());
    }

    #[test]
    fn test_check_size() {
        assert!(CtError::check_size("test", 10, 10).is_ok());
        assert!(CtError::check_size("test", 10, 5).is_err());
    }

    #[test]
    fn test_check_index() {
        assert!(CtError::check_index("Node", 5, 10).is_ok());
        assert!(CtError::check_index("Node", 10, 10).is_err());
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: i32) -> CtResult<()> {
            ensure!(value > 0, CtError::config("value must be positive"));
            Ok(())
        }

        assert!(check(1).is_ok());
        assert!(check(-1).is_err());
    }
}
