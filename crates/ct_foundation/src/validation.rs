// crates/ct_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 数值退化（如湍流尺度乘积为零导致的除零）不在热循环中拦截，
//! 而是在整趟计算结束后扫描结果字段，以警告的形式汇报给调用方。
//!
//! # 示例
//!
//! ```
//! use ct_foundation::validation::ValidationReport;
//!
//! use ct_foundation::NodeIndex;
//!
//! let values = [1.0, f64::NAN, 2.0, f64::INFINITY];
//! let region = [NodeIndex::new(0), NodeIndex::new(1), NodeIndex::new(2)];
//! let report = ValidationReport::scan_finite("resolution_adequacy_parameter", &values, 1, &region);
//! assert_eq!(report.non_finite_count(), 1);
//! ```

use crate::index::NodeIndex;
use std::fmt;

/// 验证报告
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 扫描指定节点上的非有限值
    ///
    /// # 参数
    /// - `field`: 字段名
    /// - `values`: 节点主序数据，长度为 `n_nodes * n_comp`
    /// - `n_comp`: 每个节点的分量数
    /// - `nodes`: 待检查的节点，只有这些节点上的值计入报告
    pub fn scan_finite(field: &str, values: &[f64], n_comp: usize, nodes: &[NodeIndex]) -> Self {
        let mut report = Self::new();
        let n_comp = n_comp.max(1);
        for &node in nodes {
            let base = node.get() * n_comp;
            let Some(node_values) = values.get(base..base + n_comp) else {
                continue;
            };
            for (component, v) in node_values.iter().enumerate() {
                if !v.is_finite() {
                    report.add_warning(ValidationWarning::NonFinite {
                        field: field.to_string(),
                        node: node.get(),
                        component,
                        value: *v,
                    });
                }
            }
        }
        report
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 非有限值数量
    pub fn non_finite_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ValidationWarning::NonFinite { .. }))
            .count()
    }

    /// 是否通过（无警告）
    pub fn is_clean(&self) -> bool {
        !self.has_warnings()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告: 警告 {} 个", self.warning_count())?;
        for (i, warn) in self.warnings.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, warn)?;
        }
        Ok(())
    }
}

/// 验证警告类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// 非有限值（NaN / ±inf）
    NonFinite {
        /// 字段名称
        field: String,
        /// 节点序号
        node: usize,
        /// 分量序号
        component: usize,
        /// 非有限的数值
        value: f64,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                field,
                node,
                component,
                value,
            } => write!(
                f,
                "节点{}: 字段{}[{}]={} (非有限值)",
                node, field, component, value
            ),
        }
    }
}
