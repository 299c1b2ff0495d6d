// crates/ct_physics/src/mesh/selector.rs

//! 单元选择器
//!
//! 以集合运算组合网格区域：命名分区的并集、与"本地拥有"求交。
//!
//! ```rust
//! use ct_physics::mesh::Selector;
//!
//! let region = Selector::select_union(["block_1", "block_2"]);
//! let owned = Selector::LocallyOwned & region.clone();
//! assert!(owned.matches("block_2", true));
//! assert!(!owned.matches("block_2", false));
//! assert!(region.matches("block_1", false));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

/// 单元选择器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// 命名分区
    Part(String),
    /// 本地拥有的单元
    LocallyOwned,
    /// 并集
    Union(Vec<Selector>),
    /// 交集
    Intersection(Vec<Selector>),
}

impl Selector {
    /// 单个命名分区
    pub fn part(name: impl Into<String>) -> Self {
        Self::Part(name.into())
    }

    /// 命名分区的并集
    pub fn select_union<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Union(names.into_iter().map(|n| Self::Part(n.into())).collect())
    }

    /// 判断某单元是否被选中
    pub fn matches(&self, part: &str, locally_owned: bool) -> bool {
        match self {
            Self::Part(name) => name == part,
            Self::LocallyOwned => locally_owned,
            Self::Union(items) => items.iter().any(|s| s.matches(part, locally_owned)),
            Self::Intersection(items) => items.iter().all(|s| s.matches(part, locally_owned)),
        }
    }

    /// 引用的全部分区名（按出现顺序，可能重复）
    pub fn part_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_parts(&mut out);
        out
    }

    fn collect_parts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Part(name) => out.push(name),
            Self::LocallyOwned => {}
            Self::Union(items) | Self::Intersection(items) => {
                for s in items {
                    s.collect_parts(out);
                }
            }
        }
    }
}

impl BitAnd for Selector {
    type Output = Selector;

    fn bitand(self, rhs: Selector) -> Selector {
        match self {
            Self::Intersection(mut items) => {
                items.push(rhs);
                Self::Intersection(items)
            }
            lhs => Self::Intersection(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Selector {
    type Output = Selector;

    fn bitor(self, rhs: Selector) -> Selector {
        match self {
            Self::Union(mut items) => {
                items.push(rhs);
                Self::Union(items)
            }
            lhs => Self::Union(vec![lhs, rhs]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_union_selects_nothing() {
        let s = Selector::Union(Vec::new());
        assert!(!s.matches("block_1", true));
    }

    #[test]
    fn test_empty_intersection_selects_everything() {
        let s = Selector::Intersection(Vec::new());
        assert!(s.matches("anything", false));
    }

    #[test]
    fn test_operators() {
        let s = Selector::part("a") | Selector::part("b");
        assert!(matches!(&s, Selector::Union(v) if v.len() == 2));
        let s = s & Selector::LocallyOwned;
        assert!(s.matches("a", true));
        assert!(!s.matches("c", true));
        assert_eq!(s.part_names(), vec!["a", "b"]);
    }
}
