// crates/ct_foundation/src/index.rs

//! 强类型索引系统
//!
//! 使用泛型 `Idx<Tag>` 区分节点索引与单元索引，避免在聚合/散射时混用。
//!
//! # 示例
//!
//! ```
//! use ct_foundation::index::{NodeIndex, ElemIndex};
//!
//! let n = NodeIndex::new(7);
//! let e = ElemIndex::new(7);
//! assert_eq!(n.get(), e.get());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

// ============================================================================
// 标记类型
// ============================================================================

/// 节点索引标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeTag;

/// 单元索引标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElemTag;

/// 标记名称（用于 Debug/错误信息）
pub trait IndexTag {
    /// 类别名
    const NAME: &'static str;
}

impl IndexTag for NodeTag {
    const NAME: &'static str = "Node";
}

impl IndexTag for ElemTag {
    const NAME: &'static str = "Elem";
}

// ============================================================================
// 泛型索引
// ============================================================================

/// 轻量级类型安全索引（4 字节）
///
/// **关键**：使用 `PhantomData<fn() -> Tag>` 确保自动满足 `Send + Sync`。
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Idx<Tag> {
    index: u32,
    #[serde(skip)]
    _marker: PhantomData<fn() -> Tag>,
}

/// 节点索引
pub type NodeIndex = Idx<NodeTag>;

/// 单元索引
pub type ElemIndex = Idx<ElemTag>;

// 手动实现，避免对 Tag 施加约束
impl<Tag> Copy for Idx<Tag> {}

impl<Tag> Clone for Idx<Tag> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Tag> Idx<Tag> {
    /// 创建新索引
    ///
    /// 索引以 `u32` 存储，调试构建下超出范围时 panic。
    #[inline]
    pub const fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "索引超出 u32 范围");
        Self {
            index: index as u32,
            _marker: PhantomData,
        }
    }

    /// 获取索引值（usize）
    #[inline]
    pub const fn get(self) -> usize {
        self.index as usize
    }

    /// 获取原始 u32
    #[inline]
    pub const fn raw(self) -> u32 {
        self.index
    }
}

impl<Tag> PartialEq for Idx<Tag> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<Tag> Eq for Idx<Tag> {}

impl<Tag> PartialOrd for Idx<Tag> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<Tag> Ord for Idx<Tag> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<Tag> Hash for Idx<Tag> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<Tag: IndexTag> fmt::Debug for Idx<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", Tag::NAME, self.index)
    }
}

impl<Tag> fmt::Display for Idx<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

impl<Tag> From<usize> for Idx<Tag> {
    #[inline]
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}
