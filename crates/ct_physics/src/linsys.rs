// crates/ct_physics/src/linsys.rs

//! 局部与全局线性系统
//!
//! [`LocalMatrix`] 与 `&mut [f64]` 分别是单元级 Jacobian 和残差的累加目标。
//! 核函数只做累加，不清零、不改变尺寸、不读回同一次调用中已累加的值。
//!
//! 装配完成的单元贡献经 [`LinearSystemSink::sum_into`] 散射到全局系统。

use ct_foundation::NodeIndex;
use std::ops::{Index, IndexMut};

/// 单元局部方阵（行主序）
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMatrix {
    n: usize,
    data: Vec<f64>,
}

impl LocalMatrix {
    /// 创建 `n × n` 零矩阵
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// 阶数
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// 清零
    #[inline]
    pub fn set_zero(&mut self) {
        self.data.fill(0.0);
    }

    /// 行主序数据
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// 对角元素
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.data[i * self.n + i]).collect()
    }

    /// 非对角元素绝对值之和
    pub fn off_diagonal_abs_sum(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.n {
            for j in 0..self.n {
                if i != j {
                    sum += self.data[i * self.n + j].abs();
                }
            }
        }
        sum
    }
}

impl Index<(usize, usize)> for LocalMatrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for LocalMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.n + j]
    }
}

/// 全局系统散射接口
pub trait LinearSystemSink {
    /// 把单元贡献累加到全局系统
    ///
    /// `nodes[i]` 对应局部行/列 `i`。
    fn sum_into(&mut self, nodes: &[NodeIndex], lhs: &LocalMatrix, rhs: &[f64]);
}

/// 稠密全局系统（小规模网格与测试用）
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLinearSystem {
    n: usize,
    lhs: Vec<f64>,
    rhs: Vec<f64>,
}

impl DenseLinearSystem {
    /// 创建 `n_nodes` 阶零系统
    pub fn new(n_nodes: usize) -> Self {
        Self {
            n: n_nodes,
            lhs: vec![0.0; n_nodes * n_nodes],
            rhs: vec![0.0; n_nodes],
        }
    }

    /// 全局矩阵元素
    #[inline]
    pub fn lhs(&self, i: usize, j: usize) -> f64 {
        self.lhs[i * self.n + j]
    }

    /// 全局右端项
    #[inline]
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// 清零
    pub fn zero(&mut self) {
        self.lhs.fill(0.0);
        self.rhs.fill(0.0);
    }
}

impl LinearSystemSink for DenseLinearSystem {
    fn sum_into(&mut self, nodes: &[NodeIndex], lhs: &LocalMatrix, rhs: &[f64]) {
        for (i, gi) in nodes.iter().enumerate() {
            self.rhs[gi.get()] += rhs[i];
            for (j, gj) in nodes.iter().enumerate() {
                self.lhs[gi.get() * self.n + gj.get()] += lhs[(i, j)];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_matrix_indexing() {
        let mut m = LocalMatrix::zeros(3);
        m[(1, 1)] += 2.0;
        m[(0, 2)] = -1.0;
        assert_eq!(m.diagonal(), vec![0.0, 2.0, 0.0]);
        assert_eq!(m.off_diagonal_abs_sum(), 1.0);
        m.set_zero();
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dense_sum_into_shared_node() {
        let mut sys = DenseLinearSystem::new(3);
        let mut m = LocalMatrix::zeros(2);
        m[(0, 0)] = 1.0;
        m[(1, 1)] = 2.0;
        let rhs = [0.5, 0.25];

        let e0 = [NodeIndex::new(0), NodeIndex::new(1)];
        let e1 = [NodeIndex::new(1), NodeIndex::new(2)];
        sys.sum_into(&e0, &m, &rhs);
        sys.sum_into(&e1, &m, &rhs);

        assert_eq!(sys.lhs(1, 1), 3.0);
        assert_eq!(sys.rhs(), &[0.5, 0.75, 0.25]);
    }
}
