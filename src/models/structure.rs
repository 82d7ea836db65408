//! # 晶体结构数据模型
//!
//! 定义扫描作业所需的最小晶体结构表示：从 POSCAR 读入，写入每个作业目录。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs` 和 `commands/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 晶格常数 (a, b, c)
    pub fn lengths(&self) -> (f64, f64, f64) {
        let norm = |v: [f64; 3]| (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt();
        (
            norm(self.matrix[0]),
            norm(self.matrix[1]),
            norm(self.matrix[2]),
        )
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称（POSCAR 注释行）
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
        }
    }

    /// 元素种类，按首次出现顺序
    ///
    /// POSCAR 写出与 POTCAR 拼接都依赖这个顺序。
    pub fn species(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for atom in &self.atoms {
            if !order.contains(&atom.element) {
                order.push(atom.element.clone());
            }
        }
        order
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64) -> Lattice {
        Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let vol = cubic(5.0).volume().abs();
        assert!((vol - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_lengths() {
        let (a, b, c) = cubic(4.0).lengths();
        assert!((a - 4.0).abs() < 1e-6);
        assert!((b - 4.0).abs() < 1e-6);
        assert!((c - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_species_keeps_first_appearance_order() {
        let atoms = vec![
            Atom::new("O", [0.5, 0.5, 0.0]),
            Atom::new("Ti", [0.0, 0.0, 0.0]),
            Atom::new("O", [0.5, 0.0, 0.5]),
        ];
        let crystal = Crystal::new("TiO2", cubic(4.0), atoms);
        assert_eq!(crystal.species(), vec!["O".to_string(), "Ti".to_string()]);
        assert_eq!(crystal.formula(), "O2Ti");
    }
}
