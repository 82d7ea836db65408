//! # 解析器模块
//!
//! 提供 VASP 结构文件、输出文件与能量记录的读写。
//!
//! ## 依赖关系
//! - 被 `commands/`, `engine/`, `batch/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, outcar, energy

pub mod energy;
pub mod outcar;
pub mod poscar;

/// 作业目录中结构输入文件的固定文件名
pub const STRUCTURE_FILE: &str = "POSCAR";

/// 几何优化输出结构的固定文件名
pub const RELAXED_STRUCTURE_FILE: &str = "CONTCAR";
