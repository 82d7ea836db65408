//! # 外部计算引擎
//!
//! 所有物理计算都交给外部程序完成：
//! - `vasp`: VASP 单点/弛豫计算
//! - `phonopy`: 位移超胞生成
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `parsers/`, `models/`

pub mod phonopy;
pub mod vasp;

pub use vasp::VaspRunner;
