//! # 数据模型模块
//!
//! 定义晶体结构、VASP 参数集合、扫描点与作业状态。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `commands/` 使用
//! - 子模块: structure, settings, job

pub mod job;
pub mod settings;
pub mod structure;

pub use job::{JobState, SweepKind, SweepPoint, SweepValue};
pub use settings::{Precision, VaspSettings};
pub use structure::{Atom, Crystal, Lattice};
