//! # 工具函数模块
//!
//! 提供美化输出、进度条、图表与 Slurm 脚本生成/提交等工具。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/` 模块使用
//! - 子模块: output, plot, progress, slurm

pub mod output;
pub mod plot;
pub mod progress;
pub mod slurm;
