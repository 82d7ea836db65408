//! # worker 子命令 CLI 定义
//!
//! 由作业脚本在计算节点上调用，不在帮助中显示。
//! 位置参数与作业脚本中的命令行一一对应。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/worker.rs`

use clap::Args;
use std::path::PathBuf;

/// 单点计算 worker 参数
#[derive(Args, Debug)]
pub struct SinglePointArgs {
    /// Job directory containing POSCAR
    pub dir: PathBuf,

    /// VASP settings as a JSON object
    pub settings: String,

    /// Pseudopotential root directory
    pub pp_path: PathBuf,
}

/// 两阶段弛豫 worker 参数
#[derive(Args, Debug)]
pub struct RelaxWorkerArgs {
    /// Directory containing stage_1/POSCAR
    pub dir: PathBuf,

    /// Stage 1 VASP settings as a JSON object
    pub stage1: String,

    /// Stage 2 VASP settings as a JSON object
    pub stage2: String,

    /// Pseudopotential root directory
    pub pp_path: PathBuf,
}
