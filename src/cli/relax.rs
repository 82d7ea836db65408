//! # relax 子命令 CLI 定义
//!
//! 提交两阶段几何优化作业
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/relax.rs`

use super::sweep::SubmitOptions;

use clap::Args;
use std::path::PathBuf;

/// relax 子命令参数
#[derive(Args, Debug)]
pub struct RelaxArgs {
    /// Input structure (POSCAR format)
    #[arg(short, long, default_value = "POSCAR")]
    pub structure: PathBuf,

    /// Base directory holding stage_1 and stage_2
    #[arg(long, default_value = "geom_opt")]
    pub base_dir: PathBuf,

    #[command(flatten)]
    pub submit: SubmitOptions,
}
