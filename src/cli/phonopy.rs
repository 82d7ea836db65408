//! # phonopy 子命令 CLI 定义
//!
//! 生成位移超胞，可选提交每个位移的单点计算
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/phonopy.rs`

use super::sweep::SubmitOptions;

use clap::Args;
use std::path::PathBuf;

/// phonopy 子命令参数
#[derive(Args, Debug)]
pub struct PhonopyArgs {
    /// Unit cell structure (POSCAR format)
    #[arg(short, long, default_value = "POSCAR")]
    pub unitcell: PathBuf,

    /// Base directory for displacement jobs
    #[arg(long, default_value = "phonopy")]
    pub base_dir: PathBuf,

    /// Prefix of the displacement directories (default: name of the base directory)
    #[arg(long)]
    pub base_name: Option<String>,

    /// Supercell multiplier along each lattice vector
    #[arg(long, default_value_t = 2)]
    pub supercell: u32,

    /// Displacement amplitude in Angstrom
    #[arg(long, default_value_t = 0.01)]
    pub amplitude: f64,

    /// Submit one single-point job per displacement
    #[arg(long, default_value_t = false)]
    pub run: bool,

    #[command(flatten)]
    pub submit: SubmitOptions,
}
