//! # sweep 子命令 CLI 定义
//!
//! 收敛扫描入口：
//! - `kpoints`: k 点网格扫描
//! - `encut`: 截断能扫描
//!
//! 集群与提交参数 `SubmitOptions` 也被 relax、phonopy 复用。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs`, `cli/relax.rs`, `cli/phonopy.rs` 使用
//! - 参数传递给 `commands/sweep.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// 集群提交选项（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Pseudopotential root directory (also the default location of bin/vasp_std)
    #[arg(long, env = "VASP_PP_PATH")]
    pub pp_path: Option<PathBuf>,

    /// Slurm wall time limit (e.g., '02:00:00')
    #[arg(long)]
    pub time: Option<String>,

    /// Number of nodes per job
    #[arg(long)]
    pub nodes: Option<u32>,

    /// MPI tasks per node
    #[arg(long)]
    pub ntasks_per_node: Option<u32>,

    /// Slurm partition
    #[arg(long)]
    pub partition: Option<String>,

    /// Only generate job directories and scripts, do not call sbatch
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// sweep 主命令参数
#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(subcommand)]
    pub command: SweepCommands,
}

/// sweep 子命令
#[derive(Subcommand, Debug)]
pub enum SweepCommands {
    /// Single-point energies over a list of k-point meshes
    Kpoints(KpointsArgs),

    /// Single-point energies over a list of plane-wave cutoffs
    Encut(EncutArgs),
}

/// k 点扫描参数
#[derive(Args, Debug)]
pub struct KpointsArgs {
    /// Input structure (POSCAR format)
    #[arg(short, long, default_value = "POSCAR")]
    pub structure: PathBuf,

    /// Base directory for the sweep
    #[arg(long, default_value = "kpoints")]
    pub base_dir: PathBuf,

    /// Meshes to evaluate, e.g. '2x2x2,4x4x4' or '2,4' (default: 1x1x1 .. 6x6x6)
    #[arg(long, value_delimiter = ',', value_parser = parse_mesh)]
    pub mesh: Vec<[u32; 3]>,

    #[command(flatten)]
    pub submit: SubmitOptions,
}

/// 截断能扫描参数
#[derive(Args, Debug)]
pub struct EncutArgs {
    /// Input structure (POSCAR format)
    #[arg(short, long, default_value = "POSCAR")]
    pub structure: PathBuf,

    /// Base directory for the sweep
    #[arg(long, default_value = "encut")]
    pub base_dir: PathBuf,

    /// Cutoff energies in eV, e.g. '400,500,600' (default: 200 .. 1300 step 100)
    #[arg(long, value_delimiter = ',')]
    pub encut: Vec<f64>,

    #[command(flatten)]
    pub submit: SubmitOptions,
}

/// 解析 k 点网格：`NxNxN` 或单个 `N`
pub fn parse_mesh(s: &str) -> Result<[u32; 3], String> {
    let parts: Vec<&str> = s.trim().split(['x', 'X']).collect();
    let numbers: Vec<u32> = parts
        .iter()
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("invalid mesh '{}': expected NxNxN or N", s))?;

    let mesh = match numbers.as_slice() {
        [n] => [*n, *n, *n],
        [a, b, c] => [*a, *b, *c],
        _ => return Err(format!("invalid mesh '{}': expected NxNxN or N", s)),
    };

    if mesh.contains(&0) {
        return Err(format!("invalid mesh '{}': subdivisions must be positive", s));
    }
    Ok(mesh)
}
