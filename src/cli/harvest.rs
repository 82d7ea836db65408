//! # 结果查看子命令 CLI 定义
//!
//! - `harvest`: 收集收敛扫描能量，输出表格、CSV 和曲线
//! - `plot relax`: 几何弛豫能量曲线
//! - `status`: 扫描目录下各作业状态
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/harvest.rs`, `commands/plot.rs`, `commands/status.rs`

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 可收集的扫描类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum HarvestKind {
    /// k-point mesh sweep
    Kpoints,
    /// Cutoff energy sweep
    Encut,
}

impl std::fmt::Display for HarvestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarvestKind::Kpoints => write!(f, "kpoints"),
            HarvestKind::Encut => write!(f, "encut"),
        }
    }
}

/// harvest 子命令参数
#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Sweep base directory (contains one numbered directory per point)
    pub base_dir: PathBuf,

    /// Kind of sweep
    #[arg(long, value_enum)]
    pub kind: HarvestKind,

    /// Skip points without an energy record instead of aborting
    #[arg(long, default_value_t = false)]
    pub skip_missing: bool,

    /// Plot file name inside the base directory (.png or .svg)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Do not write the plot
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,
}

/// plot 主命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    #[command(subcommand)]
    pub command: PlotCommands,
}

/// plot 子命令
#[derive(Subcommand, Debug)]
pub enum PlotCommands {
    /// Energy versus ionic step for one geometry optimisation stage
    Relax(PlotRelaxArgs),
}

/// plot relax 参数
#[derive(Args, Debug)]
pub struct PlotRelaxArgs {
    /// Geometry optimisation directory (contains stage_1, stage_2)
    #[arg(default_value = "geom_opt")]
    pub geom_dir: PathBuf,

    /// Stage to plot
    #[arg(long, default_value_t = 1)]
    pub stage: u32,

    /// Output file name inside the stage directory (.png or .svg)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// status 子命令参数
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Sweep base directory
    pub base_dir: PathBuf,
}
