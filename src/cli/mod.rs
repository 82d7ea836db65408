//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `sweep`: 收敛扫描（嵌套子命令）
//!   - `kpoints`: k 点网格扫描
//!   - `encut`: 截断能扫描
//! - `relax`: 两阶段几何优化
//! - `phonopy`: 位移超胞生成与提交
//! - `harvest`: 收集收敛扫描结果
//! - `plot`: 绘图（嵌套子命令）
//!   - `relax`: 弛豫能量曲线
//! - `status`: 作业状态
//! - `config`: 显示或初始化配置
//! - `single-point` / `relax-worker`: 作业脚本调用的 worker（隐藏）
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: sweep, relax, phonopy, harvest, worker, config

pub mod config;
pub mod harvest;
pub mod phonopy;
pub mod relax;
pub mod sweep;
pub mod worker;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inelasty - VASP 收敛扫描与声子工作流编排
#[derive(Parser)]
#[command(name = "inelasty")]
#[command(version)]
#[command(about = "VASP convergence sweeps and phonon displacement workflows on Slurm", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: ./inelasty.toml if present)
    #[arg(long, global = true, env = "INELASTY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Submit convergence sweeps (k-points or cutoff energy)
    Sweep(sweep::SweepArgs),

    /// Submit a two-stage geometry optimisation
    Relax(relax::RelaxArgs),

    /// Generate phonopy displacements and optionally submit their single points
    Phonopy(phonopy::PhonopyArgs),

    /// Collect sweep energies into a table, CSV and convergence plot
    Harvest(harvest::HarvestArgs),

    /// Plot calculation results
    Plot(harvest::PlotArgs),

    /// Show the state of every job directory in a sweep
    Status(harvest::StatusArgs),

    /// Show the effective configuration or write the defaults
    Config(config::ConfigArgs),

    /// Run one single-point calculation (invoked by job scripts)
    #[command(hide = true)]
    SinglePoint(worker::SinglePointArgs),

    /// Run a two-stage relaxation (invoked by job scripts)
    #[command(hide = true)]
    RelaxWorker(worker::RelaxWorkerArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encut_sweep() {
        let cli = Cli::try_parse_from([
            "inelasty", "sweep", "encut", "--encut", "300,400", "--dry-run", "--pp-path", "/pp",
        ])
        .unwrap();
        match cli.command {
            Commands::Sweep(sweep::SweepArgs {
                command: sweep::SweepCommands::Encut(args),
            }) => {
                assert_eq!(args.encut, vec![300.0, 400.0]);
                assert!(args.submit.dry_run);
                assert_eq!(args.base_dir, PathBuf::from("encut"));
            }
            _ => panic!("expected sweep encut"),
        }
    }

    #[test]
    fn test_parse_worker_with_global_config() {
        let cli = Cli::try_parse_from([
            "inelasty",
            "--config",
            "/work/inelasty.toml",
            "single-point",
            "/work/encut/300",
            r#"{"encut":300.0}"#,
            "/opt/vasp",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/work/inelasty.toml")));
        assert!(matches!(cli.command, Commands::SinglePoint(_)));
    }
}
