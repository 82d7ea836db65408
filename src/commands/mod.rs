//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `engine/`, `parsers/`, `models/`, `utils/`
//! - 子模块: sweep, relax, phonopy, harvest, plot, status, config, worker

pub mod config;
pub mod harvest;
pub mod phonopy;
pub mod plot;
pub mod relax;
pub mod status;
pub mod sweep;
pub mod worker;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sweep(args) => sweep::execute(args, &config),
        Commands::Relax(args) => relax::execute(args, &config),
        Commands::Phonopy(args) => phonopy::execute(args, &config),
        Commands::Harvest(args) => harvest::execute(args),
        Commands::Plot(args) => plot::execute(args),
        Commands::Status(args) => status::execute(args),
        Commands::Config(args) => config::execute(args, &config),
        Commands::SinglePoint(args) => worker::single_point(args, &config),
        Commands::RelaxWorker(args) => worker::relax(args, &config),
    }
}
