//! # Inelasty - VASP 收敛扫描与声子工作流编排
//!
//! 在 Slurm 集群上批量提交 VASP 单点计算，收集结果并绘制收敛曲线。
//!
//! ## 子命令
//! - `sweep`   - 收敛扫描
//!   - `kpoints` - k 点网格
//!   - `encut`   - 截断能
//! - `relax`   - 两阶段几何优化
//! - `phonopy` - 位移超胞生成与提交
//! - `harvest` - 收集收敛扫描能量
//! - `plot`    - 弛豫能量曲线
//! - `status`  - 作业状态
//! - `config`  - 配置文件
//! - `single-point` / `relax-worker` - 作业脚本调用的 worker
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (扫描驱动、状态、结果收集)
//!   │     ├── engine/    (VASP / phonopy 调用)
//!   │     ├── parsers/   (POSCAR / OUTCAR / 能量记录)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (配置文件)
//!   ├── utils/      (输出、进度条、绘图、Slurm)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod engine;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
