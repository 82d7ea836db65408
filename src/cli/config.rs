//! # config 子命令 CLI 定义
//!
//! 显示生效的配置或写出默认配置文件
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/config.rs`

use clap::Args;
use std::path::PathBuf;

/// config 子命令参数
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the built-in defaults to this file instead of printing the effective configuration
    #[arg(long)]
    pub init: Option<PathBuf>,

    /// Overwrite an existing file with --init
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
