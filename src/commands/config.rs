//! # config 命令实现
//!
//! 打印当前生效的配置（TOML），或把内置默认值写入新文件。
//!
//! ## 依赖关系
//! - 使用 `cli/config.rs` 定义的参数
//! - 使用 `config.rs`

use crate::cli::config::ConfigArgs;
use crate::config::Config;
use crate::error::{InelastyError, Result};
use crate::utils::output;

use std::fs;

/// 执行 config 命令
pub fn execute(args: ConfigArgs, config: &Config) -> Result<()> {
    match args.init {
        Some(path) => {
            if path.exists() && !args.force {
                return Err(InelastyError::InvalidArgument(format!(
                    "'{}' already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            let text = Config::default().to_toml_string()?;
            fs::write(&path, text).map_err(|e| InelastyError::write(&path, e))?;
            output::print_success(&format!("Default configuration written to '{}'", path.display()));
        }
        None => {
            match config.source {
                Some(ref path) => output::print_info(&format!("Loaded from '{}'", path.display())),
                None => output::print_info("No configuration file found, using built-in defaults"),
            }
            println!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inelasty.toml");

        let args = ConfigArgs {
            init: Some(path.clone()),
            force: false,
        };
        execute(args, &Config::default()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.settings, Config::default().settings);

        let again = ConfigArgs {
            init: Some(path),
            force: false,
        };
        assert!(execute(again, &Config::default()).is_err());
    }
}
