//! # 作业脚本模板
//!
//! 把集群参数、环境准备命令和 worker 调用组合成 sbatch 脚本。
//!
//! 生成的命令行：
//! ```text
//! <worker> single-point <作业目录> '<参数 JSON>' <赝势路径>
//! <worker> relax-worker <作业目录> '<阶段1 JSON>' '<阶段2 JSON>' <赝势路径>
//! ```
//!
//! 读取过配置文件时，worker 命令带上 `--config <绝对路径>`，计算节点使用同一份配置。
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `commands/relax.rs` 使用
//! - 使用 `utils/slurm.rs`, `config.rs`

use crate::config::Config;
use crate::error::Result;
use crate::models::VaspSettings;
use crate::utils::slurm::{generate_sbatch_script, shell_quote, SlurmConfig};

use std::path::{Path, PathBuf};

/// 作业脚本模板
#[derive(Debug, Clone)]
pub struct JobTemplate {
    pub walltime: String,
    pub nodes: u32,
    pub ntasks_per_node: u32,
    pub partition: Option<String>,
    /// worker 调用之前的环境准备行
    pub activate: Vec<String>,
    pub worker: PathBuf,
    pub pp_path: PathBuf,
    pub config: Option<PathBuf>,
}

impl JobTemplate {
    pub fn from_config(config: &Config, worker: PathBuf, pp_path: PathBuf) -> Self {
        let cluster = &config.cluster;
        JobTemplate {
            walltime: cluster.walltime.clone(),
            nodes: cluster.nodes,
            ntasks_per_node: cluster.ntasks_per_node,
            partition: cluster.partition.clone(),
            activate: cluster.activate.clone(),
            worker,
            pp_path,
            config: config.source.clone(),
        }
    }

    /// 单点 worker 调用
    pub fn single_point_command(&self, dir: &Path, settings: &VaspSettings) -> Result<String> {
        Ok(format!(
            "{} single-point {} {} {}",
            self.quoted_worker(),
            shell_quote(&dir.display().to_string()),
            shell_quote(&settings.to_json()?),
            shell_quote(&self.pp_path.display().to_string()),
        ))
    }

    /// 两阶段弛豫 worker 调用
    pub fn relax_command(
        &self,
        dir: &Path,
        stage1: &VaspSettings,
        stage2: &VaspSettings,
    ) -> Result<String> {
        Ok(format!(
            "{} relax-worker {} {} {} {}",
            self.quoted_worker(),
            shell_quote(&dir.display().to_string()),
            shell_quote(&stage1.to_json()?),
            shell_quote(&stage2.to_json()?),
            shell_quote(&self.pp_path.display().to_string()),
        ))
    }

    /// 渲染完整脚本，日志写入 `output_dir`
    pub fn render(&self, job_name: &str, output_dir: &Path, command: &str) -> String {
        let config = SlurmConfig {
            job_name: job_name.to_string(),
            time_limit: self.walltime.clone(),
            nodes: self.nodes,
            ntasks_per_node: self.ntasks_per_node,
            partition: self.partition.clone(),
            output_dir: output_dir.to_path_buf(),
        };

        let mut body = String::new();
        for line in &self.activate {
            body.push_str(line);
            body.push('\n');
        }
        body.push_str(command);

        generate_sbatch_script(&config, &body)
    }

    fn quoted_worker(&self) -> String {
        let worker = shell_quote(&self.worker.display().to_string());
        match self.config {
            Some(ref path) => format!(
                "{} --config {}",
                worker,
                shell_quote(&path.display().to_string())
            ),
            None => worker,
        }
    }
}
