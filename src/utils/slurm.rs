//! # Slurm 脚本生成与提交
//!
//! 生成 sbatch 提交脚本，写入作业目录并调用 `sbatch` 提交。
//!
//! ## 功能
//! - `generate_sbatch_script`: 纯函数，相同输入得到逐字节相同的脚本
//! - `JobSubmitter`: 提交接口，`SlurmSubmitter` 调用 sbatch，`DryRunSubmitter` 只写脚本
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs`, `commands/relax.rs`, `commands/phonopy.rs` 使用
//! - 无外部模块依赖

use crate::error::{InelastyError, Result};

use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 提交脚本的固定文件名
pub const SCRIPT_FILE: &str = "submit.sbatch";

/// Slurm 作业配置
#[derive(Debug, Clone)]
pub struct SlurmConfig {
    pub job_name: String,
    pub time_limit: String,
    pub nodes: u32,
    pub ntasks_per_node: u32,
    pub partition: Option<String>,
    /// Slurm 日志所在目录
    pub output_dir: PathBuf,
}

/// 生成 sbatch 脚本内容
///
/// `%j` 由 Slurm 在运行时替换为作业号。
pub fn generate_sbatch_script(config: &SlurmConfig, command: &str) -> String {
    let partition = config
        .partition
        .as_ref()
        .map(|p| format!("#SBATCH --partition={}\n", p))
        .unwrap_or_default();

    format!(
        r#"#!/bin/bash
#SBATCH --job-name={}
#SBATCH --output={}/{}_%j.out
#SBATCH --nodes={}
#SBATCH --time={}
#SBATCH --ntasks-per-node={}
{}
cd $SLURM_SUBMIT_DIR
{}
"#,
        config.job_name,
        config.output_dir.display(),
        config.job_name,
        config.nodes,
        config.time_limit,
        config.ntasks_per_node,
        partition,
        command.trim_end(),
    )
}

/// 单引号包裹 shell 参数
pub fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// 写入提交脚本，覆盖已有文件
pub fn write_script(script: &str, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(SCRIPT_FILE);
    fs::write(&path, script).map_err(|e| InelastyError::write(&path, e))?;
    Ok(path)
}

/// 提交结果
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    /// 调度器返回的作业号（dry-run 时为 None）
    pub job_id: Option<String>,
    pub script: PathBuf,
}

/// 作业提交接口
pub trait JobSubmitter {
    /// 把脚本写入 `dir` 并提交
    fn submit(&mut self, script: &str, dir: &Path) -> Result<SubmittedJob>;

    /// 是否真的进入调度队列
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// 调用 sbatch 提交
///
/// 提交命令可以带额外参数，例如 `sbatch --parsable`。
pub struct SlurmSubmitter {
    sbatch: String,
}

impl SlurmSubmitter {
    pub fn new(sbatch: impl Into<String>) -> Self {
        SlurmSubmitter {
            sbatch: sbatch.into(),
        }
    }
}

impl JobSubmitter for SlurmSubmitter {
    fn submit(&mut self, script: &str, dir: &Path) -> Result<SubmittedJob> {
        let script_path = write_script(script, dir)?;

        let mut words = self.sbatch.split_whitespace();
        let program = words.next().ok_or_else(|| {
            InelastyError::InvalidArgument("Empty submit command".to_string())
        })?;

        let out = Command::new(program)
            .args(words)
            .arg(SCRIPT_FILE)
            .current_dir(dir)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => InelastyError::CommandNotFound {
                    command: self.sbatch.clone(),
                },
                _ => InelastyError::CommandFailed {
                    command: self.sbatch.clone(),
                    stderr: e.to_string(),
                },
            })?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(InelastyError::SubmissionError {
                path: script_path.display().to_string(),
                code: out.status.code(),
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }

        Ok(SubmittedJob {
            job_id: parse_job_id(&stdout),
            script: script_path,
        })
    }
}

/// 只写脚本，不提交
#[derive(Default)]
pub struct DryRunSubmitter;

impl JobSubmitter for DryRunSubmitter {
    fn submit(&mut self, script: &str, dir: &Path) -> Result<SubmittedJob> {
        Ok(SubmittedJob {
            job_id: None,
            script: write_script(script, dir)?,
        })
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// 从 sbatch 输出中提取作业号
///
/// 支持 "Submitted batch job 123" 和 `--parsable` 的 "123;cluster"。
fn parse_job_id(stdout: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^(?:Submitted batch job\s+)?(\d+)(?:;\S*)?\s*$").unwrap();
    re.captures(stdout).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SlurmConfig {
        SlurmConfig {
            job_name: "e_400".to_string(),
            time_limit: "02:00:00".to_string(),
            nodes: 1,
            ntasks_per_node: 12,
            partition: None,
            output_dir: PathBuf::from("encut/400"),
        }
    }

    #[test]
    fn test_script_header() {
        let script = generate_sbatch_script(&config(), "echo hello\n");
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(lines[0], "#!/bin/bash");
        assert_eq!(lines[1], "#SBATCH --job-name=e_400");
        assert_eq!(lines[2], "#SBATCH --output=encut/400/e_400_%j.out");
        assert_eq!(lines[3], "#SBATCH --nodes=1");
        assert_eq!(lines[4], "#SBATCH --time=02:00:00");
        assert_eq!(lines[5], "#SBATCH --ntasks-per-node=12");
        assert!(script.contains("cd $SLURM_SUBMIT_DIR\necho hello\n"));
    }

    #[test]
    fn test_script_is_deterministic() {
        let a = generate_sbatch_script(&config(), "run");
        let b = generate_sbatch_script(&config(), "run");
        assert_eq!(a, b);
    }

    #[test]
    fn test_script_partition_optional() {
        let mut cfg = config();
        assert!(!generate_sbatch_script(&cfg, "run").contains("--partition"));
        cfg.partition = Some("standard".to_string());
        assert!(generate_sbatch_script(&cfg, "run").contains("#SBATCH --partition=standard\n"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote(r#"{"encut":400.0}"#), r#"'{"encut":400.0}'"#);
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(
            parse_job_id("Submitted batch job 123456\n"),
            Some("123456".to_string())
        );
        assert_eq!(parse_job_id("98765;cluster\n"), Some("98765".to_string()));
        assert_eq!(parse_job_id("queued\n"), None);
    }

    #[test]
    fn test_dry_run_writes_script() {
        let dir = tempfile::tempdir().unwrap();
        let mut submitter = DryRunSubmitter;
        let job = submitter.submit("#!/bin/bash\n", dir.path()).unwrap();

        assert_eq!(job.job_id, None);
        assert_eq!(job.script, dir.path().join(SCRIPT_FILE));
        assert_eq!(fs::read_to_string(&job.script).unwrap(), "#!/bin/bash\n");
    }

    /// 用 `/bin/sh <脚本>` 代替 sbatch
    #[cfg(unix)]
    fn fake_sbatch(dir: &Path, body: &str) -> String {
        let path = dir.join("fake-sbatch.sh");
        fs::write(&path, format!("{}\n", body)).unwrap();
        format!("/bin/sh {}", path.display())
    }

    #[cfg(unix)]
    #[test]
    fn test_slurm_submitter_success() {
        let dir = tempfile::tempdir().unwrap();
        let sbatch = fake_sbatch(dir.path(), "echo \"Submitted batch job 77\"");
        let job_dir = dir.path().join("job");
        fs::create_dir(&job_dir).unwrap();

        let job = SlurmSubmitter::new(sbatch)
            .submit("#!/bin/bash\n", &job_dir)
            .unwrap();
        assert_eq!(job.job_id, Some("77".to_string()));
        assert!(job_dir.join(SCRIPT_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_slurm_submitter_runs_in_job_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sbatch = fake_sbatch(
            dir.path(),
            "test \"$1\" = submit.sbatch || exit 4\n\
             test -f submit.sbatch || exit 5\n\
             echo \"Submitted batch job 9\"",
        );
        let job_dir = dir.path().join("encut").join("400");
        fs::create_dir_all(&job_dir).unwrap();

        let job = SlurmSubmitter::new(sbatch)
            .submit("#!/bin/bash\n", &job_dir)
            .unwrap();
        assert_eq!(job.job_id, Some("9".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_slurm_submitter_failure_carries_code_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let sbatch = fake_sbatch(dir.path(), "echo 'invalid partition' >&2\nexit 3");

        let err = SlurmSubmitter::new(sbatch)
            .submit("#!/bin/bash\n", dir.path())
            .unwrap_err();
        match err {
            InelastyError::SubmissionError { code, output, .. } => {
                assert_eq!(code, Some(3));
                assert!(output.contains("invalid partition"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_sbatch() {
        let dir = tempfile::tempdir().unwrap();
        let err = SlurmSubmitter::new("/nonexistent/sbatch")
            .submit("#!/bin/bash\n", dir.path())
            .unwrap_err();
        assert!(matches!(err, InelastyError::CommandNotFound { .. }));
    }
}
