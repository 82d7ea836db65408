//! # 作业状态标记
//!
//! 在作业目录中用 `job.state` 记录提交与失败，结合能量文件推断状态：
//!
//! | 条件                        | 状态      |
//! |-----------------------------|-----------|
//! | 存在 `energy.txt`           | Completed |
//! | `job.state` 为 `failed ..`  | Failed    |
//! | `job.state` 为 `submitted ..` | Submitted |
//! | 其他                        | Pending   |
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `commands/worker.rs`, `commands/status.rs` 使用

use crate::error::{InelastyError, Result};
use crate::models::JobState;
use crate::parsers::energy::ENERGY_FILE;

use std::fs;
use std::path::Path;

/// 状态标记文件名
pub const STATE_FILE: &str = "job.state";

fn write_marker(dir: &Path, line: &str) -> Result<()> {
    let path = dir.join(STATE_FILE);
    fs::write(&path, format!("{}\n", line)).map_err(|e| InelastyError::write(&path, e))
}

/// 记录已提交
pub fn mark_submitted(dir: &Path, job_id: Option<&str>) -> Result<()> {
    write_marker(dir, &format!("submitted {}", job_id.unwrap_or("")).trim_end())
}

/// 记录失败原因（单行）
pub fn mark_failed(dir: &Path, reason: &str) -> Result<()> {
    let reason: Vec<&str> = reason.split_whitespace().collect();
    write_marker(dir, &format!("failed {}", reason.join(" ")))
}

/// 推断作业目录状态
pub fn probe_state(dir: &Path) -> JobState {
    if dir.join(ENERGY_FILE).exists() {
        return JobState::Completed;
    }

    let marker = match fs::read_to_string(dir.join(STATE_FILE)) {
        Ok(text) => text,
        Err(_) => return JobState::Pending,
    };
    let marker = marker.trim();

    if let Some(reason) = marker.strip_prefix("failed") {
        JobState::Failed {
            reason: reason.trim().to_string(),
        }
    } else if let Some(job_id) = marker.strip_prefix("submitted") {
        JobState::Submitted {
            job_id: job_id.trim().to_string(),
        }
    } else {
        JobState::Pending
    }
}
