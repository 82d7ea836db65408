//! # status 命令实现
//!
//! 列出扫描基目录下每个作业目录的状态、作业号和能量。
//!
//! ## 依赖关系
//! - 使用 `cli/harvest.rs` 定义的参数
//! - 使用 `batch/collector.rs`, `batch/state.rs`, `batch/manifest.rs`
//! - 使用 `rayon` 并行探测目录状态

use crate::batch::state::probe_state;
use crate::batch::{JobDirCollector, SweepManifest};
use crate::cli::harvest::StatusArgs;
use crate::error::Result;
use crate::models::JobState;
use crate::parsers::energy::{read_energy, ENERGY_FILE};
use crate::utils::output;

use colored::Colorize;
use rayon::prelude::*;
use std::path::PathBuf;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct StatusRow {
    #[tabled(rename = "Dir")]
    dir: String,
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Job ID")]
    job_id: String,
    #[tabled(rename = "Energy (eV)")]
    energy: String,
}

/// 状态统计
#[derive(Debug, Default, PartialEq)]
struct StateCounts {
    pending: usize,
    submitted: usize,
    completed: usize,
    failed: usize,
}

impl StateCounts {
    fn add(&mut self, state: &JobState) {
        match state {
            JobState::Pending => self.pending += 1,
            JobState::Submitted { .. } => self.submitted += 1,
            JobState::Completed => self.completed += 1,
            JobState::Failed { .. } => self.failed += 1,
        }
    }
}

/// 执行 status 命令
pub fn execute(args: StatusArgs) -> Result<()> {
    output::print_header(&format!("Job Status: {}", args.base_dir.display()));

    let dirs = JobDirCollector::new(&args.base_dir).all()?;
    let manifest = SweepManifest::load(&args.base_dir)?;

    let states: Vec<(PathBuf, JobState)> = dirs
        .into_par_iter()
        .map(|dir| {
            let state = probe_state(&dir);
            (dir, state)
        })
        .collect();

    let mut counts = StateCounts::default();
    let rows: Vec<StatusRow> = states
        .iter()
        .map(|(dir, state)| {
            counts.add(state);
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let entry = manifest.as_ref().and_then(|m| m.entry(&name));

            let job_id = match state {
                JobState::Submitted { job_id } if !job_id.is_empty() => job_id.clone(),
                _ => entry
                    .and_then(|e| e.job_id.clone())
                    .unwrap_or_else(|| "-".to_string()),
            };
            let energy = match state {
                JobState::Completed => read_energy(&dir.join(ENERGY_FILE))
                    .map(|e| format!("{:.6}", e))
                    .unwrap_or_else(|_| "?".to_string()),
                _ => "-".to_string(),
            };

            StatusRow {
                dir: name,
                parameter: entry.map(|e| e.value.to_string()).unwrap_or_default(),
                state: colorize(state),
                job_id,
                energy,
            }
        })
        .collect();

    if rows.is_empty() {
        output::print_warning("No job directories found");
        return Ok(());
    }

    println!("{}", Table::new(&rows));

    for (dir, state) in &states {
        if let JobState::Failed { reason } = state {
            output::print_error(&format!("{}: {}", dir.display(), reason));
        }
    }

    output::print_done(&format!(
        "{} completed, {} submitted, {} pending, {} failed",
        counts.completed, counts.submitted, counts.pending, counts.failed
    ));
    Ok(())
}

fn colorize(state: &JobState) -> String {
    let text = state.to_string();
    match state {
        JobState::Pending => text.dimmed().to_string(),
        JobState::Submitted { .. } => text.blue().to_string(),
        JobState::Completed => text.green().to_string(),
        JobState::Failed { .. } => text.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_counts() {
        let mut counts = StateCounts::default();
        counts.add(&JobState::Completed);
        counts.add(&JobState::Completed);
        counts.add(&JobState::Failed {
            reason: "x".to_string(),
        });
        counts.add(&JobState::Pending);

        assert_eq!(
            counts,
            StateCounts {
                pending: 1,
                submitted: 0,
                completed: 2,
                failed: 1,
            }
        );
    }
}
