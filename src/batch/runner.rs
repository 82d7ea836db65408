//! # 提交结果汇总
//!
//! 每个扫描点的提交结果单独记录，单点失败不会中断整个扫描，最后统一汇总。
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `commands/` 使用
//! - 使用 `utils/output.rs` 打印汇总

use crate::utils::output;

/// 单个扫描点的提交结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 已提交
    Submitted { dir: String, job_id: Option<String> },
    /// 仅生成了输入（dry-run）
    Skipped(String),
    /// 失败
    Failed(String, String), // (作业目录, 错误信息)
}

/// 批量提交结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Submitted { .. } => self.success += 1,
            SubmitOutcome::Skipped(_) => self.skipped += 1,
            SubmitOutcome::Failed(dir, err) => {
                self.failed += 1;
                self.failures.push((dir.clone(), err.clone()));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }

    /// 打印汇总
    pub fn report(&self, what: &str) {
        output::print_separator();
        for (dir, err) in &self.failures {
            output::print_error(&format!("{}: {}", dir, err));
        }
        output::print_done(&format!(
            "{} {} point(s): {} submitted, {} generated only, {} failed",
            what,
            self.total(),
            self.success,
            self.skipped,
            self.failed
        ));
    }
}

impl<'a> FromIterator<&'a SubmitOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = &'a SubmitOutcome>>(iter: I) -> Self {
        let mut result = BatchResult::default();
        for outcome in iter {
            result.merge(outcome);
        }
        result
    }
}
