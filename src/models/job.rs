//! # 扫描点与作业状态
//!
//! 参数扫描中每个点对应一个作业目录；作业目录的状态通过标记文件与结果文件推断。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/`, `parsers/energy.rs` 使用
//! - 使用 `models/settings.rs`

use crate::models::VaspSettings;

use serde::{Deserialize, Serialize};
use std::fmt;

/// 扫描类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepKind {
    /// k 点网格，目录按 1 起始序号命名
    KPoints,
    /// 截断能，目录按截断能数值命名
    Encut,
    /// 位移超胞，目录按 `<前缀>-<0 起始序号>` 命名
    Displacements,
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepKind::KPoints => write!(f, "kpoints"),
            SweepKind::Encut => write!(f, "encut"),
            SweepKind::Displacements => write!(f, "displacements"),
        }
    }
}

/// 单个扫描参数值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepValue {
    Mesh([u32; 3]),
    Encut(f64),
    Displacement(usize),
}

impl SweepValue {
    /// 把扫描值写入参数的新副本
    pub fn apply(&self, base: &VaspSettings) -> VaspSettings {
        match *self {
            SweepValue::Mesh(k) => base.with_kpts(k),
            SweepValue::Encut(e) => base.with_encut(e),
            SweepValue::Displacement(_) => base.clone(),
        }
    }
}

impl fmt::Display for SweepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepValue::Mesh(k) => write!(f, "{}x{}x{}", k[0], k[1], k[2]),
            SweepValue::Encut(e) => write!(f, "{}", e),
            SweepValue::Displacement(i) => write!(f, "disp-{}", i),
        }
    }
}

/// 扫描点 (序号, 值)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub index: usize,
    pub value: SweepValue,
}

impl SweepPoint {
    /// 作业目录名
    ///
    /// `base_name` 仅用于位移扫描。
    pub fn dir_name(&self, base_name: &str) -> String {
        match self.value {
            SweepValue::Mesh(_) => (self.index + 1).to_string(),
            SweepValue::Encut(e) => format_encut(e),
            SweepValue::Displacement(i) => format!("{}-{}", base_name, i),
        }
    }

    /// Slurm 作业名
    pub fn job_name(&self) -> String {
        match self.value {
            SweepValue::Mesh(k) => format!("kpts_{}", k[0]),
            SweepValue::Encut(e) => format!("e_{}", format_encut(e)),
            SweepValue::Displacement(i) => format!("phon_{}", i),
        }
    }
}

/// 把值列表展开为扫描点
pub fn enumerate_points(values: &[SweepValue]) -> Vec<SweepPoint> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| SweepPoint {
            index,
            value: *value,
        })
        .collect()
}

/// 默认 k 点网格：(1,1,1) 到 (6,6,6)
pub fn default_meshes() -> Vec<[u32; 3]> {
    (1..=6).map(|k| [k, k, k]).collect()
}

/// 默认截断能：200 到 1300，步长 100
pub fn default_encuts() -> Vec<f64> {
    (2..=13).map(|i| (i * 100) as f64).collect()
}

/// 截断能的目录名写法，整数值不带小数点
pub fn format_encut(e: f64) -> String {
    if e.fract() == 0.0 {
        format!("{:.0}", e)
    } else {
        format!("{}", e)
    }
}

/// 作业目录生命周期
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// 目录已准备，尚未提交
    Pending,
    /// 已进入调度队列
    Submitted { job_id: String },
    /// 能量文件已存在
    Completed,
    /// Worker 记录了失败
    Failed { reason: String },
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Submitted { .. } => write!(f, "submitted"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed { .. } => write!(f, "failed"),
        }
    }
}
