//! # 结果收集
//!
//! 读取收敛扫描各目录的能量记录，得到按参数升序排列的 (参数, 能量) 序列。
//!
//! ## 缺失结果策略
//! - `Abort`: 任一目录缺少 `energy.txt` 即返回 `MissingResultError`
//! - `Skip`: 跳过该点并记录原因
//!
//! 能量记录格式错误在两种策略下都返回 `ParseError`。
//!
//! ## 依赖关系
//! - 被 `commands/harvest.rs` 使用
//! - 使用 `batch/collector.rs`, `batch/manifest.rs`, `parsers/energy.rs`
//! - 使用 `rayon` 并行读取

use crate::batch::collector::JobDirCollector;
use crate::batch::manifest::SweepManifest;
use crate::error::{InelastyError, Result};
use crate::parsers::energy::{read_energy, ENERGY_FILE};

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 缺失结果的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    Abort,
    Skip,
}

/// 收敛曲线数据
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// 目录名对应的参数值，升序
    pub parameters: Vec<i64>,
    pub energies: Vec<f64>,
    /// 显示用标签（k 点扫描为网格）
    pub labels: Vec<String>,
    /// 被跳过的点 (参数, 原因)
    pub skipped: Vec<(i64, String)>,
}

impl Harvest {
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// 读取 `base` 下所有数字目录的能量
pub fn harvest(base: &Path, policy: MissingPolicy) -> Result<Harvest> {
    let dirs = JobDirCollector::new(base).numeric()?;
    let manifest = SweepManifest::load(base)?;

    let readings: Vec<(i64, PathBuf, Result<f64>)> = dirs
        .into_par_iter()
        .map(|(value, dir)| {
            let energy = read_point(value, &dir);
            (value, dir, energy)
        })
        .collect();

    let mut harvest = Harvest::default();
    for (value, dir, energy) in readings {
        match energy {
            Ok(energy) => {
                let name = value.to_string();
                let label = manifest
                    .as_ref()
                    .and_then(|m| m.entry(&name))
                    .map(|entry| entry.value.to_string())
                    .unwrap_or(name);
                harvest.parameters.push(value);
                harvest.energies.push(energy);
                harvest.labels.push(label);
            }
            Err(e @ InelastyError::MissingResultError { .. }) if policy == MissingPolicy::Skip => {
                harvest.skipped.push((value, e.to_string()));
            }
            Err(e) => {
                return Err(match e {
                    InelastyError::MissingResultError { .. } | InelastyError::ParseError { .. } => e,
                    other => InelastyError::MissingResultError {
                        parameter: value.to_string(),
                        path: format!("{} ({})", dir.display(), other),
                    },
                })
            }
        }
    }

    Ok(harvest)
}

fn read_point(value: i64, dir: &Path) -> Result<f64> {
    let path = dir.join(ENERGY_FILE);
    if !path.exists() {
        return Err(InelastyError::MissingResultError {
            parameter: value.to_string(),
            path: path.display().to_string(),
        });
    }
    read_energy(&path)
}
