//! # 扫描清单
//!
//! 扫描驱动在基目录写入 `sweep.json`，记录扫描类型以及
//! 目录名、扫描值、作业号的有序对应关系。
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `batch/harvest.rs`, `commands/status.rs` 使用
//! - 使用 `serde_json`

use crate::error::{InelastyError, Result};
use crate::models::{SweepKind, SweepValue};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 清单文件名
pub const MANIFEST_FILE: &str = "sweep.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub dir: String,
    pub value: SweepValue,
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepManifest {
    pub kind: SweepKind,
    pub points: Vec<ManifestEntry>,
}

impl SweepManifest {
    pub fn new(kind: SweepKind) -> Self {
        SweepManifest {
            kind,
            points: Vec::new(),
        }
    }

    pub fn save(&self, base: &Path) -> Result<()> {
        let path = base.join(MANIFEST_FILE);
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text).map_err(|e| InelastyError::write(&path, e))
    }

    /// 读取清单，不存在时返回 None
    pub fn load(base: &Path) -> Result<Option<SweepManifest>> {
        let path = base.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| InelastyError::read(&path, e))?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| InelastyError::ParseError {
                format: "sweep manifest".to_string(),
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    pub fn entry(&self, dir: &str) -> Option<&ManifestEntry> {
        self.points.iter().find(|p| p.dir == dir)
    }
}
