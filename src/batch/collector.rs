//! # 作业目录收集器
//!
//! 列出扫描基目录下的直接子目录。
//!
//! ## 功能
//! - 只取目录名为整数的子目录（收敛扫描），按数值升序
//! - 或列出所有子目录（状态查询），按名称排序
//!
//! ## 依赖关系
//! - 被 `batch/harvest.rs`, `commands/status.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::{InelastyError, Result};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 作业目录收集器
pub struct JobDirCollector {
    /// 扫描基目录
    base: PathBuf,
}

impl JobDirCollector {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn subdirs(&self) -> Result<Vec<PathBuf>> {
        if !self.base.is_dir() {
            return Err(InelastyError::DirectoryNotFound {
                path: self.base.display().to_string(),
            });
        }

        Ok(WalkDir::new(&self.base)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.path().to_path_buf())
            .collect())
    }

    /// 目录名为整数的子目录，按数值升序
    pub fn numeric(&self) -> Result<Vec<(i64, PathBuf)>> {
        let mut dirs: Vec<(i64, PathBuf)> = self
            .subdirs()?
            .into_iter()
            .filter_map(|path| {
                let value = parse_dir_value(&path)?;
                Some((value, path))
            })
            .collect();

        dirs.sort_by_key(|(value, _)| *value);
        Ok(dirs)
    }

    /// 所有子目录，按名称排序（数字名按数值）
    pub fn all(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = self.subdirs()?;
        dirs.sort_by(|a, b| match (parse_dir_value(a), parse_dir_value(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.file_name().cmp(&b.file_name()),
        });
        Ok(dirs)
    }
}

fn parse_dir_value(path: &Path) -> Option<i64> {
    path.file_name()?.to_str()?.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_numeric_sorted_by_value() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["10", "2", "1", "plots"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("3"), "not a dir").unwrap();

        let dirs = JobDirCollector::new(dir.path()).numeric().unwrap();
        let values: Vec<i64> = dirs.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![1, 2, 10]);
    }

    #[test]
    fn test_all_includes_named_dirs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["phon-1", "phon-0", "stage_1"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let dirs = JobDirCollector::new(dir.path()).all().unwrap();
        let names: Vec<String> = dirs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["phon-0", "phon-1", "stage_1"]);
    }

    #[test]
    fn test_missing_base() {
        let dir = tempfile::tempdir().unwrap();
        let result = JobDirCollector::new(dir.path().join("nope")).numeric();
        assert!(matches!(result, Err(InelastyError::DirectoryNotFound { .. })));
    }
}
