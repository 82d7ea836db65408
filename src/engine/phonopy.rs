//! # phonopy 位移超胞生成
//!
//! 调用 `phonopy -d` 生成对称性不等价的位移超胞，
//! 保留 `phonopy_disp.yaml`（之后重建力常数需要），并收集 `POSCAR-NNN` 文件。
//!
//! ## 依赖关系
//! - 被 `commands/phonopy.rs` 使用
//! - 使用 `glob` 匹配位移文件

use crate::error::{InelastyError, Result};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// phonopy 位移元数据文件
pub const DISP_YAML: &str = "phonopy_disp.yaml";

/// phonopy 命令行封装
#[derive(Debug, Clone)]
pub struct PhonopyRunner {
    command: String,
}

impl PhonopyRunner {
    pub fn new(command: impl Into<String>) -> Self {
        PhonopyRunner {
            command: command.into(),
        }
    }

    /// 在 `workdir` 中生成位移超胞，返回按序号排列的 `POSCAR-NNN` 路径
    pub fn generate_displacements(
        &self,
        unitcell: &Path,
        workdir: &Path,
        supercell: u32,
        amplitude: f64,
    ) -> Result<Vec<PathBuf>> {
        let unitcell = unitcell
            .canonicalize()
            .map_err(|e| InelastyError::read(unitcell, e))?;

        let mut words = self.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| InelastyError::InvalidArgument("Empty phonopy command".to_string()))?;

        let out = Command::new(program)
            .args(words)
            .arg("-d")
            .arg(format!("--dim={} {} {}", supercell, supercell, supercell))
            .arg(format!("--amplitude={}", amplitude))
            .arg("-c")
            .arg(&unitcell)
            .current_dir(workdir)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => InelastyError::CommandNotFound {
                    command: program.to_string(),
                },
                _ => InelastyError::CommandFailed {
                    command: self.command.clone(),
                    stderr: e.to_string(),
                },
            })?;

        if !out.status.success() {
            return Err(InelastyError::CommandFailed {
                command: format!("{} -d", self.command),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            });
        }

        if !workdir.join(DISP_YAML).exists() {
            return Err(InelastyError::FileNotFound {
                path: workdir.join(DISP_YAML).display().to_string(),
            });
        }

        let displacements = collect_displacements(workdir)?;
        if displacements.is_empty() {
            return Err(InelastyError::CommandFailed {
                command: format!("{} -d", self.command),
                stderr: "no POSCAR-NNN files were produced".to_string(),
            });
        }
        Ok(displacements)
    }
}

/// 收集 `POSCAR-NNN` 位移文件，按序号排序
pub fn collect_displacements(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("POSCAR-[0-9]*");
    let pattern = pattern.to_string_lossy();

    let entries = glob::glob(&pattern).map_err(|e| {
        InelastyError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern, e))
    })?;

    let mut files: Vec<(usize, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|path| {
            let index = path
                .file_name()?
                .to_str()?
                .strip_prefix("POSCAR-")?
                .parse::<usize>()
                .ok()?;
            Some((index, path))
        })
        .collect();

    files.sort_by_key(|(index, _)| *index);
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_displacements_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["POSCAR-010", "POSCAR-002", "POSCAR-001", "SPOSCAR", "POSCAR-unitcell"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let files = collect_displacements(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["POSCAR-001", "POSCAR-002", "POSCAR-010"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_generate_with_fake_phonopy() {
        let dir = tempfile::tempdir().unwrap();
        let unitcell = dir.path().join("POSCAR");
        fs::write(&unitcell, "unit").unwrap();
        let work = dir.path().join("phonopy");
        fs::create_dir(&work).unwrap();

        let fake = dir.path().join("fake_phonopy.sh");
        fs::write(
            &fake,
            "test \"$1\" = -d || exit 2\n\
             test \"$2\" = '--dim=2 2 2' || exit 3\n\
             echo disp > phonopy_disp.yaml\n\
             echo a > POSCAR-001\n\
             echo b > POSCAR-002\n",
        )
        .unwrap();

        let runner = PhonopyRunner::new(format!("/bin/sh {}", fake.display()));
        let files = runner
            .generate_displacements(&unitcell, &work, 2, 0.01)
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(work.join(DISP_YAML).exists());
    }
}
