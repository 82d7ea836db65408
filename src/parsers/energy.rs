//! # 能量记录文件
//!
//! 每个作业目录下的 `energy.txt`：只追加，每次运行一行 `energy: <value>`。
//! 收集结果时取最后一个非空行的第二个字段。
//!
//! ## 依赖关系
//! - 被 `commands/worker.rs`, `commands/harvest.rs`, `batch/state.rs` 使用

use crate::error::{InelastyError, Result};

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// 能量记录文件名
pub const ENERGY_FILE: &str = "energy.txt";

/// 追加一条能量记录
pub fn append_energy(dir: &Path, label: &str, energy: f64) -> Result<()> {
    let path = dir.join(ENERGY_FILE);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| InelastyError::write(&path, e))?;

    writeln!(file, "{}: {}", label, energy).map_err(|e| InelastyError::write(&path, e))
}

/// 读取能量记录文件中最后一条记录的能量
pub fn read_energy(path: &Path) -> Result<f64> {
    let content = fs::read_to_string(path).map_err(|e| InelastyError::read(path, e))?;
    parse_energy_line(&content).ok_or_else(|| InelastyError::ParseError {
        format: "energy log".to_string(),
        path: path.display().to_string(),
        reason: "Expected a line of the form '<label>: <float>'".to_string(),
    })
}

fn parse_energy_line(content: &str) -> Option<f64> {
    let line = content.lines().rev().find(|l| !l.trim().is_empty())?;
    line.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        assert_eq!(parse_energy_line("energy: -12.5\n"), Some(-12.5));
    }

    #[test]
    fn test_parse_takes_last_line() {
        let content = "energy: -12.5\nenergy: -12.75\n\n";
        assert_eq!(parse_energy_line(content), Some(-12.75));
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_energy_line(""), None);
        assert_eq!(parse_energy_line("energy:\n"), None);
        assert_eq!(parse_energy_line("energy: abc\n"), None);
    }

    #[test]
    fn test_append_then_read() {
        let dir = tempfile::tempdir().unwrap();
        append_energy(dir.path(), "energy", -3.25).unwrap();
        append_energy(dir.path(), "energy", -3.5).unwrap();

        let content = fs::read_to_string(dir.path().join(ENERGY_FILE)).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(read_energy(&dir.path().join(ENERGY_FILE)).unwrap(), -3.5);
    }
}
