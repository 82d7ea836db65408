//! # VASP OUTCAR 解析器
//!
//! 解析 VASP 计算输出文件 OUTCAR：
//! - 单点能量 `energy(sigma->0)`（最后一个离子步）
//! - 几何优化过程：每个离子步的电子步数和 TOTEN
//!
//! ## 依赖关系
//! - 被 `engine/vasp.rs`, `commands/plot.rs` 使用
//! - 使用 `regex`

use crate::error::{InelastyError, Result};

use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// OUTCAR 摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcarSummary {
    /// 计算是否正常结束
    pub is_finished: bool,
    /// 最后一个 energy(sigma->0) (eV)
    pub energy_ev: Option<f64>,
    /// 原子数
    pub num_atoms: Option<usize>,
}

/// 几何优化中的一个离子步
#[derive(Debug, Clone, PartialEq)]
pub struct IonicStep {
    /// 离子步序号（1 起始）
    pub ionic_step: usize,
    /// 该离子步的电子步数
    pub electronic_steps: usize,
    /// 该离子步最后一次电子迭代的 TOTEN (eV)
    pub toten_ev: f64,
}

fn open_lines(path: &Path) -> Result<impl Iterator<Item = String>> {
    if !path.exists() {
        return Err(InelastyError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path).map_err(|e| InelastyError::read(path, e))?;
    Ok(BufReader::new(file).lines().map_while(|l| l.ok()))
}

/// 解析 VASP OUTCAR 文件
pub fn parse_outcar(path: &Path) -> Result<OutcarSummary> {
    Ok(parse_outcar_lines(open_lines(path)?))
}

fn parse_outcar_lines<I: IntoIterator<Item = String>>(lines: I) -> OutcarSummary {
    let mut summary = OutcarSummary::default();

    for line in lines {
        // 检查是否完成
        if line.contains("General timing and accounting informations for this job") {
            summary.is_finished = true;
        }

        // "energy  without entropy=     -123.456789  energy(sigma->0) =     -123.456789"
        if line.contains("energy  without entropy") {
            if let Some(pos) = line.find("energy(sigma->0)") {
                if let Some(val) = extract_number_after(&line[pos..], "=") {
                    summary.energy_ev = Some(val);
                }
            }
        }

        // "   NIONS =       8"
        if line.contains("NIONS =") {
            if let Some(val) = extract_last_number(&line) {
                summary.num_atoms = Some(val as usize);
            }
        }
    }

    summary
}

impl OutcarSummary {
    /// 单点计算的总能量 energy(sigma->0)
    pub fn final_energy(&self, path: &Path) -> Result<f64> {
        self.energy_ev.ok_or_else(|| InelastyError::ParseError {
            format: "outcar".to_string(),
            path: path.display().to_string(),
            reason: "No 'energy(sigma->0)' line found".to_string(),
        })
    }
}

/// 读取几何优化轨迹
pub fn parse_relaxation(path: &Path) -> Result<Vec<IonicStep>> {
    let steps = parse_relaxation_lines(open_lines(path)?);
    if steps.is_empty() {
        return Err(InelastyError::ParseError {
            format: "outcar".to_string(),
            path: path.display().to_string(),
            reason: "No ionic steps with TOTEN found".to_string(),
        });
    }
    Ok(steps)
}

fn parse_relaxation_lines<I: IntoIterator<Item = String>>(lines: I) -> Vec<IonicStep> {
    // "---- Iteration    3(  12)  ----"
    let iteration = Regex::new(r"Iteration\s+(\d+)\(\s*(\d+)\)").expect("valid regex");

    let mut steps: Vec<IonicStep> = Vec::new();
    let mut ionic = 0usize;
    let mut electronic = 0usize;

    for line in lines {
        if let Some(caps) = iteration.captures(&line) {
            ionic = caps[1].parse().unwrap_or(ionic);
            electronic = caps[2].parse().unwrap_or(electronic);
            continue;
        }

        if ionic > 0 && line.contains("TOTEN") && line.contains("free") {
            if let Some(toten) = extract_number_before(&line, "eV") {
                match steps.last_mut() {
                    Some(last) if last.ionic_step == ionic => {
                        last.electronic_steps = electronic;
                        last.toten_ev = toten;
                    }
                    _ => steps.push(IonicStep {
                        ionic_step: ionic,
                        electronic_steps: electronic,
                        toten_ev: toten,
                    }),
                }
            }
        }
    }

    steps
}

/// 从字符串中提取指定标记之前的数字
fn extract_number_before(s: &str, marker: &str) -> Option<f64> {
    let pos = s.rfind(marker)?;
    s[..pos].split_whitespace().last()?.parse().ok()
}

/// 从字符串中提取指定标记之后的数字
fn extract_number_after(s: &str, marker: &str) -> Option<f64> {
    let pos = s.find(marker)?;
    s[pos + marker.len()..].split_whitespace().next()?.parse().ok()
}

/// 提取字符串中最后一个数字
fn extract_last_number(s: &str) -> Option<f64> {
    s.split_whitespace()
        .filter_map(|w| w.parse::<f64>().ok())
        .last()
}
