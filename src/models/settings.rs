//! # VASP 计算参数
//!
//! 显式、带类型的参数集合，取代自由形式的关键字字典。
//!
//! ## 约定
//! - 所有字段可选，未设置的字段不写入 INCAR，也不出现在 JSON 中
//! - 反序列化时拒绝未知字段
//! - 合并总是返回新值，基础参数本身永不修改
//!
//! ## 依赖关系
//! - 被 `config.rs`, `commands/`, `engine/vasp.rs` 使用
//! - 使用 `serde`, `serde_json`

use crate::error::{InelastyError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// VASP PREC 精度模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Precision {
    Low,
    Medium,
    High,
    Normal,
    Single,
    Accurate,
}

impl FromStr for Precision {
    type Err = InelastyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Precision::Low),
            "medium" => Ok(Precision::Medium),
            "high" => Ok(Precision::High),
            "normal" => Ok(Precision::Normal),
            "single" => Ok(Precision::Single),
            "accurate" => Ok(Precision::Accurate),
            other => Err(InelastyError::InvalidArgument(format!(
                "Unknown PREC '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Precision {
    type Error = InelastyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Precision> for String {
    fn from(p: Precision) -> String {
        p.to_string()
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Precision::Low => "Low",
            Precision::Medium => "Medium",
            Precision::High => "High",
            Precision::Normal => "Normal",
            Precision::Single => "Single",
            Precision::Accurate => "Accurate",
        };
        write!(f, "{}", s)
    }
}

/// VASP 参数集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaspSettings {
    /// 平面波截断能 (eV)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encut: Option<f64>,

    /// Monkhorst-Pack k 点网格
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpts: Option<[u32; 3]>,

    /// 展宽方法
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ismear: Option<i32>,

    /// 展宽宽度 (eV)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prec: Option<Precision>,

    /// 交换关联泛函标签
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gga: Option<String>,

    /// 色散修正
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ivdw: Option<i32>,

    /// 电子步收敛判据
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ediff: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lasph: Option<bool>,

    /// 离子步数，0 为单点
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsw: Option<i32>,

    /// 离子弛豫算法
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibrion: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isif: Option<i32>,
}

impl VaspSettings {
    /// 单点计算的基础参数
    pub fn single_point_base() -> Self {
        VaspSettings {
            nsw: Some(0),
            ibrion: Some(-1),
            ..Default::default()
        }
    }

    /// 合并参数，`overrides` 中已设置的字段优先
    pub fn merged(&self, overrides: &VaspSettings) -> VaspSettings {
        VaspSettings {
            encut: overrides.encut.or(self.encut),
            kpts: overrides.kpts.or(self.kpts),
            ismear: overrides.ismear.or(self.ismear),
            sigma: overrides.sigma.or(self.sigma),
            prec: overrides.prec.or(self.prec),
            gga: overrides.gga.clone().or_else(|| self.gga.clone()),
            ivdw: overrides.ivdw.or(self.ivdw),
            ediff: overrides.ediff.or(self.ediff),
            lasph: overrides.lasph.or(self.lasph),
            nsw: overrides.nsw.or(self.nsw),
            ibrion: overrides.ibrion.or(self.ibrion),
            isif: overrides.isif.or(self.isif),
        }
    }

    pub fn with_encut(&self, encut: f64) -> VaspSettings {
        VaspSettings {
            encut: Some(encut),
            ..self.clone()
        }
    }

    pub fn with_kpts(&self, kpts: [u32; 3]) -> VaspSettings {
        VaspSettings {
            kpts: Some(kpts),
            ..self.clone()
        }
    }

    /// 从 JSON 对象解析，未知字段报错
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// 序列化为单行 JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 生成 INCAR 文件内容
    pub fn to_incar(&self) -> String {
        let mut tags: Vec<(&str, String)> = Vec::new();

        if let Some(v) = self.prec {
            tags.push(("PREC", v.to_string()));
        }
        if let Some(v) = self.encut {
            tags.push(("ENCUT", format_float(v)));
        }
        if let Some(ref v) = self.gga {
            tags.push(("GGA", v.to_uppercase()));
        }
        if let Some(v) = self.ivdw {
            tags.push(("IVDW", v.to_string()));
        }
        if let Some(v) = self.ismear {
            tags.push(("ISMEAR", v.to_string()));
        }
        if let Some(v) = self.sigma {
            tags.push(("SIGMA", format_float(v)));
        }
        if let Some(v) = self.ediff {
            tags.push(("EDIFF", format_float(v)));
        }
        if let Some(v) = self.lasph {
            tags.push(("LASPH", format_bool(v)));
        }
        if let Some(v) = self.nsw {
            tags.push(("NSW", v.to_string()));
        }
        if let Some(v) = self.ibrion {
            tags.push(("IBRION", v.to_string()));
        }
        if let Some(v) = self.isif {
            tags.push(("ISIF", v.to_string()));
        }

        let width = tags.iter().map(|(tag, _)| tag.len()).max().unwrap_or(0);

        let mut incar = String::from("INCAR created by inelasty\n");
        for (tag, value) in tags {
            incar.push_str(&format!(" {:width$} = {}\n", tag, value, width = width));
        }
        incar
    }

    /// 生成 KPOINTS 文件内容（Monkhorst-Pack），未设置 k 点时返回 None
    pub fn to_kpoints(&self) -> Option<String> {
        self.kpts.map(|k| {
            format!(
                "KPOINTS created by inelasty\n0\nMonkhorst-Pack\n{} {} {}\n0 0 0\n",
                k[0], k[1], k[2]
            )
        })
    }
}

/// 浮点数写法：整数值不带多余小数，小量用科学计数
fn format_float(v: f64) -> String {
    if v != 0.0 && v.abs() < 1e-3 {
        format!("{:e}", v)
    } else if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

fn format_bool(v: bool) -> String {
    if v {
        ".TRUE.".to_string()
    } else {
        ".FALSE.".to_string()
    }
}
