//! # 配置文件
//!
//! 读取 `inelasty.toml`：赝势路径、集群提交参数、各类计算的 VASP 参数模板。
//!
//! ## 查找顺序
//! 1. `--config <path>` 或环境变量 `INELASTY_CONFIG`（文件必须存在）
//! 2. 当前目录下的 `inelasty.toml`
//! 3. 内置默认值
//!
//! 文件中的参数模板覆盖在内置模板之上，只需写出要修改的字段。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `toml`, `serde`, `models/settings.rs`

use crate::error::{InelastyError, Result};
use crate::models::{Precision, VaspSettings};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const CONFIG_FILE: &str = "inelasty.toml";

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub paths: PathsConfig,
    pub cluster: ClusterConfig,
    pub settings: SettingsProfiles,
    /// 实际读取的配置文件
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// VASP 相关路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PathsConfig {
    /// 赝势库根目录（VASP_PP_PATH）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vasp_pp_path: Option<PathBuf>,
    /// VASP 命令，可带启动器前缀（如 `srun vasp_std`），默认 `<vasp_pp_path>/bin/vasp_std`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vasp_std: Option<String>,
    /// 赝势子目录
    pub potcar_family: String,
    /// phonopy 命令
    pub phonopy: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            vasp_pp_path: None,
            vasp_std: None,
            potcar_family: "potpaw_PBE".to_string(),
            phonopy: "phonopy".to_string(),
        }
    }
}

/// 集群提交参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClusterConfig {
    /// 提交命令
    pub sbatch: String,
    pub walltime: String,
    pub nodes: u32,
    pub ntasks_per_node: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    /// 作业脚本中 worker 之前执行的环境准备命令
    pub activate: Vec<String>,
    /// worker 可执行文件，默认为当前程序
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<PathBuf>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            sbatch: "sbatch".to_string(),
            walltime: "02:00:00".to_string(),
            nodes: 1,
            ntasks_per_node: 12,
            partition: None,
            activate: Vec::new(),
            worker: None,
        }
    }
}

/// 各类计算的 VASP 参数模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SettingsProfiles {
    pub kpoints: VaspSettings,
    pub encut: VaspSettings,
    pub relax_stage1: VaspSettings,
    pub relax_stage2: VaspSettings,
    pub phonopy: VaspSettings,
}

/// 所有模板共用的参数
fn common() -> VaspSettings {
    VaspSettings {
        ismear: Some(0),
        sigma: Some(0.01),
        prec: Some(Precision::Accurate),
        gga: Some("PE".to_string()),
        ivdw: Some(12),
        ediff: Some(1e-6),
        lasph: Some(true),
        ..Default::default()
    }
}

impl Default for SettingsProfiles {
    fn default() -> Self {
        let single_point = common().merged(&VaspSettings::single_point_base());

        SettingsProfiles {
            kpoints: single_point.with_encut(800.0),
            encut: single_point.with_kpts([3, 3, 3]),
            relax_stage1: common().merged(&VaspSettings {
                kpts: Some([3, 3, 3]),
                encut: Some(500.0),
                ibrion: Some(2),
                isif: Some(8),
                nsw: Some(20),
                ..Default::default()
            }),
            relax_stage2: common().merged(&VaspSettings {
                kpts: Some([3, 3, 3]),
                encut: Some(800.0),
                ibrion: Some(1),
                isif: Some(8),
                nsw: Some(100),
                ..Default::default()
            }),
            phonopy: single_point.merged(&VaspSettings {
                kpts: Some([2, 2, 2]),
                encut: Some(800.0),
                ediff: Some(1e-8),
                ..Default::default()
            }),
        }
    }
}

impl SettingsProfiles {
    /// 把文件中的模板覆盖到内置模板上
    fn overlay_defaults(self) -> Self {
        let base = SettingsProfiles::default();
        SettingsProfiles {
            kpoints: base.kpoints.merged(&self.kpoints),
            encut: base.encut.merged(&self.encut),
            relax_stage1: base.relax_stage1.merged(&self.relax_stage1),
            relax_stage2: base.relax_stage2.merged(&self.relax_stage2),
            phonopy: base.phonopy.merged(&self.phonopy),
        }
    }
}

impl Config {
    /// 按查找顺序加载配置
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(InelastyError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Config::from_file(path)
            }
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.exists() {
                    Config::from_file(local)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// 读取指定配置文件
    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|e| InelastyError::read(path, e))?;
        let mut config =
            Config::from_toml_str(&text).map_err(|reason| InelastyError::ConfigError {
                path: path.display().to_string(),
                reason,
            })?;
        config.source = Some(path.canonicalize().map_err(|e| InelastyError::read(path, e))?);
        Ok(config)
    }

    fn from_toml_str(text: &str) -> std::result::Result<Config, String> {
        let mut config: Config = toml::from_str(text).map_err(|e| e.to_string())?;
        config.settings = config.settings.overlay_defaults();
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| InelastyError::Other(e.to_string()))
    }

    /// 赝势路径：命令行/环境变量优先，其次配置文件
    pub fn resolve_pp_path(&self, cli: Option<&Path>) -> Result<PathBuf> {
        cli.map(Path::to_path_buf)
            .or_else(|| self.paths.vasp_pp_path.clone())
            .ok_or_else(|| {
                InelastyError::InvalidArgument(
                    "Pseudopotential path not set: use --pp-path, VASP_PP_PATH or [paths] vasp_pp_path"
                        .to_string(),
                )
            })
    }

    /// VASP 命令
    pub fn vasp_command(&self, pp_path: &Path) -> String {
        self.paths
            .vasp_std
            .clone()
            .unwrap_or_else(|| pp_path.join("bin").join("vasp_std").display().to_string())
    }

    /// worker 可执行文件
    pub fn worker_executable(&self) -> Result<PathBuf> {
        match self.cluster.worker {
            Some(ref path) => Ok(path.clone()),
            None => std::env::current_exe().map_err(|e| {
                InelastyError::Other(format!("Cannot locate current executable: {}", e))
            }),
        }
    }
}
