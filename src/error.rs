//! # 统一错误处理模块
//!
//! 定义 Inelasty 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 配置错误：JSON 设置格式错误、结构文件缺失、配置文件无效
//! - 外部进程错误：VASP / sbatch / phonopy 非零退出
//! - 结果错误：收集结果时能量文件缺失或格式错误
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Inelasty 统一错误类型
#[derive(Error, Debug)]
pub enum InelastyError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid settings JSON: {0}")]
    SettingsError(#[from] serde_json::Error),

    #[error("Invalid configuration file: {path}\nReason: {reason}")]
    ConfigError { path: String, reason: String },

    #[error("Missing pseudopotential: {path}")]
    PotcarNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Submission failed for {path} (exit code {code:?})\n{output}")]
    SubmissionError {
        path: String,
        code: Option<i32>,
        output: String,
    },

    #[error("{failed} of {total} submission(s) failed")]
    IncompleteBatch { failed: usize, total: usize },

    // ─────────────────────────────────────────────────────────────
    // 结果错误
    // ─────────────────────────────────────────────────────────────
    #[error("No result for parameter {parameter}: {path} is missing (job still running or failed)")]
    MissingResultError { parameter: String, path: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl InelastyError {
    /// 包装写文件错误
    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        InelastyError::FileWriteError {
            path: path.display().to_string(),
            source,
        }
    }

    /// 包装读文件错误
    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        InelastyError::FileReadError {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, InelastyError>;
