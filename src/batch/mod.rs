//! # 批量作业模块
//!
//! 把一组扫描点展开为作业目录并提交，之后按目录查询状态、收集结果。
//!
//! ## 功能
//! - 扫描驱动：目录创建、结构写入、脚本渲染、逐点提交
//! - 逐点记录提交结果并汇总
//! - 作业状态标记与推断
//! - 并行收集能量记录
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `rayon` 并行读取，`walkdir` 列出目录
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod driver;
pub mod harvest;
pub mod manifest;
pub mod runner;
pub mod state;
pub mod template;

pub use collector::JobDirCollector;
pub use driver::SweepDriver;
pub use harvest::{harvest, Harvest, MissingPolicy};
pub use manifest::SweepManifest;
pub use runner::BatchResult;
pub use template::JobTemplate;
