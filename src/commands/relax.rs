//! # relax 命令实现
//!
//! 准备两阶段几何优化目录并提交一个作业，
//! 由 `relax-worker` 在同一个作业中依次运行两个阶段。
//!
//! ## 目录结构
//! ```text
//! <base>/stage_1/POSCAR          输入结构
//! <base>/stage_1/submit.sbatch
//! <base>/stage_2/                 阶段 2，POSCAR 由 worker 从阶段 1 的 CONTCAR 写入
//! ```
//!
//! ## 依赖关系
//! - 使用 `cli/relax.rs` 定义的参数
//! - 使用 `batch/template.rs`, `batch/state.rs`, `commands/sweep.rs`

use crate::batch::state;
use crate::cli::relax::RelaxArgs;
use crate::commands::sweep::{job_template, read_structure, submitter};
use crate::config::Config;
use crate::error::{InelastyError, Result};
use crate::parsers::STRUCTURE_FILE;
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 阶段目录名
pub const STAGE_1: &str = "stage_1";
pub const STAGE_2: &str = "stage_2";

/// 作业名
const JOB_NAME: &str = "geom_relax";

/// 执行 relax 命令
pub fn execute(args: RelaxArgs, config: &Config) -> Result<()> {
    output::print_header("Two-Stage Geometry Optimisation");

    let structure = read_structure(&args.structure)?;
    let (base, stage1) = prepare_stages(&args.base_dir, &structure)?;

    let template = job_template(config, &args.submit)?;
    let command = template.relax_command(
        &base,
        &config.settings.relax_stage1,
        &config.settings.relax_stage2,
    )?;
    let script = template.render(JOB_NAME, &stage1, &command);

    let mut submitter = submitter(config, &args.submit);
    let job = submitter.submit(&script, &stage1)?;

    if submitter.is_dry_run() {
        output::print_skip(&format!("Dry run: script written to '{}'", job.script.display()));
        return Ok(());
    }

    state::mark_submitted(&stage1, job.job_id.as_deref())?;
    output::print_success(&format!(
        "Submitted {} (job {})",
        JOB_NAME,
        job.job_id.as_deref().unwrap_or("?")
    ));
    Ok(())
}

/// 创建两个阶段目录，写入阶段 1 的结构
///
/// 返回 (基目录绝对路径, 阶段 1 绝对路径)。
pub fn prepare_stages(base_dir: &Path, structure: &str) -> Result<(PathBuf, PathBuf)> {
    let stage1 = base_dir.join(STAGE_1);
    let stage2 = base_dir.join(STAGE_2);
    for dir in [&stage1, &stage2] {
        fs::create_dir_all(dir).map_err(|e| InelastyError::write(dir, e))?;
    }

    let poscar = stage1.join(STRUCTURE_FILE);
    fs::write(&poscar, structure).map_err(|e| InelastyError::write(&poscar, e))?;

    let base = base_dir
        .canonicalize()
        .map_err(|e| InelastyError::read(base_dir, e))?;
    let stage1 = base.join(STAGE_1);
    Ok((base, stage1))
}
