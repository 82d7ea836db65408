//! # sweep 命令实现
//!
//! 对一个结构提交 k 点或截断能收敛扫描。
//!
//! ## 功能
//! - 校验输入结构
//! - 展开扫描点（默认列表或命令行列表）
//! - 从配置模板生成参数，逐点提交单点 worker 作业
//! - 汇总提交结果，有失败时以非零状态退出
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `batch/driver.rs`, `config.rs`, `parsers/poscar.rs`
//! - `SubmitOptions` 的处理被 `commands/relax.rs`, `commands/phonopy.rs` 复用

use crate::batch::{BatchResult, JobTemplate, SweepDriver};
use crate::cli::sweep::{EncutArgs, KpointsArgs, SubmitOptions, SweepArgs, SweepCommands};
use crate::config::Config;
use crate::error::{InelastyError, Result};
use crate::models::job::{default_encuts, default_meshes, enumerate_points};
use crate::models::{SweepKind, SweepValue, VaspSettings};
use crate::parsers::poscar;
use crate::utils::output;
use crate::utils::slurm::{DryRunSubmitter, JobSubmitter, SlurmSubmitter};

use std::fs;
use std::path::Path;

/// 执行 sweep 命令
pub fn execute(args: SweepArgs, config: &Config) -> Result<()> {
    match args.command {
        SweepCommands::Kpoints(args) => kpoints(args, config),
        SweepCommands::Encut(args) => encut(args, config),
    }
}

fn kpoints(args: KpointsArgs, config: &Config) -> Result<()> {
    let meshes = if args.mesh.is_empty() {
        default_meshes()
    } else {
        args.mesh
    };
    let values: Vec<SweepValue> = meshes.into_iter().map(SweepValue::Mesh).collect();

    run(
        SweepKind::KPoints,
        &args.structure,
        &args.base_dir,
        &values,
        &config.settings.kpoints,
        &args.submit,
        config,
    )
}

fn encut(args: EncutArgs, config: &Config) -> Result<()> {
    let encuts = if args.encut.is_empty() {
        default_encuts()
    } else {
        args.encut
    };
    check_encuts(&encuts)?;
    let values: Vec<SweepValue> = encuts.into_iter().map(SweepValue::Encut).collect();

    run(
        SweepKind::Encut,
        &args.structure,
        &args.base_dir,
        &values,
        &config.settings.encut,
        &args.submit,
        config,
    )
}

/// 截断能必须为正整数，作业目录以整数命名
fn check_encuts(encuts: &[f64]) -> Result<()> {
    if let Some(bad) = encuts.iter().find(|e| e.is_nan() || **e <= 0.0) {
        return Err(InelastyError::InvalidArgument(format!(
            "Cutoff energy must be positive, got {}",
            bad
        )));
    }
    if let Some(bad) = encuts.iter().find(|e| e.fract() != 0.0) {
        return Err(InelastyError::InvalidArgument(format!(
            "Cutoff energy must be a whole number of eV, got {}",
            bad
        )));
    }
    Ok(())
}

fn run(
    kind: SweepKind,
    structure: &Path,
    base_dir: &Path,
    values: &[SweepValue],
    settings: &VaspSettings,
    opts: &SubmitOptions,
    config: &Config,
) -> Result<()> {
    output::print_header(&format!("{} Convergence Sweep", kind));

    let structure_text = read_structure(structure)?;
    let template = job_template(config, opts)?;
    let mut submitter = submitter(config, opts);

    output::print_info(&format!(
        "{} point(s) under '{}'{}",
        values.len(),
        base_dir.display(),
        if opts.dry_run { " (dry run)" } else { "" }
    ));

    let points = enumerate_points(values);
    let driver = SweepDriver::new(kind, base_dir, settings, &template);
    let result = driver.run(
        &points,
        |_| Ok(structure_text.clone()),
        submitter.as_mut(),
    )?;

    finish(&result, &kind.to_string())
}

/// 读取并校验输入结构，返回原始文本
pub(crate) fn read_structure(path: &Path) -> Result<String> {
    let crystal = poscar::parse_poscar_file(path)?;
    let (a, b, c) = crystal.lattice.lengths();
    output::print_info(&format!(
        "Structure '{}': {} ({} atoms, a={:.4} b={:.4} c={:.4} Å, V={:.3} Å³)",
        path.display(),
        crystal.formula(),
        crystal.atoms.len(),
        a,
        b,
        c,
        crystal.lattice.volume().abs()
    ));
    fs::read_to_string(path).map_err(|e| InelastyError::read(path, e))
}

/// 配置文件与命令行选项合成作业模板
pub(crate) fn job_template(config: &Config, opts: &SubmitOptions) -> Result<JobTemplate> {
    let pp_path = config.resolve_pp_path(opts.pp_path.as_deref())?;
    let pp_path = if pp_path.is_absolute() {
        pp_path
    } else {
        std::env::current_dir()
            .map_err(|e| InelastyError::Other(e.to_string()))?
            .join(pp_path)
    };

    let mut template = JobTemplate::from_config(config, config.worker_executable()?, pp_path);
    if let Some(ref time) = opts.time {
        template.walltime = time.clone();
    }
    if let Some(nodes) = opts.nodes {
        template.nodes = nodes;
    }
    if let Some(ntasks) = opts.ntasks_per_node {
        template.ntasks_per_node = ntasks;
    }
    if let Some(ref partition) = opts.partition {
        template.partition = Some(partition.clone());
    }
    Ok(template)
}

/// 按 dry-run 选择提交方式
pub(crate) fn submitter(config: &Config, opts: &SubmitOptions) -> Box<dyn JobSubmitter> {
    if opts.dry_run {
        Box::new(DryRunSubmitter)
    } else {
        Box::new(SlurmSubmitter::new(config.cluster.sbatch.clone()))
    }
}

/// 打印汇总，有失败时返回错误
pub(crate) fn finish(result: &BatchResult, what: &str) -> Result<()> {
    result.report(what);
    if result.failed > 0 {
        return Err(InelastyError::IncompleteBatch {
            failed: result.failed,
            total: result.total(),
        });
    }
    Ok(())
}
