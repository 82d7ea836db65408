//! # worker 命令实现
//!
//! 作业脚本在计算节点上调用的两个 worker：
//! - `single-point`: 单点能量，结果追加到 `energy.txt`
//! - `relax-worker`: 两阶段几何优化，阶段 1 的 CONTCAR 原样作为阶段 2 的 POSCAR
//!
//! 任一步骤失败时在作业目录写入 `failed` 标记，然后以非零状态退出。
//!
//! ## 依赖关系
//! - 使用 `cli/worker.rs` 定义的参数
//! - 使用 `engine/vasp.rs`, `parsers/energy.rs`, `parsers/poscar.rs`, `batch/state.rs`

use crate::batch::state;
use crate::cli::worker::{RelaxWorkerArgs, SinglePointArgs};
use crate::commands::relax::{STAGE_1, STAGE_2};
use crate::config::Config;
use crate::engine::VaspRunner;
use crate::error::{InelastyError, Result};
use crate::models::VaspSettings;
use crate::parsers::energy::append_energy;
use crate::parsers::{poscar, RELAXED_STRUCTURE_FILE, STRUCTURE_FILE};
use crate::utils::output;

use std::fs;
use std::path::Path;

/// 能量记录的标签
const ENERGY_LABEL: &str = "energy";

fn runner(config: &Config, pp_path: &Path) -> VaspRunner {
    VaspRunner::new(
        config.vasp_command(pp_path),
        pp_path.to_path_buf(),
        config.paths.potcar_family.clone(),
    )
}

/// 执行单点 worker
pub fn single_point(args: SinglePointArgs, config: &Config) -> Result<()> {
    let result = VaspSettings::from_json(&args.settings)
        .map(|overrides| VaspSettings::single_point_base().merged(&overrides))
        .and_then(|settings| run_stage(&runner(config, &args.pp_path), &args.dir, &settings));

    report(&args.dir, result)
}

/// 执行两阶段弛豫 worker
pub fn relax(args: RelaxWorkerArgs, config: &Config) -> Result<()> {
    let stage1 = args.dir.join(STAGE_1);
    let stage2 = args.dir.join(STAGE_2);

    let settings1 = VaspSettings::from_json(&args.stage1);
    let settings2 = VaspSettings::from_json(&args.stage2);
    let (settings1, settings2) = match (settings1, settings2) {
        (Ok(s1), Ok(s2)) => (s1, s2),
        (Err(e), _) | (_, Err(e)) => return report(&stage1, Err(e)),
    };

    let vasp = runner(config, &args.pp_path);

    output::print_info("Stage 1");
    report(&stage1, run_stage(&vasp, &stage1, &settings1))?;

    fs::create_dir_all(&stage2).map_err(|e| InelastyError::write(&stage2, e))?;
    report(&stage2, promote_relaxed_structure(&stage1, &stage2))?;

    output::print_info("Stage 2");
    report(&stage2, run_stage(&vasp, &stage2, &settings2))
}

/// 运行一次 VASP 并记录能量
fn run_stage(vasp: &VaspRunner, dir: &Path, settings: &VaspSettings) -> Result<()> {
    let energy = vasp.single_point(dir, settings)?;
    append_energy(dir, ENERGY_LABEL, energy)?;
    output::print_success(&format!("{}: energy = {} eV", dir.display(), energy));
    Ok(())
}

/// 失败时写入标记后原样返回错误
fn report(dir: &Path, result: Result<()>) -> Result<()> {
    if let Err(ref e) = result {
        if dir.is_dir() {
            if let Err(mark_err) = state::mark_failed(dir, &e.to_string()) {
                output::print_warning(&mark_err.to_string());
            }
        }
    }
    result
}

/// 校验阶段 1 的 CONTCAR 后原样写为阶段 2 的 POSCAR
pub fn promote_relaxed_structure(stage1: &Path, stage2: &Path) -> Result<()> {
    let contcar = stage1.join(RELAXED_STRUCTURE_FILE);
    if !contcar.exists() {
        return Err(InelastyError::FileNotFound {
            path: contcar.display().to_string(),
        });
    }

    let text = fs::read_to_string(&contcar).map_err(|e| InelastyError::read(&contcar, e))?;
    poscar::parse_poscar_content(&text, "CONTCAR").map_err(|e| match e {
        InelastyError::ParseError { format, reason, .. } => InelastyError::ParseError {
            format,
            path: contcar.display().to_string(),
            reason,
        },
        other => other,
    })?;

    let target = stage2.join(STRUCTURE_FILE);
    fs::write(&target, text).map_err(|e| InelastyError::write(&target, e))
}
