//! # phonopy 命令实现
//!
//! 调用 phonopy 生成位移超胞，把每个 `POSCAR-NNN` 移入独立目录；
//! 指定 `--run` 时把每个位移当作一个扫描点提交单点计算。
//!
//! ## 目录结构
//! ```text
//! <base>/phonopy_disp.yaml
//! <base>/<前缀>-0/POSCAR
//! <base>/<前缀>-1/POSCAR
//! ...
//! ```
//!
//! ## 依赖关系
//! - 使用 `cli/phonopy.rs` 定义的参数
//! - 使用 `engine/phonopy.rs`, `batch/driver.rs`, `commands/sweep.rs`

use crate::batch::driver::prepare_job_dir;
use crate::batch::SweepDriver;
use crate::cli::phonopy::PhonopyArgs;
use crate::commands::sweep::{finish, job_template, read_structure, submitter};
use crate::config::Config;
use crate::engine::phonopy::{PhonopyRunner, DISP_YAML};
use crate::error::{InelastyError, Result};
use crate::models::job::enumerate_points;
use crate::models::{SweepKind, SweepPoint, SweepValue};
use crate::utils::{output, progress};

use std::fs;
use std::path::{Path, PathBuf};

/// 执行 phonopy 命令
pub fn execute(args: PhonopyArgs, config: &Config) -> Result<()> {
    output::print_header("Phonopy Displacements");

    if args.supercell == 0 {
        return Err(InelastyError::InvalidArgument(
            "Supercell multiplier must be positive".to_string(),
        ));
    }
    read_structure(&args.unitcell)?;

    fs::create_dir_all(&args.base_dir).map_err(|e| InelastyError::write(&args.base_dir, e))?;
    let base_name = args
        .base_name
        .clone()
        .unwrap_or_else(|| default_base_name(&args.base_dir));

    let spinner = progress::create_spinner("Running phonopy -d");
    let runner = PhonopyRunner::new(config.paths.phonopy.clone());
    let generated =
        runner.generate_displacements(&args.unitcell, &args.base_dir, args.supercell, args.amplitude);
    spinner.finish_and_clear();
    let files = generated?;

    output::print_success(&format!(
        "{} displaced supercell(s), metadata in '{}'",
        files.len(),
        args.base_dir.join(DISP_YAML).display()
    ));

    let structures = take_displacements(&files)?;
    let values: Vec<SweepValue> = (0..structures.len()).map(SweepValue::Displacement).collect();
    let points = enumerate_points(&values);
    let structure_for = |p: &SweepPoint| -> Result<String> { Ok(structures[p.index].clone()) };

    if args.run {
        let template = job_template(config, &args.submit)?;
        let driver = SweepDriver::new(
            SweepKind::Displacements,
            &args.base_dir,
            &config.settings.phonopy,
            &template,
        )
        .with_base_name(base_name);
        let mut submitter = submitter(config, &args.submit);
        let result = driver.run(&points, structure_for, submitter.as_mut())?;
        return finish(&result, "phonopy");
    }

    let dirs = place_displacements(&args.base_dir, &base_name, &points, structure_for)?;
    output::print_done(&format!(
        "{} displacement directories written under '{}' (use --run to submit)",
        dirs.len(),
        args.base_dir.display()
    ));
    Ok(())
}

/// 位移目录前缀默认使用基目录名
fn default_base_name(base_dir: &Path) -> String {
    base_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "phonopy".to_string())
}

/// 读取位移文件内容后删除原文件
fn take_displacements(files: &[PathBuf]) -> Result<Vec<String>> {
    files
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).map_err(|e| InelastyError::read(path, e))?;
            fs::remove_file(path).map_err(|e| InelastyError::write(path, e))?;
            Ok(text)
        })
        .collect()
}

/// 只写入位移目录，不生成脚本
fn place_displacements<F>(
    base_dir: &Path,
    base_name: &str,
    points: &[SweepPoint],
    structure_for: F,
) -> Result<Vec<PathBuf>>
where
    F: Fn(&SweepPoint) -> Result<String>,
{
    points
        .iter()
        .map(|p| prepare_job_dir(&base_dir.join(p.dir_name(base_name)), &structure_for(p)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::sweep::SubmitOptions;
    use crate::parsers::STRUCTURE_FILE;

    const POSCAR: &str = "Si\n1.0\n5.4 0 0\n0 5.4 0\n0 0 5.4\nSi\n2\nDirect\n0 0 0\n0.25 0.25 0.25\n";

    /// 用 shell 脚本模拟 phonopy，生成三个位移文件
    fn fake_phonopy(dir: &Path) -> String {
        let script = dir.join("fake_phonopy.sh");
        fs::write(
            &script,
            "echo disp > phonopy_disp.yaml\n\
             for i in 001 002 003; do echo \"disp $i\" > POSCAR-$i; done\n",
        )
        .unwrap();
        format!("/bin/sh {}", script.display())
    }

    fn args(dir: &Path, run: bool) -> PhonopyArgs {
        let unitcell = dir.join("POSCAR");
        fs::write(&unitcell, POSCAR).unwrap();
        PhonopyArgs {
            unitcell,
            base_dir: dir.join("phonopy"),
            base_name: None,
            supercell: 2,
            amplitude: 0.01,
            run,
            submit: SubmitOptions {
                pp_path: Some(PathBuf::from("/opt/vasp")),
                dry_run: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_default_base_name() {
        assert_eq!(default_base_name(Path::new("runs/phonopy")), "phonopy");
        assert_eq!(default_base_name(Path::new("TiO2")), "TiO2");
    }

    #[cfg(unix)]
    #[test]
    fn test_displacements_moved_into_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.phonopy = fake_phonopy(dir.path());

        execute(args(dir.path(), false), &config).unwrap();

        let base = dir.path().join("phonopy");
        for i in 0..3 {
            let poscar = base.join(format!("phonopy-{}", i)).join(STRUCTURE_FILE);
            assert_eq!(
                fs::read_to_string(poscar).unwrap(),
                format!("disp {:03}\n", i + 1)
            );
        }
        assert!(base.join(DISP_YAML).exists());
        assert!(!base.join("POSCAR-001").exists());
        assert!(!base.join("phonopy-0").join("submit.sbatch").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_writes_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.phonopy = fake_phonopy(dir.path());
        config.cluster.worker = Some(PathBuf::from("/usr/local/bin/inelasty"));

        execute(args(dir.path(), true), &config).unwrap();

        let script =
            fs::read_to_string(dir.path().join("phonopy/phonopy-2/submit.sbatch")).unwrap();
        assert!(script.contains("#SBATCH --job-name=phon_2"));
        assert!(script.contains(r#""ediff":1e-8"#));
        assert!(dir.path().join("phonopy/sweep.json").exists());
    }
}
