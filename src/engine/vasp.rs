//! # VASP 调用
//!
//! 在作业目录中准备 INCAR / KPOINTS / POTCAR，同步运行 VASP，并从 OUTCAR 读取能量。
//!
//! ## 目录约定
//! ```text
//! <dir>/POSCAR     输入结构（由扫描驱动写入）
//! <dir>/INCAR      由 VaspSettings 生成
//! <dir>/KPOINTS    设置了 kpts 时生成
//! <dir>/POTCAR     <pp>/<family>/<元素>/POTCAR 按 POSCAR 元素顺序拼接
//! <dir>/vasp.out   VASP 标准输出
//! <dir>/OUTCAR     VASP 输出，读取 energy(sigma->0)
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/worker.rs` 使用
//! - 使用 `parsers/poscar.rs`, `parsers/outcar.rs`, `models/settings.rs`

use crate::error::{InelastyError, Result};
use crate::models::{Crystal, VaspSettings};
use crate::parsers::{outcar, poscar, STRUCTURE_FILE};
use crate::utils::output;

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// VASP 标准输出重定向文件
pub const STDOUT_FILE: &str = "vasp.out";

/// VASP 输出文件
pub const OUTCAR_FILE: &str = "OUTCAR";

/// 传给 VASP 的赝势路径环境变量
pub const PP_ENV: &str = "VASP_PP_PATH";

/// VASP 运行器
#[derive(Debug, Clone)]
pub struct VaspRunner {
    /// 运行命令，可带启动器前缀
    command: String,
    pp_path: PathBuf,
    potcar_family: String,
}

impl VaspRunner {
    pub fn new(command: impl Into<String>, pp_path: PathBuf, potcar_family: impl Into<String>) -> Self {
        VaspRunner {
            command: command.into(),
            pp_path,
            potcar_family: potcar_family.into(),
        }
    }

    /// 单点计算：读取 POSCAR，写入输入文件，运行 VASP，返回能量
    pub fn single_point(&self, dir: &Path, settings: &VaspSettings) -> Result<f64> {
        let crystal = poscar::parse_poscar_file(&dir.join(STRUCTURE_FILE))?;
        self.prepare_inputs(dir, &crystal, settings)?;
        self.run(dir)?;

        let outcar_path = dir.join(OUTCAR_FILE);
        let summary = outcar::parse_outcar(&outcar_path)?;
        if !summary.is_finished {
            output::print_warning(&format!(
                "{} has no timing footer, the run may have stopped early",
                outcar_path.display()
            ));
        }
        if let Some(n) = summary.num_atoms.filter(|n| *n != crystal.atoms.len()) {
            output::print_warning(&format!(
                "{} reports {} ions but POSCAR has {}",
                outcar_path.display(),
                n,
                crystal.atoms.len()
            ));
        }
        summary.final_energy(&outcar_path)
    }

    /// 写入 INCAR、KPOINTS、POTCAR
    pub fn prepare_inputs(
        &self,
        dir: &Path,
        crystal: &Crystal,
        settings: &VaspSettings,
    ) -> Result<()> {
        let incar = dir.join("INCAR");
        fs::write(&incar, settings.to_incar()).map_err(|e| InelastyError::write(&incar, e))?;

        if let Some(kpoints_text) = settings.to_kpoints() {
            let kpoints = dir.join("KPOINTS");
            fs::write(&kpoints, kpoints_text).map_err(|e| InelastyError::write(&kpoints, e))?;
        }

        self.write_potcar(dir, &crystal.species())
    }

    /// 按元素顺序拼接 POTCAR
    pub fn write_potcar(&self, dir: &Path, species: &[String]) -> Result<()> {
        let mut content = String::new();

        for element in species {
            let source = self
                .pp_path
                .join(&self.potcar_family)
                .join(element)
                .join("POTCAR");
            if !source.exists() {
                return Err(InelastyError::PotcarNotFound {
                    path: source.display().to_string(),
                });
            }
            let text = fs::read_to_string(&source).map_err(|e| InelastyError::read(&source, e))?;
            content.push_str(&text);
            if !text.ends_with('\n') {
                content.push('\n');
            }
        }

        let potcar = dir.join("POTCAR");
        fs::write(&potcar, content).map_err(|e| InelastyError::write(&potcar, e))
    }

    /// 在 `dir` 中同步运行 VASP，直到进程结束
    pub fn run(&self, dir: &Path) -> Result<()> {
        let mut words = self.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| InelastyError::InvalidArgument("Empty VASP command".to_string()))?;

        let stdout_path = dir.join(STDOUT_FILE);
        let stdout = File::create(&stdout_path).map_err(|e| InelastyError::write(&stdout_path, e))?;

        let status = Command::new(program)
            .args(words)
            .current_dir(dir)
            .env(PP_ENV, &self.pp_path)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => InelastyError::CommandNotFound {
                    command: program.to_string(),
                },
                _ => InelastyError::CommandFailed {
                    command: self.command.clone(),
                    stderr: e.to_string(),
                },
            })?;

        if !status.success() {
            return Err(InelastyError::CommandFailed {
                command: self.command.clone(),
                stderr: format!(
                    "exited with {} (see {})",
                    status,
                    stdout_path.display()
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SI_POSCAR: &str = "Si\n1.0\n5.4 0 0\n0 5.4 0\n0 0 5.4\nSi\n2\nDirect\n0 0 0\n0.25 0.25 0.25\n";

    fn pp_library(root: &Path, elements: &[&str]) {
        for el in elements {
            let dir = root.join("potpaw_PBE").join(el);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("POTCAR"), format!("PAW_PBE {}\nEnd of Dataset\n", el)).unwrap();
        }
    }

    #[test]
    fn test_potcar_concatenated_in_species_order() {
        let pp = tempfile::tempdir().unwrap();
        let job = tempfile::tempdir().unwrap();
        pp_library(pp.path(), &["Ti", "O"]);

        let runner = VaspRunner::new("vasp_std", pp.path().to_path_buf(), "potpaw_PBE");
        runner
            .write_potcar(job.path(), &["O".to_string(), "Ti".to_string()])
            .unwrap();

        let potcar = fs::read_to_string(job.path().join("POTCAR")).unwrap();
        let o = potcar.find("PAW_PBE O").unwrap();
        let ti = potcar.find("PAW_PBE Ti").unwrap();
        assert!(o < ti);
    }

    #[test]
    fn test_missing_potcar() {
        let pp = tempfile::tempdir().unwrap();
        let job = tempfile::tempdir().unwrap();

        let runner = VaspRunner::new("vasp_std", pp.path().to_path_buf(), "potpaw_PBE");
        let err = runner.write_potcar(job.path(), &["Xx".to_string()]).unwrap_err();
        assert!(matches!(err, InelastyError::PotcarNotFound { .. }));
    }

    /// 用 shell 脚本模拟 VASP：检查输入文件和环境变量，写出 OUTCAR
    #[cfg(unix)]
    #[test]
    fn test_single_point_with_fake_engine() {
        let pp = tempfile::tempdir().unwrap();
        let job = tempfile::tempdir().unwrap();
        pp_library(pp.path(), &["Si"]);
        fs::write(job.path().join(STRUCTURE_FILE), SI_POSCAR).unwrap();

        let fake = pp.path().join("fake_vasp.sh");
        fs::write(
            &fake,
            "test -f INCAR && test -f KPOINTS && test -f POTCAR || exit 2\n\
             test -n \"$VASP_PP_PATH\" || exit 3\n\
             echo running\n\
             echo '  energy  without entropy=      -10.80000000  energy(sigma->0) =      -10.85000000' > OUTCAR\n",
        )
        .unwrap();

        let runner = VaspRunner::new(
            format!("/bin/sh {}", fake.display()),
            pp.path().to_path_buf(),
            "potpaw_PBE",
        );
        let settings = VaspSettings::single_point_base().with_kpts([2, 2, 2]);
        let energy = runner.single_point(job.path(), &settings).unwrap();

        assert_eq!(energy, -10.85);
        let stdout = fs::read_to_string(job.path().join(STDOUT_FILE)).unwrap();
        assert_eq!(stdout.trim(), "running");
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_failure_is_reported() {
        let pp = tempfile::tempdir().unwrap();
        let job = tempfile::tempdir().unwrap();
        pp_library(pp.path(), &["Si"]);
        fs::write(job.path().join(STRUCTURE_FILE), SI_POSCAR).unwrap();

        let runner = VaspRunner::new("/bin/sh -c false", pp.path().to_path_buf(), "potpaw_PBE");
        let err = runner
            .single_point(job.path(), &VaspSettings::single_point_base())
            .unwrap_err();
        assert!(matches!(err, InelastyError::CommandFailed { .. }));
    }
}
