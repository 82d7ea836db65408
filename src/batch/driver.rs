//! # 扫描驱动
//!
//! 对每个扫描点：创建作业目录、写入结构、生成参数副本与 worker 命令、
//! 渲染脚本并提交。单点失败只记录到结果中，其余扫描点继续执行。
//!
//! ## 目录结构
//! ```text
//! <base>/sweep.json
//! <base>/<点目录>/POSCAR
//! <base>/<点目录>/submit.sbatch
//! <base>/<点目录>/job.state
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs`, `commands/phonopy.rs` 使用
//! - 使用 `batch/template.rs`, `batch/state.rs`, `batch/manifest.rs`, `utils/slurm.rs`

use crate::batch::manifest::{ManifestEntry, SweepManifest};
use crate::batch::runner::{BatchResult, SubmitOutcome};
use crate::batch::state;
use crate::batch::template::JobTemplate;
use crate::error::{InelastyError, Result};
use crate::models::{SweepKind, SweepPoint, VaspSettings};
use crate::parsers::STRUCTURE_FILE;
use crate::utils::slurm::{JobSubmitter, SubmittedJob};
use crate::utils::{output, progress};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 创建作业目录并写入结构，返回绝对路径
pub fn prepare_job_dir(dir: &Path, structure: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| InelastyError::write(dir, e))?;

    let poscar = dir.join(STRUCTURE_FILE);
    fs::write(&poscar, structure).map_err(|e| InelastyError::write(&poscar, e))?;

    dir.canonicalize().map_err(|e| InelastyError::read(dir, e))
}

/// 扫描驱动
pub struct SweepDriver<'a> {
    kind: SweepKind,
    base_dir: PathBuf,
    /// 位移扫描的目录前缀
    base_name: String,
    settings: &'a VaspSettings,
    template: &'a JobTemplate,
}

impl<'a> SweepDriver<'a> {
    pub fn new(
        kind: SweepKind,
        base_dir: impl Into<PathBuf>,
        settings: &'a VaspSettings,
        template: &'a JobTemplate,
    ) -> Self {
        SweepDriver {
            kind,
            base_dir: base_dir.into(),
            base_name: "disp".to_string(),
            settings,
            template,
        }
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    /// 扫描点的作业目录
    pub fn point_dir(&self, point: &SweepPoint) -> PathBuf {
        self.base_dir.join(point.dir_name(&self.base_name))
    }

    /// 同一次扫描中目录名必须互不相同
    fn check_unique_dirs(&self, points: &[SweepPoint]) -> Result<()> {
        let mut seen = HashSet::new();
        for point in points {
            let name = point.dir_name(&self.base_name);
            if !seen.insert(name.clone()) {
                return Err(InelastyError::InvalidArgument(format!(
                    "Sweep value {} maps to job directory '{}' more than once",
                    point.value, name
                )));
            }
        }
        Ok(())
    }

    /// 执行整个扫描
    ///
    /// `structure_for` 给出每个扫描点的结构文本。
    pub fn run<F>(
        &self,
        points: &[SweepPoint],
        structure_for: F,
        submitter: &mut dyn JobSubmitter,
    ) -> Result<BatchResult>
    where
        F: Fn(&SweepPoint) -> Result<String>,
    {
        self.check_unique_dirs(points)?;
        fs::create_dir_all(&self.base_dir).map_err(|e| InelastyError::write(&self.base_dir, e))?;

        let mut manifest = SweepManifest::new(self.kind);
        let mut result = BatchResult::default();

        let pb = progress::create_progress_bar(points.len() as u64, "Submitting");

        for point in points {
            let dir_name = point.dir_name(&self.base_name);
            let mut job_id = None;

            let outcome = match self.submit_point(point, &structure_for, submitter) {
                Ok((dir, submitted)) => {
                    if submitter.is_dry_run() {
                        SubmitOutcome::Skipped(dir_name.clone())
                    } else {
                        // 作业已进入队列，标记写入失败只警告
                        if let Err(e) = state::mark_submitted(&dir, submitted.job_id.as_deref()) {
                            pb.suspend(|| output::print_warning(&e.to_string()));
                        }
                        job_id = submitted.job_id.clone();
                        SubmitOutcome::Submitted {
                            dir: dir_name.clone(),
                            job_id: submitted.job_id,
                        }
                    }
                }
                Err(e) => {
                    let dir = self.point_dir(point);
                    if dir.is_dir() {
                        if let Err(mark_err) = state::mark_failed(&dir, &e.to_string()) {
                            pb.suspend(|| output::print_warning(&mark_err.to_string()));
                        }
                    }
                    pb.suspend(|| output::print_error(&format!("{}: {}", dir_name, e)));
                    SubmitOutcome::Failed(dir_name.clone(), e.to_string())
                }
            };

            result.merge(&outcome);
            manifest.points.push(ManifestEntry {
                dir: dir_name,
                value: point.value,
                job_id,
            });
            pb.inc(1);
        }

        pb.finish_and_clear();
        manifest.save(&self.base_dir)?;
        Ok(result)
    }

    /// 准备并提交单个扫描点，返回作业目录与提交结果
    fn submit_point<F>(
        &self,
        point: &SweepPoint,
        structure_for: &F,
        submitter: &mut dyn JobSubmitter,
    ) -> Result<(PathBuf, SubmittedJob)>
    where
        F: Fn(&SweepPoint) -> Result<String>,
    {
        let structure = structure_for(point)?;
        let dir = prepare_job_dir(&self.point_dir(point), &structure)?;

        let settings = point.value.apply(self.settings);
        let command = self.template.single_point_command(&dir, &settings)?;
        let script = self.template.render(&point.job_name(), &dir, &command);

        let submitted = submitter.submit(&script, &dir)?;
        Ok((dir, submitted))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::job::{default_encuts, enumerate_points};
    use crate::models::{JobState, SweepValue};
    use crate::utils::slurm::{write_script, DryRunSubmitter};

    /// 记录提交调用的替身
    #[derive(Default)]
    pub(crate) struct RecordingSubmitter {
        pub calls: Vec<(PathBuf, String)>,
        /// 对这些目录名返回失败
        pub fail_on: Vec<String>,
        /// 提交成功后删除这些目录
        pub remove_after: Vec<String>,
    }

    impl JobSubmitter for RecordingSubmitter {
        fn submit(&mut self, script: &str, dir: &Path) -> Result<SubmittedJob> {
            let name = dir.file_name().unwrap().to_string_lossy().to_string();
            let path = write_script(script, dir)?;
            self.calls.push((dir.to_path_buf(), script.to_string()));
            if self.fail_on.contains(&name) {
                return Err(InelastyError::SubmissionError {
                    path: path.display().to_string(),
                    code: Some(1),
                    output: "sbatch: error: invalid partition".to_string(),
                });
            }
            if self.remove_after.contains(&name) {
                fs::remove_dir_all(dir).unwrap();
            }
            Ok(SubmittedJob {
                job_id: Some(format!("{}", 1000 + self.calls.len())),
                script: path,
            })
        }
    }

    pub(crate) const SI_POSCAR: &str =
        "Si\n1.0\n5.4 0 0\n0 5.4 0\n0 0 5.4\nSi\n2\nDirect\n0 0 0\n0.25 0.25 0.25\n";

    pub(crate) fn template() -> JobTemplate {
        JobTemplate {
            walltime: "01:00:00".to_string(),
            nodes: 1,
            ntasks_per_node: 4,
            partition: None,
            activate: Vec::new(),
            worker: PathBuf::from("/usr/bin/inelasty"),
            pp_path: PathBuf::from("/opt/vasp"),
            config: None,
        }
    }

    fn encut_points(values: &[f64]) -> Vec<SweepPoint> {
        let values: Vec<SweepValue> = values.iter().map(|e| SweepValue::Encut(*e)).collect();
        enumerate_points(&values)
    }

    #[test]
    fn test_kpoint_sweep_creates_distinct_dirs() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base();
        let template = template();
        let values: Vec<SweepValue> = [[2, 2, 2], [4, 4, 4], [6, 6, 6]]
            .iter()
            .map(|k| SweepValue::Mesh(*k))
            .collect();
        let points = enumerate_points(&values);

        let driver = SweepDriver::new(SweepKind::KPoints, base.path(), &settings, &template);
        let mut submitter = RecordingSubmitter::default();
        let result = driver
            .run(&points, |_| Ok(SI_POSCAR.to_string()), &mut submitter)
            .unwrap();

        assert_eq!(result.success, 3);
        for name in ["1", "2", "3"] {
            assert!(base.path().join(name).join(STRUCTURE_FILE).exists());
        }
        assert!(submitter.calls[2].1.contains("--job-name=kpts_6"));
    }

    #[test]
    fn test_default_encut_sweep() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base();
        let template = template();
        let points = encut_points(&default_encuts());

        let driver = SweepDriver::new(SweepKind::Encut, base.path(), &settings, &template);
        let mut submitter = RecordingSubmitter::default();
        driver
            .run(&points, |_| Ok(SI_POSCAR.to_string()), &mut submitter)
            .unwrap();

        assert_eq!(submitter.calls.len(), 12);
        let dirs: HashSet<&PathBuf> = submitter.calls.iter().map(|(d, _)| d).collect();
        assert_eq!(dirs.len(), 12);

        for e in (2..=13).map(|i| i * 100) {
            let poscar = base.path().join(e.to_string()).join(STRUCTURE_FILE);
            assert_eq!(fs::read_to_string(poscar).unwrap(), SI_POSCAR);
        }
        assert!(base.path().join("sweep.json").exists());
    }

    #[test]
    fn test_duplicate_values_rejected_before_any_submission() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base();
        let template = template();
        let points = encut_points(&[300.0, 400.0, 300.0]);

        let driver = SweepDriver::new(SweepKind::Encut, base.path(), &settings, &template);
        let mut submitter = RecordingSubmitter::default();
        let err = driver
            .run(&points, |_| Ok(SI_POSCAR.to_string()), &mut submitter)
            .unwrap_err();

        assert!(matches!(err, InelastyError::InvalidArgument(_)));
        assert!(submitter.calls.is_empty());
        assert!(!base.path().join("300").exists());
    }

    #[test]
    fn test_queued_job_counts_as_submitted_when_marker_fails() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base();
        let template = template();
        let points = encut_points(&[200.0, 300.0]);

        let driver = SweepDriver::new(SweepKind::Encut, base.path(), &settings, &template);
        let mut submitter = RecordingSubmitter {
            remove_after: vec!["200".to_string()],
            ..Default::default()
        };
        let result = driver
            .run(&points, |_| Ok(SI_POSCAR.to_string()), &mut submitter)
            .unwrap();

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 0);
        let manifest = SweepManifest::load(base.path()).unwrap().unwrap();
        assert_eq!(manifest.entry("200").unwrap().job_id, Some("1001".to_string()));
    }

    #[test]
    fn test_settings_isolated_between_points() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base().with_kpts([3, 3, 3]);
        let template = template();
        let points = encut_points(&[200.0, 300.0]);

        let driver = SweepDriver::new(SweepKind::Encut, base.path(), &settings, &template);
        let mut submitter = RecordingSubmitter::default();
        driver
            .run(&points, |_| Ok(SI_POSCAR.to_string()), &mut submitter)
            .unwrap();

        let second = &submitter.calls[1].1;
        assert!(second.contains(r#""encut":300.0"#));
        assert!(!second.contains(r#""encut":200"#));
        assert_eq!(settings.encut, None);
    }

    #[test]
    fn test_failed_submission_does_not_stop_sweep() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base();
        let template = template();
        let points = encut_points(&[200.0, 300.0, 400.0]);

        let driver = SweepDriver::new(SweepKind::Encut, base.path(), &settings, &template);
        let mut submitter = RecordingSubmitter {
            fail_on: vec!["300".to_string()],
            ..Default::default()
        };
        let result = driver
            .run(&points, |_| Ok(SI_POSCAR.to_string()), &mut submitter)
            .unwrap();

        assert_eq!(submitter.calls.len(), 3);
        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.failures[0].0, "300");
        assert!(matches!(
            state::probe_state(&base.path().join("300")),
            JobState::Failed { .. }
        ));
        assert!(matches!(
            state::probe_state(&base.path().join("400")),
            JobState::Submitted { .. }
        ));
    }

    #[test]
    fn test_dry_run_writes_scripts_only() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base();
        let template = template();
        let points = encut_points(&[500.0]);

        let driver = SweepDriver::new(SweepKind::Encut, base.path(), &settings, &template);
        let result = driver
            .run(&points, |_| Ok(SI_POSCAR.to_string()), &mut DryRunSubmitter)
            .unwrap();

        assert_eq!(result.skipped, 1);
        let dir = base.path().join("500");
        assert!(dir.join("submit.sbatch").exists());
        assert_eq!(state::probe_state(&dir), JobState::Pending);
    }

    #[test]
    fn test_displacement_dir_names() {
        let base = tempfile::tempdir().unwrap();
        let settings = VaspSettings::single_point_base();
        let template = template();
        let values = vec![SweepValue::Displacement(0), SweepValue::Displacement(1)];
        let points = enumerate_points(&values);

        let driver = SweepDriver::new(SweepKind::Displacements, base.path(), &settings, &template)
            .with_base_name("Si");
        let mut submitter = RecordingSubmitter::default();
        driver
            .run(&points, |p| Ok(format!("disp {}\n", p.index)), &mut submitter)
            .unwrap();

        let text = fs::read_to_string(base.path().join("Si-1").join(STRUCTURE_FILE)).unwrap();
        assert_eq!(text, "disp 1\n");
        assert!(submitter.calls[0].1.contains("--job-name=phon_0"));
    }
}
