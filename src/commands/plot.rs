//! # plot 命令实现
//!
//! - `relax`: 读取某阶段的 OUTCAR，统计每个离子步的电子步数与末态 TOTEN，
//!   打印表格并绘制能量曲线
//!
//! ## 依赖关系
//! - 使用 `cli/harvest.rs` 定义的参数
//! - 使用 `parsers/outcar.rs`, `utils/plot.rs`

use crate::cli::harvest::{PlotArgs, PlotCommands, PlotRelaxArgs};
use crate::error::{InelastyError, Result};
use crate::parsers::outcar::{self, IonicStep};
use crate::utils::{output, plot};

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct StepRow {
    #[tabled(rename = "Ionic Step")]
    ionic_step: usize,
    #[tabled(rename = "Electronic Steps")]
    electronic_steps: usize,
    #[tabled(rename = "Total Energy (eV)")]
    energy: String,
}

impl From<&IonicStep> for StepRow {
    fn from(step: &IonicStep) -> Self {
        StepRow {
            ionic_step: step.ionic_step,
            electronic_steps: step.electronic_steps,
            energy: format!("{:.6}", step.toten_ev),
        }
    }
}

/// 执行 plot 命令
pub fn execute(args: PlotArgs) -> Result<()> {
    match args.command {
        PlotCommands::Relax(relax_args) => relax(relax_args),
    }
}

fn relax(args: PlotRelaxArgs) -> Result<()> {
    output::print_header(&format!("Stage {} Geometry Relaxation", args.stage));

    let stage_dir = args.geom_dir.join(format!("stage_{}", args.stage));
    if !stage_dir.is_dir() {
        return Err(InelastyError::DirectoryNotFound {
            path: stage_dir.display().to_string(),
        });
    }

    let steps = outcar::parse_relaxation(&stage_dir.join("OUTCAR"))?;

    let rows: Vec<StepRow> = steps.iter().map(StepRow::from).collect();
    println!("{}", Table::new(&rows));

    if let (Some(first), Some(last)) = (steps.first(), steps.last()) {
        output::print_info(&format!(
            "{} ionic step(s), ΔE = {:.6} eV",
            steps.len(),
            last.toten_ev - first.toten_ev
        ));
    }

    let plot_path = match args.output {
        Some(ref name) => stage_dir.join(name),
        None => stage_dir.join(format!("stage_{}_geom_relaxation.png", args.stage)),
    };
    plot::plot_relaxation(&steps, args.stage, &plot_path)?;
    output::print_success(&format!("Plot saved to '{}'", plot_path.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(PlotArgs {
            command: PlotCommands::Relax(PlotRelaxArgs {
                geom_dir: dir.path().to_path_buf(),
                stage: 2,
                output: None,
            }),
        })
        .unwrap_err();
        assert!(matches!(err, InelastyError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_step_row() {
        let row = StepRow::from(&IonicStep {
            ionic_step: 3,
            electronic_steps: 12,
            toten_ev: -10.1234567,
        });
        assert_eq!(row.energy, "-10.123457");
    }
}
