//! # harvest 命令实现
//!
//! 收集收敛扫描的能量，输出终端表格、CSV 和收敛曲线。
//!
//! ## 输出
//! ```text
//! <base>/<kind>_convergence.csv
//! <base>/<kind>_convergence.png
//! ```
//!
//! ## 依赖关系
//! - 使用 `cli/harvest.rs` 定义的参数
//! - 使用 `batch/harvest.rs`, `utils/plot.rs`, `utils/output.rs`

use crate::batch::{harvest, Harvest, MissingPolicy};
use crate::cli::harvest::{HarvestArgs, HarvestKind};
use crate::error::{InelastyError, Result};
use crate::utils::{output, plot, progress};

use std::path::Path;
use tabled::{Table, Tabled};

/// 结果行
#[derive(Debug, Clone, Tabled)]
struct HarvestRow {
    #[tabled(rename = "Dir")]
    dir: i64,
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "Energy (eV)")]
    energy: String,
    #[tabled(rename = "ΔE vs last (meV)")]
    delta: String,
}

impl HarvestKind {
    fn x_desc(&self) -> &'static str {
        match self {
            HarvestKind::Kpoints => "K-points index",
            HarvestKind::Encut => "ENCUT value (eV)",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            HarvestKind::Kpoints => "Energy vs K-points",
            HarvestKind::Encut => "Energy vs ENCUT",
        }
    }
}

/// 执行 harvest 命令
pub fn execute(args: HarvestArgs) -> Result<()> {
    output::print_header(&format!("Harvesting {} Sweep", args.kind));

    let policy = if args.skip_missing {
        MissingPolicy::Skip
    } else {
        MissingPolicy::Abort
    };

    let spinner = progress::create_spinner("Reading energy records");
    let collected = harvest(&args.base_dir, policy);
    spinner.finish_and_clear();
    let data = collected?;

    for (parameter, reason) in &data.skipped {
        output::print_warning(&format!("Skipping {}: {}", parameter, reason));
    }
    if data.is_empty() {
        return Err(InelastyError::Other(format!(
            "No energy records found under '{}'",
            args.base_dir.display()
        )));
    }

    println!("{}", Table::new(rows(&data)));

    let csv_path = args.base_dir.join(format!("{}_convergence.csv", args.kind));
    save_csv(&data, &csv_path)?;
    output::print_success(&format!("Table saved to '{}'", csv_path.display()));

    if !args.no_plot {
        let plot_path = match args.plot {
            Some(ref name) => args.base_dir.join(name),
            None => args.base_dir.join(format!("{}_convergence.png", args.kind)),
        };
        let points: Vec<(f64, f64)> = data
            .parameters
            .iter()
            .zip(&data.energies)
            .map(|(p, e)| (*p as f64, *e))
            .collect();
        plot::plot_convergence(&points, args.kind.title(), args.kind.x_desc(), &plot_path)?;
        output::print_success(&format!("Plot saved to '{}'", plot_path.display()));
    }

    Ok(())
}

/// 表格行，ΔE 相对最后一个（最收敛的）点
fn rows(data: &Harvest) -> Vec<HarvestRow> {
    let reference = data.energies.last().copied().unwrap_or(0.0);
    data.parameters
        .iter()
        .zip(&data.labels)
        .zip(&data.energies)
        .map(|((dir, label), energy)| HarvestRow {
            dir: *dir,
            parameter: label.clone(),
            energy: format!("{:.6}", energy),
            delta: format!("{:.3}", (energy - reference) * 1000.0),
        })
        .collect()
}

/// 保存为 CSV
fn save_csv(data: &Harvest, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["parameter", "label", "energy_eV"])?;
    for ((parameter, label), energy) in data.parameters.iter().zip(&data.labels).zip(&data.energies)
    {
        wtr.write_record(&[parameter.to_string(), label.clone(), format!("{:.10}", energy)])?;
    }

    wtr.flush().map_err(|e| InelastyError::write(output_path, e))?;
    Ok(())
}
