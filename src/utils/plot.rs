//! # 图表生成
//!
//! 使用 `plotters` 绘制收敛曲线和几何弛豫能量曲线。
//! 输出格式由扩展名决定：`.svg` 使用 SVGBackend，其余使用 BitMapBackend。
//!
//! ## 依赖关系
//! - 被 `commands/harvest.rs`, `commands/plot.rs` 调用
//! - 使用 `parsers/outcar.rs` 的 IonicStep
//! - 使用 `plotters` 渲染图表

use crate::error::{InelastyError, Result};
use crate::parsers::outcar::IonicStep;

use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

fn plot_err<E: std::fmt::Debug>(e: E) -> InelastyError {
    InelastyError::Other(format!("Plotting failed: {:?}", e))
}

/// 带 10% 余量的坐标范围
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let margin = if max > min { (max - min) * 0.1 } else { 0.5 };
    (min - margin, max + margin)
}

/// 电子步数对应的颜色，蓝（少）到红（多）
fn step_color(steps: usize, min: usize, max: usize) -> RGBColor {
    let t = if max > min {
        (steps - min) as f64 / (max - min) as f64
    } else {
        0.5
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(59.0, 180.0), lerp(76.0, 4.0), lerp(192.0, 38.0))
}

/// 收敛曲线：能量随扫描参数变化
pub fn plot_convergence(
    points: &[(f64, f64)],
    title: &str,
    x_desc: &str,
    output_path: &Path,
) -> Result<()> {
    if points.is_empty() {
        return Err(InelastyError::Other("No data to plot".to_string()));
    }

    if is_svg(output_path) {
        let root = SVGBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_convergence(&root, points, title, x_desc)?;
        root.present().map_err(plot_err)?;
    } else {
        let root = BitMapBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_convergence(&root, points, title, x_desc)?;
        root.present().map_err(plot_err)?;
    }
    Ok(())
}

fn draw_convergence<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[(f64, f64)],
    title: &str,
    x_desc: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_min, x_max) = padded_range(points.iter().map(|(x, _)| *x));
    let (y_min, y_max) = padded_range(points.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Total Energy (eV)")
        .y_label_formatter(&|y| format!("{:.3}", y))
        .draw()
        .map_err(plot_err)?;

    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            line_color.stroke_width(2),
        ))
        .map_err(plot_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 5, line_color.filled())),
        )
        .map_err(plot_err)?;

    Ok(())
}

/// 几何弛豫曲线：每个离子步的末态能量，点颜色表示电子步数
pub fn plot_relaxation(steps: &[IonicStep], stage: u32, output_path: &Path) -> Result<()> {
    if steps.is_empty() {
        return Err(InelastyError::Other("No ionic steps to plot".to_string()));
    }

    if is_svg(output_path) {
        let root = SVGBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_relaxation(&root, steps, stage)?;
        root.present().map_err(plot_err)?;
    } else {
        let root = BitMapBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_relaxation(&root, steps, stage)?;
        root.present().map_err(plot_err)?;
    }
    Ok(())
}

fn draw_relaxation<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    steps: &[IonicStep],
    stage: u32,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_min, x_max) = padded_range(steps.iter().map(|s| s.ionic_step as f64));
    let (y_min, y_max) = padded_range(steps.iter().map(|s| s.toten_ev));
    let min_e = steps.iter().map(|s| s.electronic_steps).min().unwrap_or(0);
    let max_e = steps.iter().map(|s| s.electronic_steps).max().unwrap_or(0);

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Total Energy vs Ionic Step for Stage {} Geometry Optimisation", stage),
            ("sans-serif", 20),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Ionic Step")
        .y_desc("Total Energy (eV)")
        .y_label_formatter(&|y| format!("{:.3}", y))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            steps.iter().map(|s| (s.ionic_step as f64, s.toten_ev)),
            RGBColor(128, 128, 128).stroke_width(1),
        ))
        .map_err(plot_err)?;

    chart
        .draw_series(steps.iter().map(|s| {
            let color = step_color(s.electronic_steps, min_e, max_e);
            Circle::new((s.ionic_step as f64, s.toten_ev), 6, color.filled())
        }))
        .map_err(plot_err)?
        .label(format!("Electronic steps {}..{}", min_e, max_e))
        .legend(|(x, y)| Circle::new((x + 10, y), 5, step_color(0, 0, 0).filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range([1.0, 3.0].into_iter());
        assert!((lo - 0.8).abs() < 1e-12);
        assert!((hi - 3.2).abs() < 1e-12);
        assert_eq!(padded_range([2.0].into_iter()), (1.5, 2.5));
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn test_step_color_endpoints() {
        assert_eq!(step_color(5, 5, 20), RGBColor(59, 76, 192));
        assert_eq!(step_color(20, 5, 20), RGBColor(180, 4, 38));
    }

    #[test]
    fn test_svg_detection() {
        assert!(is_svg(Path::new("out/encut_convergence.SVG")));
        assert!(!is_svg(Path::new("out/encut_convergence.png")));
    }

    #[test]
    fn test_empty_data_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.png");
        assert!(plot_convergence(&[], "t", "x", &out).is_err());
        assert!(!out.exists());
    }
}
