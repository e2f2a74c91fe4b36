//! PNG rendering of an example resonance trajectory.
//!
//! Kept apart from the numeric core: callers render only after the report
//! is final, and a failed render never changes the numbers.

use crate::resonance::ResonanceRun;
use lenr_types::constants::{PhysicalConstants, M_TO_ANGSTROM, S_TO_PS};
use lenr_types::error::{LenrError, LenrResult};
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

/// D1 and D2 positions (Å) against time (ps).
pub struct TrajectorySeries {
    pub time_ps: Vec<f64>,
    pub d1_angstrom: Vec<f64>,
    pub d2_angstrom: Vec<f64>,
}

impl TrajectorySeries {
    pub fn from_run(run: &ResonanceRun, constants: &PhysicalConstants) -> Self {
        let to_ps = S_TO_PS / constants.omega_0;
        let to_angstrom = constants.x_0 * M_TO_ANGSTROM;
        let traj = &run.trajectory;
        TrajectorySeries {
            time_ps: traj.tau.iter().map(|t| t * to_ps).collect(),
            d1_angstrom: traj.x1().iter().map(|x| x * to_angstrom).collect(),
            d2_angstrom: traj.x2().iter().map(|x| x * to_angstrom).collect(),
        }
    }

    fn y_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .d1_angstrom
            .iter()
            .chain(self.d2_angstrom.iter())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let pad = ((hi - lo) * 0.05).max(1e-3);
        (lo - pad, hi + pad)
    }
}

/// Line style shared by a series and its legend swatch.
pub fn series_style(color: &RGBColor) -> ShapeStyle {
    color.stroke_width(2)
}

pub fn plot_title(run: &ResonanceRun) -> String {
    format!(
        "Resonance Trajectory (detune={:.2}, boost={:.1e})",
        run.params.detune, run.result.rate_boost
    )
}

fn draw(
    series: &TrajectorySeries,
    title: &str,
    path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let t_end = series.time_ps.last().copied().unwrap_or(0.0).max(f64::EPSILON);
    let (y_lo, y_hi) = series.y_range();

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..t_end, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Time (ps)")
        .y_desc("Position deviation (Å)")
        .draw()?;

    let d1 = series
        .time_ps
        .iter()
        .copied()
        .zip(series.d1_angstrom.iter().copied());
    let d1_style = series_style(&BLUE);
    chart
        .draw_series(LineSeries::new(d1, d1_style))?
        .label("D1 position (Å)")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], d1_style));

    let d2 = series
        .time_ps
        .iter()
        .copied()
        .zip(series.d2_angstrom.iter().copied());
    let d2_style = series_style(&RED);
    chart
        .draw_series(LineSeries::new(d2, d2_style))?
        .label("D2 position (Å)")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], d2_style));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Draw the run into a PNG at `path`. Every backend failure becomes
/// `ArtifactWrite`.
pub fn render_trajectory(
    run: &ResonanceRun,
    constants: &PhysicalConstants,
    path: &Path,
    width: u32,
    height: u32,
) -> LenrResult<()> {
    let artifact_err = |message: String| LenrError::ArtifactWrite {
        path: path.display().to_string(),
        message,
    };
    if run.trajectory.is_empty() {
        return Err(artifact_err("trajectory has no samples".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(artifact_err(format!("invalid image size {width}x{height}")));
    }

    let series = TrajectorySeries::from_run(run, constants);
    draw(&series, &plot_title(run), path, (width, height))
        .map_err(|e| artifact_err(e.to_string()))?;
    log::info!("trajectory plot written to {}", path.display());
    Ok(())
}
