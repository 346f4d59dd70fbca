//! Rate-distortion curve rendering.

use std::path::Path;

use plotters::prelude::*;

use super::{RateDistortionPoint, ReportError, ReportResult};

/// Render one signal's rate-distortion plot as a PNG.
///
/// The reference curve is drawn in blue, the curve under test in red,
/// both with point markers so single-point curves stay visible.
pub fn plot_rd_curve(
    path: &Path,
    title: &str,
    reference: &[RateDistortionPoint],
    test: &[RateDistortionPoint],
) -> ReportResult<()> {
    let (x_range, y_range) = axis_ranges(reference, test);

    let root = BitMapBackend::new(path, (1280, 960)).into_drawing_area();
    root.fill(&WHITE).map_err(to_plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .map_err(to_plot_err)?;

    chart
        .configure_mesh()
        .x_desc("bitrate (kbps)")
        .y_desc("PSNR (dB)")
        .draw()
        .map_err(to_plot_err)?;

    chart
        .draw_series(LineSeries::new(points(reference), &BLUE))
        .map_err(to_plot_err)?
        .label("reference")
        .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], &BLUE));
    chart
        .draw_series(
            reference
                .iter()
                .map(|p| Circle::new((p.bitrate_kbps, p.psnr_db), 3, BLUE.filled())),
        )
        .map_err(to_plot_err)?;

    chart
        .draw_series(LineSeries::new(points(test), &RED))
        .map_err(to_plot_err)?
        .label("test")
        .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], &RED));
    chart
        .draw_series(
            test.iter()
                .map(|p| Circle::new((p.bitrate_kbps, p.psnr_db), 3, RED.filled())),
        )
        .map_err(to_plot_err)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(to_plot_err)?;

    root.present().map_err(to_plot_err)?;
    Ok(())
}

fn points(curve: &[RateDistortionPoint]) -> impl Iterator<Item = (f64, f64)> + '_ {
    curve.iter().map(|p| (p.bitrate_kbps, p.psnr_db))
}

/// Axis ranges spanning both curves, widened so flat or single-point
/// curves never produce a zero-width axis.
fn axis_ranges(
    reference: &[RateDistortionPoint],
    test: &[RateDistortionPoint],
) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for p in reference.iter().chain(test) {
        x_min = x_min.min(p.bitrate_kbps);
        x_max = x_max.max(p.bitrate_kbps);
        y_min = y_min.min(p.psnr_db);
        y_max = y_max.max(p.psnr_db);
    }

    if !x_min.is_finite() {
        return (0.0..1.0, 0.0..1.0);
    }

    let x_pad = ((x_max - x_min) * 0.05).max(0.5);
    let y_pad = ((y_max - y_min) * 0.05).max(0.5);
    (
        (x_min - x_pad)..(x_max + x_pad),
        (y_min - y_pad)..(y_max + y_pad),
    )
}

fn to_plot_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Plot(err.to_string())
}
