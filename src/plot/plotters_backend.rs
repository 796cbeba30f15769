use std::error::Error as StdError;
use std::ops::Range;
use std::path::Path;

use plotters::data::float::pretty_print_float;
use plotters::prelude::*;

use super::{PlotContext, PlotData, Plotter};
use crate::error::{Error, Result};

static DEFAULT_FONT: FontFamily = FontFamily::SansSerif;
static SIZE: (u32, u32) = (960, 540);
static POINT_SIZE: u32 = 3;

const DARK_BLUE: RGBColor = RGBColor(31, 120, 180);
const DARK_RED: RGBColor = RGBColor(227, 26, 28);

type DrawResult = ::std::result::Result<(), Box<dyn StdError>>;

fn wrap_error(path: &Path, result: DrawResult) -> Result<()> {
    result.map_err(|e| Error::PlotError {
        path: path.to_owned(),
        message: e.to_string(),
    })
}

/// Pads the thread axis so that the outermost points do not sit on the frame.
fn thread_range(threads: &[f64]) -> Range<f64> {
    let min = threads.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = threads.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = f64::max(0.5, (max - min) * 0.05);
    (min - pad)..(max + pad)
}

/// From zero to a little above the largest value.
fn value_range<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> Range<f64> {
    let max = values
        .into_iter()
        .cloned()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    let top = if max > 0.0 { max * 1.1 } else { 1.0 };
    0.0..top
}

#[derive(Default)]
pub struct PlottersBackend;

impl PlottersBackend {
    fn runtime_figure(ctx: PlotContext<'_>, data: PlotData<'_>) -> DrawResult {
        let threads = data.result.threads();
        let runtimes = data.result.runtimes();
        let serial = data.serial.mean;

        let x_range = thread_range(&threads);
        let y_range = value_range(runtimes.iter().chain(Some(&serial)));

        let root_area = SVGBackend::new(ctx.path, SIZE).into_drawing_area();
        root_area.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root_area)
            .caption(ctx.title, (DEFAULT_FONT, 20))
            .margin((5).percent())
            .set_label_area_size(LabelAreaPosition::Left, (5).percent_width().min(80))
            .set_label_area_size(LabelAreaPosition::Bottom, (5).percent_height().min(40))
            .build_cartesian_2d(x_range.clone(), y_range)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("number of threads")
            .y_desc("runtime (nanoseconds)")
            .x_label_formatter(&|&x| pretty_print_float(x, false))
            .y_label_formatter(&|&y| pretty_print_float(y, true))
            .draw()?;

        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_range.start, serial), (x_range.end, serial)],
                DARK_RED.stroke_width(2),
            )))?
            .label("serial")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DARK_RED.stroke_width(2)));

        chart.draw_series(
            LineSeries::new(
                threads.iter().cloned().zip(runtimes.iter().cloned()),
                DARK_BLUE.filled(),
            )
            .point_size(POINT_SIZE),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root_area.present()?;
        Ok(())
    }

    fn speedup_figure(ctx: PlotContext<'_>, data: PlotData<'_>) -> DrawResult {
        let threads = data.result.threads();
        let speedups = data.result.speedups();

        let x_range = thread_range(&threads);
        let y_range = value_range(speedups.iter());

        let root_area = SVGBackend::new(ctx.path, SIZE).into_drawing_area();
        root_area.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root_area)
            .caption(ctx.title, (DEFAULT_FONT, 20))
            .margin((5).percent())
            .set_label_area_size(LabelAreaPosition::Left, (5).percent_width().min(60))
            .set_label_area_size(LabelAreaPosition::Bottom, (5).percent_height().min(40))
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("number of threads")
            .y_desc("speedup")
            .x_label_formatter(&|&x| pretty_print_float(x, false))
            .draw()?;

        chart.draw_series(
            LineSeries::new(
                threads.iter().cloned().zip(speedups.iter().cloned()),
                DARK_BLUE.filled(),
            )
            .point_size(POINT_SIZE),
        )?;

        root_area.present()?;
        Ok(())
    }
}

impl Plotter for PlottersBackend {
    fn runtime(&mut self, ctx: PlotContext<'_>, data: PlotData<'_>) -> Result<()> {
        wrap_error(ctx.path, Self::runtime_figure(ctx, data))
    }

    fn speedup(&mut self, ctx: PlotContext<'_>, data: PlotData<'_>) -> Result<()> {
        wrap_error(ctx.path, Self::speedup_figure(ctx, data))
    }
}
