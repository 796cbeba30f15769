use std::path::{Path, PathBuf};

use crate::config::Schedule;
use crate::error::Result;
use crate::report::{make_filename_safe, Report};
use crate::sweep::{DatasetResult, Measurement, ScheduleResult};

mod plotters_backend;

pub use self::plotters_backend::PlottersBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    Runtime,
    Speedup,
}
impl Figure {
    fn as_str(self) -> &'static str {
        match self {
            Figure::Runtime => "runtime",
            Figure::Speedup => "speedup",
        }
    }
}

/// `<title>_<figure>_(<kind>,<chunk>).svg`, dropping the schedule part when there is none.
pub fn figure_file_name(title: &str, figure: Figure, schedule: Option<&Schedule>) -> String {
    let title = make_filename_safe(title);
    match schedule {
        Some(schedule) => format!("{}_{}_({}).svg", title, figure.as_str(), schedule),
        None => format!("{}_{}.svg", title, figure.as_str()),
    }
}

#[derive(Clone, Copy)]
pub struct PlotContext<'a> {
    pub title: &'a str,
    pub path: &'a Path,
}

#[derive(Clone, Copy)]
pub struct PlotData<'a> {
    pub serial: &'a Measurement,
    pub result: &'a ScheduleResult,
}

pub trait Plotter {
    /// Mean runtime against thread count, with the serial mean as a reference line.
    fn runtime(&mut self, ctx: PlotContext<'_>, data: PlotData<'_>) -> Result<()>;

    /// Speedup over the serial mean against thread count.
    fn speedup(&mut self, ctx: PlotContext<'_>, data: PlotData<'_>) -> Result<()>;
}

/// Draws the runtime and speedup figures of every schedule of a dataset into `output_directory`.
pub fn render_dataset(
    plotter: &mut dyn Plotter,
    report: &dyn Report,
    output_directory: &Path,
    result: &DatasetResult,
) -> Result<Vec<PathBuf>> {
    let title = result.dataset.title.as_str();
    let mut written = Vec::with_capacity(2 * result.schedules.len());

    for schedule_result in &result.schedules {
        let data = PlotData {
            serial: &result.serial,
            result: schedule_result,
        };
        for &figure in &[Figure::Runtime, Figure::Speedup] {
            let path = output_directory.join(figure_file_name(
                title,
                figure,
                schedule_result.schedule.as_ref(),
            ));
            report.saving_start(&path);
            let ctx = PlotContext { title, path: &path };
            match figure {
                Figure::Runtime => plotter.runtime(ctx, data),
                Figure::Speedup => plotter.speedup(ctx, data),
            }
            .map_err(|e| {
                report.run_failed();
                e
            })?;
            report.saving_complete(&path);
            written.push(path);
        }
    }

    Ok(written)
}
