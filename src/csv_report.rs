use crate::error::Result;
use crate::sweep::{DatasetResult, Measurement};
use csv::Writer;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct CsvRow<'a> {
    dataset: &'a str,
    schedule: Option<String>,
    threads: Option<usize>,
    run: usize,
    runtime_ns: f64,
}

struct CsvReportWriter<W: Write> {
    writer: Writer<W>,
}
impl<W: Write> CsvReportWriter<W> {
    fn write_measurement(
        &mut self,
        dataset: &str,
        schedule: Option<String>,
        threads: Option<usize>,
        measurement: &Measurement,
    ) -> Result<()> {
        for (run, &runtime_ns) in measurement.runs.iter().enumerate() {
            let row = CsvRow {
                dataset,
                schedule: schedule.clone(),
                threads,
                run: run + 1,
                runtime_ns,
            };
            self.writer.serialize(row)?;
        }
        Ok(())
    }

    fn write_data(&mut self, result: &DatasetResult) -> Result<()> {
        let dataset = result.dataset.title.as_str();
        self.write_measurement(dataset, None, None, &result.serial)?;
        for schedule_result in &result.schedules {
            let schedule = schedule_result.schedule.map(|s| s.to_string());
            for point in &schedule_result.points {
                self.write_measurement(
                    dataset,
                    schedule.clone(),
                    Some(point.threads),
                    &point.runtime,
                )?;
            }
        }
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Writes every individual run of a dataset as one CSV row.
pub struct FileCsvReport;
impl FileCsvReport {
    pub fn write_file(&self, path: &Path, result: &DatasetResult) -> Result<()> {
        let writer = Writer::from_path(path)?;
        let mut writer = CsvReportWriter { writer };
        writer.write_data(result)?;
        Ok(())
    }
}
