//! The measurement loop: serial baseline first, then every schedule and thread count.

use crate::config::{Dataset, Schedule, SweepConfig};
use crate::error::{Error, Result};
use crate::extract;
use crate::program::{Invocation, Runner};
use crate::report::Report;
use crate::stats::{self, Sample};

/// Repeated runtimes of one configuration, in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub runs: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
}
impl Measurement {
    /// # Panics
    ///
    /// Panics if `runs` is empty or contains a `NaN`.
    pub fn from_runs(runs: Vec<f64>) -> Measurement {
        let sample = Sample::new(&runs);
        let mean = sample.mean();
        let std_dev = sample.std_dev(Some(mean));
        Measurement { runs, mean, std_dev }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadPoint {
    pub threads: usize,
    pub runtime: Measurement,
    pub speedup: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub schedule: Option<Schedule>,
    pub points: Vec<ThreadPoint>,
}
impl ScheduleResult {
    pub fn threads(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.threads as f64).collect()
    }

    pub fn runtimes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.runtime.mean).collect()
    }

    pub fn speedups(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.speedup).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetResult {
    pub dataset: Dataset,
    pub serial: Measurement,
    pub schedules: Vec<ScheduleResult>,
}

fn measure(
    runner: &mut dyn Runner,
    report: &dyn Report,
    invocation: &Invocation,
    repetitions: usize,
) -> Result<Measurement> {
    let mut runs = Vec::with_capacity(repetitions);
    for _ in 0..repetitions {
        let ns = runner
            .run(invocation)
            .and_then(|output| {
                if let (Some(requested), Some(actual)) =
                    (invocation.threads, extract::reported_threads(&output))
                {
                    if requested != actual {
                        warn!(
                            "`{}` asked for {} threads but the program reported {}",
                            invocation.display(),
                            requested,
                            actual
                        );
                    }
                }
                extract::runtime_ns(&output)
            })
            .map_err(|e| {
                report.run_failed();
                e
            })?;
        debug!("`{}`: {} ns", invocation.display(), ns);
        runs.push(ns);
    }
    Ok(Measurement::from_runs(runs))
}

/// Measures one dataset under every configured schedule and thread count.
///
/// The serial baseline does not depend on `OMP_SCHEDULE`, so it is measured once and shared by
/// all schedules. The first failing run aborts the whole dataset.
pub fn measure_dataset(
    config: &SweepConfig,
    dataset: &Dataset,
    runner: &mut dyn Runner,
    report: &dyn Report,
) -> Result<DatasetResult> {
    let program = config.program.as_path();
    report.dataset_start(program, dataset, &config.threads);

    report.serial_start(program, dataset);
    let serial = measure(
        runner,
        report,
        &Invocation::serial(program, dataset),
        config.repetitions,
    )?;
    report.serial_complete(dataset, &serial);

    let mut schedules = Vec::new();
    for schedule in config.schedule_slots() {
        let mut points = Vec::with_capacity(config.threads.len());
        for &threads in &config.threads {
            report.point_start(program, dataset, threads, schedule.as_ref());
            let invocation = Invocation::parallel(program, dataset, threads, schedule);
            let runtime = measure(runner, report, &invocation, config.repetitions)?;
            if runtime.mean <= 0.0 {
                report.run_failed();
                return Err(Error::ZeroRuntime {
                    command: invocation.display(),
                });
            }
            let point = ThreadPoint {
                threads,
                speedup: stats::speedup(serial.mean, runtime.mean),
                runtime,
            };
            report.point_complete(dataset, &point);
            points.push(point);
        }
        schedules.push(ScheduleResult { schedule, points });
    }

    Ok(DatasetResult {
        dataset: dataset.clone(),
        serial,
        schedules,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::ScheduleKind;
    use crate::report::NoReport;
    use approx::assert_relative_eq;

    /// Pretends the program scales perfectly: runtime = 1000 / threads.
    struct PerfectScaling {
        invocations: Vec<Invocation>,
    }
    impl Runner for PerfectScaling {
        fn run(&mut self, invocation: &Invocation) -> Result<String> {
            self.invocations.push(invocation.clone());
            let ns = 1000 / invocation.threads.unwrap_or(1);
            Ok(format!("elapsed process CPU time = {} nanoseconds\n", ns))
        }
    }

    struct Garbage;
    impl Runner for Garbage {
        fn run(&mut self, _: &Invocation) -> Result<String> {
            Ok("Segmentation fault\n".to_owned())
        }
    }

    fn config() -> SweepConfig {
        let mut config = SweepConfig::new("./bellman-ford");
        config.datasets.push(Dataset::new("/tmp/rmat15.dimacs", "1", None));
        config.threads = vec![1, 2, 4];
        config.repetitions = 3;
        config.schedules = vec![
            Schedule::new(ScheduleKind::Static, Some(8)),
            Schedule::new(ScheduleKind::Dynamic, Some(32)),
        ];
        config
    }

    #[test]
    fn measures_serial_once_then_every_schedule_and_thread_count() {
        let config = config();
        let mut runner = PerfectScaling {
            invocations: vec![],
        };
        let result =
            measure_dataset(&config, &config.datasets[0], &mut runner, &NoReport).unwrap();

        // 3 serial runs + 2 schedules * 3 thread counts * 3 runs
        assert_eq!(runner.invocations.len(), 3 + 2 * 3 * 3);
        assert!(runner.invocations[..3].iter().all(|i| i.threads.is_none()));
        assert!(runner.invocations[..3].iter().all(|i| i.schedule.is_none()));

        assert_relative_eq!(result.serial.mean, 1000.0);
        assert_eq!(result.schedules.len(), 2);
        for schedule in &result.schedules {
            assert_eq!(schedule.threads(), vec![1.0, 2.0, 4.0]);
            assert_eq!(schedule.runtimes(), vec![1000.0, 500.0, 250.0]);
            assert_eq!(schedule.speedups(), vec![1.0, 2.0, 4.0]);
        }
        assert_eq!(
            result.schedules[1].schedule,
            Some(Schedule::new(ScheduleKind::Dynamic, Some(32)))
        );
    }

    #[test]
    fn no_schedule_runs_each_thread_count_once() {
        let mut config = config();
        config.schedules.clear();
        let mut runner = PerfectScaling {
            invocations: vec![],
        };
        let result =
            measure_dataset(&config, &config.datasets[0], &mut runner, &NoReport).unwrap();
        assert_eq!(result.schedules.len(), 1);
        assert_eq!(result.schedules[0].schedule, None);
        assert!(runner.invocations.iter().all(|i| i.schedule.is_none()));
    }

    #[test]
    fn unparsable_output_aborts_the_sweep() {
        let config = config();
        match measure_dataset(&config, &config.datasets[0], &mut Garbage, &NoReport) {
            Err(Error::MissingRuntime { output }) => assert!(output.contains("Segmentation")),
            other => panic!("expected MissingRuntime, got {:?}", other),
        }
    }

    /// Reports 0 ns for every parallel run, like a program whose timer truncates.
    struct InstantParallel;
    impl Runner for InstantParallel {
        fn run(&mut self, invocation: &Invocation) -> Result<String> {
            let ns = if invocation.threads.is_some() { 0 } else { 1000 };
            Ok(format!("elapsed process CPU time = {} nanoseconds\n", ns))
        }
    }

    #[test]
    fn zero_parallel_runtime_aborts_the_sweep() {
        let config = config();
        match measure_dataset(&config, &config.datasets[0], &mut InstantParallel, &NoReport) {
            Err(Error::ZeroRuntime { command }) => {
                assert!(command.contains("-p 1"));
                assert!(command.contains("OMP_SCHEDULE=static,8"));
            }
            other => panic!("expected ZeroRuntime, got {:?}", other),
        }
    }

    #[test]
    fn measurement_statistics() {
        let m = Measurement::from_runs(vec![90.0, 100.0, 110.0]);
        assert_relative_eq!(m.mean, 100.0);
        assert_relative_eq!(m.std_dev, 10.0);
    }
}
