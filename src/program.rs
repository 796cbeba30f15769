use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::{Dataset, Schedule, SCHEDULE_ENV_VAR};
use crate::error::{Error, Result};

/// One launch of the external program.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub input: PathBuf,
    pub source: String,
    /// `None` selects the serial code path of the program.
    pub threads: Option<usize>,
    pub schedule: Option<Schedule>,
}
impl Invocation {
    pub fn serial(program: &Path, dataset: &Dataset) -> Invocation {
        Invocation {
            program: program.to_owned(),
            input: dataset.input.clone(),
            source: dataset.source.clone(),
            threads: None,
            schedule: None,
        }
    }

    pub fn parallel(
        program: &Path,
        dataset: &Dataset,
        threads: usize,
        schedule: Option<Schedule>,
    ) -> Invocation {
        Invocation {
            threads: Some(threads),
            schedule,
            ..Invocation::serial(program, dataset)
        }
    }

    /// `-f <input> -s <source> [-p <threads>]`
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            self.input.clone().into_os_string(),
            "-s".into(),
            self.source.clone().into(),
        ];
        if let Some(threads) = self.threads {
            args.push("-p".into());
            args.push(threads.to_string().into());
        }
        args
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args());
        if let Some(schedule) = self.schedule {
            cmd.env(SCHEDULE_ENV_VAR, schedule.env_value());
        }
        cmd
    }

    /// Shell-like rendering for messages.
    pub fn display(&self) -> String {
        let mut s = String::new();
        if let Some(schedule) = self.schedule {
            s.push_str(&format!("{}={} ", SCHEDULE_ENV_VAR, schedule));
        }
        s.push_str(&self.program.display().to_string());
        for arg in self.args() {
            s.push(' ');
            s.push_str(&arg.to_string_lossy());
        }
        s
    }
}

/// Runs an invocation to completion and hands back what it printed on stdout.
pub trait Runner {
    fn run(&mut self, invocation: &Invocation) -> Result<String>;
}

/// Runs the real external program, blocking until it exits.
#[derive(Debug, Default)]
pub struct ProcessRunner;
impl Runner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<String> {
        let mut cmd = invocation.command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!("spawning `{}`", invocation.display());
        let output = cmd.output().map_err(|inner| Error::SpawnError {
            program: invocation.program.clone(),
            inner,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("stdout of `{}`:\n{}", invocation.display(), stdout);
        if !output.status.success() {
            return Err(Error::ExitStatus {
                command: invocation.display(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(stdout)
    }
}
