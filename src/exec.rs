use crate::errors::Error;
use eyre::eyre;
use std::{
    io::{self, Write},
    process::{Command, ExitStatus, Stdio},
};
use tracing::{debug, info, instrument};

/// Runs external commands
///
/// Implementations must run the command to completion and only succeed if it exited
/// successfully.
pub trait Runner {
    /// Run the command, returning its trimmed stdout
    fn run(&mut self, command: &mut Command) -> Result<String, Error>;

    /// Run the command with its output going straight to the terminal
    fn run_inherited(&mut self, command: &mut Command) -> Result<(), Error> {
        self.run(command).map(drop)
    }
}

/// Runs commands as child processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&mut self, command: &mut Command) -> Result<String, Error> {
        info!(command = ?command, "running");
        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|error| spawn_error(command, error))?;

        io::stdout().write_all(&output.stdout)?;

        check_status(command, output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    fn run_inherited(&mut self, command: &mut Command) -> Result<(), Error> {
        info!(command = ?command, "running");
        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|error| spawn_error(command, error))?;

        check_status(command, status)
    }
}

fn check_status(command: &Command, status: ExitStatus) -> Result<(), Error> {
    if status.success() {
        Ok(())
    } else {
        Err(Error::Failed(eyre!(
            "command {command:?} exited with non-zero status ({status})"
        )))
    }
}

fn spawn_error(command: &Command, error: io::Error) -> Error {
    let program = command.get_program().to_string_lossy().into_owned();

    if error.kind() == io::ErrorKind::NotFound {
        Error::MissingDependency {
            program,
            source: error,
        }
    } else {
        let report = eyre::Report::new(error).wrap_err(format!("failed to execute {program}"));
        Error::Unspecified(report)
    }
}

/// Check that the programs needed for the run are installed
#[instrument(skip(runner))]
pub fn verify_toolchain<R: Runner>(runner: &mut R, programs: &[&str]) -> Result<(), Error> {
    for program in programs {
        let version = runner.run(Command::new(program).arg("--version"))?;
        debug!(%program, %version, "found dependency");
    }

    Ok(())
}

#[cfg(test)]
pub mod testing {
    use super::Runner;
    use crate::errors::Error;
    use eyre::eyre;
    use std::process::Command;

    /// Records commands instead of running them
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub calls: Vec<Vec<String>>,
        /// How many of the calls had their output sent to the terminal
        pub inherited: usize,
        /// Fail every command whose first argument is this sub-command
        pub fail_on: Option<&'static str>,
    }

    impl RecordingRunner {
        pub fn failing_on(subcommand: &'static str) -> RecordingRunner {
            RecordingRunner {
                fail_on: Some(subcommand),
                ..RecordingRunner::default()
            }
        }

        /// The calls running the given sub-command
        pub fn calls_to(&self, subcommand: &str) -> Vec<&Vec<String>> {
            self.calls
                .iter()
                .filter(|call| call.get(1).map(String::as_str) == Some(subcommand))
                .collect()
        }
    }

    impl Runner for RecordingRunner {
        fn run(&mut self, command: &mut Command) -> Result<String, Error> {
            let call = std::iter::once(command.get_program())
                .chain(command.get_args())
                .map(|part| part.to_string_lossy().into_owned())
                .collect::<Vec<_>>();

            let fail = self.fail_on.is_some() && call.get(1).map(String::as_str) == self.fail_on;
            self.calls.push(call);

            if fail {
                Err(Error::Failed(eyre!("command exited with non-zero status")))
            } else {
                Ok(String::new())
            }
        }

        fn run_inherited(&mut self, command: &mut Command) -> Result<(), Error> {
            self.inherited += 1;
            self.run(command).map(drop)
        }
    }
}
