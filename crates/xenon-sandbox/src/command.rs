//! Command lines for the two compiler entry points.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Flag asking the compiler to check a single line.
pub const PARSE_LINE_FLAG: &str = "-parse-line-generic";

/// Location and run settings of the compiler executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    program: PathBuf,
    hz: u32,
}

impl Compiler {
    /// Describes the compiler at `program`, running programs at `hz` cycles
    /// per second.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, hz: u32) -> Self {
        Self {
            program: program.into(),
            hz,
        }
    }

    /// Executable path or bare name resolved on `PATH`.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Cycles per second handed to the runtime.
    #[must_use]
    pub const fn hz(&self) -> u32 {
        self.hz
    }

    /// Builds `<program> -compile . -hz <hz> -run .` inside `project_dir`.
    ///
    /// `-hz` must come before `-run` because the compiler applies its flags
    /// in order.
    #[must_use]
    pub fn run_command(&self, project_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-compile")
            .arg(".")
            .arg("-hz")
            .arg(self.hz.to_string())
            .arg("-run")
            .arg(".")
            .current_dir(project_dir);
        command
    }

    /// Builds `<program> -parse-line-generic <line>`.
    #[must_use]
    pub fn parse_line_command(&self, line: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(PARSE_LINE_FLAG).arg(line);
        command
    }
}
