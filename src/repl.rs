//! Interactive client
//!
//! A read-eval-print loop over any [`Executor`]: a remote server through
//! [`TcpClient`](crate::network::TcpClient) or an embedded
//! [`Database`](crate::database::Database).

use std::io::{BufRead, Write};

use crate::database::Executor;
use crate::error::Result;
use crate::protocol::read_line;
use crate::shutdown::ShutdownSignal;

/// Printed before every input line
pub const PROMPT: &str = "[kvdb] > ";

/// Typed alone on a line, ends the session
pub const EXIT_COMMAND: &str = "exit";

/// Terminal loop driving an executor
pub struct Repl<E> {
    executor: E,
    shutdown: ShutdownSignal,
}

impl<E: Executor> Repl<E> {
    pub fn new(executor: E, shutdown: ShutdownSignal) -> Self {
        Self { executor, shutdown }
    }

    /// Run until `exit`, EOF on input, or shutdown
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<()> {
        loop {
            if self.shutdown.is_triggered() {
                tracing::warn!(component = "cli", "canceled");
                return Ok(());
            }

            write!(output, "{}", PROMPT)?;
            output.flush()?;

            let Some(line) = read_line(input)? else {
                writeln!(output)?;
                return Ok(());
            };

            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            if command == EXIT_COMMAND {
                tracing::info!(component = "cli", "exit command");
                return Ok(());
            }

            writeln!(output, "{}", self.evaluate(command))?;
        }
    }

    /// Execute one command and render its outcome
    fn evaluate(&self, command: &str) -> String {
        match self.executor.execute(command) {
            Ok(result) => result.message,
            Err(e) => {
                tracing::debug!(component = "cli", command, error = %e, "executing failed");
                e.to_string()
            }
        }
    }

    /// Take the executor back, e.g. to close an embedded database
    pub fn into_executor(self) -> E {
        self.executor
    }
}
