use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

pub const CONTINUE_PROMPT: &str = "Continue to the next image? (Y/N): ";

/// Decides between files whether the batch goes on.
pub trait ConfirmationGate {
    fn should_continue(&mut self) -> bool;
}

/// Used with `--skip-prompt`.
pub struct AlwaysContinue;

impl ConfirmationGate for AlwaysContinue {
    fn should_continue(&mut self) -> bool {
        true
    }
}

/// Asks on a terminal. Only `y` or `Y` continues; anything else, end of
/// input or a read error stops the batch.
///
/// With a shutdown flag attached, a raised flag stops the batch without
/// prompting, and overrides a `y` typed after Ctrl-C.
pub struct StdinGate<R, W> {
    input: R,
    output: W,
    shutdown: Option<Arc<AtomicBool>>,
}

impl StdinGate<StdinLock<'static>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for StdinGate<R, W> {
    fn should_continue(&mut self) -> bool {
        if self.shutdown_requested() {
            return false;
        }

        if let Err(e) = self
            .output
            .write_all(CONTINUE_PROMPT.as_bytes())
            .and_then(|_| self.output.flush())
        {
            warn!("Could not show prompt: {}", e);
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => false,
            Ok(_) => answer.trim().eq_ignore_ascii_case("y") && !self.shutdown_requested(),
            Err(e) => {
                warn!("Could not read answer: {}", e);
                false
            }
        }
    }
}
