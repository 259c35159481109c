//! Configuration types for runtime and execution settings

/// Output and logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress error output
    pub quiet: bool,
    /// Verbosity level: 0=ERROR, 1=INFO, 2=DEBUG, 3=TRACE
    pub verbose: u8,
    /// Print summary statistics at the end
    pub print_summary: bool,
}

impl OutputConfig {
    /// Default log directive matching the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "error",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Timing knobs for waiting on remote shells
///
/// Both values are heuristics: the orchestrator never gets a completion signal from
/// the remote side, it either polls pane output or simply waits.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Interval between two captures of a pane while waiting for the login prompt
    pub poll_interval: std::time::Duration,
    /// Fixed delay after sending a login command when host uniqueness is not required
    pub ready_delay: std::time::Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: std::time::Duration::from_secs(1),
            ready_delay: std::time::Duration::from_secs(2),
        }
    }
}

impl Timing {
    /// No waiting at all, used by tests driving in-memory sessions
    pub fn immediate() -> Self {
        Self {
            poll_interval: std::time::Duration::ZERO,
            ready_delay: std::time::Duration::ZERO,
        }
    }
}
