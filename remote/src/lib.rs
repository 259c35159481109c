//! Remote shell sessions for the AFS to EOS copy orchestrator
//!
//! The orchestrator never talks to the storage systems itself. It types commands into
//! interactive shells that live in tmux panes and leaves the actual work to `ssh`, `xrdcp`
//! and the `eos` shell running there.
//!
//! - [`workspace`]: the [`Multiplexer`](workspace::Multiplexer) seam, workspace lookup and pane provisioning
//! - [`tmux`]: the real multiplexer, driving the `tmux` binary
//! - [`session`]: the [`RemoteSession`](session::RemoteSession) seam and jump host login
//! - [`command`]: templates of every shell line sent to a session

pub mod command;
pub mod session;
pub mod tmux;
pub mod workspace;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use session::{ClaimedHosts, RemoteSession};
pub use workspace::{Multiplexer, Window};

/// Failed preconditions of the orchestration; none of them is retried
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("tmux session '{session}' must have exactly 1 window, found {windows}")]
    UnexpectedWindowCount { session: String, windows: usize },
    #[error("window {window} of tmux session '{session}' must have exactly 1 pane, found {panes}")]
    UnexpectedPaneCount {
        session: String,
        window: String,
        panes: usize,
    },
    #[error("command for {target} is {len} bytes, tmux accepts at most {limit}")]
    CommandTooLong {
        target: String,
        len: usize,
        limit: usize,
    },
    #[error("cannot assign {chunks} chunks to {panes} panes")]
    ChunkCountMismatch { chunks: usize, panes: usize },
    #[error("`tmux {args}` failed: {stderr}")]
    Tmux { args: String, stderr: String },
}

/// How to reach the jump host from which both storage backends are accessible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSettings {
    pub user: String,
    pub jump_host: String,
    /// File read by `sshpass -f`
    pub credential_path: std::path::PathBuf,
}

impl LoginSettings {
    /// Pattern matching the shell prompt of a specific jump host backend, e.g. `zenodo@lxplus742 ~`
    ///
    /// The first capture group is the backend host name.
    pub fn prompt_regex(&self) -> anyhow::Result<regex::Regex> {
        let pattern = format!(
            r"{}@({}\d+) ~",
            regex::escape(&self.user),
            regex::escape(&self.jump_host)
        );
        Ok(regex::Regex::new(&pattern)?)
    }
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            user: "zenodo".to_string(),
            jump_host: "lxplus".to_string(),
            credential_path: std::path::PathBuf::from(
                common::credential::DEFAULT_CREDENTIAL_PATH,
            ),
        }
    }
}
