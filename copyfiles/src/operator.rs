//! The human in the loop
//!
//! The orchestrator has no way to tell whether remote shells are ready; it stops at a few
//! checkpoints and waits for the operator, who watches the tmux panes, to acknowledge.

use std::io::Write;
use tokio::io::AsyncBufReadExt;

/// Points at which the workflow waits for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkpoint {
    /// The operator attached to the tmux session
    WorkspaceAttached { session: String },
    /// Every pane shows a jump host prompt
    SessionsReady,
    /// Last stop before the copy commands go out
    StartCopy,
}

impl Checkpoint {
    pub fn prompt(&self) -> &'static str {
        match self {
            Checkpoint::WorkspaceAttached { .. } => "Press enter to continue...",
            Checkpoint::SessionsReady => "Press enter when all sessions are ready...",
            Checkpoint::StartCopy => "Press enter to start copying files...",
        }
    }
}

// futures are only driven on the current-thread runtime, no Send bound needed
#[allow(async_fn_in_trait)]
pub trait Operator {
    /// Show `message` to the operator
    fn announce(&mut self, message: &str);

    /// Wait until the operator acknowledges `checkpoint`; an error aborts the workflow
    async fn acknowledge(&mut self, checkpoint: &Checkpoint) -> anyhow::Result<()>;
}

/// Operator sitting at the controlling terminal: messages go to stdout, acknowledgement is Enter
#[derive(Debug)]
pub struct Terminal {
    stdin: tokio::io::BufReader<tokio::io::Stdin>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            stdin: tokio::io::BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for Terminal {
    fn announce(&mut self, message: &str) {
        println!("{message}");
    }

    async fn acknowledge(&mut self, checkpoint: &Checkpoint) -> anyhow::Result<()> {
        print!("{} []: ", checkpoint.prompt());
        std::io::stdout().flush()?;
        let mut line = String::new();
        let read = self.stdin.read_line(&mut line).await?;
        if read == 0 {
            anyhow::bail!("stdin closed while waiting for: {}", checkpoint.prompt());
        }
        tracing::debug!("operator acknowledged {:?}", checkpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_checkpoint_has_a_prompt() {
        let checkpoints = [
            Checkpoint::WorkspaceAttached {
                session: "afseos".to_string(),
            },
            Checkpoint::SessionsReady,
            Checkpoint::StartCopy,
        ];
        for checkpoint in checkpoints {
            assert!(checkpoint.prompt().starts_with("Press enter"));
        }
    }
}
