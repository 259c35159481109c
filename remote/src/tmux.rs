//! The real multiplexer: every operation is one invocation of the `tmux` binary

use anyhow::Context;

/// Handle to the tmux server of the current user
#[derive(Debug, Clone)]
pub struct Tmux {
    program: std::path::PathBuf,
}

impl Default for Tmux {
    fn default() -> Self {
        Self::new("tmux")
    }
}

impl Tmux {
    pub fn new(program: impl Into<std::path::PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, args: &[&str]) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Run tmux with `args` and return its stdout, failing on a non-zero exit status
    async fn output(&self, args: &[&str]) -> anyhow::Result<String> {
        tracing::trace!("tmux {}", args.join(" "));
        let output = self
            .command(args)
            .output()
            .await
            .with_context(|| format!("failed to run {:?}", &self.program))?;
        if !output.status.success() {
            return Err(crate::Error::Tmux {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn ids(&self, args: &[&str]) -> anyhow::Result<Vec<String>> {
        Ok(self
            .output(args)
            .await?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// `=` makes tmux match the session name exactly instead of by prefix
fn exact(session: &str) -> String {
    format!("={session}")
}

impl crate::Multiplexer for Tmux {
    type Pane = TmuxPane;

    async fn has_session(&self, name: &str) -> anyhow::Result<bool> {
        let status = self
            .command(&["has-session", "-t", &exact(name)])
            .stderr(std::process::Stdio::null())
            .status()
            .await
            .with_context(|| format!("failed to run {:?}", &self.program))?;
        Ok(status.success())
    }

    async fn new_session(&self, name: &str) -> anyhow::Result<()> {
        self.output(&["new-session", "-d", "-s", name]).await?;
        Ok(())
    }

    async fn list_windows(&self, session: &str) -> anyhow::Result<Vec<String>> {
        self.ids(&["list-windows", "-t", &exact(session), "-F", "#{window_id}"])
            .await
    }

    async fn list_panes(&self, window: &str) -> anyhow::Result<Vec<TmuxPane>> {
        let ids = self
            .ids(&["list-panes", "-t", window, "-F", "#{pane_id}"])
            .await?;
        Ok(ids
            .into_iter()
            .map(|id| TmuxPane {
                id,
                tmux: self.clone(),
            })
            .collect())
    }

    async fn split_window(&self, window: &str) -> anyhow::Result<()> {
        self.output(&["split-window", "-t", window]).await?;
        Ok(())
    }

    async fn select_layout(&self, window: &str, layout: &str) -> anyhow::Result<()> {
        self.output(&["select-layout", "-t", window, layout]).await?;
        Ok(())
    }
}

/// A tmux pane running an interactive shell
#[derive(Debug, Clone)]
pub struct TmuxPane {
    id: String,
    tmux: Tmux,
}

impl crate::RemoteSession for TmuxPane {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, command: &str) -> anyhow::Result<()> {
        // -l types the text literally, so `;` and `$d` reach the shell untouched
        self.tmux
            .output(&["send-keys", "-t", &self.id, "-l", command])
            .await?;
        self.tmux
            .output(&["send-keys", "-t", &self.id, "Enter"])
            .await?;
        Ok(())
    }

    async fn capture_output(&self) -> anyhow::Result<String> {
        self.tmux
            .output(&["capture-pane", "-p", "-t", &self.id])
            .await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.send("reset").await
    }
}
