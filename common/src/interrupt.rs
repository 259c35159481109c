//! Ctrl-C handling for runs holding resources that must not outlive them
//!
//! By default SIGINT and SIGTERM terminate the process on the spot and no destructor runs.
//! Once an [`Interrupt`] is listening, the signals are delivered to it instead and
//! [`until_interrupted`] turns them into an [`Interrupted`] error, so the work is dropped and
//! every guard held by the caller is released on the way out.

use tokio::signal::unix::{Signal, SignalKind, signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interrupted by {0}")]
pub struct Interrupted(pub &'static str);

/// Listener for SIGINT and SIGTERM, active from the moment it is created
#[derive(Debug)]
pub struct Interrupt {
    sigint: Signal,
    sigterm: Signal,
}

impl Interrupt {
    /// Start listening; must be called from within a tokio runtime
    pub fn listen() -> anyhow::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Interrupted {
        tokio::select! {
            _ = self.sigint.recv() => Interrupted("SIGINT"),
            _ = self.sigterm.recv() => Interrupted("SIGTERM"),
        }
    }
}

/// Drive `work` to completion unless `interrupt` resolves first
///
/// On interruption `work` is dropped before this returns.
pub async fn until_interrupted<T, Work, Stop>(work: Work, interrupt: Stop) -> anyhow::Result<T>
where
    Work: std::future::Future<Output = anyhow::Result<T>>,
    Stop: std::future::Future<Output = Interrupted>,
{
    tokio::select! {
        biased;
        interrupted = interrupt => {
            tracing::info!("{}, abandoning the run", interrupted);
            Err(interrupted.into())
        }
        res = work => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finished_work_is_returned() -> anyhow::Result<()> {
        let res = until_interrupted(async { Ok(7) }, std::future::pending()).await?;
        assert_eq!(res, 7);
        Ok(())
    }

    #[tokio::test]
    async fn interrupt_drops_pending_work() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("login.pass");
        let work = {
            let credential = crate::CredentialFile::create(&path, "hunter2")?;
            async move {
                let _credential = credential;
                std::future::pending::<()>().await;
                Ok(())
            }
        };
        assert!(path.exists());
        let error = until_interrupted(work, async { Interrupted("SIGINT") })
            .await
            .unwrap_err();
        assert_eq!(error.downcast_ref::<Interrupted>(), Some(&Interrupted("SIGINT")));
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn sigint_is_caught_instead_of_terminating() -> anyhow::Result<()> {
        let mut interrupt = Interrupt::listen()?;
        let status = std::process::Command::new("kill")
            .args(["-INT", &std::process::id().to_string()])
            .status()?;
        assert!(status.success());
        let error = until_interrupted(std::future::pending::<anyhow::Result<()>>(), interrupt.recv())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "interrupted by SIGINT");
        Ok(())
    }
}
