//! Terminal workspace holding the worker sessions

/// Layout keeping all panes of a window visible at once
pub const TILED_LAYOUT: &str = "tiled";

/// Operations of a terminal multiplexer the orchestrator relies on
///
/// Windows and panes are addressed by the identifiers the multiplexer hands out.
// futures are only driven on the current-thread runtime, no Send bound needed
#[allow(async_fn_in_trait)]
pub trait Multiplexer {
    type Pane: crate::RemoteSession;

    async fn has_session(&self, name: &str) -> anyhow::Result<bool>;

    /// Create a detached session with a single window and pane
    async fn new_session(&self, name: &str) -> anyhow::Result<()>;

    async fn list_windows(&self, session: &str) -> anyhow::Result<Vec<String>>;

    /// Panes of `window`, in the multiplexer's order
    async fn list_panes(&self, window: &str) -> anyhow::Result<Vec<Self::Pane>>;

    async fn split_window(&self, window: &str) -> anyhow::Result<()>;

    async fn select_layout(&self, window: &str, layout: &str) -> anyhow::Result<()>;
}

/// The single window of the orchestrator's workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub session: String,
    pub id: String,
}

/// Look up the workspace `name`, creating it if it does not exist yet
///
/// The workspace must consist of exactly one window with exactly one pane. Anything else means
/// it is left over from another run (or in use) and is rejected without touching it.
pub async fn ensure_workspace<M: Multiplexer>(mux: &M, name: &str) -> anyhow::Result<Window> {
    if mux.has_session(name).await? {
        tracing::info!("reusing existing workspace '{}'", name);
    } else {
        tracing::info!("creating workspace '{}'", name);
        mux.new_session(name).await?;
    }
    let windows = mux.list_windows(name).await?;
    let [window] = windows.as_slice() else {
        return Err(crate::Error::UnexpectedWindowCount {
            session: name.to_string(),
            windows: windows.len(),
        }
        .into());
    };
    let panes = mux.list_panes(window).await?.len();
    if panes != 1 {
        return Err(crate::Error::UnexpectedPaneCount {
            session: name.to_string(),
            window: window.clone(),
            panes,
        }
        .into());
    }
    Ok(Window {
        session: name.to_string(),
        id: window.clone(),
    })
}

/// Split `window` until it holds `count` panes and return all of them in order
///
/// The window starts out with one pane, so `count - 1` splits are made; the layout is re-tiled
/// after every split so the next one has room.
pub async fn provision_panes<M: Multiplexer>(
    mux: &M,
    window: &Window,
    count: usize,
) -> anyhow::Result<Vec<M::Pane>> {
    anyhow::ensure!(count > 0, "at least one pane is required");
    for _ in 1..count {
        mux.split_window(&window.id).await?;
        mux.select_layout(&window.id, TILED_LAYOUT).await?;
    }
    let panes = mux.list_panes(&window.id).await?;
    anyhow::ensure!(
        panes.len() == count,
        "expected {} panes in window {}, found {}",
        count,
        &window.id,
        panes.len()
    );
    tracing::debug!("provisioned {} panes in window {}", count, &window.id);
    Ok(panes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteSession;
    use crate::testutils::FakeMux;

    #[tokio::test]
    async fn missing_workspace_is_created() -> anyhow::Result<()> {
        let mux = FakeMux::new();
        let window = ensure_workspace(&mux, "afseos").await?;
        assert_eq!(window.session, "afseos");
        assert_eq!(mux.calls(), vec!["new-session afseos"]);
        Ok(())
    }

    #[tokio::test]
    async fn pristine_workspace_is_reused() -> anyhow::Result<()> {
        let mux = FakeMux::new();
        mux.add_session("afseos", 1);
        let window = ensure_workspace(&mux, "afseos").await?;
        assert_eq!(window.id, "@0");
        assert!(mux.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn workspace_with_two_windows_is_rejected() -> anyhow::Result<()> {
        let mux = FakeMux::new();
        mux.add_session("afseos", 2);
        let error = ensure_workspace(&mux, "afseos").await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<crate::Error>(),
            Some(crate::Error::UnexpectedWindowCount { windows: 2, .. })
        ));
        // nothing was split or created
        assert!(mux.calls().is_empty());
        assert_eq!(mux.panes("@0").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn workspace_with_split_window_is_rejected() -> anyhow::Result<()> {
        let mux = FakeMux::new();
        mux.add_session("afseos", 1);
        mux.split_window("@0").await?;
        let error = ensure_workspace(&mux, "afseos").await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<crate::Error>(),
            Some(crate::Error::UnexpectedPaneCount { panes: 2, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn panes_are_split_and_tiled() -> anyhow::Result<()> {
        let mux = FakeMux::new();
        let window = ensure_workspace(&mux, "afseos").await?;
        let panes = provision_panes(&mux, &window, 3).await?;
        let ids: Vec<_> = panes.iter().map(|pane| pane.id().to_string()).collect();
        assert_eq!(ids, vec!["%0", "%1", "%2"]);
        assert_eq!(
            mux.calls(),
            vec![
                "new-session afseos",
                "split-window @0",
                "select-layout @0 tiled",
                "split-window @0",
                "select-layout @0 tiled",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn single_pane_needs_no_split() -> anyhow::Result<()> {
        let mux = FakeMux::new();
        let window = ensure_workspace(&mux, "afseos").await?;
        assert_eq!(provision_panes(&mux, &window, 1).await?.len(), 1);
        assert_eq!(mux.calls(), vec!["new-session afseos"]);
        Ok(())
    }

    #[tokio::test]
    async fn zero_panes_is_rejected() -> anyhow::Result<()> {
        let mux = FakeMux::new();
        let window = ensure_workspace(&mux, "afseos").await?;
        assert!(provision_panes(&mux, &window, 0).await.is_err());
        Ok(())
    }
}
