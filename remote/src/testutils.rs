//! In-memory multiplexer and sessions for exercising the orchestration without tmux or ssh

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Screen shown by a pane once its shell left the jump host
pub const LOCAL_PROMPT: &str = "operator@workstation:~$";

#[derive(Debug, Default)]
struct Logins {
    screens: VecDeque<String>,
}

#[derive(Debug, Default)]
struct PaneState {
    sent: Vec<String>,
    screen: String,
    clears: usize,
}

/// Session recording every line typed into it
///
/// Login commands (`sshpass ...`) replace the screen with the next queued login screen,
/// `exit` brings back [`LOCAL_PROMPT`] and `clear` empties the screen. Panes created by the
/// same [`FakeMux`] share one queue of login screens, in login order.
#[derive(Debug, Clone)]
pub struct FakePane {
    id: String,
    state: Arc<Mutex<PaneState>>,
    logins: Arc<Mutex<Logins>>,
}

impl FakePane {
    pub fn new(id: &str) -> Self {
        Self::with_logins(id, Arc::default())
    }

    fn with_logins(id: &str, logins: Arc<Mutex<Logins>>) -> Self {
        Self {
            id: id.to_string(),
            state: Arc::default(),
            logins,
        }
    }

    /// Screen shown after the next login command
    pub fn queue_login_screen(&self, screen: &str) {
        self.logins
            .lock()
            .unwrap()
            .screens
            .push_back(screen.to_string());
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }
}

impl crate::RemoteSession for FakePane {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, command: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(command.to_string());
        if command.starts_with("sshpass ") {
            if let Some(screen) = self.logins.lock().unwrap().screens.pop_front() {
                state.screen = screen;
            }
        } else if command == crate::command::EXIT {
            state.screen = LOCAL_PROMPT.to_string();
        }
        Ok(())
    }

    async fn capture_output(&self) -> anyhow::Result<String> {
        Ok(self.state.lock().unwrap().screen.clone())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.clears += 1;
        state.screen.clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MuxState {
    sessions: BTreeMap<String, Vec<String>>,
    windows: BTreeMap<String, Vec<FakePane>>,
    next_window: usize,
    next_pane: usize,
    calls: Vec<String>,
}

impl MuxState {
    fn add_window(&mut self, session: &str, logins: &Arc<Mutex<Logins>>) {
        let window = format!("@{}", self.next_window);
        self.next_window += 1;
        let pane = self.new_pane(logins);
        self.windows.insert(window.clone(), vec![pane]);
        self.sessions
            .entry(session.to_string())
            .or_default()
            .push(window);
    }

    fn new_pane(&mut self, logins: &Arc<Mutex<Logins>>) -> FakePane {
        let pane = FakePane::with_logins(&format!("%{}", self.next_pane), logins.clone());
        self.next_pane += 1;
        pane
    }
}

/// Multiplexer keeping its sessions, windows and panes in memory
///
/// Mutating operations are recorded as `"<tmux command> <target>"` strings, see [`FakeMux::calls`].
#[derive(Debug, Default)]
pub struct FakeMux {
    state: Mutex<MuxState>,
    logins: Arc<Mutex<Logins>>,
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-existing session with `windows` windows of one pane each; not recorded as a call
    pub fn add_session(&self, name: &str, windows: usize) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..windows {
            state.add_window(name, &self.logins);
        }
    }

    /// Screen shown by whichever pane logs in next
    pub fn queue_login_screen(&self, screen: &str) {
        self.logins
            .lock()
            .unwrap()
            .screens
            .push_back(screen.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn panes(&self, window: &str) -> Vec<FakePane> {
        self.state
            .lock()
            .unwrap()
            .windows
            .get(window)
            .cloned()
            .unwrap_or_default()
    }
}

impl crate::Multiplexer for FakeMux {
    type Pane = FakePane;

    async fn has_session(&self, name: &str) -> anyhow::Result<bool> {
        Ok(self.state.lock().unwrap().sessions.contains_key(name))
    }

    async fn new_session(&self, name: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        anyhow::ensure!(
            !state.sessions.contains_key(name),
            "duplicate session: {}",
            name
        );
        state.calls.push(format!("new-session {name}"));
        state.add_window(name, &self.logins);
        Ok(())
    }

    async fn list_windows(&self, session: &str) -> anyhow::Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let windows = state
            .sessions
            .get(session)
            .ok_or_else(|| anyhow::anyhow!("can't find session: {}", session))?;
        Ok(windows.clone())
    }

    async fn list_panes(&self, window: &str) -> anyhow::Result<Vec<FakePane>> {
        let state = self.state.lock().unwrap();
        let panes = state
            .windows
            .get(window)
            .ok_or_else(|| anyhow::anyhow!("can't find window: {}", window))?;
        Ok(panes.clone())
    }

    async fn split_window(&self, window: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        anyhow::ensure!(
            state.windows.contains_key(window),
            "can't find window: {}",
            window
        );
        state.calls.push(format!("split-window {window}"));
        let pane = state.new_pane(&self.logins);
        if let Some(panes) = state.windows.get_mut(window) {
            panes.push(pane);
        }
        Ok(())
    }

    async fn select_layout(&self, window: &str, layout: &str) -> anyhow::Result<()> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("select-layout {window} {layout}"));
        Ok(())
    }
}
