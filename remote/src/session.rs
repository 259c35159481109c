//! Interactive remote shells and logging them in to the jump host

use crate::command;

/// One interactive shell commands can be typed into
///
/// The orchestrator only ever writes lines and reads back what is on screen; it has no way of
/// knowing whether a command finished or succeeded.
// futures are only driven on the current-thread runtime, no Send bound needed
#[allow(async_fn_in_trait)]
pub trait RemoteSession {
    /// Identifier shown to the operator (e.g. the tmux pane id)
    fn id(&self) -> &str;

    /// Type `command` followed by Enter
    async fn send(&self, command: &str) -> anyhow::Result<()>;

    /// Text currently visible in the session
    async fn capture_output(&self) -> anyhow::Result<String>;

    /// Reset the terminal so that stale output is gone
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Jump host backends already taken by a session during this run
#[derive(Debug, Default, Clone)]
pub struct ClaimedHosts {
    hosts: std::collections::BTreeSet<String>,
}

impl ClaimedHosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `host`; returns `false` if it had already been claimed
    pub fn claim(&mut self, host: &str) -> bool {
        self.hosts.insert(host.to_string())
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

fn last_line(output: &str) -> &str {
    output
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
}

/// Poll until the jump host prompt shows up and return the backend host name
async fn wait_for_host<S: RemoteSession>(
    session: &S,
    prompt: &regex::Regex,
    timing: &common::Timing,
) -> anyhow::Result<String> {
    loop {
        tokio::time::sleep(timing.poll_interval).await;
        let output = session.capture_output().await?;
        if let Some(captures) = prompt.captures(last_line(&output)) {
            return Ok(captures[1].to_string());
        }
        tracing::trace!("{}: login prompt not there yet", session.id());
    }
}

/// Poll until the prompt of `host` is gone, i.e. the session left it
async fn wait_for_logout<S: RemoteSession>(
    session: &S,
    prompt: &regex::Regex,
    host: &str,
    timing: &common::Timing,
) -> anyhow::Result<()> {
    loop {
        tokio::time::sleep(timing.poll_interval).await;
        let output = session.capture_output().await?;
        match prompt.captures(last_line(&output)) {
            Some(captures) if &captures[1] == host => {}
            _ => return Ok(()),
        }
    }
}

/// Log `session` in to the jump host
///
/// With `unique_sessions` the session's screen is polled until the prompt reveals which
/// backend host the login landed on. If another session of this run already sits on that
/// host, the session logs out and tries again until it reaches an unclaimed one; the
/// uniqueness requirement holds for every attempt. Polling has no timeout.
///
/// Without `unique_sessions` the login is assumed to be done after a fixed delay.
///
/// Returns the claimed host, if one was determined.
pub async fn authenticate<S: RemoteSession>(
    session: &S,
    login: &crate::LoginSettings,
    claimed: &mut ClaimedHosts,
    unique_sessions: bool,
    timing: &common::Timing,
) -> anyhow::Result<Option<String>> {
    let login_cmd = command::login(login);
    session.clear().await?;
    session.send(&login_cmd).await?;
    if !unique_sessions {
        tokio::time::sleep(timing.ready_delay).await;
        return Ok(None);
    }
    let prompt = login.prompt_regex()?;
    loop {
        let host = wait_for_host(session, &prompt, timing).await?;
        if claimed.claim(&host) {
            tracing::info!("{}: logged in to {}", session.id(), &host);
            return Ok(Some(host));
        }
        tracing::debug!(
            "{}: {} is already used by another session, logging in again",
            session.id(),
            &host
        );
        session.send(command::EXIT).await?;
        wait_for_logout(session, &prompt, &host, timing).await?;
        session.clear().await?;
        session.send(&login_cmd).await?;
    }
}
