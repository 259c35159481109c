//! Driving the worker sessions through a copy run

use anyhow::Context;
use remote::RemoteSession;
use remote::command;

use crate::operator::{Checkpoint, Operator};
use crate::plan::Plan;

/// Stages of a copy run, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Provisioning,
    AwaitingReadyConfirmation,
    CreatingDirs,
    AwaitingCopyConfirmation,
    Dispatching,
    Done,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub sessions: usize,
    pub hosts_claimed: usize,
    pub directories: usize,
    pub directories_created: usize,
    pub commands_sent: usize,
    pub dry_run: bool,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "sessions: {}\n\
            distinct hosts: {}\n\
            directories assigned: {}\n\
            directories created: {}\n\
            copy commands sent: {}\n\
            dry run: {}\n",
            self.sessions,
            self.hosts_claimed,
            self.directories,
            self.directories_created,
            self.commands_sent,
            self.dry_run,
        )
    }
}

/// Copy command for one session, before any dry-run rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub pane_id: String,
    pub dirs: Vec<String>,
    pub command: String,
}

/// Partition the directories of `plan` over `pane_ids` and build one copy command per pane
///
/// Chunk `i` goes to pane `i`. Every command, as it would be sent, is checked against the
/// transport limit up front so that an oversized chunk fails the run before anything is sent.
pub fn assign(plan: &Plan, pane_ids: &[&str]) -> anyhow::Result<Vec<Assignment>> {
    let chunks = common::chunkify(&plan.dirs, plan.session_count);
    if chunks.len() != pane_ids.len() {
        return Err(remote::Error::ChunkCountMismatch {
            chunks: chunks.len(),
            panes: pane_ids.len(),
        }
        .into());
    }
    let mut assignments = Vec::with_capacity(chunks.len());
    for (pane_id, dirs) in pane_ids.iter().zip(chunks) {
        let cmd = plan
            .copy
            .for_each_dir(&plan.src_base, &plan.dst_base, &dirs);
        command::check_length(pane_id, &command::render(&cmd, plan.dry_run)).with_context(|| {
            format!(
                "copy loop over {} directories does not fit; reduce the number of directories or increase the session count",
                dirs.len()
            )
        })?;
        assignments.push(Assignment {
            pane_id: pane_id.to_string(),
            dirs,
            command: cmd,
        });
    }
    Ok(assignments)
}

/// Create `dirs` under `base_dir` through the EOS administrative shell running in `session`
///
/// In dry-run mode the mkdir commands are sent as comments; entering and leaving the shell is
/// harmless and happens either way. Every mkdir line is checked against the transport limit
/// before the shell is entered. Returns the number of directories handled.
pub async fn create_destination_dirs<S: RemoteSession>(
    session: &S,
    endpoint: &str,
    base_dir: &str,
    dirs: &[String],
    dry_run: bool,
) -> anyhow::Result<usize> {
    let lines = dirs
        .iter()
        .map(|dir| {
            let path = command::admin_path(endpoint, base_dir, dir);
            let line = command::render(&command::mkdir(&path), dry_run);
            command::check_length(session.id(), &line)
                .with_context(|| format!("cannot create {:?} through the EOS shell", path))?;
            Ok(line)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    session.send(&command::admin_shell(endpoint)).await?;
    for line in &lines {
        tracing::debug!("{}: {}", session.id(), line);
        session.send(line).await?;
    }
    session.send(command::EXIT).await?;
    Ok(dirs.len())
}

/// Show the operator how to attach to the workspace and wait until they did
pub async fn attach_workspace<M: remote::Multiplexer, O: Operator>(
    mux: &M,
    operator: &mut O,
    name: &str,
) -> anyhow::Result<remote::Window> {
    let window = remote::workspace::ensure_workspace(mux, name).await?;
    operator.announce(&format!(
        "Launch the tmux session:\n\n  tmux attach -t {name}\n"
    ));
    operator
        .acknowledge(&Checkpoint::WorkspaceAttached {
            session: name.to_string(),
        })
        .await?;
    Ok(window)
}

/// Attach the operator to workspace `session_name` and run `plan` in its window
pub async fn copy_directories<M: remote::Multiplexer, O: Operator>(
    mux: &M,
    operator: &mut O,
    login: &remote::LoginSettings,
    timing: common::Timing,
    session_name: &str,
    plan: &Plan,
) -> anyhow::Result<Summary> {
    let window = attach_workspace(mux, operator, session_name).await?;
    Dispatcher::new(mux, operator, login, timing)
        .run(&window, plan)
        .await
}

/// Runs one copy plan against the panes of a workspace window
pub struct Dispatcher<'a, M: remote::Multiplexer, O: Operator> {
    mux: &'a M,
    operator: &'a mut O,
    login: &'a remote::LoginSettings,
    timing: common::Timing,
    stages: Vec<Stage>,
}

impl<'a, M: remote::Multiplexer, O: Operator> Dispatcher<'a, M, O> {
    pub fn new(
        mux: &'a M,
        operator: &'a mut O,
        login: &'a remote::LoginSettings,
        timing: common::Timing,
    ) -> Self {
        Self {
            mux,
            operator,
            login,
            timing,
            stages: Vec::new(),
        }
    }

    /// Current stage, `None` before the run started
    pub fn stage(&self) -> Option<Stage> {
        self.stages.last().copied()
    }

    /// Every stage entered so far
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn enter(&mut self, stage: Stage) {
        tracing::info!("entering stage {:?}", stage);
        self.stages.push(stage);
    }

    /// Provision and log in the sessions, optionally create the destination directories, then
    /// send one copy command per session
    ///
    /// Returns once the commands are sent; the copies themselves are not awaited. A failure is
    /// reported together with the stage it happened in.
    pub async fn run(&mut self, window: &remote::Window, plan: &Plan) -> anyhow::Result<Summary> {
        match self.run_stages(window, plan).await {
            Ok(summary) => Ok(summary),
            Err(error) => match self.stage() {
                Some(stage) => Err(error.context(format!("copy run aborted in stage {stage:?}"))),
                None => Err(error),
            },
        }
    }

    async fn run_stages(&mut self, window: &remote::Window, plan: &Plan) -> anyhow::Result<Summary> {
        plan.validate()?;
        self.enter(Stage::Provisioning);
        let panes =
            remote::workspace::provision_panes(self.mux, window, plan.session_count).await?;
        let mut claimed = remote::ClaimedHosts::new();
        for pane in &panes {
            remote::session::authenticate(
                pane,
                self.login,
                &mut claimed,
                plan.unique_sessions,
                &self.timing,
            )
            .await?;
        }
        self.enter(Stage::AwaitingReadyConfirmation);
        self.operator.acknowledge(&Checkpoint::SessionsReady).await?;
        let mut directories_created = 0;
        if plan.create_dirs {
            self.enter(Stage::CreatingDirs);
            self.operator.announce("Creating directories on EOS...");
            directories_created = create_destination_dirs(
                &panes[0],
                &plan.eos_endpoint,
                &plan.dst_base,
                &plan.dirs,
                plan.dry_run,
            )
            .await?;
        }
        self.enter(Stage::AwaitingCopyConfirmation);
        self.operator.acknowledge(&Checkpoint::StartCopy).await?;
        self.enter(Stage::Dispatching);
        let pane_ids: Vec<&str> = panes.iter().map(|pane| pane.id()).collect();
        let assignments = assign(plan, &pane_ids)?;
        let mut commands_sent = 0;
        for (pane, assignment) in panes.iter().zip(&assignments) {
            self.operator.announce(&format!(
                "\n{} will run: {}\n",
                &assignment.pane_id, &assignment.command
            ));
            pane.send(&command::render(&assignment.command, plan.dry_run))
                .await?;
            commands_sent += 1;
        }
        self.enter(Stage::Done);
        Ok(Summary {
            sessions: panes.len(),
            hosts_claimed: claimed.len(),
            directories: plan.dirs.len(),
            directories_created,
            commands_sent,
            dry_run: plan.dry_run,
        })
    }
}
