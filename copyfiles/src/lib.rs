//! Bulk copy of directories from AFS to EOS through parallel tmux sessions
//!
//! `copy-files` does not move any data itself. It opens a tmux workspace, splits it into a
//! number of panes, logs every pane in to the jump host and then types one shell loop into each
//! pane that runs `xrdcp` over that pane's share of the directories. From then on the
//! operator watches the panes; the tool exits as soon as the commands are sent.
//!
//! # Workflow
//!
//! 1. The workspace is looked up or created and the operator attaches to it.
//! 2. `--session-count` panes are provisioned and logged in to the jump host.
//! 3. The operator confirms that all sessions are ready.
//! 4. With `--create-eos-dirs` the first pane creates every destination directory through the
//!    EOS shell.
//! 5. The operator confirms the start of the copy.
//! 6. Directories are dealt out round-robin, one chunk per pane, and the copy loops are sent.
//!
//! `--dry-run` sends every mkdir and copy command as a shell comment, so the panes show what
//! would run without running it.
//!
//! # Example
//!
//! ```bash
//! copy-files \
//!     -d /path/to/files-dirs.json \
//!     -a /afs/cern.ch/project/zenodo/prod/var/data/files \
//!     -e root://eospublic.cern.ch//eos/zenodo/prod/legacydata/files \
//!     --create-eos-dirs --dry-run
//! ```

pub mod dispatch;
pub mod operator;
pub mod plan;

pub use dispatch::{
    Dispatcher, Stage, Summary, attach_workspace, copy_directories, create_destination_dirs,
};
pub use operator::{Checkpoint, Operator};
pub use plan::Plan;
