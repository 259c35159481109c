//! What a copy run is asked to do

/// Tmux session used when none is given
pub const DEFAULT_SESSION_NAME: &str = "afseos";

/// Number of parallel worker sessions used when none is given
pub const DEFAULT_SESSION_COUNT: usize = 20;

/// Root of the EOS instance the administrative shell connects to
pub const DEFAULT_EOS_ENDPOINT: &str = "root://eospublic.cern.ch/";

#[derive(Debug, Clone)]
pub struct Plan {
    /// Base AFS directory the listed directories are copied from
    pub src_base: String,
    /// Base EOS directory (XRootD URL) the listed directories are copied to
    pub dst_base: String,
    /// Directories to copy, relative to both bases
    pub dirs: Vec<String>,
    pub copy: remote::command::CopyCommand,
    /// Create every destination directory through the EOS shell before copying
    pub create_dirs: bool,
    /// EOS instance the destination directories live on
    pub eos_endpoint: String,
    pub session_count: usize,
    /// Spread the sessions over distinct jump host backends
    pub unique_sessions: bool,
    /// Send every mkdir and copy command as a shell comment
    pub dry_run: bool,
}

impl Plan {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.session_count > 0, "session count must be at least 1");
        anyhow::ensure!(!self.src_base.is_empty(), "source directory must not be empty");
        anyhow::ensure!(
            !self.dst_base.is_empty(),
            "destination directory must not be empty"
        );
        anyhow::ensure!(self.copy.parallel > 0, "parallel streams must be at least 1");
        if let Some(dir) = self.dirs.iter().find(|dir| dir.is_empty()) {
            anyhow::bail!("directory list contains an empty entry: {:?}", dir);
        }
        if let Some(dir) = self.dirs.iter().find(|dir| dir.contains(char::is_whitespace)) {
            // the for loop splits its word list on whitespace
            anyhow::bail!("directory names must not contain whitespace: {:?}", dir);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample(dirs: &[&str], session_count: usize) -> Plan {
    Plan {
        src_base: "/afs/cern.ch/project/zenodo/prod/var/data/files".to_string(),
        dst_base: "root://eospublic.cern.ch//eos/zenodo/prod/legacydata/files".to_string(),
        dirs: dirs.iter().map(|d| d.to_string()).collect(),
        copy: remote::command::CopyCommand::default(),
        create_dirs: false,
        eos_endpoint: DEFAULT_EOS_ENDPOINT.to_string(),
        session_count,
        unique_sessions: false,
        dry_run: false,
    }
}
