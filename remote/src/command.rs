//! Shell lines sent to remote sessions
//!
//! Nothing here runs anything; these are pure string templates so that everything the
//! operator will see in the panes can be checked in isolation.

/// Largest message `tmux send-keys` accepts in one go
pub const TRANSPORT_LIMIT: usize = 16000;

/// Prefix turning a shell line into an inert comment
pub const COMMENT_MARKER: &str = "# ";

/// Leaves the current (remote or administrative) shell
pub const EXIT: &str = "exit";

/// Default number of parallel streams per `xrdcp` invocation
pub const DEFAULT_PARALLEL_STREAMS: u32 = 4;

/// Turn `line` into a comment when in dry-run mode
pub fn render(line: &str, dry_run: bool) -> String {
    if dry_run {
        format!("{COMMENT_MARKER}{line}")
    } else {
        line.to_string()
    }
}

/// Password-less (from the operator's point of view) login to the jump host
pub fn login(settings: &crate::LoginSettings) -> String {
    format!(
        "sshpass -f {} ssh {}@{}",
        settings.credential_path.display(),
        settings.user,
        settings.jump_host
    )
}

/// Start the EOS administrative shell rooted at `endpoint`
pub fn admin_shell(endpoint: &str) -> String {
    format!("eos {endpoint}")
}

pub fn mkdir(path: &str) -> String {
    format!("mkdir -p {path}")
}

/// Path of `dir` under `base_dir` as seen from inside the administrative shell
///
/// The shell is already connected to `endpoint`, so the endpoint prefix is stripped from the
/// XRootD URL, e.g. `root://eospublic.cern.ch//eos/data` becomes `/eos/data`.
pub fn admin_path(endpoint: &str, base_dir: &str, dir: &str) -> String {
    let base = base_dir.strip_prefix(endpoint).unwrap_or(base_dir);
    std::path::Path::new(base).join(dir).display().to_string()
}

/// Fail if `command` cannot be delivered to a session in one message
pub fn check_length(target: &str, command: &str) -> Result<(), crate::Error> {
    if command.len() > TRANSPORT_LIMIT {
        return Err(crate::Error::CommandTooLong {
            target: target.to_string(),
            len: command.len(),
            limit: TRANSPORT_LIMIT,
        });
    }
    Ok(())
}

/// Template for `xrdcp` invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyCommand {
    /// Overwrite files already present at the destination
    pub force: bool,
    /// Number of parallel streams
    pub parallel: u32,
}

impl Default for CopyCommand {
    fn default() -> Self {
        Self {
            force: false,
            parallel: DEFAULT_PARALLEL_STREAMS,
        }
    }
}

impl CopyCommand {
    fn xrdcp(&self) -> String {
        if self.force {
            format!("xrdcp -f -r --parallel {}", self.parallel)
        } else {
            format!("xrdcp -r --parallel {}", self.parallel)
        }
    }

    /// Copy a single tree from `src` to `dst`
    pub fn single(&self, src: &str, dst: &str) -> String {
        format!("{} {src} {dst}", self.xrdcp())
    }

    /// Copy every directory of `dirs` from under `src_base` to under `dst_base`, one after another
    pub fn for_each_dir(&self, src_base: &str, dst_base: &str, dirs: &[String]) -> String {
        format!(
            "for d in {}; do {} {src_base}/$d {dst_base}/$d; done",
            dirs.join(" "),
            self.xrdcp()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EOS_ENDPOINT: &str = "root://eospublic.cern.ch/";
    const EOS_FILES_DIR: &str = "root://eospublic.cern.ch//eos/zenodo/prod/legacydata/files";
    const AFS_FILES_DIR: &str = "/afs/cern.ch/project/zenodo/prod/var/data/files";

    fn dirs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn login_uses_credential_file() {
        assert_eq!(
            login(&crate::LoginSettings::default()),
            "sshpass -f /tmp/temp.pass ssh zenodo@lxplus"
        );
    }

    #[test]
    fn chunk_copy_without_force() {
        let cmd = CopyCommand::default().for_each_dir(
            AFS_FILES_DIR,
            EOS_FILES_DIR,
            &dirs(&["a1", "b2"]),
        );
        assert_eq!(
            cmd,
            "for d in a1 b2; do xrdcp -r --parallel 4 \
             /afs/cern.ch/project/zenodo/prod/var/data/files/$d \
             root://eospublic.cern.ch//eos/zenodo/prod/legacydata/files/$d; done"
        );
    }

    #[test]
    fn force_flag_is_present_only_when_requested() {
        let forced = CopyCommand {
            force: true,
            parallel: 4,
        };
        let plain = CopyCommand::default();
        let list = dirs(&["a", "b"]);
        assert!(forced.for_each_dir("/src", "/dst", &list).contains("xrdcp -f -r"));
        assert!(forced.single("/src/a", "/dst/a").contains(" -f "));
        assert!(!plain.for_each_dir("/src", "/dst", &list).contains(" -f"));
        assert!(!plain.single("/src/a", "/dst/a").contains(" -f"));
    }

    #[test]
    fn single_copy_template() {
        let cmd = CopyCommand {
            force: false,
            parallel: 8,
        }
        .single("/afs/x", "root://host//eos/x");
        assert_eq!(cmd, "xrdcp -r --parallel 8 /afs/x root://host//eos/x");
    }

    #[test]
    fn admin_path_strips_endpoint() {
        assert_eq!(
            admin_path(EOS_ENDPOINT, EOS_FILES_DIR, "ab/cd"),
            "/eos/zenodo/prod/legacydata/files/ab/cd"
        );
        // plain paths are used as they are
        assert_eq!(admin_path(EOS_ENDPOINT, "/eos/data/", "x"), "/eos/data/x");
    }

    #[test]
    fn dry_run_renders_comments() {
        assert_eq!(render("mkdir -p /eos/x", true), "# mkdir -p /eos/x");
        assert_eq!(render("mkdir -p /eos/x", false), "mkdir -p /eos/x");
        assert!(render("ls", true).starts_with(COMMENT_MARKER));
        assert!(!render("ls", false).starts_with(COMMENT_MARKER));
    }

    #[test]
    fn length_limit_is_inclusive() {
        let at_limit = "x".repeat(TRANSPORT_LIMIT);
        assert!(check_length("%1", &at_limit).is_ok());
        let over = "x".repeat(TRANSPORT_LIMIT + 1);
        match check_length("%1", &over) {
            Err(crate::Error::CommandTooLong { target, len, limit }) => {
                assert_eq!(target, "%1");
                assert_eq!(len, TRANSPORT_LIMIT + 1);
                assert_eq!(limit, TRANSPORT_LIMIT);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
