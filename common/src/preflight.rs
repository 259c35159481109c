//! Checks for local tools the orchestrator shells out to

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("You need to have \"{0}\" installed")]
    MissingExecutable(String),
}

/// Ensure every program in `names` can be found on `PATH`
pub fn require_executables(names: &[&str]) -> Result<(), Error> {
    for name in names {
        match which::which(name) {
            Ok(path) => tracing::debug!("found {} at {}", name, path.display()),
            Err(_) => return Err(Error::MissingExecutable(name.to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_is_always_available() {
        require_executables(&["sh"]).unwrap();
    }

    #[test]
    fn first_missing_tool_is_reported() {
        let error = require_executables(&["sh", "afseos-definitely-not-installed"]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "You need to have \"afseos-definitely-not-installed\" installed"
        );
    }
}
