//! Durable run state.
//!
//! The run state is written as pretty JSON through a temporary file and a
//! rename, so a crash mid-write leaves the previous checkpoint intact.

use std::path::Path;

use lintgraph_core::state::RunState;
use lintgraph_core::STATE_VERSION;
use lintgraph_util::errors::{LintError, LintResult};
use lintgraph_util::fs::write_atomic;

/// Persist `state` to `path`.
pub fn save(path: &Path, state: &RunState) -> LintResult<()> {
    let json = serde_json::to_string_pretty(state).map_err(|e| LintError::Generic {
        message: format!("Failed to serialize run state: {e}"),
    })?;
    write_atomic(path, json.as_bytes()).map_err(|e| {
        LintError::Generic {
            message: format!("Failed to write run state {}: {e}", path.display()),
        }
        .into()
    })
}

/// Load a checkpoint. Returns `Ok(None)` when `path` does not exist.
pub fn load(path: &Path) -> LintResult<Option<RunState>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LintError::Generic {
                message: format!("Failed to read run state {}: {e}", path.display()),
            }
            .into())
        }
    };

    let state: RunState = serde_json::from_str(&content).map_err(|e| LintError::Generic {
        message: format!("Invalid run state {}: {e}", path.display()),
    })?;
    if state.version != STATE_VERSION {
        return Err(LintError::Generic {
            message: format!(
                "Run state {} has version {}, expected {STATE_VERSION}",
                path.display(),
                state.version
            ),
        }
        .into());
    }
    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load(&tmp.path().join("state.json")).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("state.json");
        let state = RunState::new(3);
        save(&path, &state).unwrap();
        assert_eq!(load(&path).unwrap(), Some(state));
        let files = std::fs::read_dir(tmp.path().join("out")).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.json");
        let mut state = RunState::new(1);
        state.version = STATE_VERSION + 1;
        save(&path, &state).unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn garbage_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_err());
    }
}
