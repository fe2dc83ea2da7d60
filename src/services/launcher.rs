//! Launching local applications.

use std::process::Command;

use tracing::{debug, info};

use super::CollaboratorError;

pub trait AppLauncher: Send + Sync {
    /// Start `binary` without waiting for it to exit.
    fn launch(&self, binary: &str) -> Result<(), CollaboratorError>;
}

/// Spawns the program as a detached child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl AppLauncher for ProcessLauncher {
    fn launch(&self, binary: &str) -> Result<(), CollaboratorError> {
        let mut child = Command::new(binary)
            .spawn()
            .map_err(|e| CollaboratorError::Launch(format!("{binary}: {e}")))?;
        info!("launched {binary} (pid {})", child.id());

        // Reap the child so it does not linger as a zombie after it exits.
        let name = binary.to_owned();
        std::thread::spawn(move || {
            if let Ok(status) = child.wait() {
                debug!("{name} exited with {status}");
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_binary_is_launch_error() {
        let err = ProcessLauncher
            .launch("aide-no-such-application")
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Launch(msg) if msg.contains("aide-no-such-application")));
    }
}
