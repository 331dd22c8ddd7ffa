//! External program launching.
//!
//! Documents open in the viewer, detached. Notes and bibliography files open
//! in the editor in the foreground, with the terminal UI suspended until the
//! editor exits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, ExitStatus, Stdio};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use thiserror::Error;

use toshokan_core::{AppsConfig, OpenTarget};

/// Errors from launching external programs; shown on the status line.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no {0} configured")]
    NotConfigured(&'static str),

    #[error("document not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("cannot create {}: {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Starts the configured viewer and editor.
#[derive(Debug, Clone)]
pub struct Launcher {
    apps: AppsConfig,
}

impl Launcher {
    pub fn new(apps: AppsConfig) -> Self {
        Self { apps }
    }

    pub fn open(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        target: OpenTarget,
        path: &Path,
    ) -> Result<(), LaunchError> {
        match target {
            OpenTarget::Document => self.view(path),
            OpenTarget::Notes | OpenTarget::Bibliography => self.edit(terminal, path),
        }
    }

    fn view(&self, path: &Path) -> Result<(), LaunchError> {
        if !path.exists() {
            return Err(LaunchError::Missing(path.to_path_buf()));
        }
        let (program, args) =
            split_command(&self.apps.pdf_viewer).ok_or(LaunchError::NotConfigured("viewer"))?;

        let mut child = process::Command::new(program)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;
        tracing::debug!(program, path = %path.display(), "viewer started");

        // Reap the viewer when it exits.
        std::thread::spawn(move || child.wait());
        Ok(())
    }

    fn edit(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        path: &Path,
    ) -> Result<(), LaunchError> {
        let (program, args) =
            split_command(&self.apps.editor).ok_or(LaunchError::NotConfigured("editor"))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LaunchError::Prepare {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

        let status = process::Command::new(program).args(args).arg(path).status();

        enable_raw_mode()?;
        execute!(terminal.backend_mut(), EnterAlternateScreen)?;
        terminal.clear()?;

        let status = status.map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(LaunchError::Failed {
                program: program.to_string(),
                status,
            });
        }
        tracing::debug!(program, path = %path.display(), "editor exited");
        Ok(())
    }
}

/// Split a configured command like `"code --wait"` into program and arguments.
fn split_command(command: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("vim"), Some(("vim", vec![])));
        assert_eq!(
            split_command("  code --wait -n "),
            Some(("code", vec!["--wait", "-n"]))
        );
        assert_eq!(split_command("   "), None);
    }

    #[test]
    fn test_missing_document() {
        let dir = TempDir::new().unwrap();
        let launcher = Launcher::new(AppsConfig::default());
        let err = launcher.view(&dir.path().join("gone.pdf")).unwrap_err();
        assert!(matches!(err, LaunchError::Missing(_)));
    }

    #[test]
    fn test_unconfigured_viewer() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("a_1_b.pdf");
        fs::write(&doc, b"%PDF").unwrap();
        let launcher = Launcher::new(AppsConfig {
            editor: "vim".into(),
            pdf_viewer: String::new(),
        });
        assert!(matches!(
            launcher.view(&doc),
            Err(LaunchError::NotConfigured("viewer"))
        ));
    }
}
