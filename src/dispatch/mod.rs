//! Connection dispatch: resolve a server record into an external client
//! invocation and start it.
//!
//! Resolution is a pure function of the record, the local host family and
//! what the prober reports; launching is the only side effect and happens
//! last, so the same inputs always produce the same argument vector.

mod launch;
mod probe;
mod strategy;
mod terminal;

pub use launch::{Launcher, SystemLauncher};
pub use probe::{CommandProber, SystemProber};

use crate::model::Server;

/// OS family of the machine termgrid itself runs on. Decides which clients
/// are probed for RDP and how terminal wrapping works; unrelated to the
/// record's informational `os` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostFamily {
    Windows,
    Unix,
}

impl HostFamily {
    pub fn current() -> HostFamily {
        if cfg!(windows) {
            HostFamily::Windows
        } else {
            HostFamily::Unix
        }
    }
}

/// The resolved, ready-to-execute invocation plus a status line for the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchPlan {
    pub message: String,
    pub argv: Vec<String>,
}

/// Why a dispatch attempt failed. Returned by value; the caller renders the
/// message verbatim and may retry after fixing the condition.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),
    #[error("username is required for {0}")]
    MissingCredential(String),
    #[error("{0}")]
    BinaryNotFound(String),
    #[error("failed to launch client: {0}")]
    LaunchError(String),
}

impl DispatchError {
    pub fn reason(&self) -> &'static str {
        match self {
            DispatchError::UnsupportedProtocol(_) => "UnsupportedProtocol",
            DispatchError::MissingCredential(_) => "MissingCredential",
            DispatchError::BinaryNotFound(_) => "BinaryNotFound",
            DispatchError::LaunchError(_) => "LaunchError",
        }
    }
}

/// Shell-style rendering of an argv for status lines and dry runs. Quoting
/// is for display only; the spawned vector is never re-parsed.
pub fn display_argv(argv: &[String]) -> String {
    argv.iter()
        .map(|a| {
            if a.is_empty() || a.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
                format!("{a:?}")
            } else {
                a.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct Dispatcher<P, L> {
    prober: P,
    launcher: L,
    family: HostFamily,
}

impl Dispatcher<SystemProber, SystemLauncher> {
    /// Dispatcher wired to the real PATH and the real process table.
    pub fn system() -> Self {
        Dispatcher::new(SystemProber, SystemLauncher, HostFamily::current())
    }
}

impl<P: CommandProber, L: Launcher> Dispatcher<P, L> {
    pub fn new(prober: P, launcher: L, family: HostFamily) -> Self {
        Dispatcher {
            prober,
            launcher,
            family,
        }
    }

    /// Resolve the full invocation without starting anything. Used by
    /// `connect --dry-run` and by tests.
    pub fn resolve(&self, server: &Server) -> Result<LaunchPlan, DispatchError> {
        let base = strategy::resolve_base(server, self.family, &self.prober)?;
        let argv = terminal::wrap_for_terminal(
            base,
            server.protocol.is_text_mode(),
            self.family,
            &self.prober,
        );
        Ok(LaunchPlan {
            message: format!(
                "Connecting to {} ({})…",
                server.name,
                server.protocol.as_str().to_uppercase()
            ),
            argv,
        })
    }

    /// Resolve and start the client. No retries; a failure is terminal for
    /// this attempt and the caller decides whether to try again.
    pub fn dispatch(&self, server: &Server) -> Result<LaunchPlan, DispatchError> {
        let plan = self.resolve(server)?;
        self.launcher
            .launch(&plan.argv)
            .map_err(|e| DispatchError::LaunchError(e.to_string()))?;
        Ok(plan)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use crate::model::{HostOs, Protocol};

    /// Prober over a fixed set of "installed" binaries, each resolving to
    /// /bin/<name>.
    pub(crate) struct FakeProber {
        bins: BTreeMap<String, PathBuf>,
    }

    impl FakeProber {
        pub(crate) fn with(names: &[&str]) -> Self {
            FakeProber {
                bins: names
                    .iter()
                    .map(|n| (n.to_string(), PathBuf::from(format!("/bin/{n}"))))
                    .collect(),
            }
        }
    }

    impl CommandProber for FakeProber {
        fn probe(&self, name: &str) -> Option<PathBuf> {
            self.bins.get(name).cloned()
        }
    }

    pub(crate) fn server(protocol: Protocol, username: &str, port: u16) -> Server {
        Server {
            id: Some(1),
            name: "box".to_string(),
            host: "198.51.100.7".to_string(),
            protocol,
            username: username.to_string(),
            port,
            os: HostOs::Linux,
            tags: String::new(),
            notes: String::new(),
            group: None,
        }
    }
}
