use std::path::PathBuf;

/// Answers whether a named executable exists on the search path.
pub trait CommandProber {
    fn probe(&self, name: &str) -> Option<PathBuf>;
}

/// PATH lookup backed by `which`. Stateless; every call re-scans the search
/// path, so a client installed mid-session is picked up on the next dispatch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProber;

impl CommandProber for SystemProber {
    fn probe(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}
