use std::io;
use std::process::{Command, Stdio};

/// Starts a resolved argument vector as a new process. Fire-and-forget: the
/// core never waits on the child or reads its output.
pub trait Launcher {
    fn launch(&self, argv: &[String]) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, argv: &[String]) -> io::Result<()> {
        let (bin, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty argv"))?;
        // Detach the child's stdio from ours; the TUI owns the terminal and
        // wrapped commands bring their own console/window.
        Command::new(bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}
