use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use termgrid::dispatch::{
    CommandProber, DispatchError, Dispatcher, HostFamily, Launcher,
};
use termgrid::model::{HostOs, Protocol, Server};

/// Prober over a fixed set of "installed" binaries, resolving each to
/// /usr/bin/<name>.
struct FakeProber {
    bins: BTreeMap<String, PathBuf>,
}

impl FakeProber {
    fn with(names: &[&str]) -> Self {
        FakeProber {
            bins: names
                .iter()
                .map(|n| (n.to_string(), PathBuf::from(format!("/usr/bin/{n}"))))
                .collect(),
        }
    }
}

impl CommandProber for FakeProber {
    fn probe(&self, name: &str) -> Option<PathBuf> {
        self.bins.get(name).cloned()
    }
}

/// Captures launched argvs instead of spawning anything.
#[derive(Clone, Default)]
struct RecordingLauncher {
    launched: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Launcher for RecordingLauncher {
    fn launch(&self, argv: &[String]) -> io::Result<()> {
        self.launched.lock().unwrap().push(argv.to_vec());
        Ok(())
    }
}

struct FailingLauncher;

impl Launcher for FailingLauncher {
    fn launch(&self, _argv: &[String]) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "permission denied",
        ))
    }
}

fn server(protocol: &str, username: &str, port: u16) -> Server {
    Server {
        id: Some(7),
        name: "lab-box".to_string(),
        host: "203.0.113.9".to_string(),
        protocol: Protocol::from(protocol.to_string()),
        username: username.to_string(),
        port,
        os: HostOs::Linux,
        tags: String::new(),
        notes: String::new(),
        group: None,
    }
}

fn unix(prober: FakeProber) -> Dispatcher<FakeProber, RecordingLauncher> {
    Dispatcher::new(prober, RecordingLauncher::default(), HostFamily::Unix)
}

#[test]
fn every_protocol_resolves_with_binary_host_and_port() {
    // No terminal emulators installed, so base commands come back unwrapped.
    let cases: &[(&str, &str, &[&str], u16)] = &[
        ("ssh", "root", &["ssh"], 22),
        ("sftp", "root", &["sftp"], 22),
        ("ftp", "", &["ftp"], 21),
        ("rdp", "admin", &["rdesktop"], 3389),
        ("vnc", "", &["vncviewer"], 5900),
    ];
    for (proto, user, bins, port) in cases {
        let d = unix(FakeProber::with(bins));
        let plan = d.resolve(&server(proto, user, 0)).unwrap();
        assert_eq!(
            plan.argv[0],
            format!("/usr/bin/{}", bins[0]),
            "argv[0] for {proto}"
        );
        let joined = plan.argv.join(" ");
        assert!(joined.contains("203.0.113.9"), "{proto}: {joined}");
        assert!(joined.contains(&port.to_string()), "{proto}: {joined}");
    }
}

#[test]
fn ssh_port_flag_precedes_port_value() {
    let d = unix(FakeProber::with(&["ssh"]));
    let plan = d.resolve(&server("ssh", "root", 2200)).unwrap();
    let p = plan.argv.iter().position(|a| a == "-p").unwrap();
    assert_eq!(plan.argv[p + 1], "2200");
    assert!(plan.argv.contains(&"root@203.0.113.9".to_string()));
}

#[test]
fn ssh_without_username_is_missing_credential() {
    let d = unix(FakeProber::with(&["ssh", "gnome-terminal"]));
    let err = d.dispatch(&server("ssh", "", 22)).unwrap_err();
    assert!(matches!(err, DispatchError::MissingCredential(_)));
    assert_eq!(err.reason(), "MissingCredential");
}

#[test]
fn ftp_with_no_clients_names_all_candidates() {
    let d = unix(FakeProber::with(&[]));
    let err = d.dispatch(&server("ftp", "", 0)).unwrap_err();
    assert!(matches!(err, DispatchError::BinaryNotFound(_)));
    let msg = err.to_string();
    for name in ["ftp", "lftp", "ncftp"] {
        assert!(msg.contains(name), "{msg:?} missing {name}");
    }
}

#[test]
fn vnc_with_unset_port_uses_5900() {
    let d = unix(FakeProber::with(&["vncviewer"]));
    let plan = d.resolve(&server("vnc", "", 0)).unwrap();
    assert!(plan.argv.contains(&"203.0.113.9:5900".to_string()));
}

#[test]
fn unsupported_protocol_names_the_value() {
    let d = unix(FakeProber::with(&["ssh", "telnet"]));
    let err = d.dispatch(&server("telnet", "root", 23)).unwrap_err();
    assert!(matches!(err, DispatchError::UnsupportedProtocol(_)));
    assert!(err.to_string().contains("telnet"));
}

#[test]
fn sftp_wraps_in_gnome_terminal_with_contiguous_base() {
    let d = unix(FakeProber::with(&["sftp", "gnome-terminal"]));
    let plan = d.resolve(&server("sftp", "root", 0)).unwrap();
    assert_eq!(plan.argv[0], "/usr/bin/gnome-terminal");
    assert_eq!(plan.argv[1], "--");
    assert_eq!(
        &plan.argv[2..],
        &[
            "/usr/bin/sftp".to_string(),
            "-P".to_string(),
            "22".to_string(),
            "root@203.0.113.9".to_string(),
        ]
    );
}

#[test]
fn rdp_never_wraps_even_with_emulator_present() {
    let d = unix(FakeProber::with(&["xfreerdp", "gnome-terminal"]));
    let plan = d.resolve(&server("rdp", "admin", 0)).unwrap();
    assert_eq!(plan.argv[0], "/usr/bin/xfreerdp");
    assert!(plan.argv.iter().any(|a| a == "/v:203.0.113.9:3389"));
}

#[test]
fn windows_text_sessions_launch_through_cmd_start() {
    let d = Dispatcher::new(
        FakeProber::with(&["ssh"]),
        RecordingLauncher::default(),
        HostFamily::Windows,
    );
    let plan = d.resolve(&server("ssh", "root", 0)).unwrap();
    assert_eq!(&plan.argv[..6], &["cmd", "/c", "start", "", "cmd", "/k"]);
    assert_eq!(plan.argv[6], "/usr/bin/ssh");
}

#[test]
fn resolve_is_idempotent_for_fixed_inputs() {
    let d = unix(FakeProber::with(&["ssh", "konsole"]));
    let s = server("ssh", "root", 0);
    let a = d.resolve(&s).unwrap();
    let b = d.resolve(&s).unwrap();
    assert_eq!(a.argv, b.argv);
    assert_eq!(a.message, b.message);
}

#[test]
fn dispatch_hands_the_wrapped_argv_to_the_launcher() {
    let launcher = RecordingLauncher::default();
    let d = Dispatcher::new(
        FakeProber::with(&["ssh", "xterm"]),
        launcher.clone(),
        HostFamily::Unix,
    );
    let plan = d.dispatch(&server("ssh", "root", 0)).unwrap();
    assert_eq!(plan.message, "Connecting to lab-box (SSH)…");
    assert_eq!(plan.argv[0], "/usr/bin/xterm");
    assert_eq!(plan.argv[1], "-e");

    let launched = launcher.launched.lock().unwrap();
    assert_eq!(launched.as_slice(), &[plan.argv.clone()]);
}

#[test]
fn launch_failure_surfaces_as_launch_error() {
    let d = Dispatcher::new(FakeProber::with(&["ssh"]), FailingLauncher, HostFamily::Unix);
    let err = d.dispatch(&server("ssh", "root", 22)).unwrap_err();
    assert!(matches!(err, DispatchError::LaunchError(_)));
    assert!(err.to_string().contains("permission denied"));
}
