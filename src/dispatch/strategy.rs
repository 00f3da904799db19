use std::path::PathBuf;

use crate::model::{Protocol, Server};

use super::probe::CommandProber;
use super::{DispatchError, HostFamily};

/// Resolve the protocol-specific client invocation for `server`, before any
/// terminal wrapping. Probes candidate binaries in preference order and
/// shapes the arguments to whichever client was found.
pub(super) fn resolve_base(
    server: &Server,
    family: HostFamily,
    prober: &dyn CommandProber,
) -> Result<Vec<String>, DispatchError> {
    let port = server.effective_port();

    match &server.protocol {
        Protocol::Ssh => {
            require_username(server)?;
            let ssh = probe_one(prober, "ssh", "no 'ssh' on PATH; install the OpenSSH Client")?;
            Ok(vec![
                path_arg(ssh),
                format!("{}@{}", server.username, server.host),
                "-p".to_string(),
                port.to_string(),
            ])
        }

        Protocol::Sftp => {
            require_username(server)?;
            let sftp = probe_one(prober, "sftp", "no 'sftp' on PATH; install the OpenSSH Client")?;
            Ok(vec![
                path_arg(sftp),
                "-P".to_string(),
                port.to_string(),
                format!("{}@{}", server.username, server.host),
            ])
        }

        Protocol::Ftp => {
            let (name, path) = probe_first(
                prober,
                &["ftp", "lftp", "ncftp"],
                "no FTP client found; install 'ftp', 'lftp' or 'ncftp'",
            )?;
            if name == "lftp" {
                // lftp takes a URL instead of positional host/port.
                let url = if server.username.is_empty() {
                    format!("ftp://{}:{}", server.host, port)
                } else {
                    format!("ftp://{}@{}:{}", server.username, server.host, port)
                };
                Ok(vec![path_arg(path), url])
            } else {
                Ok(vec![path_arg(path), server.host.clone(), port.to_string()])
            }
        }

        Protocol::Rdp => {
            if family == HostFamily::Windows {
                let mstsc = probe_one(
                    prober,
                    "mstsc",
                    "no 'mstsc' on PATH (Windows Remote Desktop client)",
                )?;
                Ok(vec![
                    path_arg(mstsc),
                    format!("/v:{}:{}", server.host, port),
                    "/prompt".to_string(),
                ])
            } else {
                let (name, path) = probe_first(
                    prober,
                    &["rdesktop", "xfreerdp", "remmina"],
                    "no RDP client found; install 'rdesktop', 'xfreerdp' or 'remmina'",
                )?;
                if name == "xfreerdp" {
                    let mut argv =
                        vec![path_arg(path), format!("/v:{}:{}", server.host, port)];
                    if !server.username.is_empty() {
                        argv.push(format!("/u:{}", server.username));
                    }
                    Ok(argv)
                } else {
                    Ok(vec![path_arg(path), format!("{}:{}", server.host, port)])
                }
            }
        }

        Protocol::Vnc => {
            let (_, path) = probe_first(
                prober,
                &["vncviewer", "realvnc", "tigervncviewer", "xtightvncviewer"],
                "no VNC client found; install a VNC viewer such as TigerVNC (vncviewer)",
            )?;
            Ok(vec![path_arg(path), format!("{}:{}", server.host, port)])
        }

        Protocol::Other(p) => Err(DispatchError::UnsupportedProtocol(p.clone())),
    }
}

fn require_username(server: &Server) -> Result<(), DispatchError> {
    if server.username.is_empty() {
        return Err(DispatchError::MissingCredential(
            server.protocol.as_str().to_uppercase(),
        ));
    }
    Ok(())
}

fn probe_one(
    prober: &dyn CommandProber,
    name: &str,
    missing: &str,
) -> Result<PathBuf, DispatchError> {
    prober
        .probe(name)
        .ok_or_else(|| DispatchError::BinaryNotFound(missing.to_string()))
}

/// First candidate present on the search path, with the candidate name kept
/// so callers can shape arguments per client.
fn probe_first(
    prober: &dyn CommandProber,
    candidates: &[&'static str],
    missing: &str,
) -> Result<(&'static str, PathBuf), DispatchError> {
    for name in candidates {
        if let Some(path) = prober.probe(name) {
            return Ok((name, path));
        }
    }
    Err(DispatchError::BinaryNotFound(missing.to_string()))
}

fn path_arg(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::{FakeProber, server};

    #[test]
    fn ssh_builds_user_at_host_with_port_flag() {
        let prober = FakeProber::with(&["ssh"]);
        let argv = resolve_base(
            &server(Protocol::Ssh, "root", 2222),
            HostFamily::Unix,
            &prober,
        )
        .unwrap();
        assert_eq!(argv, vec!["/bin/ssh", "root@198.51.100.7", "-p", "2222"]);
    }

    #[test]
    fn sftp_uses_capital_p_before_target() {
        let prober = FakeProber::with(&["sftp"]);
        let argv = resolve_base(
            &server(Protocol::Sftp, "root", 0),
            HostFamily::Unix,
            &prober,
        )
        .unwrap();
        assert_eq!(argv, vec!["/bin/sftp", "-P", "22", "root@198.51.100.7"]);
    }

    #[test]
    fn ftp_prefers_plain_ftp_with_positional_args() {
        let prober = FakeProber::with(&["ftp", "lftp", "ncftp"]);
        let argv = resolve_base(&server(Protocol::Ftp, "", 0), HostFamily::Unix, &prober).unwrap();
        assert_eq!(argv, vec!["/bin/ftp", "198.51.100.7", "21"]);
    }

    #[test]
    fn lftp_fallback_builds_url_with_username() {
        let prober = FakeProber::with(&["lftp"]);
        let argv = resolve_base(
            &server(Protocol::Ftp, "anonymous", 2121),
            HostFamily::Unix,
            &prober,
        )
        .unwrap();
        assert_eq!(argv, vec!["/bin/lftp", "ftp://anonymous@198.51.100.7:2121"]);

        let argv = resolve_base(&server(Protocol::Ftp, "", 0), HostFamily::Unix, &prober).unwrap();
        assert_eq!(argv, vec!["/bin/lftp", "ftp://198.51.100.7:21"]);
    }

    #[test]
    fn rdp_on_windows_uses_mstsc_with_prompt() {
        let prober = FakeProber::with(&["mstsc"]);
        let argv = resolve_base(
            &server(Protocol::Rdp, "admin", 0),
            HostFamily::Windows,
            &prober,
        )
        .unwrap();
        assert_eq!(argv, vec!["/bin/mstsc", "/v:198.51.100.7:3389", "/prompt"]);
    }

    #[test]
    fn rdp_xfreerdp_gets_slash_style_args_and_optional_user() {
        let prober = FakeProber::with(&["xfreerdp"]);
        let argv = resolve_base(
            &server(Protocol::Rdp, "admin", 0),
            HostFamily::Unix,
            &prober,
        )
        .unwrap();
        assert_eq!(
            argv,
            vec!["/bin/xfreerdp", "/v:198.51.100.7:3389", "/u:admin"]
        );

        let argv = resolve_base(&server(Protocol::Rdp, "", 0), HostFamily::Unix, &prober).unwrap();
        assert_eq!(argv, vec!["/bin/xfreerdp", "/v:198.51.100.7:3389"]);
    }

    #[test]
    fn rdp_rdesktop_wins_over_xfreerdp_and_takes_positional_target() {
        let prober = FakeProber::with(&["rdesktop", "xfreerdp"]);
        let argv = resolve_base(
            &server(Protocol::Rdp, "admin", 0),
            HostFamily::Unix,
            &prober,
        )
        .unwrap();
        assert_eq!(argv, vec!["/bin/rdesktop", "198.51.100.7:3389"]);
    }

    #[test]
    fn vnc_probes_viewer_candidates_in_order() {
        let prober = FakeProber::with(&["xtightvncviewer"]);
        let argv = resolve_base(&server(Protocol::Vnc, "", 0), HostFamily::Unix, &prober).unwrap();
        assert_eq!(argv, vec!["/bin/xtightvncviewer", "198.51.100.7:5900"]);
    }

    #[test]
    fn missing_credential_reported_before_probing() {
        // Prober has no ssh at all; the credential failure still wins.
        let prober = FakeProber::with(&[]);
        let err = resolve_base(&server(Protocol::Ssh, "", 22), HostFamily::Unix, &prober)
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingCredential(_)));
    }

    #[test]
    fn exhausted_ftp_candidates_name_all_three() {
        let prober = FakeProber::with(&[]);
        let err = resolve_base(&server(Protocol::Ftp, "", 0), HostFamily::Unix, &prober)
            .unwrap_err();
        let msg = err.to_string();
        for name in ["ftp", "lftp", "ncftp"] {
            assert!(msg.contains(name), "{msg:?} should mention {name}");
        }
    }
}
