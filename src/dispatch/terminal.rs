use super::HostFamily;
use super::probe::CommandProber;

const EMULATORS: [&str; 3] = ["gnome-terminal", "konsole", "xterm"];

/// Wrap a resolved client command in a terminal-emulator invocation when the
/// protocol is an interactive console session. GUI clients run as-is; a
/// desktop-less host with no emulator also runs the command as-is.
pub(super) fn wrap_for_terminal(
    base: Vec<String>,
    text_mode: bool,
    family: HostFamily,
    prober: &dyn CommandProber,
) -> Vec<String> {
    match family {
        HostFamily::Windows => {
            // `start ""` detaches; text sessions additionally get a fresh
            // console that stays open (`cmd /k`).
            let mut argv: Vec<String> = ["cmd", "/c", "start", ""]
                .iter()
                .map(|s| s.to_string())
                .collect();
            if text_mode {
                argv.push("cmd".to_string());
                argv.push("/k".to_string());
            }
            argv.extend(base);
            argv
        }

        HostFamily::Unix => {
            if !text_mode {
                return base;
            }
            let Some((name, path)) = EMULATORS
                .iter()
                .find_map(|name| prober.probe(name).map(|p| (*name, p)))
            else {
                return base;
            };
            let separator = if name == "gnome-terminal" { "--" } else { "-e" };
            let mut argv = vec![path.to_string_lossy().into_owned(), separator.to_string()];
            argv.extend(base);
            argv
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::FakeProber;

    fn base() -> Vec<String> {
        vec!["/bin/ssh".to_string(), "root@h".to_string()]
    }

    #[test]
    fn gnome_terminal_uses_double_dash_separator() {
        let prober = FakeProber::with(&["gnome-terminal", "konsole", "xterm"]);
        let argv = wrap_for_terminal(base(), true, HostFamily::Unix, &prober);
        assert_eq!(argv, vec!["/bin/gnome-terminal", "--", "/bin/ssh", "root@h"]);
    }

    #[test]
    fn konsole_and_xterm_use_dash_e() {
        let prober = FakeProber::with(&["konsole"]);
        let argv = wrap_for_terminal(base(), true, HostFamily::Unix, &prober);
        assert_eq!(argv, vec!["/bin/konsole", "-e", "/bin/ssh", "root@h"]);

        let prober = FakeProber::with(&["xterm"]);
        let argv = wrap_for_terminal(base(), true, HostFamily::Unix, &prober);
        assert_eq!(argv, vec!["/bin/xterm", "-e", "/bin/ssh", "root@h"]);
    }

    #[test]
    fn no_emulator_runs_base_unwrapped() {
        let prober = FakeProber::with(&[]);
        assert_eq!(wrap_for_terminal(base(), true, HostFamily::Unix, &prober), base());
    }

    #[test]
    fn gui_protocols_never_wrap_on_unix() {
        let prober = FakeProber::with(&["gnome-terminal"]);
        assert_eq!(wrap_for_terminal(base(), false, HostFamily::Unix, &prober), base());
    }

    #[test]
    fn windows_text_sessions_get_a_persistent_console() {
        let prober = FakeProber::with(&[]);
        let argv = wrap_for_terminal(base(), true, HostFamily::Windows, &prober);
        assert_eq!(
            argv,
            vec!["cmd", "/c", "start", "", "cmd", "/k", "/bin/ssh", "root@h"]
        );
    }

    #[test]
    fn windows_gui_sessions_only_detach() {
        let prober = FakeProber::with(&[]);
        let argv = wrap_for_terminal(base(), false, HostFamily::Windows, &prober);
        assert_eq!(argv, vec!["cmd", "/c", "start", "", "/bin/ssh", "root@h"]);
    }
}
