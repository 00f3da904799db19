use serde::{Deserialize, Serialize};

/// A single inventory record. `id` is `None` until the store assigns one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: Option<u64>,
    pub name: String,
    pub host: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub username: String,
    /// Positive port, or 0 meaning "use the protocol default".
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub os: HostOs,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub group: Option<String>,
}

impl Server {
    /// `port` if set, else the protocol default. 0 only for protocols
    /// with no known default.
    pub fn effective_port(&self) -> u16 {
        if self.port > 0 {
            self.port
        } else {
            self.protocol.default_port().unwrap_or(0)
        }
    }

    /// Field-level validation shared by the CLI and the TUI form.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.protocol.requires_username() && self.username.trim().is_empty() {
            return Err(format!(
                "username is required for {}",
                self.protocol.as_str().to_uppercase()
            ));
        }
        if self.port == 0 && self.protocol.default_port().is_none() {
            return Err("port must be positive".to_string());
        }
        Ok(())
    }

    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        if q.is_empty() {
            return true;
        }
        [
            self.name.as_str(),
            self.host.as_str(),
            self.tags.as_str(),
            self.os.as_str(),
            self.protocol.as_str(),
        ]
        .iter()
        .any(|f| f.to_lowercase().contains(&q))
    }
}

/// Connection protocol. Unknown values are carried as `Other` so a record
/// written by a newer version still loads; dispatch rejects them with
/// `UnsupportedProtocol` instead of the store failing to parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Protocol {
    Ssh,
    Sftp,
    Ftp,
    Rdp,
    Vnc,
    Other(String),
}

impl Protocol {
    pub const KNOWN: [Protocol; 5] = [
        Protocol::Ssh,
        Protocol::Sftp,
        Protocol::Ftp,
        Protocol::Rdp,
        Protocol::Vnc,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Ssh => "ssh",
            Protocol::Sftp => "sftp",
            Protocol::Ftp => "ftp",
            Protocol::Rdp => "rdp",
            Protocol::Vnc => "vnc",
            Protocol::Other(s) => s.as_str(),
        }
    }

    pub fn default_port(&self) -> Option<u16> {
        match self {
            Protocol::Ssh | Protocol::Sftp => Some(22),
            Protocol::Ftp => Some(21),
            Protocol::Rdp => Some(3389),
            Protocol::Vnc => Some(5900),
            Protocol::Other(_) => None,
        }
    }

    pub fn requires_username(&self) -> bool {
        matches!(self, Protocol::Ssh | Protocol::Sftp)
    }

    /// ssh/sftp/ftp clients are interactive console sessions and need a
    /// visible terminal on desktop hosts.
    pub fn is_text_mode(&self) -> bool {
        matches!(self, Protocol::Ssh | Protocol::Sftp | Protocol::Ftp)
    }
}

impl From<String> for Protocol {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "ssh" => Protocol::Ssh,
            "sftp" => Protocol::Sftp,
            "ftp" => Protocol::Ftp,
            "rdp" => Protocol::Rdp,
            "vnc" => Protocol::Vnc,
            _ => Protocol::Other(s),
        }
    }
}

impl From<Protocol> for String {
    fn from(p: Protocol) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational only: shown in the table, never consulted by dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Linux,
    Windows,
    Mac,
    Bsd,
    Network,
    #[default]
    Other,
}

impl HostOs {
    pub const ALL: [HostOs; 6] = [
        HostOs::Linux,
        HostOs::Windows,
        HostOs::Mac,
        HostOs::Bsd,
        HostOs::Network,
        HostOs::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            HostOs::Linux => "linux",
            HostOs::Windows => "windows",
            HostOs::Mac => "mac",
            HostOs::Bsd => "bsd",
            HostOs::Network => "network",
            HostOs::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<HostOs> {
        let s = s.to_lowercase();
        HostOs::ALL.into_iter().find(|o| o.as_str() == s)
    }
}

impl std::fmt::Display for HostOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Name,
    Os,
    Protocol,
}

impl SortField {
    pub fn as_str(&self) -> &str {
        match self {
            SortField::Name => "name",
            SortField::Os => "os",
            SortField::Protocol => "protocol",
        }
    }

    pub fn parse(s: &str) -> Option<SortField> {
        match s.to_lowercase().as_str() {
            "name" => Some(SortField::Name),
            "os" => Some(SortField::Os),
            "protocol" => Some(SortField::Protocol),
            _ => None,
        }
    }

    pub fn next(&self) -> SortField {
        match self {
            SortField::Name => SortField::Os,
            SortField::Os => SortField::Protocol,
            SortField::Protocol => SortField::Name,
        }
    }

    pub fn key<'a>(&self, s: &'a Server) -> &'a str {
        match self {
            SortField::Name => s.name.as_str(),
            SortField::Os => s.os.as_str(),
            SortField::Protocol => s.protocol.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(protocol: &str, username: &str, port: u16) -> Server {
        Server {
            id: None,
            name: "box".to_string(),
            host: "198.51.100.7".to_string(),
            protocol: Protocol::from(protocol.to_string()),
            username: username.to_string(),
            port,
            os: HostOs::Linux,
            tags: String::new(),
            notes: String::new(),
            group: None,
        }
    }

    #[test]
    fn unknown_protocol_round_trips_through_serde() {
        let p = Protocol::from("telnet".to_string());
        assert_eq!(p, Protocol::Other("telnet".to_string()));
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"telnet\"");
        let back: Protocol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn effective_port_defaults_per_protocol() {
        assert_eq!(server("ssh", "root", 0).effective_port(), 22);
        assert_eq!(server("sftp", "root", 0).effective_port(), 22);
        assert_eq!(server("ftp", "", 0).effective_port(), 21);
        assert_eq!(server("rdp", "", 0).effective_port(), 3389);
        assert_eq!(server("vnc", "", 0).effective_port(), 5900);
        assert_eq!(server("vnc", "", 5999).effective_port(), 5999);
    }

    #[test]
    fn validate_requires_username_for_ssh_family() {
        assert!(server("ssh", "", 22).validate().is_err());
        assert!(server("sftp", "", 22).validate().is_err());
        assert!(server("ftp", "", 21).validate().is_ok());
        assert!(server("ssh", "root", 22).validate().is_ok());
    }
}
