use crossterm::event::{KeyCode, KeyEvent};

use crate::model::{HostOs, Protocol, Server};

use super::input::Input;

const DEFAULT_PORT_STRINGS: [&str; 4] = ["22", "21", "3389", "5900"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Field {
    Name,
    Host,
    Protocol,
    Username,
    Port,
    Os,
    Tags,
    Group,
    Notes,
}

const FIELDS: [Field; 9] = [
    Field::Name,
    Field::Host,
    Field::Protocol,
    Field::Username,
    Field::Port,
    Field::Os,
    Field::Tags,
    Field::Group,
    Field::Notes,
];

impl Field {
    pub(super) fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Host => "Host",
            Field::Protocol => "Protocol",
            Field::Username => "Username",
            Field::Port => "Port",
            Field::Os => "OS",
            Field::Tags => "Tags",
            Field::Group => "Group",
            Field::Notes => "Notes",
        }
    }
}

pub(super) enum FormOutcome {
    Pending,
    Cancel,
    Submit(Box<Server>),
    Invalid(String),
}

/// Add/edit modal state. Text fields are line editors; protocol and OS are
/// cycled with Left/Right.
pub(super) struct ServerForm {
    pub(super) title: String,
    id: Option<u64>,
    pub(super) name: Input,
    pub(super) host: Input,
    pub(super) username: Input,
    pub(super) port: Input,
    pub(super) tags: Input,
    pub(super) group: Input,
    pub(super) notes: Input,
    pub(super) protocol_idx: usize,
    pub(super) os_idx: usize,
    pub(super) active: usize,
}

impl ServerForm {
    pub(super) fn add() -> Self {
        ServerForm {
            title: "Add server".to_string(),
            id: None,
            name: Input::default(),
            host: Input::default(),
            username: Input::default(),
            port: Input::from("22"),
            tags: Input::default(),
            group: Input::default(),
            notes: Input::default(),
            protocol_idx: 0,
            os_idx: 0,
            active: 0,
        }
    }

    pub(super) fn edit(server: &Server) -> Self {
        let protocol_idx = Protocol::KNOWN
            .iter()
            .position(|p| *p == server.protocol)
            .unwrap_or(0);
        let os_idx = HostOs::ALL
            .iter()
            .position(|o| *o == server.os)
            .unwrap_or(HostOs::ALL.len() - 1);
        ServerForm {
            title: format!("Edit server: {}", server.name),
            id: server.id,
            name: Input::from(&server.name),
            host: Input::from(&server.host),
            username: Input::from(&server.username),
            port: Input::from(&server.effective_port().to_string()),
            tags: Input::from(&server.tags),
            group: Input::from(server.group.as_deref().unwrap_or("")),
            notes: Input::from(&server.notes),
            protocol_idx,
            os_idx,
            active: 0,
        }
    }

    pub(super) fn fields(&self) -> &'static [Field] {
        &FIELDS
    }

    pub(super) fn active_field(&self) -> Field {
        FIELDS[self.active]
    }

    pub(super) fn protocol(&self) -> &Protocol {
        &Protocol::KNOWN[self.protocol_idx]
    }

    pub(super) fn os(&self) -> HostOs {
        HostOs::ALL[self.os_idx]
    }

    pub(super) fn value_of(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.buf.clone(),
            Field::Host => self.host.buf.clone(),
            Field::Protocol => self.protocol().as_str().to_string(),
            Field::Username => self.username.buf.clone(),
            Field::Port => self.port.buf.clone(),
            Field::Os => self.os().as_str().to_string(),
            Field::Tags => self.tags.buf.clone(),
            Field::Group => self.group.buf.clone(),
            Field::Notes => self.notes.buf.clone(),
        }
    }

    fn text_input_mut(&mut self) -> Option<&mut Input> {
        match self.active_field() {
            Field::Name => Some(&mut self.name),
            Field::Host => Some(&mut self.host),
            Field::Username => Some(&mut self.username),
            Field::Port => Some(&mut self.port),
            Field::Tags => Some(&mut self.tags),
            Field::Group => Some(&mut self.group),
            Field::Notes => Some(&mut self.notes),
            Field::Protocol | Field::Os => None,
        }
    }

    fn cycle_protocol(&mut self, dir: isize) {
        let n = Protocol::KNOWN.len();
        self.protocol_idx = (self.protocol_idx as isize + dir).rem_euclid(n as isize) as usize;
        // Follow the new protocol's default port unless the user typed a
        // custom one.
        let current = self.port.buf.trim().to_string();
        if current.is_empty() || DEFAULT_PORT_STRINGS.contains(&current.as_str()) {
            if let Some(p) = self.protocol().default_port() {
                self.port.set(p.to_string());
            }
        }
    }

    fn cycle_os(&mut self, dir: isize) {
        let n = HostOs::ALL.len();
        self.os_idx = (self.os_idx as isize + dir).rem_euclid(n as isize) as usize;
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => {
                return match self.to_server() {
                    Ok(server) => FormOutcome::Submit(Box::new(server)),
                    Err(msg) => FormOutcome::Invalid(msg),
                };
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.active = (self.active + FIELDS.len() - 1) % FIELDS.len();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.active = (self.active + 1) % FIELDS.len();
            }
            KeyCode::Left => match self.active_field() {
                Field::Protocol => self.cycle_protocol(-1),
                Field::Os => self.cycle_os(-1),
                _ => {
                    if let Some(input) = self.text_input_mut() {
                        input.move_left();
                    }
                }
            },
            KeyCode::Right => match self.active_field() {
                Field::Protocol => self.cycle_protocol(1),
                Field::Os => self.cycle_os(1),
                _ => {
                    if let Some(input) = self.text_input_mut() {
                        input.move_right();
                    }
                }
            },
            KeyCode::Home => {
                if let Some(input) = self.text_input_mut() {
                    input.move_home();
                }
            }
            KeyCode::End => {
                if let Some(input) = self.text_input_mut() {
                    input.move_end();
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.text_input_mut() {
                    input.backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = self.text_input_mut() {
                    input.delete();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.text_input_mut() {
                    input.insert_char(c);
                }
            }
            _ => {}
        }
        FormOutcome::Pending
    }

    fn to_server(&self) -> Result<Server, String> {
        let port: u16 = {
            let raw = self.port.buf.trim();
            if raw.is_empty() {
                0
            } else {
                raw.parse().map_err(|_| format!("invalid port: {raw}"))?
            }
        };
        let group = self.group.buf.trim();
        let server = Server {
            id: self.id,
            name: self.name.buf.trim().to_string(),
            host: self.host.buf.trim().to_string(),
            protocol: self.protocol().clone(),
            username: self.username.buf.trim().to_string(),
            port,
            os: self.os(),
            tags: self.tags.buf.trim().to_string(),
            notes: self.notes.buf.trim().to_string(),
            group: if group.is_empty() {
                None
            } else {
                Some(group.to_string())
            },
        };
        server.validate()?;
        Ok(server)
    }
}
