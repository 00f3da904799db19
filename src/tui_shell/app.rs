use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dispatch::{Dispatcher, SystemLauncher, SystemProber, display_argv};
use crate::model::{Server, SortField};
use crate::store::Inventory;

use super::form::{FormOutcome, ServerForm};
use super::input::Input;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EntryKind {
    Info,
    Error,
    Detail,
}

#[derive(Clone, Debug)]
pub(super) struct LogEntry {
    pub(super) kind: EntryKind,
    pub(super) text: String,
}

pub(super) enum Modal {
    Form(ServerForm),
    ConfirmDelete { id: u64, name: String },
}

pub(super) struct App {
    pub(super) inventory: Inventory,
    pub(super) dispatcher: Dispatcher<SystemProber, SystemLauncher>,

    pub(super) servers: Vec<Server>,
    pub(super) selected: usize,

    pub(super) search: Input,
    pub(super) searching: bool,
    pub(super) sort: SortField,

    pub(super) log: Vec<LogEntry>,
    pub(super) modal: Option<Modal>,

    pub(super) quit: bool,
}

impl App {
    pub(super) fn load(inventory: Inventory) -> Self {
        let mut app = App {
            inventory,
            dispatcher: Dispatcher::system(),
            servers: Vec::new(),
            selected: 0,
            search: Input::default(),
            searching: false,
            sort: SortField::Name,
            log: Vec::new(),
            modal: None,
            quit: false,
        };
        app.refresh();
        app.push_info(format!("{} server(s) loaded", app.servers.len()));
        app.push_detail(
            "keys: Enter=connect  a=add  e=edit  d=delete  /=search  s=sort  r=refresh  q=quit"
                .to_string(),
        );
        app
    }

    pub(super) fn refresh(&mut self) {
        match self.inventory.list(&self.search.buf, self.sort) {
            Ok(servers) => {
                self.servers = servers;
                if self.selected >= self.servers.len() {
                    self.selected = self.servers.len().saturating_sub(1);
                }
            }
            Err(err) => self.push_error(format!("{err:#}")),
        }
    }

    pub(super) fn selected_server(&self) -> Option<&Server> {
        self.servers.get(self.selected)
    }

    pub(super) fn push_info(&mut self, text: String) {
        self.log.push(LogEntry {
            kind: EntryKind::Info,
            text,
        });
    }

    pub(super) fn push_error(&mut self, text: String) {
        self.log.push(LogEntry {
            kind: EntryKind::Error,
            text,
        });
    }

    pub(super) fn push_detail(&mut self, text: String) {
        self.log.push(LogEntry {
            kind: EntryKind::Detail,
            text,
        });
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) {
        if self.modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        if self.searching {
            self.handle_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Esc => {
                if !self.search.buf.is_empty() {
                    self.search.clear();
                    self.refresh();
                } else {
                    self.quit = true;
                }
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('s') => {
                self.sort = self.sort.next();
                self.refresh();
                self.push_info(format!("sorted by {}", self.sort.as_str()));
            }
            KeyCode::Char('r') => {
                self.refresh();
                self.push_info("refreshed".to_string());
            }
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.modal = Some(Modal::Form(ServerForm::add()));
            }
            KeyCode::Char('e') => match self.selected_server() {
                Some(s) => self.modal = Some(Modal::Form(ServerForm::edit(s))),
                None => self.push_error("no server selected".to_string()),
            },
            KeyCode::Char('d') | KeyCode::Delete => match self.selected_server() {
                Some(s) => {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: s.id.unwrap_or(0),
                        name: s.name.clone(),
                    });
                }
                None => self.push_error("no server selected".to_string()),
            },
            KeyCode::Enter => self.connect_selected(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if !self.servers.is_empty() {
                    self.selected = (self.selected + 1).min(self.servers.len() - 1);
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.servers.len().saturating_sub(1),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.search.clear();
                self.searching = false;
                self.refresh();
            }
            KeyCode::Enter | KeyCode::Tab => self.searching = false,
            KeyCode::Backspace => {
                self.search.backspace();
                self.refresh();
            }
            KeyCode::Delete => {
                self.search.delete();
                self.refresh();
            }
            KeyCode::Left => self.search.move_left(),
            KeyCode::Right => self.search.move_right(),
            KeyCode::Home => self.search.move_home(),
            KeyCode::End => self.search.move_end(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if !self.servers.is_empty() {
                    self.selected = (self.selected + 1).min(self.servers.len() - 1);
                }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.clear();
                self.refresh();
            }
            KeyCode::Char(c) => {
                self.search.insert_char(c);
                self.refresh();
            }
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        match modal {
            Modal::Form(form) => match form.handle_key(key) {
                FormOutcome::Pending => {}
                FormOutcome::Cancel => {
                    self.modal = None;
                    self.push_detail("cancelled".to_string());
                }
                FormOutcome::Invalid(msg) => self.push_error(msg),
                FormOutcome::Submit(server) => {
                    self.modal = None;
                    self.save_server(*server);
                }
            },
            Modal::ConfirmDelete { id, name } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let (id, name) = (*id, name.clone());
                    self.modal = None;
                    match self.inventory.delete(id) {
                        Ok(()) => {
                            self.push_info(format!("deleted '{name}'"));
                            self.refresh();
                        }
                        Err(err) => self.push_error(format!("{err:#}")),
                    }
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.modal = None;
                    self.push_detail("cancelled".to_string());
                }
                _ => {}
            },
        }
    }

    fn save_server(&mut self, server: Server) {
        let result = if server.id.is_none() {
            self.inventory
                .add(server)
                .map(|s| format!("added '{}' (id {})", s.name, s.id.unwrap_or(0)))
        } else {
            self.inventory
                .update(&server)
                .map(|_| format!("updated '{}'", server.name))
        };
        match result {
            Ok(msg) => {
                self.push_info(msg);
                self.refresh();
            }
            Err(err) => self.push_error(format!("{err:#}")),
        }
    }

    fn connect_selected(&mut self) {
        let Some(server) = self.selected_server().cloned() else {
            self.push_error("no server selected".to_string());
            return;
        };
        match self.dispatcher.dispatch(&server) {
            Ok(plan) => {
                self.push_info(plan.message);
                self.push_detail(format!("$ {}", display_argv(&plan.argv)));
            }
            Err(err) => self.push_error(err.to_string()),
        }
    }
}
