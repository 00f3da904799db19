use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::model::{Server, SortField};

const STORE_FILE: &str = "servers.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
struct InventoryDoc {
    version: u32,
    next_id: u64,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    servers: Vec<Server>,
}

impl InventoryDoc {
    fn empty() -> Self {
        InventoryDoc {
            version: 1,
            next_id: 1,
            updated_at: None,
            servers: Vec::new(),
        }
    }
}

/// File-backed server inventory. Each operation reads the document, applies
/// the change, and writes it back atomically; the handle itself is stateless
/// and cheap to clone.
#[derive(Clone)]
pub struct Inventory {
    path: PathBuf,
}

impl Inventory {
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Inventory {
            path: dir.join(STORE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_doc(&self) -> Result<InventoryDoc> {
        if !self.path.exists() {
            return Ok(InventoryDoc::empty());
        }
        let bytes = fs::read(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let doc: InventoryDoc = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", self.path.display()))?;
        if doc.version != 1 {
            anyhow::bail!("unsupported inventory version {}", doc.version);
        }
        Ok(doc)
    }

    fn write_doc(&self, doc: &mut InventoryDoc) -> Result<()> {
        doc.updated_at = Some(now_stamp());
        let bytes = serde_json::to_vec_pretty(doc).context("serialize inventory")?;
        write_atomic(&self.path, &bytes)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    /// Records matching `query` (case-insensitive substring over name, host,
    /// tags, os and protocol), ordered by `sort` ignoring case.
    pub fn list(&self, query: &str, sort: SortField) -> Result<Vec<Server>> {
        let doc = self.read_doc()?;
        let mut servers: Vec<Server> = doc
            .servers
            .into_iter()
            .filter(|s| s.matches(query))
            .collect();
        servers.sort_by(|a, b| {
            let ord = sort.key(a).to_lowercase().cmp(&sort.key(b).to_lowercase());
            ord.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(servers)
    }

    pub fn get(&self, id: u64) -> Result<Option<Server>> {
        let doc = self.read_doc()?;
        Ok(doc.servers.into_iter().find(|s| s.id == Some(id)))
    }

    /// Lookup by numeric id or exact name, for CLI selectors.
    pub fn find(&self, selector: &str) -> Result<Option<Server>> {
        if let Ok(id) = selector.parse::<u64>()
            && let Some(s) = self.get(id)?
        {
            return Ok(Some(s));
        }
        let doc = self.read_doc()?;
        Ok(doc.servers.into_iter().find(|s| s.name == selector))
    }

    pub fn add(&self, mut server: Server) -> Result<Server> {
        server.validate().map_err(|e| anyhow!(e))?;
        let mut doc = self.read_doc()?;
        server.id = Some(doc.next_id);
        doc.next_id += 1;
        doc.servers.push(server.clone());
        self.write_doc(&mut doc)?;
        Ok(server)
    }

    pub fn update(&self, server: &Server) -> Result<()> {
        server.validate().map_err(|e| anyhow!(e))?;
        let id = server.id.context("cannot update an unsaved server")?;
        let mut doc = self.read_doc()?;
        let slot = doc
            .servers
            .iter_mut()
            .find(|s| s.id == Some(id))
            .with_context(|| format!("no server with id {}", id))?;
        *slot = server.clone();
        self.write_doc(&mut doc)
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        let mut doc = self.read_doc()?;
        let before = doc.servers.len();
        doc.servers.retain(|s| s.id != Some(id));
        if doc.servers.len() == before {
            anyhow::bail!("no server with id {}", id);
        }
        self.write_doc(&mut doc)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.read_doc()?.servers.len())
    }

    /// Seed a handful of example records into an empty store. Returns the
    /// number added (0 when the store already has records).
    pub fn seed_demo(&self) -> Result<usize> {
        if self.count()? > 0 {
            return Ok(0);
        }
        let samples = demo_servers();
        let n = samples.len();
        for s in samples {
            self.add(s)?;
        }
        Ok(n)
    }
}

fn now_stamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().context("store path has no parent")?;
    fs::create_dir_all(dir).context("create store dir")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).context("write temp file")?;
    fs::rename(&tmp, path).context("rename temp file")?;
    Ok(())
}

fn demo_servers() -> Vec<Server> {
    use crate::model::{HostOs, Protocol};

    let mk = |name: &str, host: &str, protocol: Protocol, username: &str, port: u16, os: HostOs, tags: &str, notes: &str| Server {
        id: None,
        name: name.to_string(),
        host: host.to_string(),
        protocol,
        username: username.to_string(),
        port,
        os,
        tags: tags.to_string(),
        notes: notes.to_string(),
        group: None,
    };

    vec![
        mk(
            "hypervisor-1",
            "192.168.1.10",
            Protocol::Ssh,
            "root",
            22,
            HostOs::Linux,
            "proxmox,hypervisor,cluster",
            "primary virtualization node",
        ),
        mk(
            "dc-windows",
            "192.168.4.5",
            Protocol::Rdp,
            "administrator",
            3389,
            HostOs::Windows,
            "ad,dc,windows-server",
            "domain controller",
        ),
        mk(
            "nas",
            "192.168.1.100",
            Protocol::Ssh,
            "admin",
            22,
            HostOs::Linux,
            "nas,storage,backup",
            "backup target",
        ),
        mk(
            "ftp-drop",
            "192.168.1.50",
            Protocol::Ftp,
            "ftpuser",
            21,
            HostOs::Linux,
            "ftp,files",
            "",
        ),
        mk(
            "sftp-secure",
            "192.168.1.51",
            Protocol::Sftp,
            "secure",
            22,
            HostOs::Linux,
            "sftp,files",
            "",
        ),
        mk(
            "edge-router",
            "192.168.1.1",
            Protocol::Ssh,
            "admin",
            22,
            HostOs::Network,
            "router,network",
            "main gateway",
        ),
        mk(
            "design-mac",
            "192.168.1.200",
            Protocol::Vnc,
            "",
            5900,
            HostOs::Mac,
            "vnc,desktop",
            "",
        ),
    ]
}
