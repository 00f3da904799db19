use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::json;

use termgrid::dispatch::{Dispatcher, display_argv};
use termgrid::model::{HostOs, Protocol, Server, SortField};
use termgrid::store::Inventory;

#[derive(Parser)]
#[command(name = "termgrid")]
#[command(about = "Terminal server inventory with one-key connections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a server record
    Add {
        /// Display name
        name: String,
        /// Hostname or address
        host: String,
        /// ssh | sftp | ftp | rdp | vnc
        #[arg(long, default_value = "ssh")]
        protocol: String,
        #[arg(long, default_value = "")]
        username: String,
        /// Port (0 = protocol default)
        #[arg(long, default_value_t = 0)]
        port: u16,
        /// linux | windows | mac | bsd | network | other
        #[arg(long, default_value = "other")]
        os: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long)]
        group: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List server records
    List {
        /// Filter (matches name, host, tags, os, protocol)
        #[arg(long, default_value = "")]
        query: String,
        /// Sort by name | os | protocol
        #[arg(long, default_value = "name")]
        sort: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a server record by id or name
    Show {
        selector: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a server record by id or name
    Remove { selector: String },

    /// Resolve and launch the connection client for a record
    Connect {
        selector: String,
        /// Resolve and print the command without launching it
        #[arg(long)]
        dry_run: bool,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Seed example records into an empty inventory
    SeedDemo,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let inventory = open_inventory()?;
        return termgrid::tui::run(inventory);
    };

    let inventory = open_inventory()?;

    match command {
        Commands::Add {
            name,
            host,
            protocol,
            username,
            port,
            os,
            tags,
            notes,
            group,
            json,
        } => {
            let os = HostOs::parse(&os).with_context(|| format!("unknown os '{os}'"))?;
            let server = Server {
                id: None,
                name,
                host,
                protocol: Protocol::from(protocol),
                username,
                port,
                os,
                tags,
                notes,
                group,
            };
            let server = inventory.add(server)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&server).context("serialize server")?
                );
            } else {
                println!(
                    "added '{}' (id {})",
                    server.name,
                    server.id.unwrap_or(0)
                );
            }
        }

        Commands::List { query, sort, json } => {
            let sort = SortField::parse(&sort)
                .with_context(|| format!("unknown sort field '{sort}' (name|os|protocol)"))?;
            let servers = inventory.list(&query, sort)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&servers).context("serialize servers")?
                );
            } else {
                for s in servers {
                    println!(
                        "{:>4}  {:<20}  {:<18}  {:<5}  {:<12}  {:>5}  {}",
                        s.id.unwrap_or(0),
                        s.name,
                        s.host,
                        s.protocol.as_str(),
                        if s.username.is_empty() { "-" } else { s.username.as_str() },
                        s.effective_port(),
                        s.os.as_str(),
                    );
                }
            }
        }

        Commands::Show { selector, json } => {
            let server = require_server(&inventory, &selector)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&server).context("serialize server")?
                );
            } else {
                println!("id: {}", server.id.unwrap_or(0));
                println!("name: {}", server.name);
                println!("host: {}", server.host);
                println!("protocol: {}", server.protocol);
                println!("username: {}", server.username);
                println!("port: {}", server.effective_port());
                println!("os: {}", server.os);
                if !server.tags.is_empty() {
                    println!("tags: {}", server.tags);
                }
                if let Some(group) = &server.group {
                    println!("group: {}", group);
                }
                if !server.notes.is_empty() {
                    println!("notes: {}", server.notes);
                }
            }
        }

        Commands::Remove { selector } => {
            let server = require_server(&inventory, &selector)?;
            let id = server.id.context("record has no id")?;
            inventory.delete(id)?;
            println!("removed '{}'", server.name);
        }

        Commands::Connect {
            selector,
            dry_run,
            json,
        } => {
            let server = require_server(&inventory, &selector)?;
            let dispatcher = Dispatcher::system();
            let result = if dry_run {
                dispatcher.resolve(&server)
            } else {
                dispatcher.dispatch(&server)
            };
            match result {
                Ok(plan) => {
                    if json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "message": plan.message,
                                "argv": plan.argv,
                            }))
                            .context("serialize launch plan")?
                        );
                    } else {
                        println!("{}", plan.message);
                        println!("$ {}", display_argv(&plan.argv));
                    }
                }
                Err(err) => {
                    if json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "reason": err.reason(),
                                "message": err.to_string(),
                            }))
                            .context("serialize dispatch failure")?
                        );
                        std::process::exit(1);
                    }
                    return Err(anyhow!(err.to_string()));
                }
            }
        }

        Commands::SeedDemo => {
            let added = inventory.seed_demo()?;
            if added == 0 {
                println!("inventory is not empty; nothing seeded");
            } else {
                println!("seeded {} example server(s)", added);
            }
        }
    }

    Ok(())
}

fn open_inventory() -> Result<Inventory> {
    let dir = termgrid::paths::ensure_data_dir()?;
    Inventory::open(&dir)
}

fn require_server(inventory: &Inventory, selector: &str) -> Result<Server> {
    inventory
        .find(selector)?
        .with_context(|| format!("no server matching '{selector}'"))
}
