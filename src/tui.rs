use anyhow::Result;

use crate::store::Inventory;

pub fn run(inventory: Inventory) -> Result<()> {
    crate::tui_shell::run(inventory)
}
