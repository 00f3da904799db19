pub mod dispatch;
pub mod model;
pub mod paths;
pub mod store;
pub mod tui;

mod tui_shell;
