pub mod commands;
pub mod core;
pub mod help;
pub mod output;
pub mod registry;
pub mod shell_context;
pub mod system_clock;
pub mod table;
mod shell;

pub use shell::run_cli;
