//! Command handlers, one submodule per subcommand.
//!
//! - `run`: the interactive recorder page
//! - `list`: print the records stored on the memo server
//! - `config`: open the configuration file in an editor
//! - `list_devices`: list available audio input devices
//! - `logs`: display recent log entries

pub mod config;
pub mod list;
pub mod list_devices;
pub mod logs;
pub mod run;

pub use config::handle_config;
pub use list::handle_list;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use run::handle_run;
