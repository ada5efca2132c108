//! Terminal rendition of the recorder page.
//!
//! The page is an in-memory element tree that controllers mutate; the run
//! loop draws it and collects user actions through cliclack.

pub mod dialogs;
pub mod element;
pub mod page;

pub use dialogs::{Dialogs, TerminalDialogs};
pub use page::Page;
