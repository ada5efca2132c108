//! Interactive prompts shown by the page.

use cliclack::{confirm, input};

/// Blocking user dialogs.
///
/// A dismissed prompt yields `None`; a dismissed confirmation counts as "no".
pub trait Dialogs {
    fn prompt(&mut self, message: &str) -> Option<String>;
    fn confirm(&mut self, message: &str) -> bool;
}

/// Dialogs drawn in the terminal with cliclack.
pub struct TerminalDialogs;

impl Dialogs for TerminalDialogs {
    fn prompt(&mut self, message: &str) -> Option<String> {
        match input(message).required(false).interact::<String>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Prompt dismissed: {e}");
                None
            }
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        confirm(message)
            .initial_value(false)
            .interact()
            .unwrap_or_else(|e| {
                tracing::debug!("Confirmation dismissed: {e}");
                false
            })
    }
}

#[cfg(test)]
pub mod testing {
    use super::Dialogs;
    use std::collections::VecDeque;

    /// Dialogs answering from queued responses.
    #[derive(Default)]
    pub struct ScriptedDialogs {
        pub prompts: VecDeque<Option<String>>,
        pub confirms: VecDeque<bool>,
        pub asked: Vec<String>,
    }

    impl Dialogs for ScriptedDialogs {
        fn prompt(&mut self, message: &str) -> Option<String> {
            self.asked.push(message.to_string());
            self.prompts.pop_front().flatten()
        }

        fn confirm(&mut self, message: &str) -> bool {
            self.asked.push(message.to_string());
            self.confirms.pop_front().unwrap_or(false)
        }
    }
}
