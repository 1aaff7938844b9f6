use crossterm::event::{KeyEvent, MouseEvent};

use crate::mutation::PendingMutation;
use crate::record::{Health, Record};
use crate::remote::{PatchResponse, RemoteError};
use crate::store::LoadTicket;

/// Events that can occur during roster's execution
#[derive(Debug)]
pub enum Event {
    /// Quit the application
    Quit,
    /// A terminal error occurred
    Error(String),
    /// Render the UI
    Render,
    /// A key was pressed
    Key(KeyEvent),
    /// A mouse event occurred
    Mouse(MouseEvent),
    /// An action was triggered
    Action(Action),
    /// Clear the screen
    Clear,
    /// Heartbeat event
    Heartbeat,
    /// A load finished
    Loaded {
        /// Ticket handed out when the load started
        ticket: LoadTicket,
        /// Fetched records
        result: Result<Vec<Record>, RemoteError>,
    },
    /// A bulk patch finished
    Patched {
        /// The mutation the patch belongs to
        pending: PendingMutation,
        /// Remote response
        result: Result<PatchResponse, RemoteError>,
    },
}

/// Actions that can be performed in roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Exit
    Abort,
    /// Add a character to the query
    AddChar(char),
    /// Move cursor backward one character
    BackwardChar,
    /// Delete character before cursor
    BackwardDeleteChar,
    /// Delete word before cursor
    BackwardKillWord,
    /// Move cursor backward one word
    BackwardWord,
    /// Move cursor to beginning of line
    BeginningOfLine,
    /// Remove every health filter
    ClearFilters,
    /// Clear the query
    ClearQuery,
    /// Clear the screen
    ClearScreen,
    /// Cycle the power sort: none, ascending, descending
    CycleSort,
    /// Delete character under cursor
    DeleteChar,
    /// Deselect all records
    DeselectAll,
    /// Dismiss the last error
    DismissError,
    /// Move the row cursor down by N rows
    Down(u16),
    /// Move cursor to end of line
    EndOfLine,
    /// Jump to first row
    First,
    /// Move cursor forward one character
    ForwardChar,
    /// Move cursor forward one word
    ForwardWord,
    /// Ignore the action
    Ignore,
    /// Jump to last row
    Last,
    /// Mark the selected records as viewed
    MarkViewed,
    /// Mark the selected records as unviewed
    MarkUnviewed,
    /// Move the row cursor down by N pages
    PageDown(u16),
    /// Move the row cursor up by N pages
    PageUp(u16),
    /// Fetch the records again
    Reload,
    /// Set the query
    SetQuery(String),
    /// Toggle selection of the current row
    Toggle,
    /// Select every visible row, or deselect them if all are selected
    ToggleAll,
    /// Add or remove a health filter
    ToggleHealth(Health),
    /// Delete back to the start of the query
    UnixLineDiscard,
    /// Move the row cursor up by N rows
    Up(u16),
}

/// Parses an action string into an Action enum
pub fn parse_action(raw_action: &str) -> Option<Action> {
    use Action::*;

    let parts = raw_action.split_once([':', '(', ')']);
    let action;
    let mut arg = None;
    match parts {
        None => action = raw_action,
        Some((act, "")) => action = act,
        Some((act, a)) => {
            action = act;
            arg = Some(a.trim_end_matches(")").to_string())
        }
    }
    debug!("parse_action: action={action}, arg={arg:?}");

    let count = |arg: Option<String>| arg.and_then(|s| s.parse().ok()).unwrap_or(1);
    match action {
        "abort" => Some(Abort),
        "add-char" => arg.and_then(|a| a.chars().next()).map(AddChar),
        "backward-char" => Some(BackwardChar),
        "backward-delete-char" => Some(BackwardDeleteChar),
        "backward-kill-word" => Some(BackwardKillWord),
        "backward-word" => Some(BackwardWord),
        "beginning-of-line" => Some(BeginningOfLine),
        "clear-filters" => Some(ClearFilters),
        "clear-query" => Some(ClearQuery),
        "clear-screen" => Some(ClearScreen),
        "cycle-sort" | "toggle-sort" => Some(CycleSort),
        "delete-char" => Some(DeleteChar),
        "deselect-all" | "clear-selection" => Some(DeselectAll),
        "dismiss-error" => Some(DismissError),
        "down" => Some(Down(count(arg))),
        "end-of-line" => Some(EndOfLine),
        "first" | "top" => Some(First),
        "forward-char" => Some(ForwardChar),
        "forward-word" => Some(ForwardWord),
        "ignore" => Some(Ignore),
        "last" => Some(Last),
        "mark-viewed" => Some(MarkViewed),
        "mark-unviewed" => Some(MarkUnviewed),
        "page-down" => Some(PageDown(count(arg))),
        "page-up" => Some(PageUp(count(arg))),
        "reload" => Some(Reload),
        "set-query" => Some(SetQuery(arg.unwrap_or_default())),
        "toggle" => Some(Toggle),
        "toggle-all" => Some(ToggleAll),
        "toggle-healthy" => Some(ToggleHealth(Health::Healthy)),
        "toggle-injured" => Some(ToggleHealth(Health::Injured)),
        "toggle-critical" => Some(ToggleHealth(Health::Critical)),
        "toggle-health" => arg.and_then(|a| Health::try_from(a.as_str()).ok()).map(ToggleHealth),
        "unix-line-discard" => Some(UnixLineDiscard),
        "up" => Some(Up(count(arg))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arguments() {
        assert_eq!(parse_action("down:3"), Some(Action::Down(3)));
        assert_eq!(parse_action("up"), Some(Action::Up(1)));
        assert_eq!(parse_action("page-down(2)"), Some(Action::PageDown(2)));
        assert_eq!(parse_action("set-query:gaara"), Some(Action::SetQuery("gaara".into())));
        assert_eq!(
            parse_action("toggle-health:critical"),
            Some(Action::ToggleHealth(Health::Critical))
        );
    }

    #[test]
    fn rejects_unknown() {
        assert_eq!(parse_action("accept"), None);
        assert_eq!(parse_action("toggle-health:dead"), None);
        assert_eq!(parse_action("add-char"), None);
    }
}
