//! Redux-style store for follow-mode state.
//!
//! The controller never edits [`FollowState`] in place; it dispatches named
//! actions and diffs snapshots. Prefix-editing policy (what backspace
//! means) lives in the reducer, not in callers.

/// Snapshot of follow-mode state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowState {
    pub enabled: bool,
    /// Typed prefix so far.
    pub keys: String,
    pub new_tab: bool,
}

/// Named state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowAction {
    Enable { new_tab: bool },
    Disable,
    KeyPress { key: char },
    Backspace,
}

/// Pure reducer from one snapshot to the next.
pub fn reduce(state: &FollowState, action: &FollowAction) -> FollowState {
    match action {
        FollowAction::Enable { new_tab } => FollowState {
            enabled: true,
            keys: String::new(),
            new_tab: *new_tab,
        },
        FollowAction::Disable => FollowState {
            enabled: false,
            ..state.clone()
        },
        FollowAction::KeyPress { key } => {
            let mut next = state.clone();
            next.keys.push(*key);
            next
        }
        FollowAction::Backspace => {
            let mut next = state.clone();
            next.keys.pop();
            next
        }
    }
}

/// Owns the authoritative [`FollowState`].
#[derive(Debug, Default)]
pub struct Store {
    state: FollowState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: FollowAction) {
        self.state = reduce(&self.state, &action);
    }

    pub fn state(&self) -> &FollowState {
        &self.state
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
