//! Navigation shell: which screen the visitor is on.
//!
//! Landing → Wizard → Loading → Results → Landing, with Wizard → Landing
//! when the visitor backs out of the first step.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ShellError;
use crate::quest::{Profile, Snapshot};

/// The four screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Landing,
    Wizard,
    Loading,
    Results,
}

impl Screen {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Screen) -> bool {
        use Screen::*;
        matches!(
            (self, target),
            (Landing, Wizard)
                | (Wizard, Landing)
                | (Wizard, Loading)
                | (Loading, Results)
                | (Results, Landing)
        )
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::Landing
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Landing => "landing",
            Self::Wizard => "wizard",
            Self::Loading => "loading",
            Self::Results => "results",
        };
        write!(f, "{s}")
    }
}

/// Signals the wizard sends to whoever hosts it.
pub trait HostNavigation {
    /// Visitor asked to begin the quest.
    fn start(&mut self) -> Result<(), ShellError>;
    /// Visitor backed out of the first step.
    fn exit(&mut self) -> Result<(), ShellError>;
    /// The last step finished with this profile.
    fn complete(&mut self, profile: Profile) -> Result<(), ShellError>;
}

/// Screen state plus the frozen results of the last completed quest.
#[derive(Debug, Clone, Default)]
pub struct Shell {
    screen: Screen,
    results: Option<Snapshot>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Results of the completed quest, kept from `complete` until `reset`.
    pub fn results(&self) -> Option<&Snapshot> {
        self.results.as_ref()
    }

    fn go(&mut self, target: Screen, action: &'static str) -> Result<(), ShellError> {
        if !self.screen.can_transition_to(target) {
            warn!(from = %self.screen, action, "Rejected screen transition");
            return Err(ShellError::InvalidTransition {
                from: self.screen,
                action,
            });
        }
        info!(from = %self.screen, to = %target, "Screen changed");
        self.screen = target;
        Ok(())
    }

    /// The cosmetic loading delay ended; show results.
    pub fn loading_elapsed(&mut self) -> Result<(), ShellError> {
        self.go(Screen::Results, "show results")
    }

    /// Leave the results and discard them.
    pub fn reset(&mut self) -> Result<(), ShellError> {
        self.go(Screen::Landing, "reset")?;
        self.results = None;
        Ok(())
    }
}

impl HostNavigation for Shell {
    fn start(&mut self) -> Result<(), ShellError> {
        self.go(Screen::Wizard, "start")
    }

    fn exit(&mut self) -> Result<(), ShellError> {
        self.go(Screen::Landing, "exit")
    }

    fn complete(&mut self, profile: Profile) -> Result<(), ShellError> {
        self.go(Screen::Loading, "complete")?;
        self.results = Some(Snapshot::build(profile));
        Ok(())
    }
}
