//! Quest wizard controller: six top-level steps, an interstitial between
//! them, and the profile the sub-forms fill in.
//!
//! The controller is synchronous and owns no timers. Whoever drives it
//! (see `crate::session`) starts the interstitial dwell when `advance`
//! reports `TransitionStarted` and calls `transition_complete` when it ends.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::model::{Profile, SectionPatch, TagField};
use super::pages::ActivePage;
use super::scoring::{self, ScoreBreakdown};

pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 6;

/// Step whose completion checks for compliance standards.
pub const GOVERNANCE_STEP: u8 = 5;

pub const COMPLIANCE_ADVISORY: &str = "Compliance standards are mandatory for global entities.";

/// A non-blocking notice shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub message: &'static str,
    pub raised_at: DateTime<Utc>,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Moved within the current step.
    PageChanged(ActivePage),
    /// The interstitial for `step` began. `advisory` is set when this
    /// raised the compliance advisory.
    TransitionStarted { step: u8, advisory: bool },
    /// Moved back to the previous top-level step.
    StepEntered(u8),
    /// Retreated past the first step; the host should leave the wizard.
    Exit,
    /// An interstitial is already running.
    Ignored,
}

/// Result of the interstitial ending.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    StepEntered(u8),
    /// The last step finished; carries the accumulated profile.
    Completed(Box<Profile>),
    NotTransitioning,
}

/// The wizard state machine.
#[derive(Debug, Clone)]
pub struct QuestWizard {
    step: u8,
    transitioning: bool,
    page: ActivePage,
    profile: Profile,
    stack_draft: String,
    advisory: Option<Advisory>,
}

impl Default for QuestWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestWizard {
    pub fn new() -> Self {
        Self {
            step: FIRST_STEP,
            transitioning: false,
            page: ActivePage::first_of(FIRST_STEP),
            profile: Profile::default(),
            stack_draft: String::new(),
            advisory: None,
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn page(&self) -> ActivePage {
        self.page
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn stack_draft(&self) -> &str {
        &self.stack_draft
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    /// Current engagement score.
    pub fn score(&self) -> u32 {
        scoring::score(self.step, &self.profile)
    }

    pub fn score_breakdown(&self) -> ScoreBreakdown {
        scoring::breakdown(self.step, &self.profile)
    }

    // ── Top-level navigation ────────────────────────────────────────────

    /// Finish the current step and begin the interstitial.
    pub fn advance(&mut self) -> NavOutcome {
        if self.transitioning {
            return NavOutcome::Ignored;
        }

        self.transitioning = true;

        let advisory = self.step == GOVERNANCE_STEP
            && self.profile.governance.compliance_standards.is_empty();
        if advisory {
            self.advisory = Some(Advisory {
                message: COMPLIANCE_ADVISORY,
                raised_at: Utc::now(),
            });
        }

        debug!(step = self.step, advisory, "Interstitial started");
        NavOutcome::TransitionStarted {
            step: self.step,
            advisory,
        }
    }

    /// End the interstitial: enter the next step, or hand back the profile
    /// if the last step just finished.
    pub fn transition_complete(&mut self) -> TransitionOutcome {
        if !self.transitioning {
            return TransitionOutcome::NotTransitioning;
        }
        self.transitioning = false;

        if self.step < LAST_STEP {
            self.enter(self.step + 1);
            TransitionOutcome::StepEntered(self.step)
        } else {
            TransitionOutcome::Completed(Box::new(self.profile.clone()))
        }
    }

    /// Go back one top-level step, or signal exit from the first one.
    pub fn retreat(&mut self) -> NavOutcome {
        if self.transitioning {
            return NavOutcome::Ignored;
        }
        if self.step > FIRST_STEP {
            self.enter(self.step - 1);
            NavOutcome::StepEntered(self.step)
        } else {
            NavOutcome::Exit
        }
    }

    // ── Sub-form navigation ─────────────────────────────────────────────

    /// Sub-form "next": next page, or `advance` from the last page.
    pub fn next_page(&mut self) -> NavOutcome {
        if self.transitioning {
            return NavOutcome::Ignored;
        }
        match self.page.next() {
            Some(page) => {
                self.page = page;
                NavOutcome::PageChanged(page)
            }
            None => self.advance(),
        }
    }

    /// Sub-form "previous": previous page, or `retreat` from the first page.
    pub fn prev_page(&mut self) -> NavOutcome {
        if self.transitioning {
            return NavOutcome::Ignored;
        }
        match self.page.prev() {
            Some(page) => {
                self.page = page;
                NavOutcome::PageChanged(page)
            }
            None => self.retreat(),
        }
    }

    fn enter(&mut self, step: u8) {
        self.step = step;
        self.page = ActivePage::first_of(step);
        debug!(step, "Entered step");
    }

    // ── Profile mutation ────────────────────────────────────────────────

    /// Shallow-merge a partial update into its section. Never moves the step.
    pub fn update_section(&mut self, patch: SectionPatch) {
        debug!(section = %patch.section(), "Section updated");
        self.profile.apply(patch);
    }

    /// Toggle a tag in one of the multi-select lists.
    /// Returns whether the tag is selected afterwards.
    pub fn toggle_tag(&mut self, field: TagField, tag: &str) -> bool {
        self.profile.tags_mut(field).toggle(tag)
    }

    /// Replace the text in the "add technology" input.
    pub fn set_stack_draft(&mut self, text: impl Into<String>) {
        self.stack_draft = text.into();
    }

    /// Commit the stack draft: append it to the stacks once, remember it as
    /// the custom stack and clear the input. Blank drafts are ignored.
    pub fn add_custom_stack(&mut self) -> Option<String> {
        let entry = self.stack_draft.trim().to_string();
        if entry.is_empty() {
            return None;
        }
        self.profile.tech.stacks.insert(&entry);
        self.profile.tech.custom_stack = Some(entry.clone());
        self.stack_draft.clear();
        Some(entry)
    }

    /// Clear the advisory. Returns `false` if none was showing.
    pub fn dismiss_advisory(&mut self) -> bool {
        self.advisory.take().is_some()
    }

    /// Serializable snapshot of the wizard for clients.
    pub fn view(&self) -> WizardView {
        let (page_index, page_count) = self.page.position();
        WizardView {
            step: self.step,
            transitioning: self.transitioning,
            page: self.page,
            page_index,
            page_count,
            profile: self.profile.clone(),
            stack_draft: self.stack_draft.clone(),
            advisory: self.advisory.clone(),
            score: self.score(),
        }
    }
}

/// What a client needs to render the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: u8,
    pub transitioning: bool,
    pub page: ActivePage,
    pub page_index: usize,
    pub page_count: usize,
    pub profile: Profile,
    pub stack_draft: String,
    pub advisory: Option<Advisory>,
    pub score: u32,
}
