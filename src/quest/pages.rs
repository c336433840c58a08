//! Sub-step state machines: each quest step is a short pager of its own.
//!
//! The position inside a step is local to that step: entering a step,
//! forwards or backwards, always lands on its first page.

use serde::{Deserialize, Serialize};

/// A linear pager over a fixed set of pages.
pub trait Pager: Copy + Sized + 'static {
    /// Pages in order.
    const PAGES: &'static [Self];

    fn index(&self) -> usize;

    fn first() -> Self {
        Self::PAGES[0]
    }

    fn next(&self) -> Option<Self> {
        Self::PAGES.get(self.index() + 1).copied()
    }

    fn prev(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::PAGES[i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionPage {
    Identity,
    Goals,
}

impl Pager for MissionPage {
    const PAGES: &'static [Self] = &[Self::Identity, Self::Goals];

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionPage {
    OperatingModel,
    ValueNarrative,
    Kpis,
}

impl Pager for VisionPage {
    const PAGES: &'static [Self] = &[Self::OperatingModel, Self::ValueNarrative, Self::Kpis];

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechPage {
    Platforms,
    Stacks,
    Cloud,
    AiUseCases,
}

impl Pager for TechPage {
    const PAGES: &'static [Self] = &[Self::Platforms, Self::Stacks, Self::Cloud, Self::AiUseCases];

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamPage {
    Scale,
    Location,
    Culture,
}

impl Pager for TeamPage {
    const PAGES: &'static [Self] = &[Self::Scale, Self::Location, Self::Culture];

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernancePage {
    Entity,
    Compliance,
    Risk,
}

impl Pager for GovernancePage {
    const PAGES: &'static [Self] = &[Self::Entity, Self::Compliance, Self::Risk];

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerPage {
    Involvement,
    Engagement,
    Services,
}

impl Pager for PartnerPage {
    const PAGES: &'static [Self] = &[Self::Involvement, Self::Engagement, Self::Services];

    fn index(&self) -> usize {
        *self as usize
    }
}

/// The page currently shown, tagged by the step that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "page", rename_all = "snake_case")]
pub enum ActivePage {
    Mission(MissionPage),
    Vision(VisionPage),
    Tech(TechPage),
    Team(TeamPage),
    Governance(GovernancePage),
    Partner(PartnerPage),
}

impl ActivePage {
    /// First page of a 1-based step. Steps outside 1..=6 clamp to the ends.
    pub fn first_of(step: u8) -> Self {
        match step {
            0 | 1 => Self::Mission(MissionPage::first()),
            2 => Self::Vision(VisionPage::first()),
            3 => Self::Tech(TechPage::first()),
            4 => Self::Team(TeamPage::first()),
            5 => Self::Governance(GovernancePage::first()),
            _ => Self::Partner(PartnerPage::first()),
        }
    }

    /// The following page within the same step, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Mission(p) => p.next().map(Self::Mission),
            Self::Vision(p) => p.next().map(Self::Vision),
            Self::Tech(p) => p.next().map(Self::Tech),
            Self::Team(p) => p.next().map(Self::Team),
            Self::Governance(p) => p.next().map(Self::Governance),
            Self::Partner(p) => p.next().map(Self::Partner),
        }
    }

    /// The preceding page within the same step, if any.
    pub fn prev(&self) -> Option<Self> {
        match self {
            Self::Mission(p) => p.prev().map(Self::Mission),
            Self::Vision(p) => p.prev().map(Self::Vision),
            Self::Tech(p) => p.prev().map(Self::Tech),
            Self::Team(p) => p.prev().map(Self::Team),
            Self::Governance(p) => p.prev().map(Self::Governance),
            Self::Partner(p) => p.prev().map(Self::Partner),
        }
    }

    /// Zero-based position and page count, for progress dots.
    pub fn position(&self) -> (usize, usize) {
        match self {
            Self::Mission(p) => (p.index(), MissionPage::PAGES.len()),
            Self::Vision(p) => (p.index(), VisionPage::PAGES.len()),
            Self::Tech(p) => (p.index(), TechPage::PAGES.len()),
            Self::Team(p) => (p.index(), TeamPage::PAGES.len()),
            Self::Governance(p) => (p.index(), GovernancePage::PAGES.len()),
            Self::Partner(p) => (p.index(), PartnerPage::PAGES.len()),
        }
    }
}
