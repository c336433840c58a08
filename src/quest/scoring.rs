//! Engagement score: a flat table of maturity signals, each worth a fixed
//! number of points, on top of a base that grows with quest progress.

use serde::Serialize;

use super::model::{InvolvementLevel, OperatingModel, Profile};

/// Points awarded per completed step.
pub const POINTS_PER_STEP: u32 = 12;
/// Upper bound of the reported score.
pub const MAX_SCORE: u32 = 100;

/// A maturity signal: a predicate over the profile and the points it earns.
pub struct Signal {
    pub id: &'static str,
    pub bonus: u32,
    pub check: fn(&Profile) -> bool,
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("bonus", &self.bonus)
            .finish()
    }
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

/// The rule table. Signals are independent; each fires at most once.
pub const SIGNALS: &[Signal] = &[
    // Tech maturity
    Signal {
        id: "custom_tech",
        bonus: 8,
        check: |p| filled(&p.tech.custom_stack) || filled(&p.tech.custom_ai_use_case),
    },
    Signal {
        id: "cloud_native",
        bonus: 5,
        check: |p| p.tech.cloud_strategy.label().contains("Cloud-Native"),
    },
    // Vision
    Signal {
        id: "innovation_hub",
        bonus: 10,
        check: |p| p.vision.model == OperatingModel::InnovationHub,
    },
    Signal {
        id: "kpi_innovation_conversion",
        bonus: 5,
        check: |p| p.vision.kpis.contains("Innovation Conversion"),
    },
    Signal {
        id: "kpi_roi",
        bonus: 5,
        check: |p| p.vision.kpis.contains("ROI (Return on Investment)"),
    },
    // Team & culture
    Signal {
        id: "culture_frameworks",
        bonus: 7,
        check: |p| p.team.culture_frameworks.len() >= 3,
    },
    Signal {
        id: "digital_first_workspace",
        bonus: 5,
        check: |p| p.team.infrastructure.contains("Digital-First"),
    },
    // Governance
    Signal {
        id: "compliance_coverage",
        bonus: 10,
        check: |p| p.governance.compliance_standards.len() >= 4,
    },
    Signal {
        id: "risk_mitigation",
        bonus: 5,
        check: |p| p.governance.risk_mitigation.len() >= 2,
    },
    Signal {
        id: "ecosystem_partners",
        bonus: 5,
        check: |p| p.governance.ecosystem_partners.len() >= 3,
    },
    // Partner involvement
    Signal {
        id: "managed_services",
        bonus: 10,
        check: |p| p.partner.involvement == InvolvementLevel::ManagedServices,
    },
    Signal {
        id: "co_delivery",
        bonus: 7,
        check: |p| p.partner.involvement == InvolvementLevel::CoDelivery,
    },
];

/// Base points for the current step (1-based).
pub fn base_points(step: u8) -> u32 {
    u32::from(step.saturating_sub(1)) * POINTS_PER_STEP
}

/// Ids of every signal that fires for `profile`, in table order.
pub fn fired_signals(profile: &Profile) -> Vec<&'static str> {
    SIGNALS
        .iter()
        .filter(|s| (s.check)(profile))
        .map(|s| s.id)
        .collect()
}

/// Unclamped point total.
pub fn raw_score(step: u8, profile: &Profile) -> u32 {
    SIGNALS
        .iter()
        .filter(|s| (s.check)(profile))
        .fold(base_points(step), |acc, s| acc + s.bonus)
}

/// Engagement score in `0..=100`.
pub fn score(step: u8, profile: &Profile) -> u32 {
    raw_score(step, profile).min(MAX_SCORE)
}

/// Score plus the detail behind it, for the results view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub signals: Vec<&'static str>,
    pub raw: u32,
    pub score: u32,
}

pub fn breakdown(step: u8, profile: &Profile) -> ScoreBreakdown {
    let raw = raw_score(step, profile);
    ScoreBreakdown {
        base: base_points(step),
        signals: fired_signals(profile),
        raw,
        score: raw.min(MAX_SCORE),
    }
}
