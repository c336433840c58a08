//! Results snapshot: the teaser summary built from a finished profile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::model::Profile;
use super::scoring::{self, ScoreBreakdown};
use super::wizard::LAST_STEP;
use crate::content::{self, GlobalLeader, IndustryData};

pub const HEADLINE: &str = "Your AI Center Strategy is Ready.";
pub const BENCHMARK_CLAIM: &str = "We've calibrated your inputs against 500+ global GCC benchmarks.";
pub const ROI_TEASER: &str = "+15% Year 1";
pub const CONTACT_CTA: &str = "Contact J2W Experts";
pub const CONTACT_PHONE: &str = "+91 80 4646 0000";

/// Titles of the report sections kept behind the contact form.
pub const LOCKED_SECTIONS: [&str; 3] = [
    "Budget Breakdown",
    "Hiring Timeline",
    "Vendor Recommendations",
];

/// Lowercase hex SHA-256 of the profile's canonical JSON.
pub fn profile_digest(profile: &Profile) -> String {
    // Serializing plain structs of strings and enums cannot fail.
    let bytes = serde_json::to_vec(profile).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}

/// Everything the results screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub headline: &'static str,
    pub benchmark_claim: &'static str,
    pub company_name: String,
    /// The operating model doubles as the "detected archetype".
    pub archetype: &'static str,
    pub score: ScoreBreakdown,
    pub roi_teaser: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_benchmark: Option<IndustryData>,
    pub global_leaders: &'static [GlobalLeader],
    pub highlights: Vec<String>,
    pub locked_sections: &'static [&'static str],
    pub contact_cta: &'static str,
    pub contact_phone: &'static str,
    pub profile: Profile,
    pub profile_digest: String,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build the snapshot for a completed quest.
    pub fn build(profile: Profile) -> Self {
        let score = scoring::breakdown(LAST_STEP, &profile);
        let digest = profile_digest(&profile);

        Self {
            headline: HEADLINE,
            benchmark_claim: BENCHMARK_CLAIM,
            company_name: profile.mission.company_name.clone(),
            archetype: profile.vision.model.label(),
            score,
            roi_teaser: ROI_TEASER,
            industry_benchmark: content::industry_benchmark(&profile.mission.industry).copied(),
            global_leaders: &content::GLOBAL_LEADERS,
            highlights: highlights(&profile),
            locked_sections: &LOCKED_SECTIONS,
            contact_cta: CONTACT_CTA,
            contact_phone: CONTACT_PHONE,
            profile,
            profile_digest: digest,
            generated_at: Utc::now(),
        }
    }
}

fn highlights(p: &Profile) -> Vec<String> {
    let mut out = vec![
        format!("{} team in {}", p.team.headcount, p.team.location),
        format!("{} work model, {} budget", p.team.work_model, p.team.budget),
        format!("{} entity, {} IP", p.governance.entity_type, p.governance.ip_ownership),
        format!("{} partnership for {}", p.partner.involvement, p.partner.duration),
    ];

    if !p.mission.industry.is_empty() {
        out.insert(0, format!("{} sector, {} maturity", p.mission.industry, p.mission.maturity));
    }
    if !p.governance.compliance_standards.is_empty() {
        out.push(format!(
            "Compliance: {}",
            p.governance.compliance_standards.iter().collect::<Vec<_>>().join(", ")
        ));
    }
    out
}
