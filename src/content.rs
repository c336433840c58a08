//! Static reference content: industries, benchmarks, quest metadata and the
//! option catalogs offered on each step.
//!
//! Everything here is read-only and lives for the whole process.

use serde::Serialize;

use crate::quest::model::{
    BudgetBracket, CloudStrategy, DecisionAuthority, DigitalMaturity, EngagementDuration,
    EntityType, InvolvementLevel, IpOwnership, Location, OperatingModel, ReportingCadence,
    ReviewCadence, WorkModel,
};

/// Industry benchmark row shown on the landing page and in results.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IndustryData {
    pub industry: &'static str,
    pub headcount: &'static str,
    pub csat: &'static str,
    pub attrition: &'static str,
}

/// A stage of the capability-center evolution framework.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EvolutionStage {
    pub id: &'static str,
    pub title: &'static str,
    pub details: &'static str,
}

/// A benchmark company.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GlobalLeader {
    pub name: &'static str,
    pub headcount: &'static str,
    pub focus: &'static str,
}

/// Metadata for one of the six top-level quest steps, including the copy
/// shown on the interstitial that follows it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuestStepInfo {
    pub id: u8,
    pub title: &'static str,
    pub transition_title: &'static str,
    pub transition_insight: &'static str,
    pub transition_data: &'static str,
}

/// A delivery hub offered on the team step.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Hub {
    pub name: &'static str,
    pub desc: &'static str,
}

pub const INDUSTRIES: [IndustryData; 4] = [
    IndustryData { industry: "BFSI", headcount: "~5.4 Lakhs", csat: "92%", attrition: "12%-15%" },
    IndustryData { industry: "IT", headcount: "~10 Lakhs", csat: "95%", attrition: "15%-20%" },
    IndustryData { industry: "Healthcare", headcount: "~4.2 Lakhs", csat: "89%", attrition: "10%-13%" },
    IndustryData { industry: "Automotive", headcount: "~1.1 Lakhs", csat: "90%", attrition: "16%-22%" },
];

/// Sectors the mission picker offers on top of the benchmarked ones.
pub const EXTRA_SECTORS: [&str; 3] = ["Retail", "Energy", "Manufacturing"];

pub const EVOLUTION_STAGES: [EvolutionStage; 4] = [
    EvolutionStage {
        id: "entry",
        title: "Entry (Advisory)",
        details: "Foundation, Site Selection, Entity Registration",
    },
    EvolutionStage {
        id: "growth",
        title: "Growth (Setup)",
        details: "Scaling, Talent Ramp-up, Governance",
    },
    EvolutionStage {
        id: "mature",
        title: "Mature (Workforce)",
        details: "Process Excellence, Innovation Hubs",
    },
    EvolutionStage {
        id: "transform",
        title: "Transform (Managed)",
        details: "Strategic Shift, Digitalization, AI/ML",
    },
];

pub const GLOBAL_LEADERS: [GlobalLeader; 4] = [
    GlobalLeader { name: "JPMorgan Chase & Co", headcount: "55,000+", focus: "AI/Blockchain" },
    GlobalLeader { name: "Goldman Sachs", headcount: "9,500+", focus: "Innovation Incubator" },
    GlobalLeader { name: "Bosch", headcount: "31,000+", focus: "Global R&D Center" },
    GlobalLeader { name: "Microsoft", headcount: "18,000+", focus: "AI/ML Research Hub" },
];

pub const QUEST_STEPS: [QuestStepInfo; 6] = [
    QuestStepInfo {
        id: 1,
        title: "Mission",
        transition_title: "Industry Landscape",
        transition_insight: "Benchmarking against Global Leaders.",
        transition_data: "1,800+ GCCs already operational in India",
    },
    QuestStepInfo {
        id: 2,
        title: "Vision",
        transition_title: "Strategy Calibration",
        transition_insight: "Aligning with the Evolution Framework.",
        transition_data: "65% of mature GCCs now hold Global Process Ownership (GPO)",
    },
    QuestStepInfo {
        id: 3,
        title: "Tech Arsenal",
        transition_title: "Tech Arsenal",
        transition_insight: "Your stack is AI-Ready.",
        transition_data: "95% of IT GCCs prioritize Agility & AI Governance in 2025",
    },
    QuestStepInfo {
        id: 4,
        title: "Build Your Team",
        transition_title: "Building Excellence",
        transition_insight: "Defining a Culture of Global Leadership.",
        transition_data: "~10 Lakhs skilled professionals power the India GCC talent pool",
    },
    QuestStepInfo {
        id: 5,
        title: "Governance",
        transition_title: "Governance Vault",
        transition_insight: "Robust controls established.",
        transition_data: "Regulatory compliance is the #1 priority for Board alignment",
    },
    QuestStepInfo {
        id: 6,
        title: "Partnership",
        transition_title: "Ready for Takeoff",
        transition_insight: "Strategic Alignment Complete.",
        transition_data: "Preparing your final 360° Diagnostic Roadmap...",
    },
];

// ── Option catalogs ─────────────────────────────────────────────────────

pub const PRIMARY_GOALS: [&str; 7] = [
    "Cost Efficiency",
    "Talent Scaling",
    "Digital Innovation",
    "R&D Hub",
    "Operational Excellence",
    "Business Continuity",
    "Global IP Creation",
];

pub const KPI_OPTIONS: [&str; 8] = [
    "SLAs (Service Levels)",
    "ROI (Return on Investment)",
    "Cycle Time Reduction",
    "Quality Targets",
    "Attrition Rate",
    "Innovation Conversion",
    "Global Process Ownership",
    "CSAT (Customer Satisfaction)",
];

pub const PLATFORMS: [&str; 5] = ["SAP", "Oracle", "Salesforce", "ServiceNow", "Workday"];

/// Stacks offered as presets; anything else in `tech.stacks` is custom.
pub const PRESET_STACKS: [&str; 6] = [".NET", "React", "Python", "Go", "Node.js", "Kotlin"];

pub const AI_USE_CASES: [&str; 5] = [
    "Fraud Detection",
    "Supply Chain Opt",
    "Predictive Analytics",
    "GenAI Support",
    "Vision Intelligence",
];

pub const HUBS: [Hub; 6] = [
    Hub { name: "Bengaluru", desc: "Tech & R&D Hub" },
    Hub { name: "Hyderabad", desc: "IT & Bio-Tech Hub" },
    Hub { name: "Pune", desc: "Auto & Engineering Hub" },
    Hub { name: "Chennai", desc: "SaaS & Auto Hub" },
    Hub { name: "NCR", desc: "Global Services Hub" },
    Hub { name: "Mumbai", desc: "Financial Tech Hub" },
];

pub const TALENT_CHANNELS: [&str; 4] = [
    "Direct Hire",
    "Partner Agencies",
    "Campus Programs",
    "Internal Transfers",
];

pub const CULTURE_FRAMEWORKS: [&str; 6] = [
    "Leadership Development",
    "Innovation Labs",
    "Upskilling & Certs",
    "Wellness Programs",
    "DEI Framework",
    "Global Mentorship",
];

pub const INFRASTRUCTURE: [&str; 4] = [
    "Premium Grade-A",
    "Co-working Flex",
    "Digital-First",
    "Satellite Hubs",
];

pub const COMPLIANCE_STANDARDS: [&str; 6] = [
    "GDPR",
    "ISO 27001",
    "SOC 2 Type II",
    "HIPAA",
    "CCPA",
    "Local Labor Laws",
];

pub const RISK_MITIGATION: [&str; 4] = [
    "Cyber Insurance",
    "BCP / DR Drill",
    "Legal Counsel Retainer",
    "Fx Hedging",
];

pub const ECOSYSTEM_PARTNERS: [&str; 5] = [
    "Universities",
    "Startups",
    "Accelerators",
    "Govt Bodies",
    "Investors",
];

pub const PARTNER_SERVICES: [&str; 6] = [
    "Talent Augmentation",
    "Project Management",
    "Process Consulting",
    "Tech Implementation",
    "Change Management",
    "Legal & Compliance",
];

pub const OUTCOMES: [&str; 4] = [
    "Faster Time-to-Market",
    "Cost Reduction > 30%",
    "Process Standardization",
    "Access to Niche Talent",
];

/// Look up the benchmark row for an industry, if one exists.
pub fn industry_benchmark(industry: &str) -> Option<&'static IndustryData> {
    INDUSTRIES.iter().find(|i| i.industry == industry)
}

/// Metadata for a top-level step (1-based). Returns `None` outside 1..=6.
pub fn quest_step(id: u8) -> Option<&'static QuestStepInfo> {
    QUEST_STEPS.iter().find(|s| s.id == id)
}

/// Every option list, grouped the way the front-end renders them.
#[derive(Debug, Clone, Serialize)]
pub struct OptionCatalog {
    pub sectors: Vec<&'static str>,
    pub goals: &'static [&'static str],
    pub kpis: &'static [&'static str],
    pub platforms: &'static [&'static str],
    pub stacks: &'static [&'static str],
    pub ai_use_cases: &'static [&'static str],
    pub hubs: &'static [Hub],
    pub talent_channels: &'static [&'static str],
    pub culture_frameworks: &'static [&'static str],
    pub infrastructure: &'static [&'static str],
    pub compliance_standards: &'static [&'static str],
    pub risk_mitigation: &'static [&'static str],
    pub ecosystem_partners: &'static [&'static str],
    pub services: &'static [&'static str],
    pub outcomes: &'static [&'static str],
    pub choices: ChoiceCatalog,
}

/// The closed sets behind each single-choice field, serialized as labels.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceCatalog {
    pub maturity: &'static [DigitalMaturity],
    pub operating_models: &'static [OperatingModel],
    pub cloud_strategies: &'static [CloudStrategy],
    pub budgets: &'static [BudgetBracket],
    pub locations: &'static [Location],
    pub work_models: &'static [WorkModel],
    pub entity_types: &'static [EntityType],
    pub ip_ownership: &'static [IpOwnership],
    pub reporting_cadences: &'static [ReportingCadence],
    pub involvement_levels: &'static [InvolvementLevel],
    pub durations: &'static [EngagementDuration],
    pub decision_authority: &'static [DecisionAuthority],
    pub review_cadences: &'static [ReviewCadence],
}

/// The full read-only content bundle served at `/api/content`.
#[derive(Debug, Clone, Serialize)]
pub struct ContentBundle {
    pub industries: &'static [IndustryData],
    pub evolution_stages: &'static [EvolutionStage],
    pub global_leaders: &'static [GlobalLeader],
    pub quest_steps: &'static [QuestStepInfo],
    pub options: OptionCatalog,
}

/// Assemble the content bundle.
pub fn bundle() -> ContentBundle {
    let sectors = INDUSTRIES
        .iter()
        .map(|i| i.industry)
        .chain(EXTRA_SECTORS)
        .collect();

    ContentBundle {
        industries: &INDUSTRIES,
        evolution_stages: &EVOLUTION_STAGES,
        global_leaders: &GLOBAL_LEADERS,
        quest_steps: &QUEST_STEPS,
        options: OptionCatalog {
            sectors,
            goals: &PRIMARY_GOALS,
            kpis: &KPI_OPTIONS,
            platforms: &PLATFORMS,
            stacks: &PRESET_STACKS,
            ai_use_cases: &AI_USE_CASES,
            hubs: &HUBS,
            talent_channels: &TALENT_CHANNELS,
            culture_frameworks: &CULTURE_FRAMEWORKS,
            infrastructure: &INFRASTRUCTURE,
            compliance_standards: &COMPLIANCE_STANDARDS,
            risk_mitigation: &RISK_MITIGATION,
            ecosystem_partners: &ECOSYSTEM_PARTNERS,
            services: &PARTNER_SERVICES,
            outcomes: &OUTCOMES,
            choices: ChoiceCatalog {
                maturity: DigitalMaturity::ALL,
                operating_models: OperatingModel::ALL,
                cloud_strategies: CloudStrategy::ALL,
                budgets: BudgetBracket::ALL,
                locations: Location::ALL,
                work_models: WorkModel::ALL,
                entity_types: EntityType::ALL,
                ip_ownership: IpOwnership::ALL,
                reporting_cadences: ReportingCadence::ALL,
                involvement_levels: InvolvementLevel::ALL,
                durations: EngagementDuration::ALL,
                decision_authority: DecisionAuthority::ALL,
                review_cadences: ReviewCadence::ALL,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quest_steps_are_numbered_one_to_six() {
        for (i, step) in QUEST_STEPS.iter().enumerate() {
            assert_eq!(step.id as usize, i + 1);
        }
        assert!(quest_step(0).is_none());
        assert!(quest_step(7).is_none());
        assert_eq!(quest_step(3).unwrap().title, "Tech Arsenal");
    }

    #[test]
    fn benchmark_lookup() {
        assert_eq!(industry_benchmark("IT").unwrap().csat, "95%");
        assert!(industry_benchmark("Retail").is_none());
    }

    #[test]
    fn bundle_lists_benchmarked_and_extra_sectors() {
        let bundle = bundle();
        assert_eq!(bundle.options.sectors.len(), 7);
        assert_eq!(bundle.options.sectors[0], "BFSI");
        assert_eq!(bundle.options.sectors[6], "Manufacturing");

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["global_leaders"][2]["name"], "Bosch");
        assert_eq!(json["options"]["hubs"][4]["name"], "NCR");
        assert_eq!(
            json["options"]["choices"]["operating_models"],
            serde_json::json!(["Cost Center", "Shared Services", "Innovation Hub"])
        );
        assert_eq!(json["options"]["choices"]["cloud_strategies"].as_array().unwrap().len(), 4);
    }
}
