//! Diagnostic profile data model: the six sections collected by the quest,
//! their enumerated fields, and the partial updates sub-forms send.

use serde::{Deserialize, Serialize};

use super::tags::TagList;

/// Smallest headcount the team slider allows.
pub const MIN_HEADCOUNT: u32 = 10;
/// Largest headcount the team slider allows.
pub const MAX_HEADCOUNT: u32 = 1000;

/// Declares a closed set of labelled choices. Each value serializes as its
/// human-readable label, which is also what `Display` prints.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum! {
    /// How mature the organisation's digital practice is today.
    DigitalMaturity {
        AdHoc => "Ad-hoc",
        Defined => "Defined",
        Optimized => "Optimized",
    } default Defined
}

choice_enum! {
    /// The operating model the capability center is meant to follow.
    OperatingModel {
        CostCenter => "Cost Center",
        SharedServices => "Shared Services",
        InnovationHub => "Innovation Hub",
    } default CostCenter
}

choice_enum! {
    CloudStrategy {
        PublicCloudFirst => "Public Cloud First",
        HybridInfrastructure => "Hybrid Infrastructure",
        MultiCloudNative => "Multi-Cloud Native",
        OnPremPrivate => "On-Prem / Private Cloud",
    } default HybridInfrastructure
}

choice_enum! {
    BudgetBracket {
        OneToFive => "$1M-5M",
        FiveToFifteen => "$5M-15M",
        FifteenPlus => "$15M+",
    } default OneToFive
}

choice_enum! {
    /// Delivery hubs offered on the team step.
    Location {
        Bengaluru => "Bengaluru",
        Hyderabad => "Hyderabad",
        Pune => "Pune",
        Chennai => "Chennai",
        Ncr => "NCR",
        Mumbai => "Mumbai",
    } default Bengaluru
}

choice_enum! {
    WorkModel {
        OnSite => "On-site",
        Hybrid => "Hybrid",
        Remote => "Remote",
    } default Hybrid
}

choice_enum! {
    /// Legal form of the local entity.
    EntityType {
        PvtLtd => "Pvt Ltd",
        Llp => "LLP",
        Branch => "Branch",
    } default PvtLtd
}

choice_enum! {
    IpOwnership {
        GlobalHqOwned => "Global HQ Owned",
        LocalEntityOwned => "Local Entity Owned",
        HybridLicensing => "Hybrid Licensing",
        CostPlusTransfer => "Cost+ Transfer",
    } default GlobalHqOwned
}

choice_enum! {
    ReportingCadence {
        Weekly => "Weekly",
        Monthly => "Monthly",
        Quarterly => "Quarterly",
    } default Monthly
}

choice_enum! {
    /// How deeply the partner is involved in running the center.
    InvolvementLevel {
        Advisory => "Advisory",
        CoDelivery => "Co-delivery",
        ManagedServices => "Managed Services",
    } default Advisory
}

choice_enum! {
    EngagementDuration {
        SixMonths => "6 Months",
        OneYear => "1 Year",
        TwoYears => "2 Years",
        ThreePlusYears => "3+ Years",
    } default TwoYears
}

choice_enum! {
    DecisionAuthority {
        GccOwned => "GCC Owned",
        Shared => "Shared",
        PartnerOwned => "Partner Owned",
    } default Shared
}

choice_enum! {
    ReviewCadence {
        Weekly => "Weekly",
        BiWeekly => "Bi-Weekly",
        Monthly => "Monthly",
    } default Weekly
}

// ── Sections ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSection {
    pub industry: String,
    pub company_name: String,
    pub goals: TagList,
    pub maturity: DigitalMaturity,
    /// Collected for the sales team; not scored.
    pub timeline: String,
}

impl Default for MissionSection {
    fn default() -> Self {
        Self {
            industry: String::new(),
            company_name: String::new(),
            goals: TagList::new(),
            maturity: DigitalMaturity::default(),
            timeline: "6-12 months".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionSection {
    pub model: OperatingModel,
    pub objective: String,
    pub value_proposition: String,
    pub differentiation: String,
    pub kpis: TagList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechSection {
    pub platforms: TagList,
    pub stacks: TagList,
    pub cloud_strategy: CloudStrategy,
    pub ai_use_cases: TagList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ai_use_case: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSection {
    pub headcount: u32,
    pub budget: BudgetBracket,
    pub location: Location,
    pub work_model: WorkModel,
    pub talent_channels: TagList,
    pub culture_frameworks: TagList,
    pub infrastructure: TagList,
}

impl Default for TeamSection {
    fn default() -> Self {
        Self {
            headcount: 100,
            budget: BudgetBracket::default(),
            location: Location::default(),
            work_model: WorkModel::default(),
            talent_channels: TagList::new(),
            culture_frameworks: TagList::new(),
            infrastructure: TagList::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSection {
    pub entity_type: EntityType,
    pub parent_integration: String,
    pub compliance_standards: TagList,
    pub ip_ownership: IpOwnership,
    pub reporting_cadence: ReportingCadence,
    pub risk_mitigation: TagList,
    pub ecosystem_partners: TagList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerSection {
    pub involvement: InvolvementLevel,
    pub duration: EngagementDuration,
    pub authority: DecisionAuthority,
    pub cadence: ReviewCadence,
    pub services: TagList,
    pub outcomes: TagList,
}

/// Everything the visitor tells us across the six quest steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub mission: MissionSection,
    pub vision: VisionSection,
    pub tech: TechSection,
    pub team: TeamSection,
    pub governance: GovernanceSection,
    pub partner: PartnerSection,
}

/// Names one profile section. Step `n` owns section `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Mission,
    Vision,
    Tech,
    Team,
    Governance,
    Partner,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Mission => "mission",
            Self::Vision => "vision",
            Self::Tech => "tech",
            Self::Team => "team",
            Self::Governance => "governance",
            Self::Partner => "partner",
        };
        write!(f, "{s}")
    }
}

/// Addresses one multi-select list in the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagField {
    Goals,
    Kpis,
    Platforms,
    Stacks,
    AiUseCases,
    TalentChannels,
    CultureFrameworks,
    Infrastructure,
    ComplianceStandards,
    RiskMitigation,
    EcosystemPartners,
    Services,
    Outcomes,
}

impl TagField {
    /// The section this list belongs to.
    pub fn section(&self) -> Section {
        use TagField::*;
        match self {
            Goals => Section::Mission,
            Kpis => Section::Vision,
            Platforms | Stacks | AiUseCases => Section::Tech,
            TalentChannels | CultureFrameworks | Infrastructure => Section::Team,
            ComplianceStandards | RiskMitigation | EcosystemPartners => Section::Governance,
            Services | Outcomes => Section::Partner,
        }
    }
}

impl Profile {
    pub fn tags(&self, field: TagField) -> &TagList {
        use TagField::*;
        match field {
            Goals => &self.mission.goals,
            Kpis => &self.vision.kpis,
            Platforms => &self.tech.platforms,
            Stacks => &self.tech.stacks,
            AiUseCases => &self.tech.ai_use_cases,
            TalentChannels => &self.team.talent_channels,
            CultureFrameworks => &self.team.culture_frameworks,
            Infrastructure => &self.team.infrastructure,
            ComplianceStandards => &self.governance.compliance_standards,
            RiskMitigation => &self.governance.risk_mitigation,
            EcosystemPartners => &self.governance.ecosystem_partners,
            Services => &self.partner.services,
            Outcomes => &self.partner.outcomes,
        }
    }

    pub fn tags_mut(&mut self, field: TagField) -> &mut TagList {
        use TagField::*;
        match field {
            Goals => &mut self.mission.goals,
            Kpis => &mut self.vision.kpis,
            Platforms => &mut self.tech.platforms,
            Stacks => &mut self.tech.stacks,
            AiUseCases => &mut self.tech.ai_use_cases,
            TalentChannels => &mut self.team.talent_channels,
            CultureFrameworks => &mut self.team.culture_frameworks,
            Infrastructure => &mut self.team.infrastructure,
            ComplianceStandards => &mut self.governance.compliance_standards,
            RiskMitigation => &mut self.governance.risk_mitigation,
            EcosystemPartners => &mut self.governance.ecosystem_partners,
            Services => &mut self.partner.services,
            Outcomes => &mut self.partner.outcomes,
        }
    }

    /// Shallow-merge a partial update into the one section it names.
    /// Fields left as `None` keep their current value; every other section
    /// is untouched.
    pub fn apply(&mut self, patch: SectionPatch) {
        match patch {
            SectionPatch::Mission(p) => p.merge_into(&mut self.mission),
            SectionPatch::Vision(p) => p.merge_into(&mut self.vision),
            SectionPatch::Tech(p) => p.merge_into(&mut self.tech),
            SectionPatch::Team(p) => p.merge_into(&mut self.team),
            SectionPatch::Governance(p) => p.merge_into(&mut self.governance),
            SectionPatch::Partner(p) => p.merge_into(&mut self.partner),
        }
    }
}

// ── Partial updates ─────────────────────────────────────────────────────

/// A partial update to exactly one section, tagged by section name:
/// `{"section": "team", "headcount": 250}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SectionPatch {
    Mission(MissionPatch),
    Vision(VisionPatch),
    Tech(TechPatch),
    Team(TeamPatch),
    Governance(GovernancePatch),
    Partner(PartnerPatch),
}

impl SectionPatch {
    pub fn section(&self) -> Section {
        match self {
            Self::Mission(_) => Section::Mission,
            Self::Vision(_) => Section::Vision,
            Self::Tech(_) => Section::Tech,
            Self::Team(_) => Section::Team,
            Self::Governance(_) => Section::Governance,
            Self::Partner(_) => Section::Partner,
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionPatch {
    pub industry: Option<String>,
    pub company_name: Option<String>,
    pub goals: Option<TagList>,
    pub maturity: Option<DigitalMaturity>,
    pub timeline: Option<String>,
}

impl MissionPatch {
    fn merge_into(self, s: &mut MissionSection) {
        set(&mut s.industry, self.industry);
        set(&mut s.company_name, self.company_name);
        set(&mut s.goals, self.goals);
        set(&mut s.maturity, self.maturity);
        set(&mut s.timeline, self.timeline);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionPatch {
    pub model: Option<OperatingModel>,
    pub objective: Option<String>,
    pub value_proposition: Option<String>,
    pub differentiation: Option<String>,
    pub kpis: Option<TagList>,
}

impl VisionPatch {
    fn merge_into(self, s: &mut VisionSection) {
        set(&mut s.model, self.model);
        set(&mut s.objective, self.objective);
        set(&mut s.value_proposition, self.value_proposition);
        set(&mut s.differentiation, self.differentiation);
        set(&mut s.kpis, self.kpis);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechPatch {
    pub platforms: Option<TagList>,
    pub stacks: Option<TagList>,
    pub cloud_strategy: Option<CloudStrategy>,
    pub ai_use_cases: Option<TagList>,
    pub custom_platform: Option<String>,
    pub custom_stack: Option<String>,
    pub custom_ai_use_case: Option<String>,
}

impl TechPatch {
    fn merge_into(self, s: &mut TechSection) {
        set(&mut s.platforms, self.platforms);
        set(&mut s.stacks, self.stacks);
        set(&mut s.cloud_strategy, self.cloud_strategy);
        set(&mut s.ai_use_cases, self.ai_use_cases);
        if self.custom_platform.is_some() {
            s.custom_platform = self.custom_platform;
        }
        if self.custom_stack.is_some() {
            s.custom_stack = self.custom_stack;
        }
        if self.custom_ai_use_case.is_some() {
            s.custom_ai_use_case = self.custom_ai_use_case;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamPatch {
    pub headcount: Option<u32>,
    pub budget: Option<BudgetBracket>,
    pub location: Option<Location>,
    pub work_model: Option<WorkModel>,
    pub talent_channels: Option<TagList>,
    pub culture_frameworks: Option<TagList>,
    pub infrastructure: Option<TagList>,
}

impl TeamPatch {
    fn merge_into(self, s: &mut TeamSection) {
        set(
            &mut s.headcount,
            self.headcount.map(|h| h.clamp(MIN_HEADCOUNT, MAX_HEADCOUNT)),
        );
        set(&mut s.budget, self.budget);
        set(&mut s.location, self.location);
        set(&mut s.work_model, self.work_model);
        set(&mut s.talent_channels, self.talent_channels);
        set(&mut s.culture_frameworks, self.culture_frameworks);
        set(&mut s.infrastructure, self.infrastructure);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernancePatch {
    pub entity_type: Option<EntityType>,
    pub parent_integration: Option<String>,
    pub compliance_standards: Option<TagList>,
    pub ip_ownership: Option<IpOwnership>,
    pub reporting_cadence: Option<ReportingCadence>,
    pub risk_mitigation: Option<TagList>,
    pub ecosystem_partners: Option<TagList>,
}

impl GovernancePatch {
    fn merge_into(self, s: &mut GovernanceSection) {
        set(&mut s.entity_type, self.entity_type);
        set(&mut s.parent_integration, self.parent_integration);
        set(&mut s.compliance_standards, self.compliance_standards);
        set(&mut s.ip_ownership, self.ip_ownership);
        set(&mut s.reporting_cadence, self.reporting_cadence);
        set(&mut s.risk_mitigation, self.risk_mitigation);
        set(&mut s.ecosystem_partners, self.ecosystem_partners);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerPatch {
    pub involvement: Option<InvolvementLevel>,
    pub duration: Option<EngagementDuration>,
    pub authority: Option<DecisionAuthority>,
    pub cadence: Option<ReviewCadence>,
    pub services: Option<TagList>,
    pub outcomes: Option<TagList>,
}

impl PartnerPatch {
    fn merge_into(self, s: &mut PartnerSection) {
        set(&mut s.involvement, self.involvement);
        set(&mut s.duration, self.duration);
        set(&mut s.authority, self.authority);
        set(&mut s.cadence, self.cadence);
        set(&mut s.services, self.services);
        set(&mut s.outcomes, self.outcomes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_has_expected_values() {
        let p = Profile::default();
        assert!(p.mission.industry.is_empty());
        assert_eq!(p.mission.maturity, DigitalMaturity::Defined);
        assert_eq!(p.mission.timeline, "6-12 months");
        assert_eq!(p.vision.model, OperatingModel::CostCenter);
        assert_eq!(p.tech.cloud_strategy, CloudStrategy::HybridInfrastructure);
        assert_eq!(p.team.headcount, 100);
        assert_eq!(p.team.work_model, WorkModel::Hybrid);
        assert_eq!(p.governance.entity_type, EntityType::PvtLtd);
        assert_eq!(p.governance.reporting_cadence, ReportingCadence::Monthly);
        assert_eq!(p.partner.involvement, InvolvementLevel::Advisory);
        assert_eq!(p.partner.duration, EngagementDuration::TwoYears);
        assert!(p.tech.custom_stack.is_none());
    }

    #[test]
    fn choices_serialize_as_labels() {
        let json = serde_json::to_string(&InvolvementLevel::CoDelivery).unwrap();
        assert_eq!(json, "\"Co-delivery\"");

        let ip: IpOwnership = serde_json::from_str("\"Cost+ Transfer\"").unwrap();
        assert_eq!(ip, IpOwnership::CostPlusTransfer);

        assert!(serde_json::from_str::<WorkModel>("\"Office\"").is_err());
    }

    #[test]
    fn display_matches_serde() {
        for model in OperatingModel::ALL {
            let json = serde_json::to_string(model).unwrap();
            assert_eq!(format!("\"{model}\""), json);
        }
        for cadence in ReviewCadence::ALL {
            let json = serde_json::to_string(cadence).unwrap();
            let back: ReviewCadence = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *cadence);
        }
        assert!(serde_json::from_str::<ReviewCadence>("\"Fortnightly\"").is_err());
    }

    #[test]
    fn tag_fields_route_to_their_section() {
        let mut p = Profile::default();
        p.tags_mut(TagField::ComplianceStandards).toggle("GDPR");
        assert!(p.governance.compliance_standards.contains("GDPR"));
        assert_eq!(TagField::ComplianceStandards.section(), Section::Governance);
        assert_eq!(p.tags(TagField::ComplianceStandards).len(), 1);
        assert!(p.tags(TagField::Outcomes).is_empty());
    }

    #[test]
    fn patch_touches_only_named_fields() {
        let mut p = Profile::default();
        p.mission.company_name = "Acme".into();

        p.apply(SectionPatch::Mission(MissionPatch {
            industry: Some("BFSI".into()),
            ..Default::default()
        }));

        assert_eq!(p.mission.industry, "BFSI");
        assert_eq!(p.mission.company_name, "Acme");
        assert_eq!(p.mission.maturity, DigitalMaturity::Defined);
    }

    #[test]
    fn patch_leaves_other_sections_untouched() {
        let mut p = Profile::default();
        p.governance.compliance_standards.toggle("HIPAA");
        let before = p.clone();

        let patches = vec![
            SectionPatch::Team(TeamPatch {
                headcount: Some(400),
                location: Some(Location::Pune),
                ..Default::default()
            }),
            SectionPatch::Vision(VisionPatch {
                model: Some(OperatingModel::InnovationHub),
                ..Default::default()
            }),
        ];
        for patch in patches {
            p.apply(patch);
        }

        assert_eq!(p.mission, before.mission);
        assert_eq!(p.tech, before.tech);
        assert_eq!(p.governance, before.governance);
        assert_eq!(p.partner, before.partner);
        assert_eq!(p.team.headcount, 400);
        assert_eq!(p.vision.model, OperatingModel::InnovationHub);
    }

    #[test]
    fn headcount_is_clamped() {
        let mut p = Profile::default();
        p.apply(SectionPatch::Team(TeamPatch {
            headcount: Some(5),
            ..Default::default()
        }));
        assert_eq!(p.team.headcount, MIN_HEADCOUNT);

        p.apply(SectionPatch::Team(TeamPatch {
            headcount: Some(50_000),
            ..Default::default()
        }));
        assert_eq!(p.team.headcount, MAX_HEADCOUNT);
    }

    #[test]
    fn patch_deserializes_from_tagged_json() {
        let patch: SectionPatch = serde_json::from_value(serde_json::json!({
            "section": "partner",
            "involvement": "Managed Services",
            "services": ["Project Management", "Project Management"]
        }))
        .unwrap();

        assert_eq!(patch.section(), Section::Partner);
        let mut p = Profile::default();
        p.apply(patch);
        assert_eq!(p.partner.involvement, InvolvementLevel::ManagedServices);
        assert_eq!(p.partner.services.len(), 1);
        assert_eq!(p.partner.cadence, ReviewCadence::Weekly);
    }

    #[test]
    fn patch_rejects_values_outside_the_fixed_set() {
        let result = serde_json::from_value::<SectionPatch>(serde_json::json!({
            "section": "governance",
            "entity_type": "Trust"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn profile_serde_roundtrip() {
        let mut p = Profile::default();
        p.mission.company_name = "Globex".into();
        p.tech.custom_stack = Some("Elixir".into());
        p.tech.stacks.insert("Elixir");

        let json = serde_json::to_string(&p).unwrap();
        let parsed: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }
}
