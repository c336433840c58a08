//! The diagnostic quest: a six-step wizard that builds a `Profile`, scores
//! it, and turns the finished profile into a results snapshot.

pub mod model;
pub mod pages;
pub mod scoring;
pub mod snapshot;
pub mod tags;
pub mod wizard;

pub use model::{Profile, Section, SectionPatch, TagField};
pub use pages::ActivePage;
pub use snapshot::Snapshot;
pub use tags::TagList;
pub use wizard::{NavOutcome, QuestWizard, TransitionOutcome, WizardView};
