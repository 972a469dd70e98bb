pub mod arrest;
pub mod case;
pub mod charge;
pub mod examination;
pub mod facility;
pub mod officer;
pub mod post;
pub mod practitioner;
pub mod role;
pub mod suspect;
pub mod symptom;
pub mod toxicology;
pub mod victim;

pub use arrest::Arrest;
pub use case::Case;
pub use charge::Charge;
pub use examination::Examination;
pub use facility::HealthFacility;
pub use officer::PoliceOfficer;
pub use post::PolicePost;
pub use practitioner::HealthPractitioner;
pub use role::Role;
pub use suspect::Suspect;
pub use symptom::{PostMortemSummary, Symptom};
pub use toxicology::ToxicologyReport;
pub use victim::Victim;
