pub mod config;
pub mod gateway;
pub mod policy;
pub mod stimulus;
pub mod verdict;

pub use config::Config;
pub use gateway::{ChatMessage, ContentPart, MessageContent, ModelReply, ModelRequest, ResponseSchema, Role};
pub use policy::{ExtractedPolicy, Policy, SiteRule};
pub use stimulus::{StimulusKind, StimulusReceipt, StimulusSettings};
pub use verdict::{ComplianceVerdict, EvaluationReply};
