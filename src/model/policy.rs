//! Focus policy models
//!
//! `Policy` is the wire contract returned to callers. `ExtractedPolicy` is the
//! looser shape accepted from the model backend before repair.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Intent sentinel meaning the rule applies unconditionally
pub const INTENT_ALL: &str = "all";

/// A single website rule within a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct SiteRule {
    /// Bare domain or domain + path, e.g. `youtube.com`
    pub website: String,
    /// When the rule applies; `"all"` means always
    pub intent: String,
}

impl SiteRule {
    pub fn new(website: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            intent: intent.into(),
        }
    }

    /// Rule that applies regardless of what the user is doing on the site
    pub fn unconditional(website: impl Into<String>) -> Self {
        Self::new(website, INTENT_ALL)
    }
}

/// Allow/block rule set derived from a focus goal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct Policy {
    pub allowlist: Vec<SiteRule>,
    pub blocklist: Vec<SiteRule>,
}

/// A list entry as emitted by the model backend
///
/// Backends sometimes collapse `{website, intent: "all"}` to a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExtractedRule {
    Bare(String),
    Rule(SiteRule),
}

impl From<ExtractedRule> for SiteRule {
    fn from(entry: ExtractedRule) -> Self {
        match entry {
            ExtractedRule::Bare(website) => SiteRule::unconditional(website),
            ExtractedRule::Rule(rule) => rule,
        }
    }
}

/// Policy as parsed from a backend reply, before repair
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedPolicy {
    pub allowlist: Vec<ExtractedRule>,
    pub blocklist: Vec<ExtractedRule>,
}

impl ExtractedPolicy {
    /// Number of entries that were bare strings and need rewriting
    pub fn bare_entries(&self) -> usize {
        self.allowlist
            .iter()
            .chain(self.blocklist.iter())
            .filter(|e| matches!(e, ExtractedRule::Bare(_)))
            .count()
    }

    /// Rewrite bare entries into unconditional rules, preserving order
    pub fn repair(self) -> Policy {
        Policy {
            allowlist: self.allowlist.into_iter().map(SiteRule::from).collect(),
            blocklist: self.blocklist.into_iter().map(SiteRule::from).collect(),
        }
    }
}
