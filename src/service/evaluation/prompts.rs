//! Prompts for screenshot evaluation

use crate::model::SiteRule;

/// Build the screenshot evaluation prompt
///
/// Lists are embedded as JSON so intents with commas or quotes survive intact.
pub fn build_evaluation_prompt(allowlist: &[SiteRule], blocklist: &[SiteRule], schema: &str) -> String {
    let allowlist = serde_json::to_string(allowlist).unwrap_or_else(|_| "[]".to_string());
    let blocklist = serde_json::to_string(blocklist).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You analyze user activity from a screenshot.

Decide whether what the user is doing complies with their focus goal, which is defined by
an allowlist and a blocklist of websites, each with an intent.

## Lists

Allowlist: {allowlist}
Blocklist: {blocklist}

## Instructions

- Identify every website visible in the screenshot and every activity the user is engaged in.
- Include every website from both lists that appears in the screenshot.
- The intent decides the outcome. If youtube.com is on the allowlist with the intent
  "study music" and the user is listening to study music there, it is allowed.
- An intent of "all" means the rule covers everything on that website.

Return a JSON object whose "result" maps each identified website or activity
(e.g. "youtube.com", "watching videos", "scrolling social media") to true when allowed
and false when blocked.

JSON schema for the response:
{schema}"#,
        allowlist = allowlist,
        blocklist = blocklist,
        schema = schema
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_lists_as_json() {
        let prompt = build_evaluation_prompt(
            &[SiteRule::unconditional("github.com")],
            &[SiteRule::new("youtube.com", "music videos, gaming")],
            "{}",
        );
        assert!(prompt.contains(r#"Allowlist: [{"website":"github.com","intent":"all"}]"#));
        assert!(prompt.contains(r#"{"website":"youtube.com","intent":"music videos, gaming"}"#));
    }

    #[test]
    fn test_empty_lists() {
        let prompt = build_evaluation_prompt(&[], &[], "{}");
        assert!(prompt.contains("Allowlist: []"));
        assert!(prompt.contains("Blocklist: []"));
    }
}
