//! Prompts for focus policy generation

/// Goal used by the worked example
pub const EXAMPLE_GOAL: &str = "I want to program for the next two hours";

/// Policy the worked example maps `EXAMPLE_GOAL` to
pub const EXAMPLE_POLICY: &str = r#"{
  "allowlist": [
    {"website": "github.com", "intent": "all"},
    {"website": "stackoverflow.com", "intent": "all"},
    {"website": "docs.rs", "intent": "all"},
    {"website": "chatgpt.com", "intent": "all"}
  ],
  "blocklist": [
    {"website": "youtube.com", "intent": "music videos, gaming"},
    {"website": "instagram.com", "intent": "all"},
    {"website": "reddit.com", "intent": "non-programming related content"}
  ]
}"#;

/// Build the policy generation prompt for a user's goal
pub fn build_policy_prompt(goal_text: &str, schema: &str) -> String {
    format!(
        r#"You are an assistant that helps people stay focused on a task.

From the user's goal, produce a list of websites to allow and a list of websites to block.
Each entry names a website and the intent under which the rule applies. Use the intent
"all" when the rule applies to everything on that website; otherwise describe the
specific topics or activities that are allowed or blocked.

## Example

Goal: "{example_goal}"

{example_policy}

## User's Goal

"{goal_text}"

---

Return JSON only, conforming to this schema:
{schema}"#,
        example_goal = EXAMPLE_GOAL,
        example_policy = EXAMPLE_POLICY,
        goal_text = goal_text,
        schema = schema
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Policy;

    #[test]
    fn test_example_policy_is_valid_wire_json() {
        let policy: Policy = serde_json::from_str(EXAMPLE_POLICY).unwrap();
        assert_eq!(policy.allowlist[0].website, "github.com");
        assert_eq!(policy.blocklist.len(), 3);
    }

    #[test]
    fn test_prompt_embeds_goal_and_schema() {
        let prompt = build_policy_prompt("Write my thesis", r#"{"title":"Policy"}"#);
        assert!(prompt.contains("\"Write my thesis\""));
        assert!(prompt.contains(r#"{"title":"Policy"}"#));
        assert!(prompt.contains(EXAMPLE_GOAL));
    }
}
