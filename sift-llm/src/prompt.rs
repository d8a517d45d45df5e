//! Builds the chat request that asks a model for a SIFT analysis.
//!
//! Claim text and source are embedded verbatim. They are plain prompt text,
//! not code, so nothing is escaped; a claim can therefore try to steer the
//! model (prompt injection), which is an accepted risk for this tool.

use crate::traits::{ChatMessage, ChatRequest};
use sift_common::{
    AnalysisRequest, Result, SiftError, SourcePolicy, CREDIBILITY_RATINGS, UNKNOWN_SOURCE,
};

const PERSONA: &str = "You are a professional fake news verification expert.";

const TASK: &str = "Analyze the information you are given with the SIFT four-step verification method: \
Stop, Investigate the source, Find better coverage, and Trace claims to their original context.";

/// Knobs that shape the request payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptOptions {
    pub source_policy: SourcePolicy,
    /// Send the persona and task as a separate system turn.
    pub system_turn: bool,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            source_policy: SourcePolicy::Strict,
            system_turn: false,
            model: None,
            temperature: Some(0.3),
            max_tokens: Some(2000),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    options: PromptOptions,
}

impl PromptBuilder {
    pub fn new(options: PromptOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PromptOptions {
        &self.options
    }

    /// Validate raw request fields and resolve `source` per the policy.
    ///
    /// Accepted strings are kept exactly as given; blankness is judged on
    /// the trimmed value only.
    ///
    /// ```
    /// use sift_llm::prompt::{PromptBuilder, PromptOptions};
    /// use sift_common::SourcePolicy;
    ///
    /// let lenient = PromptBuilder::new(PromptOptions {
    ///     source_policy: SourcePolicy::Lenient,
    ///     ..Default::default()
    /// });
    /// let req = lenient.resolve(Some("Water is wet"), None).unwrap();
    /// assert_eq!(req.source, "Unknown");
    /// assert!(lenient.resolve(Some("   "), Some("blog")).is_err());
    /// ```
    pub fn resolve(&self, content: Option<&str>, source: Option<&str>) -> Result<AnalysisRequest> {
        let policy = self.options.source_policy;
        let reject = || SiftError::Validation(policy.required_message().to_string());

        let content = non_blank(content).ok_or_else(reject)?;
        let source = match (non_blank(source), policy) {
            (Some(s), _) => s,
            (None, SourcePolicy::Lenient) => UNKNOWN_SOURCE,
            (None, SourcePolicy::Strict) => return Err(reject()),
        };

        Ok(AnalysisRequest {
            content: content.to_string(),
            source: source.to_string(),
        })
    }

    /// Produce the ordered chat turns for a resolved request.
    pub fn build(&self, request: &AnalysisRequest) -> ChatRequest {
        let body = user_instruction(request);
        let messages = if self.options.system_turn {
            vec![
                ChatMessage::system(format!("{PERSONA} {TASK}")),
                ChatMessage::user(body),
            ]
        } else {
            vec![ChatMessage::user(format!("{PERSONA} {TASK}\n\n{body}"))]
        };

        ChatRequest {
            model: self.options.model.clone(),
            messages,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn user_instruction(request: &AnalysisRequest) -> String {
    let ratings = CREDIBILITY_RATINGS
        .iter()
        .map(|r| format!("\"{r}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Information: "{content}"
Source: "{source}"

Respond in English with a single JSON object and nothing else. Use exactly these fields:
- sift_analysis: an object with string fields stop, investigate_source, find_coverage, trace_claims
- credibility_rating: string, one of {ratings}
- final_advice: string
- learning_tips: string

Make every explanation detailed and educational."#,
        content = request.content,
        source = request.source,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Role;

    fn builder(policy: SourcePolicy, system_turn: bool) -> PromptBuilder {
        PromptBuilder::new(PromptOptions {
            source_policy: policy,
            system_turn,
            ..Default::default()
        })
    }

    fn all_text(req: &ChatRequest) -> String {
        req.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn blank_content_is_rejected_under_both_policies() {
        for policy in [SourcePolicy::Strict, SourcePolicy::Lenient] {
            let b = builder(policy, false);
            for content in [None, Some(""), Some(" \t\n ")] {
                let err = b.resolve(content, Some("a newspaper")).unwrap_err();
                assert!(matches!(err, SiftError::Validation(ref m) if m == policy.required_message()));
            }
        }
    }

    #[test]
    fn strict_policy_requires_a_source() {
        let err = builder(SourcePolicy::Strict, false)
            .resolve(Some("claim"), Some("  "))
            .unwrap_err();
        assert_eq!(err.to_string(), "Content and source are required");
    }

    #[test]
    fn accepted_values_are_kept_verbatim() {
        let req = builder(SourcePolicy::Strict, false)
            .resolve(Some("  spaced claim "), Some(" WeChat group "))
            .unwrap();
        assert_eq!(req.content, "  spaced claim ");
        assert_eq!(req.source, " WeChat group ");
    }

    #[test]
    fn single_turn_embeds_content_source_and_every_field() {
        let b = builder(SourcePolicy::Strict, false);
        let req = b
            .resolve(Some("Eating broccoli cures cancer {\"x\":1}"), Some("blog post"))
            .unwrap();
        let chat = b.build(&req);

        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, Role::User);
        let text = all_text(&chat);
        assert!(text.contains("Eating broccoli cures cancer {\"x\":1}"));
        assert!(text.contains("blog post"));
        for field in [
            "stop",
            "investigate_source",
            "find_coverage",
            "trace_claims",
            "credibility_rating",
            "final_advice",
            "learning_tips",
        ] {
            assert!(text.contains(field), "prompt should name {field}");
        }
        assert_eq!(chat.temperature, Some(0.3));
        assert_eq!(chat.max_tokens, Some(2000));
        assert_eq!(chat.model, None);
    }

    #[test]
    fn system_turn_carries_the_persona() {
        let b = PromptBuilder::new(PromptOptions {
            system_turn: true,
            model: Some("ernie-4.0-8k".into()),
            ..Default::default()
        });
        let req = b.resolve(Some("claim"), Some("source")).unwrap();
        let chat = b.build(&req);

        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, Role::System);
        assert!(chat.messages[0].content.contains(PERSONA));
        assert_eq!(chat.messages[1].role, Role::User);
        assert!(chat.messages[1].content.contains("\"claim\""));
        assert_eq!(chat.model.as_deref(), Some("ernie-4.0-8k"));
    }

    #[test]
    fn building_is_deterministic() {
        let b = builder(SourcePolicy::Lenient, true);
        let req = b.resolve(Some("claim"), None).unwrap();
        assert_eq!(b.build(&req), b.build(&req));
    }
}
