//! Rewrite strategies and their prompts

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the rewrite provider is asked to transform a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStrategy {
    /// Make the question a better retrieval input
    #[default]
    Simple,
    /// Resolve dependence on earlier turns into a standalone question
    ContextDependent,
    /// Spell out the entities being compared
    Comparative,
    /// Replace vague references ("it", "this one") with their referents
    AmbiguousReference,
    /// Split a compound question into independent sub-questions
    MultiIntent,
    /// Turn a rhetorical or emotional statement into a neutral question
    Rhetorical,
    /// Ask the provider to classify the query first, then apply the
    /// matching strategy. Normal queries are left as they are.
    Auto,
}

impl RewriteStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::ContextDependent => "context_dependent",
            Self::Comparative => "comparative",
            Self::AmbiguousReference => "ambiguous_reference",
            Self::MultiIntent => "multi_intent",
            Self::Rhetorical => "rhetorical",
            Self::Auto => "auto",
        }
    }

    /// Whether the prompt includes the conversation transcript
    pub fn uses_history(&self) -> bool {
        matches!(
            self,
            Self::ContextDependent
                | Self::Comparative
                | Self::AmbiguousReference
                | Self::Rhetorical
                | Self::Auto
        )
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Simple | Self::Auto => "",
            Self::ContextDependent => {
                "You are a query optimization assistant. Decide whether the current question \
                 depends on the earlier conversation. If it does, rewrite it as a standalone \
                 question that carries all the context it needs. If it does not, return it unchanged."
            }
            Self::Comparative => {
                "You are a query analysis expert. Identify the objects the user wants to compare, \
                 then rewrite the question as an explicit comparison suited to knowledge base search."
            }
            Self::AmbiguousReference => {
                "You resolve ambiguity. Find what vague references such as \"it\", \"this\" or \
                 \"both\" in the current question point to in the conversation, and replace them \
                 with the explicit names to produce a clear question."
            }
            Self::MultiIntent => {
                "You decompose tasks. Split the user's complex question into independent, simple \
                 questions that can each be answered on their own. Output a JSON array."
            }
            Self::Rhetorical => {
                "You understand communication. Identify the real intent behind the user's \
                 rhetorical or emotional statement and rewrite it as a neutral, objective question \
                 suitable for knowledge base search."
            }
        }
    }
}

impl fmt::Display for RewriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query category reported by the detection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    ContextDependent,
    Comparative,
    AmbiguousReference,
    MultiIntent,
    Rhetorical,
    Normal,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContextDependent => "context_dependent",
            Self::Comparative => "comparative",
            Self::AmbiguousReference => "ambiguous_reference",
            Self::MultiIntent => "multi_intent",
            Self::Rhetorical => "rhetorical",
            Self::Normal => "normal",
        }
    }

    /// Map a detector label onto a type. Labels are matched loosely
    /// ("Multi-intent", "multi intent query"); anything unknown is `Normal`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_");
        if label.contains("context") {
            Self::ContextDependent
        } else if label.contains("compar") {
            Self::Comparative
        } else if label.contains("ambiguous") {
            Self::AmbiguousReference
        } else if label.contains("multi") {
            Self::MultiIntent
        } else if label.contains("rhetorical") {
            Self::Rhetorical
        } else {
            Self::Normal
        }
    }

    /// Strategy to rewrite this type with; `None` keeps the query as is
    pub fn strategy(&self) -> Option<RewriteStrategy> {
        match self {
            Self::ContextDependent => Some(RewriteStrategy::ContextDependent),
            Self::Comparative => Some(RewriteStrategy::Comparative),
            Self::AmbiguousReference => Some(RewriteStrategy::AmbiguousReference),
            Self::MultiIntent => Some(RewriteStrategy::MultiIntent),
            Self::Rhetorical => Some(RewriteStrategy::Rhetorical),
            Self::Normal => None,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct Detection {
    #[serde(default)]
    query_type: String,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Build the prompt asking the provider to classify a query
pub fn build_detection_prompt(query: &str, history: &str) -> String {
    format!(
        "### Instruction ###\n\
         You are a query analysis expert. Classify the user's query as exactly one of:\n\
         1. context_dependent - relies on earlier turns, e.g. \"what else\", \"any others\"\n\
         2. comparative - compares things, e.g. \"which is better\", \"compare\", \"more\"\n\
         3. ambiguous_reference - uses vague references such as \"it\", \"they\", \"this one\"\n\
         4. multi_intent - asks several independent questions at once\n\
         5. rhetorical - a rhetorical or emotional question, e.g. \"surely it can't...\"\n\
         6. normal - a regular question that fits none of the above\n\n\
         When a query is both multi_intent and ambiguous_reference, answer multi_intent.\n\
         Reply with JSON only, in this format:\n\
         {{\"query_type\": \"normal\", \"confidence\": 0.8}}\n\n\
         ### Conversation history ###\n{}\n\n\
         ### Query ###\n{}\n\n\
         ### Classification (JSON) ###\n",
        history, query
    )
}

/// Parse a detection response. Code fences are tolerated; a response
/// that is not the expected JSON object counts as `Normal`.
pub fn parse_query_type(response: &str) -> QueryType {
    let cleaned = response
        .trim()
        .replace("```json", "")
        .replace("```", "");

    match serde_json::from_str::<Detection>(cleaned.trim()) {
        Ok(detection) => {
            let query_type = QueryType::from_label(&detection.query_type);
            tracing::debug!(
                "Detected query type {} (label '{}', confidence {:?})",
                query_type,
                detection.query_type,
                detection.confidence
            );
            query_type
        }
        Err(e) => {
            tracing::warn!("Could not parse query type detection '{}': {}", response.trim(), e);
            QueryType::Normal
        }
    }
}

/// Build the rewrite prompt for a query and, when used, the transcript.
///
/// `Auto` is resolved through detection before a rewrite prompt is
/// needed; given here it gets the simple prompt.
pub fn build_rewrite_prompt(strategy: RewriteStrategy, query: &str, history: &str) -> String {
    match strategy {
        RewriteStrategy::Simple | RewriteStrategy::Auto => format!(
            "Optimize the following user question so it works better as input to a retrieval \
             system. Return only the optimized question, without any explanation or preamble.\n\
             Original question: {}\n\
             Optimized question:",
            query
        ),
        RewriteStrategy::MultiIntent => format!(
            "### Instruction ###\n{}\n\n\
             ### Original question ###\n{}\n\n\
             ### Sub-questions ###\n\
             Output a JSON array, for example: [\"question 1\", \"question 2\", \"question 3\"]\n",
            strategy.instruction(),
            query
        ),
        _ => format!(
            "### Instruction ###\n{}\n\n\
             ### Conversation history ###\n{}\n\n\
             ### Current question ###\n{}\n\n\
             ### Rewritten question ###\n",
            strategy.instruction(),
            history,
            query
        ),
    }
}

/// Parse a decomposition response into sub-questions.
///
/// Markdown code fences are tolerated. Anything that is not a JSON array
/// of strings is returned as a single question.
pub fn parse_sub_questions(response: &str) -> Vec<String> {
    let cleaned = response
        .trim()
        .replace("```json", "")
        .replace("```", "");
    let cleaned = cleaned.trim();

    match serde_json::from_str::<Vec<String>>(cleaned) {
        Ok(questions) => questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect(),
        Err(e) => {
            tracing::debug!("Decomposition is not a JSON array ({}), using raw response", e);
            vec![response.trim().to_string()]
        }
    }
}
