use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::domain::MatchMode;

/// Request to score a single pair
///
/// `searcher` and `listing` are raw records; they are normalized by the
/// engine, so a wrong field type surfaces as a 400 naming the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub searcher: Value,
    pub listing: Value,
    #[serde(default)]
    pub mode: MatchMode,
}

/// A candidate record tagged with the caller's identifier
///
/// Deserializing never fails, so one badly shaped entry cannot reject the
/// whole batch. Numeric ids are accepted as their decimal text. An entry
/// that is not an object or lacks a usable id carries a `defect` and is
/// reported as a failed entry; a missing `record` is left as `null` and
/// rejected by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct BatchCandidate {
    pub candidate_id: String,
    pub record: Value,
    #[serde(skip)]
    pub defect: Option<String>,
}

impl BatchCandidate {
    pub fn new(candidate_id: impl Into<String>, record: Value) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            record,
            defect: None,
        }
    }

    fn defective(candidate_id: String, record: Value, reason: &str) -> Self {
        Self {
            candidate_id,
            record,
            defect: Some(reason.to_string()),
        }
    }
}

impl From<Value> for BatchCandidate {
    fn from(entry: Value) -> Self {
        let Value::Object(mut fields) = entry else {
            return Self::defective(String::new(), Value::Null, "candidate entry is not a JSON object");
        };

        let record = fields.remove("record").unwrap_or(Value::Null);
        let id = fields
            .remove("candidate_id")
            .or_else(|| fields.remove("candidateId"));

        match id {
            Some(Value::String(id)) if !id.trim().is_empty() => Self::new(id, record),
            Some(Value::Number(id)) => Self::new(id.to_string(), record),
            _ => Self::defective(
                String::new(),
                record,
                "candidate_id must be a non-empty string or a number",
            ),
        }
    }
}

/// Request to rank many candidates against one profile
///
/// In forward mode `profile` is a searcher and candidates are listings; in
/// reverse mode `profile` is a listing and candidates are applicants.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchMatchRequest {
    pub profile: Value,
    #[serde(default)]
    pub mode: MatchMode,
    #[validate(length(min = 1, max = 10000))]
    pub candidates: Vec<BatchCandidate>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "topK")]
    pub top_k: Option<usize>,
    #[validate(range(min = 1, max = 256))]
    #[serde(default)]
    pub concurrency: Option<usize>,
}
