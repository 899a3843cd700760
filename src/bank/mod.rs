pub mod catalog;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("question bank '{key}' not found")]
    NotFound { key: String },
    #[error("question bank '{key}' is not a JSON array of questions: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("question bank '{key}' entry {index}: {reason}")]
    InvalidEntry {
        key: String,
        index: usize,
        reason: &'static str,
    },
    #[error("failed to read question bank '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// One quiz item. The first accepted answer is the canonical spelling shown
/// in feedback and review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "q", alias = "prompt")]
    pub prompt: String,
    #[serde(rename = "answers", alias = "accepted_answers")]
    pub accepted_answers: Vec<String>,
}

impl QuestionRecord {
    pub fn new(prompt: impl Into<String>, accepted_answers: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            accepted_answers,
        }
    }

    pub fn canonical_answer(&self) -> &str {
        self.accepted_answers
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), &'static str> {
        if self.prompt.trim().is_empty() {
            return Err("empty question text");
        }
        if self.accepted_answers.is_empty() {
            return Err("no accepted answers");
        }
        if self.accepted_answers.iter().any(|a| a.trim().is_empty()) {
            return Err("blank accepted answer");
        }
        Ok(())
    }
}

/// All questions for one level, oldest first.
#[derive(Clone, Debug)]
pub struct QuestionBank {
    pub key: String,
    pub label: String,
    pub questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    pub fn from_json(key: &str, text: &str) -> Result<Self, BankError> {
        let questions: Vec<QuestionRecord> =
            serde_json::from_str(text).map_err(|source| BankError::Parse {
                key: key.to_string(),
                source,
            })?;

        for (index, question) in questions.iter().enumerate() {
            question.check().map_err(|reason| BankError::InvalidEntry {
                key: key.to_string(),
                index,
                reason,
            })?;
        }

        Ok(Self {
            key: key.to_string(),
            label: level_label(key),
            questions,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

pub fn level_label(key: &str) -> String {
    format!("{key}級")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_field_names() {
        let json = r#"[
            {"q": "江戸幕府を開いた人物は？", "answers": ["徳川家康", "とくがわいえやす"]},
            {"q": "鎌倉幕府の初代将軍は？", "answers": ["源頼朝"]}
        ]"#;
        let bank = QuestionBank::from_json("1", json).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.label, "1級");
        assert_eq!(bank.questions[0].canonical_answer(), "徳川家康");
    }

    #[test]
    fn test_parse_long_field_names() {
        let json = r#"[{"prompt": "問", "accepted_answers": ["答"]}]"#;
        let bank = QuestionBank::from_json("x", json).unwrap();
        assert_eq!(bank.questions[0].prompt, "問");
    }

    #[test]
    fn test_reject_non_array() {
        let err = QuestionBank::from_json("2", r#"{"q": "a"}"#).unwrap_err();
        assert!(matches!(err, BankError::Parse { ref key, .. } if key == "2"));
    }

    #[test]
    fn test_reject_non_string_answer() {
        let err = QuestionBank::from_json("2", r#"[{"q": "a", "answers": [1]}]"#).unwrap_err();
        assert!(matches!(err, BankError::Parse { .. }));
    }

    #[test]
    fn test_reject_empty_answers_with_index() {
        let json = r#"[
            {"q": "ok", "answers": ["a"]},
            {"q": "bad", "answers": []}
        ]"#;
        let err = QuestionBank::from_json("1", json).unwrap_err();
        match err {
            BankError::InvalidEntry { index, reason, .. } => {
                assert_eq!(index, 1);
                assert_eq!(reason, "no accepted answers");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reject_blank_prompt_and_answer() {
        let err = QuestionBank::from_json("1", r#"[{"q": "  ", "answers": ["a"]}]"#).unwrap_err();
        assert!(err.to_string().contains("empty question text"));
        let err = QuestionBank::from_json("1", r#"[{"q": "q", "answers": [" "]}]"#).unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_empty_array_is_valid() {
        let bank = QuestionBank::from_json("1", "[]").unwrap();
        assert!(bank.is_empty());
    }
}
