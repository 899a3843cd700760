use std::collections::BTreeMap;

use crate::bank::QuestionRecord;
use crate::engine::normalize::Normalizer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedAnswer {
    pub input: String,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub accepted: Vec<String>,
}

impl Verdict {
    pub fn feedback(&self) -> String {
        if self.correct {
            "正解！".to_string()
        } else {
            format!("不正解。正解：{}", self.accepted.join(" / "))
        }
    }
}

/// One line of the end-of-quiz review table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRow {
    pub number: usize,
    pub prompt: String,
    pub canonical: String,
    pub input: Option<String>,
    pub correct: bool,
}

/// A single run through a sampled question set. The question list is fixed at
/// construction; answers are recorded once per question.
#[derive(Clone, Debug, Default)]
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    current: usize,
    recorded: BTreeMap<usize, RecordedAnswer>,
    score: usize,
}

impl QuizSession {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn current(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn is_answered(&self) -> bool {
        self.recorded.contains_key(&self.current)
    }

    pub fn recorded(&self, index: usize) -> Option<&RecordedAnswer> {
        self.recorded.get(&index)
    }

    /// Judge `input` against the current question. Returns `None` once the
    /// session is over or when the current question already has an answer.
    pub fn submit(&mut self, input: &str, normalizer: &Normalizer) -> Option<Verdict> {
        if self.is_answered() {
            return None;
        }
        let question = self.current()?;
        let correct = normalizer.is_correct(input, &question.accepted_answers);
        let accepted = question.accepted_answers.clone();

        if correct {
            self.score += 1;
        }
        self.recorded.insert(
            self.current,
            RecordedAnswer {
                input: input.to_string(),
                correct,
            },
        );
        Some(Verdict { correct, accepted })
    }

    /// Move past the current question once it has been answered.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() || !self.is_answered() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn accuracy(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.score as f64 / self.questions.len() as f64 * 100.0
    }

    pub fn review(&self) -> Vec<ReviewRow> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let recorded = self.recorded.get(&i);
                ReviewRow {
                    number: i + 1,
                    prompt: q.prompt.clone(),
                    canonical: q.canonical_answer().to_string(),
                    input: recorded.map(|r| r.input.clone()),
                    correct: recorded.is_some_and(|r| r.correct),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<QuestionRecord> {
        vec![
            QuestionRecord::new("江戸幕府を開いた人物", vec!["徳川家康".into(), "トクガワイエヤス".into()]),
            QuestionRecord::new("鎌倉幕府を開いた人物", vec!["源頼朝".into()]),
            QuestionRecord::new("邪馬台国の女王", vec!["卑弥呼".into()]),
        ]
    }

    #[test]
    fn test_new_session() {
        let session = QuizSession::new(questions());
        assert_eq!(session.total(), 3);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert!(!session.is_finished());
        assert!(!session.is_answered());
    }

    #[test]
    fn test_full_run() {
        let n = Normalizer::default();
        let mut session = QuizSession::new(questions());

        let v = session.submit("德川 家康", &n).unwrap();
        assert!(v.correct);
        assert_eq!(v.feedback(), "正解！");
        assert!(session.advance());

        let v = session.submit("足利尊氏", &n).unwrap();
        assert!(!v.correct);
        assert_eq!(v.feedback(), "不正解。正解：源頼朝");
        assert!(session.advance());

        assert!(session.submit("ひみこ", &n).is_some());
        assert!(session.advance());

        assert!(session.is_finished());
        assert_eq!(session.score(), 1);
        assert!(session.current().is_none());
        assert!(session.submit("anything", &n).is_none());
        assert!(!session.advance());
    }

    #[test]
    fn test_double_submit_not_scored_twice() {
        let n = Normalizer::default();
        let mut session = QuizSession::new(questions());
        assert!(session.submit("徳川家康", &n).is_some());
        assert!(session.submit("徳川家康", &n).is_none());
        assert_eq!(session.score(), 1);
        assert_eq!(session.recorded(0).unwrap().input, "徳川家康");
    }

    #[test]
    fn test_advance_requires_answer() {
        let mut session = QuizSession::new(questions());
        assert!(!session.advance());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_feedback_lists_all_accepted() {
        let n = Normalizer::default();
        let mut session = QuizSession::new(questions());
        let v = session.submit("とくがわいえやす", &n).unwrap();
        assert_eq!(v.feedback(), "不正解。正解：徳川家康 / トクガワイエヤス");
    }

    #[test]
    fn test_empty_session_is_finished() {
        let n = Normalizer::default();
        let mut session = QuizSession::new(Vec::new());
        assert!(session.is_finished());
        assert_eq!(session.total(), 0);
        assert_eq!(session.accuracy(), 0.0);
        assert!(session.submit("x", &n).is_none());
        assert!(session.review().is_empty());
    }

    #[test]
    fn test_review_rows() {
        let n = Normalizer::default();
        let mut session = QuizSession::new(questions());
        session.submit("徳川家康", &n);
        session.advance();
        session.submit("", &n);
        session.advance();

        let rows = session.review();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[0].canonical, "徳川家康");
        assert!(rows[0].correct);
        assert_eq!(rows[1].input.as_deref(), Some(""));
        assert!(!rows[1].correct);
        assert_eq!(rows[2].input, None);
        assert!(!rows[2].correct);
    }

    #[test]
    fn test_accuracy() {
        let n = Normalizer::default();
        let mut session = QuizSession::new(questions());
        session.submit("徳川家康", &n);
        assert!((session.accuracy() - 100.0 / 3.0).abs() < 1e-9);
    }
}
