use std::collections::HashSet;
use std::fs;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use rekiken::bank::QuestionRecord;
use rekiken::bank::catalog::BankCatalog;
use rekiken::engine::normalize::{self, Normalizer};
use rekiken::engine::sampler::{sample, slice_by_percent_range};
use rekiken::engine::segment::{PercentRange, SEGMENTS, segment_for_key};
use rekiken::session::quiz::QuizSession;

fn trivial_bank(prompts: &[&str]) -> Vec<QuestionRecord> {
    prompts
        .iter()
        .map(|p| QuestionRecord::new(*p, vec![format!("{p}-answer")]))
        .collect()
}

#[test]
fn small_bank_returns_everything_shuffled() {
    let bank = trivial_bank(&["Q1", "Q2", "Q3", "Q4", "Q5"]);
    let mut rng = SmallRng::seed_from_u64(2024);
    let drawn = sample(&bank, None, 10, &mut rng);

    assert_eq!(drawn.questions.len(), 5);
    let got: HashSet<&str> = drawn.questions.iter().map(|q| q.prompt.as_str()).collect();
    let want: HashSet<&str> = bank.iter().map(|q| q.prompt.as_str()).collect();
    assert_eq!(got, want);
}

#[test]
fn every_segment_of_bundled_banks_is_non_empty() {
    let catalog = BankCatalog::bundled();
    for key in ["1", "2"] {
        let bank = catalog.bank(key).unwrap();
        for seg in SEGMENTS {
            let pool = slice_by_percent_range(&bank.questions, seg.range);
            assert!(!pool.is_empty(), "level {key} segment {} is empty", seg.key);
        }
    }
}

#[test]
fn bundled_answers_match_themselves() {
    let catalog = BankCatalog::bundled();
    let normalizer = Normalizer::default();
    for key in ["1", "2"] {
        for q in &catalog.bank(key).unwrap().questions {
            for answer in &q.accepted_answers {
                assert!(normalizer.is_correct(answer, &q.accepted_answers));
                let once = normalizer.normalize(answer);
                assert!(!once.is_empty(), "answer {answer:?} normalizes to nothing");
                assert_eq!(normalizer.normalize(&once), once);
            }
        }
    }
}

#[test]
fn full_session_over_range_segment() {
    let catalog = BankCatalog::bundled();
    let bank = catalog.bank("2").unwrap();
    let seg = segment_for_key("20-40");
    let mut rng = SmallRng::seed_from_u64(99);
    let drawn = sample(&bank.questions, seg.range, 10, &mut rng);
    let window = slice_by_percent_range(&bank.questions, seg.range);
    assert_eq!(drawn.questions.len(), window.len());

    let normalizer = Normalizer::default();
    let mut session = QuizSession::new(drawn.questions);
    while let Some(q) = session.current() {
        // Full-width, spaced, punctuated spelling of the canonical answer.
        let typed = format!("「{}」　", q.canonical_answer());
        let verdict = session.submit(&typed, &normalizer).unwrap();
        assert!(verdict.correct, "{typed:?} rejected");
        assert!(session.advance());
    }
    assert!(session.is_finished());
    assert_eq!(session.score(), session.total());
    assert!(session.review().iter().all(|row| row.correct));
}

#[test]
fn user_bank_directory_feeds_sampler() {
    let dir = tempfile::tempdir().unwrap();
    let questions: Vec<String> = (0..100)
        .map(|i| format!(r#"{{"q": "問{i}", "answers": ["答{i}"]}}"#))
        .collect();
    fs::write(dir.path().join("5.json"), format!("[{}]", questions.join(","))).unwrap();

    let catalog = BankCatalog::load(Some(dir.path()));
    let bank = catalog.bank("5").unwrap();
    let range = PercentRange::new(20, 40).ok();
    let pool = slice_by_percent_range(&bank.questions, range);
    assert_eq!(pool.first().unwrap().prompt, "問20");
    assert_eq!(pool.last().unwrap().prompt, "問39");
}

#[test]
fn kana_scripts_are_not_crossed() {
    assert!(!normalize::is_correct(
        "とくがわいえやす",
        &["徳川家康", "トクガワイエヤス"]
    ));
    assert!(normalize::is_correct("ﾄｸｶﾞﾜｲｴﾔｽ", &["徳川家康", "トクガワイエヤス"]));
}
