use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::QuestionRecord;
use crate::engine::segment::PercentRange;

/// Questions drawn for one session.
#[derive(Clone, Debug, Default)]
pub struct Sample {
    pub questions: Vec<QuestionRecord>,
    /// The requested range selected nothing and the whole bank was used instead.
    pub fell_back: bool,
}

/// Slice `bank` to the percentage window. `start` rounds down and `end` rounds
/// up, and a non-empty bank always yields at least one question.
pub fn slice_by_percent_range<T>(bank: &[T], range: Option<PercentRange>) -> &[T] {
    let n = bank.len();
    let Some(range) = range else {
        return bank;
    };
    if n == 0 {
        return bank;
    }

    let lower = range.lower() as usize;
    let upper = range.upper() as usize;
    let start = (n * lower / 100).min(n - 1);
    let end = (n * upper).div_ceil(100).clamp((start + 1).min(n), n);
    &bank[start..end]
}

pub fn sample<R: Rng + ?Sized>(
    bank: &[QuestionRecord],
    range: Option<PercentRange>,
    count: usize,
    rng: &mut R,
) -> Sample {
    let sliced = slice_by_percent_range(bank, range);
    let fell_back = sliced.is_empty() && !bank.is_empty();
    let mut pool = if fell_back {
        log::warn!(
            "range {:?} selected no questions from a bank of {}; using the whole bank",
            range,
            bank.len()
        );
        bank.to_vec()
    } else {
        sliced.to_vec()
    };

    pool.shuffle(rng);
    pool.truncate(count);
    Sample {
        questions: pool,
        fell_back,
    }
}
