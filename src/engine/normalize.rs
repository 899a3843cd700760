use std::collections::BTreeMap;
use std::sync::OnceLock;

use icu_normalizer::ComposingNormalizerBorrowed;

/// Katakana-Hiragana prolonged sound mark. Half-width ｰ folds into it under NFKC.
pub const LONG_VOWEL_MARK: char = '\u{30FC}';

/// Punctuation and symbol blocks removed before comparison.
const DENYLIST: &[(char, char)] = &[
    ('\u{0020}', '\u{002F}'),
    ('\u{003A}', '\u{0040}'),
    ('\u{005B}', '\u{0060}'),
    ('\u{007B}', '\u{00BF}'),
    ('\u{2000}', '\u{206F}'),
    ('\u{3000}', '\u{303F}'),
    ('\u{30FB}', '\u{30FB}'),
];

/// Ideographic marks inside the CJK punctuation block that behave as letters.
const KEPT_MARKS: &[char] = &['々', '〆', '〇'];

/// Historical (kyūjitai) forms accepted in place of their modern equivalents.
pub const HISTORICAL_VARIANTS: &[(char, char)] = &[
    ('龍', '竜'),
    ('龜', '亀'),
    ('國', '国'),
    ('體', '体'),
    ('舊', '旧'),
    ('德', '徳'),
    ('邊', '辺'),
    ('濱', '浜'),
    ('齋', '斎'),
    ('穗', '穂'),
    ('冨', '富'),
    ('權', '権'),
    ('歷', '歴'),
    ('豫', '予'),
    ('專', '専'),
    ('圓', '円'),
    ('樂', '楽'),
    ('齡', '齢'),
    ('勳', '勲'),
];

/// Canonicalizes free-text answers so cosmetic differences (width, case,
/// punctuation, the long-vowel mark, old character forms) never cause a miss.
#[derive(Clone, Debug)]
pub struct Normalizer {
    strip_long_vowel: bool,
    variants: BTreeMap<char, char>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            strip_long_vowel: true,
            variants: HISTORICAL_VARIANTS.iter().copied().collect(),
        }
    }
}

impl Normalizer {
    pub fn new(strip_long_vowel: bool) -> Self {
        Self {
            strip_long_vowel,
            ..Self::default()
        }
    }

    /// Add a variant mapping on top of the built-in table. Later calls win.
    pub fn with_variant(mut self, from: char, to: char) -> Self {
        if from != to {
            self.variants.insert(from, to);
        }
        self
    }

    /// Add every single-character mapping from `extra`; multi-character keys
    /// or values are skipped and returned so the caller can report them.
    pub fn with_variants<'a, I>(mut self, extra: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut skipped = Vec::new();
        for (from, to) in extra {
            match (single_char(from), single_char(to)) {
                (Some(f), Some(t)) => self = self.with_variant(f, t),
                _ => skipped.push(format!("{from} -> {to}")),
            }
        }
        (self, skipped)
    }

    pub fn strips_long_vowel(&self) -> bool {
        self.strip_long_vowel
    }

    pub fn normalize(&self, s: &str) -> String {
        let nfkc = ComposingNormalizerBorrowed::new_nfkc();

        let folded = nfkc.normalize(s).to_lowercase();
        let filtered: String = folded
            .chars()
            .filter(|&ch| !self.is_dropped(ch))
            .map(|ch| self.variants.get(&ch).copied().unwrap_or(ch))
            .collect();

        // Dropping characters can bring a base letter next to a combining mark.
        nfkc.normalize(&filtered).to_string()
    }

    pub fn is_correct<S: AsRef<str>>(&self, input: &str, answers: &[S]) -> bool {
        let needle = self.normalize(input);
        answers
            .iter()
            .any(|answer| self.normalize(answer.as_ref()) == needle)
    }

    fn is_dropped(&self, ch: char) -> bool {
        if KEPT_MARKS.contains(&ch) {
            return false;
        }
        if ch.is_whitespace() || ch.is_control() {
            return true;
        }
        if self.strip_long_vowel && ch == LONG_VOWEL_MARK {
            return true;
        }
        DENYLIST.iter().any(|&(lo, hi)| (lo..=hi).contains(&ch))
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

fn default_normalizer() -> &'static Normalizer {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default)
}

/// Normalize with the built-in rule set.
pub fn normalize(s: &str) -> String {
    default_normalizer().normalize(s)
}

/// Match `input` against `answers` with the built-in rule set.
pub fn is_correct<S: AsRef<str>>(input: &str, answers: &[S]) -> bool {
    default_normalizer().is_correct(input, answers)
}
