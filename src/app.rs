use rand::SeedableRng;
use rand::rngs::SmallRng;

use rekiken::bank::catalog::{BankCatalog, BankStatus};
use rekiken::config::Config;
use rekiken::engine::normalize::Normalizer;
use rekiken::engine::sampler;
use rekiken::engine::segment::{self, RangeSegment, SEGMENTS};
use rekiken::session::quiz::{QuizSession, Verdict};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub const LOAD_FAILED_MESSAGE: &str = "問題データの読み込みに失敗しました";
pub const RANGE_FALLBACK_MESSAGE: &str = "選択レンジに問題がないため全範囲へフォールバックしました";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Question,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuFocus {
    Level,
    Range,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub catalog: BankCatalog,
    pub normalizer: Normalizer,
    pub menu_focus: MenuFocus,
    pub level_selected: usize,
    pub range_selected: usize,
    pub level: Option<String>,
    pub session: QuizSession,
    pub input: LineInput,
    pub last_verdict: Option<Verdict>,
    pub notice: Option<String>,
    pub review_scroll: usize,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, catalog: BankCatalog, theme: &'static Theme, seed: Option<u64>) -> Self {
        let normalizer = config.normalizer();
        let range_selected = segment::segment_index(&config.default_range);
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Self {
            screen: AppScreen::Menu,
            config,
            theme,
            catalog,
            normalizer,
            menu_focus: MenuFocus::Level,
            level_selected: 0,
            range_selected,
            level: None,
            session: QuizSession::default(),
            input: LineInput::new(),
            last_verdict: None,
            notice: None,
            review_scroll: 0,
            should_quit: false,
            rng,
        }
    }

    pub fn segment(&self) -> &'static RangeSegment {
        SEGMENTS.get(self.range_selected).unwrap_or_else(segment::default_segment)
    }

    pub fn level_keys(&self) -> Vec<String> {
        self.catalog.levels().into_iter().map(|(key, _, _)| key).collect()
    }

    pub fn level_label(&self) -> String {
        self.level
            .as_deref()
            .map(rekiken::bank::level_label)
            .unwrap_or_default()
    }

    /// Draw a fresh question set for `level_key` from the selected range and
    /// start answering. A bank that is missing or failed to load yields an
    /// empty session, which lands directly on the finished screen.
    pub fn start_quiz(&mut self, level_key: &str) {
        let segment = self.segment();
        self.level = Some(level_key.to_string());
        self.input.clear();
        self.last_verdict = None;
        self.notice = None;
        self.review_scroll = 0;

        let questions = match self.catalog.status(level_key) {
            BankStatus::Ready(bank) => {
                let sample = sampler::sample(
                    &bank.questions,
                    segment.range,
                    self.config.quiz_count,
                    &mut self.rng,
                );
                if sample.fell_back {
                    self.notice = Some(RANGE_FALLBACK_MESSAGE.to_string());
                }
                sample.questions
            }
            BankStatus::Failed(err) => {
                log::error!("cannot start level {level_key}: {err}");
                self.notice = Some(LOAD_FAILED_MESSAGE.to_string());
                Vec::new()
            }
            BankStatus::Missing => {
                log::error!("cannot start level {level_key}: no such bank");
                self.notice = Some(LOAD_FAILED_MESSAGE.to_string());
                Vec::new()
            }
        };

        log::info!(
            "starting level {level_key}, range {}, {} questions",
            segment.key,
            questions.len()
        );
        self.session = QuizSession::new(questions);
        self.screen = if self.session.is_finished() {
            AppScreen::Finished
        } else {
            AppScreen::Question
        };
    }

    pub fn start_selected(&mut self) {
        let keys = self.level_keys();
        if let Some(key) = keys.get(self.level_selected) {
            self.start_quiz(key);
        }
    }

    pub fn retry(&mut self) {
        if let Some(level) = self.level.clone() {
            self.start_quiz(&level);
        }
    }

    /// Enter on the question screen: judge the typed answer, or move on if
    /// the current question was already judged.
    pub fn submit_answer(&mut self) {
        if self.session.is_answered() {
            self.next_question();
            return;
        }
        if let Some(verdict) = self.session.submit(self.input.value(), &self.normalizer) {
            self.last_verdict = Some(verdict);
        }
    }

    pub fn next_question(&mut self) {
        if !self.session.advance() {
            return;
        }
        self.input.clear();
        self.last_verdict = None;
        if self.session.is_finished() {
            self.review_scroll = 0;
            self.screen = AppScreen::Finished;
        }
    }

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
        self.input.clear();
        self.last_verdict = None;
        if let Some(idx) = self
            .level
            .as_ref()
            .and_then(|level| self.level_keys().iter().position(|k| k == level))
        {
            self.level_selected = idx;
        }
    }

    pub fn toggle_menu_focus(&mut self) {
        self.menu_focus = match self.menu_focus {
            MenuFocus::Level => MenuFocus::Range,
            MenuFocus::Range => MenuFocus::Level,
        };
    }

    pub fn menu_next(&mut self) {
        match self.menu_focus {
            MenuFocus::Level => {
                let count = self.level_keys().len();
                if count > 0 {
                    self.level_selected = (self.level_selected + 1) % count;
                }
            }
            MenuFocus::Range => {
                self.range_selected = (self.range_selected + 1) % SEGMENTS.len();
            }
        }
    }

    pub fn menu_prev(&mut self) {
        match self.menu_focus {
            MenuFocus::Level => {
                let count = self.level_keys().len();
                if count > 0 {
                    self.level_selected = (self.level_selected + count - 1) % count;
                }
            }
            MenuFocus::Range => {
                self.range_selected = (self.range_selected + SEGMENTS.len() - 1) % SEGMENTS.len();
            }
        }
    }

    pub fn scroll_review(&mut self, down: bool) {
        let max = self.session.total().saturating_sub(1);
        self.review_scroll = if down {
            (self.review_scroll + 1).min(max)
        } else {
            self.review_scroll.saturating_sub(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        App::new(Config::default(), BankCatalog::bundled(), theme, Some(42))
    }

    fn answer_current(app: &mut App, right: bool) {
        let text = if right {
            app.session.current().unwrap().canonical_answer().to_string()
        } else {
            "まちがい".to_string()
        };
        app.input.insert_str(&text);
        app.submit_answer();
    }

    #[test]
    fn test_start_quiz_samples_configured_count() {
        let mut app = app();
        app.start_quiz("1");
        assert_eq!(app.screen, AppScreen::Question);
        assert_eq!(app.session.total(), 10);
        assert_eq!(app.level_label(), "1級");
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_range_limits_pool() {
        let mut app = app();
        app.range_selected = segment::segment_index("0-20");
        app.start_quiz("1");
        let bank = app.catalog.bank("1").unwrap();
        let window = &bank.questions[..bank.len().div_ceil(5)];
        for q in app.session.questions() {
            assert!(window.contains(q));
        }
    }

    #[test]
    fn test_answer_flow_to_finished() {
        let mut app = app();
        app.config.quiz_count = 3;
        app.start_quiz("2");

        answer_current(&mut app, true);
        assert!(app.last_verdict.as_ref().unwrap().correct);
        app.submit_answer();
        assert!(app.last_verdict.is_none());
        assert!(app.input.value().is_empty());

        answer_current(&mut app, false);
        assert!(!app.last_verdict.as_ref().unwrap().correct);
        app.next_question();

        answer_current(&mut app, true);
        app.next_question();

        assert_eq!(app.screen, AppScreen::Finished);
        assert_eq!(app.session.score(), 2);
        assert_eq!(app.session.review().len(), 3);
    }

    #[test]
    fn test_next_without_answer_does_nothing() {
        let mut app = app();
        app.start_quiz("1");
        app.next_question();
        assert_eq!(app.session.current_index(), 0);
    }

    #[test]
    fn test_missing_bank_shows_load_failure() {
        let mut app = app();
        app.start_quiz("9");
        assert_eq!(app.screen, AppScreen::Finished);
        assert_eq!(app.session.total(), 0);
        assert_eq!(app.notice.as_deref(), Some(LOAD_FAILED_MESSAGE));
    }

    #[test]
    fn test_retry_resamples_same_level() {
        let mut app = app();
        app.start_quiz("2");
        answer_current(&mut app, true);
        app.retry();
        assert_eq!(app.level.as_deref(), Some("2"));
        assert_eq!(app.session.score(), 0);
        assert_eq!(app.session.current_index(), 0);
        assert_eq!(app.screen, AppScreen::Question);
    }

    #[test]
    fn test_menu_navigation_wraps() {
        let mut app = app();
        app.menu_prev();
        assert_eq!(app.level_selected, 1);
        app.toggle_menu_focus();
        app.menu_prev();
        assert_eq!(app.segment().key, "80-100");
        app.menu_next();
        assert_eq!(app.segment().key, "all");
    }

    #[test]
    fn test_config_range_preselected() {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let mut config = Config::default();
        config.default_range = "40-60".to_string();
        let app = App::new(config, BankCatalog::bundled(), theme, Some(1));
        assert_eq!(app.segment().key, "40-60");
    }

    #[test]
    fn test_same_seed_same_questions() {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let mut a = App::new(Config::default(), BankCatalog::bundled(), theme, Some(5));
        let mut b = App::new(Config::default(), BankCatalog::bundled(), theme, Some(5));
        a.start_quiz("1");
        b.start_quiz("1");
        assert_eq!(a.session.questions(), b.session.questions());
    }
}
