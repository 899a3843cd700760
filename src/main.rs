mod app;
mod event;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use rekiken::bank::catalog::BankCatalog;
use rekiken::config::Config;
use rekiken::engine::segment;

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::menu::{LevelItem, QuizMenu};
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::components::review_table::ReviewTable;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::line_input::InputResult;
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "rekiken", version, about = "Free-text Japanese history quiz in the terminal")]
struct Cli {
    #[arg(short, long, help = "Level to start immediately (bank key, e.g. 1 or 2)")]
    level: Option<String>,

    #[arg(short, long, help = "Range segment: all, 0-20, 20-40, 40-60, 60-80, 80-100")]
    range: Option<String>,

    #[arg(short = 'n', long, help = "Number of questions per quiz")]
    count: Option<usize>,

    #[arg(long, help = "Seed for question sampling")]
    seed: Option<u64>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory with <level>.json question banks")]
    bank_dir: Option<PathBuf>,

    #[arg(long, help = "Write the effective configuration to the config file and exit")]
    init_config: bool,
}

fn log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rekiken")
        .join("rekiken.log")
}

/// Log to a file; stderr would draw over the alternate screen.
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let path = log_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load().unwrap_or_else(|err| {
        log::warn!("config not loaded, using defaults: {err:#}");
        Config::default()
    });
    if let Some(count) = cli.count {
        config.quiz_count = count.max(1);
    }
    if let Some(range) = cli.range.as_deref() {
        if !segment::is_known_key(range) {
            log::warn!("unknown range '{range}', using the whole bank");
        }
        config.default_range = segment::segment_for_key(range).key.to_string();
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = cli.bank_dir {
        config.bank_dir = Some(dir.to_string_lossy().to_string());
    }

    if cli.init_config {
        config.save()?;
        println!("{}", Config::config_dir().join("config.toml").display());
        return Ok(());
    }

    let catalog = BankCatalog::load(Some(&config.bank_dir()));
    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        log::warn!(
            "theme '{}' not found (bundled: {}), using default",
            config.theme,
            Theme::available_themes().join(", ")
        );
        Theme::default()
    });
    log::info!("using theme {}", theme.name);
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let mut app = App::new(config, catalog, theme, cli.seed);
    if let Some(level) = cli.level.as_deref() {
        app.start_quiz(level.trim());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => {
                if app.screen == AppScreen::Question && !app.session.is_answered() {
                    app.input.insert_str(&text);
                }
            }
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Question => handle_question_key(app, key),
        AppScreen::Finished => handle_finished_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
            app.toggle_menu_focus()
        }
        KeyCode::Up | KeyCode::Char('k') => app.menu_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
        KeyCode::Enter => app.start_selected(),
        KeyCode::Char(ch) if ch.is_ascii_digit() => start_level_by_key(app, ch),
        _ => {}
    }
}

fn handle_question_key(app: &mut App, key: KeyEvent) {
    if app.session.is_answered() {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right => app.next_question(),
            KeyCode::Esc => app.go_to_menu(),
            _ => {}
        }
        return;
    }

    match app.input.handle(key) {
        InputResult::Submit => app.submit_answer(),
        InputResult::Cancel => app.go_to_menu(),
        InputResult::Continue => {}
    }
}

fn handle_finished_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('r') | KeyCode::Enter => app.retry(),
        KeyCode::Char('m') | KeyCode::Esc => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_review(false),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_review(true),
        KeyCode::Char(ch) if ch.is_ascii_digit() => start_level_by_key(app, ch),
        _ => {}
    }
}

/// Digit shortcut: start the level whose key is that digit, keeping the range.
fn start_level_by_key(app: &mut App, ch: char) {
    let key = ch.to_string();
    if let Some(idx) = app.level_keys().iter().position(|k| *k == key) {
        app.level_selected = idx;
        app.start_quiz(&key);
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Question => render_question(frame, app),
        AppScreen::Finished => render_finished(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " rekiken ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let line = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        line,
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());

    render_header(frame, app, layout.header, "| 級と範囲を選択");

    let levels = app
        .catalog
        .levels()
        .into_iter()
        .map(|(key, label, count)| LevelItem { key, label, count })
        .collect();
    let menu = QuizMenu::new(
        levels,
        app.level_selected,
        app.range_selected,
        app.menu_focus,
        app.theme,
    );
    let menu_area = ui::layout::centered_rect(50, 80, layout.main);
    frame.render_widget(&menu, menu_area);

    render_footer(
        frame,
        app,
        layout.footer,
        &["[Enter] 開始", "[Tab] 級/範囲", "[↑↓] 選択", "[1-9] 級で開始", "[q] 終了"],
    );
}

fn render_question(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    let colors = &app.theme.colors;
    let session = &app.session;

    let Some(question) = session.current() else {
        return;
    };

    let info = format!(
        "| {} | 第 {} 問 / 全 {} 問（{}）| 得点 {}",
        app.level_label(),
        session.current_index() + 1,
        session.total(),
        app.segment().label,
        session.score(),
    );
    render_header(frame, app, layout.header, &info);

    let mut constraints = vec![Constraint::Min(9), Constraint::Length(3)];
    if app.notice.is_some() {
        constraints.insert(0, Constraint::Length(1));
    }
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(layout.main);

    let mut idx = 0;
    if let Some(ref notice) = app.notice {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {notice}"),
                Style::default().fg(colors.warning()),
            )),
            main[idx],
        );
        idx += 1;
    }

    let card = QuestionCard::new(
        &question.prompt,
        &app.input,
        app.last_verdict.as_ref(),
        app.theme,
    );
    frame.render_widget(card, main[idx]);

    let answered = session.current_index() + usize::from(session.is_answered());
    let progress = ProgressBar::new("進捗", answered, session.total(), app.theme);
    frame.render_widget(progress, main[idx + 1]);

    let hints: &[&str] = if session.is_answered() {
        &["[Enter] 次へ", "[Esc] メニュー"]
    } else {
        &["[Enter] 判定", "[Esc] メニュー", "[Ctrl+U] 消去"]
    };
    render_footer(frame, app, layout.footer, hints);
}

fn render_finished(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    let colors = &app.theme.colors;
    let session = &app.session;

    render_header(frame, app, layout.header, &format!("| {} 終了", app.level_label()));

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(layout.main);

    let mut summary = vec![Line::from(Span::styled(
        format!(" 終了：得点 {} / {}", session.score(), session.total()),
        Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD),
    ))];
    if session.total() > 0 {
        summary.push(Line::from(Span::styled(
            format!(" 正答率 {:.0}%（{}）", session.accuracy(), app.segment().label),
            Style::default().fg(colors.fg()),
        )));
    }
    if let Some(ref notice) = app.notice {
        summary.push(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(colors.warning()),
        )));
    }
    summary.push(Line::from(Span::styled(
        " おつかれさまでした。[r] で再挑戦できます。",
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(Paragraph::new(summary), main[0]);

    let rows = session.review();
    if !rows.is_empty() {
        let table = ReviewTable::new(&rows, app.review_scroll, app.theme);
        frame.render_widget(table, main[1]);
    }

    render_footer(
        frame,
        app,
        layout.footer,
        &["[r] 再挑戦", "[1-9] 級を変えて再挑戦", "[↑↓] スクロール", "[m] メニュー", "[q] 終了"],
    );
}
