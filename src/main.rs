use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use rust_i18n::t;

use wortkarten::app::{Action, App, AppMode, Effect, Variant, execute};
use wortkarten::config::{Config, TransportKind};
use wortkarten::event::{AppEvent, EventHandler};
use wortkarten::keymap;
use wortkarten::remote::prompt::SourceMode;
use wortkarten::remote::{ModelClient, default_client};
use wortkarten::store::{FileStorage, MemoryStorage, Storage};
use wortkarten::ui::components::card_view::CardView;
use wortkarten::ui::components::category_menu::CategoryMenu;
use wortkarten::ui::components::chat_panel::ChatPanel;
use wortkarten::ui::components::history_list::HistoryList;
use wortkarten::ui::components::notice_popup::NoticePopup;
use wortkarten::ui::components::progress_bar::ProgressBar;
use wortkarten::ui::components::text_field::TextField;
use wortkarten::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use wortkarten::ui::theme::Theme;

rust_i18n::i18n!("locales", fallback = "en");

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Parser)]
#[command(
    name = "wortkarten",
    version,
    about = "German vocabulary flashcards in the terminal"
)]
struct Cli {
    #[arg(long, help = "Study the bundled categories instead of generating sets")]
    categories: bool,

    #[arg(short, long, help = "Interface language (ru, en)")]
    locale: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory for saved sets, progress and the log file")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Endpoint of the generation proxy")]
    proxy_url: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|d| d.join("wortkarten")))
        .unwrap_or_else(|| PathBuf::from("."));
    init_logging(&data_dir);

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("config unreadable, using defaults: {e}");
        Config::default()
    });
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(url) = cli.proxy_url {
        config.proxy_url = url;
    }
    config.validate(&Theme::available_themes());
    rust_i18n::set_locale(&config.locale);

    let storage = open_storage(cli.data_dir.map(|d| d.join("store")));
    let client: Arc<dyn ModelClient> = Arc::from(default_client(config.request_timeout()));
    let variant = if cli.categories {
        Variant::Categories
    } else {
        Variant::Generator
    };
    log::info!("starting in {variant:?} mode");
    let mut app = App::new(variant, config, storage);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut app, &events, &client);

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

/// Log to a file so output never lands on the TUI. `RUST_LOG` overrides
/// the default `info` level.
fn init_logging(data_dir: &Path) {
    let file = fs::create_dir_all(data_dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join("wortkarten.log"))
    });
    let Ok(file) = file else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn open_storage(dir: Option<PathBuf>) -> Box<dyn Storage> {
    let opened = match dir {
        Some(dir) => FileStorage::with_base_dir(dir),
        None => FileStorage::new(),
    };
    match opened {
        Ok(storage) => {
            log::info!("storing sets in {}", storage.base_dir().display());
            Box::new(storage)
        }
        Err(e) => {
            log::error!("falling back to in-memory storage: {e}");
            Box::new(MemoryStorage::new())
        }
    }
}

fn run_app<S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    events: &EventHandler,
    client: &Arc<dyn ModelClient>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        let now = Instant::now();
        match events.next()? {
            AppEvent::Key(key) => {
                if let Some(action) = keymap::map_key(app, key) {
                    let effect = app.dispatch(action, now);
                    run_effect(app, effect, events, client);
                }
            }
            AppEvent::Paste(text) => keymap::map_paste(app, &text),
            AppEvent::Completed(action) => {
                let effect = app.dispatch(action, now);
                run_effect(app, effect, events, client);
            }
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Network effects run on a worker thread and report back through the
/// event channel; everything else runs inline.
fn run_effect<S: Storage>(
    app: &mut App<S>,
    effect: Option<Effect>,
    events: &EventHandler,
    client: &Arc<dyn ModelClient>,
) {
    let Some(effect) = effect else {
        return;
    };
    match effect {
        Effect::PersistConfig(config) => {
            if let Err(e) = config.save() {
                log::error!("could not save settings: {e}");
                app.dispatch(Action::SettingsSaveFailed(e.to_string()), Instant::now());
            }
        }
        effect => {
            let tx = events.sender();
            let client = Arc::clone(client);
            thread::spawn(move || {
                if let Some(action) = execute(&effect, client.as_ref()) {
                    let _ = tx.send(AppEvent::Completed(action));
                }
            });
        }
    }
}

fn render<S: Storage>(frame: &mut ratatui::Frame, app: &App<S>) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area, app.chat.open);
    render_header(frame, app, layout.header);

    match app.mode {
        AppMode::Create => render_create(frame, app, layout.main),
        AppMode::Loading => render_loading(frame, app, layout.main),
        AppMode::Study | AppMode::Cards => render_cards(frame, app, layout.main),
        AppMode::History => frame.render_widget(
            HistoryList::new(
                &app.history,
                app.history_selected,
                app.armed_delete.as_deref(),
                &app.theme,
            ),
            layout.main,
        ),
        AppMode::Home => frame.render_widget(
            CategoryMenu::new(
                &app.categories,
                &app.progress,
                app.category_selected,
                &app.theme,
            ),
            centered_rect(60, 100, layout.main),
        ),
    }

    render_footer(frame, app, layout.footer);

    if app.chat.open {
        let chat = ChatPanel::new(&app.chat, &app.theme);
        match layout.sidebar {
            Some(sidebar) => frame.render_widget(chat, sidebar),
            None => {
                let popup = centered_rect(90, 85, area);
                frame.render_widget(Clear, popup);
                frame.render_widget(chat, popup);
            }
        }
    }

    if app.settings.is_some() {
        render_settings(frame, app);
    }

    if let Some(notice) = &app.notice {
        frame.render_widget(NoticePopup::new(notice, &app.theme), area);
    }
}

fn render_header<S: Storage>(frame: &mut ratatui::Frame, app: &App<S>, area: Rect) {
    let colors = &app.theme.colors;
    let header_style = Style::default().bg(colors.header_bg());

    let context = match app.mode {
        AppMode::Study => {
            let title = app
                .generated_title
                .clone()
                .unwrap_or_else(|| app.topic.value().lines().next().unwrap_or("").to_string());
            if app.is_saved {
                format!(" {title}  [{}]", t!("study.saved"))
            } else {
                format!(" {title}")
            }
        }
        AppMode::Cards => app
            .categories
            .iter()
            .find(|c| Some(c.id.as_str()) == app.active_category.as_deref())
            .map(|c| format!(" {}", c.title))
            .unwrap_or_default(),
        AppMode::History => format!(" {}", t!("history.title")),
        AppMode::Home => format!(" {}", t!("home.title")),
        AppMode::Create | AppMode::Loading => format!(" {}", t!("create.title")),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", t!("app.name")),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(context, Style::default().fg(colors.muted()).bg(colors.header_bg())),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {status}"),
            Style::default().fg(colors.success()).bg(colors.header_bg()),
        ));
    }

    let header = Paragraph::new(vec![Line::from(""), Line::from(spans)]).style(header_style);
    frame.render_widget(header, area);
}

fn render_footer<S: Storage>(frame: &mut ratatui::Frame, app: &App<S>, area: Rect) {
    let colors = &app.theme.colors;
    let hint = if app.settings.is_some() {
        t!("settings.hint")
    } else if app.chat.open {
        t!("chat.hint")
    } else {
        match app.mode {
            AppMode::Create => t!("create.hint"),
            AppMode::Loading => t!("loading.text"),
            AppMode::Study => t!("study.hint"),
            AppMode::History => t!("history.hint"),
            AppMode::Home => t!("home.hint"),
            AppMode::Cards => t!("cards.hint"),
        }
    };
    let hints: Vec<&str> = hint.split("  ").collect();
    let lines: Vec<Line> = pack_hint_lines(&hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_create<S: Storage>(frame: &mut ratatui::Frame, app: &App<S>, area: Rect) {
    let colors = &app.theme.colors;
    let body = centered_rect(70, 80, area);

    let input_height = match app.source_mode {
        SourceMode::Topic => 3,
        SourceMode::Paste => body.height.saturating_sub(4).max(3),
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(input_height),
            Constraint::Min(0),
        ])
        .split(body);

    let active = Style::default()
        .fg(colors.bg())
        .bg(colors.accent())
        .add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(colors.muted());
    let (topic_style, paste_style) = match app.source_mode {
        SourceMode::Topic => (active, inactive),
        SourceMode::Paste => (inactive, active),
    };
    let transport = match app.config.transport {
        TransportKind::Proxy => t!("create.transport_proxy"),
        TransportKind::Credential => t!("create.transport_credential"),
    };
    let modes = Line::from(vec![
        Span::styled(format!(" {} ", t!("create.mode_topic")), topic_style),
        Span::raw(" "),
        Span::styled(format!(" {} ", t!("create.mode_paste")), paste_style),
        Span::styled(format!("    ({transport})"), inactive),
    ]);
    frame.render_widget(Paragraph::new(modes), rows[0]);

    let label = match app.source_mode {
        SourceMode::Topic => t!("create.topic_label"),
        SourceMode::Paste => t!("create.paste_label"),
    };
    frame.render_widget(TextField::new(&app.topic, &label, &app.theme), rows[1]);
}

fn render_loading<S: Storage>(frame: &mut ratatui::Frame, app: &App<S>, area: Rect) {
    let colors = &app.theme.colors;
    let frame_idx = (Utc::now().timestamp_millis() / 100).rem_euclid(SPINNER.len() as i64) as usize;
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}  {}", SPINNER[frame_idx], t!("loading.text")),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            app.topic.value().lines().next().unwrap_or("").to_string(),
            Style::default().fg(colors.muted()),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(text, centered_rect(50, 40, area));
}

fn render_cards<S: Storage>(frame: &mut ratatui::Frame, app: &App<S>, area: Rect) {
    let Some(deck) = app.deck.as_ref() else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(centered_rect(70, 90, area));

    let mut card = CardView::new(deck, &app.theme);
    if app.mode == AppMode::Cards {
        card = card.known(app.is_current_known());
    }
    frame.render_widget(card, rows[0]);

    let bar = match (app.mode, app.active_category.as_deref()) {
        (AppMode::Cards, Some(category)) => {
            let known = app.progress.known_in(category, deck.ids());
            ProgressBar::counts(known, deck.len(), &app.theme).title(&t!("cards.known"))
        }
        _ => ProgressBar::counts(deck.index() + 1, deck.len(), &app.theme)
            .title(&t!("study.progress")),
    };
    frame.render_widget(bar, rows[1]);
}

fn render_settings<S: Storage>(frame: &mut ratatui::Frame, app: &App<S>) {
    let Some(panel) = app.settings.as_ref() else {
        return;
    };
    let colors = &app.theme.colors;
    let popup = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, popup);

    let block = Block::bordered()
        .title(Span::styled(
            format!(" {} ", t!("settings.title")),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let transport = match panel.transport {
        TransportKind::Proxy => t!("create.transport_proxy"),
        TransportKind::Credential => t!("create.transport_credential"),
    };
    let selected = Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD);
    let transport_style = if panel.selected == 0 {
        selected
    } else {
        Style::default().fg(colors.fg())
    };
    let indicator = if panel.selected == 0 { ">" } else { " " };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {indicator} {}: ‹ {transport} ›", t!("settings.transport")),
            transport_style,
        ))),
        rows[0],
    );

    frame.render_widget(
        TextField::new(&panel.api_key, &t!("settings.api_key"), &app.theme)
            .focused(panel.selected == 1)
            .masked(true),
        rows[2],
    );
}
