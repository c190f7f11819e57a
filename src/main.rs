use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};

use chrono::{NaiveDate, Utc};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dailytype::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore},
    controller::Controller,
    history::HistoryLog,
    quotes::{QuotePool, SupportedLanguage},
    records::RecordBook,
    runtime::{AppEvent, CrosstermEventSource, Runner, TICK_RATE},
    schedule::{Calendar, DailyScheduler, SeoulCalendar},
    store::{JsonFileStore, KeyValueStore, MemoryStore, SqliteStore},
    ui::record_age,
};

/// three passages a day, the same for everyone
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A daily typing challenge: everyone gets the same three passages each day. Your time is turned into a \"top N%\" ranking and your five best runs are kept per language."
)]
pub struct Cli {
    /// language of the passages (remembered for next time)
    #[clap(short = 'l', long, value_enum)]
    language: Option<SupportedLanguage>,

    /// play the passages of another day (YYYY-MM-DD)
    #[clap(long)]
    date: Option<NaiveDate>,

    /// custom quote pool (JSON array or {"language", "quotes"} object)
    #[clap(long)]
    quotes: Option<PathBuf>,

    /// directory for records, history, log and config
    #[clap(long)]
    state_dir: Option<PathBuf>,

    /// where records are kept
    #[clap(long, value_enum, default_value_t = StoreKind::Sqlite)]
    store: StoreKind,

    /// print the day's passages and exit
    #[clap(long)]
    today: bool,

    /// print your best runs and exit
    #[clap(long)]
    records: bool,

    /// clear the records of the selected language and exit
    #[clap(long)]
    reset: bool,

    /// clear the records of every language and exit
    #[clap(long)]
    reset_all: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StoreKind {
    Sqlite,
    Json,
    Memory,
}

fn init_logging(dirs: &AppDirs) {
    let file = fs::create_dir_all(dirs.state_dir()).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dirs.log_path())
    });
    // logging is best effort; the TUI owns the terminal
    let Ok(file) = file else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init();
}

fn open_store(kind: StoreKind, dirs: &AppDirs) -> Box<dyn KeyValueStore> {
    match kind {
        StoreKind::Sqlite => match SqliteStore::open(dirs.db_path()) {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!(path = %dirs.db_path().display(), error = %e, "records db unavailable, keeping records in memory");
                Box::new(MemoryStore::new())
            }
        },
        StoreKind::Json => Box::new(JsonFileStore::new(dirs.state_dir().join("records"))),
        StoreKind::Memory => Box::new(MemoryStore::new()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let dirs = match &cli.state_dir {
        Some(dir) => AppDirs::with_state_dir(dir),
        None => AppDirs::resolve(),
    };
    init_logging(&dirs);

    let config_store = FileConfigStore::with_path(dirs.config_path(cli.state_dir.is_some()));
    let mut config = config_store.load();
    if let Some(language) = cli.language {
        if language != config.language {
            config.language = language;
            if let Err(e) = config_store.save(&config) {
                warn!(path = %config_store.path().display(), error = %e, "config not saved");
            }
        }
    }

    let pool = match &cli.quotes {
        Some(path) => QuotePool::from_file(path, &config.language.code())?,
        None => QuotePool::bundled(config.language)?,
    };
    let date = cli.date.unwrap_or_else(|| SeoulCalendar.today());
    info!(language = pool.language(), quotes = pool.len(), %date, "starting");

    if cli.today {
        let passages =
            DailyScheduler::default().select_daily_passages(pool.quotes(), pool.language(), date);
        println!("{date} [{}]", pool.language());
        for (i, passage) in passages.iter().enumerate() {
            println!("{}. {passage}", i + 1);
        }
        return Ok(());
    }

    let mut book = RecordBook::new(open_store(cli.store, &dirs));

    if cli.reset_all {
        let cleared = book.clear_all()?;
        println!("cleared records for {cleared} language(s)");
        return Ok(());
    }
    if cli.reset {
        book.clear(pool.language())?;
        println!("cleared records for [{}]", pool.language());
        return Ok(());
    }
    if cli.records {
        let store = book.load(pool.language());
        let now = Utc::now().timestamp_millis();
        println!("[{}] {} plays", pool.language(), store.play_count);
        if store.records.is_empty() {
            println!("no records yet");
        } else {
            let lines = store
                .records
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    format!(
                        "{}. top {:.1}%  {:.0} wpm  {:.1}s  play #{}  {}",
                        i + 1,
                        r.percentile,
                        r.wpm,
                        r.duration_seconds,
                        r.play_index,
                        record_age(r, now)
                    )
                })
                .join("\n");
            println!("{lines}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut controller = Controller::new(pool, date, config.skill_model(), book);
    if config.history {
        controller = controller.with_history(HistoryLog::new(dirs.history_path()));
    }
    let mut app = App::new(controller);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), TICK_RATE);
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.wants_tick() {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            AppEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}
