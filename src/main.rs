pub mod app_dirs;
pub mod config;
pub mod elapsed;
pub mod runtime;
pub mod session;
pub mod timefmt;
pub mod ui;
pub mod util;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    elapsed::Elapsed,
    runtime::{spawn_input_thread, AppEvent, TickTask},
    session::{Session, SessionDb},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    time::Duration,
};

const TICK_RATE_MS: u64 = 1000;

/// minimal elapsed-time counter that remembers your start date
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal terminal counter: pick a start date once and klok keeps showing how long it has been, across restarts, until you reset it."
)]
pub struct Cli {
    /// start counting from this local date-time (e.g. 2026-02-26T18:30)
    #[clap(short, long)]
    since: Option<String>,

    /// clear the saved start date and exit
    #[clap(long)]
    reset: bool,

    /// alternate path to the session database
    #[clap(long)]
    db: Option<PathBuf>,

    /// hide the total days/hours/minutes line
    #[clap(long)]
    no_totals: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Setup,
    Counting,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub state: AppState,
    /// Date candidate being edited on the setup screen
    pub input: String,
    pub elapsed: Elapsed,
    pub show_totals: bool,
    tick_tx: Sender<AppEvent>,
    tick_task: Option<TickTask>,
}

impl App {
    pub fn new(session: Session, show_totals: bool, tick_tx: Sender<AppEvent>) -> Self {
        let state = if session.is_running() {
            AppState::Counting
        } else {
            AppState::Setup
        };
        let input = session
            .start_ms()
            .and_then(timefmt::to_input_string)
            .unwrap_or_else(timefmt::now_input_string);

        let mut app = Self {
            session,
            state,
            input,
            elapsed: Elapsed::default(),
            show_totals,
            tick_tx,
            tick_task: None,
        };

        if app.session.is_running() {
            app.refresh_at(now_ms());
            app.start_ticking();
        }

        app
    }

    /// Start counting from the candidate in the input box. An unparseable
    /// candidate leaves everything untouched.
    pub fn submit_start(&mut self) {
        let Some(ms) = timefmt::parse_local_datetime(&self.input) else {
            return;
        };

        self.session.start(ms);
        if self.session.is_running() {
            self.state = AppState::Counting;
            self.refresh_at(now_ms());
            self.start_ticking();
        }
    }

    pub fn reset(&mut self) {
        self.stop_ticking();
        self.session.reset();
        self.elapsed = Elapsed::default();
        self.input = timefmt::now_input_string();
        self.state = AppState::Setup;
    }

    /// Recompute the elapsed duration; ignored while no session is running
    /// (covers a tick already queued when reset landed).
    pub fn on_tick(&mut self) {
        if self.state == AppState::Counting {
            self.refresh_at(now_ms());
        }
    }

    pub fn refresh_at(&mut self, now_ms: i64) {
        if let Some(start) = self.session.start_ms() {
            self.elapsed = Elapsed::between(start, now_ms);
        }
    }

    pub fn push_char(&mut self, c: char) {
        if !c.is_control() && self.input.chars().count() < 32 {
            self.input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_task.is_some()
    }

    fn start_ticking(&mut self) {
        if self.tick_task.is_none() {
            self.tick_task = Some(TickTask::spawn(
                self.tick_tx.clone(),
                Duration::from_millis(TICK_RATE_MS),
            ));
        }
    }

    fn stop_ticking(&mut self) {
        if let Some(mut task) = self.tick_task.take() {
            task.cancel();
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn open_db(cli: &Cli) -> rusqlite::Result<SessionDb> {
    match &cli.db {
        Some(path) => SessionDb::open(path),
        None => SessionDb::new(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.reset {
        open_db(&cli)?.clear_start()?;
        println!("cleared saved start date");
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config: Config = FileConfigStore::new().load();
    let default_start = cli
        .since
        .as_deref()
        .or(config.default_start.as_deref())
        .and_then(timefmt::parse_local_datetime);

    // A broken store degrades to an in-memory session rather than refusing
    // to start
    let session = Session::open(open_db(&cli).ok(), default_start);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    spawn_input_thread(tx.clone());

    let mut app = App::new(session, config.show_totals && !cli.no_totals, tx);
    let res = run_app(&mut terminal, &mut app, &rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &Receiver<AppEvent>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match rx.recv()? {
            AppEvent::Tick => {
                app.on_tick();
                if app.state == AppState::Counting {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                match key.code {
                    KeyCode::Esc => {
                        break;
                    }
                    KeyCode::Enter => {
                        if app.state == AppState::Setup {
                            app.submit_start();
                        }
                    }
                    KeyCode::Backspace => {
                        if app.state == AppState::Setup {
                            app.pop_char();
                        }
                    }
                    KeyCode::Char(c) => {
                        if key.modifiers.contains(KeyModifiers::CONTROL)
                            && key.code == KeyCode::Char('c')
                        // ctrl+c to quit
                        {
                            break;
                        }

                        match app.state {
                            AppState::Setup => {
                                app.push_char(c);
                            }
                            AppState::Counting => {
                                if c == 'r' {
                                    app.reset();
                                }
                            }
                        }
                    }
                    _ => {}
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
