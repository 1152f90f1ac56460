mod board;
mod config;
mod error;
mod logging;
mod models;
mod storage;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;

use crate::config::{Config, default_config_path};
use crate::error::{AppError, StorageError};
use crate::storage::{JsonStore, ensure_dir, load_board, save_board};
use crate::ui::{App, render};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 获取数据目录路径 (~/.local/share/corkboard/)
fn get_data_dir(config: &Config) -> Result<PathBuf, StorageError> {
    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_dir()
            .ok_or(StorageError::DataDir)?
            .join("corkboard"),
    };

    ensure_dir(&data_dir)?;

    Ok(data_dir)
}

fn main() -> Result<(), AppError> {
    let config = match default_config_path() {
        Some(path) => Config::load_or_default(&path)?,
        None => Config::default(),
    };
    let data_dir = get_data_dir(&config)?;
    let _log_guard = logging::init(&data_dir, &config.log_filter)?;

    // 加载看板
    let store = JsonStore::new(&data_dir);
    let board = load_board(&store);

    // 创建应用状态
    let mut app = App::new(board, store, &config);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // 保存数据；拖拽中途退出时先结束拖拽
    app.board.end_drag(None);
    if save_board(&mut app.board, &app.store)? {
        println!("数据已保存到 {}", data_dir.display());
    }
    info!("exiting");

    result.map_err(AppError::from)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && ui::handle_key_event(app, key.code) {
                    break;
                }
            }
        }

        app.tick(Instant::now());
    }
    Ok(())
}
