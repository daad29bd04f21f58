mod app;
mod board;
mod canvas;
mod config;
mod error;
mod export;
mod geometry;
mod palette;
mod presets;
mod settings;
mod simulation;
mod ui;

use app::{App, Focus};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn, LevelFilter};
use presets::PresetManager;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use settings::{BoundaryMode, SimulationSettings};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "brownian-ice")]
#[command(about = "Gas diffusion and ice crystal growth in the terminal")]
struct Args {
    /// Board width in cells (defaults to the terminal size)
    #[arg(long)]
    width: Option<usize>,

    /// Board height in cells (defaults to the terminal size)
    #[arg(long)]
    height: Option<usize>,

    /// Maximum gas mass a cell can hold
    #[arg(long = "max-mass")]
    max_mass: Option<i32>,

    /// Fraction of cells seeded with gas on randomize (0.0-1.0)
    #[arg(long)]
    density: Option<f64>,

    /// Edge behaviour (clamp, wrap)
    #[arg(long)]
    boundary: Option<String>,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Start from a named preset (Classic, Toroidal, Dense, Trickle, Storm or a saved one)
    #[arg(long)]
    preset: Option<String>,

    /// Simulation speed (ticks per frame, 1-50)
    #[arg(long)]
    speed: Option<usize>,

    /// Config file to load instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn parse_boundary(s: &str) -> Option<BoundaryMode> {
    match s.to_lowercase().as_str() {
        "clamp" | "bounded" | "wall" => Some(BoundaryMode::Bounded),
        "wrap" | "toroidal" | "loop" => Some(BoundaryMode::Wrap),
        _ => None,
    }
}

/// Logs go to a file since the terminal belongs to the UI
fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(LevelFilter::Off);
        }
    }
    builder.try_init()?;
    Ok(())
}

/// Load the config file. A missing default config is not an error.
fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(AppConfig::load_from_file(path)?);
    }
    match AppConfig::default_path() {
        Some(path) if path.exists() => match AppConfig::load_from_file(&path) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!("ignoring config: {}", err);
                Ok(AppConfig::default())
            }
        },
        _ => Ok(AppConfig::default()),
    }
}

/// Apply explicit command-line overrides on top of the loaded settings
fn apply_args(settings: &mut SimulationSettings, args: &Args) -> Result<(), String> {
    if let Some(max_mass) = args.max_mass {
        settings.max_mass = max_mass;
    }
    if let Some(density) = args.density {
        settings.seed_density = density;
    }
    if let Some(boundary) = &args.boundary {
        settings.boundary =
            parse_boundary(boundary).ok_or_else(|| format!("unknown boundary '{}' (use clamp or wrap)", boundary))?;
    }
    if let Some(seed) = args.seed {
        settings.rng_seed = Some(seed);
    }
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = load_config(args.config.as_deref())?;
    let presets = PresetManager::new();

    let mut settings = config.settings.clone();
    if let Some(name) = &args.preset {
        let preset = presets
            .find(name)
            .ok_or_else(|| format!("unknown preset '{}'", name))?;
        preset.apply(&mut settings);
    }
    apply_args(&mut settings, &args)?;
    let fixed_size = args.width.is_some() || args.height.is_some();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Without explicit dimensions the board fills the canvas
    if !fixed_size {
        let size = terminal.size()?;
        let (canvas_width, canvas_height) = ui::get_canvas_size(Rect::new(0, 0, size.width, size.height), false);
        let (width, height) = canvas::calculate_board_size(canvas_width, canvas_height);
        settings.width = width;
        settings.height = height;
    }

    let res = build_app(settings, presets, &config, &args).and_then(|mut app| {
        app.fixed_size = fixed_size;
        if let Some(path) = &args.config {
            app.config_path = Some(path.clone());
        }
        info!(
            "starting {}x{} board, max mass {}",
            app.simulation.width(),
            app.simulation.height(),
            app.simulation.settings.max_mass
        );
        run_app(&mut terminal, &mut app).map_err(Into::into)
    });

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn build_app(
    settings: SimulationSettings,
    presets: PresetManager,
    config: &AppConfig,
    args: &Args,
) -> Result<App, Box<dyn std::error::Error>> {
    let preset_index = args
        .preset
        .as_deref()
        .and_then(|name| presets.all_presets().position(|p| p.name.eq_ignore_ascii_case(name)));
    let mut app = App::new(settings, presets)?;
    app.preset_index = preset_index;
    app.ticks_per_frame = args
        .speed
        .unwrap_or(config.ticks_per_frame)
        .clamp(app::MIN_TICKS_PER_FRAME, app::MAX_TICKS_PER_FRAME);
    app.show_stats = config.show_stats;
    Ok(app)
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (ox, oy) = ui::canvas_origin(app.fullscreen_mode);
    if mouse.column < ox || mouse.row < oy {
        return;
    }
    let (column, row) = (mouse.column - ox, mouse.row - oy);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            app.click_gas(column, row)
        }
        MouseEventKind::Down(MouseButton::Right) => app.click_ice(column, row),
        MouseEventKind::Moved => {
            app.hover(column, row);
        }
        _ => {}
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_pause(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.randomize(),
                        KeyCode::Char('e') | KeyCode::Char('E') => app.empty(),
                        KeyCode::Char('w') | KeyCode::Char('W') => app.toggle_wraparound(),
                        KeyCode::Char('t') | KeyCode::Char('T') => app.toggle_stats(),
                        KeyCode::Char('g') | KeyCode::Char('G') => app.place_gas_at_cursor(),
                        KeyCode::Char('i') | KeyCode::Char('I') => app.toggle_ice_at_cursor(),
                        KeyCode::Char('u') | KeyCode::Char('U') => app.save_user_preset(),
                        KeyCode::Char('d') | KeyCode::Char('D') => app.delete_active_preset(),
                        KeyCode::Char('x') | KeyCode::Char('X') => app.save_snapshot(),
                        KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_recording(),
                        KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),
                        KeyCode::Char('v') | KeyCode::Char('V') => {
                            app.toggle_fullscreen();
                            let size = terminal.size()?;
                            let (cw, ch) =
                                ui::get_canvas_size(Rect::new(0, 0, size.width, size.height), app.fullscreen_mode);
                            app.resize(cw, ch);
                        }
                        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            app.increase_speed();
                            app.focus = Focus::Speed;
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            app.decrease_speed();
                            app.focus = Focus::Speed;
                        }
                        KeyCode::Char(']') => app.adjust_focused(true),
                        KeyCode::Char('[') => app.adjust_focused(false),

                        // Navigation
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => app.move_cursor(0, -1),
                        KeyCode::Down => app.move_cursor(0, 1),
                        KeyCode::Left => app.move_cursor(-1, 0),
                        KeyCode::Right => app.move_cursor(1, 0),
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            } else {
                                app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            } else {
                                app.scroll_controls_up();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => {
                    let (canvas_width, canvas_height) =
                        ui::get_canvas_size(Rect::new(0, 0, width, height), app.fullscreen_mode);
                    app.resize(canvas_width, canvas_height);
                }
                _ => {}
            }
        }

        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundary() {
        assert_eq!(parse_boundary("clamp"), Some(BoundaryMode::Bounded));
        assert_eq!(parse_boundary("WRAP"), Some(BoundaryMode::Wrap));
        assert_eq!(parse_boundary("bounce"), None);
    }

    #[test]
    fn test_explicit_flags_override_settings() {
        let args = Args::parse_from([
            "brownian-ice",
            "--max-mass",
            "9",
            "--boundary",
            "wrap",
            "--seed",
            "42",
            "--width",
            "30",
        ]);
        let mut settings = SimulationSettings::default();
        apply_args(&mut settings, &args).unwrap();
        assert_eq!(settings.max_mass, 9);
        assert_eq!(settings.boundary, BoundaryMode::Wrap);
        assert_eq!(settings.rng_seed, Some(42));
        assert_eq!(settings.width, 30);
        assert_eq!(settings.height, SimulationSettings::default().height);
    }

    #[test]
    fn test_unknown_boundary_rejected() {
        let args = Args::parse_from(["brownian-ice", "--boundary", "bounce"]);
        let mut settings = SimulationSettings::default();
        assert!(apply_args(&mut settings, &args).is_err());
    }

    #[test]
    fn test_build_app_uses_config_speed() {
        let args = Args::parse_from(["brownian-ice"]);
        let config = AppConfig {
            ticks_per_frame: 500,
            show_stats: false,
            ..AppConfig::default()
        };
        let settings = SimulationSettings {
            width: 10,
            height: 10,
            ..Default::default()
        };
        let app = build_app(settings, PresetManager::with_dir(None), &config, &args).unwrap();
        assert_eq!(app.ticks_per_frame, app::MAX_TICKS_PER_FRAME);
        assert!(!app.show_stats);
    }

    #[test]
    fn test_explicit_config_must_load() {
        assert!(load_config(Some(Path::new("/nonexistent/brownian-ice.json"))).is_err());
    }
}
