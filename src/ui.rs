use crate::app::{App, Focus};
use crate::canvas;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 20;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;
const RECORD_COLOR: Color = Color::Red;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (frame_area.width.saturating_sub(2), frame_area.height.saturating_sub(2))
    } else {
        let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
        let canvas_height = frame_area.height.saturating_sub(2);
        (canvas_width, canvas_height)
    }
}

/// Terminal position of the canvas's top-left character (inside the border)
pub fn canvas_origin(fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (1, 1)
    } else {
        (SIDEBAR_WIDTH + 1, 1)
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let status_height = if app.show_stats { 12 } else { 0 };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(status_height), // Status
            Constraint::Length(7),             // Parameters
            Constraint::Min(6),                // Controls
        ])
        .split(area);

    if app.show_stats {
        render_status_box(frame, sections[0], app);
    }
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Brownian Ice ");
    let sim = &app.simulation;

    let (status_text, status_color) = if sim.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else {
        ("RUNNING", BORDER_COLOR)
    };

    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<8}", label), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let mut status_line = vec![Span::styled(status_text, Style::default().fg(status_color))];
    if let Some(recorder) = &app.recorder {
        status_line.push(Span::styled(
            format!(" ● REC {}", recorder.frames()),
            Style::default().fg(RECORD_COLOR),
        ));
    }

    let mut content = vec![
        stat("Steps", format!("{}", sim.tick_count())),
        stat("Gas", format!("{}", sim.count_gas())),
        stat("Ice", format!("{}", sim.count_ice())),
        stat("Mass", format!("{}", sim.total_mass())),
        stat("Looping", if sim.is_wrapping() { "yes" } else { "no" }.to_string()),
        stat("Cursor", format!("{}, {}", app.cursor.0, app.cursor.1)),
        stat("Cell", format!("{}", sim.get_cell(app.cursor.0, app.cursor.1).unwrap_or(0))),
        stat("Board", format!("{}x{}", sim.width(), sim.height())),
        Line::from(status_line),
    ];
    if let Some(message) = &app.status_message {
        content.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(DIM_TEXT_COLOR),
        )));
    }

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.simulation.settings;

    let content = vec![
        make_line(
            "Preset",
            app.preset_name().to_string(),
            app.focus == Focus::Preset,
        ),
        make_line(
            "Density",
            format!("{:.2}", settings.seed_density),
            app.focus == Focus::Density,
        ),
        Line::from(Span::styled(
            format!("  Max mass: {}", settings.max_mass),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        make_line(
            "Bounds",
            settings.boundary.name().to_string(),
            app.focus == Focus::Boundary,
        ),
        make_line(
            "Speed",
            format!("{}", app.ticks_per_frame),
            app.focus == Focus::Speed,
        ),
    ];

    // Keep the focused line visible
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2);
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0
    } else if focus_line >= visible_height {
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let record = if app.is_recording() { "stop GIF" } else { "record GIF" };

    let content = vec![
        make_control("P", "pause/resume"),
        make_control("R", "randomize"),
        make_control("E", "empty board"),
        make_control("W", "toggle wrap"),
        make_control("T", "toggle stats"),
        make_control("LMB", "place gas"),
        make_control("RMB", "toggle ice"),
        make_control("Arrow", "move cursor"),
        make_control("G/I", "gas/ice at cursor"),
        make_control("Tab", "select param"),
        make_control("[/]", "adjust param"),
        make_control("+/-", "speed"),
        make_control("U/D", "save/delete preset"),
        make_control("X", "PNG snapshot"),
        make_control("F", record),
        make_control("S", "save config"),
        make_control("V", "fullscreen"),
        make_control("H", "help"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2);
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Controls (J/K) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll.min(max_scroll), 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = canvas::render_board(
        app.simulation.board(),
        app.simulation.settings.max_mass,
        inner.width,
        inner.height,
        Some(app.cursor),
    );

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(
                cell.char.to_string(),
                Style::default().fg(cell.fg).bg(cell.bg),
            );
            let paragraph = Paragraph::new(Line::from(span));
            frame.render_widget(paragraph, cell_rect);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Center the help dialog over the canvas
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(32);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(HIGHLIGHT_COLOR)));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("BROWNIAN ICE", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Gas wanders between cells at random. Gas touching ice freezes, and the crystal grows out from the seed in the middle of the board."),
        Line::from(""),
        heading("CELLS:"),
        Line::from("Red = gas, brighter holds more mass. Teal = ice, lighter means more frozen neighbours. Each cell holds at most the max mass."),
        Line::from(""),
        heading("BOUNDARY:"),
        Line::from("Clamp = walled box, Wrap = gas leaving one edge enters the opposite one."),
        Line::from(""),
        heading("EDITING:"),
        Line::from("Left click or G fills a cell with gas. Right click or I freezes a cell, or thaws an ice cell."),
        Line::from(""),
        heading("PRESETS:"),
        Line::from("Tab to Preset, then [ and ] to cycle. U saves the current parameters as a preset, D deletes the selected user preset."),
        Line::from(""),
        heading("FILES:"),
        Line::from("X saves a PNG, F starts and stops a GIF recording, S saves the current settings as the default config."),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2);
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::PresetManager;
    use crate::settings::SimulationSettings;
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app() -> App {
        let settings = SimulationSettings {
            width: 20,
            height: 16,
            seed_density: 0.0,
            rng_seed: Some(1),
            ..Default::default()
        };
        App::new(settings, PresetManager::with_dir(None)).unwrap()
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_canvas_size_and_origin() {
        let area = Rect::new(0, 0, 80, 30);
        assert_eq!(get_canvas_size(area, true), (78, 28));
        assert_eq!(get_canvas_size(area, false), (80 - SIDEBAR_WIDTH - 2, 28));
        assert_eq!(canvas_origin(true), (1, 1));
        assert_eq!(canvas_origin(false), (SIDEBAR_WIDTH + 1, 1));
    }

    #[test]
    fn test_render_shows_stats_and_nucleus() {
        let app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Steps"));
        assert!(text.contains("RUNNING"));
        assert!(text.contains("Custom"));

        // Nucleus at (10, 8) lands in canvas column 10, row 4
        let (ox, oy) = canvas_origin(false);
        let cell = terminal.backend().buffer().cell((ox + 10, oy + 4)).unwrap();
        assert_eq!(cell.symbol(), "▀");
    }

    #[test]
    fn test_hidden_stats_and_help_overlay() {
        let mut app = test_app();
        app.toggle_stats();
        app.toggle_help();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(!text.contains("Steps"));
        assert!(text.contains("BROWNIAN ICE"));
    }
}
