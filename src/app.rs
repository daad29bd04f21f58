use crate::canvas;
use crate::config::AppConfig;
use crate::error::SettingsError;
use crate::export::{self, GifRecorder};
use crate::presets::{Preset, PresetManager};
use crate::settings::SimulationSettings;
use crate::simulation::IceSimulation;
use log::{error, info};
use std::path::PathBuf;

pub const MIN_TICKS_PER_FRAME: usize = 1;
pub const MAX_TICKS_PER_FRAME: usize = 50;

const DENSITY_STEP: f64 = 0.01;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Boundary,
    Density,
    Preset,
    Speed,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in sidebar order
    pub fn next(&self) -> Focus {
        match self {
            Focus::Controls => Focus::Preset,
            Focus::Preset => Focus::Density,
            Focus::Density => Focus::Boundary,
            Focus::Boundary => Focus::Speed,
            Focus::Speed => Focus::Preset,
        }
    }

    /// Shift+Tab cycles in reverse
    pub fn prev(&self) -> Focus {
        match self {
            Focus::Controls => Focus::Speed,
            Focus::Preset => Focus::Speed,
            Focus::Density => Focus::Preset,
            Focus::Boundary => Focus::Density,
            Focus::Speed => Focus::Boundary,
        }
    }

    /// Line index within the parameters box
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::Controls | Focus::Preset => 0,
            Focus::Density => 1,
            Focus::Boundary => 3,
            Focus::Speed => 4,
        }
    }

    /// Check if focus is on a parameter
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::Controls)
    }
}

/// Main application state
pub struct App {
    pub simulation: IceSimulation,
    pub presets: PresetManager,
    /// Position of the active preset in `presets.all_presets()`, if any
    pub preset_index: Option<usize>,
    pub cursor: (usize, usize),
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub ticks_per_frame: usize,
    pub show_stats: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    pub recorder: Option<GifRecorder>,
    pub status_message: Option<String>,
    /// Keep the board size when the terminal resizes
    pub fixed_size: bool,
    pub config_path: Option<PathBuf>,
}

impl App {
    pub fn new(settings: SimulationSettings, presets: PresetManager) -> Result<Self, SettingsError> {
        let simulation = IceSimulation::new(settings)?;
        let cursor = (simulation.width() / 2, simulation.height() / 2);
        Ok(Self {
            simulation,
            presets,
            preset_index: None,
            cursor,
            focus: Focus::Controls,
            fullscreen_mode: false,
            ticks_per_frame: 3,
            show_stats: true,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            recorder: None,
            status_message: None,
            fixed_size: false,
            config_path: AppConfig::default_path(),
        })
    }

    /// Run simulation ticks for the current frame
    pub fn tick(&mut self) {
        if self.simulation.paused {
            return;
        }
        for _ in 0..self.ticks_per_frame {
            self.simulation.advance();
        }
        self.capture_frame();
    }

    fn capture_frame(&mut self) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        if let Err(err) = recorder.capture(self.simulation.board(), self.simulation.settings.max_mass) {
            error!("recording failed: {}", err);
            self.status_message = Some(format!("Recording failed: {}", err));
            self.recorder = None;
        }
    }

    /// Rebuild the simulation with new settings, keeping the old one on error
    fn rebuild(&mut self, settings: SimulationSettings) -> Result<(), SettingsError> {
        let paused = self.simulation.paused;
        self.simulation = IceSimulation::new(settings)?;
        self.simulation.set_paused(paused);
        self.clamp_cursor();
        if let Some(recorder) = self.recorder.take() {
            self.finish_recorder(recorder);
        }
        Ok(())
    }

    fn clamp_cursor(&mut self) {
        self.cursor.0 = self.cursor.0.min(self.simulation.width() - 1);
        self.cursor.1 = self.cursor.1.min(self.simulation.height() - 1);
    }

    // === Board commands ===

    pub fn toggle_pause(&mut self) {
        self.simulation.toggle_pause();
    }

    pub fn randomize(&mut self) {
        self.simulation.randomize();
    }

    pub fn empty(&mut self) {
        self.simulation.empty();
    }

    pub fn toggle_wraparound(&mut self) {
        self.simulation.toggle_wraparound();
    }

    pub fn toggle_stats(&mut self) {
        self.show_stats = !self.show_stats;
    }

    pub fn place_gas_at_cursor(&mut self) {
        let (x, y) = self.cursor;
        self.simulation.place_gas(x, y);
    }

    pub fn toggle_ice_at_cursor(&mut self) {
        let (x, y) = self.cursor;
        self.simulation.toggle_ice(x, y);
    }

    /// Move the cursor, stopping at the board edges
    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        let x = self.cursor.0.saturating_add_signed(dx);
        let y = self.cursor.1.saturating_add_signed(dy);
        self.cursor = (x, y);
        self.clamp_cursor();
    }

    /// Point the cursor at a canvas position; positions off the board are ignored
    pub fn hover(&mut self, column: u16, row: u16) -> bool {
        let (x, y) = canvas::board_position(column, row);
        if x < self.simulation.width() && y < self.simulation.height() {
            self.cursor = (x, y);
            true
        } else {
            false
        }
    }

    /// Left click: fill the clicked cell with gas
    pub fn click_gas(&mut self, column: u16, row: u16) {
        if self.hover(column, row) {
            self.place_gas_at_cursor();
        }
    }

    /// Right click: freeze or thaw the clicked cell
    pub fn click_ice(&mut self, column: u16, row: u16) {
        if self.hover(column, row) {
            self.toggle_ice_at_cursor();
        }
    }

    // === Parameters ===

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused(&mut self, up: bool) {
        match self.focus {
            Focus::Controls => {}
            Focus::Preset => self.cycle_preset(if up { 1 } else { -1 }),
            Focus::Density => {
                let delta = if up { DENSITY_STEP } else { -DENSITY_STEP };
                self.simulation.settings.adjust_seed_density(delta);
            }
            Focus::Boundary => self.toggle_wraparound(),
            Focus::Speed => {
                if up {
                    self.increase_speed();
                } else {
                    self.decrease_speed();
                }
            }
        }
    }

    pub fn increase_speed(&mut self) {
        self.ticks_per_frame = (self.ticks_per_frame + 1).min(MAX_TICKS_PER_FRAME);
    }

    pub fn decrease_speed(&mut self) {
        self.ticks_per_frame = self.ticks_per_frame.saturating_sub(1).max(MIN_TICKS_PER_FRAME);
    }

    /// Name of the active preset, or "Custom"
    pub fn preset_name(&self) -> &str {
        self.preset_index
            .and_then(|i| self.presets.get_wrapped(i))
            .map_or("Custom", |p| p.name.as_str())
    }

    /// Apply a preset by name; returns false if no preset has that name
    pub fn apply_preset_named(&mut self, name: &str) -> Result<bool, SettingsError> {
        let Some(index) = self.presets.all_presets().position(|p| p.name.eq_ignore_ascii_case(name)) else {
            return Ok(false);
        };
        self.apply_preset(index)?;
        Ok(true)
    }

    /// Rebuild the board with the preset at `index`
    pub fn apply_preset(&mut self, index: usize) -> Result<(), SettingsError> {
        let Some(preset) = self.presets.get_wrapped(index).cloned() else {
            return Ok(());
        };
        let mut settings = self.simulation.settings.clone();
        preset.apply(&mut settings);
        self.rebuild(settings)?;
        self.preset_index = Some(index % self.presets.len());
        info!("applied preset {}", preset.name);
        self.status_message = Some(format!("Preset: {}", preset.name));
        Ok(())
    }

    pub fn cycle_preset(&mut self, delta: isize) {
        if self.presets.is_empty() {
            return;
        }
        let len = self.presets.len() as isize;
        let current = self.preset_index.map_or(-1, |i| i as isize);
        let next = if current < 0 && delta < 0 {
            len - 1
        } else {
            (current + delta).rem_euclid(len)
        };
        if let Err(err) = self.apply_preset(next as usize) {
            self.status_message = Some(format!("Preset rejected: {}", err));
        }
    }

    /// Store the current rule parameters as a new user preset
    pub fn save_user_preset(&mut self) {
        let settings = &self.simulation.settings;
        let name = format!("Custom {}", self.presets.user.len() + 1);
        let preset = Preset::new(
            name.clone(),
            "Saved from the simulator",
            settings.max_mass,
            settings.boundary,
            settings.seed_density,
        );
        match self.presets.save_preset(preset) {
            Ok(()) => {
                self.preset_index = self.presets.all_presets().position(|p| p.name == name);
                self.status_message = Some(format!("Saved preset {}", name));
            }
            Err(err) => {
                error!("saving preset failed: {}", err);
                self.status_message = Some(format!("Preset not saved: {}", err));
            }
        }
    }

    /// Delete the active preset if it is a user preset
    pub fn delete_active_preset(&mut self) {
        let Some(index) = self.preset_index else {
            return;
        };
        if index < self.presets.builtin.len() {
            self.status_message = Some("Built-in presets cannot be deleted".to_string());
            return;
        }
        let Some(name) = self.presets.get_wrapped(index).map(|p| p.name.clone()) else {
            return;
        };
        match self.presets.delete_preset(&name) {
            Ok(()) => {
                self.preset_index = None;
                self.status_message = Some(format!("Deleted preset {}", name));
            }
            Err(err) => {
                error!("deleting preset failed: {}", err);
                self.status_message = Some(format!("Preset not deleted: {}", err));
            }
        }
    }

    // === Files ===

    /// Current settings and app options as a config
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            settings: self.simulation.settings.clone(),
            ticks_per_frame: self.ticks_per_frame,
            show_stats: self.show_stats,
            ..AppConfig::default()
        }
    }

    pub fn save_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.status_message = Some("No config directory".to_string());
            return;
        };
        match self.to_config().save_to_file(&path) {
            Ok(()) => self.status_message = Some(format!("Saved {}", path.display())),
            Err(err) => {
                error!("saving config failed: {}", err);
                self.status_message = Some(format!("Config not saved: {}", err));
            }
        }
    }

    pub fn save_snapshot(&mut self) {
        let path = PathBuf::from(format!("brownian-ice-{}.png", self.simulation.tick_count()));
        let result = export::save_png(
            self.simulation.board(),
            self.simulation.settings.max_mass,
            &path,
            export::DEFAULT_SCALE,
        );
        self.status_message = Some(match result {
            Ok(()) => format!("Saved {}", path.display()),
            Err(err) => {
                error!("snapshot failed: {}", err);
                format!("Snapshot failed: {}", err)
            }
        });
    }

    /// Start recording, or finish the running recording
    pub fn toggle_recording(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            self.finish_recorder(recorder);
            return;
        }
        let path = PathBuf::from(format!("brownian-ice-{}.gif", self.simulation.tick_count()));
        match GifRecorder::create(&path, self.simulation.board(), export::DEFAULT_SCALE) {
            Ok(recorder) => {
                self.status_message = Some(format!("Recording {}", recorder.path().display()));
                self.recorder = Some(recorder);
            }
            Err(err) => {
                error!("recording failed: {}", err);
                self.status_message = Some(format!("Recording failed: {}", err));
            }
        }
    }

    fn finish_recorder(&mut self, recorder: GifRecorder) {
        self.status_message = Some(match recorder.finish() {
            Ok((path, frames)) => format!("Saved {} ({} frames)", path.display(), frames),
            Err(err) => {
                error!("finishing recording failed: {}", err);
                format!("Recording failed: {}", err)
            }
        });
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    // === View ===

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Resize the board to match a new canvas size.
    /// The board is rebuilt from scratch since its extents are fixed.
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        if self.fixed_size {
            return;
        }
        let (width, height) = canvas::calculate_board_size(canvas_width, canvas_height);
        if (width, height) == (self.simulation.width(), self.simulation.height()) {
            return;
        }
        let settings = SimulationSettings {
            width,
            height,
            ..self.simulation.settings.clone()
        };
        if let Err(err) = self.rebuild(settings) {
            error!("resize failed: {}", err);
        }
    }
}
