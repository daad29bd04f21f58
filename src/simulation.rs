use crate::board::{ice_grade, Board, FRESH_ICE};
use crate::error::SettingsError;
use crate::settings::SimulationSettings;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A cell diffuses on a tick when its uniform draw exceeds this.
const DIFFUSION_THRESHOLD: f64 = 0.5;

/// Source of the two random decisions made per cell per tick.
pub trait Dice {
    /// Whether a gas cell spreads single units to its neighbors this tick.
    fn spread(&mut self) -> bool;

    /// Index of the direction a gas cell tries to move along, in `0..choices`.
    fn pick(&mut self, choices: usize) -> usize;
}

/// [`Dice`] backed by any `rand` generator.
pub struct RngDice<'a, R: Rng + ?Sized>(pub &'a mut R);

impl<R: Rng + ?Sized> Dice for RngDice<'_, R> {
    fn spread(&mut self) -> bool {
        self.0.gen::<f64>() > DIFFUSION_THRESHOLD
    }

    fn pick(&mut self, choices: usize) -> usize {
        self.0.gen_range(0..choices)
    }
}

/// How an explicit reset refills the board
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResetMode {
    /// Every cell empty
    Empty,
    /// Each cell becomes full gas with the given probability
    Random { density: f64 },
}

/// Compute the board one tick after `prev`.
///
/// Every decision reads `prev`; all writes land in a copy that becomes the
/// new board, so the result does not depend on scan order apart from the
/// saturation bookkeeping. Ice grades are applied last, which means mass
/// pushed into a cell that froze this tick is absorbed by the ice.
pub fn next_generation<D: Dice + ?Sized>(prev: &Board, max_mass: i32, wraparound: bool, dice: &mut D) -> Board {
    let bounds = prev.bounds();
    let mut next = prev.clone();
    // Units accepted into each cell so far this tick
    let mut inbound = vec![0i32; bounds.area()];
    let mut frozen: Vec<((usize, usize), i32)> = Vec::new();

    for y in 0..bounds.height {
        for x in 0..bounds.width {
            let mut mass = prev.at((x, y));
            let frozen_nearby = prev.frozen_neighbors(x, y, wraparound);

            if mass > 0 && frozen_nearby > 0 {
                mass = FRESH_ICE;
            }

            if mass < 0 {
                frozen.push(((x, y), ice_grade(frozen_nearby)));
                continue;
            }

            if mass == 0 {
                continue;
            }

            let directions = prev.valid_move_directions(x, y, wraparound);
            if directions.is_empty() {
                continue;
            }

            // Can `amount` more units land on `target` without overflowing it?
            let has_room = |inbound: &[i32], target: (usize, usize), amount: i32| {
                prev.at(target) + inbound[bounds.index(target.0, target.1)] + amount <= max_mass
            };

            // Diffusion: one unit to each open neighbor in turn
            if mass > 1 && dice.spread() {
                for &offset in directions.iter() {
                    if mass == 0 {
                        break;
                    }
                    let target = bounds.resolve(x, y, offset, wraparound);
                    if has_room(&inbound, target, 1) {
                        *next.at_mut((x, y)) -= 1;
                        *next.at_mut(target) += 1;
                        inbound[bounds.index(target.0, target.1)] += 1;
                        mass -= 1;
                    }
                }
            }

            // Movement: whatever is left tries to relocate as a whole
            if mass > 0 {
                let offset = directions[dice.pick(directions.len())];
                let target = bounds.resolve(x, y, offset, wraparound);
                if has_room(&inbound, target, mass) {
                    *next.at_mut((x, y)) -= mass;
                    *next.at_mut(target) += mass;
                    inbound[bounds.index(target.0, target.1)] += mass;
                }
            }
        }
    }

    for (coord, grade) in frozen {
        *next.at_mut(coord) = grade;
    }

    next
}

/// Diffusion-and-freezing simulation state
pub struct IceSimulation {
    board: Board,
    /// Parameters the board was built with; `boundary` may be toggled live
    pub settings: SimulationSettings,
    pub paused: bool,
    steps: u64,
    rng: StdRng,
}

impl IceSimulation {
    /// Build a randomly seeded board with an ice nucleus at the center.
    pub fn new(settings: SimulationSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut sim = Self {
            board: Board::empty(settings.width, settings.height),
            settings,
            paused: false,
            steps: 0,
            rng,
        };
        sim.randomize();
        let (cx, cy) = (sim.settings.width / 2, sim.settings.height / 2);
        sim.board.set(cx, cy, FRESH_ICE);
        info!(
            "created {}x{} board, max mass {}, {} boundary",
            sim.settings.width,
            sim.settings.height,
            sim.settings.max_mass,
            sim.settings.boundary.name()
        );
        Ok(sim)
    }

    /// Advance one tick using the simulation's own RNG.
    /// Returns false when paused.
    pub fn advance(&mut self) -> bool {
        let mut rng = self.rng.clone();
        let advanced = self.advance_with(&mut RngDice(&mut rng));
        self.rng = rng;
        advanced
    }

    /// Advance one tick with an externally supplied decision source.
    pub fn advance_with<D: Dice + ?Sized>(&mut self, dice: &mut D) -> bool {
        if self.paused {
            return false;
        }
        self.board = next_generation(
            &self.board,
            self.settings.max_mass,
            self.settings.boundary.is_wrapping(),
            dice,
        );
        self.steps += 1;
        true
    }

    /// Read-only view of the current board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn get_cell(&self, x: usize, y: usize) -> Option<i32> {
        self.board.get(x, y)
    }

    /// Overwrite a cell; out-of-range coordinates are ignored
    pub fn set_cell(&mut self, x: usize, y: usize, value: i32) -> bool {
        self.board.set(x, y, value)
    }

    /// Fill a cell with gas at the saturation cap
    pub fn place_gas(&mut self, x: usize, y: usize) -> bool {
        self.set_cell(x, y, self.settings.max_mass)
    }

    /// Clear an ice cell, or freeze any other cell
    pub fn toggle_ice(&mut self, x: usize, y: usize) -> bool {
        match self.get_cell(x, y) {
            Some(value) if value <= FRESH_ICE => self.set_cell(x, y, 0),
            Some(_) => self.set_cell(x, y, FRESH_ICE),
            None => false,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.steps
    }

    pub fn count_gas(&self) -> usize {
        self.board.count_gas()
    }

    pub fn count_ice(&self) -> usize {
        self.board.count_ice()
    }

    pub fn total_mass(&self) -> i64 {
        self.board.total_mass()
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    /// Replace the whole board and restart the tick counter
    pub fn reset(&mut self, mode: ResetMode) {
        let (width, height) = (self.settings.width, self.settings.height);
        self.board = match mode {
            ResetMode::Empty => Board::empty(width, height),
            ResetMode::Random { density } => Board::random(
                width,
                height,
                density.clamp(0.0, 1.0),
                self.settings.max_mass,
                &mut self.rng,
            ),
        };
        self.steps = 0;
        debug!("board reset ({:?})", mode);
    }

    /// Reseed the board with the configured density
    pub fn randomize(&mut self) {
        self.reset(ResetMode::Random {
            density: self.settings.seed_density,
        });
    }

    /// Clear the board
    pub fn empty(&mut self) {
        self.reset(ResetMode::Empty);
    }

    pub fn is_wrapping(&self) -> bool {
        self.settings.boundary.is_wrapping()
    }

    pub fn toggle_wraparound(&mut self) {
        self.settings.boundary = self.settings.boundary.toggle();
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}
