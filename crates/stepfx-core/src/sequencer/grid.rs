//! Lock-free step grid shared with the control surface
//!
//! Every cell is an independent `AtomicBool`; there is no cross-cell
//! atomicity. The audio thread only reads, a control surface writes at any
//! time. Cells are stored lane-major: `lane * NUM_STEPS + step`.

use std::sync::atomic::{AtomicBool, Ordering};

use super::error::{PatternError, PatternResult};
use crate::types::{Lane, NUM_CELLS, NUM_STEPS};

/// Characters accepted as an enabled step
const ON_MARKERS: [char; 3] = ['x', 'X', '1'];

/// Characters accepted as a disabled step
const OFF_MARKERS: [char; 3] = ['.', '-', '0'];

/// Parse a 16-step pattern such as `"x...x...x...x..."`
///
/// Whitespace and `|` are ignored so patterns can be grouped by beat
/// (`"x... x... | x... x..."`).
pub fn parse_pattern(pattern: &str) -> PatternResult<[bool; NUM_STEPS]> {
    let mut steps = [false; NUM_STEPS];
    let mut count = 0;
    for character in pattern.chars().filter(|c| !c.is_whitespace() && *c != '|') {
        let on = if ON_MARKERS.contains(&character) {
            true
        } else if OFF_MARKERS.contains(&character) {
            false
        } else {
            return Err(PatternError::InvalidStep { character, step: count });
        };
        if count < NUM_STEPS {
            steps[count] = on;
        }
        count += 1;
    }
    if count != NUM_STEPS {
        return Err(PatternError::WrongLength {
            expected: NUM_STEPS,
            found: count,
        });
    }
    Ok(steps)
}

/// 6 lanes x 16 steps of atomic on/off flags
#[derive(Debug)]
pub struct StepGrid {
    cells: [AtomicBool; NUM_CELLS],
}

impl StepGrid {
    /// Create a grid with every cell off
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }

    #[inline]
    fn index(lane: Lane, step: usize) -> usize {
        lane.index() * NUM_STEPS + step % NUM_STEPS
    }

    /// Check whether a lane is enabled on a step (step wraps modulo 16)
    #[inline]
    pub fn is_on(&self, lane: Lane, step: usize) -> bool {
        self.cells[Self::index(lane, step)].load(Ordering::Relaxed)
    }

    pub fn set(&self, lane: Lane, step: usize, on: bool) {
        self.cells[Self::index(lane, step)].store(on, Ordering::Relaxed);
    }

    /// Flip a cell, returning its new state
    pub fn toggle(&self, lane: Lane, step: usize) -> bool {
        !self.cells[Self::index(lane, step)].fetch_xor(true, Ordering::Relaxed)
    }

    /// Turn every cell off
    pub fn clear(&self) {
        for cell in &self.cells {
            cell.store(false, Ordering::Relaxed);
        }
    }

    /// Read a cell by flat lane-major index
    pub fn cell(&self, index: usize) -> Option<bool> {
        self.cells.get(index).map(|c| c.load(Ordering::Relaxed))
    }

    /// Copy of all cells in lane-major order
    pub fn snapshot(&self) -> Vec<bool> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Overwrite all cells from a lane-major slice
    ///
    /// Missing trailing cells are turned off; extra values are ignored.
    pub fn load_cells(&self, cells: &[bool]) {
        for (i, cell) in self.cells.iter().enumerate() {
            cell.store(cells.get(i).copied().unwrap_or(false), Ordering::Relaxed);
        }
    }

    /// Number of enabled cells
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.load(Ordering::Relaxed)).count()
    }

    /// Set a whole lane from a pattern string (see `parse_pattern`)
    ///
    /// The lane is left untouched if the pattern is invalid.
    pub fn set_lane_pattern(&self, lane: Lane, pattern: &str) -> PatternResult<()> {
        let steps = parse_pattern(pattern)?;
        for (step, on) in steps.into_iter().enumerate() {
            self.set(lane, step, on);
        }
        Ok(())
    }

    /// Render a lane as a pattern string (`x` on, `.` off)
    pub fn lane_pattern(&self, lane: Lane) -> String {
        (0..NUM_STEPS)
            .map(|step| if self.is_on(lane, step) { 'x' } else { '.' })
            .collect()
    }
}

impl Default for StepGrid {
    fn default() -> Self {
        Self::new()
    }
}
