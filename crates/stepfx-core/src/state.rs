//! Persisted engine state
//!
//! The state a host saves with a session: the 96 grid cells plus the wet/dry
//! mix and output gain. It is serde-serializable for YAML/JSON hosts and
//! also has a compact byte form:
//!
//! ```text
//! [mix: f32 LE][output_gain_db: f32 LE][cell 0][cell 1]...[cell 95]
//! ```
//!
//! with one byte per cell (non-zero = on), lane-major. Payloads with fewer
//! cells restore the missing cells as off; extra cells are ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{EngineParams, DEFAULT_MIX, DEFAULT_OUTPUT_GAIN_DB};
use crate::sequencer::StepGrid;
use crate::types::{Lane, NUM_CELLS, NUM_STEPS};

/// Bytes taken by the two scalar parameters
pub const HEADER_LEN: usize = 8;

/// Errors from decoding a state payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Payload too short to contain the scalar parameters
    #[error("State payload too short: expected at least {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
}

/// Result type for state decoding
pub type StateResult<T> = Result<T, StateError>;

/// Grid cells and parameters as saved by a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineState {
    /// Wet/dry mix, 0.0-1.0
    pub mix: f32,
    /// Output gain in dB
    pub output_gain_db: f32,
    /// Lane-major grid cells
    pub cells: Vec<bool>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            mix: DEFAULT_MIX,
            output_gain_db: DEFAULT_OUTPUT_GAIN_DB,
            cells: vec![false; NUM_CELLS],
        }
    }
}

impl EngineState {
    /// Snapshot the live grid and parameters
    pub fn capture(grid: &StepGrid, params: &EngineParams) -> Self {
        Self {
            mix: params.mix(),
            output_gain_db: params.output_gain_db(),
            cells: grid.snapshot(),
        }
    }

    /// Write this state into the live grid and parameters
    ///
    /// Parameters are clamped by `EngineParams`; missing cells are turned off.
    pub fn apply(&self, grid: &StepGrid, params: &EngineParams) {
        params.set_mix(self.mix);
        params.set_output_gain_db(self.output_gain_db);
        grid.load_cells(&self.cells);
    }

    /// Check a cell; cells beyond the stored ones read as off
    pub fn is_on(&self, lane: Lane, step: usize) -> bool {
        self.cells
            .get(lane.index() * NUM_STEPS + step % NUM_STEPS)
            .copied()
            .unwrap_or(false)
    }

    /// Encode to the compact byte form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + NUM_CELLS);
        bytes.extend_from_slice(&self.mix.to_le_bytes());
        bytes.extend_from_slice(&self.output_gain_db.to_le_bytes());
        bytes.extend((0..NUM_CELLS).map(|i| u8::from(self.cells.get(i).copied().unwrap_or(false))));
        bytes
    }

    /// Decode from the compact byte form
    ///
    /// Always yields exactly `NUM_CELLS` cells.
    pub fn from_bytes(bytes: &[u8]) -> StateResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(StateError::Truncated {
                expected: HEADER_LEN,
                found: bytes.len(),
            });
        }
        let mix = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let output_gain_db = f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        let stored = &bytes[HEADER_LEN..];
        if stored.len() != NUM_CELLS {
            log::debug!(
                "EngineState: payload has {} cells, expected {}",
                stored.len(),
                NUM_CELLS
            );
        }
        let cells = (0..NUM_CELLS)
            .map(|i| stored.get(i).is_some_and(|&b| b != 0))
            .collect();

        Ok(Self {
            mix,
            output_gain_db,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_roundtrip() {
        let mut state = EngineState {
            mix: 0.25,
            output_gain_db: -12.0,
            ..EngineState::default()
        };
        state.cells[Lane::Delay.index() * NUM_STEPS + 3] = true;
        state.cells[NUM_CELLS - 1] = true;

        let bytes = state.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + NUM_CELLS);
        assert_eq!(&bytes[..4], &0.25f32.to_le_bytes());

        let decoded = EngineState::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, state);
        assert!(decoded.is_on(Lane::Delay, 3));
        assert!(decoded.is_on(Lane::Reverb, 15));
    }

    #[test]
    fn test_short_payload_defaults_missing_cells() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&6.0f32.to_le_bytes());
        bytes.extend_from_slice(&[1, 0, 7]);

        let state = EngineState::from_bytes(&bytes).unwrap();
        assert_eq!(state.mix, 1.0);
        assert_eq!(state.output_gain_db, 6.0);
        assert_eq!(state.cells.len(), NUM_CELLS);
        assert!(state.is_on(Lane::Gate, 0));
        assert!(!state.is_on(Lane::Gate, 1));
        assert!(state.is_on(Lane::Gate, 2));
        assert_eq!(state.cells.iter().filter(|&&c| c).count(), 2);
    }

    #[test]
    fn test_extra_cells_ignored() {
        let mut bytes = EngineState::default().to_bytes();
        bytes.extend_from_slice(&[1; 20]);
        let state = EngineState::from_bytes(&bytes).unwrap();
        assert_eq!(state, EngineState::default());
    }

    #[test]
    fn test_truncated_header_is_an_error() {
        assert_eq!(
            EngineState::from_bytes(&[0, 0, 0]),
            Err(StateError::Truncated { expected: 8, found: 3 })
        );
    }

    #[test]
    fn test_apply_clamps_and_pads() {
        let grid = StepGrid::new();
        let params = EngineParams::new();
        grid.set(Lane::Reverb, 9, true);

        let state = EngineState {
            mix: 3.0,
            output_gain_db: -100.0,
            cells: vec![true; 4],
        };
        state.apply(&grid, &params);

        assert_eq!(params.mix(), 1.0);
        assert_eq!(params.output_gain_db(), -24.0);
        assert_eq!(grid.active_count(), 4);
        assert!(!grid.is_on(Lane::Reverb, 9));

        let captured = EngineState::capture(&grid, &params);
        assert_eq!(captured.cells.len(), NUM_CELLS);
        assert_eq!(captured.mix, 1.0);
    }

    #[test]
    fn test_yaml_missing_fields_use_defaults() {
        let state: EngineState = serde_yaml::from_str("mix: 0.75").unwrap();
        assert_eq!(state.mix, 0.75);
        assert_eq!(state.output_gain_db, 0.0);
        assert_eq!(state.cells.len(), NUM_CELLS);
    }
}
