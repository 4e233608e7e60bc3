//! Pad placement on a module's rim.
//!
//! Pads may only sit in one of eight slots around the module. The slots are
//! not evenly spaced: the four diagonal slots are wide, the four slots either
//! side of the vertical axis are narrow, following the footprint convention
//! the boards are drawn with.
//!
//! Slot angles here are measured clockwise on screen (y down), and a slot
//! position is `radius * (cos, sin)` of the slot angle plus the module angle.

use serde::{Deserialize, Serialize};

use crate::geometry::{angle_360, normalize_degrees, Position};

/// Number of rim slots per module.
pub const SLOT_COUNT: usize = 8;

/// Slot table: bucket upper bounds and the angle each bucket snaps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadSlots {
    /// Exclusive upper bound of each bucket, ascending, last one 360.
    pub boundaries: [f64; SLOT_COUNT],
    /// Canonical angle of each slot, degrees.
    pub angles: [f64; SLOT_COUNT],
}

impl Default for PadSlots {
    fn default() -> Self {
        Self {
            boundaries: [60.0, 90.0, 120.0, 180.0, 240.0, 270.0, 300.0, 360.0],
            angles: [45.0, 75.0, 105.0, 135.0, 225.0, 255.0, 285.0, 315.0],
        }
    }
}

impl PadSlots {
    /// Bucket a raw pointer angle relative to the module's rotation.
    pub fn bucket(&self, raw_angle: f64, module_angle: f64) -> Option<usize> {
        let offset = normalize_degrees(raw_angle - module_angle);
        let mut lower = 0.0;
        for (slot, &upper) in self.boundaries.iter().enumerate() {
            if lower <= offset && offset < upper {
                return Some(slot);
            }
            lower = upper;
        }
        None
    }

    /// Module-local position of `slot` on a rim of `radius`, turned by
    /// `angle` degrees. Out-of-range slots yield the origin.
    pub fn position(&self, slot: usize, radius: f64, angle: f64) -> Position {
        let Some(slot_angle) = self.angles.get(slot) else {
            tracing::warn!("There are only {} pad positions: {} is invalid", SLOT_COUNT, slot);
            return Position::ORIGIN;
        };
        let radians = (slot_angle + angle).to_radians();
        Position::new(radius * radians.cos(), radius * radians.sin())
    }

    /// Snap a raw angle to its slot position.
    pub fn snap(&self, raw_angle: f64, radius: f64, module_angle: f64) -> Position {
        match self.bucket(raw_angle, module_angle) {
            Some(slot) => self.position(slot, radius, module_angle),
            None => {
                tracing::warn!("Pad angle {} does not fall in any slot", raw_angle);
                Position::ORIGIN
            }
        }
    }
}

/// Where a pad dragged to the module-local `offset` comes to rest.
pub fn snap_pad_offset(offset: Position, radius: f64, module_angle: i32, slots: &PadSlots) -> Position {
    let raw_angle = 360.0 - angle_360(offset.x, offset.y);
    slots.snap(raw_angle, radius, module_angle as f64)
}
