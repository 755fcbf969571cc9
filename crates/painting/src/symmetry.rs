//! Symmetry painting: reflection across a user-placed axis
//!
//! While symmetry is enabled but the axis is unlocked, pointer gestures edit
//! the axis and painting is blocked. Locking freezes the axis and every paint
//! operation is repeated at the mirrored point.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{AXIS_PICK_RADIUS, DEGENERATE_AXIS_LENGTH_SQ};
use crate::validation::uv_in_unit_square;

/// Reflect `point` across the line through `a` and `b`.
///
/// A degenerate axis (both points equal) returns `point` unchanged.
pub fn mirror(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let dir = b - a;
    let len_sq = dir.length_squared();
    if len_sq < DEGENERATE_AXIS_LENGTH_SQ {
        return point;
    }
    let proj = a + dir * ((point - a).dot(dir) / len_sq);
    proj + (proj - point)
}

/// Symmetry axis as two UV points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryAxis {
    pub a: Vec2,
    pub b: Vec2,
}

impl Default for SymmetryAxis {
    /// Vertical center line u = 0.5
    fn default() -> Self {
        Self {
            a: Vec2::new(0.5, 0.0),
            b: Vec2::new(0.5, 1.0),
        }
    }
}

impl SymmetryAxis {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    pub fn is_degenerate(&self) -> bool {
        (self.b - self.a).length_squared() < DEGENERATE_AXIS_LENGTH_SQ
    }

    pub fn mirror(&self, point: Vec2) -> Vec2 {
        mirror(point, self.a, self.b)
    }

    /// Distance from `p` to the axis segment
    fn distance_to_segment(&self, p: Vec2) -> f32 {
        let dir = self.b - self.a;
        let len_sq = dir.length_squared();
        if len_sq < DEGENERATE_AXIS_LENGTH_SQ {
            return p.distance(self.a);
        }
        let t = ((p - self.a).dot(dir) / len_sq).clamp(0.0, 1.0);
        p.distance(self.a + dir * t)
    }
}

/// Part of the axis grabbed by the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisHandle {
    A,
    B,
    /// The segment between the endpoints; dragging it translates the axis
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisDrag {
    handle: AxisHandle,
    last: Vec2,
}

/// Symmetry toggles, the axis and any in-progress axis drag
#[derive(Debug, Clone, Default)]
pub struct SymmetryState {
    enabled: bool,
    locked: bool,
    axis: SymmetryAxis,
    drag: Option<AxisDrag>,
}

impl SymmetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every setting at once. Cancels an axis drag when the axis
    /// becomes non-editable.
    pub fn set(&mut self, enabled: bool, locked: bool, a: Vec2, b: Vec2) {
        self.enabled = enabled;
        self.locked = locked;
        self.axis = SymmetryAxis::new(a, b);
        if !self.is_editing() {
            self.drag = None;
        }
        debug!(
            "symmetry: enabled={} locked={} axis=({:?}, {:?})",
            enabled, locked, a, b
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn axis(&self) -> SymmetryAxis {
        self.axis
    }

    /// Enabled but unlocked: the axis is editable and painting is blocked
    pub fn is_editing(&self) -> bool {
        self.enabled && !self.locked
    }

    pub fn blocks_painting(&self) -> bool {
        self.is_editing()
    }

    /// Whether paint operations are repeated at the mirrored point
    pub fn is_mirroring(&self) -> bool {
        self.enabled && self.locked
    }

    /// Mirrored counterpart of `uv`, if mirroring is active and it lands in
    /// the unit square
    pub fn mirrored_target(&self, uv: Vec2) -> Option<Vec2> {
        if !self.is_mirroring() {
            return None;
        }
        let mirrored = self.axis.mirror(uv);
        uv_in_unit_square(mirrored).then_some(mirrored)
    }

    /// Back to the vertical center line
    pub fn reset_axis(&mut self) {
        self.axis = SymmetryAxis::default();
        self.drag = None;
    }

    /// Handle under the pointer; endpoints win over the body
    pub fn pick_handle(&self, uv: Vec2) -> Option<AxisHandle> {
        if uv.distance(self.axis.a) <= AXIS_PICK_RADIUS {
            Some(AxisHandle::A)
        } else if uv.distance(self.axis.b) <= AXIS_PICK_RADIUS {
            Some(AxisHandle::B)
        } else if self.axis.distance_to_segment(uv) <= AXIS_PICK_RADIUS {
            Some(AxisHandle::Body)
        } else {
            None
        }
    }

    /// Start dragging whatever handle is under `uv`. Returns false when the
    /// axis is not editable or nothing was hit.
    pub fn begin_axis_drag(&mut self, uv: Vec2) -> bool {
        if !self.is_editing() {
            return false;
        }
        let Some(handle) = self.pick_handle(uv) else {
            return false;
        };
        debug!("symmetry: grabbed {:?} at {:?}", handle, uv);
        self.drag = Some(AxisDrag { handle, last: uv });
        true
    }

    /// Move the grabbed handle to `uv`. Endpoints follow the pointer
    /// (clamped to the unit square); the body translates both endpoints by
    /// the pointer delta, limited so neither leaves the unit square.
    pub fn drag_axis_to(&mut self, uv: Vec2) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        if !uv.is_finite() {
            return false;
        }

        match drag.handle {
            AxisHandle::A => self.axis.a = uv.clamp(Vec2::ZERO, Vec2::ONE),
            AxisHandle::B => self.axis.b = uv.clamp(Vec2::ZERO, Vec2::ONE),
            AxisHandle::Body => {
                let lo = self.axis.a.min(self.axis.b);
                let hi = self.axis.a.max(self.axis.b);
                let delta = (uv - drag.last).clamp(-lo, Vec2::ONE - hi);
                self.axis.a += delta;
                self.axis.b += delta;
            }
        }
        drag.last = uv;
        true
    }

    pub fn end_axis_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging_axis(&self) -> bool {
        self.drag.is_some()
    }
}
