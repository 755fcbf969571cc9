//! Stroke handling for the paint session

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::CanvasStore;
use crate::compositor::{Dab, PaintTarget};
use crate::constants::NO_ISLAND;
use crate::masks::PixelGate;
use crate::messages::{Notice, NoticeKey};
use crate::types::BlendMode;

use super::UvPaintSession;

/// Island IDs a stroke is confined to, fixed at its first dab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IslandLocks {
    pub primary: i32,
    /// Lock for the mirrored dabs, from the mirrored start point
    pub mirrored: i32,
}

impl IslandLocks {
    pub const NONE: IslandLocks = IslandLocks {
        primary: NO_ISLAND,
        mirrored: NO_ISLAND,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Active {
        /// Last pointer position, the start of the next drag segment
        last_uv: Option<Vec2>,
        locks: Option<IslandLocks>,
    },
}

/// What ended a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrokeEnd {
    PointerUp,
    PointerLeave,
    FocusLost,
    Explicit,
}

impl UvPaintSession {
    pub fn stroke_state(&self) -> StrokeState {
        self.stroke
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.stroke, StrokeState::Active { .. })
    }

    /// Begin an operation: takes the undo snapshot. Does nothing (and
    /// returns false) while a stroke is already active.
    pub fn begin_stroke(&mut self) -> bool {
        if self.is_stroking() {
            return false;
        }
        if self.canvas.is_none() {
            self.raise(Notice::new(NoticeKey::NoCanvas));
            return false;
        }
        self.push_snapshot();
        self.stroke = StrokeState::Active {
            last_uv: None,
            locks: None,
        };
        debug!("begin_stroke: {} undo levels", self.history.undo_count());
        true
    }

    /// End the active stroke, if any
    pub fn end_stroke(&mut self) -> bool {
        self.finish_stroke(StrokeEnd::Explicit)
    }

    /// The single Active -> Idle transition
    pub fn finish_stroke(&mut self, reason: StrokeEnd) -> bool {
        if !self.is_stroking() {
            return false;
        }
        self.stroke = StrokeState::Idle;
        debug!("finish_stroke: {:?}", reason);
        true
    }

    /// Rejects input while there is no canvas or the symmetry axis is being edited
    fn accepts_paint_input(&mut self) -> bool {
        if self.canvas.is_none() {
            self.raise(Notice::new(NoticeKey::NoCanvas));
            return false;
        }
        if self.symmetry.blocks_painting() {
            self.raise(Notice::new(NoticeKey::SymmetryEditingBlocksPaint));
            return false;
        }
        true
    }

    /// Paint one dab (plus its mirror). Outside a stroke this is its own
    /// undoable operation.
    pub fn paint_at(&mut self, uv: Vec2, mode: BlendMode) -> bool {
        if !self.accepts_paint_input() || !uv.is_finite() {
            return false;
        }
        let atomic = self.begin_stroke();
        let painted = self.paint_point(uv, mode);
        if atomic {
            self.finish_stroke(StrokeEnd::Explicit);
        }
        painted
    }

    /// Paint evenly spaced dabs from `from` to `to`, both ends included.
    /// Outside a stroke this is its own undoable operation.
    pub fn drag_to(&mut self, from: Vec2, to: Vec2, mode: BlendMode) -> bool {
        if !self.accepts_paint_input() || !from.is_finite() || !to.is_finite() {
            return false;
        }
        let Some((width, height)) = self.dimensions() else {
            return false;
        };

        let atomic = self.begin_stroke();
        let samples = self.brush.resample(from, to, width, height);
        debug!("drag_to: {:?} -> {:?}, {} dabs", from, to, samples.len());

        let mut painted = false;
        for uv in samples {
            painted |= self.paint_point(uv, mode);
        }
        if let StrokeState::Active { last_uv, .. } = &mut self.stroke {
            *last_uv = Some(to);
        }
        if atomic {
            self.finish_stroke(StrokeEnd::Explicit);
        }
        painted
    }

    /// Pointer pressed on the canvas at `uv`
    pub fn pointer_down(&mut self, uv: Vec2) -> bool {
        if self.symmetry.is_editing() {
            if self.symmetry.begin_axis_drag(uv) {
                return true;
            }
            self.raise(Notice::new(NoticeKey::SymmetryEditingBlocksPaint));
            return false;
        }
        // a press always starts a fresh operation, even if the last release was lost
        self.finish_stroke(StrokeEnd::Explicit);
        if self.mode.is_island_mode() {
            return self.fill_at(uv, self.mode.fill_mode()).is_filled();
        }

        self.begin_stroke();
        if let StrokeState::Active { last_uv, .. } = &mut self.stroke {
            *last_uv = Some(uv);
        }
        self.paint_at(uv, self.mode.blend_mode())
    }

    /// Pointer moved with the button held
    pub fn pointer_drag(&mut self, uv: Vec2) -> bool {
        if self.symmetry.is_dragging_axis() {
            return self.symmetry.drag_axis_to(uv);
        }
        let StrokeState::Active {
            last_uv: Some(last),
            ..
        } = self.stroke
        else {
            return false;
        };
        self.drag_to(last, uv, self.mode.blend_mode())
    }

    /// Pointer released, inside or outside the canvas
    pub fn pointer_up(&mut self) -> bool {
        self.symmetry.end_axis_drag();
        self.finish_stroke(StrokeEnd::PointerUp)
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.symmetry.end_axis_drag();
        self.finish_stroke(StrokeEnd::PointerLeave)
    }

    pub fn focus_lost(&mut self) -> bool {
        self.symmetry.end_axis_drag();
        self.finish_stroke(StrokeEnd::FocusLost)
    }

    /// Mirrored counterpart of `uv`, None when mirroring is off, the axis is
    /// degenerate or the mirror leaves the unit square
    pub(crate) fn mirror_of(&self, uv: Vec2) -> Option<Vec2> {
        if self.symmetry.axis().is_degenerate() {
            return None;
        }
        self.symmetry.mirrored_target(uv)
    }

    pub(crate) fn island_lock_at(&self, uv: Vec2) -> i32 {
        if !self.island_isolation {
            return NO_ISLAND;
        }
        self.masks().map_or(NO_ISLAND, |m| m.island_at_uv(uv))
    }

    /// Locks of the active stroke, computed from `uv` on first use
    fn stroke_locks(&mut self, uv: Vec2) -> IslandLocks {
        if let StrokeState::Active {
            locks: Some(locks), ..
        } = self.stroke
        {
            return locks;
        }
        let computed = IslandLocks {
            primary: self.island_lock_at(uv),
            mirrored: self
                .mirror_of(uv)
                .map_or(NO_ISLAND, |m| self.island_lock_at(m)),
        };
        if let StrokeState::Active { locks, .. } = &mut self.stroke {
            *locks = Some(computed);
            debug!("stroke locks: {:?}", computed);
        }
        computed
    }

    fn paint_point(&mut self, uv: Vec2, mode: BlendMode) -> bool {
        self.ensure_masks();
        let locks = if self.is_stroking() {
            self.stroke_locks(uv)
        } else {
            IslandLocks::NONE
        };

        let mut painted = self.stamp(uv, mode, locks.primary);
        if let Some(mirrored) = self.mirror_of(uv) {
            painted |= self.stamp(mirrored, mode, locks.mirrored);
        }
        painted
    }

    /// Composite a single dab at `uv` confined to island `lock`
    fn stamp(&mut self, uv: Vec2, mode: BlendMode, lock: i32) -> bool {
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        let (width, height) = canvas.dimensions();
        let gate = PixelGate::new(
            self.masks.get_for(width, height),
            self.boundary_limit,
            lock,
        );
        let kernel = self.kernels.get(self.brush.radius, self.brush.hardness);
        let dab = Dab::at_uv(uv, width, height, &self.brush, mode);
        let mut target = PaintTarget::new(canvas, self.base.as_ref());
        self.compositor
            .apply_dab(&mut target, &dab, kernel, &gate)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushSettings;
    use crate::mesh::UvMesh;
    use crate::surface::CpuSurface;
    use crate::types::{PaintMode, Rgba, TRANSPARENT};
    use uvpaint_config::PainterSettings;

    const RED: Rgba = [1.0, 0.0, 0.0, 1.0];

    fn session(width: u32, height: u32) -> UvPaintSession {
        let mut session = UvPaintSession::new(width, height, &PainterSettings::default()).unwrap();
        session.set_brush(BrushSettings {
            radius: 5,
            hardness: 1.0,
            opacity: 1.0,
            color: RED,
        });
        session
    }

    fn pixel(session: &UvPaintSession, x: u32, y: u32) -> Rgba {
        session.get_pixel(x, y).unwrap_or(TRANSPARENT)
    }

    /// Islands A (v in [0, 0.45]) and B (v in [0.55, 1]) spanning the full width
    fn stacked_islands() -> UvMesh {
        let mut mesh = UvMesh::quad(Vec2::ZERO, Vec2::new(1.0, 0.45));
        mesh.push_quad(Vec2::new(0.0, 0.55), Vec2::ONE);
        mesh
    }

    #[test]
    fn test_stroke_state_machine() {
        let mut s = session(32, 32);
        assert!(s.begin_stroke());
        assert!(!s.begin_stroke());
        assert_eq!(s.undo_count(), 1);
        assert!(s.finish_stroke(StrokeEnd::PointerLeave));
        assert!(!s.end_stroke());
    }

    #[test]
    fn test_every_exit_path_finishes_stroke() {
        let mut s = session(32, 32);
        let exits: [fn(&mut UvPaintSession) -> bool; 3] = [
            UvPaintSession::pointer_up,
            UvPaintSession::pointer_leave,
            UvPaintSession::focus_lost,
        ];
        for exit in exits {
            assert!(s.pointer_down(Vec2::splat(0.5)));
            assert!(s.is_stroking());
            assert!(exit(&mut s));
            assert!(!s.is_stroking());
        }
        assert_eq!(s.undo_count(), 3);
    }

    #[test]
    fn test_paint_at_outside_stroke_is_one_operation() {
        let mut s = session(64, 64);
        assert!(s.paint_at(Vec2::splat(0.5), BlendMode::Paint));
        assert!(!s.is_stroking());
        assert_eq!(s.undo_count(), 1);
        assert_eq!(pixel(&s, 32, 32), RED);
    }

    #[test]
    fn test_drag_leaves_continuous_line() {
        let mut s = session(101, 101);
        assert!(s.pointer_down(Vec2::new(0.1, 0.5)));
        assert!(s.pointer_drag(Vec2::new(0.9, 0.5)));
        assert!(s.pointer_up());

        for x in 10..=90 {
            assert_eq!(pixel(&s, x, 50), RED, "gap at x={}", x);
        }
        assert_eq!(pixel(&s, 50, 60), TRANSPARENT);
        assert_eq!(s.undo_count(), 1);
    }

    #[test]
    fn test_boundary_limit_gates_uncovered_pixels() {
        let mut s = session(100, 100);
        s.bind_mesh(UvMesh::quad(Vec2::ZERO, Vec2::new(0.5, 1.0)));
        s.set_island_isolation(false);

        assert!(s.paint_at(Vec2::new(0.5, 0.5), BlendMode::Paint));
        // u * 99 <= 49.5 covers columns 0..=49
        assert_eq!(pixel(&s, 49, 50), RED);
        assert_eq!(pixel(&s, 50, 50), TRANSPARENT);

        s.set_boundary_limit(false);
        assert!(s.paint_at(Vec2::new(0.5, 0.5), BlendMode::Paint));
        assert_eq!(pixel(&s, 52, 50), RED);
    }

    #[test]
    fn test_isolation_lock_holds_across_gap() {
        let mut s = session(100, 100);
        s.bind_mesh(stacked_islands());
        s.set_boundary_limit(false);
        s.set_island_isolation(true);

        s.pointer_down(Vec2::new(0.5, 0.3));
        s.pointer_drag(Vec2::new(0.5, 0.8));
        s.pointer_up();

        assert_eq!(pixel(&s, 50, 30), RED);
        assert_eq!(pixel(&s, 50, 44), RED);
        for y in 45..100 {
            for x in 40..=60 {
                assert_eq!(pixel(&s, x, y), TRANSPARENT, "leak at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_press_without_release_starts_new_stroke() {
        let mut s = session(100, 100);
        s.bind_mesh(stacked_islands());

        assert!(s.pointer_down(Vec2::new(0.5, 0.2)));
        // release never arrives; the next press lands on the other island
        assert!(s.pointer_down(Vec2::new(0.5, 0.8)));
        assert!(s.pointer_up());

        assert_eq!(s.undo_count(), 2);
        assert_eq!(pixel(&s, 50, 20), RED);
        // 0.8 * 99 = 79.2 rounds to row 79
        assert_eq!(pixel(&s, 50, 79), RED);
    }

    #[test]
    fn test_stroke_undo_redo_is_bit_exact() {
        let base = CpuSurface::filled(64, 64, [0.2, 0.4, 0.6, 1.0]);
        let mut s = UvPaintSession::with_base(base, &PainterSettings::default()).unwrap();
        s.set_brush(BrushSettings {
            radius: 6,
            hardness: 0.4,
            opacity: 0.7,
            color: RED,
        });
        let before = s.surface().cloned().unwrap();

        assert!(s.pointer_down(Vec2::new(0.2, 0.3)));
        assert!(s.pointer_drag(Vec2::new(0.5, 0.6)));
        assert!(s.pointer_drag(Vec2::new(0.8, 0.4)));
        assert!(s.pointer_up());
        let after = s.surface().cloned().unwrap();
        assert_ne!(before, after);
        assert_eq!(s.undo_count(), 1);

        assert!(s.undo());
        assert_eq!(s.surface(), Some(&before));
        assert!(s.redo());
        assert_eq!(s.surface(), Some(&after));
        assert!(!s.redo());
    }

    #[test]
    fn test_stroke_starting_off_island_is_unlocked() {
        let mut s = session(100, 100);
        s.bind_mesh(stacked_islands());
        s.set_boundary_limit(false);

        s.pointer_down(Vec2::new(0.5, 0.5));
        s.pointer_up();
        assert_eq!(pixel(&s, 50, 50), RED);
    }

    #[test]
    fn test_mirrored_dab_uses_its_own_island() {
        let mut mesh = UvMesh::quad(Vec2::ZERO, Vec2::new(0.4, 1.0));
        mesh.push_quad(Vec2::new(0.6, 0.0), Vec2::ONE);
        let mut s = session(100, 100);
        s.bind_mesh(mesh);
        s.set_symmetry(true, true, Vec2::new(0.5, 0.0), Vec2::new(0.5, 1.0));

        assert!(s.paint_at(Vec2::new(0.2, 0.5), BlendMode::Paint));
        assert_eq!(pixel(&s, 20, 50), RED);
        // 0.8 * 99 = 79.2 rounds to column 79
        assert_eq!(pixel(&s, 79, 50), RED);
        assert_eq!(pixel(&s, 50, 50), TRANSPARENT);
    }

    #[test]
    fn test_symmetry_editing_blocks_paint() {
        let mut s = session(64, 64);
        s.set_symmetry(true, false, Vec2::new(0.5, 0.0), Vec2::new(0.5, 1.0));

        assert!(!s.paint_at(Vec2::new(0.2, 0.2), BlendMode::Paint));
        assert_eq!(
            s.take_notice().map(|n| n.key),
            Some(NoticeKey::SymmetryEditingBlocksPaint)
        );
        assert!(!s.pointer_down(Vec2::new(0.2, 0.2)));
        assert!(!s.can_undo());

        // grabbing the axis drags it instead of painting
        assert!(s.pointer_down(Vec2::new(0.5, 0.5)));
        assert!(s.pointer_drag(Vec2::new(0.6, 0.5)));
        assert!(!s.pointer_up());
        assert!((s.symmetry().axis().a.x - 0.6).abs() < 1e-5);
        assert!(s.surface().is_some_and(|c| c.pixels().iter().all(|p| *p == TRANSPARENT)));
    }

    #[test]
    fn test_erase_restores_base() {
        let base = CpuSurface::filled(64, 64, [0.2, 0.4, 0.6, 1.0]);
        let mut s = UvPaintSession::with_base(base, &PainterSettings::default()).unwrap();
        s.set_brush(BrushSettings {
            radius: 4,
            hardness: 1.0,
            opacity: 1.0,
            color: RED,
        });

        s.paint_at(Vec2::splat(0.5), BlendMode::Paint);
        assert_eq!(pixel(&s, 32, 32), RED);
        s.set_mode(PaintMode::Erase);
        s.pointer_down(Vec2::splat(0.5));
        s.pointer_up();
        assert_eq!(pixel(&s, 32, 32), [0.2, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn test_no_canvas_notice() {
        let mut s = session(16, 16);
        s.shutdown();
        assert!(!s.paint_at(Vec2::splat(0.5), BlendMode::Paint));
        assert_eq!(s.take_notice().map(|n| n.key), Some(NoticeKey::NoCanvas));
    }
}
