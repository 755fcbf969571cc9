//! UV painting session
//!
//! This module ties the pieces together for one bound texture:
//! - Working canvas and base reference
//! - Mesh masks (coverage + islands), rebuilt lazily
//! - Brush, kernel cache and compositor backend
//! - Symmetry state and the stroke state machine
//! - Undo/redo snapshots
//!
//! The session is single-threaded and synchronous; the host forwards
//! pointer events and reads back pixels, dirty tiles and notices.

mod fill_ops;
mod stroke;
mod surface_ops;
mod undo;

use glam::Vec2;
use tracing::{debug, info, warn};
use uvpaint_config::{Language, PainterSettings};

use crate::brush::BrushSettings;
use crate::canvas::{CanvasStore, TiledCanvas};
use crate::compositor::{Compositor, create_compositor};
use crate::error::{PaintError, PaintResult};
use crate::kernel::KernelCache;
use crate::masks::{MaskCache, UvMasks};
use crate::mesh::UvMesh;
use crate::messages::{Notice, NoticeKey};
use crate::surface::CpuSurface;
use crate::symmetry::SymmetryState;
use crate::types::PaintMode;
use crate::validation::{ValidationError, validate_dimensions};

pub use stroke::{IslandLocks, StrokeEnd, StrokeState};
pub use undo::{SnapshotPool, UndoHistory};

/// One painting session over a bound texture
pub struct UvPaintSession {
    /// Working canvas, None after shutdown
    pub(crate) canvas: Option<TiledCanvas>,
    /// Immutable copy of the texture at bind time
    pub(crate) base: Option<CpuSurface>,
    pub(crate) mesh: Option<UvMesh>,
    pub(crate) masks: MaskCache,
    pub(crate) kernels: KernelCache,
    pub(crate) brush: BrushSettings,
    pub(crate) mode: PaintMode,
    pub(crate) boundary_limit: bool,
    pub(crate) island_isolation: bool,
    pub(crate) precompute_islands: bool,
    pub(crate) symmetry: SymmetryState,
    pub(crate) stroke: StrokeState,
    pub(crate) history: UndoHistory,
    pub(crate) compositor: Box<dyn Compositor>,
    pub(crate) language: Language,
    pub(crate) notice: Option<Notice>,
}

impl UvPaintSession {
    /// Session over a blank (transparent) canvas with no base reference
    pub fn new(width: u32, height: u32, settings: &PainterSettings) -> PaintResult<Self> {
        validate_dimensions(width, height)?;
        Ok(Self::from_parts(CpuSurface::new(width, height), None, settings))
    }

    /// Session painting over a copy of `base`; erase restores toward it
    pub fn with_base(base: CpuSurface, settings: &PainterSettings) -> PaintResult<Self> {
        validate_dimensions(base.width, base.height)?;
        Ok(Self::from_parts(base.clone(), Some(base), settings))
    }

    fn from_parts(working: CpuSurface, base: Option<CpuSurface>, settings: &PainterSettings) -> Self {
        let settings = settings.sanitized();
        info!(
            "UvPaintSession: {}x{} canvas, base={}, backend={:?}",
            working.width,
            working.height,
            base.is_some(),
            settings.backend
        );
        Self {
            canvas: Some(TiledCanvas::with_default_tile_size(working)),
            base,
            mesh: None,
            masks: MaskCache::new(),
            kernels: KernelCache::new(),
            brush: BrushSettings::from(settings.brush),
            mode: PaintMode::default(),
            boundary_limit: settings.boundary_limit,
            island_isolation: settings.island_isolation,
            precompute_islands: settings.precompute_islands,
            symmetry: SymmetryState::new(),
            stroke: StrokeState::Idle,
            history: UndoHistory::new(settings.undo_limit),
            compositor: create_compositor(settings.backend, settings.parallel_pixel_threshold),
            language: settings.language,
            notice: None,
        }
    }

    /// Replace the texture being painted. History is dropped and masks are
    /// rebuilt for the new size on next use.
    pub fn bind_texture(&mut self, base: CpuSurface) -> PaintResult<()> {
        validate_dimensions(base.width, base.height)?;
        self.end_stroke();
        self.history.clear();
        info!("bind_texture: {}x{}", base.width, base.height);
        self.canvas = Some(TiledCanvas::with_default_tile_size(base.clone()));
        self.base = Some(base);
        self.masks.invalidate();
        Ok(())
    }

    /// Replace the base reference without touching the working canvas.
    /// A base of a different size is rejected.
    pub fn set_base(&mut self, base: CpuSurface) -> PaintResult<()> {
        let (width, height) = self.dimensions().ok_or(PaintError::NoCanvas)?;
        if base.dimensions() != (width, height) {
            return Err(ValidationError::SizeMismatch {
                width,
                height,
                base_width: base.width,
                base_height: base.height,
            }
            .into());
        }
        self.base = Some(base);
        Ok(())
    }

    /// Bind the mesh whose UV layout drives masking and island fills
    pub fn bind_mesh(&mut self, mesh: UvMesh) {
        info!(
            "bind_mesh: {} UVs, {} triangles",
            mesh.uvs.len(),
            mesh.triangle_count()
        );
        self.mesh = Some(mesh);
        self.masks.invalidate();
        self.ensure_masks();
    }

    /// Remove the mesh; painting continues without masks
    pub fn unbind_mesh(&mut self) {
        self.mesh = None;
        self.masks.clear();
    }

    pub fn mesh(&self) -> Option<&UvMesh> {
        self.mesh.as_ref()
    }

    /// Rebuild masks for `mesh` if they are stale. `mesh` becomes the bound
    /// mesh, so later canvas resizes rebuild from it. A size that disagrees
    /// with the canvas is replaced by the canvas size.
    /// Returns true if a rebuild happened.
    pub fn rebuild_masks_if_dirty(&mut self, mesh: &UvMesh, width: u32, height: u32) -> bool {
        let Some((canvas_width, canvas_height)) = self.dimensions() else {
            return false;
        };
        if (width, height) != (canvas_width, canvas_height) {
            warn!(
                "rebuild_masks_if_dirty: requested {}x{} but canvas is {}x{}, using canvas size",
                width, height, canvas_width, canvas_height
            );
        }
        if self.mesh.as_ref() != Some(mesh) {
            self.mesh = Some(mesh.clone());
            self.masks.invalidate();
        }
        self.masks
            .rebuild_if_dirty(mesh, canvas_width, canvas_height, self.precompute_islands)
    }

    /// Make sure the cached masks match the bound mesh and canvas size
    pub(crate) fn ensure_masks(&mut self) {
        let (Some(mesh), Some(canvas)) = (self.mesh.as_ref(), self.canvas.as_ref()) else {
            return;
        };
        let (width, height) = canvas.dimensions();
        if !self.masks.is_dirty() && self.masks.get_for(width, height).is_some() {
            return;
        }
        if let Some(stale) = self.masks.masks().filter(|m| !m.matches(width, height)) {
            warn!(
                "mask size {}x{} does not match canvas {}x{}, rebuilding",
                stale.coverage.width, stale.coverage.height, width, height
            );
        }
        self.masks
            .rebuild_if_dirty(mesh, width, height, self.precompute_islands);
    }

    /// Masks usable for the current canvas, if any
    pub fn masks(&self) -> Option<&UvMasks> {
        let (width, height) = self.dimensions()?;
        self.masks.get_for(width, height)
    }

    /// (width, height) of the working canvas
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.canvas.as_ref().map(|c| c.dimensions())
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush.clamped();
    }

    /// Radius +1, returns the new radius
    pub fn grow_brush(&mut self) -> u32 {
        self.brush.grow()
    }

    /// Radius -1, returns the new radius
    pub fn shrink_brush(&mut self) -> u32 {
        self.brush.shrink()
    }

    pub fn mode(&self) -> PaintMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PaintMode) {
        self.mode = mode;
    }

    pub fn set_boundary_limit(&mut self, enabled: bool) {
        self.boundary_limit = enabled;
    }

    pub fn boundary_limit(&self) -> bool {
        self.boundary_limit
    }

    pub fn set_island_isolation(&mut self, enabled: bool) {
        self.island_isolation = enabled;
    }

    pub fn island_isolation(&self) -> bool {
        self.island_isolation
    }

    /// Whether new masks get island labels. Takes effect on the next rebuild.
    pub fn set_precompute_islands(&mut self, enabled: bool) {
        if self.precompute_islands != enabled {
            self.precompute_islands = enabled;
            self.masks.invalidate();
        }
    }

    /// Configure symmetry in one call. Locking a degenerate axis raises a
    /// notice and mirroring is skipped until the axis is fixed.
    pub fn set_symmetry(&mut self, enabled: bool, locked: bool, a: Vec2, b: Vec2) {
        self.symmetry.set(enabled, locked, a, b);
        if self.symmetry.is_mirroring() && self.symmetry.axis().is_degenerate() {
            self.raise(Notice::new(NoticeKey::DegenerateAxis));
        }
    }

    pub fn symmetry(&self) -> &SymmetryState {
        &self.symmetry
    }

    /// Put the axis back on the vertical center line
    pub fn reset_symmetry_axis(&mut self) {
        self.symmetry.reset_axis();
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Re-apply settings (brush, toggles, language, backend). The canvas is
    /// kept; changing the undo limit starts a fresh history.
    pub fn apply_settings(&mut self, settings: &PainterSettings) {
        let settings = settings.sanitized();
        self.brush = BrushSettings::from(settings.brush);
        self.boundary_limit = settings.boundary_limit;
        self.island_isolation = settings.island_isolation;
        self.set_precompute_islands(settings.precompute_islands);
        self.language = settings.language;
        self.compositor = create_compositor(settings.backend, settings.parallel_pixel_threshold);
        if settings.undo_limit != self.history.limit() {
            self.history = UndoHistory::new(settings.undo_limit);
        }
    }

    /// Name of the active compositor backend
    pub fn compositor_name(&self) -> &'static str {
        self.compositor.name()
    }

    pub(crate) fn raise(&mut self, notice: Notice) {
        debug!("notice: {:?}", notice.key);
        self.notice = Some(notice);
    }

    /// Latest notice, cleared on read
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Text of the latest notice in the session language, cleared on read
    pub fn take_notice_text(&mut self) -> Option<String> {
        let language = self.language;
        self.take_notice().map(|n| n.text(language))
    }

    /// Release the canvas, masks and every snapshot
    pub fn shutdown(&mut self) {
        self.end_stroke();
        self.history.release_all();
        self.masks.clear();
        self.kernels.clear();
        self.canvas = None;
        self.base = None;
        self.mesh = None;
        info!("UvPaintSession shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.canvas.is_none()
    }
}
