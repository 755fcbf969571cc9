//! Full-canvas undo/redo snapshots

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::canvas::TiledCanvas;
use crate::surface::CpuSurface;

use super::UvPaintSession;

/// Recycled snapshot surfaces, keyed by size
#[derive(Debug, Default)]
pub struct SnapshotPool {
    free: HashMap<(u32, u32), Vec<CpuSurface>>,
    max_per_size: usize,
}

impl SnapshotPool {
    pub fn new(max_per_size: usize) -> Self {
        Self {
            free: HashMap::new(),
            max_per_size,
        }
    }

    /// A surface of this size, reused when one is free. Contents are
    /// unspecified.
    pub fn acquire(&mut self, width: u32, height: u32) -> CpuSurface {
        self.free
            .get_mut(&(width, height))
            .and_then(Vec::pop)
            .unwrap_or_else(|| CpuSurface::new(width, height))
    }

    pub fn release(&mut self, surface: CpuSurface) {
        let bucket = self.free.entry(surface.dimensions()).or_default();
        if bucket.len() < self.max_per_size {
            bucket.push(surface);
        }
    }

    pub fn pooled_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}

/// Bounded undo stack plus redo stack
#[derive(Debug)]
pub struct UndoHistory {
    undo: VecDeque<CpuSurface>,
    redo: Vec<CpuSurface>,
    pool: SnapshotPool,
    limit: usize,
}

impl UndoHistory {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            undo: VecDeque::with_capacity(limit),
            redo: Vec::new(),
            pool: SnapshotPool::new(limit),
            limit,
        }
    }

    /// Record the canvas before a new operation. Drops the redo stack and
    /// evicts the oldest snapshot past the limit.
    pub fn push_snapshot(&mut self, canvas: &CpuSurface) {
        let (width, height) = canvas.dimensions();
        let mut snapshot = self.pool.acquire(width, height);
        snapshot.copy_from(canvas);
        self.push_undo(snapshot);

        for stale in self.redo.drain(..) {
            self.pool.release(stale);
        }
        debug!("push_snapshot: {} undo levels", self.undo.len());
    }

    fn push_undo(&mut self, snapshot: CpuSurface) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.limit {
            if let Some(evicted) = self.undo.pop_front() {
                self.pool.release(evicted);
            }
        }
    }

    /// Restore the latest snapshot; the current canvas moves to redo
    pub fn undo(&mut self, canvas: &mut TiledCanvas) -> bool {
        let Some(snapshot) = self.undo.pop_back() else {
            debug!("Undo: no entries available");
            return false;
        };
        let current = self.capture(canvas.surface());
        if !canvas.restore_from(&snapshot) {
            self.pool.release(current);
            self.undo.push_back(snapshot);
            return false;
        }
        self.redo.push(current);
        self.pool.release(snapshot);
        true
    }

    /// Reapply the latest undone state; the current canvas moves to undo
    pub fn redo(&mut self, canvas: &mut TiledCanvas) -> bool {
        let Some(snapshot) = self.redo.pop() else {
            debug!("Redo: no entries available");
            return false;
        };
        let current = self.capture(canvas.surface());
        if !canvas.restore_from(&snapshot) {
            self.pool.release(current);
            self.redo.push(snapshot);
            return false;
        }
        self.push_undo(current);
        self.pool.release(snapshot);
        true
    }

    fn capture(&mut self, canvas: &CpuSurface) -> CpuSurface {
        let (width, height) = canvas.dimensions();
        let mut copy = self.pool.acquire(width, height);
        copy.copy_from(canvas);
        copy
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn pool(&self) -> &SnapshotPool {
        &self.pool
    }

    /// Move every snapshot back to the pool
    pub fn clear(&mut self) {
        let snapshots: Vec<CpuSurface> = self.undo.drain(..).chain(self.redo.drain(..)).collect();
        for snapshot in snapshots {
            self.pool.release(snapshot);
        }
    }

    /// Drop all snapshots and pooled surfaces
    pub fn release_all(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.pool.clear();
    }
}

impl UvPaintSession {
    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Get the number of undo levels available
    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    /// Undo the last operation
    ///
    /// Returns true if an undo was performed. An active stroke is finished
    /// first so its snapshot is the one restored.
    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        self.history.undo(canvas)
    }

    /// Redo the last undone operation
    pub fn redo(&mut self) -> bool {
        self.end_stroke();
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        self.history.redo(canvas)
    }

    /// Snapshot the working canvas before an operation
    pub(crate) fn push_snapshot(&mut self) {
        if let Some(canvas) = self.canvas.as_ref() {
            self.history.push_snapshot(canvas.surface());
        }
    }
}
