use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use cellpath_grid::{CellLayer, MapShape};
use log::{debug, trace};
use parking_lot::Mutex;

use crate::CellInfo;

/// Reusable search layers for the maps of one context.
///
/// Searches check out a layer sized for their map and hand it back when they finish, so a steady
/// stream of searches allocates no more layers than run at once. The pool is shared between
/// threads by reference.
#[derive(Default)]
pub struct LayerPool {
    state: Mutex<PoolState>,
    allocated: AtomicUsize,
}

#[derive(Default)]
struct PoolState {
    idle: AHashMap<MapShape, Vec<CellLayer<CellInfo>>>,
    templates: AHashMap<MapShape, Arc<CellLayer<CellInfo>>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Layers allocated over the lifetime of the pool.
    pub allocated: usize,
    /// Layers currently waiting to be reused.
    pub idle: usize,
}

/// A layer checked out of a [`LayerPool`], returned to it exactly once.
pub struct PooledLayer<'a> {
    pool: &'a LayerPool,
    layer: Option<CellLayer<CellInfo>>,
}

impl LayerPool {
    pub fn new() -> Self {
        LayerPool::default()
    }

    /// Takes a layer of the given shape out of the pool, allocating one if none is idle.
    ///
    /// The contents are left over from the previous search; call [`reset`](Self::reset) before
    /// using it.
    pub fn acquire(&self, shape: MapShape) -> CellLayer<CellInfo> {
        let template = {
            let mut state = self.state.lock();
            match state.idle.get_mut(&shape).and_then(Vec::pop) {
                Some(layer) => return layer,
                None => state.template(shape),
            }
        };
        let count = self.allocated.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            "allocating {}x{} cell layer ({count} allocated)",
            shape.width(),
            shape.height()
        );
        (*template).clone()
    }

    /// Marks every cell of `layer` unvisited.
    #[track_caller]
    pub fn reset(&self, layer: &mut CellLayer<CellInfo>) {
        let template = self.state.lock().template(layer.shape());
        layer.copy_from(&*template);
    }

    /// Hands a layer back for reuse.
    ///
    /// Layers of a shape the pool no longer tracks, because it was shrunk while the layer was
    /// out, are dropped.
    pub fn release(&self, layer: CellLayer<CellInfo>) {
        let shape = layer.shape();
        let mut state = self.state.lock();
        if !state.templates.contains_key(&shape) {
            drop(state);
            debug!(
                "discarding {}x{} cell layer of a shape no longer pooled",
                shape.width(),
                shape.height()
            );
            return;
        }
        state.idle.entry(shape).or_default().push(layer);
    }

    /// Acquires and resets a layer, returning a guard that releases it.
    pub fn checkout(&self, shape: MapShape) -> PooledLayer<'_> {
        let mut layer = self.acquire(shape);
        self.reset(&mut layer);
        PooledLayer {
            pool: self,
            layer: Some(layer),
        }
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            idle: state.idle.values().map(Vec::len).sum(),
        }
    }

    /// Frees every idle layer and template, e.g. after the map they belong to is unloaded.
    pub fn shrink(&self) {
        let (idle, templates) = {
            let mut state = self.state.lock();
            let idle = std::mem::take(&mut state.idle);
            let templates = std::mem::take(&mut state.templates);
            (idle, templates)
        };
        let discarded: usize = idle.values().map(Vec::len).sum();
        debug!(
            "shrinking layer pool: {discarded} idle layers, {} templates",
            templates.len()
        );
    }
}

impl PoolState {
    fn template(&mut self, shape: MapShape) -> Arc<CellLayer<CellInfo>> {
        self.templates
            .entry(shape)
            .or_insert_with(|| {
                trace!("building cell layer template for {shape:?}");
                Arc::new(CellLayer::new(shape, CellInfo::unvisited))
            })
            .clone()
    }
}

impl PooledLayer<'_> {
    /// Returns the layer to its pool. Later calls do nothing.
    pub fn release(&mut self) {
        if let Some(layer) = self.layer.take() {
            self.pool.release(layer);
        }
    }

    pub fn is_released(&self) -> bool {
        self.layer.is_none()
    }

    pub fn layer(&self) -> Option<&CellLayer<CellInfo>> {
        self.layer.as_ref()
    }

    pub fn layer_mut(&mut self) -> Option<&mut CellLayer<CellInfo>> {
        self.layer.as_mut()
    }
}

impl Drop for PooledLayer<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use cellpath_grid::CPos;

    use super::*;
    use crate::CellStatus;

    #[test]
    fn released_layers_are_reused() {
        let pool = LayerPool::new();
        let shape = MapShape::rectangular(8, 6);

        let first: Vec<_> = (0..3).map(|_| pool.acquire(shape)).collect();
        assert_eq!(pool.stats(), PoolStats { allocated: 3, idle: 0 });
        for layer in first {
            pool.release(layer);
        }
        assert_eq!(pool.stats(), PoolStats { allocated: 3, idle: 3 });

        let second: Vec<_> = (0..3).map(|_| pool.acquire(shape)).collect();
        assert_eq!(pool.stats(), PoolStats { allocated: 3, idle: 0 });

        // Layers of another shape are never handed out for this one.
        let other = pool.acquire(MapShape::isometric(8, 6));
        assert_eq!(pool.stats().allocated, 4);
        assert_eq!(other.shape(), MapShape::isometric(8, 6));
        drop(second);
    }

    #[test]
    fn reacquired_layers_are_reset() {
        let pool = LayerPool::new();
        let shape = MapShape::rectangular(5, 5);

        let mut pooled = pool.checkout(shape);
        let layer = pooled.layer_mut().unwrap();
        for cell in shape.cells() {
            layer[cell].status = CellStatus::Closed;
            layer[cell].cost_so_far = 7;
            layer[cell].previous = CPos::new(0, 0);
        }
        drop(pooled);

        let pooled = pool.checkout(shape);
        assert_eq!(pool.stats().allocated, 1);
        let layer = pooled.layer().unwrap();
        for cell in shape.cells() {
            assert_eq!(layer[cell], CellInfo::unvisited(cell));
        }
    }

    #[test]
    fn pooled_layer_releases_once() {
        let pool = LayerPool::new();
        let shape = MapShape::rectangular(2, 2);

        let mut pooled = pool.checkout(shape);
        assert!(!pooled.is_released());
        pooled.release();
        pooled.release();
        assert!(pooled.is_released());
        assert!(pooled.layer().is_none());
        drop(pooled);
        assert_eq!(pool.stats(), PoolStats { allocated: 1, idle: 1 });
    }

    #[test]
    fn shrink_drops_idle_and_late_releases() {
        let pool = LayerPool::new();
        let shape = MapShape::rectangular(3, 3);
        let outstanding = pool.checkout(shape);
        drop(pool.checkout(shape));
        assert_eq!(pool.stats().idle, 1);

        pool.shrink();
        assert_eq!(pool.stats().idle, 0);
        drop(outstanding);
        assert_eq!(pool.stats().idle, 0);

        // The shape is pooled again once something asks for it.
        drop(pool.checkout(shape));
        assert_eq!(pool.stats(), PoolStats { allocated: 3, idle: 1 });
    }
}
