//! The ordered clean pass: one artefact's dirty flags resolved against
//! reference snapshots.
//!
//! Steps run in a fixed dependency order - scale, dimensions, lock,
//! start, offset, handle, rotation, stamp position, stamp handle
//! position, shape rebuild. Each step clears its own flag and may mark
//! flags later in the order, never earlier, so a single pass always
//! terminates. The shape rebuild re-derives handle values inline after
//! emergent dimensions change instead of marking earlier flags.
//!
//! Referenced artefacts are read through snapshots taken before the
//! pass touches the dependent, so a referent is never mutated while a
//! dependent resolves. The canvas guarantees referents resolve first.

use glam::DVec2;

use crate::artefact::{Artefact, Dirty, PathPosition};
use crate::log::debug;
use crate::types::Lock;

/// Container-level inputs to a clean pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Env {
    /// Container dimensions; percentage resolution defers while absent.
    pub dims: Option<DVec2>,
    /// Pointer position; `mouse` locks degrade to `start` while absent.
    pub mouse: Option<DVec2>,
}

/// Copied resolved values of one referent.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ReferentState {
    pub stamp_position: DVec2,
    pub start: DVec2,
    pub offset: DVec2,
    pub handle: DVec2,
    pub rotation: f64,
    pub scale: f64,
    pub dimensions: DVec2,
}

impl ReferentState {
    pub(crate) fn of(a: &Artefact) -> Self {
        ReferentState {
            stamp_position: a.current_stamp_position,
            start: a.current_start,
            offset: a.current_offset,
            handle: a.current_handle,
            rotation: a.current_rotation,
            scale: a.current_scale,
            dimensions: a.current_dimensions,
        }
    }
}

/// Reference snapshots for one dependent's pass. Absent entries make
/// the corresponding locks degrade to `start`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct References {
    pub pivot: Option<ReferentState>,
    pub mimic: Option<ReferentState>,
    /// The path referent plus the point query for this dependent's
    /// current path position (absent when the path is degenerate).
    pub path: Option<(ReferentState, Option<PathPosition>)>,
}

#[inline]
fn axis(v: DVec2, i: usize) -> f64 {
    if i == 0 { v.x } else { v.y }
}

impl Artefact {
    /// Run the ordered clean sequence. On exit every dirty bit that the
    /// current environment allows to resolve is clear.
    pub(crate) fn prepare_stamp(&mut self, env: &Env, refs: &References) {
        // shape geometry depends on scale and placement; decide up
        // front whether it must rebuild, and whether memoization is
        // void (scale changes alter every computed coordinate)
        if self.shape.is_some() {
            if self.dirty.is_set(Dirty::Scale)
                || self.dirty.is_set(Dirty::Dimensions)
                || self.dirty.is_set(Dirty::Start)
                || self.dirty.is_set(Dirty::Handle)
            {
                self.dirty.mark(Dirty::PathShape);
            }
            if self.dirty.is_set(Dirty::Scale) {
                if let Some(shape) = self.shape.as_mut() {
                    shape.path_calculated_once = false;
                }
            }
        }

        // pointer-driven placement re-resolves every pass
        if self.is_being_dragged || self.lock_to.contains(&Lock::Mouse) {
            self.dirty.mark(Dirty::StampPositions);
        }

        if self.dirty.is_set(Dirty::Scale) {
            self.clean_scale(refs);
        }
        if self.dirty.is_set(Dirty::Dimensions) {
            self.clean_dimensions(env, refs);
        }
        if self.dirty.is_set(Dirty::Lock) {
            self.clean_lock();
        }
        if self.dirty.is_set(Dirty::Start) {
            self.clean_start(env);
        }
        if self.dirty.is_set(Dirty::Offset) {
            self.clean_offset(env);
        }
        if self.dirty.is_set(Dirty::Handle) {
            self.clean_handle();
        }
        if self.dirty.is_set(Dirty::Rotation) {
            self.clean_rotation(refs);
        }
        if self.dirty.is_set(Dirty::StampPositions) {
            self.clean_stamp_positions(env, refs);
        }
        if self.dirty.is_set(Dirty::StampHandlePositions) {
            self.clean_stamp_handle_positions(refs);
        }
        if self.dirty.is_set(Dirty::PathShape) {
            self.clean_path_shape(refs);
        }

        if self.changes.position_changed {
            self.dirty.mark(Dirty::Collision);
        }
        if self.dirty.is_set(Dirty::Collision) {
            self.clean_collision();
        }

        debug!(artefact = %self.name, clean = self.is_clean(), "prepare_stamp done");
    }

    fn clean_scale(&mut self, refs: &References) {
        self.dirty.clear(Dirty::Scale);

        let old = self.current_scale;
        let mut scale = self.scale;

        if self.use_mimic_scale {
            if let Some(m) = refs.mimic {
                scale = m.scale;
                if self.add_own_scale_to_mimic {
                    scale += self.scale;
                }
            }
        }

        self.current_scale = scale;
        self.dirty.mark(Dirty::Dimensions);
        self.dirty.mark(Dirty::Handle);

        if old != scale {
            self.changes.position_changed = true;
            self.changes.aspects.mark(Dirty::Scale);
        }
    }

    fn clean_dimensions(&mut self, env: &Env, refs: &References) {
        self.dirty.clear(Dirty::Dimensions);

        if self.shape.is_some() {
            // dimensions of a path-defined artefact are emergent from
            // its bounding box; placement still needs re-deriving
            self.dirty.mark(Dirty::Start);
            self.dirty.mark(Dirty::Handle);
            self.dirty.mark(Dirty::Offset);
            return;
        }

        let Some(host) = env.dims else {
            // no container size yet: stay dirty, resolve later
            self.dirty.mark(Dirty::Dimensions);
            return;
        };

        let old = self.current_dimensions;
        let own = self.dimensions.resolve(host);
        let mut dims = own;

        if self.use_mimic_dimensions {
            if let Some(m) = refs.mimic {
                dims = if self.add_own_dimensions_to_mimic {
                    m.dimensions + own
                } else {
                    m.dimensions
                };
            }
        }

        self.current_dimensions = dims;
        self.dirty.mark(Dirty::Start);
        self.dirty.mark(Dirty::Handle);
        self.dirty.mark(Dirty::Offset);

        if old != dims {
            self.changes.position_changed = true;
            self.changes.aspects.mark(Dirty::Dimensions);
        }
    }

    fn clean_lock(&mut self) {
        self.dirty.clear(Dirty::Lock);
        self.dirty.mark(Dirty::Start);
        self.dirty.mark(Dirty::Handle);
    }

    fn clean_start(&mut self, env: &Env) {
        self.dirty.clear(Dirty::Start);

        let Some(host) = env.dims else {
            self.dirty.mark(Dirty::Start);
            return;
        };

        self.current_start = self.start.resolve(host);
        self.dirty.mark(Dirty::StampPositions);
    }

    fn clean_offset(&mut self, env: &Env) {
        self.dirty.clear(Dirty::Offset);

        let Some(host) = env.dims else {
            self.dirty.mark(Dirty::Offset);
            return;
        };

        self.current_offset = self.offset.resolve(host);
        self.dirty.mark(Dirty::StampPositions);
        self.changes.aspects.mark(Dirty::Offset);
    }

    fn clean_handle(&mut self) {
        self.dirty.clear(Dirty::Handle);

        // handles resolve against the artefact's own dimensions
        self.current_handle = self.handle.resolve(self.current_dimensions);
        self.dirty.mark(Dirty::StampHandlePositions);
        self.changes.aspects.mark(Dirty::Handle);
    }

    fn clean_rotation(&mut self, refs: &References) {
        self.dirty.clear(Dirty::Rotation);

        let old = self.current_rotation;
        let locked_to = |l: Lock| self.lock_to[0] == l || self.lock_to[1] == l;
        let mut roll = self.roll;

        if refs.path.is_some() && locked_to(Lock::Path) {
            if self.add_path_rotation {
                if let Some((_, Some(data))) = &refs.path {
                    roll += data.angle;
                }
            }
        } else if self.use_mimic_rotation && locked_to(Lock::Mimic) && refs.mimic.is_some() {
            if let Some(m) = refs.mimic {
                roll = m.rotation;
                if self.add_own_rotation_to_mimic {
                    roll += self.roll;
                }
            }
        } else if self.add_pivot_rotation && locked_to(Lock::Pivot) {
            if let Some(p) = refs.pivot {
                roll += p.rotation;
            }
        }

        self.current_rotation = roll;

        if old != roll {
            self.changes.position_changed = true;
            self.changes.aspects.mark(Dirty::Rotation);
        }
    }

    fn clean_stamp_positions(&mut self, env: &Env, refs: &References) {
        self.dirty.clear(Dirty::StampPositions);

        let old = self.current_stamp_position;
        let start = self.current_start;
        let offset = self.current_offset;
        let dragged = self.is_being_dragged;

        let mut stamp = [0.0; 2];
        let mut start_cache = self.current_start_cache.to_array();

        for i in 0..2 {
            let mut lock = if dragged { Lock::Mouse } else { self.lock_to[i] };

            // a lock whose reference is absent degrades to start
            lock = match lock {
                Lock::Pivot if refs.pivot.is_none() => Lock::Start,
                Lock::Mimic if refs.mimic.is_none() => Lock::Start,
                Lock::Path if refs.path.is_none() => Lock::Start,
                Lock::Mouse if env.mouse.is_none() => Lock::Start,
                other => other,
            };

            stamp[i] = match lock {
                Lock::Pivot => match &refs.pivot {
                    Some(p) => {
                        let mut coord = axis(p.stamp_position, i);
                        if !self.add_pivot_offset {
                            coord -= axis(p.offset, i);
                        }
                        coord + axis(offset, i)
                    }
                    None => axis(start, i) + axis(offset, i),
                },

                Lock::Path => match &refs.path {
                    Some((p, Some(data))) => {
                        let mut coord = if i == 0 { data.x } else { data.y };
                        if !self.add_path_offset {
                            coord -= axis(p.offset, i);
                        }
                        coord
                    }
                    // a degenerate path behaves like no path at all
                    _ => axis(start, i) + axis(offset, i),
                },

                Lock::Mimic => match &refs.mimic {
                    Some(m) if self.use_mimic_start || self.use_mimic_offset => {
                        let mut coord = axis(m.stamp_position, i);
                        if self.use_mimic_start && self.add_own_start_to_mimic {
                            coord += axis(start, i);
                        }
                        if self.use_mimic_offset && self.add_own_offset_to_mimic {
                            coord += axis(offset, i);
                        }
                        if !self.use_mimic_start {
                            coord = coord - axis(m.start, i) + axis(start, i);
                        }
                        if !self.use_mimic_offset {
                            coord = coord - axis(m.offset, i) + axis(offset, i);
                        }
                        coord
                    }
                    _ => axis(start, i) + axis(offset, i),
                },

                Lock::Mouse => match env.mouse {
                    Some(here) => {
                        let mut coord = axis(here, i);
                        if dragged {
                            start_cache[i] = coord;
                            coord += axis(self.current_drag_offset, i);
                        }
                        coord + axis(offset, i)
                    }
                    None => axis(start, i) + axis(offset, i),
                },

                Lock::Start => axis(start, i) + axis(offset, i),
            };
        }

        self.current_stamp_position = DVec2::from_array(stamp);
        if dragged {
            self.current_start_cache = DVec2::from_array(start_cache);
        }

        if old != self.current_stamp_position {
            self.changes.position_changed = true;
        }
    }

    fn clean_stamp_handle_positions(&mut self, refs: &References) {
        self.dirty.clear(Dirty::StampHandlePositions);

        let old = self.current_stamp_handle_position;
        let handle = self.current_handle;
        let mut stamp = [0.0; 2];

        for i in 0..2 {
            let mut coord = axis(handle, i);

            match self.lock_to[i] {
                Lock::Pivot => {
                    if self.add_pivot_handle {
                        if let Some(p) = refs.pivot {
                            coord += axis(p.handle, i);
                        }
                    }
                }
                Lock::Path => {
                    if self.add_path_handle {
                        if let Some((p, _)) = &refs.path {
                            coord += axis(p.handle, i);
                        }
                    }
                }
                Lock::Mimic => {
                    if self.use_mimic_handle {
                        if let Some(m) = refs.mimic {
                            coord = axis(m.handle, i);
                            if self.add_own_handle_to_mimic {
                                coord += axis(handle, i);
                            }
                        }
                    }
                }
                Lock::Start | Lock::Mouse => {}
            }

            stamp[i] = coord;
        }

        // path-defined artefacts hang their handle off the local box
        if let Some(shape) = &self.shape {
            stamp[0] += shape.geometry.local_box.x;
            stamp[1] += shape.geometry.local_box.y;
        }

        self.current_stamp_handle_position = DVec2::from_array(stamp);

        if old != self.current_stamp_handle_position {
            self.changes.position_changed = true;
        }
    }

    fn clean_path_shape(&mut self, refs: &References) {
        self.dirty.clear(Dirty::PathShape);

        let recomputed = {
            let scale = self.current_scale;
            let origin = self.current_start;
            let Some(shape) = self.shape.as_mut() else {
                return;
            };
            if shape.path_calculated_once {
                false
            } else {
                shape.geometry.recompute(
                    &shape.path_definition,
                    scale,
                    origin,
                    shape.use_as_path,
                    shape.precision,
                );
                shape.path_calculated_once = true;
                true
            }
        };

        if !recomputed {
            return;
        }

        // geometry changed: path followers must re-query
        self.changes.position_changed = true;

        let dims = match &self.shape {
            Some(shape) => shape.geometry.local_box.size(),
            None => return,
        };

        if dims != self.current_dimensions {
            self.current_dimensions = dims;
            self.changes.aspects.mark(Dirty::Dimensions);
            // re-derive the handle against the emergent dimensions,
            // inline: marking earlier flags would break the pass order
            self.clean_handle();
        }
        self.clean_stamp_handle_positions(refs);
    }
}
