//! The container: an arena of artefacts, the reference graph between
//! them, and the per-frame resolution pass.
//!
//! Artefacts are owned by the canvas and addressed by handle; reference
//! links between them are non-owning ids with back-reference lists on
//! the referent, so removing an artefact can never dangle another.

use std::collections::HashMap;

use glam::{DVec2, dvec2};

use crate::artefact::{Artefact, ArtefactId, Changes, Dirty, PathPosition, Reference};
use crate::errors::QuirlError;
use crate::log::warn;
use crate::resolve::{Env, References, ReferentState};

/// A 2D container that positions artefacts.
#[derive(Debug, Default)]
pub struct Canvas {
    slots: Vec<Option<Artefact>>,
    names: HashMap<String, ArtefactId>,
    dims: Option<DVec2>,
    mouse: Option<DVec2>,
}

impl Canvas {
    /// A canvas with known dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Canvas {
            dims: Some(dvec2(width, height)),
            ..Canvas::default()
        }
    }

    /// A canvas whose dimensions are not yet known. Percentage-based
    /// resolution defers (flags stay dirty) until dimensions arrive.
    pub fn detached() -> Self {
        Canvas::default()
    }

    pub fn dimensions(&self) -> Option<DVec2> {
        self.dims
    }

    /// Resize the container. Every artefact re-resolves its
    /// container-relative values on the next pass.
    pub fn set_dimensions(&mut self, width: f64, height: f64) {
        self.dims = Some(dvec2(width, height));
        for artefact in self.slots.iter_mut().flatten() {
            artefact.dirty.mark(Dirty::Dimensions);
            artefact.dirty.mark(Dirty::Start);
            artefact.dirty.mark(Dirty::Offset);
        }
    }

    /// Update the pointer position consumed by `mouse` locks.
    pub fn set_mouse(&mut self, position: Option<DVec2>) {
        self.mouse = position;
    }

    // ---- arena management ----------------------------------------------

    /// Take ownership of an artefact, returning its handle.
    pub fn add(&mut self, artefact: Artefact) -> ArtefactId {
        let id = ArtefactId(self.slots.len());
        self.names.insert(artefact.name.clone(), id);
        self.slots.push(Some(artefact));
        id
    }

    /// Remove an artefact, unlinking it from referents and dependents.
    /// Dependents that referenced it degrade to `start` locks.
    pub fn remove(&mut self, id: ArtefactId) {
        for kind in [Reference::Pivot, Reference::Mimic, Reference::Path] {
            self.unlink(id, kind);
        }

        let Some(Some(artefact)) = self.slots.get_mut(id.0).map(Option::take) else {
            return;
        };

        self.names.remove(&artefact.name);

        for dependent in artefact
            .pivoted
            .iter()
            .chain(&artefact.mimicked)
            .chain(&artefact.pathed)
            .copied()
            .collect::<Vec<_>>()
        {
            if let Some(Some(dep)) = self.slots.get_mut(dependent.0) {
                if dep.pivot == Some(id) {
                    dep.pivot = None;
                }
                if dep.mimic == Some(id) {
                    dep.mimic = None;
                }
                if dep.path == Some(id) {
                    dep.path = None;
                }
                dep.dirty.mark(Dirty::StampPositions);
                dep.dirty.mark(Dirty::StampHandlePositions);
            }
        }
    }

    pub fn artefact(&self, id: ArtefactId) -> Option<&Artefact> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn artefact_mut(&mut self, id: ArtefactId) -> Option<&mut Artefact> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Look an artefact up by name.
    pub fn id_of(&self, name: &str) -> Option<ArtefactId> {
        self.names.get(name).copied()
    }

    /// Number of live artefacts.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- the reference graph -------------------------------------------

    /// Link `dependent` to `referent`, replacing any prior link of the
    /// same kind. The referent's back-reference list gains the
    /// dependent.
    pub fn link(
        &mut self,
        dependent: ArtefactId,
        referent: ArtefactId,
        kind: Reference,
    ) -> Result<(), QuirlError> {
        if dependent == referent {
            let name = self
                .artefact(dependent)
                .map(|a| a.name.clone())
                .unwrap_or_default();
            return Err(QuirlError::SelfReference { name });
        }
        if self.artefact(referent).is_none() {
            return Err(QuirlError::UnknownArtefact {
                name: format!("#{}", referent.0),
            });
        }

        // replace any previous link of this kind
        self.unlink_quiet(dependent, kind);

        let Some(dep) = self.artefact_mut(dependent) else {
            return Err(QuirlError::UnknownArtefact {
                name: format!("#{}", dependent.0),
            });
        };

        match kind {
            Reference::Pivot => dep.pivot = Some(referent),
            Reference::Mimic => {
                dep.mimic = Some(referent);
                // mimicked aspects need re-resolving against the new source
                if dep.use_mimic_dimensions {
                    dep.dirty.mark(Dirty::Dimensions);
                }
                if dep.use_mimic_scale {
                    dep.dirty.mark(Dirty::Scale);
                }
                if dep.use_mimic_start {
                    dep.dirty.mark(Dirty::Start);
                }
                if dep.use_mimic_handle {
                    dep.dirty.mark(Dirty::Handle);
                }
                if dep.use_mimic_offset {
                    dep.dirty.mark(Dirty::Offset);
                }
                if dep.use_mimic_rotation {
                    dep.dirty.mark(Dirty::Rotation);
                }
            }
            Reference::Path => dep.path = Some(referent),
        }
        dep.dirty.mark(Dirty::StampPositions);
        dep.dirty.mark(Dirty::StampHandlePositions);

        if let Some(refr) = self.artefact_mut(referent) {
            let list = match kind {
                Reference::Pivot => &mut refr.pivoted,
                Reference::Mimic => &mut refr.mimicked,
                Reference::Path => &mut refr.pathed,
            };
            if !list.contains(&dependent) {
                list.push(dependent);
            }
        }

        Ok(())
    }

    /// Convenience: link by artefact names.
    pub fn link_names(
        &mut self,
        dependent: &str,
        referent: &str,
        kind: Reference,
    ) -> Result<(), QuirlError> {
        let dep = self.id_of(dependent).ok_or_else(|| QuirlError::UnknownArtefact {
            name: dependent.to_string(),
        })?;
        let refr = self.id_of(referent).ok_or_else(|| QuirlError::UnknownArtefact {
            name: referent.to_string(),
        })?;
        self.link(dep, refr, kind)
    }

    /// Drop `dependent`'s link of the given kind, degrading any lock
    /// entries of that kind back to `start`.
    pub fn unlink(&mut self, dependent: ArtefactId, kind: Reference) {
        self.unlink_quiet(dependent, kind);

        let Some(dep) = self.artefact_mut(dependent) else {
            return;
        };
        let lock = match kind {
            Reference::Pivot => crate::types::Lock::Pivot,
            Reference::Mimic => crate::types::Lock::Mimic,
            Reference::Path => crate::types::Lock::Path,
        };
        for entry in dep.lock_to.iter_mut() {
            if *entry == lock {
                *entry = crate::types::Lock::Start;
            }
        }
        dep.dirty.mark(Dirty::StampPositions);
        dep.dirty.mark(Dirty::StampHandlePositions);
    }

    /// Remove the link and back-reference without touching locks.
    fn unlink_quiet(&mut self, dependent: ArtefactId, kind: Reference) {
        let old = match (self.artefact_mut(dependent), kind) {
            (Some(dep), Reference::Pivot) => dep.pivot.take(),
            (Some(dep), Reference::Mimic) => dep.mimic.take(),
            (Some(dep), Reference::Path) => dep.path.take(),
            (None, _) => None,
        };
        if let Some(old) = old {
            if let Some(refr) = self.artefact_mut(old) {
                let list = match kind {
                    Reference::Pivot => &mut refr.pivoted,
                    Reference::Mimic => &mut refr.mimicked,
                    Reference::Path => &mut refr.pathed,
                };
                list.retain(|&d| d != dependent);
            }
        }
    }

    // ---- resolution ----------------------------------------------------

    /// Run one resolution pass: every artefact's dirty attributes are
    /// recomputed, referents before dependents, and changes propagate
    /// to dependents' dirty flags for this same pass.
    pub fn resolve(&mut self) {
        let (order, cyclic) = self.resolution_order();
        let env = Env {
            dims: self.dims,
            mouse: self.mouse,
        };

        for id in order {
            let refs = if cyclic[id.0] {
                warn!(artefact = id.0, "reference cycle: degrading locks to start");
                References::default()
            } else {
                self.snapshot(id)
            };

            let Some(Some(artefact)) = self.slots.get_mut(id.0) else {
                continue;
            };
            artefact.prepare_stamp(&env, &refs);
            let changes = artefact.take_changes();
            self.propagate(id, &changes);
        }
    }

    /// Dependency-ordered ids (referents first), plus a per-slot flag
    /// for artefacts whose reference edge closes a cycle.
    fn resolution_order(&self) -> (Vec<ArtefactId>, Vec<bool>) {
        const UNSEEN: u8 = 0;
        const OPEN: u8 = 1;
        const DONE: u8 = 2;

        let n = self.slots.len();
        let mut state = vec![UNSEEN; n];
        let mut cyclic = vec![false; n];
        let mut order = Vec::with_capacity(n);

        fn visit(
            canvas: &Canvas,
            i: usize,
            state: &mut [u8],
            cyclic: &mut [bool],
            order: &mut Vec<ArtefactId>,
        ) {
            state[i] = OPEN;
            if let Some(Some(artefact)) = canvas.slots.get(i) {
                for referent in [artefact.pivot, artefact.mimic, artefact.path]
                    .into_iter()
                    .flatten()
                {
                    let j = referent.0;
                    match canvas.slots.get(j) {
                        Some(Some(_)) => {}
                        _ => continue,
                    }
                    if state[j] == UNSEEN {
                        visit(canvas, j, state, cyclic, order);
                    } else if state[j] == OPEN {
                        // back edge: this artefact closes a cycle
                        cyclic[i] = true;
                    }
                }
            }
            state[i] = DONE;
            order.push(ArtefactId(i));
        }

        for i in 0..n {
            if self.slots[i].is_some() && state[i] == UNSEEN {
                visit(self, i, &mut state, &mut cyclic, &mut order);
            }
        }

        (order, cyclic)
    }

    /// Copy the resolved values a dependent reads from its referents.
    fn snapshot(&self, id: ArtefactId) -> References {
        let Some(artefact) = self.artefact(id) else {
            return References::default();
        };

        let state_of = |rid: Option<ArtefactId>| -> Option<ReferentState> {
            rid.and_then(|r| self.artefact(r)).map(ReferentState::of)
        };

        let path = artefact.path.and_then(|r| self.artefact(r)).map(|p| {
            let constant = p
                .shape
                .as_ref()
                .is_some_and(|s| s.constant_path_speed);
            (
                ReferentState::of(p),
                p.path_position_data(artefact.path_position, constant),
            )
        });

        References {
            pivot: state_of(artefact.pivot),
            mimic: state_of(artefact.mimic),
            path,
        }
    }

    /// Push a resolved artefact's changes into its dependents' dirty
    /// flags, selectively: a dependent only tracking some aspects is
    /// not dirtied by the others.
    fn propagate(&mut self, id: ArtefactId, changes: &Changes) {
        if !changes.position_changed {
            return;
        }

        let (pivoted, mimicked, pathed) = match self.artefact(id) {
            Some(a) => (a.pivoted.clone(), a.mimicked.clone(), a.pathed.clone()),
            None => return,
        };

        for d in pivoted {
            if let Some(Some(dep)) = self.slots.get_mut(d.0) {
                dep.dirty.mark(Dirty::Start);
                if dep.add_pivot_handle {
                    dep.dirty.mark(Dirty::Handle);
                }
                if dep.add_pivot_offset {
                    dep.dirty.mark(Dirty::Offset);
                }
                if dep.add_pivot_rotation {
                    dep.dirty.mark(Dirty::Rotation);
                }
            }
        }

        let aspects = changes.aspects;
        for d in mimicked {
            if let Some(Some(dep)) = self.slots.get_mut(d.0) {
                if dep.use_mimic_start {
                    dep.dirty.mark(Dirty::Start);
                }
                if aspects.is_set(Dirty::Handle) && dep.use_mimic_handle {
                    dep.dirty.mark(Dirty::Handle);
                }
                if aspects.is_set(Dirty::Offset) && dep.use_mimic_offset {
                    dep.dirty.mark(Dirty::Offset);
                }
                if aspects.is_set(Dirty::Rotation) && dep.use_mimic_rotation {
                    dep.dirty.mark(Dirty::Rotation);
                }
                if aspects.is_set(Dirty::Scale) && dep.use_mimic_scale {
                    dep.dirty.mark(Dirty::Scale);
                }
                if aspects.is_set(Dirty::Dimensions) && dep.use_mimic_dimensions {
                    dep.dirty.mark(Dirty::Dimensions);
                }
                // a mimic target moving always re-places the dependent
                dep.dirty.mark(Dirty::StampPositions);
            }
        }

        for d in pathed {
            if let Some(Some(dep)) = self.slots.get_mut(d.0) {
                dep.dirty.mark(Dirty::Start);
                if dep.add_path_handle {
                    dep.dirty.mark(Dirty::Handle);
                }
                if dep.add_path_offset {
                    dep.dirty.mark(Dirty::Offset);
                }
                if dep.add_path_rotation {
                    dep.dirty.mark(Dirty::Rotation);
                }
            }
        }
    }

    // ---- public queries ------------------------------------------------

    /// Resolve a distance fraction along an artefact's path into the
    /// container frame.
    pub fn path_position(
        &self,
        id: ArtefactId,
        t: f64,
        constant_speed: bool,
    ) -> Result<PathPosition, QuirlError> {
        let artefact = self.artefact(id).ok_or_else(|| QuirlError::UnknownArtefact {
            name: format!("#{}", id.0),
        })?;
        if !artefact.is_path_usable() {
            return Err(QuirlError::NotAPath {
                name: artefact.name.clone(),
            });
        }
        artefact
            .path_position_data(t, constant_speed)
            .ok_or_else(|| QuirlError::DegeneratePath {
                name: artefact.name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_to_handles() {
        let mut canvas = Canvas::new(600.0, 600.0);
        let id = canvas.add(Artefact::new("wheel"));
        assert_eq!(canvas.id_of("wheel"), Some(id));
        assert_eq!(canvas.artefact(id).unwrap().name(), "wheel");
        assert!(canvas.id_of("missing").is_none());
    }

    #[test]
    fn linking_is_exclusive_per_kind() {
        let mut canvas = Canvas::new(600.0, 600.0);
        let a = canvas.add(Artefact::new("a"));
        let b = canvas.add(Artefact::new("b"));
        let c = canvas.add(Artefact::new("c"));

        canvas.link(a, b, Reference::Pivot).unwrap();
        assert_eq!(canvas.artefact(b).unwrap().pivoted, vec![a]);

        // relinking removes the old back-reference
        canvas.link(a, c, Reference::Pivot).unwrap();
        assert!(canvas.artefact(b).unwrap().pivoted.is_empty());
        assert_eq!(canvas.artefact(c).unwrap().pivoted, vec![a]);
    }

    #[test]
    fn self_links_are_rejected() {
        let mut canvas = Canvas::new(600.0, 600.0);
        let a = canvas.add(Artefact::new("a"));
        assert!(matches!(
            canvas.link(a, a, Reference::Mimic),
            Err(QuirlError::SelfReference { .. })
        ));
    }

    #[test]
    fn unlink_degrades_locks_to_start() {
        let mut canvas = Canvas::new(600.0, 600.0);
        let a = canvas.add(Artefact::new("a"));
        let b = canvas.add(Artefact::new("b"));
        canvas.link(a, b, Reference::Pivot).unwrap();
        canvas
            .artefact_mut(a)
            .unwrap()
            .set_lock_to(crate::types::Lock::Pivot, crate::types::Lock::Pivot);

        canvas.unlink(a, Reference::Pivot);
        let a = canvas.artefact(a).unwrap();
        assert_eq!(
            a.lock_to(),
            [crate::types::Lock::Start, crate::types::Lock::Start]
        );
        assert!(canvas.artefact(b).unwrap().pivoted.is_empty());
    }

    #[test]
    fn removal_cannot_dangle_dependents() {
        let mut canvas = Canvas::new(600.0, 600.0);
        let a = canvas.add(Artefact::new("a"));
        let b = canvas.add(Artefact::new("b"));
        canvas.link(a, b, Reference::Pivot).unwrap();

        canvas.remove(b);
        assert!(canvas.artefact(b).is_none());
        assert!(canvas.artefact(a).unwrap().pivot.is_none());

        // resolving afterwards is safe; the lock degrades
        canvas.resolve();
    }

    #[test]
    fn referents_resolve_before_dependents() {
        let mut canvas = Canvas::new(600.0, 600.0);
        // insertion order is deliberately dependent-first
        let dep = canvas.add(Artefact::new("dep"));
        let target = canvas.add(Artefact::new("target"));
        canvas.link(dep, target, Reference::Pivot).unwrap();
        canvas
            .artefact_mut(dep)
            .unwrap()
            .set_lock_to(crate::types::Lock::Pivot, crate::types::Lock::Pivot);
        canvas
            .artefact_mut(target)
            .unwrap()
            .set_start((300.0, 200.0));

        canvas.resolve();
        assert_eq!(
            canvas.artefact(dep).unwrap().current_stamp_position(),
            dvec2(300.0, 200.0)
        );
    }

    #[test]
    fn cycles_degrade_instead_of_hanging() {
        let mut canvas = Canvas::new(600.0, 600.0);
        let a = canvas.add(Artefact::new("a"));
        let b = canvas.add(Artefact::new("b"));
        canvas.link(a, b, Reference::Pivot).unwrap();
        canvas.link(b, a, Reference::Pivot).unwrap();
        canvas
            .artefact_mut(a)
            .unwrap()
            .set_lock_to(crate::types::Lock::Pivot, crate::types::Lock::Pivot);
        canvas
            .artefact_mut(b)
            .unwrap()
            .set_lock_to(crate::types::Lock::Pivot, crate::types::Lock::Pivot);
        canvas.artefact_mut(a).unwrap().set_start((10.0, 10.0));
        canvas.artefact_mut(b).unwrap().set_start((20.0, 20.0));

        canvas.resolve();

        // the cycle-closing artefact falls back to its own start; the
        // other resolves against it normally
        let pa = canvas.artefact(a).unwrap().current_stamp_position();
        let pb = canvas.artefact(b).unwrap().current_stamp_position();
        assert!(
            (pa == dvec2(10.0, 10.0) && pb == pa) || (pb == dvec2(20.0, 20.0) && pa == pb),
            "unexpected placements {pa:?} {pb:?}"
        );
    }
}
