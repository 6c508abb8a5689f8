//! Artefact state: declared attributes, resolved attributes, dirty flags.
//!
//! Setters never compute anything - they record the declared value and
//! mark the governing dirty flag. All resolution happens in the ordered
//! clean pass (see `resolve`), run by the owning canvas before a render
//! pass consumes the results.

use glam::{DVec2, dvec2};

use crate::geometry::PathGeometry;
use crate::types::{Coordinate, CoordValue, Lock, rotate_deg};

/// Handle to an artefact inside a [`Canvas`](crate::Canvas) arena.
///
/// Handles are non-owning: a handle to a removed artefact simply stops
/// resolving, and locks that referenced it degrade to `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtefactId(pub(crate) usize);

/// The three reference kinds an artefact can hold on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Pivot,
    Mimic,
    Path,
}

/// A resolved point on a path, in the container frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPosition {
    pub x: f64,
    pub y: f64,
    /// Tangent angle in degrees, engine rotation convention.
    pub angle: f64,
}

/// One attribute group whose cached resolved value can go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub(crate) enum Dirty {
    Scale = 0,
    Dimensions,
    Lock,
    Start,
    Offset,
    Handle,
    Rotation,
    StampPositions,
    StampHandlePositions,
    PathShape,
    Collision,
}

impl Dirty {
    #[inline]
    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Bitset over [`Dirty`] flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DirtySet(u16);

impl DirtySet {
    #[inline]
    pub fn mark(&mut self, d: Dirty) {
        self.0 |= d.bit();
    }

    #[inline]
    pub fn clear(&mut self, d: Dirty) {
        self.0 &= !d.bit();
    }

    #[inline]
    pub fn is_set(self, d: Dirty) -> bool {
        self.0 & d.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// What changed while cleaning one artefact; drives selective
/// propagation to its dependents.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Changes {
    /// Any resolved placement value changed.
    pub position_changed: bool,
    /// Which aspects were recomputed, for mimic dependents that only
    /// track some of them.
    pub aspects: DirtySet,
}

/// Shape-specific state for path-defined artefacts.
#[derive(Debug, Clone, Default)]
pub(crate) struct ShapeState {
    pub path_definition: String,
    pub species: String,
    pub use_as_path: bool,
    pub precision: f64,
    pub constant_path_speed: bool,
    /// Gate on geometry recomputation: cleared by scale, species and
    /// shape-defining attribute changes, and only then.
    pub path_calculated_once: bool,
    pub geometry: PathGeometry,
}

/// Any positionable, transformable object managed by the engine.
#[derive(Debug, Clone)]
pub struct Artefact {
    pub(crate) name: String,

    // declared attributes
    pub(crate) start: Coordinate,
    pub(crate) handle: Coordinate,
    pub(crate) offset: Coordinate,
    pub(crate) dimensions: Coordinate,
    pub(crate) scale: f64,
    pub(crate) roll: f64,
    pub(crate) flip_reverse: bool,
    pub(crate) flip_upend: bool,
    pub(crate) lock_to: [Lock; 2],
    pub(crate) sensor_spacing: f64,

    // reference slots and their tuning flags
    pub(crate) pivot: Option<ArtefactId>,
    pub(crate) mimic: Option<ArtefactId>,
    pub(crate) path: Option<ArtefactId>,
    pub(crate) path_position: f64,

    pub(crate) add_pivot_handle: bool,
    pub(crate) add_pivot_offset: bool,
    pub(crate) add_pivot_rotation: bool,

    pub(crate) add_path_handle: bool,
    pub(crate) add_path_offset: bool,
    pub(crate) add_path_rotation: bool,

    pub(crate) use_mimic_dimensions: bool,
    pub(crate) use_mimic_scale: bool,
    pub(crate) use_mimic_start: bool,
    pub(crate) use_mimic_handle: bool,
    pub(crate) use_mimic_offset: bool,
    pub(crate) use_mimic_rotation: bool,

    pub(crate) add_own_dimensions_to_mimic: bool,
    pub(crate) add_own_scale_to_mimic: bool,
    pub(crate) add_own_start_to_mimic: bool,
    pub(crate) add_own_handle_to_mimic: bool,
    pub(crate) add_own_offset_to_mimic: bool,
    pub(crate) add_own_rotation_to_mimic: bool,

    // back-reference lists: dependents using this artefact
    pub(crate) pivoted: Vec<ArtefactId>,
    pub(crate) mimicked: Vec<ArtefactId>,
    pub(crate) pathed: Vec<ArtefactId>,

    // resolved values
    pub(crate) current_scale: f64,
    pub(crate) current_dimensions: DVec2,
    pub(crate) current_start: DVec2,
    pub(crate) current_handle: DVec2,
    pub(crate) current_offset: DVec2,
    pub(crate) current_rotation: f64,
    pub(crate) current_stamp_position: DVec2,
    pub(crate) current_stamp_handle_position: DVec2,

    // collision outputs
    pub(crate) current_collision_radius: f64,
    pub(crate) current_sensors: Vec<DVec2>,

    // drag state
    pub(crate) is_being_dragged: bool,
    pub(crate) current_drag_offset: DVec2,
    pub(crate) current_drag_cache: DVec2,
    pub(crate) current_start_cache: DVec2,

    pub(crate) shape: Option<ShapeState>,

    pub(crate) dirty: DirtySet,
    pub(crate) changes: Changes,
}

impl Artefact {
    /// A block-like artefact with declared dimensions.
    pub fn new(name: impl Into<String>) -> Self {
        let mut dirty = DirtySet::default();
        for d in [
            Dirty::Scale,
            Dirty::Dimensions,
            Dirty::Lock,
            Dirty::Start,
            Dirty::Offset,
            Dirty::Handle,
            Dirty::Rotation,
            Dirty::Collision,
        ] {
            dirty.mark(d);
        }

        Artefact {
            name: name.into(),
            start: Coordinate::ZERO,
            handle: Coordinate::ZERO,
            offset: Coordinate::ZERO,
            dimensions: Coordinate::ZERO,
            scale: 1.0,
            roll: 0.0,
            flip_reverse: false,
            flip_upend: false,
            lock_to: [Lock::Start, Lock::Start],
            sensor_spacing: 50.0,
            pivot: None,
            mimic: None,
            path: None,
            path_position: 0.0,
            add_pivot_handle: false,
            add_pivot_offset: true,
            add_pivot_rotation: false,
            add_path_handle: false,
            add_path_offset: true,
            add_path_rotation: false,
            use_mimic_dimensions: false,
            use_mimic_scale: false,
            use_mimic_start: false,
            use_mimic_handle: false,
            use_mimic_offset: false,
            use_mimic_rotation: false,
            add_own_dimensions_to_mimic: false,
            add_own_scale_to_mimic: false,
            add_own_start_to_mimic: false,
            add_own_handle_to_mimic: false,
            add_own_offset_to_mimic: false,
            add_own_rotation_to_mimic: false,
            pivoted: Vec::new(),
            mimicked: Vec::new(),
            pathed: Vec::new(),
            current_scale: 1.0,
            current_dimensions: DVec2::ZERO,
            current_start: DVec2::ZERO,
            current_handle: DVec2::ZERO,
            current_offset: DVec2::ZERO,
            current_rotation: 0.0,
            current_stamp_position: DVec2::ZERO,
            current_stamp_handle_position: DVec2::ZERO,
            current_collision_radius: 0.0,
            current_sensors: Vec::new(),
            is_being_dragged: false,
            current_drag_offset: DVec2::ZERO,
            current_drag_cache: DVec2::ZERO,
            current_start_cache: DVec2::ZERO,
            shape: None,
            dirty,
            changes: Changes::default(),
        }
    }

    /// A path-defined artefact. Its dimensions are emergent from the
    /// path's bounding box and cannot be declared.
    pub fn with_path(name: impl Into<String>, path_definition: impl Into<String>) -> Self {
        let mut artefact = Artefact::new(name);
        artefact.shape = Some(ShapeState {
            path_definition: path_definition.into(),
            precision: 10.0,
            ..ShapeState::default()
        });
        artefact.dirty.mark(Dirty::PathShape);
        artefact
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ---- declared attribute setters ------------------------------------

    pub fn set_start(&mut self, start: impl Into<Coordinate>) {
        self.start = start.into();
        self.dirty.mark(Dirty::Start);
    }

    pub fn set_start_x(&mut self, x: impl Into<CoordValue>) {
        self.start.x = x.into();
        self.dirty.mark(Dirty::Start);
    }

    pub fn set_start_y(&mut self, y: impl Into<CoordValue>) {
        self.start.y = y.into();
        self.dirty.mark(Dirty::Start);
    }

    /// Add a delta to the declared start (same-kind axis addition).
    pub fn delta_start(&mut self, delta: impl Into<Coordinate>) {
        self.start.delta_add(delta.into());
        self.dirty.mark(Dirty::Start);
    }

    pub fn set_handle(&mut self, handle: impl Into<Coordinate>) {
        self.handle = handle.into();
        self.dirty.mark(Dirty::Handle);
    }

    pub fn set_handle_x(&mut self, x: impl Into<CoordValue>) {
        self.handle.x = x.into();
        self.dirty.mark(Dirty::Handle);
    }

    pub fn set_handle_y(&mut self, y: impl Into<CoordValue>) {
        self.handle.y = y.into();
        self.dirty.mark(Dirty::Handle);
    }

    pub fn delta_handle(&mut self, delta: impl Into<Coordinate>) {
        self.handle.delta_add(delta.into());
        self.dirty.mark(Dirty::Handle);
    }

    pub fn set_offset(&mut self, offset: impl Into<Coordinate>) {
        self.offset = offset.into();
        self.dirty.mark(Dirty::Offset);
    }

    pub fn delta_offset(&mut self, delta: impl Into<Coordinate>) {
        self.offset.delta_add(delta.into());
        self.dirty.mark(Dirty::Offset);
    }

    /// Declared dimensions. Ignored on path-defined artefacts, whose
    /// dimensions are emergent.
    pub fn set_dimensions(&mut self, dimensions: impl Into<Coordinate>) {
        if self.shape.is_some() {
            return;
        }
        self.dimensions = dimensions.into();
        self.dirty.mark(Dirty::Dimensions);
    }

    pub fn delta_dimensions(&mut self, delta: impl Into<Coordinate>) {
        if self.shape.is_some() {
            return;
        }
        self.dimensions.delta_add(delta.into());
        self.dirty.mark(Dirty::Dimensions);
    }

    /// Uniform scale factor; negative values clamp to zero.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.max(0.0);
        self.dirty.mark(Dirty::Scale);
    }

    /// Rotation in degrees.
    pub fn set_roll(&mut self, roll: f64) {
        self.roll = roll;
        self.dirty.mark(Dirty::Rotation);
    }

    pub fn delta_roll(&mut self, delta: f64) {
        self.roll += delta;
        self.dirty.mark(Dirty::Rotation);
    }

    pub fn set_flip_reverse(&mut self, flip: bool) {
        self.flip_reverse = flip;
        self.dirty.mark(Dirty::Collision);
    }

    pub fn set_flip_upend(&mut self, flip: bool) {
        self.flip_upend = flip;
        self.dirty.mark(Dirty::Collision);
    }

    pub fn set_lock_to(&mut self, x: impl Into<Lock>, y: impl Into<Lock>) {
        self.lock_to = [x.into(), y.into()];
        self.dirty.mark(Dirty::Lock);
    }

    pub fn set_lock_x_to(&mut self, lock: impl Into<Lock>) {
        self.lock_to[0] = lock.into();
        self.dirty.mark(Dirty::Lock);
    }

    pub fn set_lock_y_to(&mut self, lock: impl Into<Lock>) {
        self.lock_to[1] = lock.into();
        self.dirty.mark(Dirty::Lock);
    }

    pub fn set_sensor_spacing(&mut self, spacing: f64) {
        self.sensor_spacing = spacing;
        self.dirty.mark(Dirty::Collision);
    }

    /// Distance fraction along the referenced path, 0 to 1.
    pub fn set_path_position(&mut self, position: f64) {
        self.path_position = position;
        self.dirty.mark(Dirty::StampPositions);
        self.dirty.mark(Dirty::StampHandlePositions);
        if self.add_path_rotation {
            self.dirty.mark(Dirty::Rotation);
        }
    }

    pub fn delta_path_position(&mut self, delta: f64) {
        self.set_path_position(self.path_position + delta);
    }

    // ---- reference tuning flags ----------------------------------------

    pub fn set_add_pivot_handle(&mut self, value: bool) {
        self.add_pivot_handle = value;
        self.dirty.mark(Dirty::Handle);
    }

    pub fn set_add_pivot_offset(&mut self, value: bool) {
        self.add_pivot_offset = value;
        self.dirty.mark(Dirty::Offset);
    }

    pub fn set_add_pivot_rotation(&mut self, value: bool) {
        self.add_pivot_rotation = value;
        self.dirty.mark(Dirty::Rotation);
    }

    pub fn set_add_path_handle(&mut self, value: bool) {
        self.add_path_handle = value;
        self.dirty.mark(Dirty::Handle);
    }

    pub fn set_add_path_offset(&mut self, value: bool) {
        self.add_path_offset = value;
        self.dirty.mark(Dirty::Offset);
    }

    pub fn set_add_path_rotation(&mut self, value: bool) {
        self.add_path_rotation = value;
        self.dirty.mark(Dirty::Rotation);
    }

    pub fn set_use_mimic_dimensions(&mut self, value: bool) {
        self.use_mimic_dimensions = value;
        self.dirty.mark(Dirty::Dimensions);
    }

    pub fn set_use_mimic_scale(&mut self, value: bool) {
        self.use_mimic_scale = value;
        self.dirty.mark(Dirty::Scale);
    }

    pub fn set_use_mimic_start(&mut self, value: bool) {
        self.use_mimic_start = value;
        self.dirty.mark(Dirty::Start);
    }

    pub fn set_use_mimic_handle(&mut self, value: bool) {
        self.use_mimic_handle = value;
        self.dirty.mark(Dirty::Handle);
    }

    pub fn set_use_mimic_offset(&mut self, value: bool) {
        self.use_mimic_offset = value;
        self.dirty.mark(Dirty::Offset);
    }

    pub fn set_use_mimic_rotation(&mut self, value: bool) {
        self.use_mimic_rotation = value;
        self.dirty.mark(Dirty::Rotation);
    }

    pub fn set_add_own_dimensions_to_mimic(&mut self, value: bool) {
        self.add_own_dimensions_to_mimic = value;
        self.dirty.mark(Dirty::Dimensions);
    }

    pub fn set_add_own_scale_to_mimic(&mut self, value: bool) {
        self.add_own_scale_to_mimic = value;
        self.dirty.mark(Dirty::Scale);
    }

    pub fn set_add_own_start_to_mimic(&mut self, value: bool) {
        self.add_own_start_to_mimic = value;
        self.dirty.mark(Dirty::Start);
    }

    pub fn set_add_own_handle_to_mimic(&mut self, value: bool) {
        self.add_own_handle_to_mimic = value;
        self.dirty.mark(Dirty::Handle);
    }

    pub fn set_add_own_offset_to_mimic(&mut self, value: bool) {
        self.add_own_offset_to_mimic = value;
        self.dirty.mark(Dirty::Offset);
    }

    pub fn set_add_own_rotation_to_mimic(&mut self, value: bool) {
        self.add_own_rotation_to_mimic = value;
        self.dirty.mark(Dirty::Rotation);
    }

    // ---- shape attribute setters ---------------------------------------

    /// Replace the path description. Forces geometry recomputation.
    pub fn set_path_definition(&mut self, d: impl Into<String>) {
        if let Some(shape) = self.shape.as_mut() {
            shape.path_definition = d.into();
            shape.path_calculated_once = false;
            self.dirty.mark(Dirty::PathShape);
        }
    }

    /// Shape-kind tag. Changing it forces geometry recomputation.
    pub fn set_species(&mut self, species: impl Into<String>) {
        if let Some(shape) = self.shape.as_mut() {
            shape.species = species.into();
            shape.path_calculated_once = false;
            self.dirty.mark(Dirty::PathShape);
        }
    }

    /// Whether arc-length tables are built, enabling position queries.
    pub fn set_use_as_path(&mut self, value: bool) {
        if let Some(shape) = self.shape.as_mut() {
            shape.use_as_path = value;
            shape.path_calculated_once = false;
            self.dirty.mark(Dirty::PathShape);
        }
    }

    /// Curve length tolerance in pixels; smaller is more accurate.
    pub fn set_precision(&mut self, precision: f64) {
        if let Some(shape) = self.shape.as_mut() {
            shape.precision = precision;
            shape.path_calculated_once = false;
            self.dirty.mark(Dirty::PathShape);
        }
    }

    /// Whether followers of this path travel at constant speed.
    pub fn set_constant_path_speed(&mut self, value: bool) {
        if let Some(shape) = self.shape.as_mut() {
            shape.constant_path_speed = value;
            self.dirty.mark(Dirty::PathShape);
        }
    }

    // ---- resolved value accessors --------------------------------------

    pub fn current_scale(&self) -> f64 {
        self.current_scale
    }

    pub fn current_dimensions(&self) -> DVec2 {
        self.current_dimensions
    }

    pub fn current_start(&self) -> DVec2 {
        self.current_start
    }

    pub fn current_handle(&self) -> DVec2 {
        self.current_handle
    }

    pub fn current_offset(&self) -> DVec2 {
        self.current_offset
    }

    pub fn current_rotation(&self) -> f64 {
        self.current_rotation
    }

    /// The resolved placement point: where start/reference plus offset
    /// put the artefact's rotation-reflection point.
    pub fn current_stamp_position(&self) -> DVec2 {
        self.current_stamp_position
    }

    pub fn current_stamp_handle_position(&self) -> DVec2 {
        self.current_stamp_handle_position
    }

    pub fn lock_to(&self) -> [Lock; 2] {
        self.lock_to
    }

    pub fn flip_reverse(&self) -> bool {
        self.flip_reverse
    }

    pub fn flip_upend(&self) -> bool {
        self.flip_upend
    }

    /// True once no dirty flag remains set.
    pub fn is_clean(&self) -> bool {
        self.dirty.is_empty()
    }

    pub fn collision_radius(&self) -> f64 {
        self.current_collision_radius
    }

    /// Perimeter sensor points, container frame, whole pixels.
    pub fn sensors(&self) -> &[DVec2] {
        &self.current_sensors
    }

    // ---- shape accessors -----------------------------------------------

    pub fn is_path_defined(&self) -> bool {
        self.shape.is_some()
    }

    /// Shape-kind tag, when this artefact is path-defined.
    pub fn species(&self) -> Option<&str> {
        self.shape.as_ref().map(|s| s.species.as_str())
    }

    /// Current distance fraction along the referenced path.
    pub fn path_position(&self) -> f64 {
        self.path_position
    }

    pub fn is_path_usable(&self) -> bool {
        self.shape.as_ref().is_some_and(|s| s.use_as_path)
    }

    /// The computed geometry, when this artefact is path-defined.
    pub fn geometry(&self) -> Option<&PathGeometry> {
        self.shape.as_ref().map(|s| &s.geometry)
    }

    /// The origin-relative re-serialized path string.
    pub fn local_path(&self) -> Option<&str> {
        self.shape.as_ref().map(|s| s.geometry.local_path.as_str())
    }

    /// The path string a drawing collaborator renders: the local path
    /// prefixed with a move that applies the resolved handle.
    pub fn renderable_path(&self) -> Option<String> {
        let shape = self.shape.as_ref()?;
        let handle = self.current_stamp_handle_position;
        Some(format!(
            "m{},{}{}",
            -handle.x, -handle.y, shape.geometry.local_path
        ))
    }

    /// Total estimated path length, when usable as a path.
    pub fn path_length(&self) -> Option<f64> {
        let shape = self.shape.as_ref()?;
        shape.use_as_path.then_some(shape.geometry.length)
    }

    /// Local bounding box and the stamp position it hangs off.
    ///
    /// The box is shifted by the resolved handle and padded out to a
    /// minimum display dimension so hairline shapes stay visible.
    pub fn bounding_box(&self) -> Option<(crate::types::BoundingBox, DVec2)> {
        const MIN_DIMENSION: f64 = 20.0;
        let shape = self.shape.as_ref()?;
        let local = shape.geometry.local_box;
        let handle = self.current_stamp_handle_position;
        Some((
            crate::types::BoundingBox {
                x: (local.x - handle.x).floor(),
                y: (local.y - handle.y).floor(),
                w: local.w.max(MIN_DIMENSION).ceil(),
                h: local.h.max(MIN_DIMENSION).ceil(),
            },
            self.current_stamp_position,
        ))
    }

    /// Resolve a distance fraction along this artefact's path into the
    /// container frame: local point, minus handle, flipped, rotated by
    /// roll, placed at the stamp position.
    ///
    /// Returns `None` when the artefact is not usable as a path or the
    /// path has no measurable length.
    pub fn path_position_data(&self, pos: f64, constant_speed: bool) -> Option<PathPosition> {
        let shape = self.shape.as_ref()?;
        if !shape.use_as_path {
            return None;
        }
        let local = shape.geometry.local_position_at(pos, constant_speed)?;

        let mut v = local.point - self.current_stamp_handle_position;
        if self.flip_reverse {
            v.x = -v.x;
        }
        if self.flip_upend {
            v.y = -v.y;
        }
        v = rotate_deg(v, self.roll);
        v += self.current_stamp_position;

        let mut angle = local.angle;
        // one flip mirrors the tangent; two cancel
        if self.flip_reverse != self.flip_upend {
            angle = -angle;
        }
        angle += self.roll;

        Some(PathPosition {
            x: v.x,
            y: v.y,
            angle,
        })
    }

    // ---- drag support --------------------------------------------------

    /// Begin dragging from a pointer position. While dragged, both axis
    /// locks behave as `mouse` and the recorded offset keeps the grab
    /// point under the pointer.
    pub fn pickup(&mut self, at: DVec2) {
        self.is_being_dragged = true;
        self.current_drag_cache = self.current_drag_offset;
        self.current_drag_offset = self.current_start - at;
        self.dirty.mark(Dirty::StampPositions);
    }

    /// End dragging, folding the net movement into the declared start.
    pub fn drop_artefact(&mut self) {
        let landed = self.current_start_cache + self.current_drag_offset;
        self.start = Coordinate::new(landed.x, landed.y);
        self.dirty.mark(Dirty::Start);
        self.current_drag_offset = self.current_drag_cache;
        self.is_being_dragged = false;
    }

    pub fn is_being_dragged(&self) -> bool {
        self.is_being_dragged
    }

    // ---- internals shared with the canvas ------------------------------

    pub(crate) fn take_changes(&mut self) -> Changes {
        std::mem::take(&mut self.changes)
    }

    /// Sensor geometry: four corners of the scaled, handle-shifted box
    /// (flip-aware), rotated by roll about the stamp position, plus
    /// edge fills every `sensor_spacing` pixels.
    pub(crate) fn clean_collision(&mut self) {
        self.dirty.clear(Dirty::Collision);

        let stamp = self.current_stamp_position;
        let handle = self.current_stamp_handle_position;
        let scale = self.current_scale;
        let dims = self.current_dimensions * scale;

        // radius: the furthest corner of the unflipped box
        let tl = stamp - handle * scale;
        let br = tl + dims;
        let radius = [br, dvec2(tl.x, br.y), dvec2(br.x, tl.y), tl]
            .into_iter()
            .map(|corner| stamp.distance(corner))
            .fold(0.0, f64::max);
        self.current_collision_radius = radius.ceil();

        let hx = if self.flip_reverse {
            -handle.x * scale
        } else {
            handle.x * scale
        };
        let hy = if self.flip_upend {
            -handle.y * scale
        } else {
            handle.y * scale
        };
        let lx = -hx;
        let ty = -hy;
        let rx = if self.flip_reverse { lx - dims.x } else { lx + dims.x };
        let by = if self.flip_upend { ty - dims.y } else { ty + dims.y };

        let roll = self.roll;
        let place = |v: DVec2| -> DVec2 {
            let r = rotate_deg(v, roll);
            dvec2(r.x.round() + stamp.x, r.y.round() + stamp.y)
        };

        self.current_sensors.clear();
        self.current_sensors.push(place(dvec2(lx, ty)));
        self.current_sensors.push(place(dvec2(rx, ty)));
        self.current_sensors.push(place(dvec2(rx, by)));
        self.current_sensors.push(place(dvec2(lx, by)));

        let spacing = if self.sensor_spacing > 0.0 {
            self.sensor_spacing
        } else {
            50.0
        };

        let across = (dims.x / spacing) as usize;
        if across > 0 {
            let partial = dims.x / (across + 1) as f64;
            let mut x = lx;
            for _ in 0..across {
                x += if self.flip_reverse { -partial } else { partial };
                self.current_sensors.push(place(dvec2(x, ty)));
                self.current_sensors.push(place(dvec2(x, by)));
            }
        }

        let down = (dims.y / spacing) as usize;
        if down > 0 {
            let partial = dims.y / (down + 1) as f64;
            let mut y = ty;
            for _ in 0..down {
                y += if self.flip_upend { -partial } else { partial };
                self.current_sensors.push(place(dvec2(lx, y)));
                self.current_sensors.push(place(dvec2(rx, y)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_mark_the_governing_flag() {
        let mut a = Artefact::new("a");
        a.changes = Changes::default();
        a.dirty = DirtySet::default();

        a.set_start((10.0, 20.0));
        assert!(a.dirty.is_set(Dirty::Start));
        assert!(!a.dirty.is_set(Dirty::Handle));

        a.set_scale(2.0);
        assert!(a.dirty.is_set(Dirty::Scale));

        a.set_roll(45.0);
        assert!(a.dirty.is_set(Dirty::Rotation));
    }

    #[test]
    fn negative_scale_clamps_to_zero() {
        let mut a = Artefact::new("a");
        a.set_scale(-3.0);
        assert_eq!(a.scale, 0.0);
    }

    #[test]
    fn dimensions_are_not_settable_on_shapes() {
        let mut a = Artefact::with_path("s", "m0,0 l50,0");
        a.dirty = DirtySet::default();
        a.set_dimensions((40.0, 40.0));
        assert_eq!(a.dimensions, Coordinate::ZERO);
        assert!(!a.dirty.is_set(Dirty::Dimensions));
    }

    #[test]
    fn path_definition_changes_clear_the_gate() {
        let mut a = Artefact::with_path("s", "m0,0 l50,0");
        a.shape.as_mut().unwrap().path_calculated_once = true;
        a.set_path_definition("m0,0 l10,10");
        assert!(!a.shape.as_ref().unwrap().path_calculated_once);
        assert!(a.dirty.is_set(Dirty::PathShape));
    }

    #[test]
    fn sensor_corners_of_an_unrotated_box() {
        let mut a = Artefact::new("a");
        a.current_dimensions = dvec2(100.0, 60.0);
        a.current_stamp_position = dvec2(200.0, 200.0);
        a.clean_collision();
        assert_eq!(a.current_sensors[0], dvec2(200.0, 200.0));
        assert_eq!(a.current_sensors[1], dvec2(300.0, 200.0));
        assert_eq!(a.current_sensors[2], dvec2(300.0, 260.0));
        assert_eq!(a.current_sensors[3], dvec2(200.0, 260.0));
        // two fill pairs along the wide edge, one along the short edge
        assert_eq!(a.current_sensors.len(), 10);
        assert_eq!(a.current_collision_radius, 117.0);
    }
}
