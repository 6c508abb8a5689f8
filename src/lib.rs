//! quirl - a lazily-evaluated 2D positioning and path-geometry engine.
//!
//! quirl positions and shapes artefacts inside a 2D container. Declared
//! attributes (absolute pixels, percentage strings, keywords, or
//! references to other artefacts) resolve into concrete pixel values
//! during an ordered, dirty-flag-driven clean pass; declarative path
//! descriptions become parametric units with arc-length tables that
//! answer position-at-distance queries.
//!
//! Drawing is someone else's job: collaborators consume the resolved
//! stamp positions, rotations, bounding boxes and renderable path
//! strings this engine produces.
//!
//! ```
//! use quirl::{Artefact, Canvas, Reference};
//!
//! let mut canvas = Canvas::new(600.0, 400.0);
//!
//! let track = canvas.add(Artefact::with_path("track", "m0,0 q150,-150 300,0"));
//! canvas.artefact_mut(track).unwrap().set_use_as_path(true);
//! canvas.artefact_mut(track).unwrap().set_start(("center", "center"));
//!
//! let bead = canvas.add(Artefact::new("bead"));
//! canvas.link_names("bead", "track", Reference::Path).unwrap();
//! canvas.artefact_mut(bead).unwrap().set_lock_to("path", "path");
//! canvas.artefact_mut(bead).unwrap().set_path_position(0.5);
//!
//! canvas.resolve();
//! let placed = canvas.artefact(bead).unwrap().current_stamp_position();
//! assert!(placed.x > 0.0);
//! ```

use pest_derive::Parser;

/// Tokenizer for path-description strings (see `pathdata.pest`).
#[derive(Parser)]
#[grammar = "pathdata.pest"]
pub struct PathdataParser;

pub mod artefact;
pub mod canvas;
pub mod errors;
pub mod factories;
pub mod geometry;
pub mod log;
pub mod parse;
mod resolve;
pub mod types;

pub use artefact::{Artefact, ArtefactId, PathPosition, Reference};
pub use canvas::Canvas;
pub use errors::QuirlError;
pub use geometry::{PathGeometry, PathUnit};
pub use types::{BoundingBox, CoordValue, Coordinate, Lock};

// the public API speaks DVec2; consumers need the same glam
pub use glam;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn the_doc_example_works() {
        let mut canvas = Canvas::new(600.0, 400.0);

        let track = canvas.add(Artefact::with_path("track", "m0,0 q150,-150 300,0"));
        canvas.artefact_mut(track).unwrap().set_use_as_path(true);
        canvas
            .artefact_mut(track)
            .unwrap()
            .set_start(("center", "center"));

        let bead = canvas.add(Artefact::new("bead"));
        canvas.link_names("bead", "track", Reference::Path).unwrap();
        canvas
            .artefact_mut(bead)
            .unwrap()
            .set_lock_to("path", "path");
        canvas.artefact_mut(bead).unwrap().set_path_position(0.5);

        canvas.resolve();

        // halfway along the symmetric arc the bead sits at the apex:
        // horizontally centered, level with the track's stamp point
        let apex = canvas.artefact(bead).unwrap().current_stamp_position();
        let track_at = canvas.artefact(track).unwrap().current_stamp_position();
        assert!((apex.x - (track_at.x + 150.0)).abs() < 1.0);
        assert!((apex.y - track_at.y).abs() < 1.0);

        // the curve's endpoints hang below its apex
        canvas.artefact_mut(bead).unwrap().set_path_position(0.0);
        canvas.resolve();
        let start = canvas.artefact(bead).unwrap().current_stamp_position();
        assert!(start.y > apex.y);
    }

    #[test]
    fn percentage_round_trip_through_the_canvas() {
        let mut canvas = Canvas::new(200.0, 100.0);
        let a = canvas.add(Artefact::new("a"));
        canvas.artefact_mut(a).unwrap().set_start(("50%", "-10%"));
        canvas.resolve();
        assert_eq!(
            canvas.artefact(a).unwrap().current_start(),
            dvec2(100.0, -10.0)
        );
    }
}
