//! Venn and pseudo-Venn diagrams for 2 to 6 sets.
//!
//! Petal sizes (every exact intersection/exclusion combination of the input
//! sets) are computed from the data, laid out against fixed coordinate
//! tables, and drawn onto an SVG surface. Two to five sets are drawn as
//! overlapping ellipses, six sets as triangles; a separate six-set
//! pseudo-Venn layout arranges six ellipses radially and annotates the
//! combinations it cannot display.

pub mod colors;
pub mod constants;
pub mod diagram;
pub mod petals;
pub mod surface;

pub use diagram::{draw_pseudovenn6, draw_venn, pseudovenn, venn, VennOptions};
pub use surface::{LegendLoc, Surface};
