//! Core data model.

pub mod array;
pub mod attributes;
pub mod cell_method;
pub mod coord_system;
pub mod coords;
pub mod cube;
pub mod selector;
pub mod units;

pub use array::{ArrayData, DataType, Element, FillValue, MaskedArray, NdArray};
pub use attributes::{AttributeValue, Attributes, StashCode};
pub use cell_method::CellMethod;
pub use coord_system::{CoordSystem, Ellipsoid, MercatorProjection, RotatedPole, KNOWN_COORD_SYSTEMS};
pub use coords::{AxisSpec, Coord};
pub use cube::{Cube, CubeData};
pub use selector::{AxisSelector, Selector};
pub use units::{Calendar, Unit};
