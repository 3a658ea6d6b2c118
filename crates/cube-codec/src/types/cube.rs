//! The cube: a named, unit-bearing, coordinate-labelled n-dimensional array.

use doc_store::StoreConnector;

use crate::error::{CodecError, Result};
use crate::proxy::RemoteArrayHandle;
use crate::types::array::{ArrayData, DataType, NdArray};
use crate::types::attributes::{AttributeValue, Attributes};
use crate::types::cell_method::CellMethod;
use crate::types::coord_system::CoordSystem;
use crate::types::coords::{AxisSpec, Coord};
use crate::types::selector::Selector;
use crate::types::units::Unit;

/// Bulk payload of a cube: in memory, or a handle to a stored array.
#[derive(Debug, Clone, PartialEq)]
pub enum CubeData {
    Realised(NdArray),
    Deferred(RemoteArrayHandle),
}

impl CubeData {
    pub fn shape(&self) -> &[usize] {
        match self {
            CubeData::Realised(array) => array.shape(),
            CubeData::Deferred(handle) => handle.shape(),
        }
    }

    pub fn dtype(&self) -> DataType {
        match self {
            CubeData::Realised(array) => array.dtype(),
            CubeData::Deferred(handle) => handle.dtype(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, CubeData::Deferred(_))
    }

    pub fn as_realised(&self) -> Option<&NdArray> {
        match self {
            CubeData::Realised(array) => Some(array),
            CubeData::Deferred(_) => None,
        }
    }

    /// The full array, fetching it if deferred.
    pub async fn realise(&self, connector: &dyn StoreConnector) -> Result<NdArray> {
        match self {
            CubeData::Realised(array) => Ok(array.clone()),
            CubeData::Deferred(handle) => handle.resolve(connector).await,
        }
    }

    /// Apply a selector, fetching the array first if deferred.
    pub async fn index(&self, connector: &dyn StoreConnector, selector: &Selector) -> Result<NdArray> {
        match self {
            CubeData::Realised(array) => array.select(selector),
            CubeData::Deferred(handle) => handle.index(connector, selector).await,
        }
    }
}

impl From<NdArray> for CubeData {
    fn from(array: NdArray) -> Self {
        CubeData::Realised(array)
    }
}

impl From<ArrayData> for CubeData {
    fn from(array: ArrayData) -> Self {
        CubeData::Realised(NdArray::Plain(array))
    }
}

impl From<RemoteArrayHandle> for CubeData {
    fn from(handle: RemoteArrayHandle) -> Self {
        CubeData::Deferred(handle)
    }
}

/// A cube with its coordinates.
///
/// Coordinates are checked against the data shape as they are attached:
/// a dimension coordinate is one-dimensional and matches the extent of its
/// axis, an auxiliary coordinate matches the extents of its axes, and a
/// scalar coordinate holds a single point.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub var_name: Option<String>,
    pub units: Unit,
    pub attributes: Attributes,
    pub cell_methods: Vec<CellMethod>,
    data: CubeData,
    dim_coords: Vec<(Coord, usize)>,
    aux_coords: Vec<(Coord, AxisSpec)>,
}

impl Cube {
    pub fn new(data: impl Into<CubeData>, units: Unit) -> Self {
        Self {
            standard_name: None,
            long_name: None,
            var_name: None,
            units,
            attributes: Attributes::new(),
            cell_methods: Vec::new(),
            data: data.into(),
            dim_coords: Vec::new(),
            aux_coords: Vec::new(),
        }
    }

    pub fn with_standard_name(mut self, name: impl Into<String>) -> Self {
        self.standard_name = Some(name.into());
        self
    }

    pub fn with_long_name(mut self, name: impl Into<String>) -> Self {
        self.long_name = Some(name.into());
        self
    }

    pub fn with_var_name(mut self, name: impl Into<String>) -> Self {
        self.var_name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_cell_method(mut self, cell_method: CellMethod) -> Self {
        self.cell_methods.push(cell_method);
        self
    }

    /// First of standard, long and var name, else `unknown`.
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .or(self.var_name.as_deref())
            .unwrap_or("unknown")
    }

    pub fn data(&self) -> &CubeData {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn has_deferred_data(&self) -> bool {
        self.data.is_deferred()
    }

    /// Replace the payload with one of the same shape.
    pub fn set_data(&mut self, data: impl Into<CubeData>) -> Result<()> {
        let data = data.into();
        if data.shape() != self.shape() {
            return Err(CodecError::shape_mismatch("data", self.shape(), data.shape()));
        }
        self.data = data;
        Ok(())
    }

    /// Fetch deferred data so the cube holds its values in memory.
    pub async fn realise(&mut self, connector: &dyn StoreConnector) -> Result<()> {
        if let CubeData::Deferred(handle) = &self.data {
            self.data = CubeData::Realised(handle.resolve(connector).await?);
        }
        Ok(())
    }

    /// Attach a dimension coordinate to `axis`.
    pub fn add_dim_coord(&mut self, coord: Coord, axis: usize) -> Result<()> {
        let ndim = self.ndim();
        if axis >= ndim {
            return Err(CodecError::axis_mismatch(
                coord.name(),
                format!("axis {} is out of range for a {}-dimensional cube", axis, ndim),
            ));
        }
        if coord.points.ndim() != 1 {
            return Err(CodecError::axis_mismatch(
                coord.name(),
                "dimension coordinates must be one-dimensional",
            ));
        }
        let extent = self.shape()[axis];
        if coord.npoints() != extent {
            return Err(CodecError::shape_mismatch(
                coord.name(),
                &[extent],
                coord.shape(),
            ));
        }
        if let Some((existing, _)) = self.dim_coords.iter().find(|(_, a)| *a == axis) {
            return Err(CodecError::axis_mismatch(
                coord.name(),
                format!("axis {} already has dimension coordinate '{}'", axis, existing.name()),
            ));
        }
        let position = self.dim_coords.partition_point(|(_, a)| *a < axis);
        self.dim_coords.insert(position, (coord, axis));
        Ok(())
    }

    /// Attach an auxiliary or scalar coordinate.
    pub fn add_aux_coord(&mut self, coord: Coord, axes: AxisSpec) -> Result<()> {
        let shape = self.shape().to_vec();
        let dims = axes.axes();
        if dims.is_empty() {
            if coord.npoints() != 1 {
                return Err(CodecError::shape_mismatch(coord.name(), &[1], coord.shape()));
            }
        } else {
            for (i, &axis) in dims.iter().enumerate() {
                if axis >= shape.len() {
                    return Err(CodecError::axis_mismatch(
                        coord.name(),
                        format!(
                            "axis {} is out of range for a {}-dimensional cube",
                            axis,
                            shape.len()
                        ),
                    ));
                }
                if dims[..i].contains(&axis) {
                    return Err(CodecError::axis_mismatch(
                        coord.name(),
                        format!("axis {} is listed twice", axis),
                    ));
                }
            }
            let expected: Vec<usize> = dims.iter().map(|&a| shape[a]).collect();
            if coord.shape() != expected.as_slice() {
                return Err(CodecError::shape_mismatch(
                    coord.name(),
                    &expected,
                    coord.shape(),
                ));
            }
        }
        self.aux_coords.push((coord, axes));
        Ok(())
    }

    pub fn add_cell_method(&mut self, cell_method: CellMethod) {
        self.cell_methods.push(cell_method);
    }

    /// Dimension coordinates with their axes, in axis order.
    pub fn dim_coords(&self) -> &[(Coord, usize)] {
        &self.dim_coords
    }

    /// Auxiliary and scalar coordinates with their axes, in attachment order.
    pub fn aux_coords(&self) -> &[(Coord, AxisSpec)] {
        &self.aux_coords
    }

    pub fn scalar_coords(&self) -> impl Iterator<Item = &Coord> {
        self.aux_coords
            .iter()
            .filter(|(_, axes)| axes.is_scalar())
            .map(|(coord, _)| coord)
    }

    /// Look up a coordinate by name, dimension coordinates first.
    pub fn coord(&self, name: &str) -> Option<&Coord> {
        self.dim_coords
            .iter()
            .map(|(c, _)| c)
            .chain(self.aux_coords.iter().map(|(c, _)| c))
            .find(|c| c.name() == name)
    }

    /// Axes spanned by the named coordinate.
    pub fn coord_dims(&self, name: &str) -> Option<AxisSpec> {
        if let Some((_, axis)) = self.dim_coords.iter().find(|(c, _)| c.name() == name) {
            return Some(AxisSpec::Single(*axis));
        }
        self.aux_coords
            .iter()
            .find(|(c, _)| c.name() == name)
            .map(|(_, axes)| axes.clone())
    }

    /// The first coordinate system on a dimension coordinate, then on an
    /// auxiliary one.
    pub fn coord_system(&self) -> Option<&CoordSystem> {
        self.dim_coords
            .iter()
            .map(|(c, _)| c)
            .chain(self.aux_coords.iter().map(|(c, _)| c))
            .find_map(|c| c.coord_system.as_ref())
    }
}
