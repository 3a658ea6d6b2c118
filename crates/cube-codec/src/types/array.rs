//! Typed n-dimensional arrays, plain and masked.

use ndarray::{ArrayD, IxDyn, Zip};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, Result};
use crate::types::selector::Selector;

/// Element type of an array, named as numpy names it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl DataType {
    pub const ALL: [DataType; 10] = [
        DataType::Int8,
        DataType::Int16,
        DataType::Int32,
        DataType::Int64,
        DataType::Uint8,
        DataType::Uint16,
        DataType::Uint32,
        DataType::Uint64,
        DataType::Float32,
        DataType::Float64,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Uint8 => "uint8",
            DataType::Uint16 => "uint16",
            DataType::Uint32 => "uint32",
            DataType::Uint64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    /// The fill value numpy assigns to masked arrays of this type.
    pub fn default_fill_value(&self) -> FillValue {
        if self.is_float() {
            FillValue::Float(1e20)
        } else {
            FillValue::Int(999999)
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        DataType::ALL
            .into_iter()
            .find(|dtype| dtype.as_str() == s.trim())
            .ok_or_else(|| format!("unsupported dtype '{}'", s))
    }
}

/// Fill value of a masked array.
///
/// The variant matters: integer-parseable fill values stay integers even when
/// the array itself holds floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillValue {
    Int(i128),
    Float(f64),
}

impl FillValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FillValue::Int(i) => i as f64,
            FillValue::Float(f) => f,
        }
    }
}

/// Floats always keep a decimal point or an exponent, so parsing the written
/// form reproduces the variant.
impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Int(i) => write!(f, "{}", i),
            FillValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl FromStr for FillValue {
    type Err = String;

    /// Integer first, then float.
    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if let Ok(i) = s.parse::<i128>() {
            return Ok(FillValue::Int(i));
        }
        s.parse::<f64>()
            .map(FillValue::Float)
            .map_err(|_| format!("'{}' is neither an integer nor a float", s))
    }
}

/// A primitive element type that can live in an [`ArrayData`].
pub trait Element: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    const DTYPE: DataType;

    /// Convert a JSON leaf, casting numbers the way `astype` would.
    fn from_json(value: &Value) -> Option<Self>;

    fn to_json(self) -> Value;

    fn from_fill(fill: FillValue) -> Self;

    fn wrap(array: ArrayD<Self>) -> ArrayData;
}

macro_rules! impl_int_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const DTYPE: DataType = DataType::$variant;

            fn from_json(value: &Value) -> Option<Self> {
                let Value::Number(n) = value else {
                    return None;
                };
                if let Some(i) = n.as_i64() {
                    Some(i as $t)
                } else if let Some(u) = n.as_u64() {
                    Some(u as $t)
                } else {
                    n.as_f64().filter(|f| f.is_finite()).map(|f| f as $t)
                }
            }

            fn to_json(self) -> Value {
                Value::from(self)
            }

            fn from_fill(fill: FillValue) -> Self {
                match fill {
                    FillValue::Int(i) => i as $t,
                    FillValue::Float(f) => f as $t,
                }
            }

            fn wrap(array: ArrayD<Self>) -> ArrayData {
                ArrayData::$variant(array)
            }
        }
    };
}

macro_rules! impl_float_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const DTYPE: DataType = DataType::$variant;

            /// `null` stands in for NaN, which JSON cannot express.
            fn from_json(value: &Value) -> Option<Self> {
                match value {
                    Value::Null => Some(<$t>::NAN),
                    Value::Number(n) => n.as_f64().map(|f| f as $t),
                    _ => None,
                }
            }

            fn to_json(self) -> Value {
                Number::from_f64(self as f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }

            fn from_fill(fill: FillValue) -> Self {
                match fill {
                    FillValue::Int(i) => i as $t,
                    FillValue::Float(f) => f as $t,
                }
            }

            fn wrap(array: ArrayD<Self>) -> ArrayData {
                ArrayData::$variant(array)
            }
        }
    };
}

impl_int_element!(i8, Int8);
impl_int_element!(i16, Int16);
impl_int_element!(i32, Int32);
impl_int_element!(i64, Int64);
impl_int_element!(u8, Uint8);
impl_int_element!(u16, Uint16);
impl_int_element!(u32, Uint32);
impl_int_element!(u64, Uint64);
impl_float_element!(f32, Float32);
impl_float_element!(f64, Float64);

/// An n-dimensional array of one of the supported element types.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Uint8(ArrayD<u8>),
    Uint16(ArrayD<u16>),
    Uint32(ArrayD<u32>),
    Uint64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

/// Run `$body` with `$a` bound to the inner array, whatever its type.
macro_rules! dispatch {
    ($data:expr, $a:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($a) => $body,
            ArrayData::Int16($a) => $body,
            ArrayData::Int32($a) => $body,
            ArrayData::Int64($a) => $body,
            ArrayData::Uint8($a) => $body,
            ArrayData::Uint16($a) => $body,
            ArrayData::Uint32($a) => $body,
            ArrayData::Uint64($a) => $body,
            ArrayData::Float32($a) => $body,
            ArrayData::Float64($a) => $body,
        }
    };
}

/// Like `dispatch!`, rewrapping the result in the same variant.
macro_rules! map_same {
    ($data:expr, $a:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($a) => ArrayData::Int8($body),
            ArrayData::Int16($a) => ArrayData::Int16($body),
            ArrayData::Int32($a) => ArrayData::Int32($body),
            ArrayData::Int64($a) => ArrayData::Int64($body),
            ArrayData::Uint8($a) => ArrayData::Uint8($body),
            ArrayData::Uint16($a) => ArrayData::Uint16($body),
            ArrayData::Uint32($a) => ArrayData::Uint32($body),
            ArrayData::Uint64($a) => ArrayData::Uint64($body),
            ArrayData::Float32($a) => ArrayData::Float32($body),
            ArrayData::Float64($a) => ArrayData::Float64($body),
        }
    };
}

macro_rules! cast_to {
    ($a:expr, $dtype:expr) => {
        match $dtype {
            DataType::Int8 => ArrayData::Int8($a.mapv(AsPrimitive::<i8>::as_)),
            DataType::Int16 => ArrayData::Int16($a.mapv(AsPrimitive::<i16>::as_)),
            DataType::Int32 => ArrayData::Int32($a.mapv(AsPrimitive::<i32>::as_)),
            DataType::Int64 => ArrayData::Int64($a.mapv(AsPrimitive::<i64>::as_)),
            DataType::Uint8 => ArrayData::Uint8($a.mapv(AsPrimitive::<u8>::as_)),
            DataType::Uint16 => ArrayData::Uint16($a.mapv(AsPrimitive::<u16>::as_)),
            DataType::Uint32 => ArrayData::Uint32($a.mapv(AsPrimitive::<u32>::as_)),
            DataType::Uint64 => ArrayData::Uint64($a.mapv(AsPrimitive::<u64>::as_)),
            DataType::Float32 => ArrayData::Float32($a.mapv(AsPrimitive::<f32>::as_)),
            DataType::Float64 => ArrayData::Float64($a.mapv(AsPrimitive::<f64>::as_)),
        }
    };
}

fn build<T: Element>(leaves: &[&Value], shape: &[usize], field: &str) -> Result<ArrayD<T>> {
    let values = leaves
        .iter()
        .enumerate()
        .map(|(i, leaf)| {
            T::from_json(leaf).ok_or_else(|| {
                CodecError::type_mismatch(format!("{}[{}]", field, i), T::DTYPE.as_str())
            })
        })
        .collect::<Result<Vec<T>>>()?;
    from_shape_vec(shape, values, field)
}

fn fill_masked<T: Element>(a: &ArrayD<T>, mask: &ArrayD<bool>, fill: FillValue) -> ArrayD<T> {
    let value = T::from_fill(fill);
    let mut out = a.clone();
    Zip::from(&mut out).and(mask).for_each(|v, &m| {
        if m {
            *v = value;
        }
    });
    out
}

fn from_shape_vec<T>(shape: &[usize], values: Vec<T>, field: &str) -> Result<ArrayD<T>> {
    let found = values.len();
    ArrayD::from_shape_vec(IxDyn(shape), values)
        .map_err(|_| CodecError::shape_mismatch(field, shape, &[found]))
}

impl ArrayData {
    /// Build an array of `dtype` from JSON leaves in row-major order.
    pub fn from_json_leaves(
        dtype: DataType,
        leaves: &[&Value],
        shape: &[usize],
        field: &str,
    ) -> Result<Self> {
        Ok(match dtype {
            DataType::Int8 => ArrayData::Int8(build(leaves, shape, field)?),
            DataType::Int16 => ArrayData::Int16(build(leaves, shape, field)?),
            DataType::Int32 => ArrayData::Int32(build(leaves, shape, field)?),
            DataType::Int64 => ArrayData::Int64(build(leaves, shape, field)?),
            DataType::Uint8 => ArrayData::Uint8(build(leaves, shape, field)?),
            DataType::Uint16 => ArrayData::Uint16(build(leaves, shape, field)?),
            DataType::Uint32 => ArrayData::Uint32(build(leaves, shape, field)?),
            DataType::Uint64 => ArrayData::Uint64(build(leaves, shape, field)?),
            DataType::Float32 => ArrayData::Float32(build(leaves, shape, field)?),
            DataType::Float64 => ArrayData::Float64(build(leaves, shape, field)?),
        })
    }

    /// Elements as JSON values in row-major order.
    pub fn to_json_leaves(&self) -> Vec<Value> {
        dispatch!(self, a => a.iter().map(|v| v.to_json()).collect())
    }

    pub fn dtype(&self) -> DataType {
        match self {
            ArrayData::Int8(_) => DataType::Int8,
            ArrayData::Int16(_) => DataType::Int16,
            ArrayData::Int32(_) => DataType::Int32,
            ArrayData::Int64(_) => DataType::Int64,
            ArrayData::Uint8(_) => DataType::Uint8,
            ArrayData::Uint16(_) => DataType::Uint16,
            ArrayData::Uint32(_) => DataType::Uint32,
            ArrayData::Uint64(_) => DataType::Uint64,
            ArrayData::Float32(_) => DataType::Float32,
            ArrayData::Float64(_) => DataType::Float64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch!(self, a => a.shape())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert every element to `dtype` with `as` semantics.
    pub fn cast(&self, dtype: DataType) -> ArrayData {
        if self.dtype() == dtype {
            return self.clone();
        }
        dispatch!(self, a => cast_to!(a, dtype))
    }

    /// Reinterpret the row-major elements under a new shape of equal size.
    pub fn reshape(&self, shape: &[usize]) -> Result<ArrayData> {
        Ok(map_same!(self, a => from_shape_vec(shape, a.iter().copied().collect(), "data")?))
    }

    pub fn select(&self, selector: &Selector) -> Result<ArrayData> {
        Ok(map_same!(self, a => selector.apply(a)?))
    }

    /// Values converted to f64.
    pub fn to_f64(&self) -> ArrayD<f64> {
        dispatch!(self, a => a.mapv(AsPrimitive::<f64>::as_))
    }

    fn fill_where(&self, mask: &ArrayD<bool>, fill: FillValue) -> ArrayData {
        map_same!(self, a => fill_masked(a, mask, fill))
    }
}

impl<T: Element> From<ArrayD<T>> for ArrayData {
    fn from(array: ArrayD<T>) -> Self {
        T::wrap(array)
    }
}

/// Values with a parallel validity mask (`true` marks an invalid element).
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    values: ArrayData,
    mask: ArrayD<bool>,
    fill_value: FillValue,
}

impl MaskedArray {
    /// Pair values with a mask of the same shape.
    pub fn new(values: ArrayData, mask: ArrayD<bool>, fill_value: FillValue) -> Result<Self> {
        if values.shape() != mask.shape() {
            return Err(CodecError::shape_mismatch(
                "mask",
                values.shape(),
                mask.shape(),
            ));
        }
        Ok(Self {
            values,
            mask,
            fill_value,
        })
    }

    /// Mask with the default fill value for the element type.
    pub fn with_default_fill(values: ArrayData, mask: ArrayD<bool>) -> Result<Self> {
        let fill = values.dtype().default_fill_value();
        Self::new(values, mask, fill)
    }

    pub fn values(&self) -> &ArrayData {
        &self.values
    }

    pub fn mask(&self) -> &ArrayD<bool> {
        &self.mask
    }

    pub fn fill_value(&self) -> FillValue {
        self.fill_value
    }

    pub fn count_masked(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }

    /// Values with every masked element replaced by the fill value.
    pub fn filled(&self) -> ArrayData {
        self.values.fill_where(&self.mask, self.fill_value)
    }
}

/// A plain or masked array.
#[derive(Debug, Clone, PartialEq)]
pub enum NdArray {
    Plain(ArrayData),
    Masked(MaskedArray),
}

impl NdArray {
    pub fn values(&self) -> &ArrayData {
        match self {
            NdArray::Plain(values) => values,
            NdArray::Masked(masked) => masked.values(),
        }
    }

    pub fn mask(&self) -> Option<&ArrayD<bool>> {
        match self {
            NdArray::Plain(_) => None,
            NdArray::Masked(masked) => Some(masked.mask()),
        }
    }

    pub fn is_masked(&self) -> bool {
        matches!(self, NdArray::Masked(_))
    }

    pub fn shape(&self) -> &[usize] {
        self.values().shape()
    }

    pub fn dtype(&self) -> DataType {
        self.values().dtype()
    }

    /// Cast the values; the mask and fill value are unchanged.
    pub fn cast(&self, dtype: DataType) -> NdArray {
        match self {
            NdArray::Plain(values) => NdArray::Plain(values.cast(dtype)),
            NdArray::Masked(masked) => NdArray::Masked(MaskedArray {
                values: masked.values.cast(dtype),
                mask: masked.mask.clone(),
                fill_value: masked.fill_value,
            }),
        }
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<NdArray> {
        Ok(match self {
            NdArray::Plain(values) => NdArray::Plain(values.reshape(shape)?),
            NdArray::Masked(masked) => NdArray::Masked(MaskedArray {
                values: masked.values.reshape(shape)?,
                mask: from_shape_vec(shape, masked.mask.iter().copied().collect(), "mask")?,
                fill_value: masked.fill_value,
            }),
        })
    }

    /// Apply a selector to the values and, for masked arrays, the mask.
    pub fn select(&self, selector: &Selector) -> Result<NdArray> {
        Ok(match self {
            NdArray::Plain(values) => NdArray::Plain(values.select(selector)?),
            NdArray::Masked(masked) => NdArray::Masked(MaskedArray {
                values: masked.values.select(selector)?,
                mask: selector.apply(&masked.mask)?,
                fill_value: masked.fill_value,
            }),
        })
    }
}

impl From<ArrayData> for NdArray {
    fn from(values: ArrayData) -> Self {
        NdArray::Plain(values)
    }
}

impl From<MaskedArray> for NdArray {
    fn from(masked: MaskedArray) -> Self {
        NdArray::Masked(masked)
    }
}

impl<T: Element> From<ArrayD<T>> for NdArray {
    fn from(array: ArrayD<T>) -> Self {
        NdArray::Plain(T::wrap(array))
    }
}
