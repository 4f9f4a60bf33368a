//! Helpers for ingesting fixed-size list arrays into point buffers.
use arrow_array::{
    Array, ArrowPrimitiveType, FixedSizeListArray, PrimitiveArray,
    types::{Float32Type, Float64Type},
};
use arrow_schema::{DataType, Field};
use caplink_core::Point;

use crate::errors::PointMatrixProviderError;

/// Number of coordinates carried by every row.
pub(crate) const POINT_DIMENSION: usize = 3;

/// Floating-point width of a point column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CoordinateType {
    Float32,
    Float64,
}

impl CoordinateType {
    fn from_data_type(data_type: &DataType) -> Result<Self, PointMatrixProviderError> {
        match data_type {
            DataType::Float32 => Ok(Self::Float32),
            DataType::Float64 => Ok(Self::Float64),
            other => Err(PointMatrixProviderError::InvalidListValueType {
                actual: other.clone(),
            }),
        }
    }
}

fn check_width(width: i32) -> Result<(), PointMatrixProviderError> {
    match usize::try_from(width) {
        Ok(POINT_DIMENSION) => Ok(()),
        _ => Err(PointMatrixProviderError::InvalidDimension { actual: width }),
    }
}

/// Checks that `field` declares `FixedSizeList<Float32 | Float64, 3>`.
pub(crate) fn validate_point_field(
    field: &Field,
    column: &str,
) -> Result<CoordinateType, PointMatrixProviderError> {
    match field.data_type() {
        DataType::FixedSizeList(child, width) => {
            let kind = CoordinateType::from_data_type(child.data_type())?;
            check_width(*width)?;
            Ok(kind)
        }
        other => Err(PointMatrixProviderError::InvalidColumnType {
            column: column.to_owned(),
            actual: other.clone(),
        }),
    }
}

/// Appends every row of `array` to `out` as a [`Point`].
///
/// `start_row` offsets the row numbers reported in errors so batches can be
/// ingested one after another.
pub(crate) fn append_points(
    array: &FixedSizeListArray,
    start_row: usize,
    out: &mut Vec<Point>,
) -> Result<(), PointMatrixProviderError> {
    let kind = CoordinateType::from_data_type(&array.value_type())?;
    check_width(array.value_length())?;
    out.reserve(array.len());
    match kind {
        CoordinateType::Float32 => copy_rows::<Float32Type>(array, start_row, out),
        CoordinateType::Float64 => copy_rows::<Float64Type>(array, start_row, out),
    }
}

fn copy_rows<T>(
    array: &FixedSizeListArray,
    start_row: usize,
    out: &mut Vec<Point>,
) -> Result<(), PointMatrixProviderError>
where
    T: ArrowPrimitiveType,
    T::Native: Into<f64>,
{
    for row_index in 0..array.len() {
        let absolute_row = start_row + row_index;
        if array.is_null(row_index) {
            return Err(PointMatrixProviderError::NullRow { row: absolute_row });
        }
        let row = array.value(row_index);
        let floats = row
            .as_any()
            .downcast_ref::<PrimitiveArray<T>>()
            .ok_or_else(|| PointMatrixProviderError::InvalidListValueType {
                actual: row.data_type().clone(),
            })?;
        if floats.len() != POINT_DIMENSION {
            return Err(PointMatrixProviderError::InvalidRowLength {
                row: absolute_row,
                expected: POINT_DIMENSION,
                actual: floats.len(),
            });
        }
        if let Some(value_index) = (0..POINT_DIMENSION).find(|&idx| floats.is_null(idx)) {
            return Err(PointMatrixProviderError::NullValue {
                row: absolute_row,
                value_index,
            });
        }
        out.push(Point::new(
            floats.value(0).into(),
            floats.value(1).into(),
            floats.value(2).into(),
        ));
    }
    Ok(())
}
