use super::{PointMatrixProvider, PointMatrixProviderError};
use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, Float64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::arrow_writer::ArrowWriter;
use std::convert::TryFrom;
use std::sync::Arc;

pub(crate) fn build_array(rows: &[[f64; 3]]) -> FixedSizeListArray {
    let values = Float64Array::from_iter_values(rows.iter().flatten().copied());
    list_of(Arc::new(values), DataType::Float64, 3, false)
}

pub(crate) fn build_f32_array(rows: &[[f32; 3]]) -> FixedSizeListArray {
    let values = Float32Array::from_iter_values(rows.iter().flatten().copied());
    list_of(Arc::new(values), DataType::Float32, 3, false)
}

pub(crate) fn list_of(
    values: ArrayRef,
    value_type: DataType,
    width: usize,
    child_nullable: bool,
) -> FixedSizeListArray {
    FixedSizeListArray::new(
        Arc::new(Field::new("item", value_type, child_nullable)),
        i32::try_from(width).expect("width fits in i32"),
        values,
        None,
    )
}

pub(crate) fn point_field(value_type: DataType, width: usize, child_nullable: bool) -> Field {
    Field::new(
        "points",
        DataType::FixedSizeList(
            Arc::new(Field::new("item", value_type, child_nullable)),
            i32::try_from(width).expect("width fits in i32"),
        ),
        true,
    )
}

pub(crate) fn write_parquet(array: FixedSizeListArray) -> Bytes {
    let field = point_field(array.value_type(), 3, false);
    write_batches(field, vec![Arc::new(array) as ArrayRef])
}

/// Writes each array as its own record batch under a single `field`.
pub(crate) fn write_batches(field: Field, arrays: Vec<ArrayRef>) -> Bytes {
    let schema = Arc::new(Schema::new(vec![field]));
    let mut buffer = Vec::new();
    {
        let mut writer =
            ArrowWriter::try_new(&mut buffer, schema.clone(), None).expect("writer");
        for array in arrays {
            let batch = RecordBatch::try_new(schema.clone(), vec![array]).expect("batch");
            writer.write(&batch).expect("write");
        }
        writer.close().expect("close");
    }
    Bytes::from(buffer)
}

pub(crate) fn load(bytes: Bytes) -> Result<PointMatrixProvider, PointMatrixProviderError> {
    PointMatrixProvider::try_from_parquet_reader("demo", bytes, "points")
}
