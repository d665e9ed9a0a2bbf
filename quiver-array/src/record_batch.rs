// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! A two-dimensional batch of column-oriented data with a defined
//! [schema](quiver_schema::Schema).

use quiver_schema::{QuiverError, Result, SchemaRef};

use crate::{new_empty_array, Array};

/// A two-dimensional batch of column-oriented data with a defined
/// [schema](quiver_schema::Schema).
///
/// A `RecordBatch` is a two-dimensional dataset of a number of
/// contiguous arrays, each the same length.
/// A record batch has a schema which must match its arrays'
/// datatypes.
///
/// Record batches are the unit of transfer of the streaming
/// protocol, see `quiver_ipc::writer::StreamWriter`.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordBatch {
    schema: SchemaRef,
    columns: Vec<Array>,

    /// The number of rows in this RecordBatch
    ///
    /// This is stored separately from the columns to handle the case of no columns
    row_count: usize,
}

impl RecordBatch {
    /// Creates a `RecordBatch` from a schema and columns.
    ///
    /// Expects the following:
    ///  * the vec of columns to not be empty
    ///  * the schema and column data types to have equal lengths
    ///    and match
    ///  * each array in columns to have the same length
    ///  * a non-nullable field to hold no nulls
    ///
    /// If the conditions are not met, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use quiver_array::{Int32Array, RecordBatch};
    /// # use quiver_schema::{DataType, Field, Schema};
    /// let id_array = Int32Array::from(vec![1, 2, 3, 4, 5]);
    /// let schema = Schema::new(vec![
    ///     Field::new("id", DataType::Int32, false)
    /// ]);
    ///
    /// let batch = RecordBatch::try_new(
    ///     Arc::new(schema),
    ///     vec![id_array.into()]
    /// ).unwrap();
    /// assert_eq!(batch.num_rows(), 5);
    /// ```
    pub fn try_new(schema: SchemaRef, columns: Vec<Array>) -> Result<Self> {
        let options = RecordBatchOptions::new();
        Self::try_new_impl(schema, columns, &options)
    }

    /// Creates a `RecordBatch` from a schema and columns, with additional options,
    /// such as an explicit row count for a batch without columns.
    ///
    /// See [`RecordBatch::try_new`] for the expected conditions.
    pub fn try_new_with_options(
        schema: SchemaRef,
        columns: Vec<Array>,
        options: &RecordBatchOptions,
    ) -> Result<Self> {
        Self::try_new_impl(schema, columns, options)
    }

    /// Creates a new empty [`RecordBatch`].
    pub fn new_empty(schema: SchemaRef) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|field| new_empty_array(field.data_type()))
            .collect();

        RecordBatch {
            schema,
            columns,
            row_count: 0,
        }
    }

    /// Validate the schema and columns using [`RecordBatchOptions`]. Returns an error
    /// if any validation check fails, otherwise returns the created [`Self`]
    fn try_new_impl(
        schema: SchemaRef,
        columns: Vec<Array>,
        options: &RecordBatchOptions,
    ) -> Result<Self> {
        // check that number of fields in schema match column length
        if schema.fields().len() != columns.len() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "number of columns({}) must match number of fields({}) in schema",
                columns.len(),
                schema.fields().len(),
            )));
        }

        let row_count = options
            .row_count
            .or_else(|| columns.first().map(|col| col.len()))
            .ok_or_else(|| {
                QuiverError::InvalidArgumentError(
                    "must either specify a row count or at least one column".to_string(),
                )
            })?;

        for (c, f) in columns.iter().zip(schema.fields()) {
            if !f.is_nullable() && c.null_count() > 0 {
                return Err(QuiverError::InvalidArgumentError(format!(
                    "Column '{}' is declared as non-nullable but contains null values",
                    f.name()
                )));
            }
        }

        // check that all columns have the same row count
        if columns.iter().any(|c| c.len() != row_count) {
            let err = match options.row_count {
                Some(_) => "all columns in a record batch must have the specified row count",
                None => "all columns in a record batch must have the same length",
            };
            return Err(QuiverError::InvalidArgumentError(err.to_string()));
        }

        // check that all columns match the schema
        let not_match = columns
            .iter()
            .zip(schema.fields().iter())
            .map(|(col, field)| (col.data_type(), field.data_type()))
            .enumerate()
            .find(|(_, (col_type, field_type))| col_type != field_type);

        if let Some((i, (col_type, field_type))) = not_match {
            return Err(QuiverError::InvalidArgumentError(format!(
                "column types must match schema types, expected {field_type:?} but found {col_type:?} at column index {i}"
            )));
        }

        Ok(RecordBatch {
            schema,
            columns,
            row_count,
        })
    }

    /// Returns the [`Schema`](quiver_schema::Schema) of the record batch.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Returns a reference to the [`Schema`](quiver_schema::Schema) of the record batch.
    pub fn schema_ref(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns the number of columns in the record batch.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows in each column.
    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    /// Get a reference to a column's array by index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside of `0..num_columns`.
    pub fn column(&self, index: usize) -> &Array {
        &self.columns[index]
    }

    /// Get a reference to a column's array by name, matched case-insensitively.
    pub fn column_by_name(&self, name: &str) -> Option<&Array> {
        self.schema
            .index_of(name)
            .ok()
            .map(|index| &self.columns[index])
    }

    /// Get a reference to all columns in the record batch.
    pub fn columns(&self) -> &[Array] {
        &self.columns[..]
    }

    /// Return a new RecordBatch where each column is sliced
    /// according to `offset` and `length`
    ///
    /// # Panics
    ///
    /// Panics if `offset` with `length` is greater than column length.
    pub fn slice(&self, offset: usize, length: usize) -> RecordBatch {
        assert!((offset + length) <= self.num_rows());

        let columns = self
            .columns()
            .iter()
            .map(|column| column.slice(offset, length))
            .collect();

        Self {
            schema: self.schema.clone(),
            columns,
            row_count: length,
        }
    }
}

/// Options that control the behaviour used when creating a [`RecordBatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct RecordBatchOptions {
    /// Optional row count, useful for specifying a row count for a RecordBatch with no columns
    pub row_count: Option<usize>,
}

impl RecordBatchOptions {
    /// Creates a new `RecordBatchOptions`
    pub fn new() -> Self {
        Self { row_count: None }
    }

    /// Sets the row_count of RecordBatchOptions and returns self
    pub fn with_row_count(mut self, row_count: Option<usize>) -> Self {
        self.row_count = row_count;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Int32Array, Int64Array, StringArray};
    use quiver_schema::{DataType, Field, Schema};

    fn check_batch(record_batch: RecordBatch, num_rows: usize) {
        assert_eq!(num_rows, record_batch.num_rows());
        assert_eq!(2, record_batch.num_columns());
        assert_eq!(&DataType::Int32, record_batch.schema().field(0).data_type());
        assert_eq!(&DataType::Utf8, record_batch.schema().field(1).data_type());
        assert_eq!(num_rows, record_batch.column(0).len());
        assert_eq!(num_rows, record_batch.column(1).len());
    }

    fn sample(len: i32) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Utf8, false),
        ]);
        let a = Int32Array::from((0..len).collect::<Vec<_>>());
        let b = StringArray::from((0..len).map(|i| i.to_string()).collect::<Vec<_>>());
        RecordBatch::try_new(Arc::new(schema), vec![a.into(), b.into()]).unwrap()
    }

    #[test]
    fn create_record_batch() {
        check_batch(sample(5), 5)
    }

    #[test]
    fn create_record_batch_slice() {
        let record_batch = sample(8);
        let expected_schema = record_batch.schema();

        let record_batch_slice = record_batch.slice(2, 5);
        assert_eq!(record_batch_slice.schema(), expected_schema);
        assert_eq!(record_batch_slice.column(0).offset(), 2);
        check_batch(record_batch_slice, 5);

        let record_batch_slice = record_batch.slice(2, 0);
        check_batch(record_batch_slice, 0);
    }

    #[test]
    #[should_panic(expected = "assertion failed: (offset + length) <= self.num_rows()")]
    fn create_record_batch_slice_out_of_range() {
        sample(8).slice(2, 10);
    }

    #[test]
    fn create_record_batch_no_columns() {
        let schema = Arc::new(Schema::empty());

        let err = RecordBatch::try_new(schema.clone(), vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: must either specify a row count or at least one column"
        );

        let options = RecordBatchOptions::new().with_row_count(Some(10));
        let ok = RecordBatch::try_new_with_options(schema, vec![], &options).unwrap();
        assert_eq!(ok.num_rows(), 10);
        assert_eq!(ok.num_columns(), 0);

        let sliced = ok.slice(3, 4);
        assert_eq!(sliced.num_rows(), 4);
    }

    #[test]
    fn create_record_batch_schema_mismatch() {
        let schema = Schema::new(vec![Field::new("a", DataType::Int32, false)]);

        let a = Int64Array::from(vec![1, 2, 3, 4, 5]);

        let err = RecordBatch::try_new(Arc::new(schema), vec![a.into()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: column types must match schema types, expected Int32 but found Int64 at column index 0"
        );
    }

    #[test]
    fn create_record_batch_column_count_mismatch() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Int32, false),
        ]);
        let a = Int32Array::from(vec![1]);
        let err = RecordBatch::try_new(Arc::new(schema), vec![a.into()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: number of columns(1) must match number of fields(2) in schema"
        );
    }

    #[test]
    fn create_record_batch_record_mismatch() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Int32, false),
        ]);

        let a = Int32Array::from(vec![1, 2, 3, 4, 5]);
        let b = Int32Array::from(vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let err = RecordBatch::try_new(Arc::new(schema.clone()), vec![a.into(), b.into()])
            .unwrap_err();
        assert!(err.to_string().ends_with("must have the same length"));

        let a = Int32Array::from(vec![1, 2, 3, 4, 5]);
        let b = Int32Array::from(vec![1, 2, 3, 4, 5]);
        let options = RecordBatchOptions::new().with_row_count(Some(4));
        let err = RecordBatch::try_new_with_options(
            Arc::new(schema),
            vec![a.into(), b.into()],
            &options,
        )
        .unwrap_err();
        assert!(err.to_string().ends_with("must have the specified row count"));
    }

    #[test]
    fn create_record_batch_nulls_in_non_nullable_column() {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]));
        let maybe_nulls = Int32Array::from(vec![Some(1), None]);

        let err = RecordBatch::try_new(schema, vec![maybe_nulls.clone().into()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: Column 'a' is declared as non-nullable but contains null values"
        );

        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, true)]));
        assert!(RecordBatch::try_new(schema, vec![maybe_nulls.into()]).is_ok());
    }

    #[test]
    fn record_batch_column_by_name() {
        let batch = sample(3);
        assert_eq!(batch.column_by_name("B").unwrap().data_type(), &DataType::Utf8);
        assert!(batch.column_by_name("c").is_none());
    }

    #[test]
    fn record_batch_new_empty() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Binary, true),
        ]));
        let batch = RecordBatch::new_empty(schema.clone());
        assert_eq!(batch.schema(), schema);
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.column(1).data_type(), &DataType::Binary);
    }

    #[test]
    fn record_batch_equality() {
        assert_eq!(sample(4), sample(4));
        assert_ne!(sample(4), sample(5));
        assert_eq!(sample(5).slice(0, 4), sample(4));
    }
}
