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

use quiver_schema::{QuiverError, Result, Schema};

use crate::{new_empty_array, Column, RecordBatch};

/// A mutable collection of [`Column`]s sharing one [`Schema`].
///
/// Unlike [`RecordBatch`], a `Table` is not validated on construction or
/// mutation beyond the row count checks of [`Table::add_column`] and
/// [`Table::set_column`]. Call [`Table::validate`] to check the full
/// invariants.
///
/// ```
/// # use std::sync::Arc;
/// # use quiver_array::{Int32Array, RecordBatch, Table};
/// # use quiver_schema::{DataType, Field, Schema};
/// let schema = Schema::new(vec![Field::new("id", DataType::Int32, false)]);
/// let batches = vec![
///     RecordBatch::try_new(Arc::new(schema.clone()), vec![Int32Array::from(vec![1, 2]).into()]).unwrap(),
///     RecordBatch::try_new(Arc::new(schema.clone()), vec![Int32Array::from(vec![3]).into()]).unwrap(),
/// ];
/// let table = Table::from_record_batches(schema, &batches).unwrap();
/// assert_eq!(table.num_rows(), 3);
/// assert_eq!(table.column(0).data().num_chunks(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    schema: Schema,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Create a new [`Table`] without validating `columns` against `schema`.
    ///
    /// The row count is taken from the first column, or 0 without columns.
    pub fn new(schema: Schema, columns: Vec<Column>) -> Self {
        let num_rows = columns.first().map(|c| c.len()).unwrap_or_default();
        Self {
            schema,
            columns,
            num_rows,
        }
    }

    /// Create a new [`Table`] and [`validate`](Self::validate) it
    pub fn try_new(schema: Schema, columns: Vec<Column>) -> Result<Self> {
        let table = Self::new(schema, columns);
        table.validate()?;
        Ok(table)
    }

    /// Create a [`Table`] with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a [`Table`] from `batches`, column `i` chaining column `i`
    /// of every batch in order.
    ///
    /// The batches' own schemas are not compared to `schema`. With no
    /// batches every column holds a single empty chunk.
    ///
    /// # Errors
    ///
    /// Errors if a batch has fewer columns than `schema` has fields, or a
    /// batch column's type differs from its field's
    pub fn from_record_batches(schema: Schema, batches: &[RecordBatch]) -> Result<Self> {
        let columns = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if batches.is_empty() {
                    return Column::try_new(field.clone(), vec![new_empty_array(field.data_type())]);
                }
                let chunks = batches
                    .iter()
                    .enumerate()
                    .map(|(b, batch)| {
                        batch.columns().get(i).cloned().ok_or_else(|| {
                            QuiverError::InvalidArgumentError(format!(
                                "record batch {b} has {} columns, cannot read column {i}",
                                batch.num_columns()
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Column::try_new(field.clone(), chunks)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(schema, columns))
    }

    /// Returns the [`Schema`] of this table
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column at position `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_columns()`
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    /// Returns all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Inserts `column` at position `index`, adding its field to the schema
    /// at the same position.
    ///
    /// # Errors
    ///
    /// Errors, leaving the table unchanged, if `index > self.num_columns()`,
    /// the column length differs from the row count, or the schema already
    /// has a field of that name
    pub fn add_column(&mut self, index: usize, column: Column) -> Result<()> {
        if index > self.columns.len() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Invalid column index {index} for table with {} columns",
                self.columns.len()
            )));
        }
        self.check_length(&column, self.num_rows)?;

        self.schema.add_field(index, column.field().clone())?;
        self.columns.insert(index, column);
        Ok(())
    }

    /// Replaces the column at position `index` with `column`, returning the
    /// previous column.
    ///
    /// The schema field replaced is the one named like `column`, which is not
    /// necessarily the field at `index`.
    ///
    /// # Errors
    ///
    /// Errors, leaving the table unchanged, if `index` is out of range, the
    /// column length differs from the row count, or the schema has no field
    /// named like `column`
    pub fn set_column(&mut self, index: usize, column: Column) -> Result<Column> {
        if index >= self.columns.len() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Invalid column index {index} for table with {} columns",
                self.columns.len()
            )));
        }
        self.check_length(&column, self.num_rows)?;

        let field_index = self.schema.index_of(column.name())?;
        self.schema.set_field(field_index, column.field().clone())?;
        Ok(std::mem::replace(&mut self.columns[index], column))
    }

    /// Removes and returns the column at position `index`, removing the
    /// schema field at the same position. The row count is unchanged.
    ///
    /// # Errors
    ///
    /// Errors if `index` is out of range
    pub fn remove_column(&mut self, index: usize) -> Result<Column> {
        if index >= self.columns.len() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Invalid column index {index} for table with {} columns",
                self.columns.len()
            )));
        }
        self.schema.remove_field(index)?;
        Ok(self.columns.remove(index))
    }

    /// Checks that the schema has one field per column and every column has
    /// [`Self::num_rows`] rows
    pub fn validate(&self) -> Result<()> {
        if self.columns.len() != self.schema.len() {
            return Err(QuiverError::SchemaError(format!(
                "Table has {} columns but its schema has {} fields",
                self.columns.len(),
                self.schema.len()
            )));
        }
        if let Some((i, column)) = self
            .columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != self.num_rows)
        {
            return Err(QuiverError::SchemaError(format!(
                "Column {i} (\"{}\") has {} rows but the table has {}",
                column.name(),
                column.len(),
                self.num_rows
            )));
        }
        Ok(())
    }

    fn check_length(&self, column: &Column, num_rows: usize) -> Result<()> {
        if column.len() != num_rows {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Column length {} must match table length {num_rows}",
                column.len()
            )));
        }
        Ok(())
    }
}
