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

use quiver_schema::{DataType, Field, QuiverError, Result};

use crate::{Array, ChunkedArray};

/// A named, typed column of a [`Table`](crate::Table): a [`Field`] paired
/// with the [`ChunkedArray`] holding its values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    field: Field,
    data: ChunkedArray,
}

impl Column {
    /// Create a new [`Column`] from `field` and its chunks
    ///
    /// # Errors
    ///
    /// Errors if `chunks` is empty or any chunk's type differs from the field's
    pub fn try_new(field: Field, chunks: Vec<Array>) -> Result<Self> {
        Self::from_chunked(field, ChunkedArray::try_new(chunks)?)
    }

    /// Create a new [`Column`] from `field` and an existing [`ChunkedArray`]
    ///
    /// # Errors
    ///
    /// Errors if the array's type differs from the field's
    pub fn from_chunked(field: Field, data: ChunkedArray) -> Result<Self> {
        if field.data_type() != data.data_type() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Column \"{}\" expected data of type {} but found {}",
                field.name(),
                field.data_type(),
                data.data_type()
            )));
        }
        Ok(Self { field, data })
    }

    /// Returns the [`Field`] describing this column
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the values of this column
    pub fn data(&self) -> &ChunkedArray {
        &self.data
    }

    /// Returns the column name
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// Returns the column type
    pub fn data_type(&self) -> &DataType {
        self.field.data_type()
    }

    /// Returns the number of rows in this column
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if this column has no rows
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of nulls in this column
    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    /// Returns a zero-copy slice of `length` rows starting at `offset`,
    /// keeping this column's field
    ///
    /// # Errors
    ///
    /// Errors if `offset > self.len()`
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        Ok(Self {
            field: self.field.clone(),
            data: self.data.slice(offset, length)?,
        })
    }

    /// Returns a zero-copy slice from `offset` to the end of this column
    ///
    /// # Errors
    ///
    /// Errors if `offset > self.len()`
    pub fn slice_from(&self, offset: usize) -> Result<Self> {
        Ok(Self {
            field: self.field.clone(),
            data: self.data.slice_from(offset)?,
        })
    }
}
