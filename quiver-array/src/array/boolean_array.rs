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

use quiver_buffer::{bit_util, BooleanBufferBuilder, Buffer, NullBufferBuilder};
use quiver_data::ArrayData;
use quiver_schema::{DataType, QuiverError, Result};

use crate::{Array, FixedWidthArray};

/// An array of bit-packed boolean values
///
/// # Example: From a Vec
///
/// ```
/// # use quiver_array::BooleanArray;
/// let arr: BooleanArray = vec![true, true, false].into();
/// assert_eq!(arr.iter().collect::<Vec<_>>(), vec![Some(true), Some(true), Some(false)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanArray {
    data: ArrayData,
}

impl BooleanArray {
    /// Create a new [`BooleanArray`] of `len` slots from bit-packed `values`
    /// and an optional validity bitmap
    pub fn try_new(values: Buffer, len: usize, nulls: Option<Buffer>) -> Result<Self> {
        let data = ArrayData::try_new(DataType::Boolean, len, None, nulls, 0, vec![values])?;
        Self::try_from_data(data)
    }

    /// Create a view over `data`, returning an error if it is not of
    /// [`DataType::Boolean`]
    pub fn try_from_data(data: ArrayData) -> Result<Self> {
        if data.data_type() != &DataType::Boolean {
            return Err(QuiverError::InvalidArgumentError(format!(
                "BooleanArray expected ArrayData with type Boolean got {}",
                data.data_type()
            )));
        }
        Ok(Self { data })
    }

    /// Returns the length of this array.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether this array is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of null slots in this array
    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    /// Returns whether the element at `i` is null
    pub fn is_null(&self, i: usize) -> bool {
        self.data.is_null(i)
    }

    /// Returns the boolean value at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if index `i` is out of bounds
    pub fn value(&self, i: usize) -> bool {
        assert!(
            i < self.len(),
            "Trying to access an element at index {} from a BooleanArray of length {}",
            i,
            self.len()
        );
        bit_util::get_bit(&self.data.buffers()[0], self.data.offset() + i)
    }

    /// Returns the number of valid `true` values in this array
    pub fn true_count(&self) -> usize {
        (0..self.len())
            .filter(|i| !self.is_null(*i) && self.value(*i))
            .count()
    }

    /// Returns an iterator over the optional values of this array
    pub fn iter(&self) -> impl Iterator<Item = Option<bool>> + '_ {
        (0..self.len()).map(|i| (!self.is_null(i)).then(|| self.value(i)))
    }

    /// Returns a zero-copy slice of this array with the indicated offset and length.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        Self {
            data: self.data.slice(offset, length),
        }
    }

    /// Returns the underlying [`ArrayData`]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Consumes this array, returning the underlying [`ArrayData`]
    pub fn into_data(self) -> ArrayData {
        self.data
    }
}

impl From<Vec<bool>> for BooleanArray {
    fn from(data: Vec<bool>) -> Self {
        let mut builder = BooleanBufferBuilder::new(data.len());
        builder.append_slice(&data);
        Self::try_new(builder.finish(), data.len(), None)
            .expect("a values bitmap without a validity bitmap is always valid")
    }
}

impl From<Vec<Option<bool>>> for BooleanArray {
    fn from(data: Vec<Option<bool>>) -> Self {
        data.into_iter().collect()
    }
}

impl FromIterator<Option<bool>> for BooleanArray {
    fn from_iter<I: IntoIterator<Item = Option<bool>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut values = BooleanBufferBuilder::new(lower);
        let mut nulls = NullBufferBuilder::new(lower);
        for item in iter {
            values.append(item.unwrap_or_default());
            nulls.append(item.is_some());
        }
        let len = values.len();
        Self::try_new(values.finish(), len, nulls.finish())
            .expect("builders produce matching lengths")
    }
}

impl From<BooleanArray> for Array {
    fn from(array: BooleanArray) -> Self {
        Array::FixedWidth(FixedWidthArray::from_data_unchecked(array.data))
    }
}
