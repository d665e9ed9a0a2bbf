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

use quiver_buffer::Buffer;
use quiver_data::ArrayData;

/// An untyped array with one fixed-width value per slot.
///
/// This is the layout shared by [`BooleanArray`](crate::BooleanArray), where
/// values are bit-packed, and every [`PrimitiveArray`](crate::PrimitiveArray).
#[derive(Debug, Clone, PartialEq)]
pub struct FixedWidthArray {
    data: ArrayData,
    bit_width: usize,
}

impl FixedWidthArray {
    pub(crate) fn from_data_unchecked(data: ArrayData) -> Self {
        let bit_width = data.data_type().bit_width().unwrap_or_default();
        Self { data, bit_width }
    }

    /// Returns the number of bits one value occupies
    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Returns the number of elements in this array
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether this array is empty
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

    /// Returns the raw little-endian bytes of the value at `i`.
    ///
    /// The bytes are returned even if the slot is null.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()` or the values are bit-packed
    pub fn value_bytes(&self, i: usize) -> &[u8] {
        assert!(
            i < self.len(),
            "Trying to access an element at index {} from a FixedWidthArray of length {}",
            i,
            self.len()
        );
        assert!(
            self.bit_width % 8 == 0,
            "value_bytes is not supported for bit-packed arrays"
        );
        let width = self.bit_width / 8;
        let start = (self.data.offset() + i) * width;
        &self.values()[start..start + width]
    }

    /// Returns the complete values buffer, not adjusted for this array's offset
    pub fn values(&self) -> &Buffer {
        &self.data.buffers()[0]
    }

    /// Returns a zero-copy slice of this array with the indicated offset and length.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        Self {
            data: self.data.slice(offset, len),
            bit_width: self.bit_width,
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
