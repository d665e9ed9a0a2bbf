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

use quiver_data::ArrayData;
use quiver_schema::DataType;

use crate::Array;

/// An array of null values
///
/// A `NullArray` is a simplified array where all values are null and
/// no memory is allocated for its buffers.
///
/// ```
/// use quiver_array::NullArray;
///
/// let array = NullArray::new(10);
///
/// assert_eq!(array.len(), 10);
/// assert_eq!(array.null_count(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NullArray {
    data: ArrayData,
}

impl NullArray {
    /// Create a new [`NullArray`] of the specified length
    pub fn new(length: usize) -> Self {
        Self {
            data: ArrayData::new_null(&DataType::Null, length),
        }
    }

    pub(crate) fn from_data_unchecked(data: ArrayData) -> Self {
        Self { data }
    }

    /// Returns the number of elements in this array
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether this array is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of nulls, always equal to [`Self::len`]
    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    /// Returns a zero-copy slice of this array with the indicated offset and length.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        Self {
            data: self.data.slice(offset, len),
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

impl From<NullArray> for Array {
    fn from(array: NullArray) -> Self {
        Array::Null(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_array() {
        let null_arr = NullArray::new(32);

        assert_eq!(null_arr.len(), 32);
        assert_eq!(null_arr.null_count(), 32);
        assert!(null_arr.data().nulls().is_none());
        assert!(null_arr.data().buffers().is_empty());
    }

    #[test]
    fn test_null_array_slice() {
        let array1 = NullArray::new(32);

        let array2 = array1.slice(8, 16);
        assert_eq!(array2.len(), 16);
        assert_eq!(array2.null_count(), 16);
        assert_eq!(array2.data().offset(), 8);
    }
}
