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

//! The concrete array definitions

mod boolean_array;
pub use boolean_array::*;

mod byte_array;
pub use byte_array::*;

mod fixed_width_array;
pub use fixed_width_array::*;

mod null_array;
pub use null_array::*;

mod primitive_array;
pub use primitive_array::*;

use quiver_data::{ArrayData, DataTypeLayout};
use quiver_schema::DataType;

use crate::types::{BinaryType, ByteArrayType, PrimitiveType, Utf8Type};

/// An array of any supported [`DataType`], dispatched on its physical layout.
///
/// Every variant wraps one [`ArrayData`]; cloning an `Array` clones the
/// buffer handles, not the bytes. Equality is logical, see [`quiver_data::equal`].
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    /// An array of [`DataType::Null`]
    Null(NullArray),
    /// An array with one fixed-width value per slot
    FixedWidth(FixedWidthArray),
    /// An array of variable-width values addressed through an offsets buffer
    VariableWidth(VariableWidthArray),
}

impl Array {
    /// Wraps validated [`ArrayData`] in the variant matching its layout
    pub fn from_data(data: ArrayData) -> Self {
        match data.layout() {
            DataTypeLayout::Null => Array::Null(NullArray::from_data_unchecked(data)),
            DataTypeLayout::FixedWidth { .. } => {
                Array::FixedWidth(FixedWidthArray::from_data_unchecked(data))
            }
            DataTypeLayout::VariableWidth => {
                Array::VariableWidth(VariableWidthArray::from_data_unchecked(data))
            }
        }
    }

    /// Returns the underlying [`ArrayData`]
    pub fn data(&self) -> &ArrayData {
        match self {
            Array::Null(a) => a.data(),
            Array::FixedWidth(a) => a.data(),
            Array::VariableWidth(a) => a.data(),
        }
    }

    /// Consumes this array, returning the underlying [`ArrayData`]
    pub fn into_data(self) -> ArrayData {
        match self {
            Array::Null(a) => a.into_data(),
            Array::FixedWidth(a) => a.into_data(),
            Array::VariableWidth(a) => a.into_data(),
        }
    }

    /// Returns the [`DataType`] of this array
    pub fn data_type(&self) -> &DataType {
        self.data().data_type()
    }

    /// Returns the number of elements in this array
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns whether this array has no elements
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Returns the offset into the underlying buffers at which this array starts
    pub fn offset(&self) -> usize {
        self.data().offset()
    }

    /// Returns the number of null slots in this array
    pub fn null_count(&self) -> usize {
        self.data().null_count()
    }

    /// Returns whether the element at `index` is null
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`
    pub fn is_null(&self, index: usize) -> bool {
        self.data().is_null(index)
    }

    /// Returns whether the element at `index` is not null
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`
    pub fn is_valid(&self, index: usize) -> bool {
        self.data().is_valid(index)
    }

    /// Returns a zero-copy slice of this array with the indicated offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + length > self.len()`
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        match self {
            Array::Null(a) => Array::Null(a.slice(offset, length)),
            Array::FixedWidth(a) => Array::FixedWidth(a.slice(offset, length)),
            Array::VariableWidth(a) => Array::VariableWidth(a.slice(offset, length)),
        }
    }

    /// Returns the total number of bytes of memory referenced by this array
    pub fn get_buffer_memory_size(&self) -> usize {
        self.data().get_buffer_memory_size()
    }

    /// Returns this array as a [`NullArray`] if it is one
    pub fn as_null(&self) -> Option<&NullArray> {
        match self {
            Array::Null(a) => Some(a),
            _ => None,
        }
    }

    /// Returns this array as a [`FixedWidthArray`] if it is one
    pub fn as_fixed_width(&self) -> Option<&FixedWidthArray> {
        match self {
            Array::FixedWidth(a) => Some(a),
            _ => None,
        }
    }

    /// Returns this array as a [`VariableWidthArray`] if it is one
    pub fn as_variable_width(&self) -> Option<&VariableWidthArray> {
        match self {
            Array::VariableWidth(a) => Some(a),
            _ => None,
        }
    }

    /// Returns a typed [`PrimitiveArray`] view if this array is of `T::DATA_TYPE`
    pub fn as_primitive<T: PrimitiveType>(&self) -> Option<PrimitiveArray<T>> {
        PrimitiveArray::try_from_data(self.data().clone()).ok()
    }

    /// Returns a [`BooleanArray`] view if this array is of [`DataType::Boolean`]
    pub fn as_boolean(&self) -> Option<BooleanArray> {
        BooleanArray::try_from_data(self.data().clone()).ok()
    }

    /// Returns a typed [`ByteArray`] view if this array is of `T::DATA_TYPE`
    pub fn as_bytes<T: ByteArrayType>(&self) -> Option<ByteArray<T>> {
        ByteArray::try_from_data(self.data().clone()).ok()
    }

    /// Returns a [`StringArray`] view if this array is of [`DataType::Utf8`]
    pub fn as_string(&self) -> Option<StringArray> {
        self.as_bytes::<Utf8Type>()
    }

    /// Returns a [`BinaryArray`] view if this array is of [`DataType::Binary`]
    pub fn as_binary(&self) -> Option<BinaryArray> {
        self.as_bytes::<BinaryType>()
    }
}

impl From<ArrayData> for Array {
    fn from(data: ArrayData) -> Self {
        Self::from_data(data)
    }
}

/// Creates a new empty array
///
/// ```
/// use quiver_array::new_empty_array;
/// use quiver_schema::DataType;
///
/// let empty_array = new_empty_array(&DataType::Int64);
///
/// assert_eq!(empty_array.len(), 0);
/// assert_eq!(empty_array.data_type(), &DataType::Int64);
/// ```
pub fn new_empty_array(data_type: &DataType) -> Array {
    Array::from_data(ArrayData::new_empty(data_type))
}

/// Creates a new array of `data_type` of length `length` filled
/// entirely of `NULL` values
pub fn new_null_array(data_type: &DataType, length: usize) -> Array {
    Array::from_data(ArrayData::new_null(data_type, length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Float64Type, Int32Type};
    use quiver_buffer::Buffer;

    #[test]
    fn test_from_data_dispatch() {
        let array = Array::from(ArrayData::new_empty(&DataType::Null));
        assert!(array.as_null().is_some());

        let array: Array = Int32Array::from(vec![1, 2]).into();
        assert!(array.as_fixed_width().is_some());
        assert!(array.as_variable_width().is_none());

        let array: Array = StringArray::from(vec!["a"]).into();
        assert!(array.as_variable_width().is_some());
        assert!(array.as_string().is_some());
        assert!(array.as_binary().is_none());
    }

    #[test]
    fn test_checked_downcast() {
        let array: Array = Int32Array::from(vec![1, 2, 3]).into();
        assert_eq!(array.as_primitive::<Int32Type>().unwrap().value(1), 2);
        assert!(array.as_primitive::<Float64Type>().is_none());
        assert!(array.as_boolean().is_none());
    }

    #[test]
    fn test_slice_keeps_variant() {
        let array: Array = BooleanArray::from(vec![true, false, true]).into();
        let sliced = array.slice(1, 2);
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.offset(), 1);
        assert!(!sliced.as_boolean().unwrap().value(0));
    }

    #[test]
    fn test_new_null_array() {
        for data_type in [
            DataType::Null,
            DataType::Boolean,
            DataType::Int16,
            DataType::Binary,
        ] {
            let array = new_null_array(&data_type, 9);
            assert_eq!(array.data_type(), &data_type);
            assert_eq!(array.len(), 9);
            assert_eq!(array.null_count(), 9);
            assert!(array.is_null(8));
        }
    }

    #[test]
    fn test_equality_is_logical() {
        let data = ArrayData::try_new(
            DataType::Int32,
            2,
            None,
            None,
            1,
            vec![Buffer::from_vec(vec![0_i32, 7, 8])],
        )
        .unwrap();
        let sliced = Array::from(data);
        let fresh: Array = Int32Array::from(vec![7, 8]).into();
        assert_eq!(sliced, fresh);
    }
}
