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

use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use quiver_buffer::{Buffer, BufferBuilder, NullBufferBuilder, ScalarBuffer};
use quiver_data::ArrayData;
use quiver_schema::{QuiverError, Result};

use crate::types::*;
use crate::{Array, FixedWidthArray};

/// A [`PrimitiveArray`] of `i8`
pub type Int8Array = PrimitiveArray<Int8Type>;
/// A [`PrimitiveArray`] of `i16`
pub type Int16Array = PrimitiveArray<Int16Type>;
/// A [`PrimitiveArray`] of `i32`
pub type Int32Array = PrimitiveArray<Int32Type>;
/// A [`PrimitiveArray`] of `i64`
pub type Int64Array = PrimitiveArray<Int64Type>;
/// A [`PrimitiveArray`] of `u8`
pub type UInt8Array = PrimitiveArray<UInt8Type>;
/// A [`PrimitiveArray`] of `u16`
pub type UInt16Array = PrimitiveArray<UInt16Type>;
/// A [`PrimitiveArray`] of `u32`
pub type UInt32Array = PrimitiveArray<UInt32Type>;
/// A [`PrimitiveArray`] of `u64`
pub type UInt64Array = PrimitiveArray<UInt64Type>;
/// A [`PrimitiveArray`] of `f16`
pub type Float16Array = PrimitiveArray<Float16Type>;
/// A [`PrimitiveArray`] of `f32`
pub type Float32Array = PrimitiveArray<Float32Type>;
/// A [`PrimitiveArray`] of `f64`
pub type Float64Array = PrimitiveArray<Float64Type>;
/// A [`PrimitiveArray`] of days since UNIX epoch stored as `i32`
pub type Date32Array = PrimitiveArray<Date32Type>;
/// A [`PrimitiveArray`] of milliseconds since UNIX epoch stored as `i64`
pub type Date64Array = PrimitiveArray<Date64Type>;

/// An array of fixed-width primitive values of type `T::Native`.
///
/// # Example: From a Vec
///
/// ```
/// # use quiver_array::Int32Array;
/// let arr: Int32Array = vec![1, 2, 3, 4].into();
/// let values: Vec<i32> = arr.values().iter().collect();
/// assert_eq!(values, [1, 2, 3, 4])
/// ```
///
/// # Example: With nulls
///
/// ```
/// # use quiver_array::Int32Array;
/// let arr: Int32Array = vec![Some(1), None, Some(3), None].into();
/// assert_eq!(arr.len(), 4);
/// assert_eq!(arr.null_count(), 2);
/// let values: Vec<Option<i32>> = arr.iter().collect();
/// assert_eq!(values, [Some(1), None, Some(3), None]);
/// ```
pub struct PrimitiveArray<T: PrimitiveType> {
    data: ArrayData,
    /// Values already offset to the first slot of this array
    values: ScalarBuffer<T::Native>,
    phantom: PhantomData<T>,
}

impl<T: PrimitiveType> Clone for PrimitiveArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            values: self.values.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T: PrimitiveType> PartialEq for PrimitiveArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: PrimitiveType> Debug for PrimitiveArray<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrimitiveArray<{:?}>\n[\n", T::DATA_TYPE)?;
        for v in self.iter() {
            match v {
                Some(v) => writeln!(f, "  {v:?},")?,
                None => writeln!(f, "  null,")?,
            }
        }
        write!(f, "]")
    }
}

impl<T: PrimitiveType> PrimitiveArray<T> {
    /// Create a new [`PrimitiveArray`] from the provided values and validity bitmap
    ///
    /// # Errors
    ///
    /// Errors if `nulls` is too short to cover `values`
    pub fn try_new(values: ScalarBuffer<T::Native>, nulls: Option<Buffer>) -> Result<Self> {
        let data = ArrayData::try_new(
            T::DATA_TYPE,
            values.len(),
            None,
            nulls,
            0,
            vec![values.into_inner()],
        )?;
        Self::try_from_data(data)
    }

    /// Create a typed view over `data`
    ///
    /// # Errors
    ///
    /// Errors if the data type of `data` is not `T::DATA_TYPE`
    pub fn try_from_data(data: ArrayData) -> Result<Self> {
        if data.data_type() != &T::DATA_TYPE {
            return Err(QuiverError::InvalidArgumentError(format!(
                "PrimitiveArray expected ArrayData with type {} got {}",
                T::DATA_TYPE,
                data.data_type()
            )));
        }
        let values = data.typed_buffer::<T::Native>(0, data.len());
        Ok(Self {
            data,
            values,
            phantom: PhantomData,
        })
    }

    /// Returns the length of this array.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether this array is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of null slots in this array
    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    /// Returns whether the element at `i` is null
    pub fn is_null(&self, i: usize) -> bool {
        self.data.is_null(i)
    }

    /// Returns whether the element at `i` is not null
    pub fn is_valid(&self, i: usize) -> bool {
        self.data.is_valid(i)
    }

    /// Returns the values of this array, ignoring validity
    #[inline]
    pub fn values(&self) -> &ScalarBuffer<T::Native> {
        &self.values
    }

    /// Returns the primitive value at index `i`.
    ///
    /// The value is returned even if the slot is null; check [`Self::is_null`]
    /// to tell the two apart.
    ///
    /// # Panics
    ///
    /// Panics if index `i` is out of bounds
    #[inline]
    pub fn value(&self, i: usize) -> T::Native {
        assert!(
            i < self.len(),
            "Trying to access an element at index {} from a PrimitiveArray of length {}",
            i,
            self.len()
        );
        self.values.value(i)
    }

    /// Returns an iterator over the optional values of this array
    pub fn iter(&self) -> impl Iterator<Item = Option<T::Native>> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| self.is_valid(i).then_some(v))
    }

    /// Returns a zero-copy slice of this array with the indicated offset and length.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        Self {
            data: self.data.slice(offset, length),
            values: self.values.slice(offset, length),
            phantom: PhantomData,
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

// Implemented per type: generic `From<Vec<T::Native>>` and
// `From<Vec<Option<T::Native>>>` impls would conflict
macro_rules! def_primitive_from_vec {
    ( $ty:ident ) => {
        impl From<Vec<<$ty as PrimitiveType>::Native>> for PrimitiveArray<$ty> {
            fn from(data: Vec<<$ty as PrimitiveType>::Native>) -> Self {
                Self::try_new(ScalarBuffer::from(data), None)
                    .expect("a values buffer without a validity bitmap is always valid")
            }
        }

        impl From<Vec<Option<<$ty as PrimitiveType>::Native>>> for PrimitiveArray<$ty> {
            fn from(data: Vec<Option<<$ty as PrimitiveType>::Native>>) -> Self {
                data.into_iter().collect()
            }
        }
    };
}

def_primitive_from_vec!(Int8Type);
def_primitive_from_vec!(Int16Type);
def_primitive_from_vec!(Int32Type);
def_primitive_from_vec!(Int64Type);
def_primitive_from_vec!(UInt8Type);
def_primitive_from_vec!(UInt16Type);
def_primitive_from_vec!(UInt32Type);
def_primitive_from_vec!(UInt64Type);
def_primitive_from_vec!(Float16Type);
def_primitive_from_vec!(Float32Type);
def_primitive_from_vec!(Float64Type);
def_primitive_from_vec!(Date32Type);
def_primitive_from_vec!(Date64Type);

impl<T: PrimitiveType> FromIterator<Option<T::Native>> for PrimitiveArray<T> {
    fn from_iter<I: IntoIterator<Item = Option<T::Native>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut values = BufferBuilder::<T::Native>::new(lower);
        let mut nulls = NullBufferBuilder::new(lower);
        for item in iter {
            match item {
                Some(v) => {
                    values.append(v);
                    nulls.append_non_null();
                }
                None => {
                    values.append(T::Native::default());
                    nulls.append_null();
                }
            }
        }
        let len = values.len();
        let values = ScalarBuffer::new(values.finish(), 0, len);
        Self::try_new(values, nulls.finish()).expect("builders produce matching lengths")
    }
}

impl<T: PrimitiveType> From<PrimitiveArray<T>> for Array {
    fn from(array: PrimitiveArray<T>) -> Self {
        Array::FixedWidth(FixedWidthArray::from_data_unchecked(array.data))
    }
}
