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

use crate::types::bytes::ByteArrayNativeType;
use crate::types::{BinaryType, ByteArrayType, Utf8Type};
use crate::Array;

/// An untyped array of variable-width values.
///
/// Slot `i` occupies `values[offsets[offset + i]..offsets[offset + i + 1]]`,
/// where `offset` is the array's logical offset. The first offset need not be
/// zero, so a slice shares the offsets and values buffers of its parent.
///
/// The byte span of a slot is well defined whether or not the slot is null;
/// a null slot usually has an empty span.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableWidthArray {
    data: ArrayData,
}

impl VariableWidthArray {
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

    /// Returns the number of null slots in this array
    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    /// Returns whether the element at `i` is null
    pub fn is_null(&self, i: usize) -> bool {
        self.data.is_null(i)
    }

    /// Returns the `len + 1` offsets of this array, starting at its logical offset
    pub fn value_offsets(&self) -> ScalarBuffer<i32> {
        // an empty array may omit its offsets
        if self.data.buffers()[0].is_empty() {
            return ScalarBuffer::from(vec![0]);
        }
        self.data.typed_buffer::<i32>(0, self.len() + 1)
    }

    /// Returns the start offset of slot `i` in the values buffer
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`
    pub fn value_offset(&self, i: usize) -> i32 {
        self.check_bounds(i);
        self.value_offsets().value(i)
    }

    /// Returns the length in bytes of slot `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`
    pub fn value_length(&self, i: usize) -> i32 {
        self.check_bounds(i);
        let offsets = self.value_offsets();
        offsets.value(i + 1) - offsets.value(i)
    }

    /// Returns a zero-copy view of the bytes of slot `i`.
    ///
    /// The view is returned even if the slot is null; callers must check
    /// [`Self::is_null`] separately.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`
    pub fn value_bytes(&self, i: usize) -> &[u8] {
        self.check_bounds(i);
        let offsets = self.value_offsets();
        let start = offsets.value(i) as usize;
        let end = offsets.value(i + 1) as usize;
        &self.values()[start..end]
    }

    /// Returns the complete values buffer shared by all slots
    pub fn values(&self) -> &Buffer {
        &self.data.buffers()[1]
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

    fn check_bounds(&self, i: usize) {
        assert!(
            i < self.len(),
            "Trying to access an element at index {} from a VariableWidthArray of length {}",
            i,
            self.len()
        );
    }
}

/// An array of variable-width values whose native type is `T::Native`.
///
/// See [`StringArray`] and [`BinaryArray`] for the concrete types.
pub struct ByteArray<T: ByteArrayType> {
    inner: VariableWidthArray,
    phantom: PhantomData<T>,
}

/// An array of UTF-8 strings with `i32` offsets
///
/// ```
/// # use quiver_array::StringArray;
/// let array = StringArray::from(vec![Some("foo"), None, Some("bar")]);
/// assert_eq!(array.value(0), "foo");
/// assert!(array.is_null(1));
/// ```
pub type StringArray = ByteArray<Utf8Type>;

/// An array of opaque binary values with `i32` offsets
///
/// ```
/// # use quiver_array::BinaryArray;
/// let values: Vec<&[u8]> = vec![&b"one"[..], &b""[..], &b"three"[..]];
/// let array = BinaryArray::from(values);
/// assert_eq!(array.value(2), b"three");
/// assert_eq!(array.value_length(1), 0);
/// ```
pub type BinaryArray = ByteArray<BinaryType>;

impl<T: ByteArrayType> Clone for ByteArray<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T: ByteArrayType> PartialEq for ByteArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: ByteArrayType> Debug for ByteArray<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Array\n[\n", T::PREFIX)?;
        for v in self.iter() {
            match v {
                Some(v) => writeln!(f, "  {v:?},")?,
                None => writeln!(f, "  null,")?,
            }
        }
        write!(f, "]")
    }
}

impl<T: ByteArrayType> ByteArray<T> {
    /// Create a new [`ByteArray`] from `offsets`, `values` and an optional
    /// validity bitmap.
    ///
    /// # Errors
    ///
    /// Errors if the offsets are not monotonic or out of bounds of `values`,
    /// if `nulls` is too short, or if a string value is not valid UTF-8
    pub fn try_new(
        offsets: ScalarBuffer<i32>,
        values: Buffer,
        nulls: Option<Buffer>,
    ) -> Result<Self> {
        if offsets.is_empty() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "{}Array requires at least one offset",
                T::PREFIX
            )));
        }
        let len = offsets.len() - 1;
        let data = ArrayData::try_new(
            T::DATA_TYPE,
            len,
            None,
            nulls,
            0,
            vec![offsets.into_inner(), values],
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
                "{}Array expected ArrayData with type {} got {}",
                T::PREFIX,
                T::DATA_TYPE,
                data.data_type()
            )));
        }
        Ok(Self {
            inner: VariableWidthArray::from_data_unchecked(data),
            phantom: PhantomData,
        })
    }

    /// Returns the length of this array.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether this array is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of null slots in this array
    pub fn null_count(&self) -> usize {
        self.inner.null_count()
    }

    /// Returns whether the element at `i` is null
    pub fn is_null(&self, i: usize) -> bool {
        self.inner.is_null(i)
    }

    /// Returns the start offset of slot `i` in the values buffer
    pub fn value_offset(&self, i: usize) -> i32 {
        self.inner.value_offset(i)
    }

    /// Returns the length in bytes of slot `i`
    pub fn value_length(&self, i: usize) -> i32 {
        self.inner.value_length(i)
    }

    /// Returns the element at index `i`
    ///
    /// A null slot returns the value of its byte span, which is usually empty.
    ///
    /// # Panics
    ///
    /// Panics if index `i` is out of bounds.
    pub fn value(&self, i: usize) -> &T::Native {
        assert!(
            i < self.len(),
            "Trying to access an element at index {} from a {}Array of length {}",
            i,
            T::PREFIX,
            self.len()
        );
        let bytes = self.inner.value_bytes(i);
        // SAFETY:
        // ArrayData::try_new validated every value of a Utf8 array, and slicing
        // never splits a value
        unsafe { T::Native::from_bytes_unchecked(bytes) }
    }

    /// Returns an iterator over the optional values of this array
    pub fn iter(&self) -> impl Iterator<Item = Option<&T::Native>> + '_ {
        (0..self.len()).map(|i| (!self.is_null(i)).then(|| self.value(i)))
    }

    /// Returns the untyped [`VariableWidthArray`] this view wraps
    pub fn as_variable_width(&self) -> &VariableWidthArray {
        &self.inner
    }

    /// Returns a zero-copy slice of this array with the indicated offset and length.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        Self {
            inner: self.inner.slice(offset, length),
            phantom: PhantomData,
        }
    }

    /// Returns the underlying [`ArrayData`]
    pub fn data(&self) -> &ArrayData {
        self.inner.data()
    }

    /// Consumes this array, returning the underlying [`ArrayData`]
    pub fn into_data(self) -> ArrayData {
        self.inner.into_data()
    }
}

impl<Ptr, T: ByteArrayType> FromIterator<Option<Ptr>> for ByteArray<T>
where
    Ptr: AsRef<T::Native>,
{
    fn from_iter<I: IntoIterator<Item = Option<Ptr>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut offsets = BufferBuilder::<i32>::new(lower + 1);
        let mut values = BufferBuilder::<u8>::new(0);
        let mut nulls = NullBufferBuilder::new(lower);

        offsets.append(0);
        for item in iter {
            if let Some(v) = &item {
                let bytes: &[u8] = v.as_ref().as_ref();
                values.append_slice(bytes);
            }
            nulls.append(item.is_some());
            let end = i32::try_from(values.len()).expect("byte array offset overflow");
            offsets.append(end);
        }

        let len = offsets.len();
        let offsets = ScalarBuffer::new(offsets.finish(), 0, len);
        Self::try_new(offsets, values.finish(), nulls.finish())
            .expect("builders produce valid offsets")
    }
}

impl<'a> From<Vec<&'a str>> for StringArray {
    fn from(v: Vec<&'a str>) -> Self {
        v.into_iter().map(Some).collect()
    }
}

impl<'a> From<Vec<Option<&'a str>>> for StringArray {
    fn from(v: Vec<Option<&'a str>>) -> Self {
        v.into_iter().collect()
    }
}

impl From<Vec<String>> for StringArray {
    fn from(v: Vec<String>) -> Self {
        v.into_iter().map(Some).collect()
    }
}

impl<'a> From<Vec<&'a [u8]>> for BinaryArray {
    fn from(v: Vec<&'a [u8]>) -> Self {
        v.into_iter().map(Some).collect()
    }
}

impl<'a> From<Vec<Option<&'a [u8]>>> for BinaryArray {
    fn from(v: Vec<Option<&'a [u8]>>) -> Self {
        v.into_iter().collect()
    }
}

impl<T: ByteArrayType> From<ByteArray<T>> for Array {
    fn from(array: ByteArray<T>) -> Self {
        Array::VariableWidth(array.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_schema::DataType;

    /// `["a", "", "", "bb", "ccc"]` with slot 2 null
    fn sample() -> StringArray {
        StringArray::try_new(
            ScalarBuffer::from(vec![0, 1, 1, 1, 3, 6]),
            Buffer::from_slice_ref(b"abbccc"),
            Some(Buffer::from([0b00011011_u8])),
        )
        .unwrap()
    }

    #[test]
    fn test_string_array_from_buffers() {
        let array = sample();
        assert_eq!(array.len(), 5);
        assert_eq!(array.null_count(), 1);

        let values: Vec<&str> = (0..array.len()).map(|i| array.value(i)).collect();
        assert_eq!(values, vec!["a", "", "", "bb", "ccc"]);

        assert!(array.is_null(2));
        assert_eq!(array.value_offset(2), 1);
        assert_eq!(array.value_length(2), 0);
        assert_eq!(array.value_offset(4), 3);
        assert_eq!(array.value_length(4), 3);
    }

    #[test]
    fn test_value_bytes_span() {
        let array = sample();
        let inner = array.as_variable_width();
        for i in 0..array.len() {
            let start = inner.value_offset(i) as usize;
            let len = inner.value_length(i) as usize;
            assert_eq!(inner.value_bytes(i), &inner.values()[start..start + len]);
        }
        // the view shares storage with the values buffer
        assert_eq!(
            inner.value_bytes(3).as_ptr(),
            unsafe { inner.values().as_ptr().add(1) }
        );
    }

    #[test]
    fn test_string_array_slice() {
        let array = sample();
        let sliced = array.slice(2, 3);
        assert_eq!(sliced.len(), 3);
        assert_eq!(sliced.null_count(), 1);
        assert_eq!(sliced.data().offset(), 2);
        assert_eq!(sliced.value_offset(0), 1);
        assert_eq!(
            sliced.iter().collect::<Vec<_>>(),
            vec![None, Some("bb"), Some("ccc")]
        );
        assert_eq!(
            sliced.as_variable_width().value_offsets().to_vec(),
            vec![1, 1, 3, 6]
        );
        assert!(sliced.data().buffers()[1].ptr_eq(&array.data().buffers()[1]));
    }

    #[test]
    fn test_string_array_from_iter() {
        let array = StringArray::from(vec![Some("hello"), None, Some("world")]);
        assert_eq!(array.null_count(), 1);
        assert_eq!(array.value(0), "hello");
        assert_eq!(array.value(1), "");
        assert_eq!(array.value(2), "world");
        assert_eq!(
            array.as_variable_width().value_offsets().to_vec(),
            vec![0, 5, 5, 10]
        );

        let owned = StringArray::from(vec!["hello".to_string(), "world".to_string()]);
        assert_eq!(owned.null_count(), 0);
        assert!(owned.data().nulls().is_none());
    }

    #[test]
    fn test_binary_array() {
        let values: Vec<Option<&[u8]>> = vec![Some(&b"\xFF\x00"[..]), None, Some(&b""[..])];
        let array = BinaryArray::from(values);
        assert_eq!(array.data().data_type(), &DataType::Binary);
        assert_eq!(array.value(0), &[0xFF, 0x00]);
        assert!(array.is_null(1));
        assert_eq!(array.value(2), b"");
        assert!(!array.is_null(2));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = StringArray::try_new(
            ScalarBuffer::from(vec![0, 2]),
            Buffer::from(vec![0xC3, 0x28]),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid UTF8 sequence"));
    }

    #[test]
    fn test_empty_offsets_rejected() {
        let err = BinaryArray::try_new(ScalarBuffer::from(Vec::<i32>::new()), Buffer::default(), None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: BinaryArray requires at least one offset"
        );
    }

    #[test]
    fn test_wrong_type() {
        let data = BinaryArray::from(vec![&b"a"[..]]).into_data();
        let err = StringArray::try_from_data(data).unwrap_err();
        assert!(err.to_string().contains("StringArray expected ArrayData with type Utf8 got Binary"));
    }

    #[test]
    #[should_panic(expected = "Trying to access an element at index 5 from a StringArray of length 5")]
    fn test_value_out_of_bounds() {
        sample().value(5);
    }

    #[test]
    fn test_debug() {
        let array = StringArray::from(vec![Some("x"), None]);
        assert_eq!(format!("{array:?}"), "StringArray\n[\n  \"x\",\n  null,\n]");
    }
}
