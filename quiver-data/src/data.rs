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

//! Contains [`ArrayData`], a generic representation of quiver array data which encapsulates
//! common attributes and operations for quiver arrays.

use std::ops::Range;

use quiver_buffer::bit_util;
use quiver_buffer::{Buffer, NativeType, ScalarBuffer};
use quiver_schema::{DataType, QuiverError, Result};

/// Layout specification for the data buffers of a [`DataType`].
///
/// The validity bitmap is not counted here: it is optional for every layout
/// except [`DataTypeLayout::Null`], which never has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTypeLayout {
    /// No buffers, every slot is null
    Null,
    /// A single values buffer where each slot occupies `bit_width` bits
    FixedWidth {
        /// The number of bits per value
        bit_width: usize,
    },
    /// An `i32` offsets buffer of `len + 1` entries followed by a values buffer
    VariableWidth,
}

impl DataTypeLayout {
    /// Returns the number of data buffers this layout stores
    pub fn num_buffers(&self) -> usize {
        match self {
            DataTypeLayout::Null => 0,
            DataTypeLayout::FixedWidth { .. } => 1,
            DataTypeLayout::VariableWidth => 2,
        }
    }
}

/// Returns the [`DataTypeLayout`] of arrays of `data_type`
pub fn layout(data_type: &DataType) -> DataTypeLayout {
    match (data_type, data_type.bit_width()) {
        (DataType::Null, _) => DataTypeLayout::Null,
        (_, Some(bit_width)) => DataTypeLayout::FixedWidth { bit_width },
        (_, None) => DataTypeLayout::VariableWidth,
    }
}

/// An generic representation of quiver array data which encapsulates common attributes
/// and operations for quiver arrays.
///
/// `ArrayData` is immutable. Slicing produces a new `ArrayData` that shares the
/// same [`Buffer`]s and only adjusts `offset`, `len` and `null_count`.
///
/// # Memory Layout
///
/// * `nulls` is an optional validity bitmap with one bit per slot, least
///   significant bit first, where `1` marks a valid slot. `None` means the
///   array has no nulls.
/// * `buffers` holds the data buffers of the type's [`DataTypeLayout`]. Both
///   the bitmap and the buffers are indexed from `offset`, so slot `i` lives at
///   position `offset + i`.
#[derive(Debug, Clone)]
pub struct ArrayData {
    data_type: DataType,
    len: usize,
    offset: usize,
    null_count: usize,
    nulls: Option<Buffer>,
    buffers: Vec<Buffer>,
}

impl ArrayData {
    /// Create a new ArrayData, validating that the provided buffers form a
    /// valid array of `data_type`.
    ///
    /// If `null_count` is `None` it is computed from `nulls`; otherwise it must
    /// match the number of unset bits in `nulls` over `offset..offset + len`.
    ///
    /// Validation checks the number and size of the buffers, that the offsets
    /// of variable-width arrays are monotonic and in bounds, and that every
    /// value of a [`DataType::Utf8`] array is valid UTF-8.
    pub fn try_new(
        data_type: DataType,
        len: usize,
        null_count: Option<usize>,
        nulls: Option<Buffer>,
        offset: usize,
        buffers: Vec<Buffer>,
    ) -> Result<Self> {
        let layout = layout(&data_type);
        if buffers.len() != layout.num_buffers() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Expected {} buffers in array of type {:?}, got {}",
                layout.num_buffers(),
                data_type,
                buffers.len(),
            )));
        }

        let len_plus_offset = len.checked_add(offset).ok_or_else(|| {
            QuiverError::InvalidArgumentError(format!(
                "Length {len} with offset {offset} overflows usize"
            ))
        })?;

        let actual_null_count = match (&layout, &nulls) {
            (DataTypeLayout::Null, Some(_)) => {
                return Err(QuiverError::InvalidArgumentError(
                    "Arrays of type Null cannot contain a null bitmap".to_string(),
                ))
            }
            (DataTypeLayout::Null, None) => len,
            (_, None) => 0,
            (_, Some(bitmap)) => {
                let needed_len = bit_util::ceil(len_plus_offset, 8);
                if bitmap.len() < needed_len {
                    return Err(QuiverError::InvalidArgumentError(format!(
                        "null_bit_buffer size too small. got {} needed {}",
                        bitmap.len(),
                        needed_len
                    )));
                }
                len - bitmap.count_set_bits_offset(offset, len)
            }
        };

        if let Some(null_count) = null_count {
            if null_count != actual_null_count {
                return Err(QuiverError::InvalidArgumentError(format!(
                    "null_count value ({null_count}) doesn't match actual number of nulls in array ({actual_null_count})"
                )));
            }
        }

        let data = Self {
            data_type,
            len,
            offset,
            null_count: actual_null_count,
            nulls,
            buffers,
        };

        match layout {
            DataTypeLayout::Null => {}
            DataTypeLayout::FixedWidth { bit_width } => {
                let bits = len_plus_offset.checked_mul(bit_width).ok_or_else(|| {
                    QuiverError::InvalidArgumentError(format!(
                        "Length {len} with offset {offset} overflows the size of a {} buffer",
                        data.data_type
                    ))
                })?;
                data.check_buffer_len(0, bit_util::ceil(bits, 8))?;
            }
            DataTypeLayout::VariableWidth => data.validate_offsets_and_values()?,
        }

        Ok(data)
    }

    /// Returns a new empty [ArrayData] valid for `data_type`.
    pub fn new_empty(data_type: &DataType) -> Self {
        let buffers = match layout(data_type) {
            DataTypeLayout::Null => vec![],
            DataTypeLayout::FixedWidth { .. } => vec![Buffer::default()],
            DataTypeLayout::VariableWidth => vec![Buffer::from_vec(vec![0_i32]), Buffer::default()],
        };
        Self {
            data_type: *data_type,
            len: 0,
            offset: 0,
            null_count: 0,
            nulls: None,
            buffers,
        }
    }

    /// Returns a new [ArrayData] valid for `data_type` with `len` null values
    pub fn new_null(data_type: &DataType, len: usize) -> Self {
        let (nulls, buffers) = match layout(data_type) {
            DataTypeLayout::Null => (None, vec![]),
            DataTypeLayout::FixedWidth { bit_width } => {
                let zeroed = Buffer::from(vec![0_u8; bit_util::ceil(len * bit_width, 8)]);
                (Some(zeroed_bitmap(len)), vec![zeroed])
            }
            DataTypeLayout::VariableWidth => {
                let offsets = Buffer::from_vec(vec![0_i32; len + 1]);
                (Some(zeroed_bitmap(len)), vec![offsets, Buffer::default()])
            }
        };
        Self {
            data_type: *data_type,
            len,
            offset: 0,
            null_count: len,
            nulls,
            buffers,
        }
    }

    /// Returns a reference to the [`DataType`] of this [`ArrayData`]
    #[inline]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Returns the [`DataTypeLayout`] of this [`ArrayData`]
    #[inline]
    pub fn layout(&self) -> DataTypeLayout {
        layout(&self.data_type)
    }

    /// Returns the number of elements in this array
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns whether this array is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the offset of this array, in slots
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the total number of nulls in this array
    #[inline]
    pub const fn null_count(&self) -> usize {
        self.null_count
    }

    /// Returns the validity bitmap of this array, if any
    #[inline]
    pub fn nulls(&self) -> Option<&Buffer> {
        self.nulls.as_ref()
    }

    /// Returns the data buffers of this array, excluding the validity bitmap
    #[inline]
    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    /// Returns every buffer of this array in wire order: the validity bitmap
    /// first, if present, then the data buffers of the layout
    pub fn layout_buffers(&self) -> impl Iterator<Item = &Buffer> + '_ {
        self.nulls.iter().chain(self.buffers.iter())
    }

    /// Returns `len` values of data buffer `buffer` viewed as `T`, starting at
    /// this array's offset.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is too short, which [`Self::try_new`] rules out for
    /// the lengths implied by the layout
    pub fn typed_buffer<T: NativeType>(&self, buffer: usize, len: usize) -> ScalarBuffer<T> {
        ScalarBuffer::new(self.buffers[buffer].clone(), self.offset, len)
    }

    /// Returns whether the element at index `i` is null
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`
    pub fn is_null(&self, i: usize) -> bool {
        assert!(
            i < self.len,
            "Trying to access an element at index {} from an array of length {}",
            i,
            self.len
        );
        if self.data_type == DataType::Null {
            return true;
        }
        match &self.nulls {
            Some(bitmap) => !bit_util::get_bit(bitmap, self.offset + i),
            None => false,
        }
    }

    /// Returns whether the element at index `i` is not null
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`
    pub fn is_valid(&self, i: usize) -> bool {
        !self.is_null(i)
    }

    /// Returns the total number of bytes of memory occupied by the buffers
    /// referenced by this [ArrayData].
    pub fn get_buffer_memory_size(&self) -> usize {
        self.layout_buffers().map(|b| b.len()).sum()
    }

    /// Creates a zero-copy slice of itself. This creates a new ArrayData pointing
    /// at the same underlying buffers with a different offset and len.
    ///
    /// The null count of the slice is recomputed from the validity bitmap over
    /// the new range.
    ///
    /// # Panics
    ///
    /// Panics if `offset + length > self.len()`.
    pub fn slice(&self, offset: usize, length: usize) -> ArrayData {
        assert!(
            offset.saturating_add(length) <= self.len,
            "the length + offset of the sliced ArrayData cannot exceed the existing length: offset={} length={} len={}",
            offset,
            length,
            self.len
        );
        let new_offset = self.offset + offset;
        let null_count = match (&self.data_type, &self.nulls) {
            (DataType::Null, _) => length,
            (_, Some(bitmap)) => length - bitmap.count_set_bits_offset(new_offset, length),
            (_, None) => 0,
        };
        Self {
            data_type: self.data_type,
            len: length,
            offset: new_offset,
            null_count,
            nulls: self.nulls.clone(),
            buffers: self.buffers.clone(),
        }
    }

    /// Returns true if this `ArrayData` is equal to `other`, using pointer comparisons
    /// to determine buffer equality. This is cheaper than `PartialEq::eq` but may
    /// return false when the arrays are logically equal
    pub fn ptr_eq(&self, other: &Self) -> bool {
        if self.offset != other.offset
            || self.len != other.len
            || self.data_type != other.data_type
            || self.null_count != other.null_count
            || self.buffers.len() != other.buffers.len()
        {
            return false;
        }

        let nulls_eq = match (&self.nulls, &other.nulls) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };

        nulls_eq
            && self
                .buffers
                .iter()
                .zip(other.buffers.iter())
                .all(|(a, b)| a.ptr_eq(b))
    }

    /// Returns the byte range of the values of a variable-width array's slot `i`
    pub(crate) fn value_range(&self, i: usize) -> Range<usize> {
        let offsets = self.typed_buffer::<i32>(0, self.len + 1);
        offsets.value(i) as usize..offsets.value(i + 1) as usize
    }

    fn check_buffer_len(&self, idx: usize, min_size: usize) -> Result<()> {
        let buffer = &self.buffers[idx];
        if buffer.len() < min_size {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Need at least {} bytes in buffers[{}] in array of type {:?}, but got {}",
                min_size,
                idx,
                self.data_type,
                buffer.len()
            )));
        }
        Ok(())
    }

    fn validate_offsets_and_values(&self) -> Result<()> {
        // An empty array may omit its offsets entirely
        if self.len == 0 && self.buffers[0].is_empty() {
            return Ok(());
        }
        let needed = (self.offset + self.len)
            .checked_add(1)
            .and_then(|n| n.checked_mul(i32::WIDTH))
            .ok_or_else(|| {
                QuiverError::InvalidArgumentError(format!(
                    "Length {} with offset {} overflows the size of an offsets buffer",
                    self.len, self.offset
                ))
            })?;
        self.check_buffer_len(0, needed)?;

        let offsets = self.typed_buffer::<i32>(0, self.len + 1);
        let values = &self.buffers[1];
        let first = offsets.value(0);
        if first < 0 {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Offset invariant failure: first offset {first} is negative"
            )));
        }

        let mut previous = first;
        for (i, next) in offsets.iter().enumerate().skip(1) {
            if next < previous {
                return Err(QuiverError::InvalidArgumentError(format!(
                    "Offset invariant failure: non-monotonic offset at slot {}: {} > {}",
                    i - 1,
                    previous,
                    next
                )));
            }
            if next as usize > values.len() {
                return Err(QuiverError::InvalidArgumentError(format!(
                    "Offset invariant failure: offset at index {} out of bounds: {} > {}",
                    i,
                    next,
                    values.len()
                )));
            }
            if self.data_type == DataType::Utf8 {
                let bytes = &values[previous as usize..next as usize];
                if std::str::from_utf8(bytes).is_err() {
                    return Err(QuiverError::InvalidArgumentError(format!(
                        "Invalid UTF8 sequence at string index {} ({:?})",
                        i - 1,
                        previous..next
                    )));
                }
            }
            previous = next;
        }
        Ok(())
    }
}

fn zeroed_bitmap(len: usize) -> Buffer {
    Buffer::from(vec![0_u8; bit_util::ceil(len, 8)])
}

impl PartialEq for ArrayData {
    fn eq(&self, other: &Self) -> bool {
        crate::equal::equal(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings() -> ArrayData {
        ArrayData::try_new(
            DataType::Utf8,
            5,
            Some(1),
            Some(Buffer::from([0b00011011_u8])),
            0,
            vec![
                Buffer::from_vec(vec![0_i32, 1, 1, 1, 3, 6]),
                Buffer::from_slice_ref(b"abbccc"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new() {
        let array_data = ArrayData::try_new(
            DataType::Boolean,
            16,
            None,
            None,
            5,
            vec![Buffer::from(vec![0_u8; 3])],
        )
        .unwrap();
        assert_eq!(array_data.len(), 16);
        assert_eq!(array_data.offset(), 5);
        assert_eq!(array_data.null_count(), 0);
        assert!(array_data.nulls().is_none());
        assert_eq!(array_data.buffers().len(), 1);
    }

    #[test]
    fn test_null_count() {
        let mut bit_v: [u8; 2] = [0; 2];
        bit_util::set_bit(&mut bit_v, 0);
        bit_util::set_bit(&mut bit_v, 3);
        bit_util::set_bit(&mut bit_v, 10);
        let arr_data = ArrayData::try_new(
            DataType::Int32,
            16,
            None,
            Some(Buffer::from(bit_v)),
            0,
            vec![Buffer::from_vec(vec![0_i32; 16])],
        )
        .unwrap();
        assert_eq!(13, arr_data.null_count());

        // Test with offset
        let arr_data = ArrayData::try_new(
            DataType::Int32,
            12,
            None,
            Some(Buffer::from(bit_v)),
            2,
            vec![Buffer::from_vec(vec![0_i32; 14])],
        )
        .unwrap();
        assert_eq!(10, arr_data.null_count());
    }

    #[test]
    fn test_slice_recomputes_null_count() {
        let data = strings();
        assert_eq!(data.null_count(), 1);

        let sliced = data.slice(1, 2);
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.offset(), 1);
        assert_eq!(sliced.null_count(), 1);
        assert!(sliced.is_valid(0));
        assert!(sliced.is_null(1));

        let sliced = sliced.slice(0, 1);
        assert_eq!(sliced.null_count(), 0);

        let tail = data.slice(3, 2);
        assert_eq!(tail.null_count(), 0);
        assert_eq!(tail.offset(), 3);
        assert!(tail.buffers()[1].ptr_eq(&data.buffers()[1]));
    }

    #[test]
    #[should_panic(expected = "the length + offset of the sliced ArrayData cannot exceed the existing length")]
    fn test_slice_out_of_bounds() {
        strings().slice(3, 3);
    }

    #[test]
    fn test_null_type() {
        let data = ArrayData::try_new(DataType::Null, 3, None, None, 0, vec![]).unwrap();
        assert_eq!(data.null_count(), 3);
        assert!(data.is_null(2));
        assert_eq!(data.slice(1, 1).null_count(), 1);

        let err = ArrayData::try_new(
            DataType::Null,
            3,
            None,
            Some(Buffer::from([0_u8])),
            0,
            vec![],
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot contain a null bitmap"));
    }

    #[test]
    fn test_wrong_buffer_count() {
        let err = ArrayData::try_new(DataType::Int32, 0, None, None, 0, vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: Expected 1 buffers in array of type Int32, got 0"
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let err = ArrayData::try_new(
            DataType::Int64,
            2,
            None,
            None,
            1,
            vec![Buffer::from_vec(vec![1_i64, 2])],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: Need at least 24 bytes in buffers[0] in array of type Int64, but got 16"
        );
    }

    #[test]
    fn test_offset_overflow() {
        let err = ArrayData::try_new(
            DataType::Int32,
            1,
            None,
            None,
            usize::MAX / 4,
            vec![Buffer::from_vec(vec![1_i32])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("overflows the size of a Int32 buffer"), "{err}");

        let err = ArrayData::try_new(
            DataType::Utf8,
            1,
            None,
            None,
            usize::MAX / 4,
            vec![Buffer::from_vec(vec![0_i32, 1]), Buffer::from(b"a".as_slice())],
        )
        .unwrap_err();
        assert!(err.to_string().contains("overflows the size of an offsets buffer"), "{err}");
    }

    #[test]
    fn test_bitmap_too_small() {
        let err = ArrayData::try_new(
            DataType::Int8,
            9,
            None,
            Some(Buffer::from([0xFF_u8])),
            0,
            vec![Buffer::from(vec![0_u8; 9])],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: null_bit_buffer size too small. got 1 needed 2"
        );
    }

    #[test]
    fn test_declared_null_count_mismatch() {
        let err = ArrayData::try_new(
            DataType::Int8,
            2,
            Some(1),
            None,
            0,
            vec![Buffer::from(vec![0_u8; 2])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("null_count value (1)"));
    }

    #[test]
    fn test_non_monotonic_offsets() {
        let err = ArrayData::try_new(
            DataType::Binary,
            2,
            None,
            None,
            0,
            vec![
                Buffer::from_vec(vec![0_i32, 3, 2]),
                Buffer::from_slice_ref(b"abc"),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("non-monotonic offset"), "{err}");
    }

    #[test]
    fn test_offsets_out_of_bounds() {
        let err = ArrayData::try_new(
            DataType::Binary,
            1,
            None,
            None,
            0,
            vec![Buffer::from_vec(vec![0_i32, 4]), Buffer::from_slice_ref(b"abc")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of bounds"), "{err}");
    }

    #[test]
    fn test_invalid_utf8() {
        let values = Buffer::from(vec![b'a', 0xFF]);
        let offsets = Buffer::from_vec(vec![0_i32, 1, 2]);
        let err = ArrayData::try_new(
            DataType::Utf8,
            2,
            None,
            None,
            0,
            vec![offsets.clone(), values.clone()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid UTF8 sequence at string index 1"));

        // the same bytes are acceptable as binary
        ArrayData::try_new(DataType::Binary, 2, None, None, 0, vec![offsets, values]).unwrap();
    }

    #[test]
    fn test_non_zero_first_offset() {
        let data = ArrayData::try_new(
            DataType::Utf8,
            2,
            None,
            None,
            1,
            vec![
                Buffer::from_vec(vec![0_i32, 2, 3, 5]),
                Buffer::from_slice_ref(b"xxyzz"),
            ],
        )
        .unwrap();
        assert_eq!(data.value_range(0), 2..3);
        assert_eq!(data.value_range(1), 3..5);
    }

    #[test]
    fn test_new_empty_and_null() {
        for data_type in [DataType::Null, DataType::Boolean, DataType::Float64, DataType::Utf8] {
            let empty = ArrayData::new_empty(&data_type);
            assert!(empty.is_empty());
            assert_eq!(empty.null_count(), 0);

            let nulls = ArrayData::new_null(&data_type, 10);
            assert_eq!(nulls.len(), 10);
            assert_eq!(nulls.null_count(), 10);
            assert!((0..10).all(|i| nulls.is_null(i)));

            // both are valid under full validation
            ArrayData::try_new(
                data_type,
                nulls.len(),
                Some(nulls.null_count()),
                nulls.nulls().cloned(),
                0,
                nulls.buffers().to_vec(),
            )
            .unwrap();
        }
    }

    #[test]
    fn test_layout_buffers_order() {
        let data = strings();
        let buffers: Vec<_> = data.layout_buffers().collect();
        assert_eq!(buffers.len(), 3);
        assert!(buffers[0].ptr_eq(data.nulls().unwrap()));
        assert!(buffers[1].ptr_eq(&data.buffers()[0]));
        assert_eq!(data.get_buffer_memory_size(), 1 + 24 + 6);
    }

    #[test]
    fn test_ptr_eq() {
        let data = strings();
        assert!(data.ptr_eq(&data.clone()));
        assert!(!data.ptr_eq(&data.slice(1, 3)));
        assert!(data.slice(1, 3).ptr_eq(&data.slice(1, 3)));
    }
}
