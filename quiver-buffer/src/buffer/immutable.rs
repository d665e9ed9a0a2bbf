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
use std::ops::Deref;

use bytes::Bytes;

use crate::bit_util;
use crate::native::NativeType;

/// A contiguous, immutable memory region that can be shared with other buffers
/// and across thread boundaries.
///
/// Cloning a [`Buffer`] and slicing it are both `O(1)`: every clone and slice
/// references the same underlying allocation.
///
/// ```
/// # use quiver_buffer::Buffer;
/// let buffer = Buffer::from_vec(vec![1_i32, 2, 3]);
/// assert_eq!(buffer.len(), 12);
///
/// let sliced = buffer.slice(4);
/// assert_eq!(sliced.as_slice(), &[2, 0, 0, 0, 3, 0, 0, 0]);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Buffer {
    data: Bytes,
}

impl Buffer {
    /// Creates a [`Buffer`] from an existing [`Bytes`] without copying
    pub fn from_bytes(data: Bytes) -> Self {
        Self { data }
    }

    /// Creates a [`Buffer`] holding the little-endian encoding of `vec`
    pub fn from_vec<T: NativeType>(vec: Vec<T>) -> Self {
        Self::from_slice_ref(vec)
    }

    /// Creates a [`Buffer`] by copying the little-endian encoding of `items`
    pub fn from_slice_ref<T: NativeType, U: AsRef<[T]>>(items: U) -> Self {
        let items = items.as_ref();
        let mut out = Vec::with_capacity(items.len() * T::WIDTH);
        items.iter().for_each(|v| v.write_le(&mut out));
        Self::from(out)
    }

    /// Returns the number of bytes in the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the byte slice stored in this buffer
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns a new [`Buffer`] that is a slice of this buffer starting at `offset`.
    ///
    /// This does not copy the data.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is larger than `len`
    pub fn slice(&self, offset: usize) -> Self {
        assert!(
            offset <= self.len(),
            "the offset of the new Buffer cannot exceed the existing length: offset={} length={}",
            offset,
            self.len()
        );
        Self {
            data: self.data.slice(offset..),
        }
    }

    /// Returns a new [`Buffer`] that is a slice of this buffer starting at `offset`,
    /// with `length` bytes.
    ///
    /// This does not copy the data.
    ///
    /// # Panics
    ///
    /// Panics if `(offset + length)` is larger than the existing length
    pub fn slice_with_length(&self, offset: usize, length: usize) -> Self {
        assert!(
            offset.saturating_add(length) <= self.len(),
            "the offset of the new Buffer cannot exceed the existing length: slice offset={offset} length={length} selflen={}",
            self.len()
        );
        Self {
            data: self.data.slice(offset..offset + length),
        }
    }

    /// Advances the start of this buffer by `offset` bytes, in place.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is larger than `len`
    pub fn advance(&mut self, offset: usize) {
        assert!(
            offset <= self.len(),
            "the offset of the new Buffer cannot exceed the existing length: offset={} length={}",
            offset,
            self.len()
        );
        self.data = self.data.slice(offset..);
    }

    /// Returns true if this buffer and `other` reference the same bytes
    /// of the same allocation.
    ///
    /// Unlike `==`, this never inspects the contents.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.data.as_ptr() == other.data.as_ptr() && self.len() == other.len()
    }

    /// Returns the number of 1-bits in this buffer, starting from `offset` with `len` bits
    /// inspected. Note that both `offset` and `length` are measured in bits.
    pub fn count_set_bits_offset(&self, offset: usize, len: usize) -> usize {
        bit_util::count_set_bits_offset(self.as_slice(), offset, len)
    }

    /// Returns the underlying [`Bytes`]
    pub fn into_inner(self) -> Bytes {
        self.data
    }
}

impl Debug for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("data", &self.as_slice())
            .finish()
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Bytes> for Buffer {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(vec: Vec<u8>) -> Self {
        Self { data: vec.into() }
    }
}

impl From<&[u8]> for Buffer {
    fn from(slice: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(slice),
        }
    }
}

impl<const N: usize> From<[u8; N]> for Buffer {
    fn from(array: [u8; N]) -> Self {
        Self::from(array.to_vec())
    }
}

/// Creates a bit-packed buffer, least significant bit first
impl FromIterator<bool> for Buffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut builder = crate::BooleanBufferBuilder::new(0);
        iter.into_iter().for_each(|v| builder.append(v));
        builder.finish()
    }
}
