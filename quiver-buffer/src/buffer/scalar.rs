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

use std::fmt::Formatter;
use std::marker::PhantomData;

use crate::buffer::Buffer;
use crate::native::NativeType;

/// A typed, fixed-stride view over a [`Buffer`] of [`NativeType`] values.
///
/// Values are decoded on access, so the underlying bytes may start at any
/// address.
///
/// ```
/// # use quiver_buffer::ScalarBuffer;
/// let buffer = ScalarBuffer::from(vec![1_i32, 2, 3, 4]);
/// let sliced = buffer.slice(1, 2);
/// assert_eq!(sliced.iter().collect::<Vec<_>>(), vec![2, 3]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ScalarBuffer<T: NativeType> {
    buffer: Buffer,
    phantom: PhantomData<T>,
}

impl<T: NativeType> std::fmt::Debug for ScalarBuffer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScalarBuffer").field(&self.to_vec()).finish()
    }
}

impl<T: NativeType> ScalarBuffer<T> {
    /// Create a new [`ScalarBuffer`] from a [`Buffer`], and an `offset`
    /// and `len` in units of `T`
    ///
    /// # Panics
    ///
    /// This method will panic if the range of `len` values starting at
    /// `offset` is out of bounds of `buffer`
    pub fn new(buffer: Buffer, offset: usize, len: usize) -> Self {
        let byte_offset = offset.checked_mul(T::WIDTH).expect("offset overflow");
        let byte_len = len.checked_mul(T::WIDTH).expect("length overflow");
        Self {
            buffer: buffer.slice_with_length(byte_offset, byte_len),
            phantom: Default::default(),
        }
    }

    /// Returns the number of values in this buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len() / T::WIDTH
    }

    /// Returns true if this buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the value at index `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`
    #[inline]
    pub fn value(&self, i: usize) -> T {
        assert!(
            i < self.len(),
            "Trying to access an element at index {} from a ScalarBuffer of length {}",
            i,
            self.len()
        );
        let start = i * T::WIDTH;
        T::from_le_slice(&self.buffer[start..start + T::WIDTH])
    }

    /// Returns an iterator over the values of this buffer
    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + '_ {
        self.buffer.chunks_exact(T::WIDTH).map(T::from_le_slice)
    }

    /// Returns a zero-copy slice of this buffer with length `len` and starting at `offset`
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        Self::new(self.buffer.clone(), offset, len)
    }

    /// Decodes the values of this buffer into a [`Vec`]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Returns the inner [`Buffer`]
    pub fn inner(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns the inner [`Buffer`], consuming self
    pub fn into_inner(self) -> Buffer {
        self.buffer
    }
}

impl<T: NativeType> From<Vec<T>> for ScalarBuffer<T> {
    fn from(value: Vec<T>) -> Self {
        Self {
            buffer: Buffer::from_vec(value),
            phantom: Default::default(),
        }
    }
}

impl<T: NativeType> FromIterator<T> for ScalarBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}
