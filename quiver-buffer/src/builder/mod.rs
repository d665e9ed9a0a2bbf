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

//! Append-only builders producing immutable [`Buffer`]s.
//!
//! A builder exposes no read access to its contents. Bytes only become
//! readable once [`finish`](BufferBuilder::finish) has frozen them into a
//! [`Buffer`].

mod boolean;
pub use boolean::*;
mod null;
pub use null::*;

use std::marker::PhantomData;

use bytes::{BufMut, BytesMut};

use crate::{Buffer, NativeType};

/// Builder for creating a [`Buffer`] of [`NativeType`] values
///
/// ```
/// # use quiver_buffer::{BufferBuilder, ScalarBuffer};
/// let mut builder = BufferBuilder::<u8>::new(100);
/// builder.append_slice(&[42, 43, 44]);
/// builder.append(45);
/// let buffer = builder.finish();
///
/// assert_eq!(buffer.as_slice(), &[42, 43, 44, 45]);
/// ```
#[derive(Debug)]
pub struct BufferBuilder<T: NativeType> {
    buffer: BytesMut,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: NativeType> BufferBuilder<T> {
    /// Creates a new builder with initial capacity for _at least_ `capacity`
    /// elements of type `T`.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity * T::WIDTH),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the current number of array elements in the internal buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the internal buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `n` zero-initialized values
    pub fn append_n_zeroed(&mut self, n: usize) {
        self.buffer.put_bytes(0, n * T::WIDTH);
        self.len += n;
    }

    /// Appends a value of type `T` into the builder
    #[inline]
    pub fn append(&mut self, v: T) {
        let mut encoded = Vec::with_capacity(T::WIDTH);
        v.write_le(&mut encoded);
        self.buffer.extend_from_slice(&encoded);
        self.len += 1;
    }

    /// Appends a value of type `T` into the builder `n` times
    pub fn append_n(&mut self, n: usize, v: T) {
        let mut encoded = Vec::with_capacity(T::WIDTH);
        v.write_le(&mut encoded);
        self.buffer.reserve(n * T::WIDTH);
        for _ in 0..n {
            self.buffer.extend_from_slice(&encoded);
        }
        self.len += n;
    }

    /// Appends a slice of type `T`
    pub fn append_slice(&mut self, slice: &[T]) {
        let mut encoded = Vec::with_capacity(slice.len() * T::WIDTH);
        slice.iter().for_each(|v| v.write_le(&mut encoded));
        self.buffer.extend_from_slice(&encoded);
        self.len += slice.len();
    }

    /// Resets this builder and returns an immutable [`Buffer`].
    pub fn finish(&mut self) -> Buffer {
        self.len = 0;
        Buffer::from_bytes(self.buffer.split().freeze())
    }
}

impl<T: NativeType> Default for BufferBuilder<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: NativeType> Extend<T> for BufferBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|v| self.append(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarBuffer;

    #[test]
    fn test_append_values() {
        let mut builder = BufferBuilder::<i32>::new(4);
        builder.append(1);
        builder.append_n(2, 7);
        builder.append_slice(&[-1, -2]);
        builder.append_n_zeroed(1);
        assert_eq!(builder.len(), 6);

        let buffer = builder.finish();
        assert_eq!(buffer.len(), 24);
        let typed = ScalarBuffer::<i32>::new(buffer, 0, 6);
        assert_eq!(typed.to_vec(), vec![1, 7, 7, -1, -2, 0]);
    }

    #[test]
    fn test_finish_resets() {
        let mut builder = BufferBuilder::<u16>::default();
        builder.extend([1, 2, 3]);
        let first = builder.finish();
        assert_eq!(first.len(), 6);
        assert!(builder.is_empty());

        builder.append(9);
        let second = builder.finish();
        assert_eq!(second.as_slice(), &[9, 0]);
        assert_eq!(first.len(), 6);
    }
}
