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

use crate::{BooleanBufferBuilder, Buffer};

/// Builder for creating a validity bitmap.
///
/// The bitmap is only materialized once a null is appended. If every appended
/// slot is valid, [`finish`](Self::finish) returns `None`, which is how an
/// array without nulls is represented.
#[derive(Debug)]
pub struct NullBufferBuilder {
    bitmap_builder: Option<BooleanBufferBuilder>,
    /// Number of slots appended while the bitmap was not yet materialized
    len: usize,
    capacity: usize,
}

impl NullBufferBuilder {
    /// Creates a new empty builder with room for `capacity` slots
    pub fn new(capacity: usize) -> Self {
        Self {
            bitmap_builder: None,
            len: 0,
            capacity,
        }
    }

    /// Appends `n` `true`s into the builder
    #[inline]
    pub fn append_n_non_nulls(&mut self, n: usize) {
        match self.bitmap_builder.as_mut() {
            Some(buf) => buf.append_n(n, true),
            None => self.len += n,
        }
    }

    /// Appends a `true` into the builder
    #[inline]
    pub fn append_non_null(&mut self) {
        self.append_n_non_nulls(1)
    }

    /// Appends `n` `false`s into the builder
    #[inline]
    pub fn append_n_nulls(&mut self, n: usize) {
        self.materialize_if_needed().append_n(n, false);
    }

    /// Appends a `false` into the builder
    #[inline]
    pub fn append_null(&mut self) {
        self.append_n_nulls(1)
    }

    /// Appends a boolean value into the builder
    #[inline]
    pub fn append(&mut self, not_null: bool) {
        if not_null {
            self.append_non_null()
        } else {
            self.append_null()
        }
    }

    /// Appends a boolean slice into the builder
    pub fn append_slice(&mut self, slice: &[bool]) {
        if slice.iter().any(|v| !v) {
            self.materialize_if_needed().append_slice(slice)
        } else {
            self.append_n_non_nulls(slice.len())
        }
    }

    /// Builds the validity bitmap and resets the builder.
    ///
    /// Returns `None` if no null was appended.
    pub fn finish(&mut self) -> Option<Buffer> {
        self.len = 0;
        Some(self.bitmap_builder.take()?.finish())
    }

    /// Returns the number of slots appended so far
    pub fn len(&self) -> usize {
        self.bitmap_builder.as_ref().map_or(self.len, |b| b.len())
    }

    /// Returns true if no slot was appended
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn materialize_if_needed(&mut self) -> &mut BooleanBufferBuilder {
        let (len, capacity) = (self.len, self.capacity);
        self.bitmap_builder.get_or_insert_with(|| {
            let mut b = BooleanBufferBuilder::new(len.max(capacity));
            b.append_n(len, true);
            b
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_buffer_builder() {
        let mut builder = NullBufferBuilder::new(0);
        builder.append_null();
        builder.append_non_null();
        builder.append_n_nulls(2);
        builder.append_n_non_nulls(2);
        assert_eq!(6, builder.len());

        let buf = builder.finish().unwrap();
        assert_eq!(&[0b110010_u8], buf.as_slice());
    }

    #[test]
    fn test_null_buffer_builder_all_nulls() {
        let mut builder = NullBufferBuilder::new(0);
        builder.append_null();
        builder.append_null();
        builder.append_slice(&[false, false, false]);
        assert_eq!(5, builder.len());

        let buf = builder.finish().unwrap();
        assert_eq!(&[0b0_u8], buf.as_slice());
    }

    #[test]
    fn test_null_buffer_builder_no_null() {
        let mut builder = NullBufferBuilder::new(0);
        builder.append_non_null();
        builder.append_non_null();
        builder.append_slice(&[true, true, true]);
        assert_eq!(5, builder.len());

        let buf = builder.finish();
        assert!(buf.is_none());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_null_buffer_builder_materialize_late() {
        let mut builder = NullBufferBuilder::new(8);
        builder.append_n_non_nulls(9);
        builder.append_null();
        assert_eq!(10, builder.len());

        let buf = builder.finish().unwrap();
        assert_eq!(&[0b11111111_u8, 0b00000001], buf.as_slice());
        assert_eq!(buf.count_set_bits_offset(0, 10), 9);
    }
}
