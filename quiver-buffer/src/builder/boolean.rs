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

use crate::bit_util;
use crate::Buffer;

/// Builder for a bit-packed [`Buffer`], least significant bit first
#[derive(Debug, Default)]
pub struct BooleanBufferBuilder {
    buffer: Vec<u8>,
    len: usize,
}

impl BooleanBufferBuilder {
    /// Creates a new `BooleanBufferBuilder` with sufficient space for
    /// `capacity` bits
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bit_util::ceil(capacity, 8)),
            len: 0,
        }
    }

    /// Returns the length of the buffer in bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the internal buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn advance(&mut self, additional: usize) {
        let new_len = self.len + additional;
        self.buffer.resize(bit_util::ceil(new_len, 8), 0);
        self.len = new_len;
    }

    /// Appends a boolean `v` into the buffer
    #[inline]
    pub fn append(&mut self, v: bool) {
        self.advance(1);
        if v {
            bit_util::set_bit(&mut self.buffer, self.len - 1);
        }
    }

    /// Appends `n` `additional` bits of value `v` into the buffer
    pub fn append_n(&mut self, additional: usize, v: bool) {
        let start = self.len;
        self.advance(additional);
        if v {
            (start..self.len).for_each(|i| bit_util::set_bit(&mut self.buffer, i));
        }
    }

    /// Appends a slice of booleans into the buffer
    pub fn append_slice(&mut self, slice: &[bool]) {
        slice.iter().for_each(|v| self.append(*v))
    }

    /// Resets this builder and returns an immutable [`Buffer`].
    pub fn finish(&mut self) -> Buffer {
        self.len = 0;
        Buffer::from(std::mem::take(&mut self.buffer))
    }
}
