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

//! Utils for working with bits

/// Returns whether bit at position `i` in `data` is set or not
#[inline]
pub fn get_bit(data: &[u8], i: usize) -> bool {
    data[i / 8] & (1 << (i % 8)) != 0
}

/// Sets bit at position `i` for `data` to 1
#[inline]
pub fn set_bit(data: &mut [u8], i: usize) {
    data[i / 8] |= 1 << (i % 8);
}

/// Sets bit at position `i` for `data` to 0
#[inline]
pub fn unset_bit(data: &mut [u8], i: usize) {
    data[i / 8] &= !(1 << (i % 8));
}

/// Returns the ceil of `value`/`divisor`
#[inline]
pub fn ceil(value: usize, divisor: usize) -> usize {
    value.div_ceil(divisor)
}

/// Returns the nearest multiple of `factor` that is `>=` than `num`. Here `factor` must
/// be a power of 2.
pub fn round_upto_power_of_2(num: usize, factor: usize) -> usize {
    debug_assert!(factor > 0 && factor.is_power_of_two());
    num.checked_add(factor - 1)
        .expect("failed to round to next highest power of 2")
        & !(factor - 1)
}

/// Returns the number of 1-bits in `data`, starting from `offset` with `len` bits
/// inspected.
///
/// # Panics
///
/// Panics if `data` holds fewer than `offset + len` bits
pub fn count_set_bits_offset(data: &[u8], offset: usize, len: usize) -> usize {
    let end = offset + len;
    assert!(
        ceil(end, 8) <= data.len(),
        "bitmap of {} bytes is too small to count {} bits at offset {}",
        data.len(),
        len,
        offset
    );

    let mut count = 0;
    let mut i = offset;
    while i < end && i % 8 != 0 {
        count += get_bit(data, i) as usize;
        i += 1;
    }
    while i + 8 <= end {
        count += data[i / 8].count_ones() as usize;
        i += 8;
    }
    while i < end {
        count += get_bit(data, i) as usize;
        i += 1;
    }
    count
}
