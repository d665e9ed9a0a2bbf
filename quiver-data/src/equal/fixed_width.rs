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

use super::utils::equal_bits;
use crate::data::ArrayData;

pub(super) fn boolean_equal(
    lhs: &ArrayData,
    rhs: &ArrayData,
    lhs_start: usize,
    rhs_start: usize,
    len: usize,
) -> bool {
    let lhs_values = lhs.buffers()[0].as_slice();
    let rhs_values = rhs.buffers()[0].as_slice();
    let lhs_bit = lhs.offset() + lhs_start;
    let rhs_bit = rhs.offset() + rhs_start;

    if lhs.null_count() == 0 {
        return equal_bits(lhs_values, rhs_values, lhs_bit, rhs_bit, len);
    }
    (0..len).all(|i| {
        lhs.is_null(lhs_start + i)
            || equal_bits(lhs_values, rhs_values, lhs_bit + i, rhs_bit + i, 1)
    })
}

pub(super) fn fixed_width_equal(
    lhs: &ArrayData,
    rhs: &ArrayData,
    byte_width: usize,
    lhs_start: usize,
    rhs_start: usize,
    len: usize,
) -> bool {
    let lhs_values = &lhs.buffers()[0][(lhs.offset() + lhs_start) * byte_width..];
    let rhs_values = &rhs.buffers()[0][(rhs.offset() + rhs_start) * byte_width..];

    if lhs.null_count() == 0 {
        let bytes = len * byte_width;
        return lhs_values[..bytes] == rhs_values[..bytes];
    }
    (0..len).all(|i| {
        let range = i * byte_width..(i + 1) * byte_width;
        lhs.is_null(lhs_start + i) || lhs_values[range.clone()] == rhs_values[range]
    })
}
