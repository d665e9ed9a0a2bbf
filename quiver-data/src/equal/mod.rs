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

//! Module containing functionality to compute array equality.
//! This module uses [ArrayData] and does not
//! depend on the typed array views.

use crate::data::{ArrayData, DataTypeLayout};

mod fixed_width;
mod utils;
mod variable_size;

// these methods assume the same type, len and null count.
// For this reason, they are not exposed and are instead used
// to build the generic functions below (`equal_range` and `equal`).
use fixed_width::{boolean_equal, fixed_width_equal};
use variable_size::variable_sized_equal;

/// Compares the values of two [ArrayData] starting at `lhs_start` and `rhs_start` respectively
/// for `len` slots.
#[inline]
fn equal_values(
    lhs: &ArrayData,
    rhs: &ArrayData,
    lhs_start: usize,
    rhs_start: usize,
    len: usize,
) -> bool {
    match lhs.layout() {
        DataTypeLayout::Null => true,
        DataTypeLayout::FixedWidth { bit_width: 1 } => {
            boolean_equal(lhs, rhs, lhs_start, rhs_start, len)
        }
        DataTypeLayout::FixedWidth { bit_width } => {
            fixed_width_equal(lhs, rhs, bit_width / 8, lhs_start, rhs_start, len)
        }
        DataTypeLayout::VariableWidth => variable_sized_equal(lhs, rhs, lhs_start, rhs_start, len),
    }
}

/// Logically compares two [ArrayData].
///
/// Two arrays are logically equal if and only if:
/// * their data types are equal
/// * their lengths are equal
/// * their null counts are equal
/// * their null bitmaps are equal over their logical ranges
/// * each of their non-null items are equal
///
/// Offsets and the bytes behind null slots are not compared, so a sliced
/// array equals a freshly built array holding the same values.
/// Two items are equal when their in-memory representation is physically equal
/// (i.e. has the same bit content).
pub fn equal(lhs: &ArrayData, rhs: &ArrayData) -> bool {
    utils::base_equal(lhs, rhs)
        && lhs.null_count() == rhs.null_count()
        && utils::equal_nulls(lhs, rhs, 0, 0, lhs.len())
        && equal_values(lhs, rhs, 0, 0, lhs.len())
}
