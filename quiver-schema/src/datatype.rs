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

use std::fmt;

/// The set of logical types supported by the quiver columnar format.
///
/// Each variant determines the physical layout of an array of that type:
/// fixed-width types store one values buffer, variable-width types store an
/// offsets buffer followed by a values buffer, and [`DataType::Null`] stores
/// no buffers at all.
///
/// Nested and dictionary-encoded types are not part of this catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Null type, every slot is null and no memory is allocated
    Null,
    /// A boolean datatype representing the values `true` and `false`, bit-packed
    Boolean,
    /// A signed 8-bit integer.
    Int8,
    /// A signed 16-bit integer.
    Int16,
    /// A signed 32-bit integer.
    Int32,
    /// A signed 64-bit integer.
    Int64,
    /// An unsigned 8-bit integer.
    UInt8,
    /// An unsigned 16-bit integer.
    UInt16,
    /// An unsigned 32-bit integer.
    UInt32,
    /// An unsigned 64-bit integer.
    UInt64,
    /// A 16-bit floating point number.
    Float16,
    /// A 32-bit floating point number.
    Float32,
    /// A 64-bit floating point number.
    Float64,
    /// A 32-bit date representing the elapsed time since UNIX epoch (1970-01-01)
    /// in days.
    Date32,
    /// A 64-bit date representing the elapsed time since UNIX epoch (1970-01-01)
    /// in milliseconds.
    Date64,
    /// A variable-length string in Unicode with UTF-8 encoding, 32-bit offsets.
    Utf8,
    /// Opaque binary data of variable length, 32-bit offsets.
    Binary,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl DataType {
    /// Returns true if this type is numeric: (UInt*, Int*, Float*).
    #[inline]
    pub fn is_numeric(&self) -> bool {
        use DataType::*;
        matches!(
            self,
            UInt8 | UInt16 | UInt32 | UInt64 | Int8 | Int16 | Int32 | Int64 | Float16 | Float32
                | Float64
        )
    }

    /// Returns true if this type stores one fixed-size value per slot,
    /// including the bit-packed [`DataType::Boolean`]
    #[inline]
    pub fn is_fixed_width(&self) -> bool {
        self.bit_width().is_some()
    }

    /// Returns true if this type stores values through an offsets buffer
    #[inline]
    pub fn is_variable_width(&self) -> bool {
        matches!(self, DataType::Utf8 | DataType::Binary)
    }

    /// Returns the number of bits one value of a fixed-width type occupies,
    /// or `None` for [`DataType::Null`] and variable-width types
    pub fn bit_width(&self) -> Option<usize> {
        use DataType::*;
        match self {
            Boolean => Some(1),
            Int8 | UInt8 => Some(8),
            Int16 | UInt16 | Float16 => Some(16),
            Int32 | UInt32 | Float32 | Date32 => Some(32),
            Int64 | UInt64 | Float64 | Date64 => Some(64),
            Null | Utf8 | Binary => None,
        }
    }

    /// Returns the byte width of a fixed-width type whose values occupy whole
    /// bytes, or `None` otherwise
    pub fn primitive_width(&self) -> Option<usize> {
        match self.bit_width() {
            Some(bits) if bits % 8 == 0 => Some(bits / 8),
            _ => None,
        }
    }
}
