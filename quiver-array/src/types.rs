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

//! Zero-sized types used to parameterize generic array implementations

use half::f16;
use quiver_buffer::NativeType;
use quiver_schema::DataType;

/// A fixed-width primitive type stored one [`NativeType`] per slot
pub trait PrimitiveType: 'static + Send + Sync {
    /// Corresponding Rust native type for the primitive type.
    type Native: NativeType;

    /// the corresponding quiver data type of this primitive type.
    const DATA_TYPE: DataType;
}

macro_rules! make_type {
    ($name:ident, $native_ty:ty, $data_ty:expr, $doc_string: literal) => {
        #[derive(Debug)]
        #[doc = $doc_string]
        pub struct $name {}

        impl PrimitiveType for $name {
            type Native = $native_ty;
            const DATA_TYPE: DataType = $data_ty;
        }
    };
}

make_type!(Int8Type, i8, DataType::Int8, "A signed 8-bit integer type.");
make_type!(Int16Type, i16, DataType::Int16, "A signed 16-bit integer type.");
make_type!(Int32Type, i32, DataType::Int32, "A signed 32-bit integer type.");
make_type!(Int64Type, i64, DataType::Int64, "A signed 64-bit integer type.");
make_type!(UInt8Type, u8, DataType::UInt8, "An unsigned 8-bit integer type.");
make_type!(UInt16Type, u16, DataType::UInt16, "An unsigned 16-bit integer type.");
make_type!(UInt32Type, u32, DataType::UInt32, "An unsigned 32-bit integer type.");
make_type!(UInt64Type, u64, DataType::UInt64, "An unsigned 64-bit integer type.");
make_type!(Float16Type, f16, DataType::Float16, "A 16-bit floating point number type.");
make_type!(Float32Type, f32, DataType::Float32, "A 32-bit floating point number type.");
make_type!(Float64Type, f64, DataType::Float64, "A 64-bit floating point number type.");
make_type!(
    Date32Type,
    i32,
    DataType::Date32,
    "A 32-bit date type representing the elapsed time since UNIX epoch in days(32 bits)."
);
make_type!(
    Date64Type,
    i64,
    DataType::Date64,
    "A 64-bit date type representing the elapsed time since UNIX epoch in milliseconds(64 bits)."
);

/// Crate private types for byte arrays
///
/// Not intended to be used outside this crate
pub(crate) mod bytes {
    pub trait ByteArrayTypeSealed {}
    impl ByteArrayTypeSealed for super::Utf8Type {}
    impl ByteArrayTypeSealed for super::BinaryType {}

    pub trait ByteArrayNativeType: std::fmt::Debug + Send + Sync {
        /// # Safety
        ///
        /// `b` must be a valid byte sequence for `Self`
        unsafe fn from_bytes_unchecked(b: &[u8]) -> &Self;
    }

    impl ByteArrayNativeType for [u8] {
        unsafe fn from_bytes_unchecked(b: &[u8]) -> &Self {
            b
        }
    }

    impl ByteArrayNativeType for str {
        unsafe fn from_bytes_unchecked(b: &[u8]) -> &Self {
            std::str::from_utf8_unchecked(b)
        }
    }
}

/// A trait over the variable-width byte array types
pub trait ByteArrayType: 'static + Send + Sync + bytes::ByteArrayTypeSealed {
    /// Type for representing its equivalent rust type i.e
    /// a string array has native type `str`,
    /// a binary array has native type `[u8]`
    type Native: bytes::ByteArrayNativeType + AsRef<[u8]> + ?Sized;
    /// "Binary" or "String", for use in error messages
    const PREFIX: &'static str;
    /// Datatype of array elements
    const DATA_TYPE: DataType;
}

/// [`ByteArrayType`] for UTF-8 string arrays
#[derive(Debug)]
pub struct Utf8Type {}

impl ByteArrayType for Utf8Type {
    type Native = str;
    const PREFIX: &'static str = "String";
    const DATA_TYPE: DataType = DataType::Utf8;
}

/// [`ByteArrayType`] for binary arrays
#[derive(Debug)]
pub struct BinaryType {}

impl ByteArrayType for BinaryType {
    type Native = [u8];
    const PREFIX: &'static str = "Binary";
    const DATA_TYPE: DataType = DataType::Binary;
}
