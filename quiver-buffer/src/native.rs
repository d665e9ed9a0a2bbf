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

use half::f16;
use std::fmt::Debug;

mod private {
    pub trait Sealed {}
}

/// A fixed-width primitive value that can be stored in a [`Buffer`](crate::Buffer).
///
/// Values are always stored little-endian and decoded with [`Self::from_le_slice`],
/// so a buffer places no alignment requirement on its storage. This matters for
/// buffers sliced out of an IPC message body, which are packed back to back.
///
/// This trait is sealed and cannot be implemented outside this crate.
pub trait NativeType:
    Copy + Debug + Default + PartialEq + PartialOrd + Send + Sync + 'static + private::Sealed
{
    /// The width of one value in bytes
    const WIDTH: usize = std::mem::size_of::<Self>();

    /// Decodes a value from exactly [`Self::WIDTH`] little-endian bytes
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != Self::WIDTH`
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Appends the little-endian encoding of this value to `out`
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! native_type {
    ($($t:ty),+) => {
        $(
            impl private::Sealed for $t {}

            impl NativeType for $t {
                #[inline]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0_u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes())
                }
            }
        )+
    };
}

native_type!(i8, i16, i32, i64, u8, u16, u32, u64, f16, f32, f64);
