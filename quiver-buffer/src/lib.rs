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

//! Low-level buffer abstractions for the quiver columnar format.
//!
//! A [`Buffer`] is an immutable, reference counted region of bytes that can be
//! sliced without copying. Buffers are produced by the append-only builders in
//! [`builder`], which must be finished before their contents can be read.

#![warn(missing_docs)]

pub mod buffer;
pub use buffer::*;

pub mod builder;
pub use builder::*;

mod native;
pub use native::*;

pub mod util;
pub use util::*;

pub use half::f16;
