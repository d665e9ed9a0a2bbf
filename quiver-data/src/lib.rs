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

//! Low-level array data abstractions for the quiver columnar format.
//!
//! [`ArrayData`] is the canonical, validated description of an array: its
//! data type, logical length and offset, null count and the [`Buffer`]s that
//! hold its values. Typed array views in `quiver-array` wrap one `ArrayData`.
//!
//! [`Buffer`]: quiver_buffer::Buffer

#![warn(missing_docs)]

mod data;
pub use data::*;

mod equal;
pub use equal::equal;
