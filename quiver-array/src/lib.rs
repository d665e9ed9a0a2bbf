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

//! The central type in quiver columnar data is [`Array`], a closed set of
//! views over one validated [`ArrayData`]:
//!
//! * [`Array::Null`] for arrays of [`DataType::Null`]
//! * [`Array::FixedWidth`] for bit-packed booleans and fixed-width primitives
//! * [`Array::VariableWidth`] for UTF-8 strings and binary values
//!
//! Typed access goes through [`PrimitiveArray`], [`BooleanArray`],
//! [`StringArray`] and [`BinaryArray`], obtained with the checked `as_*`
//! downcasts on [`Array`] or built directly from Rust values:
//!
//! ```
//! # use quiver_array::{Array, Int32Array, StringArray};
//! let array: Array = Int32Array::from(vec![Some(1), None, Some(3)]).into();
//! assert_eq!(array.len(), 3);
//! assert_eq!(array.null_count(), 1);
//!
//! let ints = array.as_primitive::<quiver_array::types::Int32Type>().unwrap();
//! assert_eq!(ints.value(2), 3);
//!
//! let strings = StringArray::from(vec!["a", "bb"]);
//! assert_eq!(strings.value(1), "bb");
//! ```
//!
//! Arrays are combined into a [`ChunkedArray`] (one logical column made of
//! several arrays), a [`Column`] (a chunked array with its [`Field`]), a
//! [`RecordBatch`] (equal-length arrays under a [`Schema`]) and a [`Table`]
//! (columns under a schema).
//!
//! [`DataType::Null`]: quiver_schema::DataType::Null
//! [`Field`]: quiver_schema::Field
//! [`Schema`]: quiver_schema::Schema

#![warn(missing_docs)]

pub mod array;
pub use array::*;

mod chunked_array;
pub use chunked_array::ChunkedArray;

mod column;
pub use column::Column;

mod record_batch;
pub use record_batch::{RecordBatch, RecordBatchOptions};

mod table;
pub use table::Table;

pub mod types;

pub use quiver_data::ArrayData;
