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

//! Arrays and the containers built from them
//!
//! Every array is an [`Array`] over one validated [`ArrayData`]. The typed
//! arrays such as [`Int32Array`] or [`StringArray`] borrow or build one.
//!
//! [`ChunkedArray`], [`Column`] and [`Table`] describe a column split over
//! several arrays, for example the batches of a stream:
//!
//! ```
//! # use std::sync::Arc;
//! # use quiver::array::{Int64Array, Table};
//! # use quiver::datatypes::{DataType, Field, Schema};
//! # use quiver::record_batch::RecordBatch;
//! let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
//! let batches = [
//!     RecordBatch::try_new(schema.clone(), vec![Int64Array::from(vec![1, 2]).into()]).unwrap(),
//!     RecordBatch::try_new(schema.clone(), vec![Int64Array::from(vec![3]).into()]).unwrap(),
//! ];
//! let table = Table::from_record_batches(schema.as_ref().clone(), &batches).unwrap();
//! assert_eq!(table.num_rows(), 3);
//! assert_eq!(table.column(0).data().num_chunks(), 2);
//! ```

pub use quiver_array::*;
pub use quiver_data::{equal, layout, DataTypeLayout};
