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

//! A columnar in-memory format for typed tabular data, and a streaming
//! format to move it between processes.
//!
//! This crate re-exports the crates of the quiver workspace:
//!
//! * [`buffer`]: immutable, reference-counted byte buffers and bitmaps
//! * [`datatypes`]: [`DataType`](datatypes::DataType), [`Field`](datatypes::Field) and [`Schema`](datatypes::Schema)
//! * [`array`]: validated arrays, chunked arrays, columns and tables
//! * [`record_batch`]: equal-length columns under a schema
//! * [`ipc`]: reading and writing the stream format
//! * [`error`]: the error type shared by all of the above
//!
//! # Streaming
//!
//! A stream is a schema message followed by one message per record batch:
//!
//! ```
//! # use std::sync::Arc;
//! use quiver::array::{Int32Array, StringArray};
//! use quiver::datatypes::{DataType, Field, Schema};
//! use quiver::ipc::reader::StreamReader;
//! use quiver::ipc::writer::StreamWriter;
//! use quiver::record_batch::RecordBatch;
//!
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("id", DataType::Int32, false),
//!     Field::new("name", DataType::Utf8, true),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema.clone(),
//!     vec![
//!         Int32Array::from(vec![1, 2, 3]).into(),
//!         StringArray::from(vec![Some("a"), None, Some("c")]).into(),
//!     ],
//! )?;
//!
//! let mut writer = StreamWriter::try_new(Vec::new(), &schema)?;
//! writer.write(&batch)?;
//! let bytes = writer.into_inner()?;
//!
//! let reader = StreamReader::try_new(bytes.as_slice())?;
//! for read in reader {
//!     assert_eq!(read?, batch);
//! }
//! # Ok::<(), quiver::error::QuiverError>(())
//! ```
//!
//! With the `ipc_async` feature, [`ipc::nonblocking`] provides the same
//! endpoints over tokio's async IO traits.

#![warn(missing_docs)]

pub mod array;
pub mod datatypes;

pub use quiver_buffer as buffer;

/// The error type shared by the quiver crates
pub mod error {
    pub use quiver_schema::{QuiverError, Result};
}

/// Reading and writing the quiver stream format
pub mod ipc {
    pub use quiver_ipc::*;
}

/// Equal-length columns under a schema
pub mod record_batch {
    pub use quiver_array::{RecordBatch, RecordBatchOptions};
}
