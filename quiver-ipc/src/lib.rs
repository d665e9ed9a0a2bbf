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

//! Support for the quiver streaming IPC format.
//!
//! A stream is one schema message followed by zero or more record batch
//! messages and an optional end-of-stream marker. Every message is framed as
//!
//! ```text
//! 0xFFFFFFFF | metadata length (i32, little endian) | metadata | body
//! ```
//!
//! where the metadata is a JSON document describing the message, padded with
//! zeros to the write alignment, and the body holds the raw bytes of every
//! buffer of the batch. The end-of-stream marker is `0xFFFFFFFF 0x00000000`.
//!
//! ```
//! # use std::sync::Arc;
//! # use quiver_array::{Int32Array, RecordBatch};
//! # use quiver_ipc::reader::StreamReader;
//! # use quiver_ipc::writer::StreamWriter;
//! # use quiver_schema::{DataType, Field, Schema};
//! let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)]));
//! let batch = RecordBatch::try_new(schema.clone(), vec![Int32Array::from(vec![1, 2, 3]).into()]).unwrap();
//!
//! let mut writer = StreamWriter::try_new(Vec::new(), &schema).unwrap();
//! writer.write(&batch).unwrap();
//! let bytes = writer.into_inner().unwrap();
//!
//! let mut reader = StreamReader::try_new(bytes.as_slice()).unwrap();
//! assert_eq!(reader.schema(), Some(schema));
//! assert_eq!(reader.next_batch().unwrap(), Some(batch));
//! assert_eq!(reader.next_batch().unwrap(), None);
//! ```

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

pub mod convert;
#[cfg(feature = "async")]
pub mod nonblocking;
pub mod reader;
pub mod writer;

/// The marker preceding the metadata length of every message
pub const CONTINUATION_MARKER: [u8; 4] = [0xff; 4];

/// The version of the message metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MetadataVersion {
    /// Metadata as written by legacy writers, which may omit the continuation marker
    V4,
    /// Current metadata version
    #[default]
    V5,
}
