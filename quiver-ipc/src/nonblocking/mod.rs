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

//! Async stream endpoints over tokio's [`AsyncRead`](tokio::io::AsyncRead)
//! and [`AsyncWrite`](tokio::io::AsyncWrite).
//!
//! [`AsyncStreamReader`] and [`AsyncStreamWriter`] follow the protocol of
//! their blocking counterparts. Every operation has a `*_with_cancellation`
//! variant taking a signal future: if the signal completes before the
//! operation, the operation is abandoned with [`QuiverError::Cancelled`] and
//! the endpoint refuses any further use, as its position in the stream is
//! unknown.
//!
//! ```
//! # use std::sync::Arc;
//! # use quiver_array::{Int32Array, RecordBatch};
//! # use quiver_ipc::nonblocking::{AsyncStreamReader, AsyncStreamWriter};
//! # use quiver_schema::{DataType, Field, Schema};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)]));
//! let batch = RecordBatch::try_new(schema.clone(), vec![Int32Array::from(vec![1, 2]).into()]).unwrap();
//!
//! let mut writer = AsyncStreamWriter::try_new(Vec::new(), &schema).await.unwrap();
//! writer.write(&batch).await.unwrap();
//! writer.finish().await.unwrap();
//! let bytes = writer.into_inner();
//!
//! let mut reader = AsyncStreamReader::try_new(bytes.as_slice()).await.unwrap();
//! assert_eq!(reader.next_batch().await.unwrap(), Some(batch));
//! assert_eq!(reader.next_batch().await.unwrap(), None);
//! # }
//! ```
//!
//! [`QuiverError::Cancelled`]: quiver_schema::QuiverError::Cancelled

mod reader;
pub use reader::AsyncStreamReader;

mod writer;
pub use writer::AsyncStreamWriter;
