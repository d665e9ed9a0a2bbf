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

//! Readers for the quiver IPC stream format
//!
//! [`StreamReader`] pulls messages from any [`Read`]; [`StreamDecoder`] is
//! fed arbitrarily split [`Buffer`]s instead.

mod stream;
pub use stream::StreamDecoder;

use std::io::{BufReader, ErrorKind, Read};
use std::sync::Arc;

use log::{debug, trace, warn};

use quiver_array::{Array, RecordBatch, RecordBatchOptions};
use quiver_buffer::Buffer;
use quiver_data::{layout, ArrayData};
use quiver_schema::{QuiverError, Result, SchemaRef};

use crate::convert::{ipc_to_schema, BufferSpec, IpcRecordBatch, Message, MessageHeader};
use crate::CONTINUATION_MARKER;

/// The default bound on the metadata and the body of a single message
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Creates a record batch from the buffers of `body` described by `batch`
///
/// Every buffer is a zero-copy slice of `body`, and every column is
/// validated by [`ArrayData::try_new`], so inconsistent descriptions surface
/// as errors rather than as invalid arrays.
pub fn read_record_batch(
    body: &Buffer,
    batch: &IpcRecordBatch,
    schema: SchemaRef,
) -> Result<RecordBatch> {
    if batch.nodes.len() != schema.len() {
        return Err(QuiverError::IpcError(format!(
            "Record batch has {} columns but the schema has {} fields",
            batch.nodes.len(),
            schema.len()
        )));
    }

    let mut specs = batch.buffers.iter();
    let mut next_buffer = || -> Result<Buffer> {
        let spec = specs.next().ok_or_else(|| {
            QuiverError::IpcError("Record batch describes fewer buffers than its columns need".to_string())
        })?;
        body_slice(body, spec)
    };

    let mut columns = Vec::with_capacity(batch.nodes.len());
    for (field, node) in schema.fields().iter().zip(&batch.nodes) {
        let nulls = if node.has_validity {
            Some(next_buffer()?)
        } else {
            None
        };
        let buffers = (0..layout(field.data_type()).num_buffers())
            .map(|_| next_buffer())
            .collect::<Result<Vec<_>>>()?;
        let data = ArrayData::try_new(
            *field.data_type(),
            node.length,
            Some(node.null_count),
            nulls,
            node.offset,
            buffers,
        )
        .map_err(|e| {
            QuiverError::IpcError(format!("Invalid data for field \"{}\": {e}", field.name()))
        })?;
        columns.push(Array::from_data(data));
    }

    if specs.next().is_some() {
        return Err(QuiverError::IpcError(
            "Record batch describes more buffers than its columns need".to_string(),
        ));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(batch.length));
    RecordBatch::try_new_with_options(schema, columns, &options)
        .map_err(|e| QuiverError::IpcError(format!("Invalid record batch: {e}")))
}

fn body_slice(body: &Buffer, spec: &BufferSpec) -> Result<Buffer> {
    match spec.offset.checked_add(spec.length) {
        Some(end) if end <= body.len() => Ok(body.slice_with_length(spec.offset, spec.length)),
        _ => Err(QuiverError::IpcError(format!(
            "Buffer of {} bytes at offset {} exceeds the message body of {} bytes",
            spec.length,
            spec.offset,
            body.len()
        ))),
    }
}

/// A decoded message
pub(crate) enum Decoded {
    Schema(SchemaRef),
    Batch(RecordBatch),
}

/// Decodes `message` with its `body`, given the schema read so far
pub(crate) fn decode_message(
    message: Message,
    body: &Buffer,
    schema: Option<&SchemaRef>,
) -> Result<Decoded> {
    match message.header {
        MessageHeader::Schema(ipc_schema) => {
            if schema.is_some() {
                return Err(QuiverError::IpcError(
                    "Not expecting a schema when messages are read".to_string(),
                ));
            }
            Ok(Decoded::Schema(Arc::new(ipc_to_schema(ipc_schema)?)))
        }
        MessageHeader::RecordBatch(batch) => {
            let schema = schema
                .cloned()
                .ok_or_else(|| QuiverError::IpcError("Missing schema".to_string()))?;
            read_record_batch(body, &batch, schema).map(Decoded::Batch)
        }
    }
}

/// Interprets a message length, returning `None` for the end-of-stream marker
pub(crate) fn metadata_length(bytes: [u8; 4], max_message_size: usize) -> Result<Option<usize>> {
    let len = i32::from_le_bytes(bytes);
    let len = usize::try_from(len)
        .map_err(|_| QuiverError::IpcError(format!("Invalid negative message length {len}")))?;
    if len > max_message_size {
        return Err(QuiverError::IpcError(format!(
            "Message metadata of {len} bytes exceeds the maximum message size of {max_message_size} bytes"
        )));
    }
    Ok((len != 0).then_some(len))
}

/// Returns the body length of `message`, if within `max_message_size`
pub(crate) fn body_length(message: &Message, max_message_size: usize) -> Result<usize> {
    if message.body_length > max_message_size {
        return Err(QuiverError::IpcError(format!(
            "Message body of {} bytes exceeds the maximum message size of {max_message_size} bytes",
            message.body_length
        )));
    }
    Ok(message.body_length)
}

/// Maps a premature end of input to a truncation error
pub(crate) fn truncated(e: std::io::Error, what: &str) -> QuiverError {
    match e.kind() {
        ErrorKind::UnexpectedEof => {
            QuiverError::IpcError(format!("Stream truncated while reading {what}"))
        }
        _ => QuiverError::IoError(format!("Failed to read {what}"), e),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    /// No message has been read
    Start,
    /// The schema is read, batches follow
    SchemaRead,
    /// The end of the stream is reached
    Finished,
    /// A previous read failed, the stream position is unknown
    Failed,
}

/// The protocol state shared by the blocking and async stream readers
#[derive(Debug)]
pub(crate) struct StreamState {
    schema: Option<SchemaRef>,
    state: ReaderState,
    pub(crate) max_message_size: usize,
}

impl StreamState {
    pub(crate) fn new() -> Self {
        Self {
            schema: None,
            state: ReaderState::Start,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    pub(crate) fn schema(&self) -> Option<SchemaRef> {
        self.schema.clone()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.state == ReaderState::Finished
    }

    pub(crate) fn fail(&mut self) {
        self.state = ReaderState::Failed;
    }

    fn check_usable(&self) -> Result<()> {
        if self.state == ReaderState::Failed {
            warn!("stream reader used after a previous error");
            return Err(QuiverError::IpcError(
                "Stream reader cannot be used after a previous error".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the schema if already read, `None` if the next message must
    /// be the schema
    pub(crate) fn pending_schema(&self) -> Result<Option<SchemaRef>> {
        self.check_usable()?;
        Ok(self.schema.clone())
    }

    /// Returns whether the next message should be read as a batch
    pub(crate) fn expects_batch(&self) -> Result<bool> {
        self.check_usable()?;
        Ok(self.state == ReaderState::SchemaRead)
    }

    /// Accepts the outcome of reading the schema message
    pub(crate) fn accept_schema(
        &mut self,
        message: Result<Option<(Message, Buffer)>>,
    ) -> Result<SchemaRef> {
        let result = message.and_then(|message| match message {
            None => Err(QuiverError::IpcError(
                "Stream ended before a schema message was read".to_string(),
            )),
            Some((message, body)) => match decode_message(message, &body, None)? {
                Decoded::Schema(schema) => Ok(schema),
                Decoded::Batch(_) => Err(QuiverError::IpcError("Missing schema".to_string())),
            },
        });
        match result {
            Ok(schema) => {
                debug!("read stream schema with {} fields", schema.len());
                self.schema = Some(schema.clone());
                self.state = ReaderState::SchemaRead;
                Ok(schema)
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    /// Accepts the outcome of reading a batch message
    pub(crate) fn accept_batch(
        &mut self,
        message: Result<Option<(Message, Buffer)>>,
    ) -> Result<Option<RecordBatch>> {
        let result = message.and_then(|message| match message {
            None => Ok(None),
            Some((message, body)) => match decode_message(message, &body, self.schema.as_ref())? {
                Decoded::Batch(batch) => Ok(Some(batch)),
                Decoded::Schema(_) => Err(QuiverError::IpcError(
                    "Not expecting a schema when messages are read".to_string(),
                )),
            },
        });
        match result {
            Ok(Some(batch)) => {
                trace!("read record batch of {} rows", batch.num_rows());
                Ok(Some(batch))
            }
            Ok(None) => {
                debug!("reached end of stream");
                self.state = ReaderState::Finished;
                Ok(None)
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }
}

/// Reads exactly `buf.len()` bytes unless the input ends first, returning
/// the number of bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

/// Reads one message, returning `None` at the end of the stream
fn read_message<R: Read>(
    reader: &mut R,
    max_message_size: usize,
) -> Result<Option<(Message, Buffer)>> {
    let mut prefix = [0_u8; 4];
    match read_up_to(reader, &mut prefix).map_err(|e| truncated(e, "message prefix"))? {
        // a clean end of input at a message boundary ends the stream
        0 => return Ok(None),
        4 => {}
        _ => {
            return Err(QuiverError::IpcError(
                "Stream truncated while reading message prefix".to_string(),
            ))
        }
    }
    // legacy streams start with the length
    if prefix == CONTINUATION_MARKER {
        reader
            .read_exact(&mut prefix)
            .map_err(|e| truncated(e, "message length"))?;
    }
    let Some(meta_len) = metadata_length(prefix, max_message_size)? else {
        return Ok(None);
    };

    let mut meta_buffer = vec![0; meta_len];
    reader
        .read_exact(&mut meta_buffer)
        .map_err(|e| truncated(e, "message metadata"))?;
    let message = Message::try_from_bytes(&meta_buffer)?;

    let mut body = vec![0; body_length(&message, max_message_size)?];
    reader
        .read_exact(&mut body)
        .map_err(|e| truncated(e, "message body"))?;
    Ok(Some((message, Buffer::from(body))))
}

/// Quiver stream reader
///
/// Reads the schema message, then one [`RecordBatch`] per message until the
/// end of the stream. Once a read fails the position in the stream is
/// unknown, and every later read fails too.
///
/// ```
/// # use std::sync::Arc;
/// # use quiver_array::{Int32Array, RecordBatch};
/// # use quiver_ipc::reader::StreamReader;
/// # use quiver_ipc::writer::StreamWriter;
/// # use quiver_schema::{DataType, Field, Schema};
/// # let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)]));
/// # let batch = RecordBatch::try_new(schema.clone(), vec![Int32Array::from(vec![1, 2]).into()]).unwrap();
/// # let mut writer = StreamWriter::try_new(Vec::new(), &schema).unwrap();
/// # writer.write(&batch).unwrap();
/// # let bytes = writer.into_inner().unwrap();
/// let mut reader = StreamReader::new(bytes.as_slice());
/// // nothing is read before the schema
/// assert_eq!(reader.next_batch().unwrap(), None);
///
/// reader.read_schema().unwrap();
/// for batch in reader {
///     assert_eq!(batch.unwrap().num_rows(), 2);
/// }
/// ```
#[derive(Debug)]
pub struct StreamReader<R> {
    /// Stream reader
    reader: R,
    state: StreamState,
}

impl<R: Read> StreamReader<BufReader<R>> {
    /// Try to create a new stream reader with the reader wrapped in a BufReader.
    ///
    /// See [`StreamReader::try_new`] for an unbuffered version.
    pub fn try_new_buffered(reader: R) -> Result<Self> {
        Self::try_new(BufReader::new(reader))
    }
}

impl<R: Read> StreamReader<R> {
    /// Create a new stream reader without reading anything.
    ///
    /// Call [`StreamReader::read_schema`] before reading batches.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: StreamState::new(),
        }
    }

    /// Try to create a new stream reader, reading the schema message.
    ///
    /// There is no internal buffering. If buffered reads are needed you likely want to use
    /// [`StreamReader::try_new_buffered`] instead.
    ///
    /// # Errors
    ///
    /// An ['Err'](Result::Err) may be returned if the reader does not encounter a schema
    /// as the first message in the stream.
    pub fn try_new(reader: R) -> Result<Self> {
        let mut reader = Self::new(reader);
        reader.read_schema()?;
        Ok(reader)
    }

    /// Bound the size of the metadata and of the body of every message,
    /// defaulting to [`DEFAULT_MAX_MESSAGE_SIZE`]
    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.state.max_message_size = max_message_size;
        self
    }

    /// Reads the schema message if not yet read, returning the schema
    pub fn read_schema(&mut self) -> Result<SchemaRef> {
        if let Some(schema) = self.state.pending_schema()? {
            return Ok(schema);
        }
        let message = read_message(&mut self.reader, self.state.max_message_size);
        self.state.accept_schema(message)
    }

    /// Return the schema of the stream, if read
    pub fn schema(&self) -> Option<SchemaRef> {
        self.state.schema()
    }

    /// Reads the next batch.
    ///
    /// Returns `Ok(None)` before the schema is read and at the end of the
    /// stream, which is either the end-of-stream marker or the end of input
    /// at a message boundary.
    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        if !self.state.expects_batch()? {
            return Ok(None);
        }
        let message = read_message(&mut self.reader, self.state.max_message_size);
        self.state.accept_batch(message)
    }

    /// Check if the stream is finished
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Gets a reference to the underlying reader.
    ///
    /// It is inadvisable to directly read from the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gets a mutable reference to the underlying reader.
    ///
    /// It is inadvisable to directly read from the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }
}

impl<R: Read> Iterator for StreamReader<R> {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
