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

use std::future::{pending, Future};
use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt};

use quiver_array::RecordBatch;
use quiver_buffer::Buffer;
use quiver_schema::{QuiverError, Result, SchemaRef};

use crate::convert::Message;
use crate::reader::{body_length, metadata_length, truncated, StreamState};
use crate::CONTINUATION_MARKER;

async fn read_up_to<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]).await {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_message_size: usize,
) -> Result<Option<(Message, Buffer)>> {
    let mut prefix = [0_u8; 4];
    match read_up_to(reader, &mut prefix)
        .await
        .map_err(|e| truncated(e, "message prefix"))?
    {
        0 => return Ok(None),
        4 => {}
        _ => {
            return Err(QuiverError::IpcError(
                "Stream truncated while reading message prefix".to_string(),
            ))
        }
    }
    if prefix == CONTINUATION_MARKER {
        reader
            .read_exact(&mut prefix)
            .await
            .map_err(|e| truncated(e, "message length"))?;
    }
    let Some(meta_len) = metadata_length(prefix, max_message_size)? else {
        return Ok(None);
    };

    let mut meta_buffer = vec![0; meta_len];
    reader
        .read_exact(&mut meta_buffer)
        .await
        .map_err(|e| truncated(e, "message metadata"))?;
    let message = Message::try_from_bytes(&meta_buffer)?;

    let mut body = vec![0; body_length(&message, max_message_size)?];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|e| truncated(e, "message body"))?;
    Ok(Some((message, Buffer::from(body))))
}

/// Async reader for the quiver stream format
///
/// Behaves like [`StreamReader`](crate::reader::StreamReader), reading from
/// an [`AsyncRead`]. A cancelled read leaves the reader failed.
#[derive(Debug)]
pub struct AsyncStreamReader<R> {
    reader: R,
    state: StreamState,
}

impl<R: AsyncRead + Unpin> AsyncStreamReader<R> {
    /// Create a new reader without reading anything
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: StreamState::new(),
        }
    }

    /// Try to create a new reader, reading the schema message
    pub async fn try_new(reader: R) -> Result<Self> {
        let mut reader = Self::new(reader);
        reader.read_schema().await?;
        Ok(reader)
    }

    /// Bound the size of the metadata and of the body of every message
    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.state.max_message_size = max_message_size;
        self
    }

    /// Return the schema of the stream, if read
    pub fn schema(&self) -> Option<SchemaRef> {
        self.state.schema()
    }

    /// Check if the stream is finished
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Reads the schema message if not yet read, returning the schema
    pub async fn read_schema(&mut self) -> Result<SchemaRef> {
        self.read_schema_with_cancellation(pending()).await
    }

    /// Reads the schema message unless `signal` completes first
    pub async fn read_schema_with_cancellation<F>(&mut self, signal: F) -> Result<SchemaRef>
    where
        F: Future<Output = ()>,
    {
        if let Some(schema) = self.state.pending_schema()? {
            return Ok(schema);
        }
        let message = self.read_or_cancel(signal).await?;
        self.state.accept_schema(message)
    }

    /// Reads the next batch, see [`StreamReader::next_batch`]
    ///
    /// [`StreamReader::next_batch`]: crate::reader::StreamReader::next_batch
    pub async fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        self.next_batch_with_cancellation(pending()).await
    }

    /// Reads the next batch unless `signal` completes first
    pub async fn next_batch_with_cancellation<F>(&mut self, signal: F) -> Result<Option<RecordBatch>>
    where
        F: Future<Output = ()>,
    {
        if !self.state.expects_batch()? {
            return Ok(None);
        }
        let message = self.read_or_cancel(signal).await?;
        self.state.accept_batch(message)
    }

    /// Gets a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gets a mutable reference to the underlying reader.
    ///
    /// It is inadvisable to directly read from the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Reads a message, failing the reader if `signal` completes first
    async fn read_or_cancel<F>(&mut self, signal: F) -> Result<Result<Option<(Message, Buffer)>>>
    where
        F: Future<Output = ()>,
    {
        let max_message_size = self.state.max_message_size;
        let reader = &mut self.reader;
        tokio::select! {
            biased;
            _ = signal => {
                self.state.fail();
                Err(QuiverError::Cancelled("stream read cancelled".to_string()))
            }
            message = read_message(reader, max_message_size) => Ok(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::writer::StreamWriter;
    use quiver_array::StringArray;
    use quiver_schema::{DataType, Field, Schema};
    use tokio::io::AsyncWriteExt;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new("s", DataType::Utf8, true)]))
    }

    fn batch(values: &[Option<&str>]) -> RecordBatch {
        RecordBatch::try_new(schema(), vec![StringArray::from(values.to_vec()).into()]).unwrap()
    }

    fn stream(batches: &[RecordBatch]) -> Vec<u8> {
        let mut writer = StreamWriter::try_new(vec![], &schema()).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        writer.into_inner().unwrap()
    }

    #[tokio::test]
    async fn test_read_stream() {
        let batches = vec![batch(&[Some("a"), None]), batch(&[]), batch(&[Some("bcd")])];
        let bytes = stream(&batches);
        let mut reader = AsyncStreamReader::try_new(bytes.as_slice()).await.unwrap();
        assert_eq!(reader.schema(), Some(schema()));

        let mut read = vec![];
        while let Some(batch) = reader.next_batch().await.unwrap() {
            read.push(batch);
        }
        assert_eq!(read, batches);
        assert!(reader.is_finished());
        assert_eq!(reader.next_batch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_next_batch_before_schema() {
        let bytes = stream(&[batch(&[Some("a")])]);
        let mut reader = AsyncStreamReader::new(bytes.as_slice());
        assert_eq!(reader.next_batch().await.unwrap(), None);
        reader.read_schema().await.unwrap();
        assert_eq!(reader.next_batch().await.unwrap(), Some(batch(&[Some("a")])));
    }

    #[tokio::test]
    async fn test_cancelled_read_fails_reader() {
        let bytes = stream(&[batch(&[Some("a")])]);
        let mut reader = AsyncStreamReader::try_new(bytes.as_slice()).await.unwrap();

        let err = reader
            .next_batch_with_cancellation(std::future::ready(()))
            .await
            .unwrap_err();
        assert!(matches!(err, QuiverError::Cancelled(_)), "{err}");
        assert!(!reader.is_finished());

        let err = reader.next_batch().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ipc error: Stream reader cannot be used after a previous error"
        );
    }

    #[tokio::test]
    async fn test_cancel_pending_read() {
        let (client, mut server) = tokio::io::duplex(1024);
        let bytes = stream(&[]);
        // the schema without the end-of-stream marker
        server.write_all(&bytes[..bytes.len() - 8]).await.unwrap();

        let mut reader = AsyncStreamReader::try_new(client).await.unwrap();
        // no batch is ever sent, so only the signal can complete
        let signal = tokio::time::sleep(std::time::Duration::from_millis(20));
        let err = reader
            .next_batch_with_cancellation(signal)
            .await
            .unwrap_err();
        assert!(matches!(err, QuiverError::Cancelled(_)), "{err}");
        drop(server);
    }

    #[tokio::test]
    async fn test_truncated_stream() {
        let bytes = stream(&[batch(&[Some("abc")])]);
        let schema_len = stream(&[]).len() - 8;
        let mut reader = AsyncStreamReader::try_new(&bytes[..schema_len + 10])
            .await
            .unwrap();
        let err = reader.next_batch().await.unwrap_err();
        assert!(
            err.to_string().starts_with("Ipc error: Stream truncated while reading"),
            "{err}"
        );
    }
}
