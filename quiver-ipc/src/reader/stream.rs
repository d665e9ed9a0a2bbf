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

use log::{debug, trace};

use quiver_array::RecordBatch;
use quiver_buffer::Buffer;
use quiver_schema::{QuiverError, Result, SchemaRef};

use crate::convert::Message;
use crate::reader::{body_length, decode_message, metadata_length, Decoded, DEFAULT_MAX_MESSAGE_SIZE};
use crate::CONTINUATION_MARKER;

/// A low-level interface for reading [`RecordBatch`] data from a stream of bytes
///
/// See [StreamReader](crate::reader::StreamReader) for a higher-level interface
#[derive(Debug)]
pub struct StreamDecoder {
    /// The schema of this decoder, if read
    schema: Option<SchemaRef>,
    /// The decoder state
    state: DecoderState,
    /// A scratch buffer when a read is split across multiple `Buffer`
    buf: Vec<u8>,
    max_message_size: usize,
}

#[derive(Debug)]
enum DecoderState {
    /// Decoding the message prefix
    Header {
        /// Temporary buffer
        buf: [u8; 4],
        /// Number of bytes read into buf
        read: u8,
        /// If we have read a continuation token
        continuation: bool,
    },
    /// Decoding the message metadata
    Message {
        /// The size of the message metadata
        size: usize,
    },
    /// Decoding the message body
    Body {
        /// The message metadata
        message: Message,
    },
    /// Reached the end of the stream
    Finished,
}

impl Default for DecoderState {
    fn default() -> Self {
        Self::Header {
            buf: [0; 4],
            read: 0,
            continuation: false,
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self {
            schema: None,
            state: DecoderState::default(),
            buf: Vec::new(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl StreamDecoder {
    /// Create a new [`StreamDecoder`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the size of the metadata and of the body of every message
    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    /// Returns the schema of the stream, once decoded
    pub fn schema(&self) -> Option<SchemaRef> {
        self.schema.clone()
    }

    /// Try to read the next [`RecordBatch`] from the provided [`Buffer`]
    ///
    /// [`Buffer::advance`] will be called on `buffer` for any consumed bytes.
    ///
    /// The push-based interface facilitates integration with sources that yield arbitrarily
    /// delimited bytes ranges, such as a chunked byte stream received over the network.
    /// A message body received in one piece is sliced from `buffer` without copying.
    ///
    /// ```
    /// # use quiver_array::RecordBatch;
    /// # use quiver_buffer::Buffer;
    /// # use quiver_ipc::reader::StreamDecoder;
    /// # use quiver_schema::QuiverError;
    /// #
    /// fn print_stream<I>(src: impl Iterator<Item = Buffer>) -> Result<(), QuiverError> {
    ///     let mut decoder = StreamDecoder::new();
    ///     for mut x in src {
    ///         while !x.is_empty() {
    ///             if let Some(x) = decoder.decode(&mut x)? {
    ///                 println!("{x:?}");
    ///             }
    ///         }
    ///     }
    ///     decoder.finish()
    /// }
    /// ```
    pub fn decode(&mut self, buffer: &mut Buffer) -> Result<Option<RecordBatch>> {
        while !buffer.is_empty() || self.body_complete() {
            match &mut self.state {
                DecoderState::Header {
                    buf,
                    read,
                    continuation,
                } => {
                    let offset_buf = &mut buf[*read as usize..];
                    let to_read = buffer.len().min(offset_buf.len());
                    offset_buf[..to_read].copy_from_slice(&buffer[..to_read]);
                    *read += to_read as u8;
                    buffer.advance(to_read);
                    if *read == 4 {
                        if !*continuation && buf == &CONTINUATION_MARKER {
                            *continuation = true;
                            *read = 0;
                            continue;
                        }
                        match metadata_length(*buf, self.max_message_size)? {
                            None => {
                                debug!("reached end of stream");
                                self.state = DecoderState::Finished;
                            }
                            Some(size) => self.state = DecoderState::Message { size },
                        }
                    }
                }
                DecoderState::Message { size } => {
                    let len = *size;
                    if self.buf.is_empty() && buffer.len() >= len {
                        let message = Message::try_from_bytes(&buffer[..len])?;
                        buffer.advance(len);
                        self.start_body(message)?;
                        continue;
                    }

                    let to_read = buffer.len().min(len - self.buf.len());
                    self.buf.extend_from_slice(&buffer[..to_read]);
                    buffer.advance(to_read);
                    if self.buf.len() == len {
                        let message = Message::try_from_bytes(&self.buf)?;
                        self.buf.clear();
                        self.start_body(message)?;
                    }
                }
                DecoderState::Body { message } => {
                    let body_length = message.body_length;

                    let body = if self.buf.is_empty() && buffer.len() >= body_length {
                        let body = buffer.slice_with_length(0, body_length);
                        buffer.advance(body_length);
                        body
                    } else {
                        let to_read = buffer.len().min(body_length - self.buf.len());
                        self.buf.extend_from_slice(&buffer[..to_read]);
                        buffer.advance(to_read);

                        if self.buf.len() != body_length {
                            continue;
                        }
                        Buffer::from(std::mem::take(&mut self.buf))
                    };

                    let DecoderState::Body { message } = std::mem::take(&mut self.state) else {
                        unreachable!("state checked above")
                    };
                    match decode_message(message, &body, self.schema.as_ref())? {
                        Decoded::Schema(schema) => {
                            debug!("decoded stream schema with {} fields", schema.len());
                            self.schema = Some(schema);
                        }
                        Decoded::Batch(batch) => {
                            trace!("decoded record batch of {} rows", batch.num_rows());
                            return Ok(Some(batch));
                        }
                    }
                }
                DecoderState::Finished => {
                    return Err(QuiverError::IpcError(
                        "Unexpected data after end of stream".to_string(),
                    ))
                }
            }
        }
        Ok(None)
    }

    /// Signal the end of stream
    ///
    /// Returns an error if any partial data remains in the stream
    pub fn finish(&mut self) -> Result<()> {
        match self.state {
            DecoderState::Finished
            | DecoderState::Header {
                read: 0,
                continuation: false,
                ..
            } => Ok(()),
            _ => Err(QuiverError::IpcError("Unexpected End of Stream".to_string())),
        }
    }

    fn start_body(&mut self, message: Message) -> Result<()> {
        body_length(&message, self.max_message_size)?;
        self.state = DecoderState::Body { message };
        Ok(())
    }

    /// A message without body is complete once its metadata is read
    fn body_complete(&self) -> bool {
        matches!(&self.state, DecoderState::Body { message } if message.body_length == 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::writer::StreamWriter;
    use quiver_array::{Int32Array, Int64Array, StringArray};
    use quiver_schema::{DataType, Field, Schema};

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("int32", DataType::Int32, false),
            Field::new("utf8", DataType::Utf8, true),
        ]))
    }

    fn batches() -> Vec<RecordBatch> {
        (0..3)
            .map(|n| {
                RecordBatch::try_new(
                    schema(),
                    vec![
                        Int32Array::from((0..n).collect::<Vec<_>>()).into(),
                        StringArray::from((0..n).map(|i| Some("ab").filter(|_| i != 1)).collect::<Vec<_>>())
                            .into(),
                    ],
                )
                .unwrap()
            })
            .collect()
    }

    fn encode(batches: &[RecordBatch], finish: bool) -> Vec<u8> {
        let mut writer = StreamWriter::try_new(vec![], &schema()).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        if finish {
            writer.finish().unwrap();
        }
        writer.get_ref().clone()
    }

    fn decode_chunked(bytes: &[u8], chunk_size: usize) -> Result<(Option<SchemaRef>, Vec<RecordBatch>)> {
        let mut decoder = StreamDecoder::new();
        let mut out = vec![];
        for chunk in bytes.chunks(chunk_size) {
            let mut buffer = Buffer::from(chunk);
            while !buffer.is_empty() {
                if let Some(batch) = decoder.decode(&mut buffer)? {
                    out.push(batch);
                }
            }
        }
        decoder.finish()?;
        Ok((decoder.schema(), out))
    }

    #[test]
    fn test_any_split_decodes_the_same() {
        let bytes = encode(&batches(), true);
        for chunk_size in [1, 2, 3, 5, 7, 8, 13, 64, bytes.len()] {
            let (schema, decoded) = decode_chunked(&bytes, chunk_size).unwrap();
            assert_eq!(schema, Some(super::tests::schema()), "{chunk_size}");
            assert_eq!(decoded, batches(), "{chunk_size}");
        }
    }

    #[test]
    fn test_eos() {
        let bytes = encode(&batches(), true);
        let mut decoder = StreamDecoder::new();
        let mut buffer = Buffer::from(bytes);
        let mut count = 0;
        while decoder.decode(&mut buffer).unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(buffer.is_empty());
        decoder.finish().unwrap();

        let err = decoder.decode(&mut Buffer::from(vec![0_u8])).unwrap_err();
        assert_eq!(err.to_string(), "Ipc error: Unexpected data after end of stream");
    }

    #[test]
    fn test_schema_only_stream() {
        let bytes = encode(&[], false);
        let (schema, decoded) = decode_chunked(&bytes, bytes.len()).unwrap();
        assert_eq!(schema, Some(super::tests::schema()));
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_partial_stream() {
        let bytes = encode(&batches(), true);
        let mut decoder = StreamDecoder::new();
        let mut buffer = Buffer::from(&bytes[..bytes.len() - 12]);
        while decoder.decode(&mut buffer).unwrap().is_some() {}
        let err = decoder.finish().unwrap_err();
        assert_eq!(err.to_string(), "Ipc error: Unexpected End of Stream");
    }

    #[test]
    fn test_zero_copy_body() {
        let bytes = Buffer::from(encode(&batches(), false));
        let mut decoder = StreamDecoder::new();
        let mut buffer = bytes.clone();
        let mut decoded = vec![];
        while let Some(batch) = decoder.decode(&mut buffer).unwrap() {
            decoded.push(batch);
        }
        let values = &decoded[2].column(0).data().buffers()[0];
        let start = bytes.as_slice().as_ptr() as usize;
        let ptr = values.as_slice().as_ptr() as usize;
        assert!(ptr >= start && ptr < start + bytes.len());
    }

    #[test]
    fn test_rejects_mismatched_batch() {
        let other = Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, false)]));
        let mut writer = StreamWriter::try_new(vec![], &other).unwrap();
        writer
            .write(&RecordBatch::try_new(other.clone(), vec![Int64Array::from(vec![1]).into()]).unwrap())
            .unwrap();
        let foreign = writer.into_inner().unwrap();

        // this stream's schema followed by the other stream's batch
        let mut bytes = encode(&[], false);
        bytes.extend_from_slice(&foreign[schema_len_of(&foreign)..]);

        let mut decoder = StreamDecoder::new();
        let mut buffer = Buffer::from(bytes);
        let err = decoder.decode(&mut buffer).unwrap_err();
        assert!(err.to_string().contains("Record batch has 1 columns"), "{err}");
    }

    /// Length of the schema message at the start of `bytes`
    fn schema_len_of(bytes: &[u8]) -> usize {
        let len = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        8 + len as usize
    }
}
