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

//! Writers for the quiver IPC stream format
//!
//! [`StreamWriter`] writes a schema message followed by one message per
//! [`RecordBatch`] to any [`Write`]. The lower level [`IpcDataGenerator`]
//! and [`write_message`] are exposed for callers framing messages themselves.

use std::io::{BufWriter, Write};
use std::sync::Arc;

use log::{debug, trace};

use quiver_array::RecordBatch;
use quiver_schema::{QuiverError, Result, Schema, SchemaRef};

use crate::convert::{
    schema_to_ipc, BufferSpec, FieldNode, IpcRecordBatch, Message, MessageHeader,
};
use crate::{MetadataVersion, CONTINUATION_MARKER};

/// IPC write options used to control the behaviour of the [`IpcDataGenerator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpcWriteOptions {
    /// Write padding after the message metadata to this multiple of bytes.
    /// Must be 8, 16, 32, or 64 - defaults to 8.
    alignment: u8,
    /// The legacy format omits the continuation marker before each message
    /// length, and is only available with metadata version 4
    write_legacy_ipc_format: bool,
    /// The metadata version to write
    metadata_version: MetadataVersion,
}

impl IpcWriteOptions {
    /// Try to create IpcWriteOptions, checking for incompatible settings
    pub fn try_new(
        alignment: usize,
        write_legacy_ipc_format: bool,
        metadata_version: MetadataVersion,
    ) -> Result<Self> {
        let is_alignment_valid =
            alignment == 8 || alignment == 16 || alignment == 32 || alignment == 64;
        if !is_alignment_valid {
            return Err(QuiverError::InvalidArgumentError(
                "Alignment should be 8, 16, 32, or 64.".to_string(),
            ));
        }
        let alignment: u8 = u8::try_from(alignment).expect("range already checked");
        if write_legacy_ipc_format && metadata_version != MetadataVersion::V4 {
            return Err(QuiverError::InvalidArgumentError(
                "Legacy IPC format only supported on metadata version 4".to_string(),
            ));
        }
        Ok(Self {
            alignment,
            write_legacy_ipc_format,
            metadata_version,
        })
    }

    /// Returns the alignment of message metadata
    pub fn alignment(&self) -> usize {
        usize::from(self.alignment)
    }

    /// Returns whether the continuation marker is omitted
    pub fn write_legacy_ipc_format(&self) -> bool {
        self.write_legacy_ipc_format
    }

    /// Returns the metadata version written
    pub fn metadata_version(&self) -> MetadataVersion {
        self.metadata_version
    }
}

impl Default for IpcWriteOptions {
    fn default() -> Self {
        Self {
            alignment: 8,
            write_legacy_ipc_format: false,
            metadata_version: MetadataVersion::V5,
        }
    }
}

/// Handles low level details of encoding [`Schema`] and [`RecordBatch`] into
/// IPC messages
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use quiver_array::{Int32Array, RecordBatch};
/// # use quiver_ipc::writer::{IpcDataGenerator, IpcWriteOptions};
/// # use quiver_schema::{DataType, Field, Schema};
/// let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, true)]));
/// let batch = RecordBatch::try_new(schema.clone(), vec![Int32Array::from(vec![1, 2]).into()]).unwrap();
///
/// let gen = IpcDataGenerator::default();
/// let options = IpcWriteOptions::default();
/// let encoded = gen.encoded_batch(&batch, &options).unwrap();
/// // two little endian i32 values, no validity bitmap
/// assert_eq!(encoded.body, vec![1, 0, 0, 0, 2, 0, 0, 0]);
/// ```
#[derive(Debug, Default)]
pub struct IpcDataGenerator {}

impl IpcDataGenerator {
    /// Converts a schema to an IPC message and returns it
    pub fn schema_to_bytes(&self, schema: &Schema, write_options: &IpcWriteOptions) -> Result<EncodedData> {
        let message = Message {
            version: write_options.metadata_version,
            header: MessageHeader::Schema(schema_to_ipc(schema)),
            body_length: 0,
        };
        Ok(EncodedData {
            ipc_message: message.to_bytes()?,
            body: vec![],
        })
    }

    /// Encodes a batch to an IPC message whose body holds every buffer of
    /// every column, in column order and validity first.
    ///
    /// Buffers are written whole rather than truncated to a sliced array's
    /// range: the array offset travels in the column's [`FieldNode`].
    pub fn encoded_batch(&self, batch: &RecordBatch, write_options: &IpcWriteOptions) -> Result<EncodedData> {
        let mut nodes = Vec::with_capacity(batch.num_columns());
        let mut buffers = vec![];
        let mut body = vec![];

        for array in batch.columns() {
            let data = array.data();
            nodes.push(FieldNode {
                length: data.len(),
                null_count: data.null_count(),
                offset: data.offset(),
                has_validity: data.nulls().is_some(),
            });
            for buffer in data.layout_buffers() {
                buffers.push(BufferSpec {
                    offset: body.len(),
                    length: buffer.len(),
                });
                body.extend_from_slice(buffer.as_slice());
            }
        }

        let message = Message {
            version: write_options.metadata_version,
            header: MessageHeader::RecordBatch(IpcRecordBatch {
                length: batch.num_rows(),
                nodes,
                buffers,
            }),
            body_length: body.len(),
        };
        Ok(EncodedData {
            ipc_message: message.to_bytes()?,
            body,
        })
    }
}

/// Stores the encoded data: the serialized message metadata and the body
#[derive(Debug)]
pub struct EncodedData {
    /// The serialized [`Message`]
    pub ipc_message: Vec<u8>,
    /// The message body, empty for schema messages
    pub body: Vec<u8>,
}

/// Write a message's IPC data and buffers, returning metadata and body lengths written
pub fn write_message<W: Write>(
    mut writer: W,
    encoded: EncodedData,
    write_options: &IpcWriteOptions,
) -> Result<(usize, usize)> {
    let a = usize::from(write_options.alignment - 1);
    let buffer = encoded.ipc_message;
    let metadata_size = buffer.len();
    let prefix_size = if write_options.write_legacy_ipc_format {
        4
    } else {
        8
    };
    let aligned_size = (metadata_size + prefix_size + a) & !a;
    let padding_bytes = aligned_size - metadata_size - prefix_size;

    let length = i32::try_from(aligned_size - prefix_size).map_err(|_| {
        QuiverError::IpcError(format!(
            "Message metadata of {metadata_size} bytes exceeds the maximum frame size"
        ))
    })?;
    write_continuation(&mut writer, write_options, length)?;

    writer.write_all(&buffer)?;
    writer.write_all(&PADDING[..padding_bytes])?;

    if !encoded.body.is_empty() {
        writer.write_all(&encoded.body)?;
    }

    Ok((aligned_size, encoded.body.len()))
}

/// Write the message prefix: the continuation marker, unless writing the
/// legacy format, followed by `total_len`
pub(crate) fn write_continuation<W: Write>(
    mut writer: W,
    write_options: &IpcWriteOptions,
    total_len: i32,
) -> Result<usize> {
    let mut written = 4;
    if !write_options.write_legacy_ipc_format {
        writer.write_all(&CONTINUATION_MARKER)?;
        written += 4;
    }
    writer.write_all(&total_len.to_le_bytes()[..])?;
    writer.flush()?;
    Ok(written)
}

const PADDING: [u8; 64] = [0; 64];

/// Writer for the quiver stream format
///
/// The schema is written when the writer is created. Every batch written
/// must have that schema, and no batch may follow [`StreamWriter::finish`].
#[derive(Debug)]
pub struct StreamWriter<W> {
    /// The object to write to
    writer: W,
    /// IPC write options
    write_options: IpcWriteOptions,
    /// The schema of the stream
    schema: SchemaRef,
    /// Whether the writer footer has been written, and the writer is finished
    finished: bool,
    data_gen: IpcDataGenerator,
}

impl<W: Write> StreamWriter<BufWriter<W>> {
    /// Try to create a new stream writer with the writer wrapped in a BufWriter.
    ///
    /// See [`StreamWriter::try_new`] for an unbuffered version.
    pub fn try_new_buffered(writer: W, schema: &Schema) -> Result<Self> {
        Self::try_new(BufWriter::new(writer), schema)
    }
}

impl<W: Write> StreamWriter<W> {
    /// Try to create a new writer, with the schema written as part of the header.
    ///
    /// Note that there is no internal buffering. See also [`StreamWriter::try_new_buffered`].
    ///
    /// # Errors
    ///
    /// An ['Err'](Result::Err) may be returned if writing the header to the writer fails.
    pub fn try_new(writer: W, schema: &Schema) -> Result<Self> {
        let write_options = IpcWriteOptions::default();
        Self::try_new_with_options(writer, schema, write_options)
    }

    /// Try to create a new writer with [`IpcWriteOptions`].
    ///
    /// # Errors
    ///
    /// An ['Err'](Result::Err) may be returned if writing the header to the writer fails.
    pub fn try_new_with_options(
        mut writer: W,
        schema: &Schema,
        write_options: IpcWriteOptions,
    ) -> Result<Self> {
        let data_gen = IpcDataGenerator::default();
        let encoded_message = data_gen.schema_to_bytes(schema, &write_options)?;
        write_message(&mut writer, encoded_message, &write_options)?;
        debug!("wrote schema message with {} fields", schema.len());
        Ok(Self {
            writer,
            write_options,
            schema: Arc::new(schema.clone()),
            finished: false,
            data_gen,
        })
    }

    /// Returns the schema of the stream
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Write a record batch to the stream
    ///
    /// # Errors
    ///
    /// Errors if the writer is finished, the batch schema differs from the
    /// stream schema, or writing fails
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        if self.finished {
            return Err(QuiverError::IpcError(
                "Cannot write record batch to stream writer as it is closed".to_string(),
            ));
        }
        check_batch_schema(&self.schema, batch)?;

        let encoded = self.data_gen.encoded_batch(batch, &self.write_options)?;
        let (metadata_len, body_len) = write_message(&mut self.writer, encoded, &self.write_options)?;
        trace!(
            "wrote record batch of {} rows ({metadata_len} metadata bytes, {body_len} body bytes)",
            batch.num_rows()
        );
        Ok(())
    }

    /// Write continuation bytes, and mark the stream as done
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(QuiverError::IpcError(
                "Cannot write footer to stream writer as it is closed".to_string(),
            ));
        }

        write_continuation(&mut self.writer, &self.write_options, 0)?;

        self.finished = true;
        debug!("stream writer finished");

        Ok(())
    }

    /// Gets a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Gets a mutable reference to the underlying writer.
    ///
    /// It is inadvisable to directly write to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Unwraps the the underlying writer.
    ///
    /// The StreamWriter is finished before returning.
    ///
    /// # Errors
    ///
    /// An ['Err'](Result::Err) may be returned if an error occurs while finishing the StreamWriter
    /// or while flushing the writer.
    ///
    /// # Example
    ///
    /// ```
    /// # use quiver_ipc::writer::StreamWriter;
    /// # use quiver_schema::Schema;
    /// let writer = StreamWriter::try_new(Vec::new(), &Schema::empty()).unwrap();
    /// let bytes = writer.into_inner().unwrap();
    /// // the schema message, then the end-of-stream marker
    /// assert_eq!(&bytes[..4], &[0xff; 4]);
    /// assert_eq!(&bytes[bytes.len() - 8..], &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]);
    /// ```
    pub fn into_inner(mut self) -> Result<W> {
        if !self.finished {
            // `finish` flushes.
            self.finish()?;
        }
        Ok(self.writer)
    }
}

/// Rejects `batch` unless it carries the stream's schema
pub(crate) fn check_batch_schema(schema: &SchemaRef, batch: &RecordBatch) -> Result<()> {
    if batch.schema_ref() != schema {
        return Err(QuiverError::IpcError(format!(
            "Cannot write record batch with schema {} to a stream of schema {}",
            batch.schema_ref(),
            schema
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::StreamReader;
    use quiver_array::{Int32Array, StringArray};
    use quiver_schema::{DataType, Field};

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Utf8, true),
        ]))
    }

    fn batch() -> RecordBatch {
        RecordBatch::try_new(
            schema(),
            vec![
                Int32Array::from(vec![Some(1), None, Some(3)]).into(),
                StringArray::from(vec![Some("x"), Some("yy"), None]).into(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_write_options() {
        assert_eq!(IpcWriteOptions::default().alignment(), 8);
        for alignment in [8, 16, 32, 64] {
            IpcWriteOptions::try_new(alignment, false, MetadataVersion::V5).unwrap();
        }
        let err = IpcWriteOptions::try_new(4, false, MetadataVersion::V5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument error: Alignment should be 8, 16, 32, or 64."
        );
        assert!(IpcWriteOptions::try_new(8, true, MetadataVersion::V5).is_err());
        assert!(IpcWriteOptions::try_new(8, true, MetadataVersion::V4).is_ok());
    }

    #[test]
    fn test_message_framing() {
        for alignment in [8, 16, 32, 64] {
            let options = IpcWriteOptions::try_new(alignment, false, MetadataVersion::V5).unwrap();
            let encoded = IpcDataGenerator::default()
                .encoded_batch(&batch(), &options)
                .unwrap();
            let metadata = encoded.ipc_message.clone();
            let body = encoded.body.clone();

            let mut out = vec![];
            let (metadata_len, body_len) = write_message(&mut out, encoded, &options).unwrap();
            assert_eq!(metadata_len % alignment, 0);
            assert_eq!(body_len, body.len());
            assert_eq!(out.len(), metadata_len + body_len);

            assert_eq!(&out[..4], &CONTINUATION_MARKER);
            let length = i32::from_le_bytes(out[4..8].try_into().unwrap()) as usize;
            assert_eq!(length, metadata_len - 8);
            assert_eq!(&out[8..8 + metadata.len()], metadata.as_slice());
            assert!(out[8 + metadata.len()..metadata_len].iter().all(|b| *b == 0));
            assert_eq!(&out[metadata_len..], body.as_slice());
        }
    }

    #[test]
    fn test_body_layout() {
        let encoded = IpcDataGenerator::default()
            .encoded_batch(&batch(), &IpcWriteOptions::default())
            .unwrap();
        let message = Message::try_from_bytes(&encoded.ipc_message).unwrap();
        let MessageHeader::RecordBatch(header) = message.header else {
            panic!("expected a record batch header");
        };
        assert_eq!(header.length, 3);
        assert_eq!(header.nodes.len(), 2);
        assert_eq!(header.nodes[0].null_count, 1);
        assert!(header.nodes[0].has_validity);
        // validity + values, then validity + offsets + values
        let lengths: Vec<_> = header.buffers.iter().map(|b| b.length).collect();
        assert_eq!(lengths, vec![1, 12, 1, 16, 3]);
        let offsets: Vec<_> = header.buffers.iter().map(|b| b.offset).collect();
        assert_eq!(offsets, vec![0, 1, 13, 14, 30]);
        assert_eq!(message.body_length, 33);
        assert_eq!(encoded.body.len(), 33);
        assert_eq!(&encoded.body[30..], b"xyy");
    }

    #[test]
    fn test_sliced_batch_keeps_whole_buffers() {
        let sliced = batch().slice(1, 2);
        let encoded = IpcDataGenerator::default()
            .encoded_batch(&sliced, &IpcWriteOptions::default())
            .unwrap();
        let message = Message::try_from_bytes(&encoded.ipc_message).unwrap();
        let MessageHeader::RecordBatch(header) = message.header else {
            panic!("expected a record batch header");
        };
        assert_eq!(header.length, 2);
        assert_eq!(header.nodes[0].offset, 1);
        assert_eq!(header.nodes[0].length, 2);
        assert_eq!(header.buffers[1].length, 12);
    }

    #[test]
    fn test_write_after_finish() {
        let mut writer = StreamWriter::try_new(vec![], &schema()).unwrap();
        writer.write(&batch()).unwrap();
        writer.finish().unwrap();
        let err = writer.write(&batch()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ipc error: Cannot write record batch to stream writer as it is closed"
        );
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_write_rejects_other_schema() {
        let other = Arc::new(Schema::new(vec![Field::new("c", DataType::Int32, true)]));
        let other_batch =
            RecordBatch::try_new(other, vec![Int32Array::from(vec![1]).into()]).unwrap();
        let mut writer = StreamWriter::try_new(vec![], &schema()).unwrap();
        let err = writer.write(&other_batch).unwrap_err();
        assert!(matches!(err, QuiverError::IpcError(_)), "{err}");
    }

    #[test]
    fn test_legacy_format() {
        let options = IpcWriteOptions::try_new(8, true, MetadataVersion::V4).unwrap();
        let mut writer = StreamWriter::try_new_with_options(vec![], &schema(), options).unwrap();
        writer.write(&batch()).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_ne!(&bytes[..4], &CONTINUATION_MARKER);
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);

        let mut reader = StreamReader::try_new(bytes.as_slice()).unwrap();
        assert_eq!(reader.next_batch().unwrap(), Some(batch()));
        assert_eq!(reader.next_batch().unwrap(), None);
        assert!(reader.is_finished());
    }

    #[test]
    fn test_buffered_writer() {
        let mut writer = StreamWriter::try_new_buffered(vec![], &schema()).unwrap();
        writer.write(&batch()).unwrap();
        writer.flush().unwrap();
        assert!(!writer.get_ref().get_ref().is_empty());
        let bytes = writer.into_inner().unwrap().into_inner().unwrap();
        let batches: Vec<_> = StreamReader::try_new(bytes.as_slice())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(batches, vec![batch()]);
    }
}
