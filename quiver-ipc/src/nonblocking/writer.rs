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
use std::sync::Arc;

use log::{debug, trace, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use quiver_array::RecordBatch;
use quiver_schema::{QuiverError, Result, Schema, SchemaRef};

use crate::writer::{
    check_batch_schema, write_continuation, write_message, IpcDataGenerator, IpcWriteOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Finished,
    /// A write failed or was cancelled part way
    Failed,
}

/// Async writer for the quiver stream format
///
/// Messages are encoded in memory and then written with a single
/// `write_all`, so a cancelled write may have written part of a message.
#[derive(Debug)]
pub struct AsyncStreamWriter<W> {
    writer: W,
    write_options: IpcWriteOptions,
    schema: SchemaRef,
    state: WriterState,
    data_gen: IpcDataGenerator,
}

impl<W: AsyncWrite + Unpin> AsyncStreamWriter<W> {
    /// Try to create a new writer, writing the schema message
    pub async fn try_new(writer: W, schema: &Schema) -> Result<Self> {
        Self::try_new_with_options(writer, schema, IpcWriteOptions::default()).await
    }

    /// Try to create a new writer with [`IpcWriteOptions`], writing the schema message
    pub async fn try_new_with_options(
        writer: W,
        schema: &Schema,
        write_options: IpcWriteOptions,
    ) -> Result<Self> {
        let mut this = Self {
            writer,
            write_options,
            schema: Arc::new(schema.clone()),
            state: WriterState::Open,
            data_gen: IpcDataGenerator::default(),
        };
        let encoded = this.data_gen.schema_to_bytes(schema, &this.write_options)?;
        let mut frame = vec![];
        write_message(&mut frame, encoded, &this.write_options)?;
        this.write_frame(&frame, pending()).await?;
        debug!("wrote schema message with {} fields", schema.len());
        Ok(this)
    }

    /// Returns the schema of the stream
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Write a record batch to the stream
    pub async fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.write_with_cancellation(batch, pending()).await
    }

    /// Write a record batch to the stream, unless `signal` completes first
    pub async fn write_with_cancellation<F>(&mut self, batch: &RecordBatch, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.check_open("record batch")?;
        check_batch_schema(&self.schema, batch)?;

        let encoded = self.data_gen.encoded_batch(batch, &self.write_options)?;
        let mut frame = vec![];
        write_message(&mut frame, encoded, &self.write_options)?;
        self.write_frame(&frame, signal).await?;
        trace!("wrote record batch of {} rows", batch.num_rows());
        Ok(())
    }

    /// Write the end-of-stream marker, and mark the stream as done
    pub async fn finish(&mut self) -> Result<()> {
        self.finish_with_cancellation(pending()).await
    }

    /// Write the end-of-stream marker unless `signal` completes first
    pub async fn finish_with_cancellation<F>(&mut self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.check_open("footer")?;
        let mut frame = vec![];
        write_continuation(&mut frame, &self.write_options, 0)?;
        self.write_frame(&frame, signal).await?;
        self.state = WriterState::Finished;
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

    /// Unwraps the underlying writer, without writing the end-of-stream marker
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn check_open(&self, what: &str) -> Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Finished => Err(QuiverError::IpcError(format!(
                "Cannot write {what} to stream writer as it is closed"
            ))),
            WriterState::Failed => {
                warn!("stream writer used after a previous error");
                Err(QuiverError::IpcError(
                    "Stream writer cannot be used after a previous error".to_string(),
                ))
            }
        }
    }

    async fn write_frame<F>(&mut self, frame: &[u8], signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let writer = &mut self.writer;
        let result = tokio::select! {
            biased;
            _ = signal => Err(QuiverError::Cancelled(
                "stream write cancelled".to_string(),
            )),
            r = async {
                writer.write_all(frame).await?;
                writer.flush().await?;
                Ok::<_, QuiverError>(())
            } => r,
        };
        if result.is_err() {
            self.state = WriterState::Failed;
        }
        result
    }
}
