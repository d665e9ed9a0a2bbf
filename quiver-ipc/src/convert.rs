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

//! Utilities for converting between IPC message metadata and quiver types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quiver_schema::{DataType, Field, QuiverError, Result, Schema};

use crate::MetadataVersion;

/// The metadata of one IPC message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The metadata version the message was written with
    pub version: MetadataVersion,
    /// The message payload description
    pub header: MessageHeader,
    /// The number of body bytes following the metadata
    pub body_length: usize,
}

/// The kind of an IPC message, with its description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageHeader {
    /// A schema message, the first message of a stream
    Schema(IpcSchema),
    /// A record batch message, whose buffers are in the body
    RecordBatch(IpcRecordBatch),
}

impl MessageHeader {
    /// Returns a short name for this header kind, used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            MessageHeader::Schema(_) => "Schema",
            MessageHeader::RecordBatch(_) => "RecordBatch",
        }
    }
}

/// The description of a [`Schema`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcSchema {
    /// The fields of the schema, in order
    pub fields: Vec<IpcField>,
    /// The schema level metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// The description of a [`Field`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcField {
    /// The field name
    pub name: String,
    /// The field type
    pub data_type: DataType,
    /// Whether the field may hold nulls
    pub nullable: bool,
    /// The field level metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// The description of a record batch whose buffers follow in the message body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcRecordBatch {
    /// The number of rows in the batch
    pub length: usize,
    /// One node per column, in schema order
    pub nodes: Vec<FieldNode>,
    /// The location in the body of every buffer, in column order and for
    /// each column validity first
    pub buffers: Vec<BufferSpec>,
}

/// The shape of one column of a record batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    /// The number of slots in the column
    pub length: usize,
    /// The number of null slots in the column
    pub null_count: usize,
    /// The slot offset into the column's buffers
    pub offset: usize,
    /// Whether a validity bitmap precedes the layout buffers
    pub has_validity: bool,
}

/// The location of a buffer within a message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSpec {
    /// The byte offset from the start of the body
    pub offset: usize,
    /// The length in bytes
    pub length: usize,
}

impl Message {
    /// Serialize this message's metadata
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            QuiverError::IpcError(format!("Unable to encode {} message: {e}", self.header.name()))
        })
    }

    /// Deserialize message metadata, ignoring trailing zero padding
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |p| p + 1);
        serde_json::from_slice(&bytes[..end]).map_err(|e| {
            QuiverError::IpcError(format!("Unable to decode message metadata: {e}"))
        })
    }
}

/// Serialize a schema in IPC format
pub fn schema_to_ipc(schema: &Schema) -> IpcSchema {
    IpcSchema {
        fields: schema.fields().iter().map(field_to_ipc).collect(),
        metadata: schema.metadata().clone(),
    }
}

fn field_to_ipc(field: &Field) -> IpcField {
    IpcField {
        name: field.name().to_string(),
        data_type: *field.data_type(),
        nullable: field.is_nullable(),
        metadata: field.metadata().clone(),
    }
}

/// Deserialize an IPC schema description into a [`Schema`]
///
/// Fails if a field name is empty or names collide
pub fn ipc_to_schema(ipc: IpcSchema) -> Result<Schema> {
    let fields = ipc
        .fields
        .into_iter()
        .map(|f| Ok(Field::try_new(f.name, f.data_type, f.nullable)?.with_metadata(f.metadata)))
        .collect::<Result<Vec<_>>>()?;
    Schema::try_new(fields, ipc.metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_message(schema: &Schema) -> Message {
        Message {
            version: MetadataVersion::V5,
            header: MessageHeader::Schema(schema_to_ipc(schema)),
            body_length: 0,
        }
    }

    #[test]
    fn convert_schema_round_trip() {
        let md: BTreeMap<String, String> = [("Key".to_string(), "value".to_string())]
            .into_iter()
            .collect();
        let schema = Schema::new(vec![
            Field::new("uint8", DataType::UInt8, false).with_metadata(md.clone()),
            Field::new("float16", DataType::Float16, true),
            Field::new("date64", DataType::Date64, true),
            Field::new("utf8", DataType::Utf8, false),
            Field::new("binary", DataType::Binary, true),
            Field::new("null", DataType::Null, true),
            Field::new("bool", DataType::Boolean, false),
        ])
        .with_metadata(md);

        let bytes = schema_message(&schema).to_bytes().unwrap();
        let decoded = Message::try_from_bytes(&bytes).unwrap();
        let MessageHeader::Schema(ipc) = decoded.header else {
            panic!("expected a schema header");
        };
        assert_eq!(ipc_to_schema(ipc).unwrap(), schema);
    }

    #[test]
    fn message_ignores_padding() {
        let schema = Schema::new(vec![Field::new("a", DataType::Int32, true)]);
        let mut bytes = schema_message(&schema).to_bytes().unwrap();
        bytes.resize(bytes.len() + 5, 0);
        assert_eq!(
            Message::try_from_bytes(&bytes).unwrap(),
            schema_message(&schema)
        );
    }

    #[test]
    fn message_rejects_garbage() {
        let err = Message::try_from_bytes(b"{\"version\":").unwrap_err();
        assert!(matches!(err, QuiverError::IpcError(_)), "{err}");
        assert!(Message::try_from_bytes(&[0; 8]).is_err());
    }

    #[test]
    fn ipc_schema_rejects_duplicate_names() {
        let ipc = IpcSchema {
            fields: ["a", "A"]
                .into_iter()
                .map(|name| IpcField {
                    name: name.to_string(),
                    data_type: DataType::Int8,
                    nullable: true,
                    metadata: BTreeMap::new(),
                })
                .collect(),
            metadata: BTreeMap::new(),
        };
        let err = ipc_to_schema(ipc).unwrap_err();
        assert!(matches!(err, QuiverError::SchemaError(_)), "{err}");
    }

    #[test]
    fn record_batch_header_round_trip() {
        let message = Message {
            version: MetadataVersion::V5,
            header: MessageHeader::RecordBatch(IpcRecordBatch {
                length: 3,
                nodes: vec![FieldNode {
                    length: 3,
                    null_count: 1,
                    offset: 2,
                    has_validity: true,
                }],
                buffers: vec![
                    BufferSpec { offset: 0, length: 1 },
                    BufferSpec { offset: 1, length: 20 },
                ],
            }),
            body_length: 21,
        };
        let bytes = message.to_bytes().unwrap();
        assert_eq!(Message::try_from_bytes(&bytes).unwrap(), message);
    }
}
