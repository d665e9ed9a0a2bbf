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

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::datatype::DataType;
use crate::error::{QuiverError, Result};

/// Describes a single column in a [`Schema`](super::Schema).
///
/// A [`Schema`](super::Schema) is an ordered collection of
/// [`Field`] objects.
///
/// Field metadata is an ordered map, so two fields carrying the same key-value
/// pairs compare and hash equal regardless of insertion order. A field without
/// metadata is equal to one with an empty map.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    data_type: DataType,
    nullable: bool,
    metadata: BTreeMap<String, String>,
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.nullable == other.nullable
            && self.metadata == other.metadata
    }
}

impl Eq for Field {}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then(self.data_type.cmp(other.data_type()))
            .then(self.nullable.cmp(&other.nullable))
            .then(self.metadata.cmp(&other.metadata))
    }
}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.data_type.hash(state);
        self.nullable.hash(state);
        self.metadata.hash(state);
    }
}

impl Field {
    /// Creates a new field with the given name, data type and nullability.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or only whitespace, see [`Self::try_new`]
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        match Self::try_new(name, data_type, nullable) {
            Ok(field) => field,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates a new field, returning an error if `name` is empty or only whitespace
    pub fn try_new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(QuiverError::InvalidArgumentError(
                "Field name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            data_type,
            nullable,
            metadata: BTreeMap::new(),
        })
    }

    /// Sets the `Field`'s custom metadata, replacing any existing entries
    #[inline]
    pub fn set_metadata(&mut self, metadata: BTreeMap<String, String>) {
        self.metadata = metadata;
    }

    /// Sets the metadata of this `Field` to be `metadata` and returns self
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.set_metadata(metadata);
        self
    }

    /// Returns the `Field`'s custom metadata, empty if none was set
    #[inline]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Returns true if this field carries at least one metadata entry
    #[inline]
    pub fn has_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }

    /// Returns an immutable reference to the `Field`'s name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns an immutable reference to the `Field`'s [`DataType`].
    #[inline]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Indicates whether this [`Field`] supports null values.
    #[inline]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns a copy of this field with `name`
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or only whitespace
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self::new(name, self.data_type, self.nullable).with_metadata(self.metadata)
    }

    /// Returns a copy of this field with the nullability set to `nullable`
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
