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

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{QuiverError, Result};
use crate::field::Field;

/// A reference-counted reference to a [`Schema`].
pub type SchemaRef = Arc<Schema>;

/// Describes the meta-data of an ordered sequence of relative types.
///
/// Field names are unique under a case-insensitive comparison. Lookups by name
/// go through an index derived from the field list, which every mutating
/// method rebuilds, so the two can never disagree.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    metadata: BTreeMap<String, String>,
    /// Lower-cased field name to position in `fields`
    index: HashMap<String, usize>,
}

fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

fn build_index(fields: &[Field]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        if let Some(prev) = index.insert(name_key(field.name()), i) {
            return Err(QuiverError::SchemaError(format!(
                "Schema contains duplicate field name \"{}\" at positions {} and {}",
                field.name(),
                prev,
                i
            )));
        }
    }
    Ok(index)
}

impl Schema {
    /// Creates an empty `Schema`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a new [`Schema`] from a sequence of [`Field`] values.
    ///
    /// # Panics
    ///
    /// Panics if two fields share a name, see [`Self::try_new`]
    ///
    /// # Example
    ///
    /// ```
    /// # use quiver_schema::*;
    /// let field_a = Field::new("a", DataType::Int64, false);
    /// let field_b = Field::new("b", DataType::Boolean, false);
    ///
    /// let schema = Schema::new(vec![field_a, field_b]);
    /// assert_eq!(schema.index_of("B").unwrap(), 1);
    /// ```
    pub fn new(fields: Vec<Field>) -> Self {
        match Self::try_new(fields, BTreeMap::new()) {
            Ok(schema) => schema,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates a new [`Schema`] from a sequence of [`Field`] values and
    /// associated metadata.
    ///
    /// Returns an error if two fields have names that are equal ignoring case.
    pub fn try_new(fields: Vec<Field>, metadata: BTreeMap<String, String>) -> Result<Self> {
        let index = build_index(&fields)?;
        Ok(Self {
            fields,
            metadata,
            index,
        })
    }

    /// Sets the metadata of this `Schema` to be `metadata` and returns self
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the fields of this schema, in order
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if this schema has no fields
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the [`Field`] at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    /// Returns the [`Field`] with the given name, ignoring case, or `None`
    /// if there is no such field
    pub fn field_with_name(&self, name: &str) -> Option<&Field> {
        self.index.get(&name_key(name)).map(|i| &self.fields[*i])
    }

    /// Find the index of the column with the given name, ignoring case.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index.get(&name_key(name)).copied().ok_or_else(|| {
            let valid_fields: Vec<&str> = self.fields.iter().map(|f| f.name()).collect();
            QuiverError::SchemaError(format!(
                "Unable to get field named \"{name}\". Valid fields: {valid_fields:?}"
            ))
        })
    }

    /// Find the index of the single field whose name matches `name` under
    /// `comparer`.
    ///
    /// Names are only guaranteed unique under the default case-insensitive
    /// comparison used by [`Self::index_of`]. A `comparer` that matches more
    /// than one field is a usage error and is reported as such rather than
    /// resolved to one of the candidates.
    pub fn index_of_with<F>(&self, name: &str, comparer: F) -> Result<usize>
    where
        F: Fn(&str, &str) -> bool,
    {
        let mut matches = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| comparer(f.name(), name))
            .map(|(i, _)| i);

        match (matches.next(), matches.next()) {
            (Some(i), None) => Ok(i),
            (None, _) => Err(QuiverError::SchemaError(format!(
                "Unable to get field named \"{name}\""
            ))),
            (Some(_), Some(_)) => Err(QuiverError::SchemaError(format!(
                "Field name \"{name}\" is ambiguous under the supplied comparer"
            ))),
        }
    }

    /// Returns true if this schema contains a field equal to `field`
    pub fn contains(&self, field: &Field) -> bool {
        self.field_with_name(field.name()) == Some(field)
    }

    /// Inserts `field` at position `index`, shifting later fields to the right.
    ///
    /// Returns an error, leaving the schema unchanged, if `index > len` or a
    /// field with the same name already exists.
    pub fn add_field(&mut self, index: usize, field: Field) -> Result<()> {
        if index > self.fields.len() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Cannot insert field at index {index} into schema with {} fields",
                self.fields.len()
            )));
        }
        if let Some(existing) = self.index.get(&name_key(field.name())) {
            return Err(QuiverError::SchemaError(format!(
                "Schema already contains a field named \"{}\" at position {existing}",
                field.name()
            )));
        }
        self.fields.insert(index, field);
        self.reindex();
        Ok(())
    }

    /// Removes and returns the field at position `index`
    pub fn remove_field(&mut self, index: usize) -> Result<Field> {
        self.check_bounds(index)?;
        let field = self.fields.remove(index);
        self.reindex();
        Ok(field)
    }

    /// Replaces the field at position `index` with `field`, returning the
    /// previous field.
    ///
    /// Returns an error, leaving the schema unchanged, if `index` is out of
    /// bounds or `field`'s name collides with a field at another position.
    pub fn set_field(&mut self, index: usize, field: Field) -> Result<Field> {
        self.check_bounds(index)?;
        match self.index.get(&name_key(field.name())) {
            Some(existing) if *existing != index => {
                return Err(QuiverError::SchemaError(format!(
                    "Schema already contains a field named \"{}\" at position {existing}",
                    field.name()
                )))
            }
            _ => {}
        }
        let previous = std::mem::replace(&mut self.fields[index], field);
        self.reindex();
        Ok(previous)
    }

    /// Returns the schema level metadata
    #[inline]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Returns true if this schema carries at least one metadata entry
    #[inline]
    pub fn has_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }

    fn check_bounds(&self, index: usize) -> Result<()> {
        if index >= self.fields.len() {
            return Err(QuiverError::InvalidArgumentError(format!(
                "Field index {index} out of range for schema with {} fields",
                self.fields.len()
            )));
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (name_key(f.name()), i))
            .collect();
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(
            &self
                .fields
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
                .join(", "),
        )
    }
}

// The name index is derived from `fields` and excluded from comparison
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.metadata == other.metadata
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
        self.metadata.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    fn person() -> Schema {
        Schema::new(vec![
            Field::new("first_name", DataType::Utf8, false),
            Field::new("last_name", DataType::Utf8, false),
            Field::new("age", DataType::UInt8, true),
        ])
    }

    fn hash(schema: &Schema) -> u64 {
        let mut s = DefaultHasher::new();
        schema.hash(&mut s);
        s.finish()
    }

    fn assert_index_consistent(schema: &Schema) {
        assert_eq!(schema.index.len(), schema.len());
        for (i, field) in schema.fields().iter().enumerate() {
            assert_eq!(schema.index_of(field.name()).unwrap(), i);
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Schema::try_new(
            vec![
                Field::new("a", DataType::Int32, true),
                Field::new("A", DataType::Int64, true),
            ],
            BTreeMap::new(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema error: Schema contains duplicate field name \"A\" at positions 0 and 1"
        );
    }

    #[test]
    fn test_names_fold_ascii_case_only() {
        // only ASCII letters are folded, so these names stay distinct
        let schema = Schema::try_new(
            vec![
                Field::new("\u{c9}t\u{e9}", DataType::Int32, true),
                Field::new("\u{e9}t\u{e9}", DataType::Int32, true),
            ],
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(schema.index_of("\u{e9}T\u{e9}").unwrap(), 1);
        assert!(schema.index_of("\u{c9}T\u{c9}").is_err());
    }

    #[test]
    fn test_lookup() {
        let schema = person();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.field(2).name(), "age");
        assert_eq!(schema.index_of("LAST_NAME").unwrap(), 1);
        assert_eq!(
            schema.field_with_name("Age").unwrap().data_type(),
            &DataType::UInt8
        );
        assert!(schema.field_with_name("nickname").is_none());

        let err = schema.index_of("nickname").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema error: Unable to get field named \"nickname\". Valid fields: [\"first_name\", \"last_name\", \"age\"]"
        );
    }

    #[test]
    fn test_index_of_with() {
        let schema = person();
        assert_eq!(schema.index_of_with("age", |a, b| a == b).unwrap(), 2);
        assert!(schema.index_of_with("AGE", |a, b| a == b).is_err());

        let suffix = |field: &str, name: &str| field.ends_with(name);
        let err = schema.index_of_with("name", suffix).unwrap_err();
        assert!(err.to_string().contains("ambiguous"), "{err}");
        assert_eq!(schema.index_of_with("first_name", suffix).unwrap(), 0);
    }

    #[test]
    fn test_add_field() {
        let mut schema = person();
        schema
            .add_field(1, Field::new("middle_name", DataType::Utf8, true))
            .unwrap();
        assert_eq!(schema.index_of("middle_name").unwrap(), 1);
        assert_eq!(schema.index_of("age").unwrap(), 3);
        assert_index_consistent(&schema);

        schema
            .add_field(4, Field::new("height", DataType::Float32, true))
            .unwrap();
        assert_eq!(schema.field(4).name(), "height");
        assert_index_consistent(&schema);
    }

    #[test]
    fn test_add_field_errors_leave_schema_unchanged() {
        let mut schema = person();
        let err = schema
            .add_field(4, Field::new("x", DataType::Int8, true))
            .unwrap_err();
        assert!(matches!(err, QuiverError::InvalidArgumentError(_)));

        let err = schema
            .add_field(0, Field::new("AGE", DataType::Int8, true))
            .unwrap_err();
        assert!(matches!(err, QuiverError::SchemaError(_)));
        assert_eq!(schema, person());
        assert_index_consistent(&schema);
    }

    #[test]
    fn test_remove_field() {
        let mut schema = person();
        let removed = schema.remove_field(0).unwrap();
        assert_eq!(removed.name(), "first_name");
        assert_eq!(schema.len(), 2);
        assert!(schema.field_with_name("first_name").is_none());
        assert_eq!(schema.index_of("age").unwrap(), 1);
        assert_index_consistent(&schema);

        assert!(schema.remove_field(2).is_err());
    }

    #[test]
    fn test_set_field_rekeys() {
        let mut schema = person();
        let previous = schema
            .set_field(1, Field::new("surname", DataType::Utf8, false))
            .unwrap();
        assert_eq!(previous.name(), "last_name");
        assert!(schema.field_with_name("last_name").is_none());
        assert_eq!(schema.index_of("surname").unwrap(), 1);
        assert_index_consistent(&schema);

        // replacing a field with one of the same name is allowed
        schema
            .set_field(2, Field::new("Age", DataType::UInt16, true))
            .unwrap();
        assert_eq!(schema.field(2).data_type(), &DataType::UInt16);

        let err = schema
            .set_field(0, Field::new("surname", DataType::Utf8, true))
            .unwrap_err();
        assert!(matches!(err, QuiverError::SchemaError(_)));
        assert!(schema.set_field(3, Field::new("z", DataType::Utf8, true)).is_err());
        assert_index_consistent(&schema);
    }

    #[test]
    fn test_equality_and_hash() {
        let mut metadata = BTreeMap::new();
        metadata.insert("origin".to_string(), "test".to_string());

        let s1 = person().with_metadata(metadata.clone());
        let s2 = person().with_metadata(metadata);
        assert_eq!(s1, s1);
        assert_eq!(s1, s2);
        assert_eq!(s2, s1);
        assert_eq!(hash(&s1), hash(&s2));

        assert_ne!(s1, person());
        assert_eq!(person(), person().with_metadata(BTreeMap::new()));

        // field order matters
        let mut fields = person().fields().to_vec();
        fields.swap(0, 1);
        assert_ne!(Schema::new(fields), person());
    }

    #[test]
    fn test_equality_ignores_mutation_history() {
        let mut mutated = person();
        let age = mutated.remove_field(2).unwrap();
        mutated.add_field(2, age).unwrap();
        assert_eq!(mutated, person());
        assert_eq!(hash(&mutated), hash(&person()));
    }

    #[test]
    fn test_contains() {
        let schema = person();
        assert!(schema.contains(&Field::new("age", DataType::UInt8, true)));
        assert!(!schema.contains(&Field::new("age", DataType::UInt8, false)));
        assert!(Schema::empty().is_empty());
    }
}
