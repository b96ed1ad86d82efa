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

//! The schema tree and the flattened, precomputed view of it
//! (`SchemaDescriptor`/`ColumnDescriptor`) that the rest of the crate
//! actually works against. Built once at writer/reader construction and
//! immutable afterward.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::basic::{LogicalType, Repetition, Type as PhysicalType};
use crate::errors::{ParquetError, Result};

/// A node in the schema tree: either a typed leaf or a named group of
/// children. `LIST`/`MAP` are not distinct node kinds -- they are groups
/// shaped a particular way by the `list_type`/`map_type` helpers below, per
/// the format's desugaring rule.
#[derive(Debug)]
pub enum Type {
  PrimitiveType {
    basic_info: BasicTypeInfo,
    physical_type: PhysicalType,
    type_length: i32,
    scale: i32,
    precision: i32,
    is_adjusted_to_utc: bool
  },
  GroupType {
    basic_info: BasicTypeInfo,
    fields: Vec<TypePtr>
  }
}

pub type TypePtr = Arc<Type>;

/// Fields shared by every schema node.
#[derive(Clone, Debug)]
pub struct BasicTypeInfo {
  name: String,
  repetition: Option<Repetition>,
  logical_type: LogicalType,
  id: Option<i32>
}

impl BasicTypeInfo {
  /// Used by schema (de)serialization (`file::metadata::schema_from_thrift`)
  /// to rebuild nodes without going through the builders below, which apply
  /// validation the wire format has already guaranteed passed once.
  pub(crate) fn new(name: String, repetition: Option<Repetition>, logical_type: LogicalType, id: Option<i32>) -> Self {
    BasicTypeInfo { name, repetition, logical_type, id }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// `None` only for the implicit file-level root group.
  pub fn repetition(&self) -> Option<Repetition> {
    self.repetition
  }

  pub fn logical_type(&self) -> LogicalType {
    self.logical_type
  }

  pub fn id(&self) -> Option<i32> {
    self.id
  }
}

impl Type {
  pub fn get_basic_info(&self) -> &BasicTypeInfo {
    match self {
      Type::PrimitiveType { basic_info, .. } => basic_info,
      Type::GroupType { basic_info, .. } => basic_info
    }
  }

  pub fn name(&self) -> &str {
    self.get_basic_info().name()
  }

  pub fn is_primitive(&self) -> bool {
    matches!(self, Type::PrimitiveType { .. })
  }

  pub fn is_group(&self) -> bool {
    matches!(self, Type::GroupType { .. })
  }

  pub fn get_physical_type(&self) -> Option<PhysicalType> {
    match self {
      Type::PrimitiveType { physical_type, .. } => Some(*physical_type),
      Type::GroupType { .. } => None
    }
  }

  pub fn get_type_length(&self) -> i32 {
    match self {
      Type::PrimitiveType { type_length, .. } => *type_length,
      Type::GroupType { .. } => 0
    }
  }

  pub fn get_scale(&self) -> i32 {
    match self {
      Type::PrimitiveType { scale, .. } => *scale,
      Type::GroupType { .. } => 0
    }
  }

  pub fn get_precision(&self) -> i32 {
    match self {
      Type::PrimitiveType { precision, .. } => *precision,
      Type::GroupType { .. } => 0
    }
  }

  pub fn is_adjusted_to_utc(&self) -> bool {
    match self {
      Type::PrimitiveType { is_adjusted_to_utc, .. } => *is_adjusted_to_utc,
      Type::GroupType { .. } => false
    }
  }

  pub fn get_fields(&self) -> &[TypePtr] {
    match self {
      Type::GroupType { fields, .. } => fields,
      Type::PrimitiveType { .. } => &[]
    }
  }

  pub fn primitive_type_builder(name: &str, physical_type: PhysicalType) -> PrimitiveTypeBuilder {
    PrimitiveTypeBuilder::new(name, physical_type)
  }

  pub fn group_type_builder(name: &str) -> GroupTypeBuilder {
    GroupTypeBuilder::new(name)
  }
}

pub struct PrimitiveTypeBuilder {
  name: String,
  physical_type: PhysicalType,
  repetition: Repetition,
  logical_type: LogicalType,
  type_length: i32,
  scale: i32,
  precision: i32,
  is_adjusted_to_utc: bool,
  id: Option<i32>
}

impl PrimitiveTypeBuilder {
  pub fn new(name: &str, physical_type: PhysicalType) -> Self {
    PrimitiveTypeBuilder {
      name: name.to_string(),
      physical_type,
      repetition: Repetition::REQUIRED,
      logical_type: LogicalType::NONE,
      type_length: -1,
      scale: -1,
      precision: -1,
      is_adjusted_to_utc: false,
      id: None
    }
  }

  pub fn with_repetition(mut self, repetition: Repetition) -> Self {
    self.repetition = repetition;
    self
  }

  pub fn with_logical_type(mut self, logical_type: LogicalType) -> Self {
    self.logical_type = logical_type;
    self
  }

  pub fn with_length(mut self, length: i32) -> Self {
    self.type_length = length;
    self
  }

  pub fn with_precision(mut self, precision: i32) -> Self {
    self.precision = precision;
    self
  }

  pub fn with_scale(mut self, scale: i32) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_adjusted_to_utc(mut self, flag: bool) -> Self {
    self.is_adjusted_to_utc = flag;
    self
  }

  pub fn with_id(mut self, id: i32) -> Self {
    self.id = Some(id);
    self
  }

  pub fn build(self) -> Result<TypePtr> {
    if self.physical_type == PhysicalType::FIXED_LEN_BYTE_ARRAY && self.type_length < 0 {
      return Err(schema_err!("FIXED_LEN_BYTE_ARRAY {} must declare a positive length", self.name));
    }
    if self.logical_type == LogicalType::UUID
      && (self.physical_type != PhysicalType::FIXED_LEN_BYTE_ARRAY || self.type_length != 16)
    {
      return Err(schema_err!("UUID must annotate a 16-byte FIXED_LEN_BYTE_ARRAY, got {} length {}",
        self.physical_type, self.type_length));
    }
    Ok(Arc::new(Type::PrimitiveType {
      basic_info: BasicTypeInfo {
        name: self.name,
        repetition: Some(self.repetition),
        logical_type: self.logical_type,
        id: self.id
      },
      physical_type: self.physical_type,
      type_length: self.type_length,
      scale: self.scale,
      precision: self.precision,
      is_adjusted_to_utc: self.is_adjusted_to_utc
    }))
  }
}

pub struct GroupTypeBuilder {
  name: String,
  repetition: Option<Repetition>,
  logical_type: LogicalType,
  fields: Vec<TypePtr>,
  id: Option<i32>
}

impl GroupTypeBuilder {
  pub fn new(name: &str) -> Self {
    GroupTypeBuilder { name: name.to_string(), repetition: Some(Repetition::REQUIRED), logical_type: LogicalType::NONE, fields: Vec::new(), id: None }
  }

  pub fn with_repetition(mut self, repetition: Repetition) -> Self {
    self.repetition = Some(repetition);
    self
  }

  /// Used only for the implicit message/file root, which has no repetition.
  pub fn as_root(mut self) -> Self {
    self.repetition = None;
    self
  }

  pub fn with_logical_type(mut self, logical_type: LogicalType) -> Self {
    self.logical_type = logical_type;
    self
  }

  pub fn with_fields(mut self, fields: Vec<TypePtr>) -> Self {
    self.fields = fields;
    self
  }

  pub fn with_id(mut self, id: i32) -> Self {
    self.id = Some(id);
    self
  }

  pub fn build(self) -> Result<TypePtr> {
    Ok(Arc::new(Type::GroupType {
      basic_info: BasicTypeInfo { name: self.name, repetition: self.repetition, logical_type: self.logical_type, id: self.id },
      fields: self.fields
    }))
  }
}

/// `REPEATED(group{<element_name>: <element>})`, the canonical desugared
/// shape a `LIST` node must take. `list_name` is the
/// outer (`OPTIONAL`/`REQUIRED`) field name a record references; the inner
/// repeated group and its single child are synthesized.
pub fn list_type(list_name: &str, repetition: Repetition, element_name: &str, element: TypePtr) -> Result<TypePtr> {
  let repeated_group = Type::group_type_builder(&format!("{}_tuple", list_name))
    .with_repetition(Repetition::REPEATED)
    .with_fields(vec![rename(element, element_name)])
    .build()?;
  Type::group_type_builder(list_name)
    .with_repetition(repetition)
    .with_logical_type(LogicalType::LIST)
    .with_fields(vec![repeated_group])
    .build()
}

/// `REPEATED(group{key: REQUIRED, value: OPTIONAL})`, the canonical
/// desugared shape of a `MAP` node.
pub fn map_type(map_name: &str, repetition: Repetition, key: TypePtr, value: TypePtr) -> Result<TypePtr> {
  if key.get_basic_info().repetition() != Some(Repetition::REQUIRED) {
    return Err(schema_err!("MAP key must be REQUIRED"));
  }
  let key_value = Type::group_type_builder(&format!("{}_key_value", map_name))
    .with_repetition(Repetition::REPEATED)
    .with_logical_type(LogicalType::MAP_KEY_VALUE)
    .with_fields(vec![rename(key, "key"), rename(value, "value")])
    .build()?;
  Type::group_type_builder(map_name)
    .with_repetition(repetition)
    .with_logical_type(LogicalType::MAP)
    .with_fields(vec![key_value])
    .build()
}

fn rename(t: TypePtr, new_name: &str) -> TypePtr {
  if t.name() == new_name {
    return t;
  }
  match &*t {
    Type::PrimitiveType { basic_info, physical_type, type_length, scale, precision, is_adjusted_to_utc } => {
      Arc::new(Type::PrimitiveType {
        basic_info: BasicTypeInfo { name: new_name.to_string(), ..basic_info.clone() },
        physical_type: *physical_type,
        type_length: *type_length,
        scale: *scale,
        precision: *precision,
        is_adjusted_to_utc: *is_adjusted_to_utc
      })
    },
    Type::GroupType { basic_info, fields } => Arc::new(Type::GroupType {
      basic_info: BasicTypeInfo { name: new_name.to_string(), ..basic_info.clone() },
      fields: fields.clone()
    })
  }
}

/// Dot-separated path of field names from the schema root to a leaf.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColumnPath {
  parts: Vec<String>
}

impl ColumnPath {
  pub fn new(parts: Vec<String>) -> Self {
    ColumnPath { parts }
  }

  pub fn parts(&self) -> &[String] {
    &self.parts
  }
}

impl fmt::Display for ColumnPath {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.parts.join("."))
  }
}

impl From<Vec<String>> for ColumnPath {
  fn from(parts: Vec<String>) -> Self {
    ColumnPath::new(parts)
  }
}

/// A leaf's precomputed, read-only view: its own type, its full ancestor
/// path, and the two level bounds everything in `encodings::levels` and
/// `record::shredding` is keyed on.
#[derive(Debug)]
pub struct ColumnDescriptor {
  primitive_type: TypePtr,
  max_def_level: i16,
  max_rep_level: i16,
  path: ColumnPath
}

pub type ColumnDescPtr = Arc<ColumnDescriptor>;

impl ColumnDescriptor {
  pub fn new(primitive_type: TypePtr, max_def_level: i16, max_rep_level: i16, path: ColumnPath) -> Self {
    ColumnDescriptor { primitive_type, max_def_level, max_rep_level, path }
  }

  pub fn primitive_type(&self) -> &TypePtr {
    &self.primitive_type
  }

  pub fn physical_type(&self) -> PhysicalType {
    self.primitive_type.get_physical_type().expect("leaf column must be a primitive type")
  }

  pub fn max_def_level(&self) -> i16 {
    self.max_def_level
  }

  pub fn max_rep_level(&self) -> i16 {
    self.max_rep_level
  }

  pub fn path(&self) -> &ColumnPath {
    &self.path
  }

  pub fn type_length(&self) -> i32 {
    self.primitive_type.get_type_length()
  }
}

/// The flattened, in-order view of a schema tree: every leaf as a
/// `ColumnDescriptor`, plus a name-keyed index for looking one up by its
/// dot path.
#[derive(Debug)]
pub struct SchemaDescriptor {
  root: TypePtr,
  leaves: Vec<ColumnDescPtr>,
  leaf_to_base: Vec<TypePtr>,
  path_to_leaf: HashMap<String, usize>
}

pub type SchemaDescPtr = Arc<SchemaDescriptor>;

impl SchemaDescriptor {
  pub fn new(root: TypePtr) -> Self {
    if !root.is_group() {
      panic!("SchemaDescriptor root must be a group type");
    }
    let mut leaves = Vec::new();
    let mut leaf_to_base = Vec::new();
    let mut path_to_leaf = HashMap::new();
    build_leaves(&root, &root, Vec::new(), 0, 0, &mut leaves, &mut leaf_to_base, &mut path_to_leaf);
    SchemaDescriptor { root, leaves, leaf_to_base, path_to_leaf }
  }

  pub fn root_schema(&self) -> &TypePtr {
    &self.root
  }

  pub fn num_columns(&self) -> usize {
    self.leaves.len()
  }

  pub fn column(&self, i: usize) -> ColumnDescPtr {
    self.leaves[i].clone()
  }

  pub fn columns(&self) -> &[ColumnDescPtr] {
    &self.leaves
  }

  /// The top-level field a leaf belongs to -- used by the shredding engine
  /// to locate the Go-side (well, Rust-side) field a column's values live
  /// under when walking a record.
  pub fn get_column_root(&self, i: usize) -> &TypePtr {
    &self.leaf_to_base[i]
  }

  pub fn get_column_index(&self, path: &ColumnPath) -> Option<usize> {
    self.path_to_leaf.get(&path.to_string()).copied()
  }
}

fn build_leaves(
  root: &TypePtr,
  node: &TypePtr,
  mut path: Vec<String>,
  def_level: i16,
  rep_level: i16,
  leaves: &mut Vec<ColumnDescPtr>,
  leaf_to_base: &mut Vec<TypePtr>,
  path_to_leaf: &mut HashMap<String, usize>
) {
  match &**node {
    Type::PrimitiveType { .. } => {
      path.push(node.name().to_string());
      let column_path = ColumnPath::new(path);
      path_to_leaf.insert(column_path.to_string(), leaves.len());
      leaves.push(Arc::new(ColumnDescriptor {
        primitive_type: node.clone(),
        max_def_level: def_level,
        max_rep_level: rep_level,
        path: column_path
      }));
      leaf_to_base.push(find_base_field(root, node));
    },
    Type::GroupType { fields, .. } => {
      // The implicit file root contributes no path segment; every other
      // group's name is part of its descendants' dot path.
      if !Arc::ptr_eq(node, root) {
        path.push(node.name().to_string());
      }
      for field in fields {
        let (child_def, child_rep) = match field.get_basic_info().repetition() {
          Some(Repetition::OPTIONAL) => (def_level + 1, rep_level),
          Some(Repetition::REPEATED) => (def_level + 1, rep_level + 1),
          Some(Repetition::REQUIRED) | None => (def_level, rep_level)
        };
        build_leaves(root, field, path.clone(), child_def, child_rep, leaves, leaf_to_base, path_to_leaf);
      }
    }
  }
}

/// Finds which direct child of the schema root `leaf` descends from.
fn find_base_field(root: &TypePtr, leaf: &TypePtr) -> TypePtr {
  for field in root.get_fields() {
    if contains(field, leaf) {
      return field.clone();
    }
  }
  // `leaf` is itself a direct child of the root.
  leaf.clone()
}

fn contains(node: &TypePtr, target: &TypePtr) -> bool {
  if Arc::ptr_eq(node, target) {
    return true;
  }
  node.get_fields().iter().any(|f| contains(f, target))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn addressbook_schema() -> TypePtr {
    let phone_number = Type::primitive_type_builder("phoneNumber", PhysicalType::BYTE_ARRAY)
      .with_repetition(Repetition::OPTIONAL)
      .with_logical_type(LogicalType::UTF8)
      .build()
      .unwrap();
    let name = Type::primitive_type_builder("name", PhysicalType::BYTE_ARRAY)
      .with_repetition(Repetition::REQUIRED)
      .with_logical_type(LogicalType::UTF8)
      .build()
      .unwrap();
    let contacts = Type::group_type_builder("contacts")
      .with_repetition(Repetition::REPEATED)
      .with_fields(vec![name, phone_number])
      .build()
      .unwrap();
    let owner = Type::primitive_type_builder("owner", PhysicalType::BYTE_ARRAY)
      .with_repetition(Repetition::REQUIRED)
      .with_logical_type(LogicalType::UTF8)
      .build()
      .unwrap();
    let owner_phones = Type::primitive_type_builder("ownerPhoneNumbers", PhysicalType::BYTE_ARRAY)
      .with_repetition(Repetition::REPEATED)
      .with_logical_type(LogicalType::UTF8)
      .build()
      .unwrap();
    Type::group_type_builder("AddressBook")
      .as_root()
      .with_fields(vec![owner, owner_phones, contacts])
      .build()
      .unwrap()
  }

  #[test]
  fn test_addressbook_levels() {
    let schema = SchemaDescriptor::new(addressbook_schema());
    assert_eq!(schema.num_columns(), 4);

    let owner = schema.column(0);
    assert_eq!(owner.path().to_string(), "owner");
    assert_eq!(owner.max_def_level(), 0);
    assert_eq!(owner.max_rep_level(), 0);

    let owner_phones = schema.column(1);
    assert_eq!(owner_phones.max_def_level(), 1);
    assert_eq!(owner_phones.max_rep_level(), 1);

    let contacts_name = schema.column(2);
    assert_eq!(contacts_name.path().to_string(), "contacts.name");
    assert_eq!(contacts_name.max_def_level(), 1);
    assert_eq!(contacts_name.max_rep_level(), 1);

    let contacts_phone = schema.column(3);
    assert_eq!(contacts_phone.path().to_string(), "contacts.phoneNumber");
    assert_eq!(contacts_phone.max_def_level(), 2);
    assert_eq!(contacts_phone.max_rep_level(), 1);
  }

  #[test]
  fn test_list_type_desugars_to_repeated_group() {
    let element = Type::primitive_type_builder("element", PhysicalType::INT32).build().unwrap();
    let list = list_type("values", Repetition::OPTIONAL, "element", element).unwrap();
    assert_eq!(list.get_basic_info().logical_type(), LogicalType::LIST);
    assert_eq!(list.get_fields().len(), 1);
    assert_eq!(list.get_fields()[0].get_basic_info().repetition(), Some(Repetition::REPEATED));
  }

  #[test]
  fn test_fixed_len_byte_array_requires_length() {
    let err = Type::primitive_type_builder("x", PhysicalType::FIXED_LEN_BYTE_ARRAY).build();
    assert!(err.is_err());
  }

  #[test]
  fn test_uuid_requires_16_byte_fixed_len() {
    let err = Type::primitive_type_builder("id", PhysicalType::FIXED_LEN_BYTE_ARRAY)
      .with_length(4)
      .with_logical_type(LogicalType::UUID)
      .build();
    assert!(err.is_err());

    let ok = Type::primitive_type_builder("id", PhysicalType::FIXED_LEN_BYTE_ARRAY)
      .with_length(16)
      .with_logical_type(LogicalType::UUID)
      .build();
    assert!(ok.is_ok());
  }
}
