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

//! The Dremel shredding engine: converts a nested `Row` into per-column
//! `(value, repetition_level, definition_level)` streams and back.
//!
//! `deconstruct` and `reconstruct` both walk the schema tree in lockstep
//! with a record (or, for reconstruction, with a set of column cursors),
//! threading two depth counters as they descend: `def_depth`, the maximum
//! definition level reachable at the current node if everything down to it
//! is present, and `rep_depth`, the same for repetition level. Both are
//! exactly the quantities `schema::types::build_leaves` precomputes per
//! leaf; here they are recomputed level-by-level because interior nodes
//! need them too, not just leaves.

use crate::schema::types::{SchemaDescriptor, Type, TypePtr};
use crate::basic::Repetition;
use crate::errors::Result;

use super::api::{Row, RowField};

/// One column's worth of shredded values, in record order. `entries[i]` is
/// `(value, repetition_level, definition_level)`; `value` is `None` exactly
/// when `definition_level < ` the column's `max_definition_level`.
#[derive(Clone, Debug, Default)]
pub struct ColumnTriples {
  pub column_index: usize,
  pub entries: Vec<(Option<RowField>, i16, i16)>
}

impl ColumnTriples {
  pub fn new(column_index: usize) -> Self {
    ColumnTriples { column_index, entries: Vec::new() }
  }

  pub fn rep_levels(&self) -> Vec<i16> {
    self.entries.iter().map(|(_, r, _)| *r).collect()
  }

  pub fn def_levels(&self) -> Vec<i16> {
    self.entries.iter().map(|(_, _, d)| *d).collect()
  }

  pub fn values(&self) -> impl Iterator<Item = &RowField> {
    self.entries.iter().filter_map(|(v, _, _)| v.as_ref())
  }

  pub fn null_count(&self) -> u64 {
    self.entries.iter().filter(|(v, _, _)| v.is_none()).count() as u64
  }

  fn extend(&mut self, other: ColumnTriples) {
    self.entries.extend(other.entries);
  }
}

/// Shreds one record into its per-leaf-column triple streams, ordered to
/// match `schema.columns()`. Fails with `ParquetError::Schema` when the
/// record's shape disagrees with the schema -- a missing required field, or
/// a `RowField` variant that doesn't match what the schema node expects.
pub fn deconstruct(schema: &SchemaDescriptor, record: &Row) -> Result<Vec<ColumnTriples>> {
  let mut out: Vec<ColumnTriples> = (0..schema.num_columns()).map(ColumnTriples::new).collect();
  let root = schema.root_schema();
  let mut col_idx = 0usize;
  for field in root.get_fields() {
    let value = record.get(field.name());
    shred_field(field, value, 0, 0, 0, &mut col_idx, &mut out)?;
  }
  Ok(out)
}

/// Shreds a whole batch of records, concatenating each column's triples in
/// record order -- the shape a row group assembler feeds to `ColumnWriterImpl`.
pub fn deconstruct_batch(schema: &SchemaDescriptor, records: &[Row]) -> Result<Vec<ColumnTriples>> {
  let mut out: Vec<ColumnTriples> = (0..schema.num_columns()).map(ColumnTriples::new).collect();
  for record in records {
    for (col, one) in out.iter_mut().zip(deconstruct(schema, record)?) {
      col.extend(one);
    }
  }
  Ok(out)
}

fn shred_field(
  field: &TypePtr,
  value: Option<&RowField>,
  parent_def_depth: i16,
  parent_rep_depth: i16,
  emit_rep: i16,
  col_idx: &mut usize,
  out: &mut [ColumnTriples]
) -> Result<()> {
  match field.get_basic_info().repetition() {
    Some(Repetition::REQUIRED) | None => {
      let v = value.ok_or_else(|| schema_err!("required field `{}` missing a value", field.name()))?;
      shred_present(field, v, parent_def_depth, parent_rep_depth, emit_rep, col_idx, out)
    },
    Some(Repetition::OPTIONAL) => match value {
      None | Some(RowField::Null) => {
        emit_absent(field, emit_rep, parent_def_depth, col_idx, out);
        Ok(())
      },
      Some(inner) => shred_present(field, inner, parent_def_depth + 1, parent_rep_depth, emit_rep, col_idx, out)
    },
    Some(Repetition::REPEATED) => {
      let def_depth = parent_def_depth + 1;
      let rep_depth = parent_rep_depth + 1;
      match value {
        None => {
          emit_absent(field, emit_rep, parent_def_depth, col_idx, out);
          Ok(())
        },
        Some(RowField::List(items)) if items.is_empty() => {
          emit_absent(field, emit_rep, parent_def_depth, col_idx, out);
          Ok(())
        },
        Some(RowField::List(items)) => {
          for (i, item) in items.iter().enumerate() {
            let r = if i == 0 { emit_rep } else { rep_depth };
            shred_present(field, item, def_depth, rep_depth, r, col_idx, out)?;
          }
          Ok(())
        },
        Some(other) => Err(schema_err!("repeated field `{}` must be bound to a RowField::List, got {:?}", field.name(), other))
      }
    }
  }
}

/// `value` is the content bound at `field` once its own OPTIONAL/REPEATED
/// gate (if any) has already let it through -- a scalar for a leaf, a
/// `RowField::Group` for a group (one list element, if `field` is repeated).
fn shred_present(
  field: &TypePtr,
  value: &RowField,
  def_depth: i16,
  rep_depth: i16,
  emit_rep: i16,
  col_idx: &mut usize,
  out: &mut [ColumnTriples]
) -> Result<()> {
  match &**field {
    Type::PrimitiveType { .. } => {
      let i = *col_idx;
      *col_idx += 1;
      out[i].entries.push((Some(value.clone()), emit_rep, def_depth));
      Ok(())
    },
    Type::GroupType { fields, .. } => {
      let row = match value {
        RowField::Group(row) => row,
        other => return Err(schema_err!("group field `{}` must be bound to a RowField::Group, got {:?}", field.name(), other))
      };
      for f in fields {
        let child_value = row.get(f.name());
        shred_field(f, child_value, def_depth, rep_depth, emit_rep, col_idx, out)?;
      }
      Ok(())
    }
  }
}

/// Emits one null triple per leaf beneath `field` (including `field` itself
/// if it is a leaf), all carrying the same `rep_level`/`def_level` -- nothing
/// under an absent ancestor can be more defined than the ancestor is.
fn emit_absent(field: &TypePtr, rep_level: i16, def_level: i16, col_idx: &mut usize, out: &mut [ColumnTriples]) {
  match &**field {
    Type::PrimitiveType { .. } => {
      let i = *col_idx;
      *col_idx += 1;
      out[i].entries.push((None, rep_level, def_level));
    },
    Type::GroupType { fields, .. } => {
      for f in fields {
        emit_absent(f, rep_level, def_level, col_idx, out);
      }
    }
  }
}

/// Read-side cursor over one column's triples, advanced by `reconstruct`.
struct ColumnCursor<'a> {
  entries: &'a [(Option<RowField>, i16, i16)],
  pos: usize
}

impl<'a> ColumnCursor<'a> {
  fn peek(&self) -> Option<(i16, i16)> {
    self.entries.get(self.pos).map(|(_, r, d)| (*r, *d))
  }

  fn take(&mut self) -> Option<RowField> {
    let (value, _, _) = self.entries[self.pos].clone();
    self.pos += 1;
    value
  }

  fn skip(&mut self) {
    self.pos += 1;
  }
}

/// Reassembles every record encoded across `columns` (aligned to
/// `schema.columns()`, e.g. the output of `deconstruct_batch`). Assumes the
/// columns are mutually consistent -- every column has the same number of
/// logical records -- which holds for anything this module itself produced.
pub fn reconstruct(schema: &SchemaDescriptor, columns: &[ColumnTriples]) -> Vec<Row> {
  let mut cursors: Vec<ColumnCursor> = columns.iter().map(|c| ColumnCursor { entries: &c.entries, pos: 0 }).collect();
  let root = schema.root_schema();
  let mut records = Vec::new();

  loop {
    if cursors.is_empty() || cursors[0].pos >= cursors[0].entries.len() {
      break;
    }
    let mut fields = Vec::new();
    let mut leaf_idx = 0usize;
    for field in root.get_fields() {
      if let Some(v) = consume_field(field, &mut cursors, &mut leaf_idx, 0, 0) {
        fields.push((field.name().to_string(), v));
      }
    }
    records.push(Row::new(fields));
  }

  records
}

fn consume_field(
  field: &TypePtr,
  cursors: &mut [ColumnCursor],
  leaf_idx: &mut usize,
  parent_def_depth: i16,
  parent_rep_depth: i16
) -> Option<RowField> {
  let first_leaf = *leaf_idx;
  match field.get_basic_info().repetition() {
    Some(Repetition::REQUIRED) | None => consume_present(field, cursors, leaf_idx, parent_def_depth, parent_rep_depth),
    Some(Repetition::OPTIONAL) => {
      let def_depth = parent_def_depth + 1;
      let (_, d) = cursors[first_leaf].peek().expect("column exhausted mid-record");
      if d < def_depth {
        skip_absent(field, cursors, leaf_idx);
        None
      } else {
        consume_present(field, cursors, leaf_idx, def_depth, parent_rep_depth)
      }
    },
    Some(Repetition::REPEATED) => {
      let def_depth = parent_def_depth + 1;
      let rep_depth = parent_rep_depth + 1;
      let (_, d0) = cursors[first_leaf].peek().expect("column exhausted mid-record");
      if d0 < def_depth {
        skip_absent(field, cursors, leaf_idx);
        return Some(RowField::List(Vec::new()));
      }
      let mut items = Vec::new();
      loop {
        *leaf_idx = first_leaf;
        if let Some(v) = consume_present(field, cursors, leaf_idx, def_depth, rep_depth) {
          items.push(v);
        }
        match cursors[first_leaf].peek() {
          Some((r, d)) if d >= def_depth && r >= rep_depth => continue,
          _ => break
        }
      }
      Some(RowField::List(items))
    }
  }
}

fn consume_present(
  field: &TypePtr,
  cursors: &mut [ColumnCursor],
  leaf_idx: &mut usize,
  def_depth: i16,
  rep_depth: i16
) -> Option<RowField> {
  match &**field {
    Type::PrimitiveType { .. } => {
      let i = *leaf_idx;
      *leaf_idx += 1;
      cursors[i].take()
    },
    Type::GroupType { fields, .. } => {
      let mut out = Vec::new();
      for f in fields {
        if let Some(v) = consume_field(f, cursors, leaf_idx, def_depth, rep_depth) {
          out.push((f.name().to_string(), v));
        }
      }
      Some(RowField::Group(Row::new(out)))
    }
  }
}

fn skip_absent(field: &TypePtr, cursors: &mut [ColumnCursor], leaf_idx: &mut usize) {
  match &**field {
    Type::PrimitiveType { .. } => {
      let i = *leaf_idx;
      *leaf_idx += 1;
      cursors[i].skip();
    },
    Type::GroupType { fields, .. } => {
      for f in fields {
        skip_absent(f, cursors, leaf_idx);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::basic::{Repetition as Rep, Type as PhysicalType};
  use crate::schema::types::Type as SchemaType;

  /// `{ level1: REPEATED group { level2: REPEATED string } }` -- the Dremel
  /// paper's nested-list example.
  fn nested_list_schema() -> SchemaDescriptor {
    let level2 = SchemaType::primitive_type_builder("level2", PhysicalType::BYTE_ARRAY)
      .with_repetition(Rep::REPEATED)
      .build()
      .unwrap();
    let level1 = SchemaType::group_type_builder("level1").with_repetition(Rep::REPEATED).with_fields(vec![level2]).build().unwrap();
    let root = SchemaType::group_type_builder("schema").as_root().with_fields(vec![level1]).build().unwrap();
    SchemaDescriptor::new(root)
  }

  fn str_field(s: &str) -> RowField {
    RowField::Str(s.to_string())
  }

  #[test]
  fn test_deconstruct_nested_lists_s1() {
    let schema = nested_list_schema();
    let group1 = Row::new(vec![("level2".to_string(), RowField::List(vec![str_field("a"), str_field("b"), str_field("c")]))]);
    let group2 = Row::new(vec![("level2".to_string(), RowField::List(vec![str_field("d"), str_field("e"), str_field("f"), str_field("g")]))]);
    let record = Row::new(vec![("level1".to_string(), RowField::List(vec![RowField::Group(group1), RowField::Group(group2)]))]);

    let columns = deconstruct(&schema, &record).unwrap();
    assert_eq!(columns.len(), 1);
    let level2_col = &columns[0];
    let expected = vec![
      (Some(str_field("a")), 0i16, 2i16),
      (Some(str_field("b")), 2, 2),
      (Some(str_field("c")), 2, 2),
      (Some(str_field("d")), 1, 2),
      (Some(str_field("e")), 2, 2),
      (Some(str_field("f")), 2, 2),
      (Some(str_field("g")), 2, 2)
    ];
    assert_eq!(level2_col.entries, expected);
  }

  #[test]
  fn test_round_trip_nested_lists() {
    let schema = nested_list_schema();
    let group1 = Row::new(vec![("level2".to_string(), RowField::List(vec![str_field("a"), str_field("b"), str_field("c")]))]);
    let group2 = Row::new(vec![("level2".to_string(), RowField::List(vec![str_field("d"), str_field("e"), str_field("f"), str_field("g")]))]);
    let record = Row::new(vec![("level1".to_string(), RowField::List(vec![RowField::Group(group1), RowField::Group(group2)]))]);

    let columns = deconstruct(&schema, &record).unwrap();
    let rebuilt = reconstruct(&schema, &columns);
    assert_eq!(rebuilt, vec![record]);
  }

  /// `{owner: REQUIRED string, ownerPhoneNumbers: REPEATED string,
  ///   contacts: REPEATED group{name: REQUIRED string, phoneNumber: OPTIONAL string}}`
  fn address_book_schema() -> SchemaDescriptor {
    let owner = SchemaType::primitive_type_builder("owner", PhysicalType::BYTE_ARRAY).with_repetition(Rep::REQUIRED).build().unwrap();
    let owner_phones = SchemaType::primitive_type_builder("ownerPhoneNumbers", PhysicalType::BYTE_ARRAY)
      .with_repetition(Rep::REPEATED)
      .build()
      .unwrap();
    let name = SchemaType::primitive_type_builder("name", PhysicalType::BYTE_ARRAY).with_repetition(Rep::REQUIRED).build().unwrap();
    let phone = SchemaType::primitive_type_builder("phoneNumber", PhysicalType::BYTE_ARRAY).with_repetition(Rep::OPTIONAL).build().unwrap();
    let contacts = SchemaType::group_type_builder("contacts")
      .with_repetition(Rep::REPEATED)
      .with_fields(vec![name, phone])
      .build()
      .unwrap();
    let root = SchemaType::group_type_builder("AddressBook")
      .as_root()
      .with_fields(vec![owner, owner_phones, contacts])
      .build()
      .unwrap();
    SchemaDescriptor::new(root)
  }

  #[test]
  fn test_deconstruct_address_book_s2() {
    let schema = address_book_schema();
    let contact0 = Row::new(vec![("name".to_string(), str_field("Dmitriy")), ("phoneNumber".to_string(), str_field("555 987 6543"))]);
    let contact1 = Row::new(vec![("name".to_string(), str_field("Chris"))]);
    let record = Row::new(vec![
      ("owner".to_string(), str_field("Julien Le Dem")),
      ("ownerPhoneNumbers".to_string(), RowField::List(vec![str_field("555 123 4567")])),
      ("contacts".to_string(), RowField::List(vec![RowField::Group(contact0), RowField::Group(contact1)]))
    ]);

    let columns = deconstruct(&schema, &record).unwrap();
    let phone_col_idx = schema.get_column_index(&crate::schema::types::ColumnPath::from(vec!["contacts".to_string(), "phoneNumber".to_string()])).unwrap();
    let phone_col = &columns[phone_col_idx];
    assert_eq!(phone_col.entries, vec![(Some(str_field("555 987 6543")), 0, 2), (None, 1, 1)]);
  }

  #[test]
  fn test_round_trip_address_book() {
    let schema = address_book_schema();
    let contact0 = Row::new(vec![("name".to_string(), str_field("Dmitriy")), ("phoneNumber".to_string(), str_field("555 987 6543"))]);
    let contact1 = Row::new(vec![("name".to_string(), str_field("Chris"))]);
    let record = Row::new(vec![
      ("owner".to_string(), str_field("Julien Le Dem")),
      ("ownerPhoneNumbers".to_string(), RowField::List(vec![str_field("555 123 4567")])),
      ("contacts".to_string(), RowField::List(vec![RowField::Group(contact0), RowField::Group(contact1)]))
    ]);

    let columns = deconstruct(&schema, &record).unwrap();
    let rebuilt = reconstruct(&schema, &columns);
    assert_eq!(rebuilt.len(), 1);
    // `contacts[1].phoneNumber` round-trips as an absent field rather than an
    // explicit `RowField::Null`, matching how it was constructed above.
    assert_eq!(rebuilt[0], record);
  }

  #[test]
  fn test_deconstruct_batch_multiple_records() {
    let schema = address_book_schema();
    let make = |owner: &str| {
      Row::new(vec![
        ("owner".to_string(), str_field(owner)),
        ("ownerPhoneNumbers".to_string(), RowField::List(vec![])),
        ("contacts".to_string(), RowField::List(vec![]))
      ])
    };
    let records = vec![make("A"), make("B")];
    let columns = deconstruct_batch(&schema, &records).unwrap();
    let owner_idx = schema.get_column_index(&crate::schema::types::ColumnPath::from(vec!["owner".to_string()])).unwrap();
    assert_eq!(columns[owner_idx].entries, vec![(Some(str_field("A")), 0, 0), (Some(str_field("B")), 0, 0)]);

    let rebuilt = reconstruct(&schema, &columns);
    assert_eq!(rebuilt, records);
  }
}
