use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when a record lookup cannot produce the requested value.
///
/// Absence and type mismatch are kept apart so callers can tell an optional
/// field that was never written from a field holding the wrong kind of data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("row {0} is not defined")]
    MissingRow(u32),
    #[error("field 0x{0:02X} is not defined")]
    MissingField(u32),
    #[error("field 0x{field:02X} holds {found}, expected {expected}")]
    TypeMismatch {
        field: u32,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field 0x{field:02X} holds out-of-range value {value}")]
    OutOfRange { field: u32, value: i32 },
}

/// Type alias for Results using FieldError
pub type FieldResult<T> = Result<T, FieldError>;

/// One field value inside a record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Str(String),
    Ints(Vec<i32>),
    Table(Array2D),
}

impl Value {
    /// Short name of the variant, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Ints(_) => "int array",
            Value::Table(_) => "table",
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<i32>> for Value {
    fn from(value: Vec<i32>) -> Self {
        Value::Ints(value)
    }
}

impl From<Array2D> for Value {
    fn from(value: Array2D) -> Self {
        Value::Table(value)
    }
}

/// A single database row: field id -> value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Array1D {
    fields: BTreeMap<u32, Value>,
}

impl Array1D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, handy when assembling rows in code.
    pub fn with(mut self, field: u32, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: u32, value: impl Into<Value>) {
        self.fields.insert(field, value.into());
    }

    pub fn remove(&mut self, field: u32) -> Option<Value> {
        self.fields.remove(&field)
    }

    pub fn get(&self, field: u32) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn exists(&self, field: u32) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Value)> {
        self.fields.iter().map(|(id, value)| (*id, value))
    }

    /// Required integer field.
    pub fn int(&self, field: u32) -> FieldResult<i32> {
        match self.get(field) {
            Some(Value::Int(value)) => Ok(*value),
            Some(other) => Err(mismatch(field, "int", other)),
            None => Err(FieldError::MissingField(field)),
        }
    }

    /// Optional integer field. Absent fields yield `default`, a field of the
    /// wrong kind is still an error.
    pub fn int_or(&self, field: u32, default: i32) -> FieldResult<i32> {
        match self.get(field) {
            None => Ok(default),
            Some(_) => self.int(field),
        }
    }

    /// Required flag. RPG Maker stores flags as integers, so a non-zero
    /// `Int` reads as `true`.
    pub fn bool(&self, field: u32) -> FieldResult<bool> {
        match self.get(field) {
            Some(Value::Bool(value)) => Ok(*value),
            Some(Value::Int(value)) => Ok(*value != 0),
            Some(other) => Err(mismatch(field, "bool", other)),
            None => Err(FieldError::MissingField(field)),
        }
    }

    pub fn bool_or(&self, field: u32, default: bool) -> FieldResult<bool> {
        match self.get(field) {
            None => Ok(default),
            Some(_) => self.bool(field),
        }
    }

    pub fn string(&self, field: u32) -> FieldResult<&str> {
        match self.get(field) {
            Some(Value::Str(value)) => Ok(value),
            Some(other) => Err(mismatch(field, "string", other)),
            None => Err(FieldError::MissingField(field)),
        }
    }

    /// Optional string field: `Ok(None)` when the field was never written.
    pub fn string_opt(&self, field: u32) -> FieldResult<Option<&str>> {
        match self.get(field) {
            None => Ok(None),
            Some(_) => self.string(field).map(Some),
        }
    }

    pub fn ints(&self, field: u32) -> FieldResult<&[i32]> {
        match self.get(field) {
            Some(Value::Ints(values)) => Ok(values),
            Some(other) => Err(mismatch(field, "int array", other)),
            None => Err(FieldError::MissingField(field)),
        }
    }

    /// Optional integer list; absent reads as empty.
    pub fn ints_or_empty(&self, field: u32) -> FieldResult<&[i32]> {
        match self.get(field) {
            None => Ok(&[]),
            Some(_) => self.ints(field),
        }
    }

    pub fn table(&self, field: u32) -> FieldResult<&Array2D> {
        match self.get(field) {
            Some(Value::Table(table)) => Ok(table),
            Some(other) => Err(mismatch(field, "table", other)),
            None => Err(FieldError::MissingField(field)),
        }
    }

    pub fn table_opt(&self, field: u32) -> FieldResult<Option<&Array2D>> {
        match self.get(field) {
            None => Ok(None),
            Some(_) => self.table(field).map(Some),
        }
    }
}

/// A keyed collection of rows, e.g. the whole skill table or the member list
/// of one enemy group. Iteration is in ascending row id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Array2D {
    rows: BTreeMap<u32, Array1D>,
}

impl Array2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: u32, row: Array1D) -> Self {
        self.insert(id, row);
        self
    }

    pub fn insert(&mut self, id: u32, row: Array1D) {
        self.rows.insert(id, row);
    }

    pub fn row(&self, id: u32) -> FieldResult<&Array1D> {
        self.rows.get(&id).ok_or(FieldError::MissingRow(id))
    }

    pub fn row_mut(&mut self, id: u32) -> FieldResult<&mut Array1D> {
        self.rows.get_mut(&id).ok_or(FieldError::MissingRow(id))
    }

    pub fn get(&self, id: u32) -> Option<&Array1D> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Array1D)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(u32, Array1D)> for Array2D {
    fn from_iter<I: IntoIterator<Item = (u32, Array1D)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

fn mismatch(field: u32, expected: &'static str, found: &Value) -> FieldError {
    FieldError::TypeMismatch {
        field,
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absent_field_is_not_zero() {
        let row = Array1D::new().with(0x04, 0);

        assert_eq!(row.int(0x04), Ok(0));
        assert_eq!(row.int(0x05), Err(FieldError::MissingField(0x05)));
        assert_eq!(row.int_or(0x05, 7), Ok(7));
        assert!(row.exists(0x04));
        assert!(!row.exists(0x05));
    }

    #[test]
    fn test_optional_field_with_wrong_kind_is_still_an_error() {
        let row = Array1D::new().with(0x01, "Slime");

        assert_eq!(
            row.int_or(0x01, 0),
            Err(FieldError::TypeMismatch {
                field: 0x01,
                expected: "int",
                found: "string",
            })
        );
        assert_eq!(row.string_opt(0x02), Ok(None));
        assert_eq!(row.string_opt(0x01), Ok(Some("Slime")));
    }

    #[test]
    fn test_integer_flags_read_as_bool() {
        let row = Array1D::new().with(0x1F, 1).with(0x20, 0).with(0x21, true);

        assert_eq!(row.bool(0x1F), Ok(true));
        assert_eq!(row.bool(0x20), Ok(false));
        assert_eq!(row.bool(0x21), Ok(true));
        assert_eq!(row.bool_or(0x22, false), Ok(false));
    }

    #[test]
    fn test_table_rows_iterate_in_id_order() {
        let table: Array2D = vec![
            (3, Array1D::new().with(1, 30)),
            (1, Array1D::new().with(1, 10)),
            (2, Array1D::new().with(1, 20)),
        ]
        .into_iter()
        .collect();

        let ids: Vec<u32> = table.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(table.row(9), Err(FieldError::MissingRow(9)));
    }
}
