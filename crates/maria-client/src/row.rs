//! Decoded result rows.

use std::sync::Arc;

use bytes::Bytes;
use maria_protocol::{ColumnDefinition, ConnectionContext};
use maria_types::{CodecRegistry, FromValue, TargetKind, Value};

use crate::error::{Error, Result};

/// One result row.
///
/// Fields stay in their wire representation until a getter names a target
/// type; decoding then goes through the codec registry, so overflow and
/// signedness checks apply per access.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<Vec<ColumnDefinition>>,
    context: Arc<ConnectionContext>,
    fields: Vec<Option<Bytes>>,
    binary: bool,
}

impl Row {
    pub(crate) fn new(
        columns: Arc<Vec<ColumnDefinition>>,
        context: Arc<ConnectionContext>,
        fields: Vec<Option<Bytes>>,
        binary: bool,
    ) -> Self {
        Self {
            columns,
            context,
            fields,
            binary,
        }
    }

    /// Column metadata for this row.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode the field at `index` as `T`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.value_as(index, T::TARGET)?;
        Ok(T::from_value(value)?)
    }

    /// Decode a field by column name (case-insensitive, alias first).
    pub fn get_by_name<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self
            .index_of(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))?;
        self.get(index)
    }

    /// Decode the field at `index` into its natural [`Value`] kind.
    pub fn value(&self, index: usize) -> Result<Value> {
        let column = self.column(index)?;
        self.value_as(index, TargetKind::default_for(column))
    }

    /// Position of the column with the given name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn column(&self, index: usize) -> Result<&ColumnDefinition> {
        self.columns.get(index).ok_or(Error::ColumnIndexOutOfRange {
            index,
            count: self.columns.len(),
        })
    }

    fn value_as(&self, index: usize, target: TargetKind) -> Result<Value> {
        let column = self.column(index)?;
        let raw = self
            .fields
            .get(index)
            .ok_or(Error::ColumnIndexOutOfRange {
                index,
                count: self.fields.len(),
            })?
            .clone();
        let registry = CodecRegistry::global();
        let value = if self.binary {
            registry.decode_binary(raw, column, target, &self.context)?
        } else {
            registry.decode_text(raw, column, target, &self.context)?
        };
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maria_protocol::{ColumnFlags, DataType, ServerStatus};

    fn row() -> Row {
        let columns = Arc::new(vec![
            ColumnDefinition::synthetic("id", DataType::BigInt, ColumnFlags::NOT_NULL),
            ColumnDefinition::synthetic("name", DataType::VarString, ColumnFlags::empty()),
        ]);
        let context = Arc::new(ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT));
        Row::new(
            columns,
            context,
            vec![Some(Bytes::from_static(b"42")), None],
            false,
        )
    }

    #[test]
    fn test_typed_get() {
        let row = row();
        assert_eq!(row.get::<i64>(0).unwrap(), 42);
        assert_eq!(row.get::<Option<String>>(1).unwrap(), None);
    }

    #[test]
    fn test_get_by_name_case_insensitive() {
        let row = row();
        assert_eq!(row.get_by_name::<i64>("ID").unwrap(), 42);
        assert!(row.get_by_name::<i64>("missing").is_err());
    }

    #[test]
    fn test_natural_value() {
        let row = row();
        assert_eq!(row.value(0).unwrap(), Value::Int64(42));
        assert_eq!(row.value(1).unwrap(), Value::Null);
    }

    #[test]
    fn test_null_into_non_optional_fails() {
        let row = row();
        assert!(row.get::<String>(1).is_err());
    }
}
