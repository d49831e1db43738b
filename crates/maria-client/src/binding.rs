//! Parameter bindings for prepared statements.

use maria_types::Value;

use crate::error::{Error, Result};

/// Dense mapping from parameter index to a bound value.
///
/// Every declared index must be bound before submission; [`Binding::validate`]
/// enforces this and is called by the executor.
#[derive(Debug, Clone)]
pub struct Binding {
    parameters: Vec<Option<Value>>,
}

impl Binding {
    /// Create a binding for a statement declaring `expected` parameters.
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self {
            parameters: vec![None; expected],
        }
    }

    /// Build a binding directly from a value slice.
    #[must_use]
    pub fn from_values(values: &[Value]) -> Self {
        Self {
            parameters: values.iter().cloned().map(Some).collect(),
        }
    }

    /// Bind a value at `index`.
    pub fn bind(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index >= self.parameters.len() {
            return Err(Error::ParameterCount {
                expected: self.parameters.len(),
                actual: index + 1,
            });
        }
        self.parameters[index] = Some(value.into());
        Ok(())
    }

    /// Bind SQL NULL at `index`.
    pub fn bind_null(&mut self, index: usize) -> Result<()> {
        self.bind(index, Value::Null)
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the statement declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Check that all declared indices are bound.
    pub fn validate(&self, expected: usize) -> Result<()> {
        if self.parameters.len() != expected {
            return Err(Error::ParameterCount {
                expected,
                actual: self.parameters.len(),
            });
        }
        for (index, parameter) in self.parameters.iter().enumerate() {
            if parameter.is_none() {
                return Err(Error::ParameterMissing { index });
            }
        }
        Ok(())
    }

    /// Consume into the bound values. Call [`Binding::validate`] first.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.parameters
            .into_iter()
            .map(|p| p.unwrap_or(Value::Null))
            .collect()
    }
}

/// Count `?` placeholders outside quotes and comments.
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '?' => count += 1,
            '\'' | '"' | '`' => {
                // Skip to the closing quote, honoring backslash escapes.
                while let Some(inner) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                if matches!(chars.peek(), Some(' ') | Some('\t') | None) {
                    for inner in chars.by_ref() {
                        if inner == '\n' {
                            break;
                        }
                    }
                }
            }
            '#' => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => {}
        }
    }
    count
}

/// Append a `RETURNING` clause naming `columns` (`*` when empty).
#[must_use]
pub fn augment(sql: &str, columns: &[String]) -> String {
    if columns.is_empty() {
        format!("{sql} RETURNING *")
    } else {
        format!("{sql} RETURNING {}", columns.join(", "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_all_indices() {
        let mut binding = Binding::new(2);
        binding.bind(0, 1i32).unwrap();
        assert!(matches!(
            binding.validate(2),
            Err(Error::ParameterMissing { index: 1 })
        ));
        binding.bind_null(1).unwrap();
        binding.validate(2).unwrap();
    }

    #[test]
    fn test_bind_out_of_range() {
        let mut binding = Binding::new(1);
        assert!(binding.bind(3, 1i32).is_err());
    }

    #[test]
    fn test_placeholder_counting() {
        assert_eq!(count_placeholders("SELECT ?, ?"), 2);
        assert_eq!(count_placeholders("SELECT '?'"), 0);
        assert_eq!(count_placeholders("SELECT \"?\", `?` , ?"), 1);
        assert_eq!(count_placeholders("SELECT 1 -- ? comment\n, ?"), 1);
        assert_eq!(count_placeholders("SELECT /* ? */ ?"), 1);
        assert_eq!(count_placeholders("SELECT 1 # ?\n"), 0);
        assert_eq!(count_placeholders("SELECT 'it\\'s ?', ?"), 1);
    }

    #[test]
    fn test_augment() {
        assert_eq!(
            augment("INSERT INTO t VALUES (1)", &[]),
            "INSERT INTO t VALUES (1) RETURNING *"
        );
        assert_eq!(
            augment("INSERT INTO t VALUES (1)", &["id".to_string(), "ts".to_string()]),
            "INSERT INTO t VALUES (1) RETURNING id, ts"
        );
    }
}
