use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// A row exactly as the legacy reader returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub fields: Vec<SourceField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceField {
    pub name: String,
    pub value: Value,
}

impl SourceRow {
    pub fn new(fields: Vec<SourceField>) -> Self {
        SourceRow { fields }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        SourceRow {
            fields: pairs
                .into_iter()
                .map(|(name, value)| SourceField {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Column lookup is case-insensitive; legacy columns come back uppercase.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(column))
            .map(|f| &f.value)
    }
}

/// Ordered tuple of values matching a target table's column list.
pub type TargetRecord = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_case_insensitive() {
        let row = SourceRow::from_pairs([("NOME", Value::from("Ana")), ("EMAIL", Value::Null)]);
        assert_eq!(row.get("nome"), Some(&Value::String("Ana".into())));
        assert_eq!(row.get("Email"), Some(&Value::Null));
        assert_eq!(row.get("SENHA"), None);
    }
}
