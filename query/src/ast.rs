use serde::{Deserialize, Serialize};
use std::fmt;

/// The thing a comparison looks at on a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// A metadata tag attached to the record, by name.
    Tag(String),
    /// The wallet which signed the record.
    From,
    /// The wallet the record is addressed to, if any.
    To,
}

impl Field {
    pub fn tag(name: impl Into<String>) -> Self { Field::Tag(name.into()) }
}

/// `"from"` and `"to"` are reserved for the record's wallets, everything else names a tag.
impl From<&str> for Field {
    fn from(name: &str) -> Self {
        match name {
            "from" => Field::From,
            "to" => Field::To,
            other => Field::Tag(other.to_string()),
        }
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self { Field::from(name.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    Equals { field: Field, value: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    fn is_compound(&self) -> bool {
        match self {
            Predicate::Equals { .. } => false,
            Predicate::And(items) | Predicate::Or(items) => match items.as_slice() {
                [only] => only.is_compound(),
                items => items.len() > 1,
            },
        }
    }

    /// Number of equality clauses anywhere in the expression.
    pub fn clause_count(&self) -> usize {
        match self {
            Predicate::Equals { .. } => 1,
            Predicate::And(items) | Predicate::Or(items) => items.iter().map(Predicate::clause_count).sum(),
        }
    }
}

pub fn equals(field: impl Into<Field>, value: impl Into<String>) -> Predicate {
    Predicate::Equals { field: field.into(), value: value.into() }
}

pub fn and(items: impl IntoIterator<Item = Predicate>) -> Predicate { Predicate::And(items.into_iter().collect()) }

pub fn or(items: impl IntoIterator<Item = Predicate>) -> Predicate { Predicate::Or(items.into_iter().collect()) }

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Tag(name) => write!(f, "\"{}\"", name.replace('"', "\\\"")),
            Field::From => write!(f, "from"),
            Field::To => write!(f, "to"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (items, joiner, empty) = match self {
            Predicate::Equals { field, value } => return write!(f, "{} = '{}'", field, value.replace('\'', "''")),
            Predicate::And(items) => (items, " AND ", "true"),
            Predicate::Or(items) => (items, " OR ", "false"),
        };

        if items.is_empty() {
            return write!(f, "{}", empty);
        }

        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", joiner)?;
            }
            if item.is_compound() {
                write!(f, "({})", item)?;
            } else {
                write!(f, "{}", item)?;
            }
        }
        Ok(())
    }
}
