pub mod ast;
pub mod selection {
    pub mod filter;
}

pub use ast::{and, equals, or, Field, Predicate};
