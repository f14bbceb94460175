//! Evaluate a predicate against a single record. Real ledgers evaluate filters inside their own index;
//! this exists for in-process ledgers and for double-checking records a remote index handed back.

use crate::ast::{Field, Predicate};

/// A record that can be matched against a [`Predicate`]. All values are plain strings.
pub trait Filterable {
    fn tag(&self, name: &str) -> Option<&str>;
    fn owner(&self) -> Option<&str>;
    fn target(&self) -> Option<&str>;
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn tag(&self, name: &str) -> Option<&str> { (**self).tag(name) }
    fn owner(&self) -> Option<&str> { (**self).owner() }
    fn target(&self) -> Option<&str> { (**self).target() }
}

fn field_value<'a, R: Filterable>(record: &'a R, field: &Field) -> Option<&'a str> {
    match field {
        Field::Tag(name) => record.tag(name),
        Field::From => record.owner(),
        Field::To => record.target(),
    }
}

/// An equality against a field the record doesn't carry is false, never an error.
pub fn evaluate_predicate<R: Filterable>(record: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { field, value } => field_value(record, field) == Some(value.as_str()),
        Predicate::And(items) => items.iter().all(|item| evaluate_predicate(record, item)),
        Predicate::Or(items) => items.iter().any(|item| evaluate_predicate(record, item)),
    }
}

pub struct FilterIterator<I> {
    iter: I,
    predicate: Predicate,
}

impl<I, R> FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable,
{
    pub fn new(iter: I, predicate: Predicate) -> Self { Self { iter, predicate } }
}

impl<I, R> Iterator for FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable,
{
    type Item = R;

    fn next(&mut self) -> Option<Self::Item> {
        let predicate = &self.predicate;
        self.iter.by_ref().find(|record| evaluate_predicate(record, predicate))
    }
}
