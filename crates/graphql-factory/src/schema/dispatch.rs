//! Runtime resolution of abstract types.
//!
//! An interface or union value is a plain backing model. The dispatcher
//! decides which concrete object type it materialises as: the abstract
//! type's `resolve_type`, if any, is asked first, then each candidate's
//! `isTypeOf` predicate in registration order. The first match wins.

use std::any::Any;

use crate::error::FieldError;
use crate::factory::{Predicate, TypeResolver};

/// A possible concrete type of an abstract type.
pub(crate) struct Candidate {
    pub(crate) name: String,
    pub(crate) is_type_of: Option<Predicate>,
}

pub(crate) struct Dispatcher {
    type_name: String,
    resolve_type: Option<TypeResolver>,
    candidates: Vec<Candidate>,
}

impl Dispatcher {
    pub(crate) fn new(
        type_name: impl Into<String>,
        resolve_type: Option<TypeResolver>,
        candidates: Vec<Candidate>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            resolve_type,
            candidates,
        }
    }

    /// Possible concrete type names, in registration order.
    pub(crate) fn candidate_names(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.name.as_str())
    }

    /// Returns the name of the concrete type `value` materialises as.
    pub(crate) fn resolve(&self, value: &dyn Any) -> Result<&str, FieldError> {
        if let Some(resolve_type) = &self.resolve_type
            && let Some(name) = resolve_type(value)
        {
            return self
                .candidates
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.name.as_str())
                .ok_or_else(|| {
                    FieldError::new(format!(
                        "`{name}` is not a possible type for `{}`",
                        self.type_name
                    ))
                });
        }

        let sole = self.candidates.len() == 1;
        self.candidates
            .iter()
            .find(|c| match &c.is_type_of {
                Some(is_type_of) => is_type_of(value),
                None => sole,
            })
            .map(|c| c.name.as_str())
            .ok_or_else(|| FieldError::new("could not resolve abstract type for value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Being {
        kind: &'static str,
    }

    fn is_kind(kind: &'static str) -> Option<Predicate> {
        Some(Arc::new(move |v: &dyn Any| {
            v.downcast_ref::<Being>().is_some_and(|b| b.kind == kind)
        }))
    }

    fn always() -> Option<Predicate> {
        Some(Arc::new(|_: &dyn Any| true))
    }

    fn candidate(name: &str, is_type_of: Option<Predicate>) -> Candidate {
        Candidate {
            name: name.to_string(),
            is_type_of,
        }
    }

    #[test]
    fn test_first_match_in_registration_order() {
        let value = Being { kind: "human" };

        let dispatcher = Dispatcher::new(
            "Character",
            None,
            vec![candidate("Human", always()), candidate("Droid", always())],
        );
        assert_eq!(dispatcher.resolve(&value).unwrap(), "Human");

        let reversed = Dispatcher::new(
            "Character",
            None,
            vec![candidate("Droid", always()), candidate("Human", always())],
        );
        assert_eq!(reversed.resolve(&value).unwrap(), "Droid");
    }

    #[test]
    fn test_predicates_discriminate() {
        let dispatcher = Dispatcher::new(
            "Character",
            None,
            vec![
                candidate("Human", is_kind("human")),
                candidate("Droid", is_kind("droid")),
            ],
        );
        assert_eq!(dispatcher.resolve(&Being { kind: "droid" }).unwrap(), "Droid");

        let err = dispatcher.resolve(&Being { kind: "wookiee" }).unwrap_err();
        assert_eq!(err.message, "could not resolve abstract type for value");
    }

    #[test]
    fn test_sole_candidate_without_predicate() {
        let dispatcher = Dispatcher::new("Node", None, vec![candidate("Ship", None)]);
        assert_eq!(dispatcher.resolve(&Being { kind: "ship" }).unwrap(), "Ship");
    }

    #[test]
    fn test_resolve_type_takes_precedence() {
        let resolve_type: TypeResolver = Arc::new(|v: &dyn Any| {
            v.downcast_ref::<Being>()
                .map(|b| (if b.kind == "droid" { "Droid" } else { "Ghost" }).to_string())
        });
        let dispatcher = Dispatcher::new(
            "Character",
            Some(resolve_type),
            vec![candidate("Human", always()), candidate("Droid", always())],
        );

        assert_eq!(dispatcher.resolve(&Being { kind: "droid" }).unwrap(), "Droid");
        let err = dispatcher.resolve(&Being { kind: "human" }).unwrap_err();
        assert_eq!(err.message, "`Ghost` is not a possible type for `Character`");
    }
}
