use crate::element::ElementId;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject–predicate–object fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: ElementId,
    pub predicate: Predicate,
    pub object: ElementId,
}

impl Statement {
    pub fn new(
        subject: impl Into<ElementId>,
        predicate: Predicate,
        object: impl Into<ElementId>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    pub fn is_derived(&self) -> bool {
        self.predicate.is_derived()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}
