//! Error types for graphs, models, and formula parsing.

use thiserror::Error;

/// Errors raised while building or querying a relation graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("unknown node id: {0}")]
    UnknownNode(String),
}

/// Errors raised by epistemic models and the model checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("world {0} already exists")]
    DuplicateWorld(String),

    #[error("no world named {id}; worlds of the model are {known}")]
    UnknownWorld { id: String, known: String },

    #[error("no world satisfies {0}")]
    NoSatisfyingWorld(String),

    #[error("the model has no pointed world")]
    NoPointedWorld,

    #[error("proposition {proposition} is outside the support {{{support}}}")]
    OutsideSupport {
        proposition: String,
        support: String,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ModelError {
    /// Build an [`ModelError::UnknownWorld`] listing the worlds that do exist.
    pub fn unknown_world<'a>(id: &str, known: impl IntoIterator<Item = &'a str>) -> Self {
        let mut listed = String::new();
        for w in known {
            listed.push_str(w);
            listed.push_str(", ");
        }
        listed.push_str("...");
        ModelError::UnknownWorld {
            id: id.to_string(),
            known: listed,
        }
    }

    /// Translate a graph-level failure into the world-level vocabulary.
    pub(crate) fn from_graph(err: GraphError) -> Self {
        match err {
            GraphError::DuplicateNode(id) => ModelError::DuplicateWorld(id),
            GraphError::UnknownNode(id) => ModelError::UnknownWorld {
                id,
                known: String::from("..."),
            },
        }
    }
}

/// Errors raised while parsing formula text or tagged formula objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected token `{token}` at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("unsupported formula: {0}")]
    UnsupportedFormula(String),

    #[error("cannot mix `{first}` and `{second}` in one group; add parentheses")]
    MixedConnectives { first: String, second: String },

    #[error("`{0}` needs at least one operand")]
    EmptyConnective(&'static str),

    #[error("`{0}` takes exactly two operands")]
    BinaryArity(&'static str),

    #[error("invalid count `{0}` in exactly")]
    InvalidCount(String),

    #[error("malformed formula object: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_world_lists_known_worlds() {
        let err = ModelError::unknown_world("w9", ["w1", "w2"]);
        let msg = err.to_string();
        assert!(msg.contains("w9"));
        assert!(msg.contains("w1, w2, ..."));
    }

    #[test]
    fn graph_errors_map_to_world_errors() {
        assert_eq!(
            ModelError::from_graph(GraphError::DuplicateNode("w".into())),
            ModelError::DuplicateWorld("w".into())
        );
        assert!(matches!(
            ModelError::from_graph(GraphError::UnknownNode("u".into())),
            ModelError::UnknownWorld { .. }
        ));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MixedConnectives {
            first: "and".into(),
            second: "or".into(),
        };
        assert!(err.to_string().contains("parentheses"));
    }
}
