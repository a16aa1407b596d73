//! Query-layer error types.

use thiserror::Error;

use crate::condition::ConditionError;

/// Result type for registry, join graph, builder and mapper operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Boxed error returned by an [`Executer`](crate::query::Executer).
pub type ExecuterError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or executing a query.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Malformed condition or condition that cannot be compiled.
    #[error(transparent)]
    Condition(#[from] ConditionError),

    // === Join graph ===
    #[error("table alias {0:?} already in use")]
    DuplicateAlias(String),

    #[error("table alias {0:?} is invalid; aliases must contain only word characters")]
    InvalidAlias(String),

    #[error("table alias {0:?} is not part of the query")]
    UnknownAlias(String),

    #[error("parent alias {0:?} not found")]
    MissingParent(String),

    #[error("mapping not unique: relationship {relationship:?} already joined under {parent:?}")]
    MappingNotUnique {
        parent: String,
        relationship: String,
    },

    #[error("table {0:?} must be joined to a parent through a relationship")]
    ParentRequired(String),

    #[error("invalid parent property {0:?}; expected \"alias.property\"")]
    InvalidParentProperty(String),

    #[error("column {0:?} not available for a condition")]
    ColumnNotAvailable(String),

    #[error("property {0:?} is not available")]
    PropertyNotAvailable(String),

    #[error("invalid join keys for relationship {0:?}; each pair needs exactly two entries")]
    InvalidJoinKeys(String),

    // === Registry ===
    #[error("unknown entity {0:?}")]
    UnknownEntity(String),

    #[error("entity {0:?} registered twice")]
    DuplicateEntity(String),

    #[error("entity {0:?} has no primary key")]
    NoPrimaryKey(String),

    #[error("no relationship {property:?} from {owner:?} to {target:?}")]
    UnknownRelationship {
        owner: String,
        target: String,
        property: String,
    },

    #[error("relationship {property:?} declared twice on {owner:?}")]
    DuplicateRelationship { owner: String, property: String },

    // === Builders ===
    #[error("where already performed")]
    WhereAlreadyPerformed,

    #[error("select already performed")]
    SelectAlreadyPerformed,

    #[error("order by already performed")]
    OrderByAlreadyPerformed,

    #[error("limit already performed")]
    LimitAlreadyPerformed,

    #[error("count already performed")]
    CountAlreadyPerformed,

    #[error("property {0:?} selected more than once")]
    DuplicateSelect(String),

    #[error("primary key of table {table:?} (alias {alias:?}) must be selected")]
    MissingPrimaryKey { table: String, alias: String },

    #[error("parameter {name:?} already defined with a different value")]
    ParameterConflict { name: String },

    #[error("primary key {0:?} is required")]
    MissingModelKey(String),

    #[error("generated keys are not supported for composite primary keys on {0:?}")]
    CompositeGeneratedKey(String),

    #[error("model must be a JSON object")]
    InvalidModel,

    #[error("{dialect} updates only the base table; {property:?} belongs to a joined table")]
    JoinedUpdateTarget { dialect: String, property: String },

    // === Schema / mapper ===
    #[error("property {0:?} appears more than once in the schema")]
    DuplicateSchemaProperty(String),

    // === Runtime ===
    #[error("operation did not affect any rows")]
    NoRowsAffected,

    #[error("count query returned no usable \"count\" value")]
    InvalidCountResult,

    /// Failure reported by the executer, passed through unchanged.
    #[error(transparent)]
    Executer(#[from] ExecuterError),

    #[error("failed to convert model: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl QueryError {
    /// Whether this error came from the condition grammar.
    pub fn is_condition_error(&self) -> bool {
        matches!(self, QueryError::Condition(_))
    }
}
