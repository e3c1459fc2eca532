use serde_json::{Map, Value};
use std::future::Future;

/// A single record as returned by the store: column name to JSON value,
/// with joined rows embedded as nested objects.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The store answered, but refused the request.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The store could not be reached or did not answer.
    #[error("{0}")]
    Transport(String),
    /// A row came back in a shape the caller did not expect.
    #[error("unexpected row shape: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, StoreError::Rejected { .. })
    }
}

/// Credential a session talks to the store with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Row-level access of the caller; carries their `Authorization` header if any.
    Caller(Option<String>),
    /// Service credential, bypasses row-level access control.
    Privileged,
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Fields(&'static [&'static str]),
}

/// Embeds the row of `collection` whose `id` equals the parent's
/// `foreign_key` column, under `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub key: &'static str,
    pub collection: &'static str,
    pub foreign_key: &'static str,
    pub projection: Projection,
}

impl Join {
    pub fn new(collection: &'static str, foreign_key: &'static str) -> Self {
        Self {
            key: collection,
            collection,
            foreign_key,
            projection: Projection::All,
        }
    }

    pub fn as_key(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    pub fn fields(mut self, fields: &'static [&'static str]) -> Self {
        self.projection = Projection::Fields(fields);
        self
    }
}

/// Read request against one collection. Every column of the collection is
/// returned, plus whatever the joins embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub collection: &'static str,
    pub filters: Vec<Filter>,
    pub joins: Vec<Join>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(collection: &'static str) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            joins: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some(Order { column, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Query capability over the store's named collections.
pub trait DataAccess: Send + Sync {
    fn select(&self, query: &Select) -> impl Future<Output = Result<Vec<Row>, StoreError>> + Send;

    /// At most one row; `None` when nothing matches.
    fn select_one(
        &self,
        query: &Select,
    ) -> impl Future<Output = Result<Option<Row>, StoreError>> + Send;

    /// Sets `fields` on every row matching `filters`. Matching nothing is not an error.
    fn update(
        &self,
        collection: &'static str,
        filters: &[Filter],
        fields: Row,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn insert(
        &self,
        collection: &'static str,
        record: Row,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Hands out store sessions bound to a credential. This is the router state.
pub trait Connector: Clone + Send + Sync + 'static {
    type Session: DataAccess;

    fn session(&self, access: Access) -> Self::Session;
}
