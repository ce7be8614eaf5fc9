use super::{ColumnRef, FormulaDef, LinkToRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFn {
    Count,
    CountDistinct,
    Sum,
    SumDistinct,
    Avg,
    AvgDistinct,
    Min,
    Max,
}

impl AggregateFn {
    /// SQL function name and whether the argument is `DISTINCT`.
    pub fn sql(&self) -> (&'static str, bool) {
        match self {
            AggregateFn::Count => ("COUNT", false),
            AggregateFn::CountDistinct => ("COUNT", true),
            AggregateFn::Sum => ("SUM", false),
            AggregateFn::SumDistinct => ("SUM", true),
            AggregateFn::Avg => ("AVG", false),
            AggregateFn::AvgDistinct => ("AVG", true),
            AggregateFn::Min => ("MIN", false),
            AggregateFn::Max => ("MAX", false),
        }
    }
}

/// What a logical column is backed by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    /// A physical column.
    Stored { column_name: String },

    /// A link to records of another table.
    LinkToRecord(LinkToRecord),

    /// Surfaces `target` from the table reached through `relation`.
    /// `target` may itself be a lookup or link, forming a chain.
    Lookup {
        relation: ColumnRef,
        target: ColumnRef,
    },

    /// Aggregates `target` across the rows reached through `relation`.
    Rollup {
        relation: ColumnRef,
        target: ColumnRef,
        function: AggregateFn,
    },

    /// An expression over other columns of the same table.
    Formula { expression: FormulaDef },
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Stored { .. } => "stored",
            ColumnKind::LinkToRecord(_) => "link",
            ColumnKind::Lookup { .. } => "lookup",
            ColumnKind::Rollup { .. } => "rollup",
            ColumnKind::Formula { .. } => "formula",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(title: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            id: None,
            title: title.into(),
            kind,
        }
    }

    pub fn stored(title: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self::new(
            title,
            ColumnKind::Stored {
                column_name: column_name.into(),
            },
        )
    }

    pub fn link(title: impl Into<String>, link: LinkToRecord) -> Self {
        Self::new(title, ColumnKind::LinkToRecord(link))
    }

    pub fn lookup(
        title: impl Into<String>,
        relation: impl Into<ColumnRef>,
        target: impl Into<ColumnRef>,
    ) -> Self {
        Self::new(
            title,
            ColumnKind::Lookup {
                relation: relation.into(),
                target: target.into(),
            },
        )
    }

    pub fn rollup(
        title: impl Into<String>,
        relation: impl Into<ColumnRef>,
        target: impl Into<ColumnRef>,
        function: AggregateFn,
    ) -> Self {
        Self::new(
            title,
            ColumnKind::Rollup {
                relation: relation.into(),
                target: target.into(),
                function,
            },
        )
    }

    pub fn formula(title: impl Into<String>, expression: impl Into<FormulaDef>) -> Self {
        Self::new(
            title,
            ColumnKind::Formula {
                expression: expression.into(),
            },
        )
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Matches a reference against the column id first, then the title.
    pub fn matches(&self, reference: &ColumnRef) -> bool {
        self.id.as_deref() == Some(reference.as_str()) || self.title == reference.as_str()
    }

    /// Stable key used to track the column on a resolution path.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.title)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.kind.name())
    }
}
