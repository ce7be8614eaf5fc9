use super::TableId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    #[serde(alias = "hm")]
    HasMany,
    #[serde(alias = "bt")]
    BelongsTo,
    #[serde(alias = "mm")]
    ManyToMany,
}

impl RelationKind {
    /// Relations on which one outer row can match several related rows.
    pub fn is_fan_out(&self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::ManyToMany)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::HasMany => write!(f, "hasMany"),
            RelationKind::BelongsTo => write!(f, "belongsTo"),
            RelationKind::ManyToMany => write!(f, "manyToMany"),
        }
    }
}

/// A physical key column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRef {
    pub table: TableId,
    pub column: String,
}

impl KeyRef {
    pub fn new(table: impl Into<TableId>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// The association table of a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Junction {
    /// Physical name of the junction table.
    pub table: String,
    /// Junction column referencing the child side (`LinkToRecord::child`).
    pub child_key: String,
    /// Junction column referencing the parent side (`LinkToRecord::parent`).
    pub parent_key: String,
}

/// Options of a link column.
///
/// The column is declared on one table and the key roles depend on the kind:
///
/// - `HasMany`: declared on the parent. `parent` is its own key, `child` is the
///   foreign key on the related table.
/// - `BelongsTo`: declared on the child. `child` is its own foreign key,
///   `parent` is the key of the related table.
/// - `ManyToMany`: declared on the child. `child` is its own key, `parent` is
///   the key of the related table, and the junction links the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkToRecord {
    pub kind: RelationKind,
    pub child: KeyRef,
    pub parent: KeyRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<Junction>,
}

impl LinkToRecord {
    pub fn has_many(parent: KeyRef, child: KeyRef) -> Self {
        Self {
            kind: RelationKind::HasMany,
            child,
            parent,
            junction: None,
        }
    }

    pub fn belongs_to(child: KeyRef, parent: KeyRef) -> Self {
        Self {
            kind: RelationKind::BelongsTo,
            child,
            parent,
            junction: None,
        }
    }

    pub fn many_to_many(child: KeyRef, parent: KeyRef, junction: Junction) -> Self {
        Self {
            kind: RelationKind::ManyToMany,
            child,
            parent,
            junction: Some(junction),
        }
    }

    /// The table on the far side of the link.
    pub fn related_table(&self) -> &TableId {
        match self.kind {
            RelationKind::HasMany => &self.child.table,
            RelationKind::BelongsTo | RelationKind::ManyToMany => &self.parent.table,
        }
    }

    /// The key on the declaring table the link is anchored to.
    pub fn local_key(&self) -> &KeyRef {
        match self.kind {
            RelationKind::HasMany => &self.parent,
            RelationKind::BelongsTo | RelationKind::ManyToMany => &self.child,
        }
    }

    /// The key on the related table the link points at.
    pub fn remote_key(&self) -> &KeyRef {
        match self.kind {
            RelationKind::HasMany => &self.child,
            RelationKind::BelongsTo | RelationKind::ManyToMany => &self.parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roles_by_kind() {
        let hm = LinkToRecord::has_many(KeyRef::new("customers", "id"), KeyRef::new("orders", "customer_id"));
        assert_eq!(hm.related_table().as_str(), "orders");
        assert_eq!(hm.local_key().column, "id");
        assert_eq!(hm.remote_key().column, "customer_id");

        let bt = LinkToRecord::belongs_to(KeyRef::new("orders", "customer_id"), KeyRef::new("customers", "id"));
        assert_eq!(bt.related_table().as_str(), "customers");
        assert_eq!(bt.local_key().column, "customer_id");
        assert!(!bt.kind.is_fan_out());
    }

    #[test]
    fn test_kind_accepts_short_codes() {
        let kind: RelationKind = serde_json::from_str(r#""mm""#).unwrap();
        assert_eq!(kind, RelationKind::ManyToMany);
        let kind: RelationKind = serde_json::from_str(r#""hasMany""#).unwrap();
        assert_eq!(kind, RelationKind::HasMany);
    }
}
