//! Relationship types - how two schema objects relate
//!
//! Every discovered relationship is one of two kinds:
//! - `DependsOn`: the source reads from or is defined over the target
//! - `UsedBy`: the target reads from or is defined over the source
//!
//! The two kinds are mirror images. The single place direction semantics
//! live is [`Relationship::resolved_endpoints`]: a resolved edge `X -> Y`
//! always reads "X depends on Y".

use crate::key::ObjectKey;
use crate::object::ObjectDescriptor;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The two relationship kinds the resolver emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Source depends on target (source reads from target)
    DependsOn,
    /// Source is used by target (target reads from source)
    UsedBy,
}

impl RelationKind {
    /// Get the string representation of the relation kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::DependsOn => "depends_on",
            RelationKind::UsedBy => "used_by",
        }
    }

    /// Get all relation kinds
    pub fn all() -> &'static [RelationKind] {
        &[RelationKind::DependsOn, RelationKind::UsedBy]
    }

    /// The mirror kind: `depends_on(A, B)` means the same as `used_by(B, A)`
    pub fn invert(&self) -> RelationKind {
        match self {
            RelationKind::DependsOn => RelationKind::UsedBy,
            RelationKind::UsedBy => RelationKind::DependsOn,
        }
    }
}

impl FromStr for RelationKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "depends_on" | "depends-on" | "dependson" => Ok(RelationKind::DependsOn),
            "used_by" | "used-by" | "usedby" => Ok(RelationKind::UsedBy),
            _ => Err(crate::Error::UnknownKind(format!(
                "Unknown relation kind: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discovered relationship between two schema objects.
///
/// `source` is always the object the query was about; `target` is the
/// related object. `depth` is 1 for everything the resolver emits
/// directly; the walker restamps it with the discovery ring during
/// recursive expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// The object the query was about
    pub source: ObjectDescriptor,
    /// The related object
    pub target: ObjectDescriptor,
    /// How the two relate
    pub kind: RelationKind,
    /// 1 = direct; >1 only after caller-side expansion
    pub depth: u32,
    /// Free-text provenance note (which strategy found this)
    pub description: Option<String>,
}

impl Relationship {
    /// Create a new direct relationship
    pub fn new(source: ObjectDescriptor, target: ObjectDescriptor, kind: RelationKind) -> Self {
        Self {
            source,
            target,
            kind,
            depth: 1,
            description: None,
        }
    }

    /// `source` depends on `target`
    pub fn depends_on(source: ObjectDescriptor, target: ObjectDescriptor) -> Self {
        Self::new(source, target, RelationKind::DependsOn)
    }

    /// `source` is used by `target`
    pub fn used_by(source: ObjectDescriptor, target: ObjectDescriptor) -> Self {
        Self::new(source, target, RelationKind::UsedBy)
    }

    /// Attach a provenance note
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restamp the depth (used by recursive expansion)
    pub fn at_depth(mut self, depth: u32) -> Self {
        self.depth = depth.max(1);
        self
    }

    /// A relationship from an object to itself carries no information
    pub fn is_self_loop(&self) -> bool {
        self.source.key == self.target.key
    }

    /// Dedup identity: `(source key, target key, kind)`
    pub fn dedup_key(&self) -> (ObjectKey, ObjectKey, RelationKind) {
        (self.source.key.clone(), self.target.key.clone(), self.kind)
    }

    /// Resolve direction: the returned `(from, to)` pair always reads
    /// "from depends on to".
    ///
    /// `DependsOn` draws `source -> target`; `UsedBy` draws
    /// `target -> source`. `used_by(A, B)` and `depends_on(B, A)` resolve
    /// to the identical directed edge.
    pub fn resolved_endpoints(&self) -> (&ObjectDescriptor, &ObjectDescriptor) {
        match self.kind {
            RelationKind::DependsOn => (&self.source, &self.target),
            RelationKind::UsedBy => (&self.target, &self.source),
        }
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.source.key == other.source.key
            && self.target.key == other.target.key
            && self.kind == other.kind
    }
}

impl Eq for Relationship {}

impl std::hash::Hash for Relationship {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.source.key.hash(state);
        self.target.key.hash(state);
        self.kind.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn sample_object(name: &str, kind: ObjectKind) -> ObjectDescriptor {
        ObjectDescriptor::new("test_graph", name, kind)
    }

    #[test]
    fn test_relation_kind_roundtrip() {
        for kind in RelationKind::all() {
            let s = kind.as_str();
            let parsed: RelationKind = s.parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_relation_kind_invert() {
        assert_eq!(RelationKind::DependsOn.invert(), RelationKind::UsedBy);
        assert_eq!(RelationKind::UsedBy.invert(), RelationKind::DependsOn);
    }

    #[test]
    fn test_direction_resolution() {
        let view = sample_object("order_summary", ObjectKind::View);
        let table = sample_object("orders", ObjectKind::Table);

        let forward = Relationship::depends_on(view.clone(), table.clone());
        let (from, to) = forward.resolved_endpoints();
        assert_eq!(from.name(), "order_summary");
        assert_eq!(to.name(), "orders");

        // used_by(orders, order_summary) is the same directed edge
        let mirror = Relationship::used_by(table, view);
        let (from, to) = mirror.resolved_endpoints();
        assert_eq!(from.name(), "order_summary");
        assert_eq!(to.name(), "orders");
    }

    #[test]
    fn test_dedup_identity_ignores_depth_and_description() {
        let a = sample_object("a", ObjectKind::View);
        let b = sample_object("b", ObjectKind::Table);

        let plain = Relationship::depends_on(a.clone(), b.clone());
        let annotated = Relationship::depends_on(a, b)
            .at_depth(3)
            .with_description("catalog record");

        assert_eq!(plain, annotated);

        let mut set = std::collections::HashSet::new();
        set.insert(plain);
        assert!(set.contains(&annotated));
    }

    #[test]
    fn test_self_loop_detection() {
        let a = sample_object("a", ObjectKind::View);
        let rel = Relationship::depends_on(a.clone(), a);
        assert!(rel.is_self_loop());
    }

    #[test]
    fn test_at_depth_floors_at_one() {
        let a = sample_object("a", ObjectKind::View);
        let b = sample_object("b", ObjectKind::Table);
        let rel = Relationship::depends_on(a, b).at_depth(0);
        assert_eq!(rel.depth, 1);
    }
}
