/// What a display row stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A member bound to a real object in the side-table
    Member,
    /// A synthetic header that clusters related members
    Group,
    /// Empty child that makes an unopened row render as expandable
    Placeholder,
}

/// Lazy materialization state of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Materialization {
    /// Closed, carrying only its placeholder child
    Unopened,
    /// Children are being synthesized
    Materializing,
    /// Real children are present (or there are none to create)
    Materialized,
}

/// A node in the visual tree
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    /// Member name or synthetic key
    pub label: String,

    /// Truncated rendering of the bound value
    pub summary: String,

    /// True for rows known to have no children
    pub is_leaf_marker: bool,

    pub kind: RowKind,

    pub state: Materialization,
}

impl DisplayRow {
    /// An expandable or terminal member row
    pub fn member(label: impl Into<String>, summary: impl Into<String>, is_leaf_marker: bool) -> Self {
        Self {
            label: label.into(),
            summary: summary.into(),
            is_leaf_marker,
            kind: RowKind::Member,
            state: if is_leaf_marker {
                Materialization::Materialized
            } else {
                Materialization::Unopened
            },
        }
    }

    /// A group header; populated eagerly, so it starts materialized
    pub fn group(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            summary: String::new(),
            is_leaf_marker: false,
            kind: RowKind::Group,
            state: Materialization::Materialized,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            label: String::new(),
            summary: String::new(),
            is_leaf_marker: true,
            kind: RowKind::Placeholder,
            state: Materialization::Materialized,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == RowKind::Placeholder
    }

    pub fn is_group(&self) -> bool {
        self.kind == RowKind::Group
    }
}
