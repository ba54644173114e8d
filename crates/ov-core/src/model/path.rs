use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Position of a row in the tree as a sequence of sibling indices.
///
/// Stable while rows are only appended at a level; not stable under
/// reordering. The empty path is the invisible root sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowPath(Vec<usize>);

impl RowPath {
    /// Path of the root sentinel
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the `index`-th child of this row
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent row, `None` for the root sentinel
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    /// True if `self` lies strictly below `ancestor`.
    ///
    /// Compares index sequences, so `1:0` descends from `1` but `10` does not.
    pub fn is_descendant_of(&self, ancestor: &RowPath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }
}

impl fmt::Display for RowPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for RowPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split(':')
            .map(|part| part.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| ModelError::InvalidPath(s.to_string()))
    }
}

impl From<Vec<usize>> for RowPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(indices: &[usize]) -> RowPath {
        RowPath::new(indices.to_vec())
    }

    #[test]
    fn test_descendant_is_sequence_prefix() {
        assert!(path(&[1, 0]).is_descendant_of(&path(&[1])));
        assert!(path(&[1, 0, 4]).is_descendant_of(&path(&[1])));
        assert!(!path(&[10]).is_descendant_of(&path(&[1])));
        assert!(!path(&[1]).is_descendant_of(&path(&[1])));
        assert!(!path(&[2, 1]).is_descendant_of(&path(&[1])));
        assert!(path(&[0]).is_descendant_of(&RowPath::root()));
    }

    #[test]
    fn test_string_form() {
        assert_eq!(path(&[1, 0, 12]).to_string(), "1:0:12");
        assert_eq!("1:0:12".parse::<RowPath>().unwrap(), path(&[1, 0, 12]));
        assert_eq!("".parse::<RowPath>().unwrap(), RowPath::root());
        assert!("1::2".parse::<RowPath>().is_err());
        assert!("a".parse::<RowPath>().is_err());
    }

    #[test]
    fn test_parent_and_child() {
        let p = path(&[3, 1]);
        assert_eq!(p.child(0), path(&[3, 1, 0]));
        assert_eq!(p.parent(), Some(path(&[3])));
        assert_eq!(RowPath::root().parent(), None);
    }
}
