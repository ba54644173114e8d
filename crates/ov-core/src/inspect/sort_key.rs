use std::cmp::Ordering;

/// Ordering key for values used as keys in a key-value view.
///
/// Ordering is partial across kinds: numbers compare with numbers, text with
/// text, bytes with bytes, tuples element-wise. Anything else is unorderable
/// and `try_cmp` returns `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Tuple(Vec<SortKey>),
}

impl SortKey {
    pub fn try_cmp(&self, other: &SortKey) -> Option<Ordering> {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => Some(a.cmp(b)),
            (SortKey::Bytes(a), SortKey::Bytes(b)) => Some(a.cmp(b)),
            (SortKey::Tuple(a), SortKey::Tuple(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.try_cmp(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// True if every pair in `keys` is orderable, so a sort over them is total.
    ///
    /// Stricter than pairwise `try_cmp` for tuples: all tuples must share
    /// their arity and element kinds with the first key.
    pub fn all_comparable(keys: &[SortKey]) -> bool {
        match keys.first() {
            Some(first) => keys.iter().all(|k| k.same_shape(first)),
            None => true,
        }
    }

    fn same_shape(&self, other: &SortKey) -> bool {
        match (self, other) {
            (SortKey::Text(_), SortKey::Text(_)) | (SortKey::Bytes(_), SortKey::Bytes(_)) => true,
            (SortKey::Tuple(a), SortKey::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_shape(y))
            }
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => !x.is_nan() && !y.is_nan(),
                _ => false,
            },
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            SortKey::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            SortKey::Int(i) => Some(*i as f64),
            SortKey::Float(f) => Some(*f),
            _ => None,
        }
    }
}
