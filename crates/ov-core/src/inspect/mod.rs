//! Introspection capability set
//!
//! The expander never looks at a concrete object type. Everything it knows
//! about a value comes through [`Inspect`]: which capabilities the value
//! exposes and the probes that read them. Probes may fail; callers treat a
//! failed probe as an absent capability for that node.

mod sort_key;

pub use sort_key::SortKey;

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared handle to an inspected value.
///
/// The tree never owns inspected data. Handles live in the side-table and
/// are dropped when their row is evicted; the host decides how long the
/// underlying graph lives.
pub type ObjectRef = Arc<dyn Inspect>;

/// One structural introspection ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Class,
    Bases,
    Slots,
    Signature,
    Attributes,
    KeyValue,
    SizedIteration,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Class,
        Capability::Bases,
        Capability::Slots,
        Capability::Signature,
        Capability::Attributes,
        Capability::KeyValue,
        Capability::SizedIteration,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Class => "class",
            Capability::Bases => "bases",
            Capability::Slots => "slots",
            Capability::Signature => "signature",
            Capability::Attributes => "attributes",
            Capability::KeyValue => "key-value",
            Capability::SizedIteration => "sized-iteration",
        };
        f.write_str(name)
    }
}

/// The set of capabilities a value exposes
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capabilities at all (a terminal value)
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builder-style insert
    pub fn with(mut self, capability: Capability) -> Self {
        self.0 |= capability.bit();
        self
    }

    /// Builder-style removal
    pub fn without(mut self, capability: Capability) -> Self {
        self.0 &= !capability.bit();
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate over the contained capabilities in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Errors raised by introspection probes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InspectError {
    #[error("capability not supported: {0}")]
    Unsupported(Capability),

    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("signature unavailable: {0}")]
    Signature(String),

    #[error("iteration failed: {0}")]
    Iteration(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("value is not orderable: {0}")]
    Unorderable(String),

    #[error("introspection error: {0}")]
    Other(String),
}

/// Structural view of an inspected value.
///
/// Adapters declare what they support in [`Inspect::capabilities`] and
/// override the matching probes. Every probe defaults to
/// [`InspectError::Unsupported`].
pub trait Inspect: Send + Sync {
    /// Runtime type name, used by the grouping and exclusion policies
    fn type_name(&self) -> &str;

    /// Capabilities this value exposes
    fn capabilities(&self) -> Capabilities;

    /// Canonical debug representation
    fn render(&self) -> Result<String, InspectError>;

    /// Display form, used when the value is a key. Defaults to [`Inspect::render`].
    fn display(&self) -> Result<String, InspectError> {
        self.render()
    }

    /// Ordering key used when this value is a key in a key-value view
    fn sort_key(&self) -> Option<SortKey> {
        None
    }

    fn class(&self) -> Result<ObjectRef, InspectError> {
        Err(InspectError::Unsupported(Capability::Class))
    }

    /// Base types, returned as one opaque sequence value
    fn bases(&self) -> Result<ObjectRef, InspectError> {
        Err(InspectError::Unsupported(Capability::Bases))
    }

    fn slots(&self) -> Result<Vec<String>, InspectError> {
        Err(InspectError::Unsupported(Capability::Slots))
    }

    fn slot_value(&self, name: &str) -> Result<ObjectRef, InspectError> {
        Err(InspectError::MissingAttribute(name.to_string()))
    }

    /// Signature description of a callable
    fn signature(&self) -> Result<ObjectRef, InspectError> {
        Err(InspectError::Unsupported(Capability::Signature))
    }

    /// Attribute mapping as name -> value pairs, in any order
    fn attributes(&self) -> Result<Vec<(String, ObjectRef)>, InspectError> {
        Err(InspectError::Unsupported(Capability::Attributes))
    }

    /// Key-value entries, in any order
    fn entries(&self) -> Result<Vec<(ObjectRef, ObjectRef)>, InspectError> {
        Err(InspectError::Unsupported(Capability::KeyValue))
    }

    /// Elements in iteration order. Individual items may fail mid-way.
    fn elements(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<ObjectRef, InspectError>> + '_>, InspectError> {
        Err(InspectError::Unsupported(Capability::SizedIteration))
    }
}

/// Identity comparison on the underlying allocation
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
