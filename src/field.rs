//! Forward references to outputs of targets that have not run yet.

use std::fmt;
use std::sync::Arc;

use crate::target::Target;

/// "Output field `field` of `target`, once `target` has executed."
///
/// Placing a `FieldRef` inside another target's params records a dependency
/// edge; the resolver substitutes the concrete value in place.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    field: String,
    of: Arc<Target>,
}

impl FieldRef {
    /// Name of the referenced output field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The producing target.
    #[must_use]
    pub const fn target(&self) -> &Arc<Target> {
        &self.of
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}@{}", self.of.name(), self.field, self.of.id().short())
    }
}

/// Refer to output `field` of `target`.
///
/// The target does not need to have been resolved; the reference is an opaque
/// placeholder until resolution.
///
/// ```
/// use hwforge::field::field_of;
/// use hwforge::target::{Params, Target};
///
/// let dtc = Target::new("dtc", Params::new(), None);
/// let dtb = field_of("dtb", &dtc);
/// assert_eq!(dtb.field(), "dtb");
/// assert_eq!(dtb.target().name(), "dtc");
/// ```
#[must_use]
pub fn field_of(field: impl Into<String>, target: &Arc<Target>) -> FieldRef {
    FieldRef {
        field: field.into(),
        of: Arc::clone(target),
    }
}
