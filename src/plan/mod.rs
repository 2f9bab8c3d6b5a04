//! Typed, immutable parameter bundles.
//!
//! A plan is a plain struct whose fields are read through getters and changed
//! only through updaters that consume the plan and return a new one:
//!
//! - `with_<field>(value)` replaces a field,
//! - `edit_<field>(f)` replaces a field with `f(current)`,
//! - `append_<field>(items)` extends a list field at its end.
//!
//! Every list field appends at the end, so the order in which edits are
//! threaded is the order arguments reach the tool command line. Plans are
//! lowered into [`Target`](crate::target::Target)s by their `into_target`
//! methods, which own the field-to-parameter mapping.
//!
//! ```
//! use hwforge::plan::{Define, Plan, SimCompilePlan, Simulator};
//!
//! let base = SimCompilePlan::new("smoke", Simulator::Verilator, "TestDriver", "build/sim");
//! let debug = base
//!     .clone()
//!     .append_defines([Define::flag("X")])
//!     .append_defines([Define::flag("Y")]);
//! assert!(base.defines().is_empty());
//! assert_eq!(debug.defines(), &[Define::flag("X"), Define::flag("Y")]);
//! ```

mod design;
mod error;
mod flags;
mod sim;
mod toolchain;

pub use design::{BitstreamPlan, BspPlan, RtlPlan};
pub use error::PlanError;
pub use flags::{Define, Plusarg};
pub use sim::{Dut, SimCompilePlan, SimExecutePlan, UserSimulationOptions};
pub use toolchain::{Resource, Simulator, defaults};

/// Fail unless `value` can be joined onto a directory without leaving it.
pub(crate) fn require_component(
    plan: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), PlanError> {
    if value.contains(['/', '\\']) || matches!(value, "." | "..") {
        return Err(PlanError::NotAPathComponent {
            plan,
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Functional composition shared by all plans.
pub trait Plan: Sized {
    /// Apply an arbitrary plan transform.
    #[must_use]
    fn apply(self, edit: impl FnOnce(Self) -> Self) -> Self {
        edit(self)
    }

    /// Apply `edit` only when `enabled` holds; otherwise return the plan
    /// untouched.
    #[must_use]
    fn apply_if(self, enabled: bool, edit: impl FnOnce(Self) -> Self) -> Self {
        if enabled { edit(self) } else { self }
    }
}

/// Generate getters and functional updaters for plan fields.
///
/// `field: Type => with_field, edit_field;` produces a getter plus the two
/// updaters; a trailing `, append_field` additionally produces an appender
/// for `Vec` fields.
macro_rules! plan_fields {
    (@accessors $field:ident : $ty:ty => $with:ident, $edit:ident) => {
        #[doc = concat!("Current `", stringify!($field), "`.")]
        #[must_use]
        pub const fn $field(&self) -> &$ty {
            &self.$field
        }

        #[doc = concat!("Return the plan with `", stringify!($field), "` replaced.")]
        #[must_use]
        pub fn $with(mut self, value: $ty) -> Self {
            self.$field = value;
            self
        }

        #[doc = concat!("Return the plan with `", stringify!($field), "` passed through `edit`.")]
        #[must_use]
        pub fn $edit(mut self, edit: impl FnOnce($ty) -> $ty) -> Self {
            self.$field = edit(self.$field);
            self
        }
    };
    (@append $field:ident : $ty:ty => $append:ident) => {
        #[doc = concat!("Return the plan with `items` appended to `", stringify!($field), "`.")]
        #[must_use]
        pub fn $append<I>(mut self, items: I) -> Self
        where
            I: IntoIterator,
            I::Item: Into<<$ty as IntoIterator>::Item>,
        {
            self.$field.extend(items.into_iter().map(Into::into));
            self
        }
    };
    ($plan:ident {
        $( $field:ident : $ty:ty => $with:ident, $edit:ident $(, $append:ident)? ; )*
    }) => {
        impl $plan {
            $(
                $crate::plan::plan_fields!(@accessors $field : $ty => $with, $edit);
                $( $crate::plan::plan_fields!(@append $field : $ty => $append); )?
            )*
        }

        impl $crate::plan::Plan for $plan {}
    };
}

pub(crate) use plan_fields;
