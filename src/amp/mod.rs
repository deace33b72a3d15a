#![doc = include_str!("README.md")]
mod compiler;
mod constants;
mod target;

#[doc(inline)]
pub use compiler::{AmpCompiler, AmpTagBuilder};

#[doc(inline)]
pub use constants::DEFAULT_SELECTOR_ATTRIBUTE;

#[doc(inline)]
pub use target::{AmpSelector, AmpTarget, TrackedTargets};
