//! Element and page instrumentation.
//!
//! The same [`Track`] or [`TrackPageView`] declaration reports through live listeners on standard
//! renders and through AMP targets on AMP renders.
mod page_view;
#[allow(clippy::module_inception)]
mod track;
mod trigger;

pub use page_view::TrackPageView;
pub use track::{SuccessCallback, Track, TrackBinding, TrackHandlers};
pub use trigger::{Trigger, CLICK_TRIGGER};
