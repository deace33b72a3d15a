use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::amp::constants::DEFAULT_SELECTOR_ATTRIBUTE;
use crate::amp::target::{AmpSelector, AmpTarget, TrackedTargets};

pub type AmpTagBuilder = Arc<dyn Fn(&TrackedTargets) -> String + Send + Sync + 'static>;

/// Collects tracked targets during an AMP render and turns them into declarative
/// `<amp-analytics>` markup through the registered tag builders.
pub struct AmpCompiler {
    targets: Mutex<Vec<AmpTarget>>,
    builders: Mutex<Vec<AmpTagBuilder>>,
    next_id: AtomicU64,
    attribute: String,
}

impl fmt::Debug for AmpCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmpCompiler")
            .field("attribute", &self.attribute)
            .field("targets", &self.targets.lock().unwrap().len())
            .field("builders", &self.builders.lock().unwrap().len())
            .finish()
    }
}

impl Default for AmpCompiler {
    fn default() -> Self {
        Self::with_attribute(DEFAULT_SELECTOR_ATTRIBUTE)
    }
}

impl AmpCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `attribute` instead of `data-amp-id` for generated selectors.
    pub fn with_attribute(attribute: impl Into<String>) -> Self {
        Self {
            targets: Mutex::new(Vec::new()),
            builders: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            attribute: attribute.into(),
        }
    }

    pub fn register_target(&self, target: AmpTarget) {
        self.targets.lock().unwrap().push(target);
    }

    pub fn allocate_selector(&self) -> AmpSelector {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        AmpSelector::new(id, &self.attribute)
    }

    pub fn register_tag_builder<F>(&self, builder: F)
    where
        F: Fn(&TrackedTargets) -> String + Send + Sync + 'static,
    {
        self.builders.lock().unwrap().push(Arc::new(builder));
    }

    pub fn targets(&self) -> Vec<AmpTarget> {
        self.targets.lock().unwrap().clone()
    }

    pub fn builder_count(&self) -> usize {
        self.builders.lock().unwrap().len()
    }

    /// Runs every builder, in registration order, against the full target list and joins the
    /// fragments with newlines. Empty fragments are kept.
    pub fn compile(&self) -> String {
        let tracked = TrackedTargets {
            tracked_targets: self.targets(),
        };
        let builders = self.builders.lock().unwrap().clone();
        log::debug!(
            "compiling {} amp analytics tags for {} targets",
            builders.len(),
            tracked.tracked_targets.len()
        );
        builders
            .iter()
            .map(|builder| builder(&tracked))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drops all targets and builders and restarts selector ids at 0.
    pub fn reset(&self) {
        self.targets.lock().unwrap().clear();
        self.builders.lock().unwrap().clear();
        self.next_id.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn describe(label: &'static str) -> impl Fn(&TrackedTargets) -> String + Send + Sync {
        move |tracked| {
            let events: Vec<_> = tracked
                .tracked_targets
                .iter()
                .map(|target| target.event.as_str())
                .collect();
            format!("{label}:{}", events.join(","))
        }
    }

    #[test]
    fn builders_see_every_target_in_registration_order() {
        let compiler = AmpCompiler::new();
        compiler.register_tag_builder(describe("B1"));
        compiler.register_tag_builder(describe("B2"));
        compiler.register_target(AmpTarget::new("click", json!({})));
        compiler.register_target(AmpTarget::new("view", json!({})));

        assert_eq!(compiler.compile(), "B1:click,view\nB2:click,view");
    }

    #[test]
    fn empty_fragments_are_not_filtered() {
        let compiler = AmpCompiler::new();
        compiler.register_tag_builder(|_| String::new());
        compiler.register_tag_builder(|_| "<amp-analytics></amp-analytics>".to_string());

        assert_eq!(compiler.compile(), "\n<amp-analytics></amp-analytics>");
    }

    #[test]
    fn compile_without_builders_is_empty() {
        let compiler = AmpCompiler::new();
        compiler.register_target(AmpTarget::new("click", json!({})));
        assert_eq!(compiler.compile(), "");
    }

    #[test]
    fn selectors_increase_and_restart_after_reset() {
        let compiler = AmpCompiler::with_attribute("data-x");
        assert_eq!(compiler.allocate_selector().css(), "[data-x=\"0\"]");
        assert_eq!(compiler.allocate_selector().css(), "[data-x=\"1\"]");

        compiler.reset();

        assert_eq!(compiler.allocate_selector().css(), "[data-x=\"0\"]");
    }

    #[test]
    fn reset_clears_targets_and_builders() {
        let compiler = AmpCompiler::new();
        compiler.register_tag_builder(describe("B"));
        compiler.register_target(AmpTarget::new("click", json!({})));

        compiler.reset();

        assert!(compiler.targets().is_empty());
        assert_eq!(compiler.builder_count(), 0);
        assert_eq!(compiler.compile(), "");
    }

    #[test]
    fn duplicate_targets_are_kept() {
        let compiler = AmpCompiler::new();
        let target = AmpTarget::new("click", json!({"id": 1})).with_selector("[data-amp-id=\"0\"]");
        compiler.register_target(target.clone());
        compiler.register_target(target);
        assert_eq!(compiler.targets().len(), 2);
    }
}
