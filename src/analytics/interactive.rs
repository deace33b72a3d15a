use std::time::Duration;

use async_trait::async_trait;

use crate::platform::runtime;

/// External "the page is interactive" signal that may gate activation.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait InteractiveSignal: Send + Sync {
    async fn wait(&self);
}

/// Resolves immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl InteractiveSignal for Immediate {
    async fn wait(&self) {}
}

/// Resolves after a fixed delay.
#[derive(Clone, Copy, Debug)]
pub struct Delay(pub Duration);

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl InteractiveSignal for Delay {
    async fn wait(&self) {
        runtime::sleep(self.0).await;
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use wasm::DocumentInteractive;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod wasm {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::InteractiveSignal;
    use crate::platform::runtime;

    /// Polls `document.readyState` until the document has left the `loading` state.
    #[derive(Clone, Copy, Debug)]
    pub struct DocumentInteractive {
        pub poll_interval: Duration,
    }

    impl Default for DocumentInteractive {
        fn default() -> Self {
            Self {
                poll_interval: Duration::from_millis(50),
            }
        }
    }

    #[async_trait(?Send)]
    impl InteractiveSignal for DocumentInteractive {
        async fn wait(&self) {
            loop {
                let state = web_sys::window()
                    .and_then(|window| window.document())
                    .map(|document| document.ready_state());
                match state {
                    Some(state) if state == "loading" => runtime::sleep(self.poll_interval).await,
                    _ => return,
                }
            }
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test(flavor = "current_thread")]
    async fn delay_waits_at_least_the_duration() {
        let started = Instant::now();
        Delay(Duration::from_millis(10)).wait().await;
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
