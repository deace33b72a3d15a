use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::analytics::context::{EventPayload, NavigationSource};
use crate::analytics::error::{validate_event_name, AnalyticsResult};

pub type EventHandler = Arc<dyn Fn(&EventPayload) + Send + Sync + 'static>;

/// Handle identifying one registration made through [`EventBroadcaster::on`] or
/// [`EventBroadcaster::once`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct Listener {
    id: ListenerId,
    handler: EventHandler,
    once: bool,
}

#[derive(Clone, Debug)]
struct QueuedCall {
    name: String,
    payload: EventPayload,
}

#[derive(Default)]
struct DeliveryState {
    activated: bool,
    queue: Vec<QueuedCall>,
}

/// Named-event emitter that holds every fired event until [`activate`](Self::activate) is called.
///
/// Listener lists are snapshotted before handlers run, so a handler may fire further events or
/// change registrations without deadlocking. A panicking handler is not isolated: it unwinds
/// through `fire` and the remaining handlers for that call do not run.
pub struct EventBroadcaster {
    delivery: Mutex<DeliveryState>,
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    next_listener_id: AtomicU64,
    disabled: AtomicBool,
    navigation: Arc<dyn NavigationSource>,
}

impl fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("activated", &self.is_activated())
            .field("pending", &self.pending_len())
            .finish()
    }
}

impl EventBroadcaster {
    pub fn new(navigation: Arc<dyn NavigationSource>) -> Self {
        Self {
            delivery: Mutex::new(DeliveryState::default()),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(0),
            disabled: AtomicBool::new(false),
            navigation,
        }
    }

    /// Fires `name` with caller-supplied parameters.
    ///
    /// A bare payload is wrapped as `{eventParams, eventContext}` using the current navigation
    /// snapshot; a payload that already carries `eventContext` is passed through unchanged.
    /// `Value::Null` is treated as an empty object.
    pub fn fire(&self, name: &str, params: Value) -> AnalyticsResult<()> {
        validate_event_name(name)?;
        let payload = EventPayload::wrap(params, self.navigation.as_ref());
        self.dispatch(name, payload);
        Ok(())
    }

    /// Fires an already wrapped payload.
    pub fn fire_payload(&self, name: &str, payload: EventPayload) -> AnalyticsResult<()> {
        validate_event_name(name)?;
        self.dispatch(name, payload);
        Ok(())
    }

    pub fn on<F>(&self, name: &str, handler: F) -> AnalyticsResult<ListenerId>
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.add_listener(name, Arc::new(handler), false)
    }

    /// Registers a handler that is removed right before its first invocation.
    pub fn once<F>(&self, name: &str, handler: F) -> AnalyticsResult<ListenerId>
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.add_listener(name, Arc::new(handler), true)
    }

    pub fn add_listener(
        &self,
        name: &str,
        handler: EventHandler,
        once: bool,
    ) -> AnalyticsResult<ListenerId> {
        validate_event_name(name)?;
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(Listener { id, handler, once });
        Ok(id)
    }

    /// Returns `true` when a registration was found and removed.
    pub fn remove_listener(&self, name: &str, id: ListenerId) -> AnalyticsResult<bool> {
        validate_event_name(name)?;
        let mut listeners = self.listeners.lock().unwrap();
        let Some(entries) = listeners.get_mut(name) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|listener| listener.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(name);
        }
        Ok(removed)
    }

    pub fn remove_all_listeners(&self, name: &str) -> AnalyticsResult<()> {
        validate_event_name(name)?;
        self.listeners.lock().unwrap().remove(name);
        Ok(())
    }

    pub fn listener_count(&self, name: &str) -> AnalyticsResult<usize> {
        validate_event_name(name)?;
        Ok(self
            .listeners
            .lock()
            .unwrap()
            .get(name)
            .map_or(0, Vec::len))
    }

    /// Switches to live delivery and replays the queued calls in fire order.
    ///
    /// Calling it again without a [`reset`](Self::reset) in between replays nothing. Ignored
    /// once [`disable`](Self::disable) has been called.
    pub fn activate(&self) {
        let queued = {
            let mut delivery = self.delivery.lock().unwrap();
            if self.is_disabled() {
                log::debug!("analytics disabled for this session; activation ignored");
                return;
            }
            delivery.activated = true;
            std::mem::take(&mut delivery.queue)
        };
        log::debug!("analytics activated, replaying {} queued events", queued.len());
        for call in queued {
            self.dispatch(&call.name, call.payload);
        }
    }

    /// Permanently blocks activation. Queued events are kept but never delivered, and
    /// [`reset`](Self::reset) does not lift the block.
    pub fn disable(&self) {
        let _delivery = self.delivery.lock().unwrap();
        self.disabled.store(true, Ordering::SeqCst);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn is_activated(&self) -> bool {
        self.delivery.lock().unwrap().activated
    }

    pub fn pending_len(&self) -> usize {
        self.delivery.lock().unwrap().queue.len()
    }

    /// Clears the activation flag and the pending queue. Listeners stay registered.
    pub fn reset(&self) {
        let mut delivery = self.delivery.lock().unwrap();
        delivery.activated = false;
        delivery.queue.clear();
    }

    fn dispatch(&self, name: &str, payload: EventPayload) {
        {
            let mut delivery = self.delivery.lock().unwrap();
            if !delivery.activated {
                log::debug!("queueing `{name}` until analytics is activated");
                delivery.queue.push(QueuedCall {
                    name: name.to_string(),
                    payload,
                });
                return;
            }
        }
        for handler in self.take_handlers(name) {
            handler(&payload);
        }
    }

    fn take_handlers(&self, name: &str) -> Vec<EventHandler> {
        let mut listeners = self.listeners.lock().unwrap();
        let Some(entries) = listeners.get_mut(name) else {
            return Vec::new();
        };
        let handlers = entries
            .iter()
            .map(|listener| listener.handler.clone())
            .collect();
        entries.retain(|listener| !listener.once);
        if entries.is_empty() {
            listeners.remove(name);
        }
        handlers
    }
}
