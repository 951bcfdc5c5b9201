use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

/// Attribute whose changes signal that an element was resized
pub const STYLE_ATTRIBUTE: &str = "style";

/// A single attribute change delivered to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Name of the changed attribute
    pub attribute_name: String,

    /// Value before the change; only filled in when the observer asked for it
    pub old_value: Option<String>,
}

/// Which mutations an observer wants to hear about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Report attribute changes at all
    pub attributes: bool,

    /// Restrict reports to these attribute names; `None` reports every attribute
    pub attribute_filter: Option<Vec<String>>,

    /// Include the previous value in each record
    pub attribute_old_value: bool,
}

impl ObserveOptions {
    /// Changes to the `style` attribute, with the previous value recorded
    pub fn style_changes() -> Self {
        Self { attributes: true, attribute_filter: Some(vec![STYLE_ATTRIBUTE.to_string()]), attribute_old_value: true }
    }

    fn wants(&self, attribute: &str) -> bool {
        self.attributes && self.attribute_filter.as_ref().is_none_or(|names| names.iter().any(|name| name == attribute))
    }
}

/// Callback receiving a batch of mutation records
pub type MutationCallback = Arc<dyn Fn(&[MutationRecord]) + Send + Sync>;

/// Identifier of an observer registration on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Node that can report attribute mutations to registered observers
pub trait MutationTarget {
    /// Register `callback` for mutations matching `options`
    fn observe(&self, options: ObserveOptions, callback: MutationCallback) -> ObserverId;

    /// Remove a registration; returns whether it was still registered
    fn unobserve(&self, id: ObserverId) -> bool;
}

/// Live observer registration
///
/// Stays registered until [`disconnect`](Self::disconnect) is called;
/// dropping the value does not unregister it.
pub struct Observer<T: MutationTarget> {
    target: T,
    id: ObserverId,
}

impl<T: MutationTarget> Observer<T> {
    /// Registration id on the target
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Stop receiving mutation records
    pub fn disconnect(self) -> bool {
        self.target.unobserve(self.id)
    }
}

impl<T: MutationTarget> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").field("id", &self.id).finish()
    }
}

/// Watch `node` for changes to its `style` attribute
///
/// Inline style changes are how layout code resizes elements, so this is the
/// hook used to react to resizes.
pub fn observe_style_changes<T, F>(node: &T, callback: F) -> Observer<T>
where
    T: MutationTarget + Clone,
    F: Fn(&[MutationRecord]) + Send + Sync + 'static,
{
    let id = node.observe(ObserveOptions::style_changes(), Arc::new(callback));
    Observer { target: node.clone(), id }
}

/// In-memory element holding attributes and notifying observers
///
/// Records are delivered synchronously from the mutating call, after the
/// element's lock has been released. Clones refer to the same element.
#[derive(Clone, Default)]
pub struct Element {
    inner: Arc<Mutex<ElementState>>,
}

#[derive(Default)]
struct ElementState {
    attributes: BTreeMap<String, String>,
    observers: Vec<Registration>,
    next_id: u64,
}

struct Registration {
    id: ObserverId,
    options: ObserveOptions,
    callback: MutationCallback,
}

impl Element {
    /// Create an element without attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of an attribute
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.lock().attributes.get(name).cloned()
    }

    /// Set an attribute, notifying interested observers
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let old_value = self.inner.lock().attributes.insert(name.to_string(), value.into());
        self.notify(name, old_value);
    }

    /// Remove an attribute, notifying interested observers if it existed
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let old_value = self.inner.lock().attributes.remove(name);
        if old_value.is_some() {
            self.notify(name, old_value.clone());
        }
        old_value
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }

    fn notify(&self, name: &str, old_value: Option<String>) {
        let deliveries: Vec<(MutationCallback, MutationRecord)> = {
            let state = self.inner.lock();
            state
                .observers
                .iter()
                .filter(|registration| registration.options.wants(name))
                .map(|registration| {
                    let old_value = if registration.options.attribute_old_value { old_value.clone() } else { None };
                    (Arc::clone(&registration.callback), MutationRecord { attribute_name: name.to_string(), old_value })
                })
                .collect()
        };

        trace!(attribute = name, observers = deliveries.len(), "attribute mutated");
        for (callback, record) in deliveries {
            callback(std::slice::from_ref(&record));
        }
    }
}

impl MutationTarget for Element {
    fn observe(&self, options: ObserveOptions, callback: MutationCallback) -> ObserverId {
        let mut state = self.inner.lock();
        let id = ObserverId(state.next_id);
        state.next_id += 1;
        state.observers.push(Registration { id, options, callback });
        id
    }

    fn unobserve(&self, id: ObserverId) -> bool {
        let mut state = self.inner.lock();
        let before = state.observers.len();
        state.observers.retain(|registration| registration.id != id);
        state.observers.len() != before
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Element").field("attributes", &state.attributes).field("observers", &state.observers.len()).finish()
    }
}
