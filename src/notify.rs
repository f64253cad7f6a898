//! Level-triggered "data changed" signalling.
//!
//! Listeners are told only that the board changed; they re-read whatever they
//! need through board queries. Pollers can compare [`ChangeNotifier::revision`]
//! against the last value they saw instead of subscribing.

use std::fmt;

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Listener>,
    revision: u64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback run synchronously after every change.
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of changes signalled so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn notify(&mut self) {
        self.revision += 1;
        for listener in self.listeners.iter_mut() {
            listener();
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}
