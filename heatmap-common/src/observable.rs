//! Observable value container
//!
//! Shared state (hovered cell, selection, theme) observed by several
//! independent components. Built on `tokio::sync::watch`: setting never
//! blocks, subscribers see the latest value and can check whether it
//! changed since they last looked.

use std::sync::Arc;
use tokio::sync::watch;

/// Single value with change notification
///
/// Cloning an `Observable` yields another handle to the same value.
#[derive(Debug, Clone)]
pub struct Observable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify subscribers
    ///
    /// Succeeds with or without live subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Modify the value in place and notify subscribers
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// New subscription; the current value counts as already seen
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Receiving side of an `Observable`
#[derive(Debug, Clone)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Latest value without marking it seen
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Latest value if it changed since the last call, marking it seen
    pub fn take_changed(&mut self) -> Option<T> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait for the next change
    ///
    /// Returns `None` once every `Observable` handle is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
