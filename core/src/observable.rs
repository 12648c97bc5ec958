//! A value paired with the callbacks that want to hear when it changes.

use std::fmt;

type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

pub struct Observable<T> {
    value: T,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Register a callback. It is not invoked for the current value.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&T) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Replace the value and notify subscribers unconditionally.
    pub fn publish(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    fn notify(&mut self) {
        for subscriber in &mut self.subscribers {
            subscriber(&self.value);
        }
    }
}

impl<T: PartialEq> Observable<T> {
    /// Replace the value, notifying subscribers only if it changed.
    /// Returns whether a notification was sent.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.publish(value);
        true
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_set_notifies_only_on_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut field = Observable::new(1);
        let sink = Arc::clone(&seen);
        field.subscribe(move |v: &i32| sink.lock().unwrap().push(*v));

        assert!(!field.set(1));
        assert!(field.set(2));
        field.publish(2);

        assert_eq!(*seen.lock().unwrap(), vec![2, 2]);
        assert_eq!(*field.get(), 2);
    }
}
