use std::collections::HashMap;

/// ViewFactory
///
/// Turns a route's opaque view key into something renderable. The navigation
/// core only ever hands keys over; it never looks at the views themselves.
pub trait ViewFactory {
    type View;

    fn load(&self, key: &str) -> Option<Self::View>;
}

impl<V: Clone> ViewFactory for HashMap<String, V> {
    type View = V;

    fn load(&self, key: &str) -> Option<V> {
        self.get(key).cloned()
    }
}
