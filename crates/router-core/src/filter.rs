use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Which events a plugin is a candidate for.
///
/// Mirrors the source system's "either a finite set or a predicate, or
/// absent" shape as a proper sum type rather than an untyped
/// union, so the manager evaluates matching uniformly regardless of which
/// variant a plugin author reaches for.
#[derive(Clone)]
pub enum EventFilter {
    /// Matches every event name (the "absent" case in the source spec).
    All,
    /// Matches only events whose `name` is in this set.
    Names(HashSet<String>),
    /// Matches events for which the predicate returns `true`.
    Pred(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl EventFilter {
    /// Builds a [`EventFilter::Names`] from an iterator of event names.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Builds a [`EventFilter::Pred`] from a predicate closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Pred(Arc::new(f))
    }

    /// Evaluates whether `event_name` matches this filter.
    pub fn matches(&self, event_name: &str) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Names(names) => names.contains(event_name),
            EventFilter::Pred(pred) => pred(event_name),
        }
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        EventFilter::All
    }
}

impl fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFilter::All => write!(f, "EventFilter::All"),
            EventFilter::Names(names) => f.debug_tuple("EventFilter::Names").field(names).finish(),
            EventFilter::Pred(_) => write!(f, "EventFilter::Pred(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_everything() {
        assert!(EventFilter::All.matches("anything"));
    }

    #[test]
    fn names_matches_only_listed() {
        let filter = EventFilter::names(["order.created", "order.cancelled"]);
        assert!(filter.matches("order.created"));
        assert!(!filter.matches("order.shipped"));
    }

    #[test]
    fn predicate_is_evaluated_per_call() {
        let filter = EventFilter::predicate(|name| name.starts_with("order."));
        assert!(filter.matches("order.created"));
        assert!(!filter.matches("user.created"));
    }
}
