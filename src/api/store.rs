use std::sync::Arc;

use tokio::sync::watch;

use crate::models::Teacher;

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub teachers: Arc<Vec<Teacher>>,
    pub loading: bool,
}

/// Cached teacher list plus loading flag, broadcast to any number of
/// subscribers. Only the client writes here; the list is never authoritative
/// and gets replaced wholesale after every refresh.
pub struct TeacherStore {
    teachers: watch::Sender<Arc<Vec<Teacher>>>,
    loading: watch::Sender<bool>,
}

impl Default for TeacherStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TeacherStore {
    pub fn new() -> Self {
        let (teachers, _) = watch::channel(Arc::new(Vec::new()));
        let (loading, _) = watch::channel(false);
        Self { teachers, loading }
    }

    /// Register a new observer. Dropping the returned value releases it.
    pub fn subscribe(&self) -> StoreSubscription {
        StoreSubscription {
            teachers: self.teachers.subscribe(),
            loading: self.loading.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.teachers.receiver_count()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            teachers: self.teachers.borrow().clone(),
            loading: *self.loading.borrow(),
        }
    }

    pub(crate) fn publish(&self, teachers: Vec<Teacher>) {
        self.teachers.send_replace(Arc::new(teachers));
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.send_if_modified(|current| {
            if *current == loading {
                false
            } else {
                *current = loading;
                true
            }
        });
    }
}

/// Observer handle returned by [`TeacherStore::subscribe`].
pub struct StoreSubscription {
    teachers: watch::Receiver<Arc<Vec<Teacher>>>,
    loading: watch::Receiver<bool>,
}

impl StoreSubscription {
    /// Whether anything was published since the last [`latest`](Self::latest).
    pub fn has_changed(&self) -> bool {
        self.teachers.has_changed().unwrap_or(false) || self.loading.has_changed().unwrap_or(false)
    }

    /// Take the current snapshot and mark it as seen.
    pub fn latest(&mut self) -> StoreSnapshot {
        StoreSnapshot {
            teachers: self.teachers.borrow_and_update().clone(),
            loading: *self.loading.borrow_and_update(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn teacher(id: i64, name: &str) -> Teacher {
        Teacher {
            id: Some(id),
            ..Teacher::new(name, NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(), 4)
        }
    }

    #[test]
    fn publish_reaches_every_subscriber() {
        let store = TeacherStore::new();
        let mut first = store.subscribe();
        let mut second = store.subscribe();
        assert!(!first.has_changed());

        store.publish(vec![teacher(1, "Ada Lovelace")]);

        assert!(first.has_changed());
        assert!(second.has_changed());
        assert_eq!(first.latest().teachers.len(), 1);
        assert!(!first.has_changed());
        assert_eq!(second.latest().teachers[0].full_name, "Ada Lovelace");
    }

    #[test]
    fn publish_without_subscribers_is_kept() {
        let store = TeacherStore::new();
        store.publish(vec![teacher(1, "Ada Lovelace"), teacher(2, "Alan Turing")]);
        assert_eq!(store.snapshot().teachers.len(), 2);
        assert_eq!(store.subscribe().latest().teachers.len(), 2);
    }

    #[test]
    fn loading_flag_only_notifies_on_change() {
        let store = TeacherStore::new();
        let mut sub = store.subscribe();
        store.set_loading(false);
        assert!(!sub.has_changed());
        store.set_loading(true);
        assert!(sub.has_changed());
        assert!(sub.latest().loading);
    }

    #[test]
    fn dropping_a_subscription_releases_it() {
        let store = TeacherStore::new();
        let sub = store.subscribe();
        let other = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        drop(sub);
        assert_eq!(store.subscriber_count(), 1);
        drop(other);
        assert_eq!(store.subscriber_count(), 0);
    }
}
