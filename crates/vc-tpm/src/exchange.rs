use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// One successful submit, as delivered to observers: monotonic start/end
/// ticks (not wall-clock — safe to use for duration, not for correlating
/// across processes) plus copies of the command and response bytes.
#[derive(Debug, Clone)]
pub struct TpmExchange {
    pub start_ticks: u64,
    pub end_ticks: u64,
    pub command: Vec<u8>,
    pub response: Vec<u8>,
}

pub type Observer = Arc<dyn Fn(&TpmExchange) + Send + Sync>;

/// Monotonic tick source for `TpmExchange` timestamps. Not the injected
/// `TimeProvider` from `vc-core` — exchange ticks only need to be ordered
/// and comparable within one process, not translatable to UTC.
pub fn now_ticks() -> u64 {
    use std::time::Instant;
    use std::sync::OnceLock;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Mutex-guarded subscriber list shared between a `TpmDevice` and every
/// live `Subscription` it has handed out. Subscribe/unsubscribe and
/// dispatch all take the same lock, so unsubscription is race-free against
/// a concurrent notify — it either happens before or after the dispatch
/// loop holds the guard, never during.
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: AtomicU64,
    observers: Mutex<Vec<(u64, Observer)>>,
}

impl ObserverList {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }

    pub(crate) fn notify(&self, exchange: &TpmExchange) {
        let observers = self.observers.lock();
        for (_, observer) in observers.iter() {
            observer(exchange);
        }
    }

    fn subscribe(self: &Arc<Self>, observer: Observer) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().push((id, observer));
        Subscription { id, list: Arc::clone(self) }
    }

    fn unsubscribe(&self, id: u64) {
        self.observers.lock().retain(|(oid, _)| *oid != id);
    }
}

/// Handle returned from `TpmDevice::subscribe`. Dropping it unsubscribes —
/// there is no separate `unsubscribe` call to forget to make.
pub struct Subscription {
    id: u64,
    list: Arc<ObserverList>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.list.unsubscribe(self.id);
    }
}

pub(crate) fn subscribe(list: &Arc<ObserverList>, observer: Observer) -> Subscription {
    list.subscribe(observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn sample_exchange() -> TpmExchange {
        TpmExchange { start_ticks: 1, end_ticks: 2, command: vec![1], response: vec![2] }
    }

    #[test]
    fn notify_reaches_every_subscriber() {
        let list = ObserverList::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c1 = Arc::clone(&count);
        let c2 = Arc::clone(&count);
        let _s1 = subscribe(&list, Arc::new(move |_| { c1.fetch_add(1, Ordering::SeqCst); }));
        let _s2 = subscribe(&list, Arc::new(move |_| { c2.fetch_add(1, Ordering::SeqCst); }));

        list.notify(&sample_exchange());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let list = ObserverList::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c1 = Arc::clone(&count);
        let sub = subscribe(&list, Arc::new(move |_| { c1.fetch_add(1, Ordering::SeqCst); }));
        drop(sub);

        assert!(list.is_empty());
        list.notify(&sample_exchange());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_list_reports_empty() {
        let list = ObserverList::new();
        assert!(list.is_empty());
        let sub = subscribe(&list, Arc::new(|_| {}));
        assert!(!list.is_empty());
        drop(sub);
        assert!(list.is_empty());
    }
}
