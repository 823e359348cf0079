use crate::notification::Notification;
use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer};
use crate::scheduler::SharedScheduler;
use crate::subscription::{
  CompositeSubscription, SerialSubscription, SubscriptionLike,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

impl<Item: Send + 'static> Observable<Item> {
  /// Moves delivery onto `scheduler`: the producer appends each
  /// notification to a FIFO and the consumer forwards one notification
  /// per scheduled action, rescheduling itself while the queue is
  /// non-empty. A terminal notification closes the upstream
  /// subscription before it is forwarded.
  ///
  /// The queue is unbounded; a producer faster than the consumer grows
  /// it without limit.
  pub fn observe_on(&self, scheduler: SharedScheduler) -> Observable<Item> {
    let source = self.clone();
    Observable::create_with_subscription(move |observer| {
      let composite = CompositeSubscription::new();
      let drain_slot = SerialSubscription::new();
      composite.add(drain_slot.clone().boxed());

      let state = Arc::new(ObserveOnState {
        queue: Mutex::new(VecDeque::new()),
        depth: AtomicUsize::new(0),
        downstream: Mutex::new(observer),
        scheduler: scheduler.clone(),
        composite: composite.clone(),
        drain_slot,
      });

      let source_slot = SerialSubscription::new();
      composite.add(source_slot.clone().boxed());
      source_slot.set(
        source
          .subscribe_observer(ObserveOnObserver { state })
          .boxed(),
      );
      composite.boxed()
    })
  }
}

struct ObserveOnState<Item> {
  queue: Mutex<VecDeque<Notification<Item>>>,
  depth: AtomicUsize,
  downstream: Mutex<BoxObserver<Item>>,
  scheduler: SharedScheduler,
  composite: CompositeSubscription,
  drain_slot: SerialSubscription,
}

impl<Item: Send + 'static> ObserveOnState<Item> {
  fn push(state: &Arc<Self>, notification: Notification<Item>) {
    state.queue.lock().unwrap().push_back(notification);
    // 0 -> 1 means no consumer is scheduled; every other producer sees
    // a non-zero depth and leaves the running consumer to it
    if state.depth.fetch_add(1, Ordering::SeqCst) == 0 {
      Self::schedule_drain(state);
    }
  }

  fn schedule_drain(state: &Arc<Self>) {
    let link = state.clone();
    let pending = state
      .scheduler
      .schedule(Box::new(move || ObserveOnState::drain_one(&link)));
    state.drain_slot.set(pending);
  }

  fn drain_one(state: &Arc<Self>) {
    let notification = state.queue.lock().unwrap().pop_front();
    let Some(notification) = notification else {
      return;
    };
    if notification.is_terminal() {
      state.composite.clone().unsubscribe();
    }
    notification.accept(&mut *state.downstream.lock().unwrap());
    if state.depth.fetch_sub(1, Ordering::SeqCst) > 1 {
      Self::schedule_drain(state);
    }
  }
}

struct ObserveOnObserver<Item> {
  state: Arc<ObserveOnState<Item>>,
}

impl<Item: Send + 'static> Observer for ObserveOnObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    ObserveOnState::push(&self.state, Notification::Next(value));
  }

  fn error(&mut self, err: crate::error::RxError) {
    ObserveOnState::push(&self.state, Notification::Error(err));
  }

  fn complete(&mut self) {
    ObserveOnState::push(&self.state, Notification::Completed);
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use crate::scheduler::{Instant, Scheduler};
  use crate::test_scheduler::VirtualScheduler;
  use std::sync::{Arc, Mutex};

  #[test]
  fn delivery_moves_to_the_scheduler() {
    let scheduler = VirtualScheduler::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, c) = (seen.clone(), seen.clone());
    let probe = scheduler.clone();

    observable::from_iter(vec!["a", "b"])
      .observe_on(scheduler.shared())
      .subscribe_complete(
        move |v| n.lock().unwrap().push(format!("{} {}", probe.now(), v)),
        move || c.lock().unwrap().push("complete".to_string()),
      );

    // the producer already ran synchronously, delivery has not
    assert!(seen.lock().unwrap().is_empty());
    scheduler.run();
    assert_eq!(
      *seen.lock().unwrap(),
      vec!["1ms a", "2ms b", "complete"]
    );
  }

  #[test]
  fn order_is_preserved() {
    let scheduler = VirtualScheduler::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();

    observable::from_iter(0..50)
      .observe_on(scheduler.shared())
      .subscribe(move |v| s.lock().unwrap().push(v));
    scheduler.run_to(Instant::from_millis(1_000));

    assert_eq!(*seen.lock().unwrap(), (0..50).collect::<Vec<_>>());
  }
}
