//! Virtual-time scheduling and the deterministic test driver built on
//! it: hot observables with recorded subscription windows, a recording
//! observer, and the fixed create/subscribe/dispose convention.

use crate::notification::Notification;
use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer};
use crate::scheduler::{
  Action, Instant, ScheduledItem, Scheduler, SharedScheduler, TaskHandle, TICK,
};
use crate::subscription::{
  ActionSubscription, BoxSubscription, SerialSubscription, SubscriptionLike,
};
use log::trace;
use smallvec::SmallVec;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex};

/// The instant the factory under test is evaluated.
pub const CREATED: Instant = Instant::from_millis(100);
/// The instant the observable under test is subscribed.
pub const SUBSCRIBED: Instant = Instant::from_millis(200);
/// The default instant the subscription is closed.
pub const DISPOSED: Instant = Instant::from_millis(1000);

#[derive(Default)]
struct VirtualInner {
  now: Instant,
  next_seq: u64,
  queue: BinaryHeap<ScheduledItem>,
}

/// A scheduler with an explicit clock: actions run only when the queue
/// is driven, time advances to each action's due instant and never
/// moves backwards. "As soon as possible" means one tick after `now`,
/// which gives successive trampolined emissions distinct timestamps.
#[derive(Clone, Default)]
pub struct VirtualScheduler {
  inner: Arc<Mutex<VirtualInner>>,
}

impl VirtualScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  /// This scheduler as a [`SharedScheduler`] for factory arguments.
  pub fn shared(&self) -> SharedScheduler {
    Arc::new(self.clone())
  }

  fn enqueue(&self, due: Instant, action: Action) -> BoxSubscription {
    let handle = TaskHandle::new();
    let mut inner = self.inner.lock().unwrap();
    let seq = inner.next_seq;
    inner.next_seq += 1;
    inner.queue.push(ScheduledItem {
      due,
      seq,
      action: Some(action),
      handle: handle.clone(),
    });
    handle.boxed()
  }

  fn pop_due(&self, limit: Option<Instant>) -> Option<Action> {
    let mut inner = self.inner.lock().unwrap();
    loop {
      let due = match inner.queue.peek() {
        None => return None,
        Some(item) => item.due,
      };
      if limit.map_or(false, |limit| due > limit) {
        return None;
      }
      let mut item = inner.queue.pop().unwrap();
      if item.handle.is_closed() {
        continue;
      }
      if item.due > inner.now {
        trace!("virtual clock advances to {}", item.due);
        inner.now = item.due;
      }
      return item.action.take();
    }
  }

  /// Executes queued actions in `(due, seq)` order until the queue is
  /// empty, advancing the clock as it goes.
  pub fn run(&self) {
    while let Some(action) = self.pop_due(None) {
      action();
    }
  }

  /// Like [`run`], but only while the next action is due at or before
  /// `limit`; afterwards the clock reads exactly `limit`.
  ///
  /// [`run`]: VirtualScheduler::run
  pub fn run_to(&self, limit: Instant) {
    while let Some(action) = self.pop_due(Some(limit)) {
      action();
    }
    let mut inner = self.inner.lock().unwrap();
    if inner.now < limit {
      inner.now = limit;
    }
  }

  /// Builds a source that fires each notification at its absolute
  /// instant to whoever is subscribed at that moment, and records every
  /// `(subscribe, unsubscribe)` window for later assertions.
  pub fn create_hot_observable<Item>(
    &self,
    events: Vec<(Instant, Notification<Item>)>,
  ) -> HotObservable<Item>
  where
    Item: Clone + Send + 'static,
  {
    let state: Arc<HotState<Item>> = Arc::new(HotState::default());
    for (instant, notification) in events {
      let link = state.clone();
      self.schedule_at(
        instant,
        Box::new(move || HotState::deliver(&link, notification)),
      );
    }

    let scheduler = self.clone();
    let link = state.clone();
    let observable = Observable::create_with_subscription(move |observer| {
      let key = {
        let mut records = link.records.lock().unwrap();
        let key = records.len();
        records.push((scheduler.now(), None));
        key
      };
      link
        .subscribers
        .lock()
        .unwrap()
        .push((key, Arc::new(Mutex::new(observer))));

      let teardown = link.clone();
      let clock = scheduler.clone();
      ActionSubscription::new(move || {
        let mut subscribers = teardown.subscribers.lock().unwrap();
        if let Some(idx) = subscribers.iter().position(|(k, _)| *k == key) {
          subscribers.remove(idx);
        }
        drop(subscribers);
        teardown.records.lock().unwrap()[key].1 = Some(clock.now());
      })
      .boxed()
    });

    HotObservable { observable, state }
  }

  /// Drives `factory` through the fixed convention — evaluated at 100,
  /// subscribed at 200, disposed at 1000 — and returns the recorded
  /// notifications.
  pub fn start<Item, F>(&self, factory: F) -> TestObserver<Item>
  where
    Item: Clone + Send + 'static,
    F: FnOnce() -> Observable<Item> + Send + 'static,
  {
    self.start_at(factory, DISPOSED)
  }

  /// [`start`] with an explicit dispose instant.
  ///
  /// [`start`]: VirtualScheduler::start
  pub fn start_at<Item, F>(
    &self,
    factory: F,
    unsubscribe_at: Instant,
  ) -> TestObserver<Item>
  where
    Item: Clone + Send + 'static,
    F: FnOnce() -> Observable<Item> + Send + 'static,
  {
    let observer = TestObserver::new(self.clone());
    let source: Arc<Mutex<Option<Observable<Item>>>> =
      Arc::new(Mutex::new(None));
    let subscription = SerialSubscription::new();

    let slot = source.clone();
    self.schedule_at(
      CREATED,
      Box::new(move || {
        *slot.lock().unwrap() = Some(factory());
      }),
    );

    let slot = source.clone();
    let hold = subscription.clone();
    let recorder = observer.clone();
    self.schedule_at(
      SUBSCRIBED,
      Box::new(move || {
        if let Some(source) = slot.lock().unwrap().as_ref() {
          hold.set(source.subscribe_observer(recorder).boxed());
        }
      }),
    );

    let mut hold = subscription.clone();
    self.schedule_at(unsubscribe_at, Box::new(move || hold.unsubscribe()));

    self.run();
    observer
  }
}

impl Scheduler for VirtualScheduler {
  fn now(&self) -> Instant {
    self.inner.lock().unwrap().now
  }

  fn schedule(&self, action: Action) -> BoxSubscription {
    let due = self.now() + TICK;
    self.enqueue(due, action)
  }

  fn schedule_at(&self, due: Instant, action: Action) -> BoxSubscription {
    self.enqueue(due, action)
  }
}

type SharedSubscriber<Item> = (usize, Arc<Mutex<BoxObserver<Item>>>);

struct HotState<Item> {
  subscribers: Mutex<SmallVec<[SharedSubscriber<Item>; 2]>>,
  records: Mutex<Vec<(Instant, Option<Instant>)>>,
}

impl<Item> Default for HotState<Item> {
  fn default() -> Self {
    HotState {
      subscribers: Mutex::new(SmallVec::new()),
      records: Mutex::new(Vec::new()),
    }
  }
}

impl<Item: Clone + Send + 'static> HotState<Item> {
  fn deliver(state: &Arc<Self>, notification: Notification<Item>) {
    // clone the handles out so a teardown triggered mid-delivery can
    // take the registry lock without deadlocking
    let subscribers: SmallVec<[SharedSubscriber<Item>; 2]> =
      state.subscribers.lock().unwrap().clone();
    for (_, subscriber) in subscribers {
      notification
        .clone()
        .accept(&mut *subscriber.lock().unwrap());
    }
  }
}

/// A hot source created by
/// [`create_hot_observable`](VirtualScheduler::create_hot_observable).
pub struct HotObservable<Item> {
  observable: Observable<Item>,
  state: Arc<HotState<Item>>,
}

impl<Item> HotObservable<Item> {
  pub fn observable(&self) -> Observable<Item> {
    self.observable.clone()
  }

  /// Every `(subscribe, unsubscribe)` window seen so far; `None` marks
  /// a subscription still open.
  pub fn subscriptions(&self) -> Vec<(Instant, Option<Instant>)> {
    self.state.records.lock().unwrap().clone()
  }
}

/// Records each delivered notification together with the virtual
/// instant of delivery.
pub struct TestObserver<Item> {
  scheduler: VirtualScheduler,
  messages: Arc<Mutex<Vec<(Instant, Notification<Item>)>>>,
}

impl<Item> Clone for TestObserver<Item> {
  fn clone(&self) -> Self {
    TestObserver {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
    }
  }
}

impl<Item> TestObserver<Item> {
  pub fn new(scheduler: VirtualScheduler) -> Self {
    TestObserver {
      scheduler,
      messages: Arc::new(Mutex::new(Vec::new())),
    }
  }
}

impl<Item: Clone> TestObserver<Item> {
  pub fn messages(&self) -> Vec<(Instant, Notification<Item>)> {
    self.messages.lock().unwrap().clone()
  }
}

impl<Item: Send + 'static> Observer for TestObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    let now = self.scheduler.now();
    self
      .messages
      .lock()
      .unwrap()
      .push((now, Notification::Next(value)));
  }

  fn error(&mut self, err: crate::error::RxError) {
    let now = self.scheduler.now();
    self
      .messages
      .lock()
      .unwrap()
      .push((now, Notification::Error(err)));
  }

  fn complete(&mut self) {
    let now = self.scheduler.now();
    self
      .messages
      .lock()
      .unwrap()
      .push((now, Notification::Completed));
  }
}
