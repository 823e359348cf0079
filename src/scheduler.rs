use crate::subscription::{
  BoxSubscription, NopSubscription, SerialSubscription, SubscriptionLike,
};
use async_std::prelude::FutureExt as AsyncFutureExt;
use futures::executor::ThreadPool;
use futures::future::{abortable, lazy, AbortHandle};
use futures::FutureExt;
use log::trace;
use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use std::time::Instant as StdInstant;

/// Monotonic logical time in milliseconds.
///
/// Real schedulers measure it from a lazily initialized process epoch;
/// the virtual scheduler interprets it as its explicit clock. Adding a
/// `Duration` saturates and never decreases the instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(u64);

impl Instant {
  pub const ZERO: Instant = Instant(0);

  pub const fn from_millis(millis: u64) -> Self {
    Instant(millis)
  }

  pub const fn as_millis(self) -> u64 {
    self.0
  }

  pub fn saturating_duration_since(self, earlier: Instant) -> Duration {
    Duration::from_millis(self.0.saturating_sub(earlier.0))
  }
}

impl std::ops::Add<Duration> for Instant {
  type Output = Instant;

  fn add(self, rhs: Duration) -> Instant {
    Instant(self.0.saturating_add(rhs.as_millis() as u64))
  }
}

impl std::fmt::Display for Instant {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}ms", self.0)
  }
}

/// The queue granularity for "run as soon as possible" on the virtual
/// scheduler: immediate work lands one tick after the current instant so
/// successive trampolined emissions get distinct timestamps.
pub(crate) const TICK: Duration = Duration::from_millis(1);

static EPOCH: Lazy<StdInstant> = Lazy::new(StdInstant::now);

pub(crate) fn clock_now() -> Instant {
  Instant::from_millis(EPOCH.elapsed().as_millis() as u64)
}

pub type Action = Box<dyn FnOnce() + Send>;

/// Decides when and where an action runs.
///
/// Every scheduling call returns a subscription cancelling the pending
/// action; cancelling after the action started has no effect.
pub trait Scheduler: Send + Sync {
  /// The scheduler's view of current time.
  fn now(&self) -> Instant;

  /// Runs `action` as soon as possible.
  fn schedule(&self, action: Action) -> BoxSubscription;

  /// Runs `action` at the absolute instant `due`. An instant in the past
  /// runs as soon as possible.
  fn schedule_at(&self, due: Instant, action: Action) -> BoxSubscription;

  fn schedule_after(&self, delay: Duration, action: Action) -> BoxSubscription {
    self.schedule_at(self.now() + delay, action)
  }
}

pub type SharedScheduler = Arc<dyn Scheduler>;

/// A pending queue entry, ordered by `(due, seq)`: earlier due time
/// first, registration order among ties.
pub(crate) struct ScheduledItem {
  pub(crate) due: Instant,
  pub(crate) seq: u64,
  pub(crate) action: Option<Action>,
  pub(crate) handle: TaskHandle,
}

impl PartialEq for ScheduledItem {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.seq == other.seq
  }
}

impl Eq for ScheduledItem {}

impl PartialOrd for ScheduledItem {
  fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
    Some(self.cmp(other))
  }
}

// Reversed so that `BinaryHeap::pop` yields the earliest entry.
impl Ord for ScheduledItem {
  fn cmp(&self, other: &Self) -> CmpOrdering {
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

/// Cancellation flag for queued actions; the owning queue skips entries
/// whose handle has been closed.
#[derive(Clone, Default)]
pub struct TaskHandle {
  cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
  pub fn new() -> Self {
    Self::default()
  }
}

impl SubscriptionLike for TaskHandle {
  fn unsubscribe(&mut self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  fn is_closed(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }
}

/// Handle for a task spawned on the futures thread pool; aborts the
/// in-flight future on unsubscribe.
#[derive(Clone)]
pub struct SpawnHandle {
  handle: AbortHandle,
  is_closed: Arc<RwLock<bool>>,
}

impl SpawnHandle {
  pub fn new(handle: AbortHandle) -> Self {
    SpawnHandle {
      handle,
      is_closed: Arc::new(RwLock::new(false)),
    }
  }
}

impl SubscriptionLike for SpawnHandle {
  fn unsubscribe(&mut self) {
    let was_closed = *self.is_closed.read().unwrap();
    if !was_closed {
      *self.is_closed.write().unwrap() = true;
      self.handle.abort();
    }
  }

  fn is_closed(&self) -> bool {
    *self.is_closed.read().unwrap()
  }
}

type RecursiveBody = Box<dyn FnMut(&Rescheduler) + Send>;

/// Re-enqueues a recursive body on its scheduler.
///
/// Handed to the body on every step; `reschedule` enqueues the next step
/// as soon as possible, `reschedule_after` with a delay. Closing the
/// subscription returned from `schedule_recursive` cancels the pending
/// tail; a step already running finishes.
#[derive(Clone)]
pub struct Rescheduler {
  scheduler: SharedScheduler,
  body: Arc<Mutex<RecursiveBody>>,
  tail: SerialSubscription,
  rerun: Arc<AtomicBool>,
}

impl Rescheduler {
  fn new(scheduler: SharedScheduler, body: RecursiveBody) -> Self {
    Rescheduler {
      scheduler,
      body: Arc::new(Mutex::new(body)),
      tail: SerialSubscription::new(),
      rerun: Arc::new(AtomicBool::new(false)),
    }
  }

  fn handle(&self) -> SerialSubscription {
    self.tail.clone()
  }

  pub fn reschedule(&self) {
    let this = self.clone();
    let pending = self.scheduler.schedule(Box::new(move || this.invoke()));
    self.tail.set(pending);
  }

  pub fn reschedule_after(&self, delay: Duration) {
    let this = self.clone();
    let pending = self
      .scheduler
      .schedule_after(delay, Box::new(move || this.invoke()));
    self.tail.set(pending);
  }

  fn invoke(&self) {
    if self.tail.is_closed() {
      return;
    }
    // An inline scheduler re-enters invoke from within the body; the
    // try_lock miss records that and the outer frame loops instead of
    // recursing, keeping stack depth bounded.
    match self.body.try_lock() {
      Ok(mut guard) => {
        let body = &mut **guard;
        loop {
          self.rerun.store(false, Ordering::SeqCst);
          body(self);
          if self.tail.is_closed() || !self.rerun.load(Ordering::SeqCst) {
            break;
          }
        }
      }
      Err(_) => self.rerun.store(true, Ordering::SeqCst),
    }
  }
}

/// Recursive scheduling, available on any shared scheduler.
pub trait SchedulerExt {
  /// Invokes `body`; each `reschedule` call re-enqueues it as soon as
  /// possible.
  fn schedule_recursive<F>(&self, body: F) -> BoxSubscription
  where
    F: FnMut(&Rescheduler) + Send + 'static;

  /// Like [`schedule_recursive`] with an initial delay.
  ///
  /// [`schedule_recursive`]: SchedulerExt::schedule_recursive
  fn schedule_recursive_after<F>(
    &self,
    delay: Duration,
    body: F,
  ) -> BoxSubscription
  where
    F: FnMut(&Rescheduler) + Send + 'static;
}

impl SchedulerExt for SharedScheduler {
  fn schedule_recursive<F>(&self, body: F) -> BoxSubscription
  where
    F: FnMut(&Rescheduler) + Send + 'static,
  {
    let ctx = Rescheduler::new(self.clone(), Box::new(body));
    ctx.reschedule();
    ctx.handle().boxed()
  }

  fn schedule_recursive_after<F>(
    &self,
    delay: Duration,
    body: F,
  ) -> BoxSubscription
  where
    F: FnMut(&Rescheduler) + Send + 'static,
  {
    let ctx = Rescheduler::new(self.clone(), Box::new(body));
    ctx.reschedule_after(delay);
    ctx.handle().boxed()
  }
}

/// Runs actions synchronously on the caller.
///
/// Delayed work is a contract violation here; pass a non-immediate
/// scheduler to anything that needs real due times.
#[derive(Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> Instant {
    clock_now()
  }

  fn schedule(&self, action: Action) -> BoxSubscription {
    action();
    NopSubscription.boxed()
  }

  fn schedule_at(&self, due: Instant, action: Action) -> BoxSubscription {
    if due > self.now() {
      panic!("immediate scheduler cannot run delayed work at {}", due);
    }
    action();
    NopSubscription.boxed()
  }
}

#[derive(Default)]
struct TrampolineQueue {
  heap: BinaryHeap<ScheduledItem>,
  next_seq: u64,
}

thread_local! {
  static TRAMPOLINE: RefCell<Option<TrampolineQueue>> = RefCell::new(None);
}

struct TrampolineGuard;

impl Drop for TrampolineGuard {
  fn drop(&mut self) {
    TRAMPOLINE.with(|queue| *queue.borrow_mut() = None);
    trace!("current-thread trampoline uninstalled");
  }
}

/// Per-thread trampoline.
///
/// The first call on a thread installs a priority queue, drains it until
/// empty and uninstalls it; re-entrant `schedule` calls enqueue instead
/// of recursing, so synchronous producers run with bounded stack depth.
/// Equal due times run in registration order.
#[derive(Clone, Copy, Default)]
pub struct CurrentThreadScheduler;

impl CurrentThreadScheduler {
  /// Installs the queue, runs `f` (which may subscribe and enqueue
  /// work), drains everything it produced and returns `f`'s value. On a
  /// thread already draining, `f` simply runs inline.
  pub fn run_immediate<R>(f: impl FnOnce() -> R) -> R {
    let installed = TRAMPOLINE.with(|queue| {
      let mut queue = queue.borrow_mut();
      if queue.is_none() {
        *queue = Some(TrampolineQueue::default());
        true
      } else {
        false
      }
    });
    if !installed {
      return f();
    }
    trace!("current-thread trampoline installed");
    let _guard = TrampolineGuard;
    let result = f();
    Self::drain();
    result
  }

  fn enqueue(due: Instant, action: Action) -> TaskHandle {
    let handle = TaskHandle::new();
    TRAMPOLINE.with(|queue| {
      let mut queue = queue.borrow_mut();
      let queue = queue
        .as_mut()
        .expect("trampoline queue must be installed before enqueueing");
      let seq = queue.next_seq;
      queue.next_seq += 1;
      queue.heap.push(ScheduledItem {
        due,
        seq,
        action: Some(action),
        handle: handle.clone(),
      });
    });
    handle
  }

  fn drain() {
    loop {
      let item = TRAMPOLINE.with(|queue| {
        queue.borrow_mut().as_mut().and_then(|queue| queue.heap.pop())
      });
      let Some(mut item) = item else { break };
      if item.handle.is_closed() {
        continue;
      }
      let wait = item.due.saturating_duration_since(clock_now());
      if !wait.is_zero() {
        std::thread::sleep(wait);
      }
      if let Some(action) = item.action.take() {
        action();
      }
    }
  }
}

impl Scheduler for CurrentThreadScheduler {
  fn now(&self) -> Instant {
    clock_now()
  }

  fn schedule(&self, action: Action) -> BoxSubscription {
    Self::run_immediate(|| Self::enqueue(clock_now(), action)).boxed()
  }

  fn schedule_at(&self, due: Instant, action: Action) -> BoxSubscription {
    Self::run_immediate(|| Self::enqueue(due, action)).boxed()
  }
}

/// Runs actions on a futures thread pool; timed work is a delayed,
/// abortable future.
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  pub fn new() -> std::io::Result<Self> {
    Ok(ThreadPoolScheduler {
      pool: ThreadPool::new()?,
    })
  }

  fn spawn_delayed(&self, delay: Duration, action: Action) -> SpawnHandle {
    trace!("spawning pool task due in {:?}", delay);
    let fut = lazy(move |_| action()).delay(delay);
    let (fut, handle) = abortable(fut);
    self.pool.spawn_ok(fut.map(|_| ()));
    SpawnHandle::new(handle)
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn now(&self) -> Instant {
    clock_now()
  }

  fn schedule(&self, action: Action) -> BoxSubscription {
    self.spawn_delayed(Duration::ZERO, action).boxed()
  }

  fn schedule_at(&self, due: Instant, action: Action) -> BoxSubscription {
    self
      .spawn_delayed(due.saturating_duration_since(self.now()), action)
      .boxed()
  }
}

/// Shared immediate scheduler.
pub fn immediate() -> SharedScheduler {
  static INSTANCE: Lazy<SharedScheduler> =
    Lazy::new(|| Arc::new(ImmediateScheduler));
  INSTANCE.clone()
}

/// Shared current-thread trampoline scheduler.
pub fn current_thread() -> SharedScheduler {
  static INSTANCE: Lazy<SharedScheduler> =
    Lazy::new(|| Arc::new(CurrentThreadScheduler));
  INSTANCE.clone()
}

/// Shared thread-pool scheduler backing `interval` and `timer`.
pub fn thread_pool() -> SharedScheduler {
  static INSTANCE: Lazy<SharedScheduler> = Lazy::new(|| {
    Arc::new(
      ThreadPoolScheduler::new().expect("failed to spawn scheduler pool"),
    )
  });
  INSTANCE.clone()
}
