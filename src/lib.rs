//! Push-based reactive sequences.
//!
//! An [`Observable`](observable::Observable) pushes values at an
//! [`Observer`](observer::Observer) until a single terminal
//! notification; the handle returned from `subscribe` is the only flow
//! control — closing it cancels production. Schedulers decide when and
//! where producer code runs: inline, on a per-thread trampoline, on a
//! thread pool, or in virtual time for deterministic tests.
//!
//! ```
//! use rxcore::observable;
//!
//! let sum: i32 = observable::from_iter(1..=4)
//!   .map(|v| v * 10)
//!   .to_iter()
//!   .map(|v| v.unwrap())
//!   .sum();
//! assert_eq!(sum, 100);
//! ```

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod scheduler;
pub mod subscription;
pub mod test_scheduler;

pub mod prelude {
  pub use crate::error::{
    rx_error, CallbackPanic, EmptyError, RxError, TimeoutError,
  };
  pub use crate::notification::Notification;
  pub use crate::observable::{self, Observable};
  pub use crate::observer::{
    BoxObserver, CheckedObserver, Observer, ObserverAll, ObserverComplete,
    ObserverNext, SyncObserver,
  };
  pub use crate::ops::{AnyItem, ToIter};
  pub use crate::scheduler::{
    self, Action, CurrentThreadScheduler, ImmediateScheduler, Instant,
    Rescheduler, Scheduler, SchedulerExt, SharedScheduler, SpawnHandle,
    TaskHandle, ThreadPoolScheduler,
  };
  pub use crate::subscription::{
    ActionSubscription, BoolSubscription, BoxSubscription,
    CompositeSubscription, NopSubscription, SerialSubscription,
    SubscriptionLike,
  };
  pub use crate::test_scheduler::{
    HotObservable, TestObserver, VirtualScheduler,
  };
}
