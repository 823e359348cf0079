use crate::error::RxError;
use crate::notification::Notification;
use crate::observable::Observable;
use crate::subscription::{SerialSubscription, SubscriptionLike};
use std::sync::mpsc::{self, Receiver};

/// Producer-side capacity of the pull buffer; a producer running ahead
/// of the consumer blocks once this many notifications are queued.
const QUEUE_BOUND: usize = 128;

impl<Item: Send + 'static> Observable<Item> {
  /// Materializes the stream into a bounded blocking queue and exposes
  /// it as a lazy pull iterator. The subscription closes as soon as a
  /// terminal notification is pulled (or the iterator is dropped).
  ///
  /// A fully synchronous source longer than the buffer would block its
  /// own subscribing thread; move such sources off-thread with
  /// [`subscribe_on`] first.
  ///
  /// [`subscribe_on`]: Observable::subscribe_on
  pub fn to_iter(&self) -> ToIter<Item> {
    let (tx, rx) = mpsc::sync_channel(QUEUE_BOUND);
    let tx_value = tx.clone();
    let tx_error = tx.clone();
    let tx_done = tx;

    let subscription = self.subscribe_all(
      move |value| {
        let _ = tx_value.send(Notification::Next(value));
      },
      move |err| {
        let _ = tx_error.send(Notification::Error(err));
      },
      move || {
        let _ = tx_done.send(Notification::Completed);
      },
    );

    ToIter {
      rx,
      subscription: Some(subscription),
      done: false,
    }
  }
}

/// Blocking iterator over a subscription; see
/// [`to_iter`](Observable::to_iter).
pub struct ToIter<Item> {
  rx: Receiver<Notification<Item>>,
  subscription: Option<SerialSubscription>,
  done: bool,
}

impl<Item> ToIter<Item> {
  fn finish(&mut self) {
    self.done = true;
    if let Some(mut subscription) = self.subscription.take() {
      subscription.unsubscribe();
    }
  }
}

impl<Item> Iterator for ToIter<Item> {
  type Item = Result<Item, RxError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    match self.rx.recv() {
      Ok(Notification::Next(value)) => Some(Ok(value)),
      Ok(Notification::Error(err)) => {
        self.finish();
        Some(Err(err))
      }
      Ok(Notification::Completed) | Err(_) => {
        self.finish();
        None
      }
    }
  }
}

impl<Item> Drop for ToIter<Item> {
  fn drop(&mut self) {
    if !self.done {
      self.finish();
    }
  }
}

#[cfg(test)]
mod test {
  use crate::error::{rx_error, TimeoutError};
  use crate::observable;
  use crate::scheduler::thread_pool;
  use std::time::Duration;

  #[test]
  fn pulls_all_values() {
    let values: Result<Vec<i32>, _> =
      observable::from_iter(vec![1, 2, 3]).to_iter().collect();
    assert_eq!(values.unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn error_ends_the_iteration() {
    let mut iter = observable::from_iter(vec![5])
      .concat(&observable::throw(rx_error(TimeoutError)))
      .to_iter();

    assert_eq!(iter.next().unwrap().unwrap(), 5);
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
  }

  #[test]
  fn early_drop_cancels_the_producer() {
    let mut iter =
      observable::interval(Duration::from_millis(1), thread_pool()).to_iter();
    assert_eq!(iter.next().unwrap().unwrap(), 0);
    drop(iter);
  }

  #[test]
  fn concat_agrees_with_sequence_append() {
    let xs = vec![1, 2, 3];
    let ys = vec![4, 5];
    let pulled: Result<Vec<i32>, _> = observable::from_iter(xs.clone())
      .concat(&observable::from_iter(ys.clone()))
      .to_iter()
      .collect();

    let mut expected = xs;
    expected.extend(ys);
    assert_eq!(pulled.unwrap(), expected);
  }
}
