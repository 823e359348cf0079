use crate::error::RxError;
use crate::observer::Observer;

/// A reified observer call.
#[derive(Clone, Debug)]
pub enum Notification<Item> {
  Next(Item),
  Completed,
  Error(RxError),
}

impl<Item> Notification<Item> {
  /// Replays this notification into `observer`, dispatching to the
  /// matching method.
  pub fn accept<O>(self, observer: &mut O)
  where
    O: Observer<Item = Item>,
  {
    match self {
      Notification::Next(value) => observer.next(value),
      Notification::Completed => observer.complete(),
      Notification::Error(err) => observer.error(err),
    }
  }

  pub fn is_terminal(&self) -> bool {
    !matches!(self, Notification::Next(_))
  }
}

/// Errors compare by display string; two distinct error values with the
/// same message are considered equal, which is what timestamped stream
/// assertions need.
impl<Item: PartialEq> PartialEq for Notification<Item> {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Notification::Next(a), Notification::Next(b)) => a == b,
      (Notification::Completed, Notification::Completed) => true,
      (Notification::Error(a), Notification::Error(b)) => {
        a.to_string() == b.to_string()
      }
      _ => false,
    }
  }
}

impl<Item: Eq> Eq for Notification<Item> {}

#[cfg(test)]
mod test {
  use super::*;
  use crate::error::{rx_error, EmptyError, TimeoutError};
  use crate::observer::ObserverAll;
  use std::sync::{Arc, Mutex};

  #[test]
  fn accept_dispatches() {
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, e, c) = (seen.clone(), seen.clone(), seen.clone());
    let mut observer = ObserverAll::new(
      move |v: i32| n.lock().unwrap().push(format!("next {}", v)),
      move |err| e.lock().unwrap().push(format!("error {}", err)),
      move || c.lock().unwrap().push("complete".to_string()),
    );

    Notification::Next(3).accept(&mut observer);
    Notification::Completed.accept(&mut observer);
    Notification::<i32>::Error(rx_error(EmptyError)).accept(&mut observer);

    assert_eq!(
      *seen.lock().unwrap(),
      vec!["next 3", "complete", "error sequence is empty"]
    );
  }

  #[test]
  fn terminal_classification() {
    assert!(!Notification::Next(1).is_terminal());
    assert!(Notification::<i32>::Completed.is_terminal());
    assert!(Notification::<i32>::Error(rx_error(TimeoutError)).is_terminal());
  }

  #[test]
  fn errors_compare_by_message() {
    let a = Notification::<i32>::Error(rx_error(EmptyError));
    let b = Notification::<i32>::Error(rx_error(EmptyError));
    let c = Notification::<i32>::Error(rx_error(TimeoutError));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, Notification::Completed);
  }
}
