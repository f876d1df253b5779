//! External collaborators consulted by the directory.
//!
//! Neither is reimplemented here: purchase verification is a lookup against a
//! third-party commerce platform, and the welcome email is dispatched by a
//! hosted function. `roster-remote` provides HTTP implementations.
//!
//! `Option<T>` of either collaborator is itself a collaborator, so a
//! deployment without one configured simply passes `None`.

use std::future::Future;

use crate::student::{EmailAddress, StudentRecord};

/// Asks the commerce platform whether an email belongs to a paying customer.
pub trait PurchaseVerifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn verify<'a>(
    &'a self,
    email: &'a EmailAddress,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

/// Sends the welcome email for a freshly added student.
pub trait WelcomeNotifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send_welcome<'a>(
    &'a self,
    student: &'a StudentRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

impl<V: PurchaseVerifier> PurchaseVerifier for Option<V> {
  type Error = V::Error;

  async fn verify(&self, email: &EmailAddress) -> Result<bool, V::Error> {
    match self {
      Some(verifier) => verifier.verify(email).await,
      None => Ok(false),
    }
  }
}

impl<N: WelcomeNotifier> WelcomeNotifier for Option<N> {
  type Error = N::Error;

  async fn send_welcome(&self, student: &StudentRecord) -> Result<(), N::Error> {
    match self {
      Some(notifier) => notifier.send_welcome(student).await,
      None => Ok(()),
    }
  }
}
