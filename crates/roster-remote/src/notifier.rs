//! [`FunctionNotifier`] — welcome emails through a hosted function.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use roster_core::{collaborator::WelcomeNotifier, student::StudentRecord};

use crate::{
  Error, Result,
  client::{RemoteClient, check},
};

#[derive(Serialize)]
struct WelcomePayload<'a> {
  student_id: Uuid,
  name:       &'a str,
  email:      &'a str,
}

/// Invokes `POST /functions/v1/{function}` for every new student.
#[derive(Debug, Clone)]
pub struct FunctionNotifier {
  client:   RemoteClient,
  function: String,
}

impl FunctionNotifier {
  pub fn new(client: RemoteClient, function: impl Into<String>) -> Self {
    Self { client, function: function.into() }
  }
}

impl WelcomeNotifier for FunctionNotifier {
  type Error = Error;

  async fn send_welcome(&self, student: &StudentRecord) -> Result<()> {
    let payload = WelcomePayload {
      student_id: student.id,
      name:       &student.name,
      email:      student.email.as_str(),
    };

    let resp = self
      .client
      .auth(self.client.http().post(self.client.function_url(&self.function)))
      .json(&payload)
      .send()
      .await?;
    check(resp).await?;

    debug!(student_id = %student.id, function = %self.function, "welcome email dispatched");
    Ok(())
  }
}
