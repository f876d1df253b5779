//! [`HttpPurchaseVerifier`] — purchase lookup against the commerce platform.

use serde::{Deserialize, Serialize};

use roster_core::{collaborator::PurchaseVerifier, student::EmailAddress};

use crate::{
  Error, Result,
  client::{RemoteClient, check},
};

#[derive(Serialize)]
struct VerifyRequest<'a> {
  email: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
  has_purchase: bool,
}

/// Posts `{"email": …}` to the verification endpoint and reads back
/// `{"has_purchase": bool}`.
#[derive(Debug, Clone)]
pub struct HttpPurchaseVerifier {
  client: RemoteClient,
  url:    String,
}

impl HttpPurchaseVerifier {
  /// `url` may be absolute or a hosted function name.
  pub fn new(client: RemoteClient, url: impl Into<String>) -> Self {
    let url = url.into();
    let url = if url.starts_with("http://") || url.starts_with("https://") {
      url
    } else {
      client.function_url(&url)
    };
    Self { client, url }
  }
}

impl PurchaseVerifier for HttpPurchaseVerifier {
  type Error = Error;

  async fn verify(&self, email: &EmailAddress) -> Result<bool> {
    let resp = self
      .client
      .auth(self.client.http().post(&self.url))
      .json(&VerifyRequest { email: email.as_str() })
      .send()
      .await?;

    let body: VerifyResponse = check(resp).await?.json().await?;
    Ok(body.has_purchase)
  }
}
