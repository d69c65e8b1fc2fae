//! HTTP [`Store`] backend speaking to the remote document API.
//!
//! [`Store`]: super::Store

mod impls;
mod wire;

use std::time::Duration;

use derive_more::{Debug, Display, Error as StdError, From};
use secrecy::{ExposeSecret as _, SecretString};
use serde::de::DeserializeOwned;
use tracerr::Traced;

pub use self::wire::InvalidField;

/// Configuration of an [`Http`] store.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the remote document API.
    pub base_url: String,

    /// Bearer token to authorize requests with.
    #[debug(skip)]
    pub api_key: Option<SecretString>,

    /// Timeout of a single request.
    pub timeout: Duration,
}

/// [`Store`] backend over the remote document API.
///
/// [`Store`]: super::Store
#[derive(Clone, Debug)]
pub struct Http {
    /// HTTP client all requests go through.
    #[debug(skip)]
    client: reqwest::Client,

    /// [`Config`] of this [`Http`] store.
    config: Config,
}

impl Http {
    /// Creates a new [`Http`] store.
    ///
    /// # Errors
    ///
    /// Errors if the underlying HTTP client cannot be initialized.
    pub fn new(config: Config) -> Result<Self, Traced<Error>> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        Ok(Self { client, config })
    }

    /// Builds an authorized request to the provided `path` of the remote
    /// document API.
    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        let url =
            format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let mut req = self.client.request(method, url);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key.expose_secret());
        }
        req
    }

    /// Sends the provided request and decodes its JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, Traced<Error>> {
        let resp = req
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(tracerr::new!(Error::Status(status.as_u16())));
        }

        resp.json::<T>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

/// [`Http`] store error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP transport or body decoding failed.
    #[display("HTTP request failed: {_0}")]
    Request(reqwest::Error),

    /// Remote responded with an unexpected HTTP status.
    #[display("unexpected HTTP status {_0}")]
    #[from(ignore)]
    Status(#[error(not(source))] u16),

    /// Remote reported the operation as failed.
    #[display("remote rejected the operation: {_0}")]
    #[from(ignore)]
    Rejected(#[error(not(source))] String),

    /// Remote served a document failing validation.
    Invalid(InvalidField),
}
