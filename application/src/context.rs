//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use derive_more::Debug;
use secrecy::{ExposeSecret as _, SecretString};

use crate::{define_error, AsError, Error, Service};

/// Admin credentials the API is gated behind.
///
/// The tokens themselves are issued by the external authentication
/// provider; the application only verifies the presented one.
#[derive(Clone, Debug)]
pub struct Auth {
    /// Bearer token granting admin access.
    #[debug(skip)]
    token: SecretString,
}

impl Auth {
    /// Creates a new [`Auth`] accepting the provided token.
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Indicates whether the presented token grants admin access.
    fn allows(&self, presented: &str) -> bool {
        // Byte-wise comparison over equal-length slices.
        let expected = self.token.expose_secret().as_bytes();
        let presented = presented.as_bytes();
        presented.len() == expected.len()
            && presented
                .iter()
                .zip(expected)
                .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

/// Authenticated context of an admin API request.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;
        let auth = parts
            .extensions
            .get::<Auth>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Auth` extension"))?;

        let bearer = match parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => bearer,
            Err(e) => {
                return Err(if e.is_missing() {
                    AuthError::AuthorizationRequired.into()
                } else {
                    e.into_error()
                });
            }
        };
        if !auth.allows(bearer.token()) {
            return Err(AuthError::InvalidToken.into());
        }

        Ok(Self { service })
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Presented token is not valid"]
        InvalidToken,
    }
}
