// ABOUTME: Client for backend endpoints that need no credential
// ABOUTME: Contest browsing and user directory registration go through here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::AppResult;

use super::{decode, Transport};

/// Unauthenticated backend client
#[derive(Debug, Clone)]
pub struct PublicClient {
    transport: Transport,
}

impl PublicClient {
    /// Client over `transport`
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Shared transport
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `GET path` decoded as JSON
    ///
    /// # Errors
    ///
    /// Transport, status or decoding failures
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        decode(self.send(Method::GET, path, None::<&()>, None::<&()>).await?).await
    }

    /// `GET path?query` decoded as JSON
    ///
    /// # Errors
    ///
    /// Transport, status or decoding failures
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        decode(self.send(Method::GET, path, Some(query), None::<&()>).await?).await
    }

    /// `POST path` with a JSON body, returning the raw response
    ///
    /// # Errors
    ///
    /// Transport failures only; the status is left to the caller
    pub async fn post_raw<B>(&self, path: &str, body: &B) -> AppResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(Method::POST, path, None::<&()>, Some(body)).await
    }

    async fn send<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> AppResult<Response>
    where
        Q: Serialize + ?Sized + Sync,
        B: Serialize + ?Sized + Sync,
    {
        let mut request = self.transport.request(method.clone(), path)?;
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        debug!(%method, path, status = response.status().as_u16(), "Public request completed");
        Ok(response)
    }
}
