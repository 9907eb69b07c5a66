// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::canonical::canonicalize_resource;
use crate::constants::*;
use crate::endpoint::{is_storage_host, resolve, select_host, Addressing};
use crate::model::from_xml;
use crate::request::{append_param, RequestDescription};
use crate::service_error::ServiceError;
use crate::sign_request::RequestSigner;
use crate::{Config, Credential, DefaultCredentialProvider};
use bytes::Bytes;
use http::header::{HOST, USER_AGENT};
use http::{HeaderMap, Method, Response};
use ossclient_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// ClientBuilder loads configuration and credential, then builds a [`Client`].
pub struct ClientBuilder {
    config: Config,
    ctx: Context,
    provider: Option<Box<dyn ProvideCredential<Credential = Credential>>>,
}

impl ClientBuilder {
    /// Create a builder from config.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ctx: Context::new(),
            provider: None,
        }
    }

    /// Set the context providing transport and environment.
    pub fn context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Use a custom credential provider instead of [`DefaultCredentialProvider`].
    pub fn credential_provider(
        mut self,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Build the client.
    ///
    /// The credential is loaded exactly once here. With more than one endpoint
    /// candidate, the reachable one is selected.
    pub async fn build(self) -> Result<Client> {
        let config = self.config.from_env(&self.ctx);

        let (host, port) = select_host(&config.endpoint, config.port, config.timeout).await?;

        let provider = self
            .provider
            .unwrap_or_else(|| Box::new(DefaultCredentialProvider::with_config(&config)));
        let credential = provider
            .provide_credential(&self.ctx)
            .await?
            .filter(|c| c.is_valid())
            .ok_or_else(|| Error::credential_invalid("no valid credential found"))?;

        let session = Session::new(host, port, config.is_security);

        Ok(Client {
            ctx: self.ctx,
            credential: Arc::new(credential),
            session: Arc::new(session),
            signer: RequestSigner::new().with_debug(config.debug),
            retry_times: config.retry_times,
            timeout: config.timeout,
            is_storage_host: config.is_storage_host,
            follow_endpoint_redirect: config.follow_endpoint_redirect,
            user_agent: user_agent(),
        })
    }
}

fn user_agent() -> String {
    format!(
        "ossclient-rust/{} ({}/{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// State shared by all clones of a client.
///
/// Https is decided once at build time and never reverted. Only the dispatcher
/// writes to it, rewriting the host when endpoint redirects are followed.
#[derive(Debug)]
struct Session {
    host: RwLock<String>,
    port: u16,
    is_security: AtomicBool,
}

impl Session {
    fn new(host: String, port: u16, is_security: bool) -> Self {
        Self {
            host: RwLock::new(host),
            port,
            is_security: AtomicBool::new(is_security || port == 443),
        }
    }

    fn host(&self) -> String {
        match self.host.read() {
            Ok(host) => host.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_host(&self, host: &str) {
        let mut guard = match self.host.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = host.to_string();
    }

    fn is_security(&self) -> bool {
        self.is_security.load(Ordering::Relaxed)
    }
}

/// Client of the object storage service.
///
/// Cloning is cheap; clones share the credential and the session state.
#[derive(Clone)]
pub struct Client {
    ctx: Context,
    credential: Arc<Credential>,
    session: Arc<Session>,
    signer: RequestSigner,
    retry_times: usize,
    timeout: Duration,
    is_storage_host: Option<bool>,
    follow_endpoint_redirect: bool,
    user_agent: String,
}

impl Debug for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("credential", &self.credential)
            .field("session", &self.session)
            .field("retry_times", &self.retry_times)
            .field("timeout", &self.timeout)
            .field("is_storage_host", &self.is_storage_host)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Set the timeout of a single attempt.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Log canonical strings and signatures at debug level.
    pub fn set_debug(&mut self, debug: bool) {
        self.signer = self.signer.clone().with_debug(debug);
    }

    /// Set the number of attempts per request.
    pub fn set_retry_times(&mut self, retry_times: usize) {
        self.retry_times = retry_times;
    }

    /// Force (or forbid) virtual-host style addressing.
    pub fn set_is_storage_host(&mut self, is_storage_host: bool) {
        self.is_storage_host = Some(is_storage_host);
    }

    /// The host requests currently go to.
    pub fn host(&self) -> String {
        self.session.host()
    }

    /// Whether requests use https.
    pub fn is_security(&self) -> bool {
        self.session.is_security()
    }

    /// The `User-Agent` sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    pub(crate) fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    pub(crate) fn scheme(&self) -> &'static str {
        if self.session.is_security() {
            "https"
        } else {
            "http"
        }
    }

    pub(crate) fn addressing(&self, bucket: Option<&str>, object: Option<&str>) -> Addressing {
        let host = self.session.host();
        let storage_host = is_storage_host(&host, self.is_storage_host);
        resolve(&host, self.session.port, storage_host, bucket, object)
    }

    /// Send a request, retrying transient failures.
    ///
    /// The body is read once; every attempt is stamped and signed again. A non-2xx
    /// response becomes an [`ErrorKind::Service`](ossclient_core::ErrorKind::Service)
    /// error carrying the parsed [`ServiceError`].
    pub async fn send(&self, req: RequestDescription) -> Result<Response<Bytes>> {
        req.validate()?;
        let RequestDescription {
            method,
            bucket,
            object,
            mut headers,
            params,
            body,
            discard_body,
        } = req;

        let (payload, md5) = body.prepare().await?;
        if let Some(md5) = md5 {
            if !headers.contains_key(CONTENT_MD5) {
                headers.insert(CONTENT_MD5, md5.parse()?);
            }
        }

        let resource = canonicalize_resource(bucket.as_deref(), object.as_deref(), &params);
        let attempts = self.retry_times.max(1);

        let mut last_err = None;
        for attempt in 1..=attempts {
            let req = self.build_request(
                &method,
                bucket.as_deref(),
                object.as_deref(),
                &headers,
                &params,
                &resource,
                payload.clone(),
            )?;

            match self.send_once(req).await {
                Ok(resp) if discard_body => {
                    let (parts, _) = resp.into_parts();
                    return Ok(Response::from_parts(parts, Bytes::new()));
                }
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    if !self.should_retry(&err) {
                        return Err(err);
                    }
                    log::warn!("attempt {attempt}/{attempts} of {method} {resource} failed: {err}");
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::unexpected("request was never attempted")))
    }

    /// Send a request and decode its XML body.
    pub async fn send_xml<T: DeserializeOwned>(&self, req: RequestDescription) -> Result<T> {
        let resp = self.send(req).await?;
        from_xml(resp.into_body())
    }

    /// Send a request without interest in the response body.
    pub async fn send_discard(&self, req: RequestDescription) -> Result<HeaderMap> {
        let resp = self.send(req.discard_body()).await?;
        let (parts, _) = resp.into_parts();
        Ok(parts.headers)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_request(
        &self,
        method: &Method,
        bucket: Option<&str>,
        object: Option<&str>,
        headers: &HeaderMap,
        params: &BTreeMap<String, String>,
        resource: &str,
        payload: Bytes,
    ) -> Result<http::Request<Bytes>> {
        let scheme = self.scheme();
        let addr = self.addressing(bucket, object);
        let url = format!(
            "{scheme}://{}{}",
            addr.authority,
            append_param(&addr.path, params)
        );

        let mut headers = headers.clone();
        headers.insert(HOST, addr.authority.parse()?);
        headers.insert(USER_AGENT, self.user_agent.parse()?);
        self.signer
            .sign_header(&self.credential, method, &mut headers, resource)?;

        let mut req = http::Request::builder()
            .method(method.clone())
            .uri(url)
            .body(payload)?;
        *req.headers_mut() = headers;
        Ok(req)
    }

    async fn send_once(&self, req: http::Request<Bytes>) -> Result<Response<Bytes>> {
        let resp = tokio::time::timeout(self.timeout, self.ctx.http_send(req))
            .await
            .map_err(|e| {
                Error::transport(format!("request timed out after {:?}", self.timeout))
                    .with_source(e)
            })??;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let (parts, body) = resp.into_parts();
        Err(ServiceError::parse(parts.status, body).into())
    }

    /// Decide whether a failed attempt is worth another one.
    fn should_retry(&self, err: &Error) -> bool {
        if err.is_transport_error() {
            return true;
        }
        let Some(service) = ServiceError::from_error(err) else {
            return false;
        };

        if self.follow_endpoint_redirect && !service.endpoint.is_empty() {
            let current = self.session.host();
            if service.endpoint != current {
                log::info!("endpoint changed from {current} to {}", service.endpoint);
                self.session.set_host(&service.endpoint);
                return true;
            }
        }

        service.is_retryable()
    }
}
