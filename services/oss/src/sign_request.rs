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

use crate::canonical::{canonicalize_sub_resources, CanonicalForm};
use crate::constants::*;
use crate::Credential;
use http::header::{AUTHORIZATION, DATE};
use http::{HeaderMap, HeaderValue, Method};
use ossclient_core::hash::base64_hmac_sha1;
use ossclient_core::time::{format_http_date, now, DateTime};
use ossclient_core::{Error, Result};
use std::collections::BTreeMap;
use std::time::Duration;

/// RequestSigner signs requests with HMAC-SHA1.
///
/// Header signing sets `Date` and `Authorization`; query signing produces the
/// `OSSAccessKeyId`, `Expires` and `Signature` parameters of a presigned url.
#[derive(Debug, Default, Clone)]
pub struct RequestSigner {
    debug: bool,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the canonical form of every signed request at debug level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn get_time(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    /// Compute the base64 HMAC-SHA1 of the canonical form.
    pub fn signature(&self, cred: &Credential, form: &CanonicalForm) -> String {
        let signature = base64_hmac_sha1(
            cred.access_key_secret.as_bytes(),
            form.string_to_sign.as_bytes(),
        );

        if self.debug {
            log::debug!(
                "canonical form: content_md5={:?}, content_type={:?}, date={:?}, headers={:?}, resource={:?}",
                form.content_md5,
                form.content_type,
                form.date,
                form.canonicalized_headers,
                form.canonicalized_resource
            );
            log::debug!("string to sign: {:?}, signature: {signature}", form.string_to_sign);
        }

        signature
    }

    /// Build the `Authorization` value for already stamped headers.
    pub fn authorization(
        &self,
        cred: &Credential,
        method: &Method,
        headers: &HeaderMap,
        resource: &str,
    ) -> String {
        let form = CanonicalForm::build(method, headers, resource);
        format!(
            "{PROVIDER} {}:{}",
            cred.access_key_id,
            self.signature(cred, &form)
        )
    }

    /// Sign headers in place.
    ///
    /// The security token is inserted before the canonical form is built so that
    /// it is covered by the signature.
    pub fn sign_header(
        &self,
        cred: &Credential,
        method: &Method,
        headers: &mut HeaderMap,
        resource: &str,
    ) -> Result<()> {
        if let Some(token) = &cred.security_token {
            headers.insert(X_OSS_SECURITY_TOKEN, token.parse()?);
        }
        headers.insert(DATE, format_http_date(self.get_time()).parse()?);

        let mut value: HeaderValue = self
            .authorization(cred, method, headers, resource)
            .parse()?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        Ok(())
    }

    /// Sign for a presigned url valid for `expires_in`.
    ///
    /// `path` is the resource without sub-resources, such as `/bucket/object`; the
    /// signed sub-resources are taken from `params`. The expiry timestamp (unix
    /// seconds) is used as the date line. With a security token, `security-token`
    /// is signed and returned as well. Returns the parameters to append to the url.
    pub fn sign_query(
        &self,
        cred: &Credential,
        method: &Method,
        headers: &HeaderMap,
        path: &str,
        params: &BTreeMap<String, String>,
        expires_in: Duration,
    ) -> Result<Vec<(String, String)>> {
        let expires_in = chrono::TimeDelta::from_std(expires_in)
            .map_err(|e| Error::request_invalid("invalid expiration duration").with_source(e))?;
        let expires = (self.get_time() + expires_in).timestamp().to_string();

        let mut headers = headers.clone();
        headers.insert(DATE, expires.parse()?);

        let token = cred
            .security_token
            .as_ref()
            .map(|token| (SECURITY_TOKEN, token.as_str()));
        let sub_resources = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(token);
        let resource = format!("{path}{}", canonicalize_sub_resources(sub_resources));

        let form = CanonicalForm::build(method, &headers, &resource);
        let signature = self.signature(cred, &form);

        let mut params = vec![
            (OSS_ACCESS_KEY_ID.to_string(), cred.access_key_id.clone()),
            (EXPIRES.to_string(), expires),
            (SIGNATURE.to_string(), signature),
        ];
        if let Some(token) = &cred.security_token {
            params.push((SECURITY_TOKEN.to_string(), token.clone()));
        }

        Ok(params)
    }
}
