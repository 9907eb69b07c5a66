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
use crate::request::append_param;
use crate::Client;
use http::{HeaderMap, Method};
use ossclient_core::Result;
use std::collections::BTreeMap;
use std::time::Duration;

/// Options of a presigned url.
#[derive(Debug, Clone)]
pub struct SignUrlOptions {
    /// Method the url is valid for.
    pub method: Method,
    /// Headers the url user will send, such as `Content-Type`.
    pub headers: HeaderMap,
    /// Extra query parameters; sub-resources among them are signed.
    pub params: BTreeMap<String, String>,
    /// How long the url stays valid, default to 60s.
    pub expires_in: Duration,
}

impl Default for SignUrlOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            params: BTreeMap::new(),
            expires_in: Duration::from_secs(60),
        }
    }
}

impl Client {
    /// Generate a presigned url for an object, resolving the addressing style.
    pub fn sign_url(&self, bucket: &str, object: &str, opts: &SignUrlOptions) -> Result<String> {
        let path = canonicalize_resource(Some(bucket), Some(object), Vec::<(&str, &str)>::new());
        let query = self.signer().sign_query(
            self.credential(),
            &opts.method,
            &opts.headers,
            &path,
            &opts.params,
            opts.expires_in,
        )?;

        let addr = self.addressing(Some(bucket), Some(object));
        let params = opts
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .chain(query);

        Ok(format!(
            "{}://{}{}",
            self.scheme(),
            addr.authority,
            append_param(&addr.path, params)
        ))
    }

    /// Generate a presigned url for a caller built `url` and resource `path`.
    ///
    /// `path` is the resource without sub-resources, such as `/bucket/object`.
    /// Sub-resources in `opts.params` are signed and appended to the url.
    pub fn sign_url_with_resource(
        &self,
        url: &str,
        path: &str,
        opts: &SignUrlOptions,
    ) -> Result<String> {
        let query = self.signer().sign_query(
            self.credential(),
            &opts.method,
            &opts.headers,
            path,
            &opts.params,
            opts.expires_in,
        )?;

        let params = opts
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .chain(query);
        Ok(append_param(url, params))
    }
}
