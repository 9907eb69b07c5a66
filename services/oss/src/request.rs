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

use crate::body::Body;
use http::header::{HeaderName, IntoHeaderName};
use http::{HeaderMap, HeaderValue, Method};
use ossclient_core::{Error, Result};
use std::collections::BTreeMap;

/// RequestDescription is the unit of work handed to the dispatcher.
///
/// `object` is the unescaped key; setting it requires a bucket.
#[derive(Debug)]
pub struct RequestDescription {
    /// HTTP method.
    pub method: Method,
    /// Target bucket.
    pub bucket: Option<String>,
    /// Target object key, unescaped.
    pub object: Option<String>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Query parameters. An empty value marks a flag such as `acl`.
    pub params: BTreeMap<String, String>,
    /// Request payload.
    pub body: Body,
    /// The caller has no interest in the response body.
    pub discard_body: bool,
}

impl RequestDescription {
    /// Create a new request with given method.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            bucket: None,
            object: None,
            headers: HeaderMap::new(),
            params: BTreeMap::new(),
            body: Body::Empty,
            discard_body: false,
        }
    }

    /// Set the target bucket.
    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = Some(bucket.to_string());
        self
    }

    /// Set the target object.
    pub fn with_object(mut self, object: &str) -> Self {
        self.object = Some(object.to_string());
        self
    }

    /// Insert a header, replacing any previous value.
    pub fn with_header(mut self, name: impl IntoHeaderName, value: &str) -> Result<Self> {
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    /// Merge user supplied headers, overriding existing ones.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        let mut last: Option<HeaderName> = None;
        for (name, value) in headers {
            // `None` means another value of the previous header.
            match name {
                Some(name) => {
                    self.headers.insert(name.clone(), value);
                    last = Some(name);
                }
                None => {
                    if let Some(name) = &last {
                        self.headers.append(name.clone(), value);
                    }
                }
            }
        }
        self
    }

    /// Set a query parameter.
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Set a query parameter if `value` is not empty.
    pub fn with_param_non_empty(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.with_param(key, value)
        }
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Drop the response body on success.
    pub fn discard_body(mut self) -> Self {
        self.discard_body = true;
        self
    }

    /// Check the request before anything is sent.
    pub fn validate(&self) -> Result<()> {
        let has_bucket = self.bucket.as_deref().is_some_and(|b| !b.is_empty());
        let has_object = self.object.as_deref().is_some_and(|o| !o.is_empty());
        if has_object && !has_bucket {
            return Err(Error::request_invalid(
                "object is set without a bucket",
            ));
        }
        Ok(())
    }
}

/// Append query parameters to a path.
///
/// Keys have `_` replaced by `-` and `maxkeys` becomes `max-keys`; the value of
/// `acl` is always dropped. Pairs are sorted by key and form-urlencoded, then
/// appended with `?`, or `&` if `path` already carries a query.
pub fn append_param<K, V>(path: &str, params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| {
            let mut k = k.as_ref().replace('_', "-");
            if k == "maxkeys" {
                k = "max-keys".to_string();
            }
            let v = if k == "acl" {
                String::new()
            } else {
                v.as_ref().to_string()
            };
            (k, v)
        })
        .collect();
    if params.is_empty() {
        return path.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossclient_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_append_param() {
        let params = [
            ("content-type", "image/jpeg"),
            ("maxkeys", "maxkeys"),
            ("x_oss_key_value", "nothing"),
            ("referer", "http://test.com/test?key=value&aa"),
            ("test&&example", "value"),
            ("acl", "acl"),
        ];
        assert_eq!(
            append_param("/test", params),
            "/test?acl=&content-type=image%2Fjpeg&max-keys=maxkeys&referer=http%3A%2F%2Ftest.com%2Ftest%3Fkey%3Dvalue%26aa&test%26%26example=value&x-oss-key-value=nothing"
        );
    }

    #[test]
    fn test_append_param_empty() {
        assert_eq!(append_param("/bucket/", Vec::<(&str, &str)>::new()), "/bucket/");
        assert_eq!(append_param("/", [("uploads", "")]), "/?uploads=");
        assert_eq!(
            append_param("http://host/key?x=1", [("Expires", "10")]),
            "http://host/key?x=1&Expires=10"
        );
    }

    #[test]
    fn test_validate() {
        let req = RequestDescription::new(Method::GET).with_object("key");
        assert_eq!(req.validate().unwrap_err().kind(), ErrorKind::RequestInvalid);

        let req = RequestDescription::new(Method::GET)
            .with_bucket("bucket")
            .with_object("key");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_with_headers_overrides() -> anyhow::Result<()> {
        let mut user = HeaderMap::new();
        user.insert("x-oss-meta-a", "user".parse()?);
        user.append("x-oss-meta-b", "1".parse()?);
        user.append("x-oss-meta-b", "2".parse()?);

        let req = RequestDescription::new(Method::PUT)
            .with_header("x-oss-meta-a", "default")?
            .with_headers(user);
        assert_eq!(req.headers["x-oss-meta-a"], "user");
        assert_eq!(req.headers.get_all("x-oss-meta-b").iter().count(), 2);
        Ok(())
    }
}
