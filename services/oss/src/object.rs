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
use crate::constants::*;
use crate::model::*;
use crate::request::RequestDescription;
use crate::Client;
use bytes::Bytes;
use http::{HeaderMap, Method, Response};
use ossclient_core::Result;
use percent_encoding::utf8_percent_encode;
use std::collections::BTreeMap;

/// Value of `x-oss-copy-source`: `/{bucket}/{encoded object}`.
pub(crate) fn copy_source(bucket: &str, object: &str) -> String {
    format!(
        "/{bucket}/{}",
        utf8_percent_encode(object, &OSS_QUERY_ENCODE_SET)
    )
}

impl Client {
    /// Get an object.
    ///
    /// `headers` may carry conditions such as `Range`; `params` may carry
    /// `response-*` overrides.
    pub async fn get_object(
        &self,
        bucket: &str,
        object: &str,
        headers: HeaderMap,
        params: BTreeMap<String, String>,
    ) -> Result<Response<Bytes>> {
        let mut req = RequestDescription::new(Method::GET)
            .with_bucket(bucket)
            .with_object(object)
            .with_headers(headers);
        req.params = params;

        self.send(req).await
    }

    /// Get the acl of an object.
    pub async fn get_object_acl(&self, bucket: &str, object: &str) -> Result<AccessControlPolicy> {
        let req = RequestDescription::new(Method::GET)
            .with_bucket(bucket)
            .with_object(object)
            .with_param("acl", "");
        self.send_xml(req).await
    }

    /// Get the metadata of an object.
    pub async fn head_object(
        &self,
        bucket: &str,
        object: &str,
        headers: HeaderMap,
    ) -> Result<HeaderMap> {
        let req = RequestDescription::new(Method::HEAD)
            .with_bucket(bucket)
            .with_object(object)
            .with_headers(headers);
        self.send_discard(req).await
    }

    /// Upload an object and return the response headers, `ETag` among them.
    pub async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        body: impl Into<Body>,
        headers: HeaderMap,
    ) -> Result<HeaderMap> {
        let req = RequestDescription::new(Method::PUT)
            .with_bucket(bucket)
            .with_object(object)
            .with_headers(headers)
            .with_body(body);
        self.send_discard(req).await
    }

    /// Set the acl of an object.
    pub async fn put_object_acl(&self, bucket: &str, object: &str, acl: Acl) -> Result<()> {
        let req = RequestDescription::new(Method::PUT)
            .with_bucket(bucket)
            .with_object(object)
            .with_param("acl", "")
            .with_header(X_OSS_OBJECT_ACL, acl.as_str())?;
        self.send_discard(req).await?;
        Ok(())
    }

    /// Copy `source_bucket/source_object` to `bucket/object` on the server side.
    pub async fn copy_object(
        &self,
        source_bucket: &str,
        source_object: &str,
        bucket: &str,
        object: &str,
        headers: HeaderMap,
    ) -> Result<CopyObjectResult> {
        let req = RequestDescription::new(Method::PUT)
            .with_bucket(bucket)
            .with_object(object)
            .with_headers(headers)
            .with_header(X_OSS_COPY_SOURCE, &copy_source(source_bucket, source_object))?;
        self.send_xml(req).await
    }

    /// Append to an appendable object at `position`.
    ///
    /// The next position is returned in the `x-oss-next-append-position` header.
    pub async fn append_object(
        &self,
        bucket: &str,
        object: &str,
        position: u64,
        body: impl Into<Body>,
        headers: HeaderMap,
    ) -> Result<HeaderMap> {
        let req = RequestDescription::new(Method::POST)
            .with_bucket(bucket)
            .with_object(object)
            .with_headers(headers)
            .with_param("append", "")
            .with_param("position", position.to_string())
            .with_body(body);
        self.send_discard(req).await
    }

    /// Delete an object.
    pub async fn delete_object(&self, bucket: &str, object: &str) -> Result<()> {
        let req = RequestDescription::new(Method::DELETE)
            .with_bucket(bucket)
            .with_object(object);
        self.send_discard(req).await?;
        Ok(())
    }

    /// Delete many objects in one request.
    ///
    /// In quiet mode the service only reports failures, and an empty result is returned.
    pub async fn delete_objects<I, S>(&self, bucket: &str, keys: I, quiet: bool) -> Result<DeleteResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let delete = Delete {
            quiet,
            object: keys
                .into_iter()
                .map(|key| ObjectIdentifier { key: key.into() })
                .collect(),
        };
        let req = RequestDescription::new(Method::POST)
            .with_bucket(bucket)
            .with_param("delete", "")
            .with_body(to_xml(&delete)?);

        if quiet {
            self.send_discard(req).await?;
            return Ok(DeleteResult::default());
        }
        self.send_xml(req).await
    }

    /// Send a cors preflight request for an object.
    ///
    /// `headers` should carry `Origin` and `Access-Control-Request-Method`.
    pub async fn option_object(
        &self,
        bucket: &str,
        object: &str,
        headers: HeaderMap,
    ) -> Result<HeaderMap> {
        let req = RequestDescription::new(Method::OPTIONS)
            .with_bucket(bucket)
            .with_object(object)
            .with_headers(headers);
        self.send_discard(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source() {
        assert_eq!(copy_source("bucket", "dir/a b.txt"), "/bucket/dir%2Fa%20b.txt");
    }
}
