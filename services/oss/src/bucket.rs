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

use crate::constants::*;
use crate::model::*;
use crate::request::RequestDescription;
use crate::Client;
use http::{HeaderMap, Method};
use ossclient_core::Result;

/// Options of [`Client::list_buckets`].
#[derive(Debug, Clone, Default)]
pub struct ListBucketsOptions {
    /// Only buckets whose name starts with it.
    pub prefix: String,
    /// List buckets after this name.
    pub marker: String,
    /// At most this many buckets.
    pub max_keys: Option<usize>,
}

/// Options of [`Client::list_objects`].
#[derive(Debug, Clone, Default)]
pub struct ListObjectsOptions {
    /// Only keys that start with it.
    pub prefix: String,
    /// List keys after this one.
    pub marker: String,
    /// Group keys sharing a prefix up to the delimiter into common prefixes.
    pub delimiter: String,
    /// At most this many keys.
    pub max_keys: Option<usize>,
    /// `url` to have keys encoded in the response.
    pub encoding_type: String,
}

impl Client {
    /// List all buckets of the account.
    pub async fn list_buckets(&self, opts: &ListBucketsOptions) -> Result<ListAllMyBucketsResult> {
        let mut req = RequestDescription::new(Method::GET)
            .with_param_non_empty("prefix", &opts.prefix)
            .with_param_non_empty("marker", &opts.marker);
        if let Some(max_keys) = opts.max_keys {
            req = req.with_param("max-keys", max_keys.to_string());
        }

        self.send_xml(req).await
    }

    /// Create a bucket, or update the acl of an existing one.
    ///
    /// `location` is the region such as `oss-cn-hangzhou`.
    pub async fn put_bucket(
        &self,
        bucket: &str,
        acl: Option<Acl>,
        location: Option<&str>,
        headers: HeaderMap,
    ) -> Result<()> {
        let mut req = RequestDescription::new(Method::PUT)
            .with_bucket(bucket)
            .with_headers(headers);
        if let Some(acl) = acl {
            req = req.with_header(X_OSS_ACL, acl.as_str())?;
        }
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            req = req.with_body(to_xml(&CreateBucketConfiguration {
                location_constraint: location.to_string(),
            })?);
        }

        self.send_discard(req).await?;
        Ok(())
    }

    /// Set the acl of a bucket.
    pub async fn put_bucket_acl(&self, bucket: &str, acl: Acl) -> Result<()> {
        let req = RequestDescription::new(Method::PUT)
            .with_bucket(bucket)
            .with_param("acl", "")
            .with_header(X_OSS_ACL, acl.as_str())?;

        self.send_discard(req).await?;
        Ok(())
    }

    /// Get the acl of a bucket.
    pub async fn get_bucket_acl(&self, bucket: &str) -> Result<AccessControlPolicy> {
        let req = RequestDescription::new(Method::GET)
            .with_bucket(bucket)
            .with_param("acl", "");
        self.send_xml(req).await
    }

    /// Get the region of a bucket.
    pub async fn get_bucket_location(&self, bucket: &str) -> Result<String> {
        let req = RequestDescription::new(Method::GET)
            .with_bucket(bucket)
            .with_param("location", "");
        let location: LocationConstraint = self.send_xml(req).await?;
        Ok(location.location)
    }

    /// List objects in a bucket.
    pub async fn list_objects(
        &self,
        bucket: &str,
        opts: &ListObjectsOptions,
    ) -> Result<ListBucketResult> {
        let mut req = RequestDescription::new(Method::GET)
            .with_bucket(bucket)
            .with_param_non_empty("prefix", &opts.prefix)
            .with_param_non_empty("marker", &opts.marker)
            .with_param_non_empty("delimiter", &opts.delimiter)
            .with_param_non_empty("encoding-type", &opts.encoding_type);
        if let Some(max_keys) = opts.max_keys {
            req = req.with_param("max-keys", max_keys.to_string());
        }

        self.send_xml(req).await
    }

    /// Delete an empty bucket.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let req = RequestDescription::new(Method::DELETE).with_bucket(bucket);
        self.send_discard(req).await?;
        Ok(())
    }

    /// Write access logs of `bucket` into `target_bucket` under `target_prefix`.
    pub async fn put_bucket_logging(
        &self,
        bucket: &str,
        target_bucket: &str,
        target_prefix: &str,
    ) -> Result<()> {
        let status = BucketLoggingStatus {
            logging_enabled: Some(LoggingEnabled {
                target_bucket: target_bucket.to_string(),
                target_prefix: target_prefix.to_string(),
            }),
        };
        self.put_sub_resource(bucket, "logging", to_xml(&status)?)
            .await
    }

    /// Get the logging settings of a bucket.
    pub async fn get_bucket_logging(&self, bucket: &str) -> Result<BucketLoggingStatus> {
        self.get_sub_resource(bucket, "logging").await
    }

    /// Turn off access logging.
    pub async fn delete_bucket_logging(&self, bucket: &str) -> Result<()> {
        self.delete_sub_resource(bucket, "logging").await
    }

    /// Host a static website from the bucket.
    pub async fn put_bucket_website(
        &self,
        bucket: &str,
        index_suffix: &str,
        error_key: Option<&str>,
    ) -> Result<()> {
        let config = WebsiteConfiguration {
            index_document: IndexDocument {
                suffix: index_suffix.to_string(),
            },
            error_document: error_key.map(|key| ErrorDocument {
                key: key.to_string(),
            }),
        };
        self.put_sub_resource(bucket, "website", to_xml(&config)?)
            .await
    }

    /// Get the website settings of a bucket.
    pub async fn get_bucket_website(&self, bucket: &str) -> Result<WebsiteConfiguration> {
        self.get_sub_resource(bucket, "website").await
    }

    /// Stop hosting a static website.
    pub async fn delete_bucket_website(&self, bucket: &str) -> Result<()> {
        self.delete_sub_resource(bucket, "website").await
    }

    /// Replace the lifecycle rules of a bucket.
    pub async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        config: &LifecycleConfiguration,
    ) -> Result<()> {
        self.put_sub_resource(bucket, "lifecycle", to_xml(config)?)
            .await
    }

    /// Get the lifecycle rules of a bucket.
    pub async fn get_bucket_lifecycle(&self, bucket: &str) -> Result<LifecycleConfiguration> {
        self.get_sub_resource(bucket, "lifecycle").await
    }

    /// Remove all lifecycle rules.
    pub async fn delete_bucket_lifecycle(&self, bucket: &str) -> Result<()> {
        self.delete_sub_resource(bucket, "lifecycle").await
    }

    /// Set the referer allow-list of a bucket.
    pub async fn put_bucket_referer(
        &self,
        bucket: &str,
        config: &RefererConfiguration,
    ) -> Result<()> {
        self.put_sub_resource(bucket, "referer", to_xml(config)?)
            .await
    }

    /// Get the referer allow-list of a bucket.
    pub async fn get_bucket_referer(&self, bucket: &str) -> Result<RefererConfiguration> {
        self.get_sub_resource(bucket, "referer").await
    }

    /// Clear the referer allow-list.
    pub async fn delete_bucket_referer(&self, bucket: &str) -> Result<()> {
        self.delete_sub_resource(bucket, "referer").await
    }

    /// Set the cors rules of a bucket.
    pub async fn put_bucket_cors(&self, bucket: &str, config: &CorsConfiguration) -> Result<()> {
        self.put_sub_resource(bucket, "cors", to_xml(config)?).await
    }

    /// Get the cors rules of a bucket.
    pub async fn get_bucket_cors(&self, bucket: &str) -> Result<CorsConfiguration> {
        self.get_sub_resource(bucket, "cors").await
    }

    /// Remove all cors rules.
    pub async fn delete_bucket_cors(&self, bucket: &str) -> Result<()> {
        self.delete_sub_resource(bucket, "cors").await
    }

    async fn put_sub_resource(&self, bucket: &str, sub_resource: &str, body: String) -> Result<()> {
        let req = RequestDescription::new(Method::PUT)
            .with_bucket(bucket)
            .with_param(sub_resource, "")
            .with_body(body);
        self.send_discard(req).await?;
        Ok(())
    }

    async fn get_sub_resource<T: serde::de::DeserializeOwned>(
        &self,
        bucket: &str,
        sub_resource: &str,
    ) -> Result<T> {
        let req = RequestDescription::new(Method::GET)
            .with_bucket(bucket)
            .with_param(sub_resource, "");
        self.send_xml(req).await
    }

    async fn delete_sub_resource(&self, bucket: &str, sub_resource: &str) -> Result<()> {
        let req = RequestDescription::new(Method::DELETE)
            .with_bucket(bucket)
            .with_param(sub_resource, "");
        self.send_discard(req).await?;
        Ok(())
    }
}
