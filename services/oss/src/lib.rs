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

//! Client for Aliyun OSS and other S3 style object storage services.
//!
//! ## Overview
//!
//! Every request is described by a [`RequestDescription`], signed with the
//! `OSS {access_key_id}:{signature}` HMAC-SHA1 scheme and sent through the
//! [`HttpSend`](ossclient_core::HttpSend) of the [`Context`](ossclient_core::Context).
//! Transient failures are retried. Non-2xx responses surface as errors of kind
//! [`ErrorKind::Service`](ossclient_core::ErrorKind::Service) carrying a
//! [`ServiceError`].
//!
//! ## Example
//!
//! ```no_run
//! use ossclient::{Acl, ClientBuilder, Config};
//! use ossclient_core::{Context, OsEnv, Result};
//! use ossclient_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::default()
//!         .with_endpoint("oss-cn-hangzhou.aliyuncs.com")
//!         .with_access_key("your-access-key-id", "your-access-key-secret");
//!     let client = ClientBuilder::new(config).context(ctx).build().await?;
//!
//!     client.put_bucket("bucket", Some(Acl::Private), None, Default::default()).await?;
//!     client.put_object("bucket", "hello.txt", "Hello, OSS!", Default::default()).await?;
//!
//!     let url = client.sign_url("bucket", "hello.txt", &Default::default())?;
//!     println!("{url}");
//!     Ok(())
//! }
//! ```
//!
//! ## Credential Sources
//!
//! Without an explicit provider, credentials come from [`Config`] and then from
//! the environment:
//!
//! ```bash
//! export ALIBABA_CLOUD_ACCESS_KEY_ID=your-access-key-id
//! export ALIBABA_CLOUD_ACCESS_KEY_SECRET=your-access-key-secret
//! export ALIBABA_CLOUD_SECURITY_TOKEN=your-sts-token  # Optional, for STS
//! ```
//!
//! ## Addressing
//!
//! Hosts under a known storage domain use virtual-host style
//! (`bucket.host/object`), everything else, IP endpoints included, uses path
//! style (`host/bucket/object`).

pub mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

pub mod canonical;
pub use canonical::CanonicalForm;

mod sign_request;
pub use sign_request::RequestSigner;

pub mod endpoint;

mod body;
pub use body::{md5_of_seekable, Body, SeekableRead};

mod request;
pub use request::{append_param, RequestDescription};

mod service_error;
pub use service_error::ServiceError;

pub mod model;
pub use model::{
    AccessControlPolicy, Acl, CompleteMultipartUploadResult, CopyObjectResult, CorsConfiguration,
    CorsRule, DeleteResult, LifecycleConfiguration, LifecycleRule, ListAllMyBucketsResult,
    ListBucketResult, ListPartsResult, Part, RefererConfiguration,
};

mod client;
pub use client::{Client, ClientBuilder};

mod presign;
pub use presign::SignUrlOptions;

mod bucket;
pub use bucket::{ListBucketsOptions, ListObjectsOptions};

mod object;

mod multipart;
pub use multipart::{ListMultipartUploadsOptions, MultipartUpload};
