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

//! Core components shared by the ossclient crates.
//!
//! ## Overview
//!
//! - **Context**: a container that holds the HTTP transport and environment access
//!   used by the storage client. Both are pluggable so tests can swap in fakes.
//! - **Traits**: [`ProvideCredential`] for loading credentials and
//!   [`SigningCredential`] for validating them.
//! - **Error**: a single [`Error`] type with an [`ErrorKind`] that callers branch on.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use ossclient_core::{Context, ProvideCredential, Result, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//!     secret: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty() && !self.secret.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             key: "my-access-key".to_string(),
//!             secret: "my-secret-key".to_string(),
//!         }))
//!     }
//! }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: md5/hmac-sha1/base64 helpers
//! - [`time`]: time helpers, including the HTTP date format
//! - [`utils`]: general utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod api;
pub use api::{ProvideCredential, SigningCredential};
