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

use crate::constants::RETRYABLE_ERROR_CODES;
use bytes::{Buf, Bytes};
use http::StatusCode;
use ossclient_core::Error;
use serde::Deserialize;
use std::fmt::{Display, Formatter};

/// ServiceError is the error body returned with a non-2xx response.
///
/// It's attached as the source of an [`ErrorKind::Service`](ossclient_core::ErrorKind::Service)
/// error, use [`ServiceError::from_error`] to get it back.
#[derive(Debug, Clone, Default)]
pub struct ServiceError {
    /// Server defined error code such as `NoSuchBucket`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Request id, useful when reporting problems to the service.
    pub request_id: String,
    /// Cluster that served the request.
    pub host_id: String,
    /// Endpoint the bucket should be accessed through, if the service says so.
    pub endpoint: String,
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Raw response body.
    pub raw: Bytes,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorBody {
    code: String,
    message: String,
    request_id: String,
    host_id: String,
    endpoint: String,
}

impl ServiceError {
    /// Parse an error body.
    ///
    /// Parsing is best effort: a body that is not valid XML still yields an error
    /// carrying the raw bytes.
    pub fn parse(status: StatusCode, raw: Bytes) -> Self {
        let body = raw.trim_ascii_start();
        let parsed: ErrorBody = if body.is_empty() {
            ErrorBody::default()
        } else {
            quick_xml::de::from_reader(body.reader()).unwrap_or_else(|err| {
                log::debug!("failed to parse service error body: {err}");
                ErrorBody::default()
            })
        };

        Self {
            code: parsed.code.trim().to_string(),
            message: parsed.message.trim().to_string(),
            request_id: parsed.request_id.trim().to_string(),
            host_id: parsed.host_id.trim().to_string(),
            endpoint: parsed.endpoint.trim().to_string(),
            status,
            raw,
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        self.status.is_server_error() || RETRYABLE_ERROR_CODES.contains(&self.code.as_str())
    }

    /// Get the service error carried by an [`Error`], if any.
    pub fn from_error(err: &Error) -> Option<&ServiceError> {
        err.downcast_source::<ServiceError>()
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "service responded with status {}", self.status)
        } else {
            write!(
                f,
                "{} ({}): {}, request id: {}",
                self.code, self.status, self.message, self.request_id
            )
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        let message = if err.code.is_empty() {
            format!("service responded with status {}", err.status)
        } else {
            format!("service responded with {}: {}", err.code, err.message)
        };
        Error::service(message).with_source(err)
    }
}
