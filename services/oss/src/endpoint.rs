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

//! Host and addressing resolution.

use crate::constants::*;
use ossclient_core::{Error, Result};
use percent_encoding::utf8_percent_encode;
use std::time::Duration;
use tokio::net::TcpStream;

/// Where a request goes: the url authority (also sent as `Host`) and the url path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    /// `host[:port]`, prefixed with `{bucket}.` for virtual-host style.
    pub authority: String,
    /// Percent-encoded path, starting with `/`.
    pub path: String,
}

/// Resolve the addressing of a request.
///
/// - ip or `localhost`: path style, bare host.
/// - no bucket: `/` on the bare host.
/// - storage host with a valid bucket: `{bucket}.{host}` with `/{object}`.
/// - everything else: path style, `/{bucket}/{object}`.
///
/// Ports other than 80 and 443 are kept in the authority.
pub fn resolve(
    host: &str,
    port: u16,
    is_storage_host: bool,
    bucket: Option<&str>,
    object: Option<&str>,
) -> Addressing {
    let host_port = if port != 80 && port != 443 {
        format!("{host}:{port}")
    } else {
        host.to_string()
    };
    let object = quote(object.unwrap_or_default());

    let Some(bucket) = bucket.filter(|b| !b.is_empty()) else {
        return Addressing {
            authority: host_port,
            path: format!("/{object}"),
        };
    };

    if !is_ip(host) && is_storage_host && check_bucket_valid(bucket) {
        Addressing {
            authority: format!("{bucket}.{host_port}"),
            path: format!("/{object}"),
        }
    } else {
        Addressing {
            authority: host_port,
            path: format!("/{bucket}/{object}"),
        }
    }
}

/// Percent-encode an object key for the url path, keeping `/`.
pub fn quote(object: &str) -> String {
    utf8_percent_encode(object, &OSS_URI_ENCODE_SET).to_string()
}

/// Check whether host is an ipv4 literal or `localhost`. A port is ignored.
pub fn is_ip(host: &str) -> bool {
    let host = host.split_once(':').map_or(host, |(h, _)| h).trim();
    if host == "localhost" {
        return true;
    }

    let parts: Vec<&str> = host.split('.').collect();
    parts.len() == 4 && parts.iter().all(|p| p.parse::<u8>().is_ok())
}

/// Check whether a bucket name can be used as a subdomain.
///
/// This only picks the addressing style and never rejects a request.
pub fn check_bucket_valid(bucket: &str) -> bool {
    if !(3..=63).contains(&bucket.len()) {
        return false;
    }
    let bytes = bucket.as_bytes();
    let first = bytes[0];
    let last = bytes[bytes.len() - 1];

    (first.is_ascii_lowercase() || first.is_ascii_digit())
        && last != b'-'
        && last != b'_'
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// Check whether host accepts virtual-host style addressing.
///
/// `force` overrides the detection from [`KNOWN_STORAGE_DOMAINS`].
pub fn is_storage_host(host: &str, force: Option<bool>) -> bool {
    if let Some(v) = force {
        return v;
    }

    KNOWN_STORAGE_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Split `host[:port]`, falling back to `default_port`.
pub fn parse_host_port(endpoint: &str, default_port: u16) -> Result<(String, u16)> {
    let endpoint = endpoint.trim();
    let (host, port) = match endpoint.split_once(':') {
        None => (endpoint, default_port),
        Some((host, port)) => {
            let port = port.trim().parse::<u16>().map_err(|e| {
                Error::config_invalid(format!("invalid port in endpoint {endpoint:?}"))
                    .with_source(e)
            })?;
            (host.trim(), port)
        }
    };

    if host.is_empty() {
        return Err(Error::config_invalid(format!(
            "endpoint {endpoint:?} has no host"
        )));
    }

    Ok((host.to_string(), port))
}

/// Pick the host to talk to from a comma separated candidate list.
///
/// A single candidate is used as is. Otherwise every candidate is probed with a
/// tcp connect and the first reachable one wins, falling back to the first.
pub async fn select_host(
    endpoint: &str,
    default_port: u16,
    timeout: Duration,
) -> Result<(String, u16)> {
    let candidates = endpoint
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_host_port(s, default_port))
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = candidates.first().cloned() else {
        return Err(Error::config_invalid("endpoint is empty"));
    };
    if candidates.len() == 1 {
        return Ok(first);
    }

    for (host, port) in candidates {
        match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
            Ok(Ok(_)) => return Ok((host, port)),
            Ok(Err(err)) => log::debug!("endpoint candidate {host}:{port} unreachable: {err}"),
            Err(_) => log::debug!("endpoint candidate {host}:{port} timed out"),
        }
    }

    log::warn!("no endpoint candidate is reachable, use {}:{}", first.0, first.1);
    Ok(first)
}
