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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// Name used in the `Authorization` header: `OSS {access_key_id}:{signature}`.
pub const PROVIDER: &str = "OSS";

/// Prefix of the provider defined headers that are folded into the signature.
pub const PROVIDER_HEADER_PREFIX: &str = "x-oss-";

// Headers used in oss services.
pub const CONTENT_MD5: &str = "content-md5";
pub const X_OSS_SECURITY_TOKEN: &str = "x-oss-security-token";
pub const X_OSS_ACL: &str = "x-oss-acl";
pub const X_OSS_OBJECT_ACL: &str = "x-oss-object-acl";
pub const X_OSS_COPY_SOURCE: &str = "x-oss-copy-source";
pub const X_OSS_COPY_SOURCE_RANGE: &str = "x-oss-copy-source-range";

// Query parameters used by presigned urls.
pub const OSS_ACCESS_KEY_ID: &str = "OSSAccessKeyId";
pub const EXPIRES: &str = "Expires";
pub const SIGNATURE: &str = "Signature";
pub const SECURITY_TOKEN: &str = "security-token";

// Env values used in oss services.
pub const ALIBABA_CLOUD_ACCESS_KEY_ID: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
pub const ALIBABA_CLOUD_ACCESS_KEY_SECRET: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";
pub const ALIBABA_CLOUD_SECURITY_TOKEN: &str = "ALIBABA_CLOUD_SECURITY_TOKEN";
pub const OSS_ENDPOINT: &str = "OSS_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "oss.aliyuncs.com";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_RETRY_TIMES: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Domains that accept virtual-host-style bucket addressing.
pub const KNOWN_STORAGE_DOMAINS: &[&str] = &[
    "aliyun-inc.com",
    "aliyuncs.com",
    "alibaba.net",
    "s3.amazonaws.com",
];

/// Query parameters that take part in the canonicalized resource.
///
/// Must stay sorted: the canonical query is emitted in this order.
pub const SIGNED_SUB_RESOURCES: &[&str] = &[
    "acl",
    "append",
    "cors",
    "delete",
    "group",
    "lifecycle",
    "link",
    "location",
    "logging",
    "objectInfo",
    "partNumber",
    "position",
    "qos",
    "referer",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
    "restore",
    "security-token",
    "uploadId",
    "uploads",
    "website",
];

/// Service error codes worth another attempt.
pub const RETRYABLE_ERROR_CODES: &[&str] = &[
    "InternalError",
    "RequestTimeTooSkewed",
    "RequestTimeout",
    "ServiceUnavailable",
    "SlowDown",
];

/// Smallest part `upload_large_file` accepts.
pub const MIN_PART_SIZE: u64 = 100 * 1024;

/// AsciiSet for object keys in the url path.
///
/// - Encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', '~'.
/// - '/' is kept so nested keys stay readable.
pub static OSS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as [`OSS_URI_ENCODE_SET`] but also encodes '/'.
///
/// Used for the object part of `x-oss-copy-source`.
pub static OSS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
