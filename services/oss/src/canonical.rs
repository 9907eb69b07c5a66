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

//! Canonical form of a request: the exact bytes covered by the signature.

use crate::constants::*;
use http::header::{CONTENT_TYPE, DATE};
use http::{HeaderMap, Method};
use std::collections::BTreeMap;
use std::fmt::Write;

/// CanonicalForm is derived from a request for a single attempt.
///
/// The `Date` header changes on every attempt, so a new form is built each time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalForm {
    /// Value of `Content-MD5`, empty if missing.
    pub content_md5: String,
    /// Value of `Content-Type`, empty if missing.
    pub content_type: String,
    /// Value of `Date`, empty if missing.
    pub date: String,
    /// Sorted `x-oss-*` headers, one `key:value\n` line each.
    pub canonicalized_headers: String,
    /// Bucket, object and signed sub-resources.
    pub canonicalized_resource: String,
    /// The string fed into HMAC-SHA1.
    pub string_to_sign: String,
}

impl CanonicalForm {
    /// Build the canonical form from method, headers and a canonicalized resource.
    pub fn build(method: &Method, headers: &HeaderMap, resource: &str) -> Self {
        let content_md5 = header_value(headers, CONTENT_MD5);
        let content_type = header_value(headers, CONTENT_TYPE.as_str());
        let date = header_value(headers, DATE.as_str());
        let canonicalized_headers = canonicalize_headers(headers);

        let string_to_sign = format!(
            "{}\n{}\n{}\n{}\n{}{}",
            method.as_str(),
            content_md5,
            content_type,
            date,
            canonicalized_headers,
            resource
        );

        Self {
            content_md5,
            content_type,
            date,
            canonicalized_headers,
            canonicalized_resource: resource.to_string(),
            string_to_sign,
        }
    }
}

/// HeaderMap lookups are already case-insensitive.
fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .unwrap_or_default()
}

/// Fold all `x-oss-*` headers into sorted `key:value\n` lines.
///
/// Returns an empty string if there is no such header.
pub fn canonicalize_headers(headers: &HeaderMap) -> String {
    let oss_headers: BTreeMap<&str, String> = headers
        .keys()
        .filter(|k| k.as_str().starts_with(PROVIDER_HEADER_PREFIX))
        .map(|k| {
            let value = headers
                .get_all(k)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
                .collect::<Vec<_>>()
                .join(",");
            (k.as_str(), value)
        })
        .collect();

    let mut s = String::new();
    for (k, v) in oss_headers {
        // Writing into a String never fails.
        let _ = writeln!(s, "{k}:{v}");
    }
    s
}

/// Build the signed query part of the resource.
///
/// Only names on [`SIGNED_SUB_RESOURCES`] take part, matched case-insensitively and
/// emitted in allow-list order: `?first[=v]&second[=v]`. Values are not escaped.
pub fn canonicalize_sub_resources<K, V>(params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params: BTreeMap<String, V> = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v))
        .collect();
    if params.is_empty() {
        return String::new();
    }

    let mut s = String::new();
    for name in SIGNED_SUB_RESOURCES {
        let Some(value) = params.get(&name.to_lowercase()) else {
            continue;
        };
        s.push(if s.is_empty() { '?' } else { '&' });
        s.push_str(name);
        if !value.as_ref().is_empty() {
            s.push('=');
            s.push_str(value.as_ref());
        }
    }
    s
}

/// Build the canonicalized resource for a request.
///
/// `object` is the unescaped key. Without a bucket the resource is `/`.
pub fn canonicalize_resource<K, V>(
    bucket: Option<&str>,
    object: Option<&str>,
    params: impl IntoIterator<Item = (K, V)>,
) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut s = match bucket.filter(|b| !b.is_empty()) {
        None => "/".to_string(),
        Some(bucket) => format!("/{bucket}/"),
    };
    s.push_str(object.unwrap_or_default());
    s.push_str(&canonicalize_sub_resources(params));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn fixture_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_MD5,
            HeaderValue::from_static("81f770d0950fe6a2c158fc7ee9cfb6d8"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        headers.insert(DATE, HeaderValue::from_static("Wed, 21 Oct 2015 07:17:58 GMT"));
        headers
    }

    #[test]
    fn test_canonical_form() {
        let mut headers = fixture_headers();
        headers.insert(
            HeaderName::from_bytes(b"X-OSS-Meta-B").unwrap(),
            HeaderValue::from_static("2"),
        );
        headers.insert("x-oss-meta-a", HeaderValue::from_static("1"));
        headers.insert("x-other", HeaderValue::from_static("ignored"));

        let form = CanonicalForm::build(&Method::PUT, &headers, "/bucket/key");
        assert_eq!(form.content_md5, "81f770d0950fe6a2c158fc7ee9cfb6d8");
        assert_eq!(form.canonicalized_headers, "x-oss-meta-a:1\nx-oss-meta-b:2\n");
        assert_eq!(
            form.string_to_sign,
            "PUT\n81f770d0950fe6a2c158fc7ee9cfb6d8\nimage/jpeg\nWed, 21 Oct 2015 07:17:58 GMT\nx-oss-meta-a:1\nx-oss-meta-b:2\n/bucket/key"
        );
    }

    #[test]
    fn test_canonical_form_empty_headers() {
        let form = CanonicalForm::build(&Method::GET, &HeaderMap::new(), "/");
        assert_eq!(form.canonicalized_headers, "");
        assert_eq!(form.string_to_sign, "GET\n\n\n\n/");
    }

    #[test]
    fn test_canonical_form_is_deterministic() {
        let headers = fixture_headers();
        let a = CanonicalForm::build(&Method::GET, &headers, "/");
        let b = CanonicalForm::build(&Method::GET, &headers.clone(), "/");
        assert_eq!(a, b);
    }

    #[test]
    fn test_sub_resources_filter() {
        let params = [
            ("referer", "http://example.com/test"),
            ("qos", "100"),
            ("other", "other"),
            ("other1", "other1"),
        ];
        assert_eq!(
            canonicalize_sub_resources(params),
            "?qos=100&referer=http://example.com/test"
        );
        assert_eq!(canonicalize_sub_resources(Vec::<(&str, &str)>::new()), "");
    }

    #[test_case(&[("uploads", "")], "?uploads"; "flag without value")]
    #[test_case(&[("partNumber", "1"), ("uploadId", "abc")], "?partNumber=1&uploadId=abc"; "multipart part")]
    #[test_case(&[("UPLOADID", "abc")], "?uploadId=abc"; "case insensitive name")]
    #[test_case(&[("prefix", "a"), ("max-keys", "10")], ""; "unsigned only")]
    fn test_sub_resources(params: &[(&str, &str)], expected: &str) {
        assert_eq!(canonicalize_sub_resources(params.iter().copied()), expected);
    }

    #[test_case(None, None, "/"; "service")]
    #[test_case(Some("bucket"), None, "/bucket/"; "bucket")]
    #[test_case(Some("bucket"), Some("dir/a b.txt"), "/bucket/dir/a b.txt"; "object is not escaped")]
    fn test_canonicalize_resource(bucket: Option<&str>, object: Option<&str>, expected: &str) {
        assert_eq!(
            canonicalize_resource(bucket, object, Vec::<(&str, &str)>::new()),
            expected
        );
    }

    #[test]
    fn test_canonicalize_resource_with_acl() {
        assert_eq!(
            canonicalize_resource(Some("bucket"), Some("key"), [("acl", "")]),
            "/bucket/key?acl"
        );
    }
}
