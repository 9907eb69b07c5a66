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

use criterion::{criterion_group, criterion_main, Criterion};
use http::{HeaderMap, Method};
use ossclient::canonical::canonicalize_resource;
use ossclient::{CanonicalForm, Credential, RequestSigner};
use std::collections::BTreeMap;

criterion_group!(benches, bench);
criterion_main!(benches);

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("oss");

    let cred = Credential {
        access_key_id: "access_key_id".to_string(),
        access_key_secret: "access_key_secret".to_string(),
        security_token: None,
    };
    let signer = RequestSigner::new();

    let mut headers = HeaderMap::new();
    headers.insert("content-type", "text/plain".parse().expect("must be valid"));
    headers.insert("x-oss-meta-author", "bench".parse().expect("must be valid"));
    headers.insert("x-oss-object-acl", "private".parse().expect("must be valid"));

    group.bench_function("canonical_form", |b| {
        b.iter(|| {
            let resource = canonicalize_resource(
                Some("bucket"),
                Some("dir/hello.txt"),
                [("acl", ""), ("prefix", "dir/")],
            );
            CanonicalForm::build(&Method::PUT, &headers, &resource)
        })
    });

    group.bench_function("sign_header", |b| {
        b.iter(|| {
            let mut headers = headers.clone();
            signer
                .sign_header(&cred, &Method::PUT, &mut headers, "/bucket/dir/hello.txt")
                .expect("must success");
            headers
        })
    });

    let params = BTreeMap::from([(
        "response-content-type".to_string(),
        "text/plain".to_string(),
    )]);
    group.bench_function("sign_query", |b| {
        b.iter(|| {
            signer
                .sign_query(
                    &cred,
                    &Method::GET,
                    &headers,
                    "/bucket/dir/hello.txt",
                    &params,
                    std::time::Duration::from_secs(3600),
                )
                .expect("must success")
        })
    });

    group.finish();
}
