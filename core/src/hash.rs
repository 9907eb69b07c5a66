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

//! Hash related utils.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use md5::Digest;
use md5::Md5;
use sha1::Sha1;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 encoded MD5 digest, the format of the `Content-MD5` header.
pub fn base64_md5(content: &[u8]) -> String {
    base64_encode(Md5::digest(content).as_slice())
}

/// Incremental MD5 for bodies that are hashed chunk by chunk.
///
/// The final value equals [`base64_md5`] over the concatenation of every
/// chunk passed to [`ContentMd5::update`].
#[derive(Default, Clone)]
pub struct ContentMd5(Md5);

impl ContentMd5 {
    /// Create a new empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes.
    pub fn update(&mut self, content: &[u8]) {
        self.0.update(content);
    }

    /// Consume the hasher and return the base64 encoded digest.
    pub fn finish(self) -> String {
        base64_encode(self.0.finalize().as_slice())
    }
}

/// Base64 encoded HMAC with SHA1 hash.
pub fn base64_hmac_sha1(key: &[u8], content: &[u8]) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha1>::new_from_slice(key).unwrap();
    h.update(content);

    base64_encode(&h.finalize().into_bytes())
}
