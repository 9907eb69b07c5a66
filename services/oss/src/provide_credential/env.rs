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
use crate::Credential;
use async_trait::async_trait;
use ossclient_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads credentials from environment variables.
///
/// - `ALIBABA_CLOUD_ACCESS_KEY_ID`
/// - `ALIBABA_CLOUD_ACCESS_KEY_SECRET`
/// - `ALIBABA_CLOUD_SECURITY_TOKEN` (optional)
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let access_key_id = envs.get(ALIBABA_CLOUD_ACCESS_KEY_ID);
        let access_key_secret = envs.get(ALIBABA_CLOUD_ACCESS_KEY_SECRET);

        match (access_key_id, access_key_secret) {
            (Some(ak), Some(sk)) => Ok(Some(Credential {
                access_key_id: ak.clone(),
                access_key_secret: sk.clone(),
                security_token: envs.get(ALIBABA_CLOUD_SECURITY_TOKEN).cloned(),
            })),
            _ => Ok(None),
        }
    }
}
