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

use super::{EnvCredentialProvider, ProvideCredentialChain, StaticCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use ossclient_core::{Context, ProvideCredential, Result};

/// DefaultCredentialProvider tries the keys set on [`Config`] first, then the environment.
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a provider that only reads the environment.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new().push(EnvCredentialProvider::new());

        Self { chain }
    }

    /// Create a provider that prefers the key pair carried by `config`.
    pub fn with_config(config: &Config) -> Self {
        let mut provider = Self::new();

        if let (Some(ak), Some(sk)) = (&config.access_key_id, &config.access_key_secret) {
            let mut p = StaticCredentialProvider::new(ak, sk);
            if let Some(token) = &config.security_token {
                p = p.with_security_token(token);
            }
            provider.chain = provider.chain.push_front(p);
        }

        provider
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use ossclient_core::StaticEnv;
    use std::collections::HashMap;

    fn env_ctx() -> Context {
        Context::new().with_env(StaticEnv {
            envs: HashMap::from_iter([
                (
                    ALIBABA_CLOUD_ACCESS_KEY_ID.to_string(),
                    "access_key_id".to_string(),
                ),
                (
                    ALIBABA_CLOUD_ACCESS_KEY_SECRET.to_string(),
                    "secret_access_key".to_string(),
                ),
            ]),
        })
    }

    #[tokio::test]
    async fn test_default_loader_without_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::new(),
        });

        let loader = DefaultCredentialProvider::new();
        let credential = loader.provide_credential(&ctx).await.unwrap();

        assert!(credential.is_none());
    }

    #[tokio::test]
    async fn test_default_loader_with_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        let loader = DefaultCredentialProvider::new();
        let credential = loader
            .provide_credential(&env_ctx())
            .await
            .unwrap()
            .unwrap();

        assert_eq!("access_key_id", credential.access_key_id);
        assert_eq!("secret_access_key", credential.access_key_secret);
    }

    #[tokio::test]
    async fn test_default_loader_prefers_config() {
        let config = Config::default()
            .with_access_key("config_ak", "config_sk")
            .with_security_token("config_token");

        let loader = DefaultCredentialProvider::with_config(&config);
        let credential = loader
            .provide_credential(&env_ctx())
            .await
            .unwrap()
            .unwrap();

        assert_eq!("config_ak", credential.access_key_id);
        assert_eq!("config_sk", credential.access_key_secret);
        assert_eq!(Some("config_token"), credential.security_token.as_deref());
    }
}
