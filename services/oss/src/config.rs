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
use ossclient_core::utils::Redact;
use ossclient_core::Context;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Config carries all the configuration for the storage client.
#[derive(Clone)]
pub struct Config {
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's not the default
    /// - env value: [`OSS_ENDPOINT`]
    ///
    /// Accepts `host`, `host:port` or a comma separated list of candidates.
    pub endpoint: String,
    /// Port used when `endpoint` doesn't carry one, default to `80`.
    pub port: u16,
    /// Use https for every request. Port `443` turns this on as well.
    pub is_security: bool,
    /// Force (or forbid) virtual-host-style addressing.
    ///
    /// `None` means detect it from the endpoint domain.
    pub is_storage_host: Option<bool>,
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `access_key_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_SECRET`]
    pub access_key_secret: Option<String>,
    /// `security_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_SECURITY_TOKEN`]
    pub security_token: Option<String>,
    /// Attempts per request, default to `5`.
    pub retry_times: usize,
    /// Timeout of a single attempt, default to 60s.
    pub timeout: Duration,
    /// Log canonical strings and signatures at debug level.
    pub debug: bool,
    /// Rewrite the endpoint when the service points at another one.
    pub follow_endpoint_redirect: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            port: DEFAULT_PORT,
            is_security: false,
            is_storage_host: None,
            access_key_id: None,
            access_key_secret: None,
            security_token: None,
            retry_times: DEFAULT_RETRY_TIMES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
            follow_endpoint_redirect: false,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("is_security", &self.is_security)
            .field("is_storage_host", &self.is_storage_host)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("access_key_secret", &Redact::from(&self.access_key_secret))
            .field("security_token", &Redact::from(&self.security_token))
            .field("retry_times", &self.retry_times)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .field("follow_endpoint_redirect", &self.follow_endpoint_redirect)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on the config win over the environment.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(OSS_ENDPOINT) {
            if self.endpoint == DEFAULT_ENDPOINT {
                self.endpoint = v;
            }
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_ACCESS_KEY_ID) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_ACCESS_KEY_SECRET) {
            self.access_key_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_SECURITY_TOKEN) {
            self.security_token.get_or_insert(v);
        }

        self
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the access key pair.
    pub fn with_access_key(
        mut self,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.access_key_secret = Some(access_key_secret.into());
        self
    }

    /// Set the security token for temporary credentials.
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossclient_core::StaticEnv;
    use std::collections::HashMap;

    #[test]
    fn test_config_from_env() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (OSS_ENDPOINT.to_string(), "oss-cn-beijing.aliyuncs.com".to_string()),
                (ALIBABA_CLOUD_ACCESS_KEY_ID.to_string(), "env_ak".to_string()),
                (ALIBABA_CLOUD_ACCESS_KEY_SECRET.to_string(), "env_sk".to_string()),
            ]),
        });

        let config = Config::default().from_env(&ctx);
        assert_eq!(config.endpoint, "oss-cn-beijing.aliyuncs.com");
        assert_eq!(config.access_key_id.as_deref(), Some("env_ak"));
        assert_eq!(config.access_key_secret.as_deref(), Some("env_sk"));
        assert_eq!(config.security_token, None);

        // Explicit values are kept.
        let config = Config::default()
            .with_endpoint("127.0.0.1:9000")
            .with_access_key("ak", "sk")
            .from_env(&ctx);
        assert_eq!(config.endpoint, "127.0.0.1:9000");
        assert_eq!(config.access_key_id.as_deref(), Some("ak"));
        assert_eq!(config.access_key_secret.as_deref(), Some("sk"));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = Config::default().with_access_key("ak", "a-very-long-secret-key");
        let s = format!("{config:?}");
        assert!(!s.contains("a-very-long-secret-key"));
        assert!(s.contains("a-v***key"));
    }
}
