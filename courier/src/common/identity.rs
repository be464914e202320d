/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt::Debug;

use mti::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::CourierConfig;
use crate::message::Recipient;

/// Supplies the identity of the local application instance.
///
/// Transports use it to name the per-application and per-instance channels they
/// listen on.
pub trait AppIdentityProvider: Send + Sync + Debug {
    /// The current identity.
    fn identity(&self) -> AppIdentity;
}

/// Application id plus application-instance id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppIdentity {
    app_id: String,
    instance_id: String,
}

impl AppIdentity {
    /// Creates an identity from explicit ids.
    pub fn new(app_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            instance_id: instance_id.into(),
        }
    }

    /// Identity from configuration, generating an instance id (`instance_<uuid v7>`)
    /// when none is configured.
    #[must_use]
    pub fn from_config(config: &CourierConfig) -> Self {
        let instance_id = config
            .identity
            .instance_id
            .clone()
            .unwrap_or_else(|| "instance".create_type_id::<V7>().to_string());
        Self::new(config.identity.app_id.clone(), instance_id)
    }

    /// The application id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The application-instance id.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// This instance as a message endpoint.
    #[must_use]
    pub fn as_recipient(&self) -> Recipient {
        Recipient::instance(self.app_id.clone(), self.instance_id.clone())
    }
}

impl AppIdentityProvider for AppIdentity {
    fn identity(&self) -> AppIdentity {
        self.clone()
    }
}
