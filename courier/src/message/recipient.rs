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

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// An endpoint a brokered message is addressed to.
///
/// A recipient names an application, an application instance, or both. The most
/// specific id decides which channel a transport delivers to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    app_id: Option<String>,
    instance_id: Option<String>,
}

impl Recipient {
    /// Creates a recipient from optional ids.
    #[must_use]
    pub const fn new(app_id: Option<String>, instance_id: Option<String>) -> Self {
        Self {
            app_id,
            instance_id,
        }
    }

    /// Every instance of `app_id`.
    pub fn app(app_id: impl Into<String>) -> Self {
        Self::new(Some(app_id.into()), None)
    }

    /// One specific instance of `app_id`.
    pub fn instance(app_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self::new(Some(app_id.into()), Some(instance_id.into()))
    }

    /// The application id, if any.
    #[must_use]
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// The application-instance id, if any.
    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}

impl Display for Recipient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.app_id, &self.instance_id) {
            (Some(app), Some(instance)) => write!(f, "{app}/{instance}"),
            (Some(app), None) => write!(f, "{app}"),
            (None, Some(instance)) => write!(f, "*/{instance}"),
            (None, None) => write!(f, "*"),
        }
    }
}
