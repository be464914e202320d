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

use crate::message::RoutingError;

/// Where a captured failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Local message processing failed.
    Handler,
    /// The transport-specific output routing failed.
    Transport,
    /// A message reached a routing step that cannot handle it.
    Protocol,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler => f.write_str("handler"),
            Self::Transport => f.write_str("transport"),
            Self::Protocol => f.write_str("protocol"),
        }
    }
}

/// Structured description of a failure, safe to carry as reply content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionData {
    /// Origin of the failure.
    pub kind: FailureKind,
    /// The top-level error message.
    pub message: String,
    /// Messages of the underlying causes, outermost first.
    pub causes: Vec<String>,
}

impl ExceptionData {
    /// Captures `error` and its cause chain.
    ///
    /// A [`RoutingError::UnexpectedMessage`] anywhere in the chain is reported as a
    /// protocol failure whatever `kind` the caller assumed.
    #[must_use]
    pub fn capture(kind: FailureKind, error: &anyhow::Error) -> Self {
        let is_protocol_violation = error.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<RoutingError>(),
                Some(RoutingError::UnexpectedMessage { .. })
            )
        });
        Self {
            kind: if is_protocol_violation {
                FailureKind::Protocol
            } else {
                kind
            },
            message: error.to_string(),
            causes: error.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}

impl Display for ExceptionData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}

/// Reply content produced in place of a real result when routing or processing failed.
///
/// Two-way callers always receive a reply; when this type is the reply content, the
/// request failed and [`exception`](Self::exception) says why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionResponseMessage {
    /// The captured failure.
    pub exception: ExceptionData,
}

impl ExceptionResponseMessage {
    /// Captures `error` as reply content.
    #[must_use]
    pub fn capture(kind: FailureKind, error: &anyhow::Error) -> Self {
        Self {
            exception: ExceptionData::capture(kind, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;
    use crate::message::MessageId;

    #[test]
    fn capture_keeps_message_and_causes() {
        let error = Err::<(), _>(anyhow!("disk full"))
            .context("boom")
            .unwrap_err();
        let data = ExceptionData::capture(FailureKind::Handler, &error);
        assert_eq!(data.kind, FailureKind::Handler);
        assert_eq!(data.message, "boom");
        assert_eq!(data.causes, vec!["disk full".to_string()]);
    }

    #[test]
    fn unexpected_message_is_classified_as_protocol() {
        let error = anyhow::Error::new(RoutingError::UnexpectedMessage {
            message_id: MessageId::from("msg_1"),
            router: "in_process".to_string(),
        });
        let data = ExceptionData::capture(FailureKind::Transport, &error);
        assert_eq!(data.kind, FailureKind::Protocol);
    }
}
