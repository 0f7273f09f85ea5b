//! Gateway results annotated with where their content came from.

/// Where a gateway reply's content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOrigin {
    /// Produced by the remote model.
    Model,
    /// No API key is configured; fixed placeholder content.
    Unconfigured,
    /// The model call failed; local substitute content.
    Fallback { reason: String },
}

/// A value returned by the AI gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply<T> {
    pub value: T,
    pub origin: ReplyOrigin,
}

impl<T> GatewayReply<T> {
    pub fn model(value: T) -> Self {
        Self {
            value,
            origin: ReplyOrigin::Model,
        }
    }

    pub fn unconfigured(value: T) -> Self {
        Self {
            value,
            origin: ReplyOrigin::Unconfigured,
        }
    }

    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            origin: ReplyOrigin::Fallback {
                reason: reason.into(),
            },
        }
    }

    /// True unless the model produced the content.
    pub fn is_degraded(&self) -> bool {
        self.origin != ReplyOrigin::Model
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
