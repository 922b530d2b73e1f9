//! Access-layer operations over providers and models.
//!
//! Each operation takes the pool and the caller's session. Mutations run
//! [`guard::require_admin`] first. Conflicts come back as
//! [`ActionOutcome::Fail`]; authorization and lookup failures as
//! [`crate::error::AdminError`].

pub mod guard;
pub mod provider_actions;
pub mod model_actions;
pub mod remote_models;
pub mod edit_model_form;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use guard::{Session, require_admin};

/// Soft result of a write that may conflict with existing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ActionOutcome {
    Success,
    Fail { message: String },
}

impl ActionOutcome {
    pub fn fail(message: impl Into<String>) -> Self {
        ActionOutcome::Fail { message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success)
    }
}

/// Wire dialect a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStyle {
    Openai,
    OpenaiResponse,
    Claude,
    Gemini,
}

impl ApiStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStyle::Openai => "openai",
            ApiStyle::OpenaiResponse => "openai_response",
            ApiStyle::Claude => "claude",
            ApiStyle::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ApiStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ApiStyle::Openai),
            "openai_response" => Ok(ApiStyle::OpenaiResponse),
            "claude" => Ok(ApiStyle::Claude),
            "gemini" => Ok(ApiStyle::Gemini),
            other => Err(format!("unknown api style: {}", other)),
        }
    }
}
