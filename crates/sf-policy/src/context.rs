// context.rs — Security context handed to the coordinator alongside an intent.
//
// The decision policy accepts a context but does not consult it yet; it is
// the seam where trust scores, roles and system load will feed in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The principal on whose behalf the agent acts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserContext {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub trust_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub authenticated_at: DateTime<Utc>,
}

/// The runtime the agent executes in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemContext {
    pub system_id: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_security_level")]
    pub security_level: String,
    #[serde(default)]
    pub active_executions: u32,
    #[serde(default)]
    pub risk_accumulation: f64,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_security_level() -> String {
    "standard".to_string()
}

impl SystemContext {
    pub fn new(system_id: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            version: default_version(),
            environment: default_environment(),
            security_level: default_security_level(),
            active_executions: 0,
            risk_accumulation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemContext>,
    #[serde(default)]
    pub session_data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub environment: serde_json::Map<String, serde_json::Value>,
}

impl SecurityContext {
    pub fn user_roles(&self) -> &[String] {
        self.user.as_ref().map(|u| u.roles.as_slice()).unwrap_or(&[])
    }

    pub fn user_permissions(&self) -> &[String] {
        self.user
            .as_ref()
            .map(|u| u.permissions.as_slice())
            .unwrap_or(&[])
    }

    /// 0.0 when no user is attached.
    pub fn trust_score(&self) -> f64 {
        self.user.as_ref().map(|u| u.trust_score).unwrap_or(0.0)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user_roles().iter().any(|r| r == role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.user_permissions().iter().any(|p| p == permission)
    }
}
