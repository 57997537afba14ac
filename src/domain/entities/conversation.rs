use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    text: String,
    created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, text: String) -> Self {
        Self {
            role,
            text,
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Append-only log of a session's turns, replayed when a session resumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::new(Role::User, text.into()));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns
            .push(ConversationTurn::new(Role::Assistant, text.into()));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = ConversationLog::new();
        log.push_user("Can I grow maize?");
        log.push_assistant("Yes. thanks for asking!");
        log.push_user("And beans?");

        let roles: Vec<Role> = log.turns().iter().map(|t| t.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(log.turns()[2].text(), "And beans?");
        assert_eq!(log.turns().len(), 3);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
