// src/models/activity.rs

use std::fmt;

// Ações gravadas em activity_logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    Login,
    AccountCreated,
    UserActivated,
    UserRestricted,
    FactorAssigned,
    FactorUnassigned,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Login => "LOGIN",
            ActivityAction::AccountCreated => "ACCOUNT_CREATED",
            ActivityAction::UserActivated => "USER_ACTIVATED",
            ActivityAction::UserRestricted => "USER_RESTRICTED",
            ActivityAction::FactorAssigned => "FACTOR_ASSIGNED",
            ActivityAction::FactorUnassigned => "FACTOR_UNASSIGNED",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// IP e User-Agent de quem fez a requisição (preenchido pelo extrator ClientInfo)
#[derive(Debug, Clone, Default)]
pub struct ClientMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
