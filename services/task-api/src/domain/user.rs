//! 用户实体和值对象

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tado_auth_core::{HashedPassword, Role};
use tado_common::UserId;
use tado_errors::{AppError, AppResult};

/// 邮箱值对象（统一小写）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn parse(s: &str) -> AppResult<Self> {
        let s = s.trim().to_lowercase();
        let valid = match s.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        };
        if !valid {
            return Err(AppError::validation("Invalid email address"));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 用户名值对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    pub fn parse(s: &str) -> AppResult<Self> {
        let s = s.trim().to_string();
        let len = s.chars().count();
        if !(3..=24).contains(&len) {
            return Err(AppError::validation("Name must be 3-24 characters"));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 用户实体
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, password: &str) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            name: UserName::parse(name)?,
            email: Email::parse(email)?,
            password_hash: HashedPassword::from_plain(password)?,
            is_admin: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn role(&self) -> Role {
        if self.is_admin { Role::Admin } else { Role::User }
    }

    pub fn verify_password(&self, password: &str) -> AppResult<bool> {
        self.password_hash.verify(password)
    }
}

/// 更新用户资料的输入（缺省字段不修改）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl User {
    pub fn apply(&mut self, update: UserUpdate) -> AppResult<()> {
        if let Some(name) = update.name {
            self.name = UserName::parse(&name)?;
        }
        if let Some(email) = update.email {
            self.email = Email::parse(&email)?;
        }
        if let Some(password) = update.password {
            self.password_hash = HashedPassword::from_plain(&password)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalized_to_lowercase() {
        let email = Email::parse(" Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_rejects_malformed() {
        assert!(Email::parse("no-at-sign").is_err());
        assert!(Email::parse("@example.com").is_err());
        assert!(Email::parse("alice@nodot").is_err());
    }

    #[test]
    fn test_name_length_bounds() {
        assert!(UserName::parse("ab").is_err());
        assert!(UserName::parse("abc").is_ok());
        assert!(UserName::parse(&"x".repeat(25)).is_err());
    }

    #[test]
    fn test_new_user_is_not_admin() {
        let user = User::new("alice", "alice@example.com", "a-long-password").unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.role(), Role::User);
        assert!(user.verify_password("a-long-password").unwrap());
    }
}
