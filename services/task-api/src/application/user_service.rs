//! 用户应用服务

use std::sync::Arc;
use tado_auth_core::{Claims, TokenService};
use tado_common::UserId;
use tado_errors::{AppError, AppResult};
use tracing::{info, warn};

use crate::domain::{Email, User, UserRepository, UserUpdate};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { repo, tokens }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        let user = User::new(name, email, password)?;

        if self.repo.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::conflict("Email already in use"));
        }
        self.repo.insert(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// 登录成功返回用户和访问令牌
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, String)> {
        let email = Email::parse(email)?;

        let user = match self.repo.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!(email = email.as_str(), "Login attempt for unknown email");
                return Err(AppError::unauthenticated("Invalid credentials"));
            }
        };

        if !user.verify_password(password)? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::unauthenticated("Invalid credentials"));
        }

        let token = self.tokens.generate_token(&user.id, user.role())?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }

    pub async fn get(&self, id: &UserId) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// 更新资料：仅本人或管理员
    pub async fn update_profile(
        &self,
        actor: &Claims,
        target: &UserId,
        update: UserUpdate,
    ) -> AppResult<User> {
        let actor_id = actor.user_id()?;
        if actor_id != *target && !actor.is_admin() {
            return Err(AppError::forbidden("Cannot update other users"));
        }

        let mut user = self.get(target).await?;
        user.apply(update)?;
        self.repo.update(&user).await?;

        info!(user_id = %target, actor = %actor_id, "User profile updated");
        Ok(user)
    }

    /// 管理员专用：列出全部用户
    pub async fn list_all(&self, actor: &Claims) -> AppResult<Vec<User>> {
        if !actor.is_admin() {
            return Err(AppError::forbidden("Admin only"));
        }
        self.repo.list_all().await
    }

    /// 管理员专用：删除用户
    pub async fn delete(&self, actor: &Claims, id: &UserId) -> AppResult<()> {
        if !actor.is_admin() {
            return Err(AppError::forbidden("Admin only"));
        }

        let deleted = self.repo.delete(id).await?;
        if !deleted {
            return Err(AppError::not_found("User not found"));
        }

        info!(user_id = %id, "User deleted by admin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tado_auth_core::Role;

    struct InMemoryUserRepository {
        users: Mutex<HashMap<UserId, User>>,
    }

    impl InMemoryUserRepository {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn insert(&self, user: &User) -> AppResult<()> {
            self.users.lock().unwrap().insert(user.id, user.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
            Ok(self.users.lock().unwrap().get(id).cloned())
        }

        async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == *email)
                .cloned())
        }

        async fn list_all(&self) -> AppResult<Vec<User>> {
            Ok(self.users.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, user: &User) -> AppResult<()> {
            self.users.lock().unwrap().insert(user.id, user.clone());
            Ok(())
        }

        async fn delete(&self, id: &UserId) -> AppResult<bool> {
            Ok(self.users.lock().unwrap().remove(id).is_some())
        }
    }

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            TokenService::new("test-secret", 3600, "tado"),
        )
    }

    fn admin_claims() -> Claims {
        Claims::new(&UserId::new(), Role::Admin, 3600, "tado")
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service();
        let user = svc
            .register("alice", "alice@example.com", "a-long-password")
            .await
            .unwrap();

        let (logged_in, token) = svc
            .login("alice@example.com", "a-long-password")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let svc = service();
        svc.register("alice", "alice@example.com", "a-long-password")
            .await
            .unwrap();

        let err = svc
            .register("other", "alice@example.com", "another-password")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let svc = service();
        svc.register("alice", "alice@example.com", "a-long-password")
            .await
            .unwrap();

        let err = svc
            .login("alice@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_update_other_user() {
        let svc = service();
        let alice = svc
            .register("alice", "alice@example.com", "a-long-password")
            .await
            .unwrap();
        let bob = svc
            .register("bobby", "bob@example.com", "another-password")
            .await
            .unwrap();

        let bob_claims = Claims::new(&bob.id, Role::User, 3600, "tado");
        let err = svc
            .update_profile(
                &bob_claims,
                &alice.id,
                UserUpdate {
                    name: Some("mallory".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_admin_can_update_and_delete_any_user() {
        let svc = service();
        let alice = svc
            .register("alice", "alice@example.com", "a-long-password")
            .await
            .unwrap();

        let updated = svc
            .update_profile(
                &admin_claims(),
                &alice.id,
                UserUpdate {
                    name: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name.as_str(), "renamed");

        svc.delete(&admin_claims(), &alice.id).await.unwrap();
        assert_eq!(svc.get(&alice.id).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_all_is_admin_only() {
        let svc = service();
        let user_claims = Claims::new(&UserId::new(), Role::User, 3600, "tado");
        assert_eq!(
            svc.list_all(&user_claims).await.unwrap_err().status_code(),
            403
        );
        assert!(svc.list_all(&admin_claims()).await.unwrap().is_empty());
    }
}
