// Admin sign-in and the route guard used in front of admin operations

use thiserror::Error;
use tracing::{info, warn};

use crate::error::BackendError;
use crate::{Auth, Session, User};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignInError {
    #[error("Lütfen email ve şifrenizi girin.")]
    MissingCredentials,
    #[error("Geçersiz email veya şifre.")]
    InvalidCredentials,
    #[error("Admin yetkiniz bulunmuyor.")]
    NotAdmin,
    #[error("Giriş yapılırken bir hata oluştu: {0}")]
    Backend(BackendError),
}

/// Sign in with email and password; only users holding the admin role
/// keep their session.
pub async fn sign_in<A: Auth + ?Sized>(
    auth: &A,
    email: &str,
    password: &str,
) -> Result<Session, SignInError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(SignInError::MissingCredentials);
    }

    let session = match auth.sign_in_with_password(email, password).await {
        Ok(session) => session,
        Err(BackendError::Auth(reason)) => {
            warn!(%reason, "sign-in rejected");
            return Err(SignInError::InvalidCredentials);
        }
        Err(err) => return Err(SignInError::Backend(err)),
    };

    let is_admin = match auth.has_role(&session.user.id, ADMIN_ROLE).await {
        Ok(granted) => granted,
        Err(err) => {
            warn!(%err, "role lookup failed");
            false
        }
    };
    if !is_admin {
        if let Err(err) = auth.sign_out().await {
            warn!(%err, "sign-out after role check failed");
        }
        return Err(SignInError::NotAdmin);
    }

    info!(user = %session.user.id, "admin signed in");
    Ok(session)
}

/// Who is signed in and whether they are an admin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_admin: bool,
}

/// Guard decision for a protected page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Not signed in: go to the login page
    Login,
    /// Signed in without the required role: go home
    Home,
}

impl Access {
    pub fn redirect(self) -> Option<&'static str> {
        match self {
            Access::Granted => None,
            Access::Login => Some("/admin/login"),
            Access::Home => Some("/"),
        }
    }
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn access(&self, require_admin: bool) -> Access {
        if !self.is_authenticated() {
            Access::Login
        } else if require_admin && !self.is_admin {
            Access::Home
        } else {
            Access::Granted
        }
    }
}

/// Current auth state; any lookup failure reads as anonymous
pub async fn check<A: Auth + ?Sized>(auth: &A) -> AuthState {
    let session = match auth.get_session().await {
        Ok(Some(session)) => session,
        Ok(None) => return AuthState::anonymous(),
        Err(err) => {
            warn!(%err, "session lookup failed");
            return AuthState::anonymous();
        }
    };

    let is_admin = auth
        .has_role(&session.user.id, ADMIN_ROLE)
        .await
        .unwrap_or_else(|err| {
            warn!(%err, "role lookup failed");
            false
        });

    AuthState {
        user: Some(session.user),
        is_admin,
    }
}
