//! Authentication hand-off.
//!
//! # Responsibility
//! - Validate credentials locally before they reach the identity provider.
//! - Translate provider error codes into stable codes and user-facing text.
//! - Keep the local user mirror in sync with provider accounts.
//!
//! # Invariants
//! - Validation never calls the provider.
//! - Every failed operation leaves its message in `last_error`.
//! - A successful operation clears `last_error`.

use crate::model::user::{is_valid_email, User};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Local credential validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    EmptyEmail,
    EmptyPassword,
    EmptyName,
    InvalidEmail,
    PasswordTooShort,
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Please enter your email address."),
            Self::EmptyPassword => write!(f, "Please enter your password."),
            Self::EmptyName => write!(f, "Please enter your name."),
            Self::InvalidEmail => write!(f, "Please enter a valid email address."),
            Self::PasswordTooShort => write!(
                f,
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            ),
        }
    }
}

impl Error for CredentialError {}

/// Trimmed sign-in input that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Trimmed sign-up input that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<SignInRequest, CredentialError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CredentialError::EmptyEmail);
    }
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }
    if !is_valid_email(email) {
        return Err(CredentialError::InvalidEmail);
    }
    Ok(SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_sign_up(
    email: &str,
    password: &str,
    name: &str,
) -> Result<SignUpRequest, CredentialError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CredentialError::EmptyName);
    }
    let SignInRequest { email, password } = validate_sign_in(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::PasswordTooShort);
    }
    Ok(SignUpRequest {
        email,
        password,
        name: name.to_string(),
    })
}

/// Stable authentication error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    InvalidEmail,
    WrongPassword,
    InvalidCredential,
    UserNotFound,
    EmailAlreadyInUse,
    WeakPassword,
    UserDisabled,
    TooManyRequests,
    NetworkRequestFailed,
    Unknown,
}

impl AuthErrorCode {
    /// Maps a provider code such as `auth/wrong-password` or
    /// `ERROR_WRONG_PASSWORD` onto a stable code.
    pub fn from_vendor_code(code: &str) -> Self {
        let trimmed = code.trim();
        let trimmed = trimmed.strip_prefix("auth/").unwrap_or(trimmed);
        let trimmed = trimmed
            .strip_prefix("ERROR_")
            .or_else(|| trimmed.strip_prefix("error_"))
            .unwrap_or(trimmed);
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "invalid-email" => Self::InvalidEmail,
            "wrong-password" => Self::WrongPassword,
            "invalid-credential" => Self::InvalidCredential,
            "user-not-found" => Self::UserNotFound,
            "email-already-in-use" => Self::EmailAlreadyInUse,
            "weak-password" => Self::WeakPassword,
            "user-disabled" => Self::UserDisabled,
            "too-many-requests" => Self::TooManyRequests,
            "network-request-failed" => Self::NetworkRequestFailed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEmail => "invalid-email",
            Self::WrongPassword => "wrong-password",
            Self::InvalidCredential => "invalid-credential",
            Self::UserNotFound => "user-not-found",
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::WeakPassword => "weak-password",
            Self::UserDisabled => "user-disabled",
            Self::TooManyRequests => "too-many-requests",
            Self::NetworkRequestFailed => "network-request-failed",
            Self::Unknown => "unknown",
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidEmail => "The email address is badly formatted.",
            Self::WrongPassword => "The password is incorrect.",
            Self::InvalidCredential => "The email or password is incorrect.",
            Self::UserNotFound => "No account exists for this email address.",
            Self::EmailAlreadyInUse => "An account already exists for this email address.",
            Self::WeakPassword => "The password is too weak.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyRequests => "Too many attempts. Please try again later.",
            Self::NetworkRequestFailed => "Network error. Check your connection and try again.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

/// Error reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Vendor error code, e.g. `auth/wrong-password`.
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Account returned by the provider after sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccount {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Identity provider seam. Implemented by platform SDK bindings.
pub trait AuthProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthAccount, ProviderError>;
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthAccount, ProviderError>;
    fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;
    fn sign_out(&self) -> Result<(), ProviderError>;
}

#[derive(Debug)]
pub enum AuthError {
    Credentials(CredentialError),
    Provider {
        code: AuthErrorCode,
        vendor_code: String,
    },
    Repo(RepoError),
}

impl AuthError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Credentials(err) => err.to_string(),
            Self::Provider { code, .. } => code.user_message().to_string(),
            Self::Repo(_) => AuthErrorCode::Unknown.user_message().to_string(),
        }
    }

    pub fn code(&self) -> AuthErrorCode {
        match self {
            Self::Credentials(CredentialError::InvalidEmail) => AuthErrorCode::InvalidEmail,
            Self::Credentials(CredentialError::PasswordTooShort) => AuthErrorCode::WeakPassword,
            Self::Credentials(_) => AuthErrorCode::Unknown,
            Self::Provider { code, .. } => *code,
            Self::Repo(_) => AuthErrorCode::Unknown,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credentials(err) => write!(f, "{err}"),
            Self::Provider { code, vendor_code } => {
                write!(f, "provider error {} ({vendor_code})", code.as_str())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Credentials(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Provider { .. } => None,
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(value: CredentialError) -> Self {
        Self::Credentials(value)
    }
}

impl From<ProviderError> for AuthError {
    fn from(value: ProviderError) -> Self {
        Self::Provider {
            code: AuthErrorCode::from_vendor_code(&value.code),
            vendor_code: value.code,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Session state around an identity provider and the user mirror.
pub struct AuthService<P: AuthProvider, U: UserRepository> {
    provider: P,
    users: U,
    current_user: Option<User>,
    last_error: Option<String>,
}

impl<P: AuthProvider, U: UserRepository> AuthService<P, U> {
    pub fn new(provider: P, users: U) -> Self {
        Self {
            provider,
            users,
            current_user: None,
            last_error: None,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// User-facing message of the most recent failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> AuthResult<User> {
        let result = self.try_sign_in(email, password);
        self.finish("auth_sign_in", result)
    }

    pub fn sign_up(&mut self, email: &str, password: &str, name: &str) -> AuthResult<User> {
        let result = self.try_sign_up(email, password, name);
        self.finish("auth_sign_up", result)
    }

    pub fn send_password_reset(&mut self, email: &str) -> AuthResult<()> {
        let result = self.try_password_reset(email);
        self.finish("auth_password_reset", result)
    }

    pub fn sign_out(&mut self) -> AuthResult<()> {
        let result = self.provider.sign_out().map_err(AuthError::from);
        let result = self.finish("auth_sign_out", result);
        if result.is_ok() {
            self.current_user = None;
        }
        result
    }

    fn try_sign_in(&mut self, email: &str, password: &str) -> AuthResult<User> {
        let request = validate_sign_in(email, password)?;
        let account = self.provider.sign_in(&request.email, &request.password)?;
        let user = match self.users.get_user(&account.uid)? {
            Some(user) => user,
            None => {
                let user = mirror_of(&account, account.display_name.as_deref().unwrap_or(""));
                self.users.create_user(&user)?;
                user
            }
        };
        self.current_user = Some(user.clone());
        Ok(user)
    }

    fn try_sign_up(&mut self, email: &str, password: &str, name: &str) -> AuthResult<User> {
        let request = validate_sign_up(email, password, name)?;
        let account = self.provider.sign_up(&request.email, &request.password)?;
        let user = mirror_of(&account, &request.name);
        self.users.create_user(&user)?;
        self.current_user = Some(user.clone());
        Ok(user)
    }

    fn try_password_reset(&mut self, email: &str) -> AuthResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CredentialError::EmptyEmail.into());
        }
        if !is_valid_email(email) {
            return Err(CredentialError::InvalidEmail.into());
        }
        self.provider.send_password_reset(email)?;
        Ok(())
    }

    fn finish<T>(&mut self, event: &str, result: AuthResult<T>) -> AuthResult<T> {
        match &result {
            Ok(_) => {
                self.last_error = None;
                info!("event={event} module=auth status=ok");
            }
            Err(err) => {
                self.last_error = Some(err.user_message());
                warn!(
                    "event={event} module=auth status=error error_code={}",
                    err.code().as_str()
                );
            }
        }
        result
    }
}

fn mirror_of(account: &AuthAccount, name: &str) -> User {
    let email = if account.email.trim().is_empty() {
        String::new()
    } else {
        account.email.trim().to_string()
    };
    User::new(account.uid.clone(), name.trim(), email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_validation_checks_emptiness_before_format() {
        assert_eq!(validate_sign_in("  ", "x"), Err(CredentialError::EmptyEmail));
        assert_eq!(
            validate_sign_in("a@b.co", ""),
            Err(CredentialError::EmptyPassword)
        );
        assert_eq!(
            validate_sign_in("nope", "secret"),
            Err(CredentialError::InvalidEmail)
        );
        let ok = validate_sign_in(" a@b.co ", "x").expect("valid");
        assert_eq!(ok.email, "a@b.co");
    }

    #[test]
    fn sign_up_enforces_name_and_password_length() {
        assert_eq!(
            validate_sign_up("a@b.co", "secret", " "),
            Err(CredentialError::EmptyName)
        );
        assert_eq!(
            validate_sign_up("a@b.co", "12345", "Ann"),
            Err(CredentialError::PasswordTooShort)
        );
        let ok = validate_sign_up("a@b.co", "123456", " Ann ").expect("valid");
        assert_eq!(ok.name, "Ann");
    }

    #[test]
    fn vendor_codes_normalize_across_spellings() {
        assert_eq!(
            AuthErrorCode::from_vendor_code("auth/wrong-password"),
            AuthErrorCode::WrongPassword
        );
        assert_eq!(
            AuthErrorCode::from_vendor_code("ERROR_EMAIL_ALREADY_IN_USE"),
            AuthErrorCode::EmailAlreadyInUse
        );
        assert_eq!(
            AuthErrorCode::from_vendor_code("network-request-failed"),
            AuthErrorCode::NetworkRequestFailed
        );
        assert_eq!(
            AuthErrorCode::from_vendor_code("auth/quota-exceeded"),
            AuthErrorCode::Unknown
        );
    }
}
