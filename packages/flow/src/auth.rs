//! Login, registration and password recovery screen.
//!
//! Authentication is simulated: any filled-in form signs in and social
//! sign-in always succeeds.

use std::time::Duration;

use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Simulated latency of the email form.
pub const SIGN_IN_DELAY: Duration = Duration::from_millis(1500);

/// Simulated latency of social sign-in.
pub const SOCIAL_SIGN_IN_DELAY: Duration = Duration::from_millis(1000);

/// Message shown after a recovery email was "sent".
pub const RECOVERY_MESSAGE: &str =
    "Email de recuperação enviado! Verifique sua caixa de entrada.";

/// Social sign-in buttons, in display order.
pub const SOCIAL_PROVIDERS: &[&str] = &[
    "Continuar com Google",
    "Continuar com Facebook",
    "Continuar com iCloud",
];

/// Which form the login screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMode {
    /// Email and password.
    #[default]
    Login,
    /// Name, email and password.
    Register,
    /// Email only.
    Forgot,
}

impl AuthMode {
    /// Screen title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Bem-vindo(a)",
            Self::Register => "Criar Conta",
            Self::Forgot => "Recuperar Senha",
        }
    }

    /// Line under the title.
    #[must_use]
    pub const fn subtitle(self) -> &'static str {
        match self {
            Self::Login => "Entre para continuar segura.",
            Self::Register => "Faça parte da nossa comunidade.",
            Self::Forgot => "Informe seu email para receber um link.",
        }
    }

    /// Label of the submit button.
    #[must_use]
    pub const fn submit_label(self) -> &'static str {
        match self {
            Self::Login => "Entrar",
            Self::Register => "Cadastrar",
            Self::Forgot => "Enviar Link",
        }
    }
}

/// A required field was left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is required")]
pub struct MissingField(pub &'static str);

/// Result of submitting the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The user is in.
    SignedIn,
    /// A recovery link was "sent"; the screen is back in login mode.
    RecoverySent(&'static str),
}

/// Login screen state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    mode: AuthMode,
    /// Full name, register mode only.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password, hidden in forgot mode.
    pub password: String,
    message: Option<&'static str>,
}

impl LoginForm {
    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switches mode, clearing any message.
    pub const fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.message = None;
    }

    /// Success message to display, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// Submits the current form.
    ///
    /// # Errors
    ///
    /// Returns [`MissingField`] naming the first blank required field.
    pub fn submit(&mut self) -> Result<AuthOutcome, MissingField> {
        self.message = None;

        if self.mode == AuthMode::Register && self.name.trim().is_empty() {
            return Err(MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(MissingField("email"));
        }

        if self.mode == AuthMode::Forgot {
            log::info!("Password recovery requested");
            self.mode = AuthMode::Login;
            self.message = Some(RECOVERY_MESSAGE);
            return Ok(AuthOutcome::RecoverySent(RECOVERY_MESSAGE));
        }

        if self.password.is_empty() {
            return Err(MissingField("password"));
        }

        log::info!("Signed in ({})", self.mode);
        Ok(AuthOutcome::SignedIn)
    }

    /// Social sign-in; always succeeds.
    #[must_use]
    pub fn social_sign_in(&self, provider: &str) -> AuthOutcome {
        log::info!("Signed in via social provider: {provider}");
        AuthOutcome::SignedIn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_email_and_password() {
        let mut form = LoginForm::default();
        assert_eq!(form.submit(), Err(MissingField("email")));

        form.email = "ana@example.com".to_string();
        assert_eq!(form.submit(), Err(MissingField("password")));

        form.password = "segredo".to_string();
        assert_eq!(form.submit(), Ok(AuthOutcome::SignedIn));
    }

    #[test]
    fn register_also_requires_name() {
        let mut form = LoginForm {
            email: "ana@example.com".to_string(),
            password: "segredo".to_string(),
            ..LoginForm::default()
        };
        form.set_mode(AuthMode::Register);
        assert_eq!(form.submit(), Err(MissingField("name")));

        form.name = "Ana Souza".to_string();
        assert_eq!(form.submit(), Ok(AuthOutcome::SignedIn));
    }

    #[test]
    fn forgot_sends_link_and_returns_to_login() {
        let mut form = LoginForm::default();
        form.set_mode(AuthMode::Forgot);
        form.email = "ana@example.com".to_string();

        assert_eq!(
            form.submit(),
            Ok(AuthOutcome::RecoverySent(RECOVERY_MESSAGE))
        );
        assert_eq!(form.mode(), AuthMode::Login);
        assert_eq!(form.message(), Some(RECOVERY_MESSAGE));

        form.set_mode(AuthMode::Register);
        assert_eq!(form.message(), None);
    }

    #[test]
    fn social_sign_in_always_succeeds() {
        let form = LoginForm::default();
        assert_eq!(
            form.social_sign_in(SOCIAL_PROVIDERS[0]),
            AuthOutcome::SignedIn
        );
    }
}
