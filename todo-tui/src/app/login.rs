use super::state::TextInput;
use crate::api::ApiError;
use crate::types::Registration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Name,
    Email,
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginSubmission {
    SignIn { username: String, password: String },
    SignUp(Registration),
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub mode: LoginMode,
    pub name: TextInput,
    pub email: TextInput,
    pub username: TextInput,
    pub password: TextInput,
    focused: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    pub fn fields(&self) -> &'static [LoginField] {
        match self.mode {
            LoginMode::SignIn => &[LoginField::Username, LoginField::Password],
            LoginMode::SignUp => &[
                LoginField::Name,
                LoginField::Email,
                LoginField::Username,
                LoginField::Password,
            ],
        }
    }

    pub fn focused_field(&self) -> LoginField {
        let fields = self.fields();
        fields[self.focused.min(fields.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % self.fields().len();
    }

    pub fn prev_field(&mut self) {
        let len = self.fields().len();
        self.focused = (self.focused + len - 1) % len;
    }

    fn input_mut(&mut self, field: LoginField) -> &mut TextInput {
        match field {
            LoginField::Name => &mut self.name,
            LoginField::Email => &mut self.email,
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if self.submitting {
            return;
        }
        let field = self.focused_field();
        self.input_mut(field).insert(c);
    }

    pub fn backspace(&mut self) {
        if self.submitting {
            return;
        }
        let field = self.focused_field();
        self.input_mut(field).backspace();
    }

    /// Switch between sign-in and sign-up, starting from a blank form.
    pub fn toggle_mode(&mut self) {
        if self.submitting {
            return;
        }
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::SignUp,
            LoginMode::SignUp => LoginMode::SignIn,
        };
        self.error = None;
        self.name.clear();
        self.email.clear();
        self.username.clear();
        self.password.clear();
        self.focused = 0;
    }

    /// Validate and lock the form. `None` while a request is in flight or
    /// when required fields are empty (the error is set in that case).
    pub fn submission(&mut self) -> Option<LoginSubmission> {
        if self.submitting {
            return None;
        }
        self.error = None;

        let username = self.username.value.trim().to_string();
        let password = self.password.value.clone();

        let submission = match self.mode {
            LoginMode::SignIn => {
                if username.is_empty() || password.is_empty() {
                    self.error = Some("Username and password are required".to_string());
                    return None;
                }
                LoginSubmission::SignIn { username, password }
            }
            LoginMode::SignUp => {
                let name = self.name.value.trim().to_string();
                let email = self.email.value.trim().to_string();
                if name.is_empty() || email.is_empty() || username.is_empty() || password.is_empty()
                {
                    self.error = Some("All fields are required".to_string());
                    return None;
                }
                LoginSubmission::SignUp(Registration {
                    name,
                    email,
                    username,
                    password,
                })
            }
        };

        self.submitting = true;
        Some(submission)
    }

    /// Returns the token on success.
    pub fn finish_sign_in(&mut self, result: Result<String, ApiError>) -> Option<String> {
        self.submitting = false;
        match result {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                self.error = Some(e.message_or("Invalid credentials"));
                None
            }
        }
    }

    /// On success the form drops back to sign-in mode with the username kept.
    pub fn finish_sign_up(&mut self, result: Result<(), ApiError>) -> bool {
        self.submitting = false;
        match result {
            Ok(()) => {
                self.mode = LoginMode::SignIn;
                self.name.clear();
                self.email.clear();
                self.password.clear();
                self.focused = 0;
                true
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                self.error = Some(e.message_or("Failed to create account"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut LoginForm, s: &str) {
        for c in s.chars() {
            form.input_char(c);
        }
    }

    #[test]
    fn sign_in_requires_both_fields() {
        let mut form = LoginForm::default();
        type_str(&mut form, "admin");

        assert!(form.submission().is_none());
        assert!(form.error.is_some());
        assert!(!form.submitting);
    }

    #[test]
    fn submission_locks_form_until_finished() {
        let mut form = LoginForm::default();
        type_str(&mut form, "admin");
        form.next_field();
        type_str(&mut form, "pass");

        assert_eq!(
            form.submission(),
            Some(LoginSubmission::SignIn {
                username: "admin".into(),
                password: "pass".into()
            })
        );
        assert!(form.submission().is_none());

        let err = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(form.finish_sign_in(Err(err)), None);
        assert_eq!(form.error.as_deref(), Some("Invalid credentials"));
        assert!(!form.submitting);
    }

    #[test]
    fn successful_sign_up_returns_to_sign_in() {
        let mut form = LoginForm::default();
        form.toggle_mode();
        assert_eq!(form.focused_field(), LoginField::Name);
        for value in ["Ada", "ada@example.com", "ada", "secret"] {
            type_str(&mut form, value);
            form.next_field();
        }

        let Some(LoginSubmission::SignUp(reg)) = form.submission() else {
            panic!("expected sign-up submission");
        };
        assert_eq!(reg.email, "ada@example.com");

        assert!(form.finish_sign_up(Ok(())));
        assert_eq!(form.mode, LoginMode::SignIn);
        assert_eq!(form.username.value, "ada");
        assert!(form.password.value.is_empty());
        assert!(form.name.value.is_empty());
    }

    #[test]
    fn toggling_mode_clears_everything() {
        let mut form = LoginForm::default();
        type_str(&mut form, "someone");
        form.error = Some("Invalid credentials".into());

        form.toggle_mode();

        assert_eq!(form.mode, LoginMode::SignUp);
        assert!(form.username.value.is_empty());
        assert!(form.error.is_none());
    }
}
