/// Who, if anyone, is signed in.
pub trait AuthProvider {
    fn is_logged_in(&self) -> bool;
    fn display_name(&self) -> &str;
}

/// Accepts any non-empty email/password pair. Nothing is verified or stored.
#[derive(Debug, Clone, Default)]
pub struct MockAuth {
    logged_in: bool,
    name: String,
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the login succeeded. The display name is the part of
    /// the email before `@`.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            tracing::debug!("Login rejected: missing email or password");
            return false;
        }
        let local = email.split('@').next().unwrap_or(email);
        self.name = local.to_string();
        self.logged_in = true;
        tracing::info!(user = %self.name, "Logged in");
        true
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.name.clear();
    }

    /// Up to two uppercase initials from the display name.
    pub fn initials(&self) -> String {
        self.name
            .split(|c: char| c.is_whitespace() || c == '.' || c == '_' || c == '-')
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl AuthProvider for MockAuth {
    fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
