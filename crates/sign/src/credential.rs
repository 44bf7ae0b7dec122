use std::fmt;

/// Account credential issued by the console.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub app_id: u64,
    pub secret_id: String,
    secret_key: String,
}

impl Credential {
    pub fn new(app_id: u64, secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            app_id,
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("app_id", &self.app_id)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
