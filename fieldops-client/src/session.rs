use secrecy::{ExposeSecret, Secret};

/// The remote session credential, threaded explicitly through every
/// gateway call rather than living as ambient transport state.
#[derive(Clone, Debug)]
pub struct SessionContext {
    sid: Secret<String>,
}

impl SessionContext {
    pub fn new(sid: impl Into<String>) -> Self {
        Self {
            sid: Secret::new(sid.into()),
        }
    }

    /// `Cookie` header value for a remote request.
    pub fn cookie(&self) -> String {
        format!("sid={}", self.sid.expose_secret())
    }
}
