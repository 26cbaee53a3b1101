/// Bind state of one stub server connection.
#[derive(Debug, Default)]
pub struct StubSession {
    bound_dn: Option<String>,
    binds: u32,
}

impl StubSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of a bind; a failed bind leaves the session
    /// unauthenticated, as RFC 4511 requires.
    pub fn record_bind(&mut self, dn: &str, success: bool) {
        self.binds += 1;
        self.bound_dn = success.then(|| dn.to_string());
    }

    pub fn unbind(&mut self) {
        self.bound_dn = None;
    }

    pub fn is_bound(&self) -> bool {
        self.bound_dn.is_some()
    }

    pub fn bound_dn(&self) -> Option<&str> {
        self.bound_dn.as_deref()
    }

    pub fn bind_count(&self) -> u32 {
        self.binds
    }
}
