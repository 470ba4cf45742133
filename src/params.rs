//! Connection parameters (§3): everything [`crate::Session::open`] needs to reach and
//! authenticate against a Bolt server, and nothing this core doesn't use (no URL parsing, no
//! TLS, no MDC-style redirects).

use secstr::SecUtf8;

/// An immutable bundle of the values needed to open and authenticate a session.
///
/// The password is held as a [`SecUtf8`], which zeroizes its backing memory on drop and never
/// prints the cleartext value through `Debug`; use [`ConnectParams::password`] if you genuinely
/// need it.
#[derive(Clone, Debug)]
pub struct ConnectParams {
    host: String,
    port: u16,
    user: String,
    password: SecUtf8,
    user_agent: String,
}

impl ConnectParams {
    /// Builds a `ConnectParams` with the default `user_agent` of `bolt4/<crate version>`.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: SecUtf8::from(password.into()),
            user_agent: format!("bolt4/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Overrides the `user_agent` string sent in the `HELLO` message.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The `host:port` pair formatted for [`std::net::ToSocketAddrs`].
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// The cleartext password. Returns a borrow of the [`SecUtf8`]'s protected memory; the
    /// caller decides whether to look inside it.
    pub fn password(&self) -> &SecUtf8 {
        &self.password
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
