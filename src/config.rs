use crate::error::RelayError;

/// What to do with a line that cannot be decoded into a client event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidPayloadPolicy {
    /// Send an `error` event back to the sender.
    #[default]
    Reply,
    /// Drop it without telling the sender.
    Ignore,
}

/// Relay configuration. Built through [`ServerConfig::builder`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
    pub invalid_payload_policy: InvalidPayloadPolicy,
    pub require_membership_for_actions: bool,
    pub prune_empty_rooms: bool,
}

pub struct ServerConfigBuilder {
    addr: String,
    port: u16,
    invalid_payload_policy: InvalidPayloadPolicy,
    require_membership_for_actions: bool,
    prune_empty_rooms: bool,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            addr: "0.0.0.0".to_string(),
            port: 3000,
            invalid_payload_policy: InvalidPayloadPolicy::Reply,
            require_membership_for_actions: false,
            prune_empty_rooms: false,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build_unchecked()
    }
}

impl ServerConfigBuilder {
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn invalid_payload_policy(mut self, policy: InvalidPayloadPolicy) -> Self {
        self.invalid_payload_policy = policy;
        self
    }

    /// Reject `spin` events into rooms the sender has not joined.
    pub fn require_membership_for_actions(mut self, required: bool) -> Self {
        self.require_membership_for_actions = required;
        self
    }

    /// Drop a room from the registry once its last member disconnects.
    pub fn prune_empty_rooms(mut self, prune: bool) -> Self {
        self.prune_empty_rooms = prune;
        self
    }

    /// Validate and produce the config. `addr` may be an IP or a hostname;
    /// resolution happens at bind time.
    pub fn build(self) -> Result<ServerConfig, RelayError> {
        let addr = self.addr.trim();
        if addr.is_empty() || addr.contains(char::is_whitespace) {
            return Err(RelayError::Config(format!("bad bind host {:?}", self.addr)));
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            port: self.port,
            invalid_payload_policy: self.invalid_payload_policy,
            require_membership_for_actions: self.require_membership_for_actions,
            prune_empty_rooms: self.prune_empty_rooms,
        }
    }
}
