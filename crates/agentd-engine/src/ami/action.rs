//! Typed AMI actions.
//!
//! An action is a name plus ordered key/value headers. Headers whose value
//! is absent are skipped on the wire.

/// A single AMI action ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct AmiAction {
    name: String,
    headers: Vec<(String, Option<String>)>,
}

impl AmiAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.headers.push((key.into(), value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of a header, if present and set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Log an agent in on the given extension/context.
    pub fn agent_login(agent_number: &str, extension: &str, context: &str) -> Self {
        Self::new("AgentCallbackLogin")
            .header("Agent", Some(agent_number.to_string()))
            .header("Exten", Some(extension.to_string()))
            .header("Context", Some(context.to_string()))
    }

    /// Log an agent off, reporting how long it was logged in.
    pub fn agent_logoff(agent_number: &str, logged_time: i64) -> Self {
        Self::new("AgentLogoff")
            .header("Agent", Some(agent_number.to_string()))
            .header("LoggedTime", Some(logged_time.to_string()))
    }

    /// Pause or unpause a member, optionally scoped to one queue.
    pub fn queue_pause(
        interface: &str,
        paused: bool,
        queue: Option<&str>,
        reason: Option<&str>,
    ) -> Self {
        Self::new("QueuePause")
            .header("Interface", Some(interface.to_string()))
            .header("Paused", Some(paused.to_string()))
            .header("Queue", queue.map(str::to_string))
            .header("Reason", reason.map(str::to_string))
    }

    /// Add a member to a queue.
    pub fn queue_add(
        queue: &str,
        interface: &str,
        member_name: Option<&str>,
        state_interface: Option<&str>,
        penalty: Option<i64>,
    ) -> Self {
        Self::new("QueueAdd")
            .header("Queue", Some(queue.to_string()))
            .header("Interface", Some(interface.to_string()))
            .header("MemberName", member_name.map(str::to_string))
            .header("StateInterface", state_interface.map(str::to_string))
            .header("Penalty", penalty.map(|p| p.to_string()))
    }

    /// Remove a member from a queue.
    pub fn queue_remove(queue: &str, interface: &str) -> Self {
        Self::new("QueueRemove")
            .header("Queue", Some(queue.to_string()))
            .header("Interface", Some(interface.to_string()))
    }

    /// Authenticate the AMI connection.
    pub fn login(username: &str, secret: &str) -> Self {
        Self::new("Login")
            .header("Username", Some(username.to_string()))
            .header("Secret", Some(secret.to_string()))
    }

    /// Serialize to the wire format, blank-line terminated. Unset headers
    /// are omitted.
    pub fn to_wire(&self, action_id: &str) -> String {
        let mut out = format!("Action: {}\r\nActionID: {}\r\n", self.name, action_id);
        for (key, value) in &self.headers {
            if let Some(value) = value {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push_str("\r\n");
            }
        }
        out.push_str("\r\n");
        out
    }
}
