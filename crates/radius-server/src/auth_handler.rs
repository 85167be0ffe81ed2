use radius_proto::{verify_chap_response, Attribute, ChapResponse};
use std::collections::HashMap;

/// Authentication handler trait
///
/// Implement this trait to provide custom authentication logic.
pub trait AuthHandler: Send + Sync {
    /// Authenticate a user with username and password (PAP)
    ///
    /// Returns true if authentication succeeds, false otherwise.
    fn authenticate(&self, username: &str, password: &str) -> bool;

    /// Authenticate a user with CHAP challenge-response
    ///
    /// Default implementation retrieves the password and verifies the response.
    fn authenticate_chap(&self, username: &str, chap_response: &ChapResponse, challenge: &[u8]) -> bool {
        match self.get_user_password(username) {
            Some(password) => verify_chap_response(chap_response, &password, challenge),
            None => false,
        }
    }

    /// Get user's plaintext password (for CHAP verification)
    ///
    /// Returns None if user doesn't exist or password retrieval is not supported.
    fn get_user_password(&self, _username: &str) -> Option<String> {
        None
    }

    /// Get additional attributes to include in Access-Accept response
    fn get_accept_attributes(&self, _username: &str) -> Vec<Attribute> {
        vec![]
    }

    /// Get additional attributes to include in Access-Reject response
    fn get_reject_attributes(&self, _username: &str) -> Vec<Attribute> {
        Attribute::reply_message("Authentication failed").into_iter().collect()
    }
}

/// In-memory authentication handler
#[derive(Debug, Default, Clone)]
pub struct SimpleAuthHandler {
    users: HashMap<String, String>,
}

impl SimpleAuthHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users.insert(username.into(), password.into());
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl AuthHandler for SimpleAuthHandler {
    fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|p| p == password)
            .unwrap_or(false)
    }

    fn get_user_password(&self, username: &str) -> Option<String> {
        self.users.get(username).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radius_proto::compute_chap_response;

    #[test]
    fn test_simple_auth_handler() {
        let mut handler = SimpleAuthHandler::new();
        handler.add_user("testuser", "testpass");

        assert!(handler.authenticate("testuser", "testpass"));
        assert!(!handler.authenticate("testuser", "wrongpass"));
        assert!(!handler.authenticate("wronguser", "testpass"));
    }

    #[test]
    fn test_chap_through_default_method() {
        let mut handler = SimpleAuthHandler::new();
        handler.add_user("alice", "wonderland");
        let challenge = [9u8; 16];

        let response = ChapResponse {
            ident: 3,
            response: compute_chap_response(3, "wonderland", &challenge),
        };
        assert!(handler.authenticate_chap("alice", &response, &challenge));
        assert!(!handler.authenticate_chap("bob", &response, &challenge));
        assert!(!handler.authenticate_chap("alice", &response, &[8u8; 16]));
    }

    #[test]
    fn test_default_reject_message() {
        let handler = SimpleAuthHandler::new();
        let attrs = handler.get_reject_attributes("anyone");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].as_str(), Some("Authentication failed"));
    }
}
