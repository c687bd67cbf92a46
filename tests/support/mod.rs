#![allow(dead_code)]

use std::sync::Mutex;

use pendel::auth::{AuthError, Credential, CredentialStore};

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, credential: Credential) {
        *self.credential.lock().expect("store lock poisoned") = Some(credential);
    }

    pub fn get(&self) -> Option<Credential> {
        self.credential.lock().expect("store lock poisoned").clone()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, AuthError> {
        Ok(self.get())
    }

    fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        *self.credential.lock().expect("store lock poisoned") = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.credential.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

pub fn credential(access: &str, refresh: &str) -> Credential {
    Credential::new(access, refresh, Some(7))
}

pub fn identity_json(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": "mina",
        "email": "mina@example.com",
        "permissions": ["USERS_READ", "TRIPS_READ"],
        "createdAt": "2025-04-01T08:30:00Z",
        "refreshVersion": 1
    })
}

pub fn auth_success(token: &str, refresh_token: &str) -> serde_json::Value {
    serde_json::json!({
        "userId": 7,
        "token": token,
        "refreshToken": refresh_token,
        "statusCode": 0,
        "statusMessage": "Successfully logged in."
    })
}

pub fn auth_failure(code: i32, message: &str) -> serde_json::Value {
    serde_json::json!({ "statusCode": code, "statusMessage": message })
}
