use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Health {
    pub service: String,
    pub status: String,
}

impl Health {
    pub fn up(service: &str) -> Self {
        Self { service: service.to_string(), status: "UP".into() }
    }
}

/// Plain `{"message": "..."}` body used by mutation endpoints.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
