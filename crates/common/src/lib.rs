//! Pieces shared by both services: logging setup, environment checks and small response types.

pub mod env;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_service_and_status() {
        let h = types::Health::up("blog-service");
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["service"], "blog-service");
        assert_eq!(json["status"], "UP");
    }
}
