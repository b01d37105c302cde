//! API request/response models, grouped per entity.

pub mod auth;
pub mod campaigns;
pub mod faqs;
pub mod pricing;
pub mod settings;
pub mod social_accounts;
pub mod sponsors;
pub mod subscriptions;
pub mod tickets;
pub mod users;

use serde::Serialize;
use utoipa::ToSchema;

/// The JSON success envelope wrapping every API response body.
///
/// Error responses use `{"success": false, "message": ...}` and are produced
/// by the error type's `IntoResponse`, never by handlers directly.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let body = serde_json::to_value(ApiResponse::new(vec![1, 2, 3])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
    }
}
