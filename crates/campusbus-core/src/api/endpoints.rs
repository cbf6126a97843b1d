//! Typed shortcuts for the backend resources the app pages use.
//!
//! These are thin wrappers over `ApiClient::execute`; they only pin down
//! paths and per-resource cache policy.

use serde_json::Value;

use super::{ApiClient, ApiError, ApiRequest, ApiResponse};

pub const SCHEDULE: &str = "/bus/schedule";
pub const BUSES: &str = "/bus/get-Buses";
pub const DRIVERS: &str = "/driver/get-Drivers";
pub const NOTICES: &str = "/notice/get-Notices";
pub const POST_NOTICE: &str = "/notice/post-Notice";
pub const BOOK_TRIP: &str = "/trip/book-Trip";
pub const MY_TRIPS: &str = "/trip/my-Trips";
pub const POST_SURVEY: &str = "/survey/post-Survey";
pub const PROFILE: &str = "/user/profile";

impl ApiClient {
    // ===== Schedule & Fleet =====

    pub async fn fetch_schedule(&self) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(SCHEDULE)).await
    }

    pub async fn fetch_buses(&self) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(BUSES)).await
    }

    pub async fn fetch_drivers(&self) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(DRIVERS)).await
    }

    // ===== Notices =====

    /// Fetch one page of notices
    pub async fn fetch_notices(&self, page: u32) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(NOTICES).params(serde_json::json!({ "page": page })))
            .await
    }

    pub async fn post_notice(&self, notice: Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(POST_NOTICE).body(notice)).await
    }

    // ===== Trips =====

    pub async fn book_trip(&self, booking: Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(BOOK_TRIP).body(booking)).await
    }

    /// Bookings change underneath the user, so always go to the network
    pub async fn fetch_my_trips(&self) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(MY_TRIPS).no_cache()).await
    }

    // ===== Surveys =====

    pub async fn post_survey(&self, survey: Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(POST_SURVEY).body(survey)).await
    }

    // ===== Profile =====

    pub async fn fetch_profile(&self) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(PROFILE).no_cache()).await
    }

    pub async fn update_profile(&self, profile: Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::put(PROFILE).body(profile)).await
    }
}
