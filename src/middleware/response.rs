use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config;

/// Page metadata returned next to list results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
    pub total: i64,
}

/// `?pageNumber=&pageSize=` query parameters shared by every list endpoint
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

/// Normalized page request: 1-based page number, clamped page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageQuery {
    pub fn resolve(&self) -> PageRequest {
        let api = &config::config().api;
        self.resolve_with(api.default_page_size, api.max_page_size)
    }

    pub fn resolve_with(&self, default_size: u32, max_size: u32) -> PageRequest {
        let number = self.page_number.filter(|n| *n > 0).unwrap_or(1);
        let size = self
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(default_size)
            .min(max_size.max(1));
        PageRequest { number, size }
    }
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        self.size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.size as i64
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination {
            page_number: self.number,
            page_size: self.size,
            total,
        }
    }

    /// Slice an in-memory result set down to this page
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.size as usize)
            .collect()
    }
}

/// Wrapper for API responses that adds the `APIResponse` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            pagination: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
            pagination: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Successful page of results
    pub fn paged(data: T, pagination: Pagination) -> Self {
        Self {
            data,
            status_code: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Create a 204 No Content response
    pub fn no_content() -> Self {
        Self::with_status((), StatusCode::NO_CONTENT)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return crate::error::ApiError::internal_server_error("Failed to serialize response data")
                    .into_response();
            }
        };

        let mut envelope = json!({
            "statusCode": status.as_u16(),
            "isSuccess": true,
            "errorMessages": [],
            "result": data_value,
        });
        if let Some(pagination) = self.pagination {
            envelope["pagination"] = json!(pagination);
        }

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamps() {
        let q = PageQuery { page_number: None, page_size: None };
        assert_eq!(q.resolve_with(10, 100), PageRequest { number: 1, size: 10 });

        let q = PageQuery { page_number: Some(0), page_size: Some(500) };
        assert_eq!(q.resolve_with(10, 100), PageRequest { number: 1, size: 100 });

        let q = PageQuery { page_number: Some(3), page_size: Some(5) };
        let page = q.resolve_with(10, 100);
        assert_eq!(page.offset(), 10);
        assert_eq!(page.limit(), 5);
    }

    #[test]
    fn slice_returns_requested_page() {
        let page = PageRequest { number: 2, size: 3 };
        assert_eq!(page.slice((1..=8).collect()), vec![4, 5, 6]);
        let page = PageRequest { number: 4, size: 3 };
        assert!(page.slice((1..=8).collect::<Vec<i32>>()).is_empty());
    }

    #[tokio::test]
    async fn envelope_carries_status_and_pagination() {
        let page = PageRequest { number: 1, size: 2 };
        let response = ApiResponse::paged(vec!["a", "b"], page.pagination(7)).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["statusCode"], 200);
        assert_eq!(body["isSuccess"], true);
        assert_eq!(body["result"][1], "b");
        assert_eq!(body["pagination"]["total"], 7);
        assert_eq!(body["pagination"]["pageSize"], 2);
    }

    #[tokio::test]
    async fn created_uses_201() {
        let response = ApiResponse::created(json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn no_content_has_empty_body() {
        let result: ApiResult<()> = Ok(ApiResponse::no_content());
        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
