use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::IndexError;

/// API错误类型
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// 鉴权失败
#[derive(Debug, thiserror::Error)]
#[error("invalid token")]
pub struct Unauthorized;

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.is::<Unauthorized>() {
            return StatusCode::UNAUTHORIZED;
        }
        match self.0.downcast_ref::<IndexError>() {
            Some(IndexError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(IndexError::EmptySource | IndexError::Decode(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Some(IndexError::Source { .. }) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("请求处理失败: {:#}", self.0);
        }
        (status, format!("{:#}", self.0)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn validation() -> IndexError {
        IndexError::Validation(serde_json::from_slice::<u8>(b"x").unwrap_err())
    }

    #[rstest]
    #[case(AppError::from(Unauthorized), StatusCode::UNAUTHORIZED)]
    #[case(AppError::from(validation()), StatusCode::BAD_REQUEST)]
    #[case(AppError::from(IndexError::EmptySource), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(
        AppError::from(IndexError::Source { location: "1.png".into(), reason: "gone".into() }),
        StatusCode::NOT_FOUND
    )]
    #[case(AppError::from(IndexError::Transport("closed".into())), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(AppError::from(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR)]
    fn error_status(#[case] err: AppError, #[case] expected: StatusCode) {
        assert_eq!(err.into_response().status(), expected);
    }
}
