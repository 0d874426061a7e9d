/*
 * 通用Response结构定义
 */

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// 业务错误码，与HTTP状态码对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrCode {
    /// 操作成功 - HTTP 200
    Success = 0,
    /// 请求参数错误 - HTTP 400
    BadRequest = 400,
    /// 资源未找到 - HTTP 404
    NotFound = 404,
    /// 内部服务器错误 - HTTP 500
    InternalServerError = 500,
    /// 数据库操作失败
    DatabaseError = 1002,
}

impl ErrCode {
    pub fn http_status(&self) -> StatusCode {
        match *self {
            ErrCode::Success => StatusCode::OK,
            ErrCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrCode::NotFound => StatusCode::NOT_FOUND,
            ErrCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match *self {
            ErrCode::Success => "操作成功",
            ErrCode::BadRequest => "请求参数错误",
            ErrCode::NotFound => "资源未找到",
            ErrCode::InternalServerError => "内部服务器错误",
            ErrCode::DatabaseError => "数据库操作失败",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(*self, ErrCode::Success)
    }
}

// 序列化时使用数值
impl Serialize for ErrCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for ErrCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = i32::deserialize(deserializer)?;
        match code {
            0 => Ok(ErrCode::Success),
            400 => Ok(ErrCode::BadRequest),
            404 => Ok(ErrCode::NotFound),
            500 => Ok(ErrCode::InternalServerError),
            1002 => Ok(ErrCode::DatabaseError),
            _ => Err(serde::de::Error::custom(format!(
                "Unknown error code: {}",
                code
            ))),
        }
    }
}

impl std::fmt::Display for ErrCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as i32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T = ()> {
    /// 响应状态码
    pub code: ErrCode,
    /// 响应消息
    pub msg: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Response<T> {
    pub fn new(code: ErrCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn success(data: T) -> Self {
        Self {
            code: ErrCode::Success,
            msg: ErrCode::Success.default_message().to_string(),
            data: Some(data),
        }
    }

    pub fn failed(code: ErrCode, msg: Option<impl Into<String>>) -> Self {
        match msg {
            Some(msg) => Self::new(code, msg),
            None => Self::new(code, code.default_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errcode_http_status_mapping() {
        assert_eq!(ErrCode::Success.http_status(), StatusCode::OK);
        assert_eq!(ErrCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(ErrCode::Success.is_success());
        assert!(!ErrCode::NotFound.is_success());
    }

    #[test]
    fn test_errcode_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrCode::DatabaseError).unwrap(), "1002");
        let code: ErrCode = serde_json::from_str("404").unwrap();
        assert_eq!(code, ErrCode::NotFound);
        assert!(serde_json::from_str::<ErrCode>("777").is_err());
        assert!(serde_json::from_str::<ErrCode>("503").is_err());
    }

    #[test]
    fn test_failed_response_skips_data() {
        let resp: Response<u64> = Response::failed(ErrCode::NotFound, None::<String>);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 404);
        assert_eq!(json["msg"], "资源未找到");
        assert!(json.get("data").is_none());

        let resp: Response<u64> = Response::failed(ErrCode::BadRequest, Some("bad id"));
        assert_eq!(resp.msg, "bad id");
    }

    #[test]
    fn test_success_response() {
        let resp = Response::success(42u64);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"], 42);
    }
}
