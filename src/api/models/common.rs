// 通用的数据结构定义

use serde::{Deserialize, Serialize};

/// 通用的API响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 错误码，0表示成功，非0表示失败
    pub code: i32,
    /// 错误消息，成功时为"success"
    pub msg: String,
    /// 响应数据，错误时为None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

/// 空响应类型（用于无响应数据的API）
#[derive(Debug, Serialize, Deserialize)]
pub struct EmptyResponse {}

/// 分页查询参数，无法解析的值按缺省处理
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        parse_lenient(self.page.as_deref(), 1)
    }

    pub fn per_page(&self) -> i64 {
        parse_lenient(self.per_page.as_deref(), 10)
    }
}

fn parse_lenient(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// 带分页的响应数据
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}
