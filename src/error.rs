//! 错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TripError {
    /// 网络层或 HTTP 状态错误
    #[error("请求失败: {0}")]
    TransportFailure(String),

    /// 响应成功但内容不符合预期
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),

    /// 所有备用服务器均失败
    #[error("服务不可用: {0}")]
    ServiceUnavailable(String),

    /// 本地存储内容损坏
    #[error("存储数据损坏: {0}")]
    MalformedState(String),

    #[error("无效坐标: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// 景点目录加载失败
    #[error("景点数据加载失败: {0}")]
    CatalogUnavailable(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = TripError> = std::result::Result<T, E>;
