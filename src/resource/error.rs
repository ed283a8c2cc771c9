// ==========================================
// 车队管理后台核心 - 资源页错误类型
// ==========================================

use crate::import::ImportError;
use crate::table::TableError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("远端服务调用失败: {0}")]
    Service(String),

    #[error("记录不存在: {0}")]
    NotFound(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ResourceResult<T> = Result<T, ResourceError>;
