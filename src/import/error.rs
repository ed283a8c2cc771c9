// ==========================================
// 车队管理后台核心 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 错误不会原样抛给最终用户，统一经 user_message() 转为提示文本
// ==========================================

use crate::i18n;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {ext}（仅支持 {accepted}）")]
    UnsupportedFormat { ext: String, accepted: String },

    #[error("文件过大: {size} 字节（上限 {max} 字节）")]
    FileTooLarge { size: u64, max: u64 },

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件中没有表头或数据行")]
    EmptyFile,

    // ===== 映射相关错误 =====
    #[error("必填字段未映射: {}", .0.join(", "))]
    RequiredFieldsUnmapped(Vec<String>),

    #[error("未知的目标字段: {0}")]
    UnknownField(String),

    #[error("文件中不存在该列: {0}")]
    UnknownHeader(String),

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 向导流程错误 =====
    #[error("没有可导入的有效行")]
    NoValidRows,

    #[error("步骤 {step} 不允许操作 {action}")]
    InvalidStep { action: String, step: String },

    #[error("解析结果已过期 (会话 {0})")]
    StaleResult(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 转换为面向用户的提示文本（当前语言）
    pub fn user_message(&self) -> String {
        match self {
            ImportError::FileNotFound(path) => {
                i18n::t_with_args("import.file_not_found", &[("path", path)])
            }
            ImportError::UnsupportedFormat { ext, accepted } => i18n::t_with_args(
                "import.unsupported_format",
                &[("ext", ext), ("accepted", accepted)],
            ),
            ImportError::FileTooLarge { size, max } => i18n::t_with_args(
                "import.file_too_large",
                &[("size", &size.to_string()), ("max", &max.to_string())],
            ),
            ImportError::FileReadError(reason)
            | ImportError::ExcelParseError(reason)
            | ImportError::CsvParseError(reason) => {
                i18n::t_with_args("import.parse_failed", &[("reason", reason)])
            }
            ImportError::EmptyFile => i18n::t("import.empty_file"),
            ImportError::RequiredFieldsUnmapped(fields) => i18n::t_with_args(
                "import.required_unmapped",
                &[("fields", &fields.join(", "))],
            ),
            ImportError::UnknownField(field) => {
                i18n::t_with_args("import.unknown_field", &[("field", field)])
            }
            ImportError::UnknownHeader(header) => {
                i18n::t_with_args("import.unknown_header", &[("header", header)])
            }
            ImportError::TypeConversionError { .. } => {
                i18n::t_with_args("import.parse_failed", &[("reason", &self.to_string())])
            }
            ImportError::NoValidRows => i18n::t("import.no_valid_rows"),
            ImportError::InvalidStep { .. } => i18n::t("import.invalid_step"),
            ImportError::StaleResult(_) => i18n::t("import.stale_result"),
            ImportError::InternalError(reason) => {
                i18n::t_with_args("import.internal_error", &[("reason", reason)])
            }
            ImportError::Other(err) => {
                i18n::t_with_args("import.internal_error", &[("reason", &err.to_string())])
            }
        }
    }

    /// 是否属于文件解析类错误（向导停留在上传步骤）
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::UnsupportedFormat { .. }
                | ImportError::FileTooLarge { .. }
                | ImportError::FileReadError(_)
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
                | ImportError::EmptyFile
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<tokio::task::JoinError>（后台解析任务异常退出）
impl From<tokio::task::JoinError> for ImportError {
    fn from(err: tokio::task::JoinError) -> Self {
        ImportError::InternalError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_classification() {
        assert!(ImportError::EmptyFile.is_parse_error());
        assert!(ImportError::CsvParseError("bad".into()).is_parse_error());
        assert!(!ImportError::NoValidRows.is_parse_error());
        assert!(!ImportError::RequiredFieldsUnmapped(vec!["车牌".into()]).is_parse_error());
    }

    #[test]
    fn test_user_message_never_empty() {
        let errors = vec![
            ImportError::EmptyFile,
            ImportError::NoValidRows,
            ImportError::FileTooLarge { size: 20, max: 10 },
            ImportError::Other(anyhow::anyhow!("boom")),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ImportError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(matches!(err, ImportError::FileReadError(_)));
    }
}
