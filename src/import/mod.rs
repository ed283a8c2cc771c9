// ==========================================
// 车队管理后台核心 - 导入层
// ==========================================
// 职责: 表格文件 → 列映射 → 类型化记录
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod conflict_handler;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod import_trait;
pub mod wizard;

// 重导出核心类型
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{
    normalize_label, ColumnMapping, FieldDescriptor, FieldMapper, MappedRecord, SkipReason,
};
pub use file_parser::{
    normalize_headers, CsvParser, ExcelParser, ParsedSheet, RawRow, UniversalFileParser,
    UploadedFile, WorkbookFormat,
};
pub use wizard::{
    ConfirmedImport, ImportReport, ImportSession, ImportStep, ImportWizard, MappingFieldView,
    ParseTicket, PreviewView, SkippedRow, TransformFn, IGNORE_SENTINEL,
};

// 重导出 Trait 接口
pub use import_trait::{ConflictHandler, DataCleaner, FileParser};
