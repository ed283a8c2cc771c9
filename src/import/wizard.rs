// ==========================================
// 车队管理后台核心 - 导入向导状态机
// ==========================================
// 步骤: Upload → Map → Preview（线性，不可跳步，可回退）
// 生命周期: 打开与关闭对话框时都会 reset，每次 reset 生成新的会话 ID；
//           解析结果通过 ParseTicket 绑定会话，会话已重置的结果直接丢弃
// ==========================================

use crate::config::ConfigReader;
use crate::i18n;
use crate::import::conflict_handler::ConflictHandler;
use crate::import::error::{ImportError, ImportResult};
use crate::import::field_mapper::{
    ColumnMapping, FieldDescriptor, FieldMapper, MappedRecord, SkipReason,
};
use crate::import::file_parser::{ParsedSheet, RawRow, UniversalFileParser, UploadedFile};
use crate::import::import_trait::ConflictHandler as _;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 列映射下拉框中 "忽略此字段" 的哨兵值
pub const IGNORE_SENTINEL: &str = "__ignore__";

/// 行转换函数（Err 表示跳过该行）
pub type TransformFn<T> = Box<dyn Fn(&MappedRecord) -> Result<T, SkipReason> + Send + Sync>;

/// 唯一键提取函数
pub type KeyFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

// ==========================================
// 步骤与会话
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStep {
    Upload,
    Map,
    Preview,
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStep::Upload => write!(f, "UPLOAD"),
            ImportStep::Map => write!(f, "MAP"),
            ImportStep::Preview => write!(f, "PREVIEW"),
        }
    }
}

/// 解析凭证（绑定发起解析时的会话）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTicket {
    session_id: Uuid,
}

impl ParseTicket {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_number: usize,
    pub reason: SkipReason,
}

/// 转换报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub skipped: Vec<SkippedRow>,
}

/// 向导会话状态（每次 reset 全部清空）
#[derive(Debug, Clone)]
pub struct ImportSession<T> {
    pub id: Uuid,
    pub step: ImportStep,
    pub file_name: Option<String>,
    pub parsing: bool,
    pub headers: Vec<String>,
    pub raw_rows: Vec<RawRow>,
    pub mapping: ColumnMapping,
    pub preview_rows: Vec<T>,
    pub report: ImportReport,
    /// 最近一次面向用户的错误提示
    pub error: Option<String>,
}

impl<T> ImportSession<T> {
    fn fresh(fields: &[FieldDescriptor]) -> Self {
        Self {
            id: Uuid::new_v4(),
            step: ImportStep::Upload,
            file_name: None,
            parsing: false,
            headers: Vec::new(),
            raw_rows: Vec::new(),
            mapping: ColumnMapping::empty(fields),
            preview_rows: Vec::new(),
            report: ImportReport::default(),
            error: None,
        }
    }
}

// ==========================================
// 视图
// ==========================================

/// 映射步骤中单个字段的下拉框
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingFieldView {
    pub key: String,
    pub label: String,
    pub hint: Option<String>,
    pub required: bool,
    /// 当前选择（未映射时为 IGNORE_SENTINEL）
    pub selected: String,
    /// 可选表头（不含哨兵）
    pub options: Vec<String>,
}

/// 预览步骤视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewView<'a, T> {
    pub rows: &'a [T],
    pub total: usize,
    pub hidden_count: usize,
    pub hidden_note: Option<String>,
    pub skipped_count: usize,
    pub skipped_note: Option<String>,
}

/// 确认导入的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedImport<T> {
    pub rows: Vec<T>,
    pub report: ImportReport,
}

struct UniqueKey<T> {
    field: String,
    key: KeyFn<T>,
}

// ==========================================
// ImportWizard - 导入向导
// ==========================================
pub struct ImportWizard<T> {
    fields: Vec<FieldDescriptor>,
    sample_headers: Vec<String>,
    transform: TransformFn<T>,
    unique_key: Option<UniqueKey<T>>,
    parser: UniversalFileParser,
    preview_limit: usize,
    open: bool,
    session: ImportSession<T>,
}

impl ImportWizard<MappedRecord> {
    /// 不做类型转换的向导（全部映射单元格为空的行被丢弃）
    pub fn passthrough(fields: Vec<FieldDescriptor>, config: &dyn ConfigReader) -> Self {
        Self::new(fields, config, |record: &MappedRecord| {
            if record.is_blank() {
                Err(SkipReason::new("空行"))
            } else {
                Ok(record.clone())
            }
        })
    }
}

impl<T> ImportWizard<T> {
    /// 创建向导
    ///
    /// # 参数
    /// - fields: 目标字段
    /// - config: 预览上限、允许的扩展名、文件大小上限
    /// - transform: 行转换（返回 Err 的行被跳过并记入报告）
    pub fn new<F>(fields: Vec<FieldDescriptor>, config: &dyn ConfigReader, transform: F) -> Self
    where
        F: Fn(&MappedRecord) -> Result<T, SkipReason> + Send + Sync + 'static,
    {
        let session = ImportSession::fresh(&fields);
        Self {
            fields,
            sample_headers: Vec::new(),
            transform: Box::new(transform),
            unique_key: None,
            parser: UniversalFileParser::from_config(config),
            preview_limit: config.preview_limit(),
            open: false,
            session,
        }
    }

    /// 示例表头（与字段按位置对应，仅用于自动猜测）
    pub fn with_sample_headers(mut self, sample_headers: Vec<String>) -> Self {
        self.sample_headers = sample_headers;
        self
    }

    /// 唯一键（同一文件内重复的行只保留第一行）
    pub fn with_unique_key<F>(mut self, field: impl Into<String>, key: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.unique_key = Some(UniqueKey {
            field: field.into(),
            key: Box::new(key),
        });
        self
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn session(&self) -> &ImportSession<T> {
        &self.session
    }

    pub fn step(&self) -> ImportStep {
        self.session.step
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// 文件解析器（用于在向导外部异步解析）
    pub fn parser(&self) -> UniversalFileParser {
        self.parser.clone()
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 打开对话框（从干净的上传步骤开始）
    pub fn open(&mut self) {
        self.reset();
        self.open = true;
        info!(session_id = %self.session.id, "导入向导已打开");
    }

    /// 关闭对话框（取消或确认后），丢弃全部进度
    pub fn close(&mut self) {
        self.reset();
        self.open = false;
        debug!("导入向导已关闭");
    }

    /// 重置会话（生成新会话 ID，使未完成的解析失效）
    pub fn reset(&mut self) {
        if self.session.parsing {
            debug!(session_id = %self.session.id, "会话重置时仍有解析进行中，其结果将被丢弃");
        }
        self.session = ImportSession::fresh(&self.fields);
    }

    fn ensure_step(&self, action: &str, expected: ImportStep) -> ImportResult<()> {
        if self.session.step != expected {
            return Err(ImportError::InvalidStep {
                action: action.to_string(),
                step: self.session.step.to_string(),
            });
        }
        Ok(())
    }

    fn fail(&mut self, err: ImportError) -> ImportError {
        self.session.error = Some(err.user_message());
        err
    }

    // ==========================================
    // Upload
    // ==========================================

    /// 开始解析（仅上传步骤）
    pub fn begin_upload(&mut self, file_name: impl Into<String>) -> ImportResult<ParseTicket> {
        self.ensure_step("upload", ImportStep::Upload)?;
        self.session.file_name = Some(file_name.into());
        self.session.parsing = true;
        self.session.error = None;
        Ok(ParseTicket {
            session_id: self.session.id,
        })
    }

    /// 应用解析结果
    ///
    /// - 凭证对应的会话已重置: 丢弃，返回 StaleResult
    /// - 解析失败或空文件: 停留在上传步骤并记录提示
    /// - 成功: 自动猜测映射并进入映射步骤
    pub fn finish_upload(
        &mut self,
        ticket: ParseTicket,
        result: ImportResult<ParsedSheet>,
    ) -> ImportResult<ImportStep> {
        if ticket.session_id != self.session.id {
            warn!(
                ticket_session = %ticket.session_id,
                current_session = %self.session.id,
                "丢弃过期的解析结果"
            );
            return Err(ImportError::StaleResult(ticket.session_id.to_string()));
        }
        if !self.session.parsing {
            return Err(ImportError::InvalidStep {
                action: "finish_upload".to_string(),
                step: self.session.step.to_string(),
            });
        }
        self.session.parsing = false;

        let sheet = match result {
            Ok(sheet) if sheet.is_empty() => return Err(self.fail(ImportError::EmptyFile)),
            Ok(sheet) => sheet,
            Err(e) => {
                warn!(error = %e, "文件解析失败");
                return Err(self.fail(e));
            }
        };

        let mapping = FieldMapper.auto_guess(&self.fields, &self.sample_headers, &sheet.headers);
        info!(
            headers = sheet.headers.len(),
            rows = sheet.rows.len(),
            mapped = mapping.mapped_count(),
            "解析完成，进入列映射"
        );

        self.session.headers = sheet.headers;
        self.session.raw_rows = sheet.rows;
        self.session.mapping = mapping;
        self.session.step = ImportStep::Map;
        self.session.error = None;
        Ok(ImportStep::Map)
    }

    /// 上传并解析文件（解析在阻塞线程池执行）
    #[instrument(skip(self, file), fields(file = %file.name))]
    pub async fn upload(&mut self, file: UploadedFile) -> ImportResult<ImportStep> {
        let ticket = self.begin_upload(file.name.clone())?;
        let result = self.parser.parse_async(file).await;
        self.finish_upload(ticket, result)
    }

    // ==========================================
    // Map
    // ==========================================

    /// 修改字段映射（None 表示忽略该字段）
    pub fn set_mapping(&mut self, field_key: &str, header: Option<String>) -> ImportResult<()> {
        self.ensure_step("set_mapping", ImportStep::Map)?;
        debug!(field = field_key, header = ?header, "修改列映射");

        // 先在副本上修改并校验，失败时保留原映射
        let mut mapping = self.session.mapping.clone();
        if !mapping.set(field_key, header) {
            return Err(ImportError::UnknownField(field_key.to_string()));
        }
        FieldMapper.validate(&mapping, &self.session.headers)?;

        self.session.mapping = mapping;
        Ok(())
    }

    /// 以下拉控件值修改映射（IGNORE_SENTINEL 表示忽略）
    pub fn set_mapping_control_value(&mut self, field_key: &str, raw: &str) -> ImportResult<()> {
        let header = if raw == IGNORE_SENTINEL || raw.is_empty() {
            None
        } else {
            Some(raw.to_string())
        };
        self.set_mapping(field_key, header)
    }

    pub fn mapping_view(&self) -> Vec<MappingFieldView> {
        self.fields
            .iter()
            .map(|field| MappingFieldView {
                key: field.key.clone(),
                label: field.label.clone(),
                hint: field.hint.clone(),
                required: field.required,
                selected: self
                    .session
                    .mapping
                    .get(&field.key)
                    .unwrap_or(IGNORE_SENTINEL)
                    .to_string(),
                options: self.session.headers.clone(),
            })
            .collect()
    }

    // ==========================================
    // 前进 / 后退
    // ==========================================

    /// 下一步（仅映射步骤可前进）
    ///
    /// 必填字段未映射时停留在映射步骤，不计算预览
    pub fn next(&mut self) -> ImportResult<ImportStep> {
        self.ensure_step("next", ImportStep::Map)?;

        let unmapped = self.session.mapping.unmapped_required(&self.fields);
        if !unmapped.is_empty() {
            warn!(fields = ?unmapped, "必填字段未映射");
            return Err(self.fail(ImportError::RequiredFieldsUnmapped(unmapped)));
        }

        let (rows, report) = self.build_preview();
        info!(
            total = report.total_rows,
            accepted = report.accepted,
            skipped = report.skipped.len(),
            "预览已生成"
        );
        self.session.preview_rows = rows;
        self.session.report = report;
        self.session.step = ImportStep::Preview;
        self.session.error = None;
        Ok(ImportStep::Preview)
    }

    /// 上一步: Preview → Map（保留映射）；Map → Upload（清空文件内容）
    pub fn back(&mut self) -> ImportResult<ImportStep> {
        match self.session.step {
            ImportStep::Preview => {
                self.session.preview_rows = Vec::new();
                self.session.report = ImportReport::default();
                self.session.step = ImportStep::Map;
            }
            ImportStep::Map => {
                self.session.headers = Vec::new();
                self.session.raw_rows = Vec::new();
                self.session.mapping = ColumnMapping::empty(&self.fields);
                self.session.file_name = None;
                self.session.step = ImportStep::Upload;
            }
            ImportStep::Upload => {
                return Err(ImportError::InvalidStep {
                    action: "back".to_string(),
                    step: self.session.step.to_string(),
                })
            }
        }
        self.session.error = None;
        Ok(self.session.step)
    }

    /// 投影 + 转换 + 去重
    fn build_preview(&self) -> (Vec<T>, ImportReport) {
        let session = &self.session;
        let mut accepted: Vec<(usize, T)> = Vec::new();
        let mut skipped: Vec<SkippedRow> = Vec::new();

        for raw in &session.raw_rows {
            let record = FieldMapper.project(&session.mapping, &session.headers, raw);
            match (self.transform)(&record) {
                Ok(value) => accepted.push((raw.row_number, value)),
                Err(reason) => {
                    debug!(row = raw.row_number, reason = %reason, "跳过行");
                    skipped.push(SkippedRow {
                        row_number: raw.row_number,
                        reason,
                    });
                }
            }
        }

        if let Some(unique) = &self.unique_key {
            let keys: Vec<(usize, String)> = accepted
                .iter()
                .map(|(row_number, value)| (*row_number, (unique.key)(value)))
                .collect();
            let duplicates = ConflictHandler.detect_duplicates(&keys);
            if !duplicates.is_empty() {
                let duplicate_rows: HashSet<usize> = duplicates.iter().map(|(r, _)| *r).collect();
                for (row_number, key) in &duplicates {
                    skipped.push(SkippedRow {
                        row_number: *row_number,
                        reason: SkipReason::duplicate(&unique.field, key),
                    });
                }
                accepted.retain(|(row_number, _)| !duplicate_rows.contains(row_number));
            }
        }

        skipped.sort_by_key(|s| s.row_number);
        let report = ImportReport {
            total_rows: session.raw_rows.len(),
            accepted: accepted.len(),
            skipped,
        };
        (accepted.into_iter().map(|(_, value)| value).collect(), report)
    }

    // ==========================================
    // Preview
    // ==========================================

    /// 预览（最多 preview_limit 行）
    pub fn preview(&self) -> PreviewView<'_, T> {
        let rows = &self.session.preview_rows;
        let shown = rows.len().min(self.preview_limit);
        let hidden_count = rows.len() - shown;
        let skipped_count = self.session.report.skipped.len();

        PreviewView {
            rows: &rows[..shown],
            total: rows.len(),
            hidden_count,
            hidden_note: (hidden_count > 0)
                .then(|| i18n::t_count("import.hidden_rows", hidden_count)),
            skipped_count,
            skipped_note: (skipped_count > 0)
                .then(|| i18n::t_count("import.skipped_rows", skipped_count)),
        }
    }

    pub fn report(&self) -> &ImportReport {
        &self.session.report
    }

    /// 确认导入
    ///
    /// 返回完整的转换结果（不限于预览行）并关闭向导；
    /// 结果为空时阻止确认并停留在预览步骤
    pub fn confirm(&mut self) -> ImportResult<ConfirmedImport<T>> {
        self.ensure_step("confirm", ImportStep::Preview)?;
        if self.session.preview_rows.is_empty() {
            return Err(self.fail(ImportError::NoValidRows));
        }

        let rows = std::mem::take(&mut self.session.preview_rows);
        let report = std::mem::take(&mut self.session.report);
        info!(
            session_id = %self.session.id,
            rows = rows.len(),
            skipped = report.skipped.len(),
            "确认导入"
        );
        self.close();
        Ok(ConfirmedImport { rows, report })
    }
}
