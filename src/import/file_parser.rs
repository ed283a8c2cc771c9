// ==========================================
// 车队管理后台核心 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls，仅第一个工作表) / CSV (.csv)
// 输出: 规范化表头 + 非空原始行
// 表头规则: 去除首尾空白；空表头 → "Column N"；重复表头追加 " (2)"
// 日期单元格: 输出 ISO 文本 (YYYY-MM-DD 或 YYYY-MM-DD HH:MM:SS)
// ==========================================

use crate::config::ConfigReader;
use crate::import::error::{ImportError, ImportResult};
use crate::import::import_trait::FileParser;
use calamine::{Data, DataType, Reader, Xls, Xlsx};
use chrono::Timelike;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ==========================================
// 解析结果
// ==========================================

/// 原始数据行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// 文件中的行号（表头为第 1 行）
    pub row_number: usize,
    /// 与表头一一对应的单元格（已去除首尾空白）
    pub values: Vec<String>,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }
}

/// 解析后的工作表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedSheet {
    /// 由原始单元格矩阵构建（第一行为表头，行号按矩阵下标）
    pub fn from_matrix(matrix: Vec<Vec<String>>) -> ImportResult<Self> {
        Self::from_numbered_rows(
            matrix
                .into_iter()
                .enumerate()
                .map(|(idx, cells)| (idx + 1, cells)),
        )
    }

    /// 由 (文件行号, 单元格) 序列构建（第一项为表头）
    pub fn from_numbered_rows<I>(lines: I) -> ImportResult<Self>
    where
        I: IntoIterator<Item = (usize, Vec<String>)>,
    {
        let mut lines = lines.into_iter();
        let (_, header_cells) = lines.next().ok_or(ImportError::EmptyFile)?;
        if header_cells.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportError::EmptyFile);
        }
        let headers = normalize_headers(header_cells);

        let mut rows = Vec::new();
        for (row_number, cells) in lines {
            let mut values: Vec<String> = cells
                .into_iter()
                .take(headers.len())
                .map(|c| c.trim().to_string())
                .collect();
            values.resize(headers.len(), String::new());

            let row = RawRow { row_number, values };
            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }
}

/// 表头规范化
pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, cell) in raw.into_iter().enumerate() {
        let trimmed = cell.trim();
        let base = if trimmed.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while seen.contains(&candidate) {
            candidate = format!("{} ({})", base, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

// ==========================================
// 上传文件
// ==========================================

/// 上传文件（文件名 + 完整内容）
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// 从磁盘读取
    pub fn from_path<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// 小写扩展名（不含点）
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头自行规范化
            .flexible(true) // 允许行长度不一致
            .from_reader(content);

        // 行号取记录起始的物理行（引号内换行不计入后续记录）
        let mut lines = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);
            lines.push((line, record.iter().map(str::to_string).collect()));
        }

        ParsedSheet::from_numbered_rows(lines)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    Xlsx,
    Xls,
}

pub struct ExcelParser {
    pub format: WorkbookFormat,
}

impl ExcelParser {
    pub fn xlsx() -> Self {
        Self {
            format: WorkbookFormat::Xlsx,
        }
    }

    pub fn xls() -> Self {
        Self {
            format: WorkbookFormat::Xls,
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let cursor = Cursor::new(bytes);
        let lines = match self.format {
            WorkbookFormat::Xlsx => {
                let mut workbook: Xlsx<_> = Xlsx::new(cursor)?;
                first_sheet_matrix(&mut workbook)?
            }
            WorkbookFormat::Xls => {
                let mut workbook: Xls<_> = Xls::new(cursor)?;
                first_sheet_matrix(&mut workbook)?
            }
        };
        ParsedSheet::from_numbered_rows(lines)
    }
}

/// 读取第一个工作表为 (工作表行号, 单元格文本) 序列
fn first_sheet_matrix<RS, R>(workbook: &mut R) -> ImportResult<Vec<(usize, Vec<String>)>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    ImportError: From<R::Error>,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    // 数据区域可能不从 A1 开始
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    Ok(range
        .rows()
        .enumerate()
        .map(|(idx, row)| (first_row + idx + 1, row.iter().map(cell_text).collect()))
        .collect())
}

/// 单元格文本；日期/时间单元格转为 ISO 文本，其余按原样显示
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            if let Some(dt) = cell.as_datetime() {
                let format = if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
                    "%Y-%m-%d"
                } else {
                    "%Y-%m-%d %H:%M:%S"
                };
                dt.format(format).to_string()
            } else if let Some(date) = cell.as_date() {
                date.format("%Y-%m-%d").to_string()
            } else {
                cell.to_string()
            }
        }
        _ => cell.to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone)]
pub struct UniversalFileParser {
    accepted_extensions: Vec<String>,
    max_file_bytes: u64,
}

impl UniversalFileParser {
    pub fn new(accepted_extensions: Vec<String>, max_file_bytes: u64) -> Self {
        Self {
            accepted_extensions: accepted_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_file_bytes,
        }
    }

    pub fn from_config(config: &dyn ConfigReader) -> Self {
        Self::new(config.accepted_extensions(), config.max_file_bytes())
    }

    pub fn accepted_extensions(&self) -> &[String] {
        &self.accepted_extensions
    }

    /// 同步解析
    ///
    /// # 错误
    /// - UnsupportedFormat: 扩展名不在允许列表
    /// - FileTooLarge: 超出大小上限
    /// - EmptyFile: 无表头或无数据行
    #[instrument(skip(self, file), fields(file = %file.name, size = file.size()))]
    pub fn parse(&self, file: &UploadedFile) -> ImportResult<ParsedSheet> {
        let ext = file.extension();
        if !self.accepted_extensions.contains(&ext) {
            return Err(ImportError::UnsupportedFormat {
                ext,
                accepted: self.accepted_extensions.join("/"),
            });
        }
        if file.size() > self.max_file_bytes {
            return Err(ImportError::FileTooLarge {
                size: file.size(),
                max: self.max_file_bytes,
            });
        }

        let parser: Box<dyn FileParser> = match ext.as_str() {
            "xlsx" => Box::new(ExcelParser::xlsx()),
            "xls" => Box::new(ExcelParser::xls()),
            _ => Box::new(CsvParser),
        };

        let sheet = parser.parse_bytes(&file.bytes)?;
        if sheet.is_empty() {
            warn!(headers = sheet.headers.len(), "文件无有效数据行");
            return Err(ImportError::EmptyFile);
        }

        info!(
            headers = sheet.headers.len(),
            rows = sheet.rows.len(),
            "文件解析完成"
        );
        Ok(sheet)
    }

    /// 异步解析（CPU 密集部分在阻塞线程池执行）
    pub async fn parse_async(&self, file: UploadedFile) -> ImportResult<ParsedSheet> {
        let parser = self.clone();
        debug!(file = %file.name, "提交后台解析任务");
        tokio::task::spawn_blocking(move || parser.parse(&file)).await?
    }
}
