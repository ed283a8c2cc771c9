// ==========================================
// 车队管理后台核心 - 冲突处理器实现
// ==========================================
// 职责: 检测同一导入文件内重复的唯一键（车牌、证件号等）
// 策略: 保留首次出现，后续重复行作为跳过行报告
// ==========================================

use crate::import::import_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::HashMap;

pub struct ConflictHandler;

impl ConflictHandlerTrait for ConflictHandler {
    /// 检测同一文件内重复键
    ///
    /// # 返回
    /// - Vec<(行号, 键)>: 重复记录列表（不包括第一次出现）
    fn detect_duplicates(&self, keys: &[(usize, String)]) -> Vec<(usize, String)> {
        let mut first_occurrence: HashMap<String, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        for (row_number, key) in keys {
            let normalized = key.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            if first_occurrence.contains_key(&normalized) {
                duplicates.push((*row_number, key.clone()));
            } else {
                first_occurrence.insert(normalized, *row_number);
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[(usize, &str)]) -> Vec<(usize, String)> {
        items.iter().map(|(r, k)| (*r, k.to_string())).collect()
    }

    #[test]
    fn test_detect_duplicates_none() {
        let handler = ConflictHandler;
        let duplicates = handler.detect_duplicates(&keys(&[(2, "AB-123"), (3, "CD-456")]));
        assert!(duplicates.is_empty());
    }

    #[test]
    fn test_detect_duplicates_found() {
        let handler = ConflictHandler;
        let duplicates = handler.detect_duplicates(&keys(&[
            (2, "AB-123"),
            (3, "CD-456"),
            (4, "ab-123 "), // 大小写/空白不同也视为重复
            (5, "AB-123"),
        ]));

        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0].0, 4);
        assert_eq!(duplicates[1].0, 5);
    }

    #[test]
    fn test_blank_keys_ignored() {
        let handler = ConflictHandler;
        let duplicates = handler.detect_duplicates(&keys(&[(2, ""), (3, "  ")]));
        assert!(duplicates.is_empty());
    }
}
