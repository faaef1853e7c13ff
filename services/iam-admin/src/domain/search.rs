//! 搜索 / 分页 / 排序
//!
//! 可排序字段是每个实体静态声明的白名单，排序列名只会来自这里。

use admin_common::{PageRequest, SortOrder, SortRequest};
use admin_errors::{AppError, AppResult};

/// 可排序字段：API 字段名 -> 数据库列名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortableField {
    pub name: &'static str,
    pub column: &'static str,
}

impl SortableField {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self { name, column }
    }
}

/// 搜索请求（来自 API）
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub value: Option<String>,
    pub page: PageRequest,
    pub sort: SortRequest,
}

/// 校验后的搜索条件（交给仓储）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// 搜索值，空串视为不过滤
    pub value: Option<String>,
    pub sort_field: &'static str,
    pub sort_column: &'static str,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

impl SearchQuery {
    /// 校验分页与排序字段
    pub fn resolve(self, fields: &[SortableField]) -> AppResult<SearchCriteria> {
        self.page.validate().map_err(AppError::validation)?;

        let field = fields
            .iter()
            .find(|f| f.name == self.sort.field)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Invalid sort field '{}'. Allowed: {}",
                    self.sort.field,
                    fields.iter().map(|f| f.name).collect::<Vec<_>>().join(", ")
                ))
            })?;

        Ok(SearchCriteria {
            value: self.value.filter(|v| !v.is_empty()),
            sort_field: field.name,
            sort_column: field.column,
            sort_order: self.sort.order,
            page: self.page,
        })
    }
}

impl SearchCriteria {
    /// 子串匹配的 LIKE 模式（转义通配符）
    pub fn like_pattern(&self) -> Option<String> {
        self.value.as_ref().map(|v| {
            let escaped = v
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }

    /// 内存实现使用的匹配逻辑
    pub fn matches(&self, candidates: &[&str], case_insensitive: bool) -> bool {
        match &self.value {
            None => true,
            Some(v) if case_insensitive => {
                let v = v.to_lowercase();
                candidates.iter().any(|c| c.to_lowercase().contains(&v))
            }
            Some(v) => candidates.iter().any(|c| c.contains(v.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[SortableField] = &[
        SortableField::new("name", "name"),
        SortableField::new("createdAt", "created_at"),
    ];

    #[test]
    fn test_resolve_maps_field_to_column() {
        let criteria = SearchQuery::default().resolve(FIELDS).unwrap();
        assert_eq!(criteria.sort_column, "created_at");
        assert_eq!(criteria.sort_order, SortOrder::Desc);
        assert_eq!(criteria.value, None);
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let query = SearchQuery {
            sort: SortRequest {
                field: "password".to_string(),
                order: SortOrder::Asc,
            },
            ..Default::default()
        };
        assert!(matches!(query.resolve(FIELDS), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_page_bounds_are_checked() {
        let query = SearchQuery {
            page: PageRequest::new(0, 10),
            ..Default::default()
        };
        assert!(matches!(query.resolve(FIELDS), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let criteria = SearchQuery {
            value: Some("50%_off".to_string()),
            ..Default::default()
        }
        .resolve(FIELDS)
        .unwrap();
        assert_eq!(criteria.like_pattern().unwrap(), "%50\\%\\_off%");
    }

    #[test]
    fn test_matches_case_sensitivity() {
        let criteria = SearchQuery {
            value: Some("adm".to_string()),
            ..Default::default()
        }
        .resolve(FIELDS)
        .unwrap();
        assert!(criteria.matches(&["Admin", "admin-role"], false));
        assert!(!criteria.matches(&["ADMIN"], false));
        assert!(criteria.matches(&["ADMIN"], true));
    }
}
