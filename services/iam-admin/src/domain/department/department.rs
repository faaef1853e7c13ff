//! 部门实体

use admin_common::{AuditInfo, UserId};

use crate::domain::search::SortableField;

define_id!(
    /// 部门 ID
    DepartmentId
);

/// 部门实体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: DepartmentId,
    /// 全局唯一
    pub name: String,
    pub country: String,
    /// 归属用户（可选）
    pub user_id: Option<UserId>,
    pub audit_info: AuditInfo,
}

impl Department {
    pub const SORTABLE_FIELDS: &'static [SortableField] = &[
        SortableField::new("id", "id"),
        SortableField::new("name", "name"),
        SortableField::new("country", "country"),
        SortableField::new("createdAt", "created_at"),
        SortableField::new("updatedAt", "updated_at"),
    ];

    pub fn new(name: String, country: String) -> Self {
        Self {
            id: DepartmentId::new(),
            name,
            country,
            user_id: None,
            audit_info: AuditInfo::default(),
        }
    }

    /// 部分更新，返回名称是否变化
    pub fn apply_update(&mut self, name: Option<String>, country: Option<String>) -> bool {
        let mut name_changed = false;
        if let Some(name) = name
            && name != self.name
        {
            self.name = name;
            name_changed = true;
        }
        if let Some(country) = country {
            self.country = country;
        }
        self.audit_info.touch();
        name_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_update_reports_name_change() {
        let mut dept = Department::new("Finance".to_string(), "US".to_string());
        let created_at = dept.audit_info.created_at;

        assert!(!dept.apply_update(Some("Finance".to_string()), Some("DE".to_string())));
        assert_eq!(dept.country, "DE");

        assert!(dept.apply_update(Some("Finance-2".to_string()), None));
        assert_eq!(dept.name, "Finance-2");
        assert_eq!(dept.audit_info.created_at, created_at);
    }

    #[test]
    fn test_id_parse() {
        let id = DepartmentId::new();
        assert_eq!(id.to_string().parse::<DepartmentId>().unwrap(), id);
        assert!("not-a-uuid".parse::<DepartmentId>().is_err());
    }
}
