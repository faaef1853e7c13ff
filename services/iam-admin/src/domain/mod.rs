//! 领域层

/// 定义基于 UUID v7 的强类型 ID
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub ::uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(::uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(::uuid::Uuid::parse_str(s)?))
            }
        }
    };
}

pub mod department;
pub mod role;
pub mod search;
pub mod unit_of_work;
pub mod user;

/// 计算请求 ID 中未命中的部分（保持请求顺序、去重）
pub fn missing_ids<T, I>(requested: &[T], found: I) -> Vec<T>
where
    T: Copy + Eq + std::hash::Hash,
    I: IntoIterator<Item = T>,
{
    let found: std::collections::HashSet<T> = found.into_iter().collect();
    let mut seen = std::collections::HashSet::new();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id) && seen.insert(*id))
        .collect()
}

/// 以逗号拼接标识符，用于错误信息
pub fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
