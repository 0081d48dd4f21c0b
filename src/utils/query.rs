//! Query-string helpers

use actix_web::web;

/// 取查询串中 `key` 的最后一个值
///
/// 重复的键以最后一次出现为准；无法解析的查询串视为没有参数。
pub fn last_query_value(query: &str, key: &str) -> Option<String> {
    web::Query::<Vec<(String, String)>>::from_query(query)
        .map(web::Query::into_inner)
        .unwrap_or_default()
        .into_iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}
