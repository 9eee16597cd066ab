//! Badge counts for the Headers and Params tabs.

use crate::model::KeyValue;

/// Whether a row carries a usable key. Keys that are empty or only
/// whitespace are placeholders for rows the user has not filled in yet.
pub fn has_key(entry: &KeyValue) -> bool {
    !entry.key.trim().is_empty()
}

fn count_keyed(entries: &[KeyValue]) -> usize {
    entries.iter().filter(|e| has_key(e)).count()
}

/// Number of headers with a key across the action's own headers, the
/// datasource defaults and the auto-generated headers.
pub fn get_headers_count(
    action_headers: &[KeyValue],
    datasource_headers: &[KeyValue],
    auto_generated_headers: &[KeyValue],
) -> usize {
    count_keyed(action_headers) + count_keyed(datasource_headers) + count_keyed(auto_generated_headers)
}

/// Number of keyed rows across the action's own params and the datasource
/// headers. The datasource headers are the inherited rows the Params badge
/// is defined over.
pub fn get_params_count(action_params: &[KeyValue], datasource_headers: &[KeyValue]) -> usize {
    count_keyed(action_params) + count_keyed(datasource_headers)
}
