use serde_json::Value;

/// Finds the element at `path`, where each nesting level is separated by `separator`.
///
/// `element_with_path(&body, "content|idData|createdBy", '|')` walks
/// `body.content.idData.createdBy`. Returns `None` as soon as a segment is
/// missing or an intermediate element is not an object.
pub fn element_with_path<'a>(value: &'a Value, path: &str, separator: char) -> Option<&'a Value> {
    path.split(separator)
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}
