/// `rpc:` override markers in trailing field comments.
///
/// A model field written as `UserID int64 //rpc:Uid` binds to the RPC field
/// `Uid` regardless of its own name.
const MARKER: &str = "rpc:";

/// Extract the override name from a raw comment (`//rpc:Name rest...`).
///
/// Returns `None` when the marker is missing or carries no name.
pub fn override_name(comment: &str) -> Option<&str> {
    let body = strip_delimiters(comment.trim()).trim();
    let rest = body.strip_prefix(MARKER)?;
    let name = rest.split(char::is_whitespace).next().unwrap_or("");
    (!name.is_empty()).then_some(name)
}

fn strip_delimiters(comment: &str) -> &str {
    if let Some(line) = comment.strip_prefix("//") {
        line
    } else if let Some(block) = comment.strip_prefix("/*") {
        block.strip_suffix("*/").unwrap_or(block)
    } else {
        comment
    }
}
