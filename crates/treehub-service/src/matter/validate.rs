//! Name and path validation for matters.

use treehub_core::error::AppError;
use treehub_core::result::AppResult;

/// Characters a matter name may not contain.
pub const NAME_RESERVED: [char; 7] = ['<', '>', '|', '*', '?', '/', '\\'];

/// Characters a directory path may not contain.
pub const PATH_RESERVED: [char; 6] = ['<', '>', '|', '*', '?', '\\'];

/// Check a name as given, without trimming.
pub fn check_name(name: &str, max_length: usize) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name is required and cannot be blank"));
    }
    if name.chars().count() > max_length {
        return Err(AppError::validation(format!(
            "Name cannot be longer than {max_length} characters"
        )));
    }
    if name.contains(NAME_RESERVED) {
        return Err(AppError::validation(
            r"Name cannot contain any of: < > | * ? / \",
        ));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("'{name}' is not a valid name")));
    }
    Ok(())
}

/// Trim a name and check it.
pub fn normalize_name(name: &str, max_length: usize) -> AppResult<String> {
    let name = name.trim();
    check_name(name, max_length)?;
    Ok(name.to_string())
}

/// Split an absolute directory path into validated segments.
///
/// `/` yields no segments. A single trailing `/` is ignored.
pub fn split_directory_path(
    path: &str,
    max_length: usize,
    max_depth: usize,
) -> AppResult<Vec<String>> {
    if path.is_empty() {
        return Err(AppError::validation("Directory path is required"));
    }
    if !path.starts_with('/') {
        return Err(AppError::validation("Directory path must start with '/'"));
    }
    if path.contains("//") {
        return Err(AppError::validation("Directory path cannot contain '//'"));
    }
    if path.contains(PATH_RESERVED) {
        return Err(AppError::validation(
            r"Directory path cannot contain any of: < > | * ? \",
        ));
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let segments: Vec<&str> = trimmed[1..].split('/').collect();
    if segments.len() > max_depth {
        return Err(AppError::validation(format!(
            "Directories can nest at most {max_depth} levels"
        )));
    }
    segments
        .into_iter()
        .map(|segment| normalize_name(segment, max_length))
        .collect()
}

/// Check that a crawl URL uses HTTP or HTTPS.
pub fn check_crawl_url(url: &str) -> AppResult<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::validation(
            "Resource URL is required and must start with http:// or https://",
        ))
    }
}
