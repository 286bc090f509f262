use std::convert::Infallible;

/// Host OS as a target identifier.
pub fn current_os() -> String {
    let os = std::env::consts::OS.to_lowercase();
    match os.as_str() {
        "macos" | "darwin" => "mac".to_string(),
        _ => os,
    }
}

/// Target identifiers are case-insensitive.
pub fn parse_target(value: &str) -> Result<String, Infallible> {
    Ok(value.to_lowercase())
}
