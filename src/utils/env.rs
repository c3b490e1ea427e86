/// Get environment variable with IDLEWATCH_ prefix, falling back to unprefixed version
///
/// This helper function checks for `IDLEWATCH_{key}` first, then falls back to `{key}`
/// for compatibility with standard environment variable naming.
///
/// # Examples
///
/// ```rust
/// use idlewatch::utils::get_env_with_prefix;
///
/// // Checks IDLEWATCH_IDLE_TIMEOUT_MS first, then IDLE_TIMEOUT_MS
/// let timeout = get_env_with_prefix("IDLE_TIMEOUT_MS");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("IDLEWATCH_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        // Test with IDLEWATCH_ prefix
        unsafe {
            std::env::set_var("IDLEWATCH_TEST_VAR", "prefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("TEST_VAR"),
            Some("prefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("IDLEWATCH_TEST_VAR");
        }

        // Test with unprefixed fallback
        unsafe {
            std::env::set_var("FALLBACK_VAR", "unprefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("FALLBACK_VAR"),
            Some("unprefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("FALLBACK_VAR");
        }

        // Test non-existent variable
        assert_eq!(get_env_with_prefix("NON_EXISTENT_VAR"), None);
    }
}
