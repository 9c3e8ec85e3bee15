//! Common constants used across route handlers

/// Generic error message for internal server errors
pub const ERROR_SOMETHING_WENT_WRONG: &str = "Something went wrong";

/// Error message for authentication failures
pub const ERROR_AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Error message for missing authentication
pub const ERROR_AUTHENTICATION_REQUIRED: &str = "Authentication required";
