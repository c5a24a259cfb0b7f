use std::fmt;

/// HTTP status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Create a new status code.
    #[inline]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the status code as a u16 value.
    #[inline]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Check if status is within 200-299.
    #[inline]
    pub const fn is_successful(&self) -> bool {
        200 <= self.0 && self.0 < 300
    }

    /// Check if status is within 300-399.
    #[inline]
    pub const fn is_redirection(&self) -> bool {
        300 <= self.0 && self.0 < 400
    }

    /// Check if status is within 400-499.
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        400 <= self.0 && self.0 < 500
    }

    /// Check if status is within 500-599.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        500 <= self.0 && self.0 < 600
    }
}

impl From<u16> for StatusCode {
    #[inline]
    fn from(code: u16) -> Self {
        Self::new(code)
    }
}

impl From<StatusCode> for u16 {
    #[inline]
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq<u16> for StatusCode {
    #[inline]
    fn eq(&self, other: &u16) -> bool {
        self.code() == *other
    }
}

impl PartialEq<StatusCode> for u16 {
    #[inline]
    fn eq(&self, other: &StatusCode) -> bool {
        *self == other.code()
    }
}
