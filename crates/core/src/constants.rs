//! Constants used throughout the HMS core crate.
//!
//! Validation patterns, paging defaults and permission sentinels live here so that the
//! validators, the form engine and the permission model agree on them.

/// Permission that grants every other permission.
pub const ADMIN_FULL_ACCESS: &str = "admin.full_access";

/// Email addresses: something, an `@`, something, a dot, something. No whitespace.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Phone numbers with optional `+`, optional area-code parentheses and `-`, `.` or space
/// separators.
pub const PHONE_PATTERN: &str = r"^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$";

/// US ZIP or ZIP+4.
pub const ZIP_CODE_PATTERN: &str = r"^\d{5}(-\d{4})?$";

/// Social security number in `XXX-XX-XXXX` form.
pub const SSN_PATTERN: &str = r"^\d{3}-\d{2}-\d{4}$";

/// Characters accepted as the "special character" class of a password.
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&";

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Pagers with at most this many pages show every page number.
pub const MAX_VISIBLE_PAGES: usize = 7;

/// Page size used when a caller does not choose one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Page sizes offered by list views.
pub const ITEMS_PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Default upload limit for file validation (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Marker rendered between non-contiguous page numbers.
pub const ELLIPSIS: &str = "...";
