//! Server version parsing.

use core::fmt;

/// The replication compatibility prefix MariaDB prepends to its version.
pub const MARIADB_RPL_HACK_PREFIX: &str = "5.5.5-";

/// Parsed server version.
///
/// MariaDB servers behind replication proxies report a fake `5.5.5-`
/// prefix; it is stripped before parsing and implies MariaDB. Without the
/// prefix, MariaDB is detected by substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVersion {
    raw: String,
    major: u32,
    minor: u32,
    patch: u32,
    mariadb: bool,
    support_returning: bool,
}

impl ServerVersion {
    /// Parse a raw version string as advertised in the initial handshake.
    #[must_use]
    pub fn parse(raw_version: &str) -> Self {
        let (version, mariadb) = match raw_version.strip_prefix(MARIADB_RPL_HACK_PREFIX) {
            Some(stripped) => (stripped, true),
            None => (raw_version, raw_version.contains("MariaDB")),
        };
        Self::new(version, mariadb)
    }

    /// Build a version from an already-stripped string and a known flavor.
    ///
    /// The handshake decoder decides the MariaDB flag itself (the extended
    /// capability field implies MariaDB even without the version marker).
    #[must_use]
    pub fn new(version: &str, mariadb: bool) -> Self {
        let (major, minor, patch) = Self::parse_numbers(version);
        Self {
            raw: version.to_string(),
            major,
            minor,
            patch,
            mariadb,
            support_returning: mariadb && version_at_least(major, minor, patch, 10, 5, 1),
        }
    }

    // Digit runs split on any non-digit, so "10.5.1-MariaDB-log" parses as
    // 10/5/1 and trailing text after the patch number is ignored.
    fn parse_numbers(version: &str) -> (u32, u32, u32) {
        let mut parts = [0u32; 3];
        let mut part = 0;
        let mut val: u32 = 0;
        for c in version.chars() {
            if let Some(d) = c.to_digit(10) {
                val = val.wrapping_mul(10).wrapping_add(d);
            } else {
                if part < 3 {
                    parts[part] = val;
                }
                if part == 2 {
                    return (parts[0], parts[1], parts[2]);
                }
                part += 1;
                val = 0;
            }
        }
        if part < 3 {
            parts[part] = val;
        }
        (parts[0], parts[1], parts[2])
    }

    /// Raw version string (prefix stripped).
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Major version number.
    #[must_use]
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor version number.
    #[must_use]
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch version number.
    #[must_use]
    pub fn patch(&self) -> u32 {
        self.patch
    }

    /// Whether the server is MariaDB.
    #[must_use]
    pub fn is_mariadb(&self) -> bool {
        self.mariadb
    }

    /// Whether the server supports `INSERT … RETURNING` (MariaDB ≥ 10.5.1).
    #[must_use]
    pub fn support_returning(&self) -> bool {
        self.support_returning
    }

    /// Compare against a minimum version.
    #[must_use]
    pub fn is_at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        version_at_least(self.major, self.minor, self.patch, major, minor, patch)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn version_at_least(major: u32, minor: u32, patch: u32, req_major: u32, req_minor: u32, req_patch: u32) -> bool {
    if major != req_major {
        return major > req_major;
    }
    if minor != req_minor {
        return minor > req_minor;
    }
    patch >= req_patch
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mariadb_rpl_prefix() {
        let v = ServerVersion::parse("5.5.5-10.5.1-MariaDB");
        assert!(v.is_mariadb());
        assert_eq!((v.major(), v.minor(), v.patch()), (10, 5, 1));
        assert!(v.support_returning());
        assert_eq!(v.raw(), "10.5.1-MariaDB");
    }

    #[test]
    fn test_mysql_version() {
        let v = ServerVersion::parse("8.0.33");
        assert!(!v.is_mariadb());
        assert_eq!((v.major(), v.minor(), v.patch()), (8, 0, 33));
        assert!(!v.support_returning());
    }

    #[test]
    fn test_mariadb_by_substring() {
        let v = ServerVersion::parse("10.4.0-MariaDB-log");
        assert!(v.is_mariadb());
        assert_eq!((v.major(), v.minor(), v.patch()), (10, 4, 0));
        assert!(!v.support_returning());
    }

    #[test]
    fn test_trailing_text_ignored_after_patch() {
        let v = ServerVersion::parse("10.6.12-MariaDB-1:10.6.12+maria~ubu2004");
        assert_eq!((v.major(), v.minor(), v.patch()), (10, 6, 12));
    }

    #[test]
    fn test_bare_numbers() {
        let v = ServerVersion::parse("5.5.57");
        assert_eq!((v.major(), v.minor(), v.patch()), (5, 5, 57));
        assert!(!v.is_mariadb());
    }

    #[test]
    fn test_is_at_least() {
        let v = ServerVersion::parse("10.5.1-MariaDB");
        assert!(v.is_at_least(10, 5, 1));
        assert!(v.is_at_least(10, 4, 9));
        assert!(!v.is_at_least(10, 5, 2));
        assert!(!v.is_at_least(11, 0, 0));
    }
}
