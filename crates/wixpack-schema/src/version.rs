//! Product version encoding.
//!
//! The installer's `Version` attribute only accepts `x.y.z[.w]` with bounded
//! fields, so user versions are funnelled through one of two schemes: a legacy
//! packed integer, or a semantic version whose pre-release part is dropped and
//! whose numeric build metadata becomes the fourth field.

use thiserror::Error;

pub const MAX_MAJOR: u64 = 255;
pub const MAX_MINOR: u64 = 255;
pub const MAX_PATCH: u64 = 65535;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("failed to parse version '{0}', fields must not exceed maximum values of 255.255.65535")]
    OutOfRange(String),
    #[error(
        "failed to parse version '{0}', must be either a semantic version or a single build/revision number"
    )]
    Invalid(String),
}

/// Product version in every form the build needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    /// As typed by the user.
    pub user: String,
    /// Shown to humans; defaults to `user`.
    pub display: String,
    /// Dotted form fed to the installer's version field.
    pub installer: String,
    /// major << 24 | minor << 16 | patch
    pub key: i64,
}

impl Version {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Fill `display`, `installer` and `key` from `user`.
    pub fn encode(&mut self) -> Result<(), VersionError> {
        if self.display.is_empty() {
            self.display.clone_from(&self.user);
        }
        let encoded = encode_version(&self.user)?;
        self.installer = encoded.installer;
        self.key = encoded.key;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedVersion {
    pub installer: String,
    pub key: i64,
}

/// Encode a user version. The packed-integer reading always wins over the
/// semantic one, so `"7"` is build 7 rather than an invalid semver.
pub fn encode_version(user: &str) -> Result<EncodedVersion, VersionError> {
    if let Ok(packed) = user.parse::<i64>() {
        return Ok(unpack(packed));
    }

    let invalid = || VersionError::Invalid(user.to_owned());
    let candidate = coerce(user.strip_prefix('v').unwrap_or(user)).ok_or_else(invalid)?;
    let parsed = semver::Version::parse(&candidate).map_err(|_| invalid())?;

    let out_of_range = || VersionError::OutOfRange(user.to_owned());
    if parsed.major > MAX_MAJOR || parsed.minor > MAX_MINOR || parsed.patch > MAX_PATCH {
        return Err(out_of_range());
    }
    let major = u8::try_from(parsed.major).map_err(|_| out_of_range())?;
    let minor = u8::try_from(parsed.minor).map_err(|_| out_of_range())?;
    let patch = u16::try_from(parsed.patch).map_err(|_| out_of_range())?;

    let installer = match parsed.build.as_str().parse::<i64>() {
        Ok(meta) => format!("{major}.{minor}.{patch}.{meta}"),
        Err(_) => format!("{major}.{minor}.{patch}"),
    };
    let key = (i64::from(major) << 24) + (i64::from(minor) << 16) + i64::from(patch);

    Ok(EncodedVersion { installer, key })
}

/// Bring the loose `N[.N[.N]]` grammar into strict semver: missing minor and
/// patch become 0 and leading zeros are dropped. The pre-release and build
/// suffix is passed through untouched.
fn coerce(version: &str) -> Option<String> {
    let split = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split);

    let mut fields: Vec<&str> = core.split('.').collect();
    if fields.len() > 3
        || fields
            .iter()
            .any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    for field in &mut fields {
        let trimmed = field.trim_start_matches('0');
        *field = if trimmed.is_empty() { "0" } else { trimmed };
    }
    fields.resize(3, "0");
    Some(format!("{}{suffix}", fields.join(".")))
}

fn unpack(packed: i64) -> EncodedVersion {
    let major = packed >> 24;
    let minor = (packed - (major << 24)) >> 16;
    let build = packed - (major << 24) - (minor << 16);
    EncodedVersion {
        installer: format!("{major}.{minor}.{build}"),
        key: packed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver_three_part() {
        let v = encode_version("1.2.3").unwrap();
        assert_eq!(v.installer, "1.2.3");
        assert_eq!(v.key, (1 << 24) + (2 << 16) + 3);
    }

    #[test]
    fn packed_integer_decomposes() {
        let v = encode_version("16908292").unwrap();
        assert_eq!(v.installer, "1.2.4");
        assert_eq!(v.key, 16_908_292);
    }

    #[test]
    fn packed_integer_keeps_remainder_in_build() {
        // 0x01020304: the low 16 bits are a single build field
        let v = encode_version("16909060").unwrap();
        assert_eq!(v.installer, "1.2.772");
        assert_eq!(v.key, 16_909_060);
    }

    #[test]
    fn packed_integer_takes_precedence() {
        let v = encode_version("1").unwrap();
        assert_eq!(v.installer, "0.0.1");
        assert_eq!(v.key, 1);
    }

    #[test]
    fn numeric_metadata_becomes_fourth_field() {
        let v = encode_version("1.2.3+45").unwrap();
        assert_eq!(v.installer, "1.2.3.45");
        assert_eq!(v.key, (1 << 24) + (2 << 16) + 3);
    }

    #[test]
    fn non_numeric_metadata_and_prerelease_are_dropped() {
        assert_eq!(encode_version("1.2.3+build.7").unwrap().installer, "1.2.3");
        assert_eq!(encode_version("1.2.3-rc.1").unwrap().installer, "1.2.3");
        assert_eq!(encode_version("1.2.3-rc.1+9").unwrap().installer, "1.2.3.9");
    }

    #[test]
    fn leading_v_is_accepted() {
        assert_eq!(encode_version("v12.34.5678").unwrap().installer, "12.34.5678");
    }

    #[test]
    fn field_limits() {
        assert!(encode_version("255.255.65535").is_ok());
        assert_eq!(
            encode_version("1.256.0"),
            Err(VersionError::OutOfRange("1.256.0".to_owned()))
        );
        assert!(matches!(
            encode_version("256.0.0"),
            Err(VersionError::OutOfRange(_))
        ));
        assert!(matches!(
            encode_version("1.0.65536"),
            Err(VersionError::OutOfRange(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            encode_version("not-a-version"),
            Err(VersionError::Invalid("not-a-version".to_owned()))
        );
        assert!(encode_version("").is_err());
        assert!(encode_version("v").is_err());
        assert!(encode_version("1..2").is_err());
        assert!(encode_version("1.2.3.4").is_err());
        assert!(encode_version("1.x").is_err());
    }

    #[test]
    fn short_versions_are_padded() {
        let v = encode_version("1.2").unwrap();
        assert_eq!(v.installer, "1.2.0");
        assert_eq!(v.key, (1 << 24) + (2 << 16));

        let v = encode_version("v1").unwrap();
        assert_eq!(v.installer, "1.0.0");
        assert_eq!(v.key, 1 << 24);

        assert_eq!(encode_version("v2.1+7").unwrap().installer, "2.1.0.7");
        assert_eq!(encode_version("3-beta").unwrap().installer, "3.0.0");
    }

    #[test]
    fn leading_zeros_are_dropped() {
        let v = encode_version("01.2.3").unwrap();
        assert_eq!(v.installer, "1.2.3");
        assert_eq!(v.key, (1 << 24) + (2 << 16) + 3);
        assert_eq!(encode_version("v1.00.007").unwrap().installer, "1.0.7");
    }

    #[test]
    fn display_defaults_to_user() {
        let mut version = Version::new("1.2.3+4");
        version.encode().unwrap();
        assert_eq!(version.display, "1.2.3+4");
        assert_eq!(version.installer, "1.2.3.4");

        let mut version = Version::new("1.2.3").with_display("1.2.3 (beta)");
        version.encode().unwrap();
        assert_eq!(version.display, "1.2.3 (beta)");
    }
}
