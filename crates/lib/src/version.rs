//! Version parsing and range satisfaction for npm dependency strings.
//!
//! Only the range forms the framework writes itself are understood:
//!
//! - exact: `1.2.3` or `=1.2.3`
//! - caret: `^1.2.3`, same major and at least the floor
//! - tilde: `~1.2.3`, same major and minor and at least the floor
//!
//! Anything else (`>=1 <2`, `1.x`, `latest`, `file:../pkg`) is unrecognized
//! and never satisfied, so an unknown constraint always forces a rebuild
//! instead of passing on a guess.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a version or range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
  #[error("empty version string")]
  Empty,

  #[error("invalid component '{component}' in version '{version}'")]
  InvalidComponent { version: String, component: String },

  #[error("too many components in version '{0}'")]
  TooManyComponents(String),
}

/// A parsed `major.minor.patch[-suffix]` version.
///
/// Missing components are zero, so `2` parses as `2.0.0` and `2.1` as `2.1.0`.
/// A version with a pre-release suffix orders before the same triple without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontendVersion {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
  /// Pre-release or build suffix, e.g. `beta1` in `1.0.0-beta1`.
  pub suffix: Option<String>,
}

impl FrontendVersion {
  pub fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self {
      major,
      minor,
      patch,
      suffix: None,
    }
  }
}

impl FromStr for FrontendVersion {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if trimmed.is_empty() {
      return Err(VersionError::Empty);
    }

    let (numbers, suffix) = match trimmed.find(['-', '+']) {
      Some(idx) => (&trimmed[..idx], Some(trimmed[idx + 1..].to_string())),
      None => (trimmed, None),
    };

    let parts: Vec<&str> = numbers.split('.').collect();
    if parts.len() > 3 {
      return Err(VersionError::TooManyComponents(s.to_string()));
    }

    let mut components = [0u64; 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
      *slot = part.parse().map_err(|_| VersionError::InvalidComponent {
        version: s.to_string(),
        component: part.to_string(),
      })?;
    }

    Ok(Self {
      major: components[0],
      minor: components[1],
      patch: components[2],
      suffix: suffix.filter(|s| !s.is_empty()),
    })
  }
}

impl Ord for FrontendVersion {
  fn cmp(&self, other: &Self) -> Ordering {
    (self.major, self.minor, self.patch)
      .cmp(&(other.major, other.minor, other.patch))
      .then_with(|| match (&self.suffix, &other.suffix) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
      })
  }
}

impl PartialOrd for FrontendVersion {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl fmt::Display for FrontendVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
    if let Some(suffix) = &self.suffix {
      write!(f, "-{}", suffix)?;
    }
    Ok(())
  }
}

/// A parsed version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
  Exact(FrontendVersion),
  Caret(FrontendVersion),
  Tilde(FrontendVersion),
}

impl VersionRange {
  /// The lowest version the range accepts.
  pub fn floor(&self) -> &FrontendVersion {
    match self {
      VersionRange::Exact(v) | VersionRange::Caret(v) | VersionRange::Tilde(v) => v,
    }
  }

  /// Whether `candidate` satisfies this range.
  pub fn matches(&self, candidate: &FrontendVersion) -> bool {
    match self {
      VersionRange::Exact(v) => candidate == v,
      VersionRange::Caret(v) => candidate.major == v.major && candidate >= v,
      VersionRange::Tilde(v) => candidate.major == v.major && candidate.minor == v.minor && candidate >= v,
    }
  }
}

impl FromStr for VersionRange {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if let Some(rest) = trimmed.strip_prefix('^') {
      Ok(VersionRange::Caret(rest.parse()?))
    } else if let Some(rest) = trimmed.strip_prefix('~') {
      Ok(VersionRange::Tilde(rest.parse()?))
    } else if let Some(rest) = trimmed.strip_prefix('=') {
      Ok(VersionRange::Exact(rest.parse()?))
    } else {
      Ok(VersionRange::Exact(trimmed.parse()?))
    }
  }
}

/// Test whether `candidate` satisfies the `declared` version or range.
///
/// Malformed input on either side never satisfies and never panics.
pub fn satisfies(declared: &str, candidate: &str) -> bool {
  let Ok(range) = declared.parse::<VersionRange>() else {
    return false;
  };
  let Ok(candidate) = candidate.parse::<FrontendVersion>() else {
    return false;
  };
  range.matches(&candidate)
}

/// Whether a bundled version is acceptable for a declared one.
///
/// Same as [`satisfies`], except that two identical references which are not
/// versions at all (e.g. the same `file:` path) are accepted.
pub fn accepted(declared: &str, bundled: &str) -> bool {
  let declared_valid = declared.parse::<VersionRange>().is_ok();
  let bundled_valid = bundled.parse::<FrontendVersion>().is_ok();
  match (declared_valid, bundled_valid) {
    (false, false) => declared.trim() == bundled.trim(),
    (true, true) => satisfies(declared, bundled),
    _ => false,
  }
}

/// Parse the floor of a version or range, if it is one.
pub fn floor(version: &str) -> Option<FrontendVersion> {
  version.parse::<VersionRange>().ok().map(|r| r.floor().clone())
}

/// Whether `candidate` is strictly newer than `current`.
///
/// Ranges compare by their floor. Returns false when either side is not a version.
pub fn is_newer(candidate: &str, current: &str) -> bool {
  match (floor(candidate), floor(current)) {
    (Some(candidate), Some(current)) => candidate > current,
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod parsing {
    use super::*;

    #[test]
    fn full_version() {
      let v: FrontendVersion = "1.7.5".parse().unwrap();
      assert_eq!(v, FrontendVersion::new(1, 7, 5));
    }

    #[test]
    fn missing_components_are_zero() {
      assert_eq!("2".parse::<FrontendVersion>().unwrap(), FrontendVersion::new(2, 0, 0));
      assert_eq!("2.1".parse::<FrontendVersion>().unwrap(), FrontendVersion::new(2, 1, 0));
    }

    #[test]
    fn leading_v_is_accepted() {
      assert_eq!("v3.2.0".parse::<FrontendVersion>().unwrap(), FrontendVersion::new(3, 2, 0));
    }

    #[test]
    fn suffix_is_kept() {
      let v: FrontendVersion = "24.4.0-alpha7".parse().unwrap();
      assert_eq!(v.suffix.as_deref(), Some("alpha7"));
      assert_eq!(v.to_string(), "24.4.0-alpha7");
    }

    #[test]
    fn malformed_versions_are_errors() {
      assert!(matches!(
        "1.x".parse::<FrontendVersion>(),
        Err(VersionError::InvalidComponent { .. })
      ));
      assert!(matches!("".parse::<FrontendVersion>(), Err(VersionError::Empty)));
      assert!(matches!(
        "1.2.3.4".parse::<FrontendVersion>(),
        Err(VersionError::TooManyComponents(_))
      ));
      assert!("file:../local".parse::<FrontendVersion>().is_err());
    }

    #[test]
    fn unrecognized_ranges_are_errors() {
      assert!(">=1.0.0".parse::<VersionRange>().is_err());
      assert!("1.0.0 - 2.0.0".parse::<VersionRange>().is_err());
      assert!("latest".parse::<VersionRange>().is_err());
    }
  }

  mod ordering {
    use super::*;

    #[test]
    fn numeric_components_compare_numerically() {
      let a: FrontendVersion = "1.10.0".parse().unwrap();
      let b: FrontendVersion = "1.9.9".parse().unwrap();
      assert!(a > b);
    }

    #[test]
    fn prerelease_orders_before_release() {
      let pre: FrontendVersion = "2.0.0-beta1".parse().unwrap();
      let release: FrontendVersion = "2.0.0".parse().unwrap();
      assert!(pre < release);
    }

    #[test]
    fn is_newer_compares_floors() {
      assert!(is_newer("3.2.1", "3.2.0"));
      assert!(is_newer("^4.0.0", "3.2.0"));
      assert!(!is_newer("3.2.0", "3.2.0"));
      assert!(!is_newer("2.0.0", "3.0.0"));
      assert!(!is_newer("file:../lib", "1.0.0"));
    }
  }

  mod satisfaction {
    use super::*;

    #[test]
    fn caret_allows_minor_and_patch_bumps() {
      assert!(satisfies("^1.7.5", "1.8.6"));
      assert!(satisfies("^1.7.5", "1.7.5"));
      assert!(!satisfies("^1.7.5", "2.0.0"));
      assert!(!satisfies("^1.7.5", "1.7.4"));
    }

    #[test]
    fn tilde_allows_only_patch_bumps() {
      assert!(satisfies("~1.7.5", "1.7.6"));
      assert!(!satisfies("~1.7.5", "1.8.1"));
      assert!(!satisfies("~1.7.5", "1.7.4"));
    }

    #[test]
    fn plain_version_requires_semantic_equality() {
      assert!(satisfies("1.7", "1.7.0"));
      assert!(satisfies("=1.7.0", "1.7.0"));
      assert!(!satisfies("1.7.0", "1.7.1"));
    }

    #[test]
    fn malformed_input_never_satisfies() {
      assert!(!satisfies("^1.x", "1.2.0"));
      assert!(!satisfies("^1.0.0", "not-a-version"));
      assert!(!satisfies(">=1.0.0", "1.2.0"));
    }

    #[test]
    fn identical_non_version_references_are_accepted() {
      assert!(accepted("file:../lib", "file:../lib"));
      assert!(!accepted("file:../lib", "file:../other"));
      assert!(!accepted("file:../lib", "1.0.0"));
      assert!(accepted("^1.7.5", "1.8.6"));
    }
  }
}
