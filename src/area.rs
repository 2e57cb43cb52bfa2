//! Area classifiers and remote path layout
//!
//! Every module lives in exactly one area. The area determines where the
//! module's repository is rooted on the repository host:
//! `<root_dir>/<area>/<module_path>`, e.g. `controls/support/motor`.

use std::fmt;
use std::str::FromStr;

use crate::constants::{fill, MSG_MISSING_TECHNICAL_AREA, MSG_UNKNOWN_AREA};

/// Category label determining a module's remote location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Support,
    Ioc,
    Python,
    Matlab,
    Tools,
    Etc,
    Epics,
}

impl Area {
    pub const ALL: [Area; 7] = [
        Area::Support,
        Area::Ioc,
        Area::Python,
        Area::Matlab,
        Area::Tools,
        Area::Etc,
        Area::Epics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Support => "support",
            Area::Ioc => "ioc",
            Area::Python => "python",
            Area::Matlab => "matlab",
            Area::Tools => "tools",
            Area::Etc => "etc",
            Area::Epics => "epics",
        }
    }

    /// IOC modules are organised by beamline and need a technical area below it
    pub fn requires_technical_area(&self) -> bool {
        matches!(self, Area::Ioc)
    }

    /// Checks that an IOC module path names both beamline and technical area
    pub fn check_technical_area(&self, module_path: &str) -> Result<(), String> {
        if self.requires_technical_area() && module_path.split('/').count() < 2 {
            return Err(MSG_MISSING_TECHNICAL_AREA.to_string());
        }
        Ok(())
    }

    /// Remote path of the area itself, e.g. `controls/support`
    pub fn area_root(&self, root_dir: &str) -> String {
        join_remote(&[root_dir, self.as_str()])
    }

    /// Remote repository path for a module in this area
    pub fn remote_path(&self, root_dir: &str, module_path: &str) -> String {
        join_remote(&[root_dir, self.as_str(), module_path])
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Area {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Area::ALL
            .iter()
            .copied()
            .find(|area| area.as_str() == lowered)
            .ok_or_else(|| fill(MSG_UNKNOWN_AREA, &[s]))
    }
}

/// Removes a single trailing `/` from a path string
pub fn remove_end_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Joins remote path segments with `/`, ignoring empty segments and stray slashes
pub fn join_remote(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Area::Support, "foo", "controls/support/foo")]
    #[case(Area::Ioc, "BL99I/BL99I-VA-IOC-01", "controls/ioc/BL99I/BL99I-VA-IOC-01")]
    #[case(Area::Python, "dls_pkg/", "controls/python/dls_pkg")]
    fn test_remote_path(#[case] area: Area, #[case] module: &str, #[case] expected: &str) {
        assert_eq!(area.remote_path("controls", module), expected);
    }

    #[test]
    fn test_area_root() {
        assert_eq!(Area::Tools.area_root("controls/"), "controls/tools");
    }

    #[test]
    fn test_parse_area() {
        assert_eq!("support".parse::<Area>().unwrap(), Area::Support);
        assert_eq!("IOC".parse::<Area>().unwrap(), Area::Ioc);
        assert!("nonsense".parse::<Area>().is_err());
    }

    #[test]
    fn test_ioc_requires_technical_area() {
        assert!(Area::Ioc.check_technical_area("BL99I").is_err());
        assert!(Area::Ioc.check_technical_area("BL99I/VA").is_ok());
        assert!(Area::Support.check_technical_area("motor").is_ok());
    }

    #[test]
    fn test_remove_end_slash() {
        assert_eq!(remove_end_slash("foo/"), "foo");
        assert_eq!(remove_end_slash("foo"), "foo");
        assert_eq!(remove_end_slash(""), "");
    }
}
