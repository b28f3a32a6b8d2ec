// Presenter class mapping
// Masks turning module-qualified presenter names into class names

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use waypoint_error::{ResolveError, ResolveResult};

/// Module key used when no specific module mapping applies
pub const WILDCARD_MODULE: &str = "*";

/// Module key of the framework's own presenters
pub const FRAMEWORK_MODULE: &str = "Nette";

/// Infix used when a mask leaves the module part out
pub const DEFAULT_INFIX: &str = "*Module\\";

/// Separator of presenter name segments
pub const MODULE_SEPARATOR: char = ':';

/// `[prefix][infix][leaf]`, infix and leaf each carrying one `*`
static MASK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\?([\w\\]*\\)?(\w*\*\w*?\\)?([\w\\]*\*\w*)$").expect("mask pattern is a valid regex")
});

/// A three part class name template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    /// Namespace every class starts with
    pub prefix: String,
    /// Template applied to each module segment
    pub infix: String,
    /// Template applied to the presenter segment
    pub leaf: String,
}

impl Mask {
    pub fn new(prefix: impl Into<String>, infix: impl Into<String>, leaf: impl Into<String>) -> Self {
        Mask {
            prefix: prefix.into(),
            infix: infix.into(),
            leaf: leaf.into(),
        }
    }

    /// Parse a mask such as `App\*Module\*Presenter`. A leading `\` is
    /// ignored and a missing module part defaults to `*Module\`.
    pub fn parse(mask: &str) -> ResolveResult<Self> {
        let captures = MASK_PATTERN.captures(mask).ok_or_else(|| ResolveError::InvalidMapping {
            mask: mask.to_string(),
        })?;
        let group = |index: usize| captures.get(index).map_or("", |m| m.as_str());

        let infix = match group(2) {
            "" => DEFAULT_INFIX,
            infix => infix,
        };
        Ok(Mask::new(group(1), infix, group(3)))
    }

    /// Class name for the given segments: module segments through the
    /// infix, the last one through the leaf. A falsy segment (empty or
    /// `"0"`) ends the name.
    pub fn format(&self, segments: &[&str]) -> String {
        let mut class = self.prefix.clone();
        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() || *segment == "0" {
                break;
            }
            let template = if index + 1 < segments.len() { &self.infix } else { &self.leaf };
            class.push_str(&template.replace('*', segment));
        }
        class
    }
}

impl FromStr for Mask {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mask::parse(s)
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.infix, self.leaf)
    }
}

/// Module name to mask table. Always holds a wildcard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    masks: BTreeMap<String, Mask>,
}

impl Default for Mapping {
    fn default() -> Self {
        let mut masks = BTreeMap::new();
        masks.insert(WILDCARD_MODULE.to_string(), Mask::new("", DEFAULT_INFIX, "*Presenter"));
        masks.insert(FRAMEWORK_MODULE.to_string(), Mask::new("NetteModule\\", "*\\", "*Presenter"));
        Mapping { masks }
    }
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask registered for `module`
    pub fn get(&self, module: &str) -> Option<&Mask> {
        self.masks.get(module)
    }

    /// Register or replace the mask of `module`
    pub fn insert(&mut self, module: impl Into<String>, mask: Mask) {
        self.masks.insert(module.into(), mask);
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.masks.keys().map(String::as_str)
    }

    fn wildcard(&self) -> Mask {
        self.masks
            .get(WILDCARD_MODULE)
            .cloned()
            .unwrap_or_else(|| Mask::new("", DEFAULT_INFIX, "*Presenter"))
    }

    /// Class name for a presenter name such as `Admin:Dashboard`. The first
    /// segment selects a module mask when one is registered and more
    /// segments follow; otherwise the wildcard mask applies to all segments.
    pub fn format_presenter_class(&self, presenter: &str) -> String {
        let segments: Vec<&str> = presenter.split(MODULE_SEPARATOR).collect();
        if segments.len() > 1 {
            if let Some(mask) = self.masks.get(segments[0]) {
                return mask.format(&segments[1..]);
            }
        }
        self.wildcard().format(&segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_mask() {
        let mask = Mask::parse("App\\*Module\\*Presenter").unwrap();
        assert_eq!(mask, Mask::new("App\\", "*Module\\", "*Presenter"));
        assert_eq!(mask.to_string(), "App\\*Module\\*Presenter");
    }

    #[test]
    fn test_parse_defaults_infix() {
        assert_eq!(Mask::parse("*Presenter").unwrap(), Mask::new("", DEFAULT_INFIX, "*Presenter"));
        assert_eq!(
            Mask::parse("\\App\\Presenters\\*Presenter").unwrap(),
            Mask::new("App\\Presenters\\", DEFAULT_INFIX, "*Presenter")
        );
        assert_eq!(Mask::parse("Shop\\*\\*Presenter").unwrap(), Mask::new("Shop\\", "*\\", "*Presenter"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for mask in ["", "Presenter", "App\\Presenter", "App-*Presenter", "*Presenter\\"] {
            assert_eq!(
                Mask::parse(mask).unwrap_err(),
                ResolveError::InvalidMapping { mask: mask.to_string() }
            );
        }
    }

    #[test]
    fn test_from_str() {
        let mask: Mask = "Shop\\*\\*Presenter".parse().unwrap();
        assert_eq!(mask.format(&["Admin", "Orders"]), "Shop\\Admin\\OrdersPresenter");
    }

    #[test]
    fn test_format_with_defaults() {
        let mapping = Mapping::new();
        assert_eq!(mapping.format_presenter_class("Article"), "ArticlePresenter");
        assert_eq!(mapping.format_presenter_class("Admin:Dashboard"), "AdminModule\\DashboardPresenter");
        assert_eq!(
            mapping.format_presenter_class("Front:Admin:Dashboard"),
            "FrontModule\\AdminModule\\DashboardPresenter"
        );
        assert_eq!(mapping.format_presenter_class("Nette:Micro"), "NetteModule\\MicroPresenter");
        // a single segment never selects a module
        assert_eq!(mapping.format_presenter_class("Nette"), "NettePresenter");
    }

    #[test]
    fn test_falsy_segment_ends_name() {
        let mapping = Mapping::new();
        assert_eq!(mapping.format_presenter_class("Admin::Dashboard"), "AdminModule\\");
        assert_eq!(mapping.format_presenter_class("Admin:"), "AdminModule\\");
        assert_eq!(mapping.format_presenter_class("Admin:0"), "AdminModule\\");
        assert_eq!(mapping.format_presenter_class("Admin:0:Dashboard"), "AdminModule\\");
        assert_eq!(mapping.format_presenter_class("Admin:00"), "AdminModule\\00Presenter");
    }
}
