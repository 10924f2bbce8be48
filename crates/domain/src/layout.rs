//! Layout — the validated page graph a deck session runs.

use serde::{Deserialize, Serialize};

use crate::control::Page;
use crate::error::LayoutError;

/// Auto-return configuration: which home page to fall back to, and after how
/// long without input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnToHome {
    /// Name of the home page to return to.
    pub home_page: String,
    /// Idle time in seconds before returning.
    pub duration: f64,
}

impl ReturnToHome {
    /// The idle window as a [`std::time::Duration`].
    ///
    /// Only meaningful on a validated layout (`duration > 0`).
    #[must_use]
    pub fn idle_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.duration.max(0.0))
    }
}

/// The full page graph: the home rotation, anonymous pages reachable only by
/// explicit navigation, and the optional auto-return rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Pages in the home rotation, in rotation order.
    pub pages: Vec<Page>,
    /// Pages reachable only via `go-to-page`; never part of the rotation.
    pub anonymous_pages: Vec<Page>,
    /// Auto-return rule; absent disables return-to-home globally.
    #[serde(alias = "return_to_home_after_no_presses")]
    pub return_to_home: Option<ReturnToHome>,
}

impl Layout {
    /// Check the invariants a running session relies on.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when the home rotation is empty, page names
    /// collide, or the return-to-home rule is unusable. These abort startup;
    /// nothing here is recoverable per-event.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.pages.is_empty() {
            return Err(LayoutError::NoHomePages);
        }

        let mut seen = std::collections::HashSet::new();
        for page in self.pages.iter().chain(&self.anonymous_pages) {
            if !seen.insert(page.name.as_str()) {
                return Err(LayoutError::DuplicatePageName(page.name.clone()));
            }
        }

        if let Some(rule) = &self.return_to_home {
            if rule.duration.is_nan() || rule.duration <= 0.0 {
                return Err(LayoutError::NonPositiveDuration(rule.duration));
            }
            if !self.pages.iter().any(|page| page.name == rule.home_page) {
                return Err(LayoutError::UnknownHomePage(rule.home_page.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with(pages: &[&str], anonymous: &[&str]) -> Layout {
        Layout {
            pages: pages.iter().map(|name| Page::new(*name)).collect(),
            anonymous_pages: anonymous.iter().map(|name| Page::new(*name)).collect(),
            return_to_home: None,
        }
    }

    #[test]
    fn should_accept_minimal_layout() {
        assert!(layout_with(&["home"], &[]).validate().is_ok());
    }

    #[test]
    fn should_reject_empty_home_rotation() {
        let layout = layout_with(&[], &["anon"]);
        assert_eq!(layout.validate(), Err(LayoutError::NoHomePages));
    }

    #[test]
    fn should_reject_duplicate_names_across_home_and_anonymous() {
        let layout = layout_with(&["home", "extra"], &["extra"]);
        assert_eq!(
            layout.validate(),
            Err(LayoutError::DuplicatePageName("extra".to_string()))
        );
    }

    #[test]
    fn should_reject_return_target_that_is_anonymous() {
        let mut layout = layout_with(&["home"], &["overlay"]);
        layout.return_to_home = Some(ReturnToHome {
            home_page: "overlay".to_string(),
            duration: 30.0,
        });
        assert_eq!(
            layout.validate(),
            Err(LayoutError::UnknownHomePage("overlay".to_string()))
        );
    }

    #[test]
    fn should_reject_non_positive_duration() {
        let mut layout = layout_with(&["home"], &[]);
        layout.return_to_home = Some(ReturnToHome {
            home_page: "home".to_string(),
            duration: 0.0,
        });
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::NonPositiveDuration(_))
        ));
    }

    #[test]
    fn should_accept_return_rule_naming_a_home_page() {
        let mut layout = layout_with(&["home", "second"], &["anon"]);
        layout.return_to_home = Some(ReturnToHome {
            home_page: "home".to_string(),
            duration: 0.8,
        });
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn should_deserialize_legacy_return_key() {
        let layout: Layout = serde_json::from_value(serde_json::json!({
            "pages": [{"name": "home"}],
            "return_to_home_after_no_presses": {"home_page": "home", "duration": 15.0},
        }))
        .unwrap();
        assert_eq!(
            layout.return_to_home,
            Some(ReturnToHome {
                home_page: "home".to_string(),
                duration: 15.0,
            })
        );
    }

    #[test]
    fn should_convert_duration_to_idle_window() {
        let rule = ReturnToHome {
            home_page: "home".to_string(),
            duration: 0.8,
        };
        assert_eq!(rule.idle_window(), std::time::Duration::from_millis(800));
    }
}
