//! Page layout loading — a YAML document deserialized into the domain graph
//! and validated before the session starts.

use deckhand_domain::error::LayoutError;
use deckhand_domain::layout::Layout;

/// Layout loading errors.
#[derive(Debug, thiserror::Error)]
pub enum LayoutFileError {
    /// File I/O failure (including a missing file — the layout is required).
    #[error("failed to read layout file")]
    Io(#[from] std::io::Error),
    /// YAML parse failure.
    #[error("failed to parse layout file")]
    Parse(#[from] serde_yml::Error),
    /// The parsed layout fails validation.
    #[error("invalid layout")]
    Invalid(#[from] LayoutError),
}

/// Read and validate the layout at `path`.
///
/// # Errors
///
/// Returns a [`LayoutFileError`]; any of them aborts startup.
pub fn load(path: &str) -> Result<Layout, LayoutFileError> {
    parse(&std::fs::read_to_string(path)?)
}

/// Parse and validate a layout document.
///
/// # Errors
///
/// Returns a [`LayoutFileError`] for malformed YAML or invalid page graphs.
pub fn parse(content: &str) -> Result<Layout, LayoutFileError> {
    let layout: Layout = serde_yml::from_str(content)?;
    layout.validate()?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckhand_domain::control::{PageTarget, SpecialType};

    const SAMPLE: &str = "
pages:
  - name: home
    buttons:
      - special_type: go-to-page
        special_type_data: controls
      - entity_id: light.kitchen
        service: light.toggle
        text: Kitchen
    dials:
      - entity_id: input_number.streamdeck
        allow_touchscreen_events: true
        turn:
          service: input_number.set_value
          properties:
            min: 0
            max: 200
            step: 5
        push:
          service: input_number.increment
  - name: controls
    close_on_inactivity_timer: true
anonymous_pages:
  - name: overlay
    buttons:
      - special_type: close-page
return_to_home:
  home_page: home
  duration: 30
";

    #[test]
    fn should_parse_sample_layout() {
        let layout = parse(SAMPLE).unwrap();
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.anonymous_pages.len(), 1);

        let home = &layout.pages[0];
        assert_eq!(
            home.buttons[0].special_type,
            Some(SpecialType::GoToPage(PageTarget::Name("controls".to_string())))
        );
        assert_eq!(home.buttons[1].service.as_deref(), Some("light.toggle"));

        let dial = &home.dials[0];
        assert!(dial.allow_touchscreen_events);
        let turn = dial.turn.as_ref().unwrap();
        assert_eq!(turn.properties.max(), 200.0);
        assert_eq!(turn.properties.step(), 5.0);

        let rule = layout.return_to_home.as_ref().unwrap();
        assert_eq!(rule.home_page, "home");
    }

    #[test]
    fn should_reject_layout_without_home_pages() {
        let result = parse("anonymous_pages:\n  - name: overlay\n");
        assert!(matches!(
            result,
            Err(LayoutFileError::Invalid(LayoutError::NoHomePages))
        ));
    }

    #[test]
    fn should_reject_duplicate_page_names() {
        let result = parse("pages:\n  - name: home\n  - name: home\n");
        assert!(matches!(
            result,
            Err(LayoutFileError::Invalid(LayoutError::DuplicatePageName(_)))
        ));
    }

    #[test]
    fn should_reject_malformed_yaml() {
        assert!(matches!(
            parse("pages: ["),
            Err(LayoutFileError::Parse(_))
        ));
    }

    #[test]
    fn should_reject_missing_file() {
        assert!(matches!(
            load("definitely-not-here.yaml"),
            Err(LayoutFileError::Io(_))
        ));
    }
}
