/// Derive the component name used for loose heading matches.
///
/// Takes the last path segment, lower-cases it, strips the locale marker and
/// removes hyphens: `components/date-picker-cn` -> `datepicker`.
pub fn component_name(path: &str, locale_marker: &str) -> String {
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let marker = locale_marker.to_lowercase();
    let stem = if marker.is_empty() {
        segment.as_str()
    } else {
        segment.strip_suffix(marker.as_str()).unwrap_or(segment.as_str())
    };

    stem.replace('-', "")
}

/// Fold heading text for a loose comparison against [`component_name`].
pub fn fold_heading(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name_strips_locale_and_case() {
        assert_eq!(component_name("components/button-cn", "-cn"), "button");
        assert_eq!(component_name("components/Button", "-cn"), "button");
    }

    #[test]
    fn test_component_name_removes_hyphens() {
        assert_eq!(component_name("components/date-picker-cn", "-cn"), "datepicker");
        assert_eq!(component_name("/components/back-top/", "-cn"), "backtop");
    }

    #[test]
    fn test_component_name_marker_only_at_end() {
        assert_eq!(component_name("components/cnbox", "-cn"), "cnbox");
    }

    #[test]
    fn test_fold_heading_matches_component_name() {
        let heading = fold_heading("Date Picker 日期选择器");
        assert!(heading.contains(&component_name("components/date-picker", "-cn")));
    }
}
