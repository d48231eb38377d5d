use url::Url;

use crate::config::AUTO_REST_URL;
use crate::error::Result;

/// Relative location of the REST services root as seen from the admin root.
pub const AUTO_REST_RELATIVE: &str = "../rest/services/";

/// Resolve the REST services root for an admin URL.
///
/// The admin URL is treated as a directory (a trailing `/` is added when
/// missing). `AUTO`, in any case, stands for [`AUTO_REST_RELATIVE`]. The result
/// is a standard reference join: relative references resolve against the admin
/// URL, absolute ones replace it.
pub fn resolve_rest_url(admin_url: &str, rest_url: &str) -> Result<Url> {
    let base = parse_dir_url(admin_url)?;
    let reference = if rest_url.eq_ignore_ascii_case(AUTO_REST_URL) {
        AUTO_REST_RELATIVE
    } else {
        rest_url
    };
    Ok(base.join(reference)?)
}

/// Parse a URL that names a directory, adding the trailing `/` if needed.
pub fn parse_dir_url(input: &str) -> Result<Url> {
    if input.ends_with('/') {
        Ok(Url::parse(input)?)
    } else {
        Ok(Url::parse(&format!("{input}/"))?)
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub fn with_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resolves_next_to_admin() {
        let url = resolve_rest_url("http://h/arcgis/admin", "AUTO").unwrap();
        assert_eq!(url.as_str(), "http://h/arcgis/rest/services/");
    }

    #[test]
    fn auto_is_case_insensitive() {
        let url = resolve_rest_url("http://h/arcgis/admin/", "auto").unwrap();
        assert_eq!(url.as_str(), "http://h/arcgis/rest/services/");
    }

    #[test]
    fn default_admin_url() {
        let url = resolve_rest_url("http://127.0.0.1:6080/arcgis/admin/", "AUTO").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:6080/arcgis/rest/services/");
    }

    #[test]
    fn absolute_reference_overrides_base() {
        let url = resolve_rest_url("http://h/arcgis/admin", "https://other:6443/ags/rest/services/")
            .unwrap();
        assert_eq!(url.as_str(), "https://other:6443/ags/rest/services/");
    }

    #[test]
    fn relative_reference_resolves_against_admin() {
        let url = resolve_rest_url("http://h/arcgis/admin", "/custom/rest/").unwrap();
        assert_eq!(url.as_str(), "http://h/custom/rest/");
        let url = resolve_rest_url("http://h/arcgis/admin", "services").unwrap();
        assert_eq!(url.as_str(), "http://h/arcgis/admin/services");
    }

    #[test]
    fn invalid_admin_url_fails() {
        assert!(resolve_rest_url("not a url", "AUTO").is_err());
    }

    #[test]
    fn segments_are_encoded() {
        let base = Url::parse("http://h/arcgis/rest/services/").unwrap();
        let url = with_segments(
            &base,
            &["System", "PublishingTools", "GPServer", "Publish Service Definition"],
        );
        assert_eq!(
            url.as_str(),
            "http://h/arcgis/rest/services/System/PublishingTools/GPServer/Publish%20Service%20Definition"
        );
    }
}
