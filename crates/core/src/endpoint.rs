use crate::ServiceError;
use url::Url;

/// Resolves `path` below `base`, keeping any path prefix `base` already has.
pub(crate) fn join_endpoint(base: &str, path: &str) -> Result<Url, ServiceError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Appends `segments` to `base`, percent-encoding each one as a single path segment.
pub(crate) fn push_segments(base: &Url, segments: &[&str]) -> Result<Url, ServiceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ServiceError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
