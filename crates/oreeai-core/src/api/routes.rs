//! Logical route names and their backend paths.
//!
//! Callers address the API with short logical paths (`/stats`, `/replies/42`).
//! A few of those live under the `client/` namespace on the backend; this
//! module owns that remapping so the rest of the crate never spells it out.

/// Map a logical API path to the backend path, without a leading slash.
///
/// - `stats` becomes `client/stats`
/// - `replies` and `replies/...` move under `client/replies`
/// - everything else passes through unchanged
pub fn backend_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.first() {
        Some(&"stats") => "client/stats".to_string(),
        Some(&"replies") if segments.len() > 1 => {
            format!("client/replies/{}", segments[1..].join("/"))
        }
        Some(&"replies") => "client/replies".to_string(),
        _ => segments.join("/"),
    }
}

/// Join a base URL and a logical path into a full backend URL.
pub fn backend_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), backend_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_maps_to_client_namespace() {
        assert_eq!(backend_path("/stats"), "client/stats");
        assert_eq!(backend_path("stats"), "client/stats");
    }

    #[test]
    fn test_replies_map_to_client_namespace() {
        assert_eq!(backend_path("/replies"), "client/replies");
        assert_eq!(backend_path("/replies/abc-123"), "client/replies/abc-123");
        assert_eq!(backend_path("/replies/abc/thread"), "client/replies/abc/thread");
    }

    #[test]
    fn test_other_paths_pass_through() {
        assert_eq!(backend_path("/leads"), "leads");
        assert_eq!(backend_path("/companies/7"), "companies/7");
        assert_eq!(backend_path("/client/icp"), "client/icp");
        assert_eq!(backend_path("//client//stats"), "client/stats");
    }

    #[test]
    fn test_backend_url_trims_trailing_slash() {
        assert_eq!(
            backend_url("http://localhost:8000/api/", "/replies/9"),
            "http://localhost:8000/api/client/replies/9"
        );
    }
}
