use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

// Swagger UI needs inline assets and same-origin framing.
const DOCS_CSP: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data:; \
     font-src 'self'; \
     connect-src 'self'";

const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

fn is_docs_path(path: &str) -> bool {
    path.starts_with("/docs") || path == "/.well-known/openapi.json"
}

fn apply_headers(headers: &mut HeaderMap, docs: bool) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );

    let (csp, framing) = if docs {
        (DOCS_CSP, "SAMEORIGIN")
    } else {
        (API_CSP, "DENY")
    };
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(csp),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static(framing),
    );
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let docs = is_docs_path(req.uri().path());
    let mut response = next.run(req).await;
    apply_headers(response.headers_mut(), docs);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_routes_deny_framing() {
        let mut headers = HeaderMap::new();
        apply_headers(&mut headers, is_docs_path("/divisions/x/credentials"));
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }

    #[test]
    fn docs_routes_allow_same_origin() {
        let mut headers = HeaderMap::new();
        apply_headers(&mut headers, is_docs_path("/docs/index.html"));
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
    }
}
