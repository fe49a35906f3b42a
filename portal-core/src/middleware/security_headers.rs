use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Pages load htmx from unpkg; everything else must come from our own origin.
const PAGE_CSP: &str = "default-src 'self'; \
                        script-src 'self' https://unpkg.com; \
                        style-src 'self' 'unsafe-inline'; \
                        img-src 'self' data:; \
                        connect-src 'self'; \
                        form-action 'self'; \
                        frame-ancestors 'none'";

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(PAGE_CSP),
    );

    response
}
