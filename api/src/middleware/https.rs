use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Enforces HTTPS behind a TLS-terminating proxy via `X-Forwarded-Proto`.
///
/// Plain-HTTP reads are redirected to the HTTPS equivalent. Anything else is
/// refused: a 301 makes clients replay a POST as a GET without its body, and a
/// webhook delivered that way would fail signature checks anyway.
pub async fn require_https(req: Request, next: Next) -> Response {
    let proto = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");

    if proto.eq_ignore_ascii_case("http") {
        let mut response = match https_location(&req) {
            Some(uri) if req.method() == Method::GET || req.method() == Method::HEAD => {
                (StatusCode::MOVED_PERMANENTLY, [("location", uri.to_string())]).into_response()
            }
            _ => (StatusCode::FORBIDDEN, "HTTPS required").into_response(),
        };
        add_hsts_header(&mut response);
        return response;
    }

    let mut response = next.run(req).await;
    add_hsts_header(&mut response);
    response
}

fn https_location(req: &Request) -> Option<Uri> {
    let host = req
        .headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("https://{host}{path_and_query}").parse().ok()
}

fn add_hsts_header(response: &mut Response) {
    response.headers_mut().insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
}
