//! Classification of heterogeneous provider failures.
//!
//! Maps HTTP status codes, provider error-body substrings, and transport
//! errors into the closed `IdentifyError` taxonomy. Check order matters:
//! a quota message often also contains "error", so specific patterns run
//! before the generic fallback.

use crate::error::IdentifyError;

/// Classify a non-2xx HTTP response from a provider.
///
/// Status codes are authoritative when they carry a clear meaning; the body
/// text is consulted for providers that bury the real failure in a 400/500.
pub fn classify_http(status: u16, body: &str, timeout_ms: u64) -> IdentifyError {
    match status {
        401 | 403 => IdentifyError::Unauthenticated {
            message: summarize(status, body),
        },
        429 => IdentifyError::QuotaExceeded {
            message: summarize(status, body),
        },
        408 | 504 => IdentifyError::Timeout { timeout_ms },
        400 | 413 | 422 => {
            // Gemini reports quota exhaustion with a 400 + RESOURCE_EXHAUSTED
            // body in some API versions, so substrings win over the status.
            if let Some(err) = classify_body(body) {
                err
            } else {
                IdentifyError::InvalidArgument {
                    message: summarize(status, body),
                }
            }
        }
        _ => classify_body(body).unwrap_or_else(|| IdentifyError::Unknown {
            message: summarize(status, body),
        }),
    }
}

/// Classify a failure the provider reported inside a successful HTTP
/// response (e.g. a failed Replicate prediction). There is no meaningful
/// status code to lean on, so only the message text is consulted.
pub fn classify_provider_message(message: &str) -> IdentifyError {
    classify_body(message).unwrap_or_else(|| IdentifyError::Unknown {
        message: truncate(message),
    })
}

/// Classify a transport-level reqwest failure (no HTTP response received).
pub fn classify_transport(err: &reqwest::Error, timeout_ms: u64) -> IdentifyError {
    if err.is_timeout() {
        return IdentifyError::Timeout { timeout_ms };
    }
    if err.is_request() && err.is_body() {
        return IdentifyError::InvalidArgument {
            message: format!("Request body could not be sent: {err}"),
        };
    }
    IdentifyError::Unknown {
        message: err.to_string(),
    }
}

/// Substring-based classification of a provider error body.
///
/// Ordered most-specific first; returns `None` when nothing matches so the
/// caller can fall back to status-based or generic handling.
fn classify_body(body: &str) -> Option<IdentifyError> {
    let lower = body.to_ascii_lowercase();

    // Quota first: quota messages frequently also contain "invalid" or "error"
    if lower.contains("quota")
        || lower.contains("resource_exhausted")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
    {
        return Some(IdentifyError::QuotaExceeded {
            message: truncate(body),
        });
    }
    if lower.contains("api key")
        || lower.contains("api_key")
        || lower.contains("unauthorized")
        || lower.contains("unauthenticated")
        || lower.contains("permission denied")
    {
        return Some(IdentifyError::Unauthenticated {
            message: truncate(body),
        });
    }
    if lower.contains("invalid image")
        || lower.contains("invalid_image")
        || lower.contains("invalid argument")
        || lower.contains("invalid_argument")
        || lower.contains("could not process image")
    {
        return Some(IdentifyError::InvalidArgument {
            message: truncate(body),
        });
    }
    None
}

fn summarize(status: u16, body: &str) -> String {
    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", truncate(body))
    }
}

/// Cap preserved provider messages; error bodies can embed whole HTML pages.
fn truncate(body: &str) -> String {
    const MAX: usize = 500;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let mut end = MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    }
}
