//! Gem server routes
//!
//! All gem server traffic lands here. The core picks the source from the
//! path prefix (`/redirect/<upstream>`, `/upstream/<upstream>`, or the
//! default upstream) and the endpoint from the remaining path.

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use gem_core::Outcome;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Any method, any path not claimed by another route
pub(super) async fn serve(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    debug!("{} {}", method, uri);

    let outcome = state.gems.handle(&method, uri.path(), uri.query()).await?;
    outcome_response(outcome)
}

fn outcome_response(outcome: Outcome) -> Result<Response, ApiError> {
    match outcome {
        Outcome::Redirect {
            location,
            cache_control,
        } => {
            let location = HeaderValue::from_str(&location)
                .map_err(|_| ApiError::BadRequest(format!("Invalid upstream URL: {}", location)))?;

            let mut response = StatusCode::FOUND.into_response();
            let headers = response.headers_mut();
            headers.insert(header::LOCATION, location);
            if let Some(cache_control) = cache_control {
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
            }
            Ok(response)
        }
        Outcome::Forbidden(message) => Ok((StatusCode::FORBIDDEN, message).into_response()),
        Outcome::Gem(gem) => {
            let mut response = (StatusCode::OK, gem.content).into_response();
            let headers = response.headers_mut();

            for (name, value) in &gem.properties {
                match (
                    HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    (Ok(name), Ok(value)) => {
                        headers.insert(name, value);
                    }
                    _ => warn!("Skipping unusable stored header {}: {}", name, value),
                }
            }

            Ok(response)
        }
    }
}
