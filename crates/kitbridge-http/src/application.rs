//! The processing entry point.

use crate::{BoxError, ServerRequest, ServerResponse};
use std::fmt;
use std::sync::Arc;

/// An in-process web application.
///
/// `process` receives a fully built request and a skeleton response and
/// returns the final response. Routing and middleware happen inside and are
/// opaque to callers.
pub trait Application: Send + Sync {
    /// Runs the application for one request.
    fn process(
        &self,
        request: ServerRequest,
        response: ServerResponse,
    ) -> Result<ServerResponse, BoxError>;
}

impl<A: Application + ?Sized> Application for Arc<A> {
    fn process(
        &self,
        request: ServerRequest,
        response: ServerResponse,
    ) -> Result<ServerResponse, BoxError> {
        (**self).process(request, response)
    }
}

impl<A: Application + ?Sized> Application for Box<A> {
    fn process(
        &self,
        request: ServerRequest,
        response: ServerResponse,
    ) -> Result<ServerResponse, BoxError> {
        (**self).process(request, response)
    }
}

/// Wraps a closure as an [`Application`].
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use kitbridge_http::{application_fn, Application};
///
/// let app = application_fn(|_req, res| Ok(res.with_status(StatusCode::ACCEPTED)));
/// # let _ = &app as &dyn Application;
/// ```
pub fn application_fn<F>(f: F) -> ApplicationFn<F>
where
    F: Fn(ServerRequest, ServerResponse) -> Result<ServerResponse, BoxError> + Send + Sync,
{
    ApplicationFn { f }
}

/// Application returned by [`application_fn`].
#[derive(Clone, Copy)]
pub struct ApplicationFn<F> {
    f: F,
}

impl<F> Application for ApplicationFn<F>
where
    F: Fn(ServerRequest, ServerResponse) -> Result<ServerResponse, BoxError> + Send + Sync,
{
    fn process(
        &self,
        request: ServerRequest,
        response: ServerResponse,
    ) -> Result<ServerResponse, BoxError> {
        (self.f)(request, response)
    }
}

impl<F> fmt::Debug for ApplicationFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationFn").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Environment, Stream};
    use http::{HeaderMap, StatusCode};

    #[test]
    fn test_application_fn_processes() {
        let app = application_fn(|req, res| {
            let body = format!("{} {}", req.method(), req.uri().path());
            Ok(res.write(body)?)
        });

        let env = Environment::mock([("REQUEST_URI", "/ping")]);
        let request = ServerRequest::from_environment(&env).unwrap();
        let response = ServerResponse::new(StatusCode::OK, HeaderMap::new(), Stream::new());

        let response = app.process(request, response).unwrap();
        assert_eq!(response.body().contents(), "GET /ping");
    }

    #[test]
    fn test_application_fn_errors_pass_through() {
        let app = application_fn(|_req, _res| Err("boom".into()));
        let env = Environment::mock(Vec::<(String, String)>::new());
        let request = ServerRequest::from_environment(&env).unwrap();
        let response = ServerResponse::new(StatusCode::OK, HeaderMap::new(), Stream::new());

        let err = app.process(request, response).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_shared_application() {
        let app: Arc<dyn Application> =
            Arc::new(application_fn(|_req, res| Ok(res.with_status(StatusCode::CREATED))));
        let shared = Arc::clone(&app);

        let env = Environment::mock(Vec::<(String, String)>::new());
        let request = ServerRequest::from_environment(&env).unwrap();
        let response = ServerResponse::new(StatusCode::OK, HeaderMap::new(), Stream::new());

        let response = shared.process(request, response).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
