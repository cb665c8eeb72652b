//! # Kitbridge HTTP
//!
//! The native request/response model that kitbridge drives in process.
//!
//! An [`Application`] is invoked with a [`ServerRequest`] and a skeleton
//! [`ServerResponse`] and returns the final response. The request is seeded
//! from a simulated server [`Environment`] and refined through immutable
//! `with_*` updates:
//!
//! ```
//! use http::{HeaderMap, StatusCode};
//! use kitbridge_http::{application_fn, Application, Environment, ServerRequest, ServerResponse, Stream};
//!
//! let app = application_fn(|req, res| {
//!     let greeting = format!("hello {}", req.cookie_param("user").unwrap_or("guest"));
//!     Ok(res.write(greeting)?)
//! });
//!
//! let env = Environment::mock([("HTTP_COOKIE", "user=ada")]);
//! let request = ServerRequest::from_environment(&env).unwrap();
//! let response = ServerResponse::new(StatusCode::OK, HeaderMap::new(), Stream::new());
//!
//! let response = app.process(request, response).unwrap();
//! assert_eq!(response.body().contents(), "hello ada");
//! ```

#![doc(html_root_url = "https://docs.rs/kitbridge-http/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod application;
mod body;
mod cookies;
mod environment;
mod error;
mod headers;
mod request;
mod response;
mod stream;
mod upload;

pub use application::{application_fn, Application, ApplicationFn};
pub use body::{ParsedBody, FORM_URLENCODED, JSON};
pub use cookies::Cookies;
pub use environment::{Environment, DEFAULT_ACCEPT, DEFAULT_USER_AGENT};
pub use error::{BoxError, HttpError, HttpResult};
pub use headers::Headers;
pub use request::ServerRequest;
pub use response::ServerResponse;
pub use stream::{RequestBody, Stream};
pub use upload::{FileFields, UploadError, UploadedFile};
