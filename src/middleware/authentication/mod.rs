//! Bearer-token authentication for the protected scope.
//!
//! `BearerAuth` resolves the caller and attaches `Arc<models::AuthUser>`
//! to the request extensions; handlers read it with `web::ReqData`.

mod getheader;
mod manager;
mod manager_middleware;
mod method;

use getheader::authorization_header;
pub use manager::BearerAuth;
pub use manager_middleware::BearerAuthMiddleware;
