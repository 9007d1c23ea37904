use actix_web::dev::ServiceRequest;
use actix_web::http::header::AUTHORIZATION;

/// Raw `Authorization` value. `Err` when present but not visible ASCII.
pub(crate) fn authorization_header(req: &ServiceRequest) -> Result<Option<&str>, ()> {
    match req.headers().get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value.to_str().map(Some).map_err(|_| ()),
    }
}
