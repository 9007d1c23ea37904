use crate::helpers::JsonError;
use crate::middleware::authentication::method;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse},
    http::StatusCode,
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

pub struct BearerAuthMiddleware<S> {
    pub(super) service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            if let Err(failure) = method::try_jwt(&mut req) {
                tracing::warn!(code = failure.code(), "authentication rejected: {}", failure);
                return Err(JsonError::new(failure.to_string(), failure.code())
                    .into_error(StatusCode::UNAUTHORIZED));
            }
            service.call(req).await
        })
    }
}
