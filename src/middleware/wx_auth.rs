use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};

/// Checks that requests carry the mini-program signature headers. Real
/// signature verification would need the session key from the login flow;
/// here only header presence is enforced, and debug mode skips the check.
pub struct WxAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for WxAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = WxAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WxAuthMiddlewareService { service }))
    }
}

pub struct WxAuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for WxAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if debug_mode() {
            return Box::pin(self.service.call(req));
        }

        let signed = ["signature", "timestamp", "nonce"]
            .iter()
            .all(|header| req.headers().contains_key(*header));

        if signed {
            Box::pin(self.service.call(req))
        } else {
            Box::pin(ready(Err(ErrorUnauthorized("Missing signature headers"))))
        }
    }
}

fn debug_mode() -> bool {
    std::env::var("DEBUG")
        .map(|v| matches!(v.as_str(), "1" | "true" | "True"))
        .unwrap_or(false)
}
