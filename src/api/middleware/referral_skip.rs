//! Referral skip middleware
//!
//! Referral redirects are the hottest path and need neither the session nor
//! flash messages. Requests whose path resolves to one of `view_names` are
//! answered by calling the view directly; everything else continues down the
//! middleware stack untouched.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{trace, warn};

use crate::api::routing::{Router, get_router};
use crate::api::services::referral::{ResolvedView, resolved_views};

/// Views skipped past the middleware stack by default
pub const DEFAULT_SKIP_VIEWS: [&str; 3] = ["links.referral", "banners.link", "banners.link.old"];

#[derive(Clone)]
pub struct ReferralSkip {
    router: Rc<Router>,
    view_names: Rc<Vec<String>>,
    views: Rc<HashMap<&'static str, ResolvedView>>,
}

impl Default for ReferralSkip {
    fn default() -> Self {
        Self::new(get_router().clone(), &DEFAULT_SKIP_VIEWS, resolved_views())
    }
}

impl ReferralSkip {
    pub fn new(
        router: Router,
        view_names: &[&str],
        views: HashMap<&'static str, ResolvedView>,
    ) -> Self {
        Self {
            router: Rc::new(router),
            view_names: Rc::new(view_names.iter().map(|s| s.to_string()).collect()),
            views: Rc::new(views),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ReferralSkip
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ReferralSkipService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ReferralSkipService {
            service: Rc::new(service),
            config: self.clone(),
        }))
    }
}

pub struct ReferralSkipService<S> {
    service: Rc<S>,
    config: ReferralSkip,
}

impl<S> ReferralSkipService<S> {
    /// The view to call directly, if the path resolves to a skipped view
    fn skip_target(
        &self,
        path: &str,
    ) -> Option<(ResolvedView, crate::api::routing::ResolverMatch)> {
        let resolved = self.config.router.resolve(path).ok()?;
        if !self.config.view_names.contains(&resolved.view_name) {
            return None;
        }
        match self.config.views.get(resolved.view_name.as_str()) {
            Some(view) => Some((Rc::clone(view), resolved)),
            None => {
                warn!("No direct view registered for {}", resolved.view_name);
                None
            }
        }
    }
}

impl<S, B> Service<ServiceRequest> for ReferralSkipService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        let Some((view, resolved)) = self.skip_target(req.path()) else {
            return Box::pin(async move { Ok(srv.call(req).await?.map_into_left_body()) });
        };

        trace!("Skipping middleware for {}", resolved.view_name);
        Box::pin(async move {
            let (http_req, _payload) = req.into_parts();
            let response = view(http_req.clone(), resolved).await;
            Ok(ServiceResponse::new(http_req, response).map_into_right_body())
        })
    }
}
