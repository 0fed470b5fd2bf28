//! Flash message middleware
//!
//! Loads the `messages` cookie into a [`FlashStore`] before the handler runs
//! and writes back whatever no page consumed.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::warn;

use crate::api::constants::MESSAGES_COOKIE_NAME;
use crate::api::messages::{FlashStore, messages_cookie, removal_cookie};

#[derive(Clone, Default)]
pub struct FlashMessages;

impl<S, B> Transform<S, ServiceRequest> for FlashMessages
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = FlashMessagesService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(FlashMessagesService {
            service: Rc::new(service),
        }))
    }
}

pub struct FlashMessagesService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for FlashMessagesService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
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
        let store = FlashStore::from_cookie(
            req.cookie(MESSAGES_COOKIE_NAME)
                .as_ref()
                .map(|c| c.value()),
        );
        req.extensions_mut().insert(store);

        Box::pin(async move {
            let mut response = srv.call(req).await?;

            let store = response.request().extensions_mut().remove::<FlashStore>();
            let Some(store) = store else {
                return Ok(response);
            };

            let cookie = match store.pending() {
                Some(pending) if pending.is_empty() => {
                    if !store.had_cookie() {
                        return Ok(response);
                    }
                    removal_cookie()
                }
                Some(pending) => messages_cookie(&pending),
                None => return Ok(response),
            };
            if let Err(e) = response.response_mut().add_cookie(&cookie) {
                warn!("Failed to set messages cookie: {}", e);
            }
            Ok(response)
        })
    }
}
