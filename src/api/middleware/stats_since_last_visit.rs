//! "Since your last visit" middleware
//!
//! Runs the activity summary for the logged-in user before the view and
//! queues the resulting notice as a flash message.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, trace};

use crate::api::messages::FlashStore;
use crate::api::middleware::session::CurrentUser;
use crate::config::get_config;
use crate::services::activity::{FlashMessage, MessageSink, notify_since_last_visit};
use crate::services::clock::{Clock, SystemClock};
use crate::storage::SeaOrmStorage;

#[derive(Clone)]
pub struct StatsSinceLastVisit {
    clock: Arc<dyn Clock>,
    min_days: i64,
}

impl Default for StatsSinceLastVisit {
    fn default() -> Self {
        Self::new(
            Arc::new(SystemClock),
            get_config().affiliates.activity_message_min_days,
        )
    }
}

impl StatsSinceLastVisit {
    pub fn new(clock: Arc<dyn Clock>, min_days: i64) -> Self {
        Self { clock, min_days }
    }
}

impl<S, B> Transform<S, ServiceRequest> for StatsSinceLastVisit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = StatsSinceLastVisitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StatsSinceLastVisitService {
            service: Rc::new(service),
            clock: Arc::clone(&self.clock),
            min_days: self.min_days,
        }))
    }
}

pub struct StatsSinceLastVisitService<S> {
    service: Rc<S>,
    clock: Arc<dyn Clock>,
    min_days: i64,
}

impl<S, B> Service<ServiceRequest> for StatsSinceLastVisitService<S>
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
        let clock = Arc::clone(&self.clock);
        let min_days = self.min_days;
        let user = req.extensions().get::<CurrentUser>().copied();

        Box::pin(async move {
            let Some(user) = user else {
                return srv.call(req).await;
            };
            let Some(storage) = req.app_data::<web::Data<Arc<SeaOrmStorage>>>().cloned() else {
                return srv.call(req).await;
            };

            let mut notices: Vec<FlashMessage> = Vec::new();
            // 统计失败不影响页面本身
            if let Err(e) =
                notify_since_last_visit(&storage, clock.as_ref(), min_days, user.id, &mut notices)
                    .await
            {
                error!("Activity summary for user {} failed: {}", user.id, e);
            }

            if !notices.is_empty() {
                trace!("Queued {} activity notice(s) for user {}", notices.len(), user.id);
                let mut extensions = req.extensions_mut();
                if extensions.get::<FlashStore>().is_none() {
                    extensions.insert(FlashStore::default());
                }
                if let Some(store) = extensions.get_mut::<FlashStore>() {
                    for notice in notices {
                        store.add(notice.level, notice.message);
                    }
                }
            }

            srv.call(req).await
        })
    }
}
