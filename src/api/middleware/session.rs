//! 用户会话中间件
//!
//! 从会话 Cookie 或 Bearer header 中解析 JWT，把当前用户放进 request
//! extensions。token 无效、过期或用户不存在时按匿名请求处理。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::api::jwt::get_jwt_service;
use crate::config::get_config;
use crate::storage::SeaOrmStorage;

/// 已登录用户，handler 通过 `req.extensions().get::<CurrentUser>()` 获取
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
}

#[derive(Clone, Default)]
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionService {
            service: Rc::new(service),
            cookie_name: get_config().api.session_cookie_name.clone(),
        }))
    }
}

pub struct SessionService<S> {
    service: Rc<S>,
    cookie_name: String,
}

/// Cookie 优先，其次 `Authorization: Bearer`
fn extract_token(req: &ServiceRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

impl<S, B> Service<ServiceRequest> for SessionService<S>
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
        let token = extract_token(&req, &self.cookie_name);

        Box::pin(async move {
            let Some(token) = token else {
                return srv.call(req).await;
            };

            let user_id = match get_jwt_service().validate_session_token(&token) {
                Ok(claims) => claims.user_id(),
                Err(e) => {
                    debug!("Session token rejected: {}", e);
                    None
                }
            };

            if let Some(user_id) = user_id {
                let storage = req.app_data::<web::Data<Arc<SeaOrmStorage>>>().cloned();
                match storage {
                    Some(storage) => match storage.get_user(user_id).await {
                        Ok(Some(user)) if user.is_active => {
                            trace!("Session user {} authenticated", user.id);
                            req.extensions_mut().insert(CurrentUser { id: user.id });
                        }
                        Ok(_) => debug!("Session user {} missing or inactive", user_id),
                        Err(e) => warn!("Failed to load session user {}: {}", user_id, e),
                    },
                    None => warn!("Storage not registered, session ignored"),
                }
            }

            srv.call(req).await
        })
    }
}
