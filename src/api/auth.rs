//! AuthContext 提取器
//!
//! handler 只看到 [`AuthContext`]，不关心会话如何存储。

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::services::{AuthContext, SharedSessionStore};

impl FromRequest for AuthContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    /// 从 app_data 中注册的 SessionStore 读取；未注册时视为未认证
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let ctx = match req.app_data::<web::Data<SharedSessionStore>>() {
            Some(store) => store.load(req),
            None => {
                warn!("No session store registered, treating request as anonymous");
                AuthContext::anonymous()
            }
        };

        ready(Ok(ctx))
    }
}
