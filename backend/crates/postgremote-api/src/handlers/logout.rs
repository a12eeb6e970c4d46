//! POST /v1/api/logout - clears the credential cookie

use crate::executor::RequestExecutor;
use actix_web::{web, HttpResponse};
use postgremote_auth::create_logout_cookie;
use std::sync::Arc;

pub async fn logout_handler(executor: web::Data<Arc<RequestExecutor>>) -> HttpResponse {
    let cookie = create_logout_cookie(&executor.settings().cookie);
    HttpResponse::Ok().cookie(cookie).json(true)
}
