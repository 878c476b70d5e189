mod set_user_disabled;

use actix_web::web;
use set_user_disabled::{disable_user_controller, enable_user_controller};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/user/disable", web::post().to(disable_user_controller));
    cfg.route("/user/enable", web::post().to(enable_user_controller));
}
