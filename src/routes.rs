// src/routes.rs
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::dashboard::{get_status, render_active, render_tab, TabQuery};
use crate::handlers::error::ApiError;
use crate::handlers::generate::{generate_all, generate_scenario};
use crate::shell::Shell;

// Recovery handling for our custom errors
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = e.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(shell: Arc<Shell>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let shell_filter = warp::any().map(move || shell.clone());

    let active_route = warp::path!("dashboard")
        .and(warp::get())
        .and(shell_filter.clone())
        .and_then(render_active);

    // Must precede the tab route.
    let status_route = warp::path!("dashboard" / "status")
        .and(warp::get())
        .and(shell_filter.clone())
        .and_then(get_status);

    let tab_route = warp::path!("dashboard" / String)
        .and(warp::get())
        .and(warp::query::<TabQuery>())
        .and(shell_filter.clone())
        .and_then(render_tab);

    let generate_all_route = warp::path!("dashboard" / "generate-all")
        .and(warp::post())
        .and(shell_filter.clone())
        .and_then(generate_all);

    let generate_route = warp::path!("dashboard" / "generate" / String)
        .and(warp::post())
        .and(shell_filter.clone())
        .and_then(generate_scenario);

    info!("All routes configured successfully.");

    active_route
        .or(status_route)
        .or(tab_route)
        .or(generate_all_route)
        .or(generate_route)
        .recover(handle_rejection)
}
