//! Route composition for the local HTTP control API (§6).

use std::convert::Infallible;
use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::daemon::Daemon;

use super::handlers;

pub fn routes(
    daemon: Arc<Daemon>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let status = warp::path!("status")
        .and(warp::get())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and_then(handlers::status);

    let rooms = warp::path!("rooms")
        .and(warp::get())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and_then(handlers::list_rooms);

    let rooms_create = warp::path!("rooms" / "create")
        .and(warp::post())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and(warp::body::json())
        .and_then(handlers::create_room);

    let rooms_join = warp::path!("rooms" / "join")
        .and(warp::post())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and(warp::body::json())
        .and_then(handlers::join_room);

    let rooms_leave = warp::path!("rooms" / "leave")
        .and(warp::post())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and(warp::body::json())
        .and_then(handlers::leave_room);

    let send = warp::path!("send")
        .and(warp::post())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and(warp::body::json())
        .and_then(handlers::send_message);

    let messages = warp::path!("messages")
        .and(warp::get())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and(warp::query::<super::responses::MessagesQuery>())
        .and_then(handlers::read_messages);

    let history = warp::path!("history")
        .and(warp::get())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon.clone()))
        .and(warp::query::<super::responses::HistoryQuery>())
        .and_then(handlers::history);

    let stop = warp::path!("stop")
        .and(warp::post())
        .and(authed(daemon.clone()))
        .and(with_daemon(daemon))
        .and_then(handlers::stop);

    status
        .or(rooms)
        .or(rooms_create)
        .or(rooms_join)
        .or(rooms_leave)
        .or(send)
        .or(messages)
        .or(history)
        .or(stop)
        .recover(handlers::handle_rejection)
}

fn with_daemon(
    daemon: Arc<Daemon>,
) -> impl Filter<Extract = (Arc<Daemon>,), Error = Infallible> + Clone {
    warp::any().map(move || daemon.clone())
}

fn authed(daemon: Arc<Daemon>) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let expected = daemon.token.clone();
        async move { handlers::require_bearer(header, expected).await }
    })
}
