use actix_web::{rt, web, Error, HttpRequest, HttpResponse};
use actix_ws::{Message, Session};
use futures::StreamExt;
use serde::Deserialize;

use super::failure;
use crate::events::{Event, EventSubscriber};
use crate::services::auth_service;
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// `GET /ws?token=<jwt>`: upgrades to a WebSocket that streams write events.
pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<SocketQuery>,
) -> Result<HttpResponse, Error> {
    let Some(token) = query.token.as_deref() else {
        return Ok(failure(
            "GET /ws",
            AppError::Unauthorized("Missing token query parameter".to_string()),
        ));
    };
    let claims = match auth_service::verify_access_token(&state.config.jwt, token) {
        Ok(claims) => claims,
        Err(e) => return Ok(failure("GET /ws", e)),
    };

    let (response, session, messages) = actix_ws::handle(&req, body)?;
    let subscriber = state.events.subscribe();
    log::info!("🔌 Socket connected: {} ({})", claims.email, claims.sub);

    rt::spawn(run_session(claims.sub, session, messages, subscriber));
    Ok(response)
}

async fn run_session(
    user_id: String,
    mut session: Session,
    mut messages: actix_ws::MessageStream,
    mut events: EventSubscriber,
) {
    let hello = serde_json::json!({ "event": "connected", "data": { "user_id": &user_id } });
    if session.text(hello.to_string()).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) if event.is_visible_to(&user_id) => {
                    if forward(&mut session, &event).await.is_err() {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            },
            message = messages.next() => match message {
                Some(Ok(Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(reason))) => {
                    log::info!("🔌 Socket closed by client: {}", user_id);
                    let _ = session.close(reason).await;
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::warn!("⚠️ Socket protocol error for {}: {}", user_id, e);
                    break;
                }
                None => break,
            },
        }
    }

    log::info!("🔌 Socket session ended: {}", user_id);
    let _ = session.close(None).await;
}

async fn forward(session: &mut Session, event: &Event) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(event) {
        Ok(text) => session.text(text).await,
        Err(e) => {
            log::warn!("⚠️ Dropping unserializable event {}: {}", event.event, e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::routes;
    use crate::test_support::test_state;
    use actix_web::{test, web, App};

    #[actix_rt::test]
    async fn socket_requires_a_valid_token() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(test_state())).configure(routes::configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/ws").to_request()).await;
        assert_eq!(resp.status(), 401);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/ws?token=nope").to_request()).await;
        assert_eq!(resp.status(), 401);
    }
}
