use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use tokio::sync::{broadcast, oneshot};

use crate::game::{GameAction, JoinInfo, TableCommand, TableHandle, TableRegistry};
use crate::models::{Audience, ClientEvent, Outbound, ServerEvent};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<TableRegistry>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    let Ok(text) = serde_json::to_string(event) else { return true };
    socket.send(Message::Text(text)).await.is_ok()
}

async fn send_error(socket: &mut WebSocket, message: impl Into<String>) -> bool {
    send_event(socket, &ServerEvent::Error { message: message.into() }).await
}

/// Pre-join phase: the client creates/joins/spectates/resumes until it has
/// an identity at a table. Everything else is rejected with an error.
async fn establish_identity(
    socket: &mut WebSocket,
    registry: &TableRegistry,
) -> Option<(TableHandle, JoinInfo, broadcast::Receiver<Outbound>)> {
    loop {
        let msg = socket.recv().await?;
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        };
        let Ok(event) = serde_json::from_str::<ClientEvent>(&text) else {
            if !send_error(socket, "malformed message").await {
                return None;
            }
            continue;
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let (handle, command) = match event {
            ClientEvent::CreateTable { name, max_players } => {
                let handle = registry.create_table(&name, max_players);
                if !send_event(socket, &ServerEvent::TableCreated { table_id: handle.table_id })
                    .await
                {
                    return None;
                }
                continue;
            }
            ClientEvent::Join { table_id, username } => match registry.get(table_id) {
                Some(handle) => (handle, TableCommand::Join { username, reply: reply_tx }),
                None => {
                    if !send_error(socket, "table not found").await {
                        return None;
                    }
                    continue;
                }
            },
            ClientEvent::Spectate { table_id, username } => match registry.get(table_id) {
                Some(handle) => (handle, TableCommand::Spectate { username, reply: reply_tx }),
                None => {
                    if !send_error(socket, "table not found").await {
                        return None;
                    }
                    continue;
                }
            },
            ClientEvent::Resume { token } => match registry.resolve(&token) {
                Ok(handle) => (handle, TableCommand::Resume { token, reply: reply_tx }),
                Err(err) => {
                    if !send_error(socket, err.to_string()).await {
                        return None;
                    }
                    continue;
                }
            },
            _ => {
                if !send_error(socket, "join a table first").await {
                    return None;
                }
                continue;
            }
        };

        // Subscribe before the join command is processed so the snapshot
        // broadcast on join cannot be missed.
        let events = handle.subscribe();
        if handle.tx.send(command).await.is_err() {
            return None;
        }
        match reply_rx.await {
            Ok(Ok(info)) => {
                if !send_event(
                    socket,
                    &ServerEvent::Joined {
                        table_id: info.table_id,
                        player_id: info.player_id,
                        token: info.token.clone(),
                    },
                )
                .await
                {
                    return None;
                }
                return Some((handle, info, events));
            }
            Ok(Err(err)) => {
                if !send_error(socket, err.to_string()).await {
                    return None;
                }
            }
            Err(_) => return None,
        }
    }
}

fn to_game_action(event: ClientEvent) -> Option<GameAction> {
    match event {
        ClientEvent::StartGame => Some(GameAction::StartGame),
        ClientEvent::PlayCard { card_index, chosen_color } => {
            Some(GameAction::PlayCard { card_index, chosen_color })
        }
        ClientEvent::DrawCard => Some(GameAction::DrawCard),
        ClientEvent::DeclareUno => Some(GameAction::DeclareUno),
        ClientEvent::ChallengeUno { target_id } => Some(GameAction::ChallengeUno { target_id }),
        _ => None,
    }
}

async fn handle_socket(mut socket: WebSocket, registry: Arc<TableRegistry>) {
    let Some((handle, info, mut events)) = establish_identity(&mut socket, &registry).await else {
        return;
    };
    let player_id = info.player_id;
    tracing::info!(table_id = %handle.table_id, %player_id, "[WS] connected");

    // Leaving the table tears the roster entry down inside the actor, so
    // the exit path must not double-report a disconnect.
    let mut left_table = false;

    loop {
        tokio::select! {
            outbound = events.recv() => {
                match outbound {
                    Ok(Outbound { audience, event }) => {
                        // Private payloads for someone else never leave
                        // the process.
                        if let Audience::Only(target) = audience {
                            if target != player_id {
                                continue;
                            }
                        }
                        if !send_event(&mut socket, &event).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%player_id, skipped, "[WS] lagged on events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(event) = serde_json::from_str::<ClientEvent>(&text) else {
                            if !send_error(&mut socket, "malformed message").await {
                                break;
                            }
                            continue;
                        };

                        match event {
                            ClientEvent::LeaveTable => {
                                let (tx, rx) = oneshot::channel();
                                let cmd = TableCommand::Leave { player_id, reply: tx };
                                if handle.tx.send(cmd).await.is_err() {
                                    break;
                                }
                                match rx.await {
                                    Ok(Ok(())) => {
                                        left_table = true;
                                        break;
                                    }
                                    Ok(Err(err)) => {
                                        if !send_error(&mut socket, err.to_string()).await {
                                            break;
                                        }
                                    }
                                    Err(_) => break,
                                }
                            }

                            ClientEvent::AddBot { username } => {
                                let (tx, rx) = oneshot::channel();
                                let cmd = TableCommand::AddBot { username, reply: tx };
                                if handle.tx.send(cmd).await.is_err() {
                                    break;
                                }
                                if let Ok(Err(err)) = rx.await {
                                    if !send_error(&mut socket, err.to_string()).await {
                                        break;
                                    }
                                }
                            }

                            other => {
                                let Some(action) = to_game_action(other) else {
                                    if !send_error(&mut socket, "already at a table").await {
                                        break;
                                    }
                                    continue;
                                };

                                let (tx, rx) = oneshot::channel();
                                let cmd = TableCommand::Action { player_id, action, reply: tx };
                                if handle.tx.send(cmd).await.is_err() {
                                    break;
                                }
                                // Failures go back to this requester only.
                                if let Ok(Err(err)) = rx.await {
                                    if !send_error(&mut socket, err.to_string()).await {
                                        break;
                                    }
                                }
                            }
                        }
                    }

                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    if !left_table {
        let _ = handle.tx.send(TableCommand::Disconnected { player_id }).await;
    }
    tracing::info!(table_id = %handle.table_id, %player_id, "[WS] disconnected");
}
