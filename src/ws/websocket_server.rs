use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use crate::airport::{Airport, AirportCatalog, RoutePicker};
use crate::error::AppError;
use crate::flight::{FlightContext, Route, SeatStatus, seat};
use crate::notification::Banner;
use crate::session::{
    FocusStrategy, SessionError, SessionHandle, SessionMode, SessionUpdate, Snapshot,
};

/// Messages a browser client sends.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Search {
        query: String,
    },
    /// Map click on an airport marker.
    Click {
        iata: String,
    },
    ClearSelection,
    Seats,
    /// Missing ends fall back to the clicked selection.
    Board {
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
        #[serde(default)]
        seat: Option<String>,
    },
    CancelBoarding,
    Start {
        strategy: FocusStrategy,
    },
    Abort,
    Query,
}

/// Replies to a [`ClientCommand`], plus the banner pushed on snack breaks.
/// Session updates are sent as their own [`SessionUpdate`] JSON.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Response {
        success: bool,
        message: Option<String>,
    },
    SearchResults {
        airports: Vec<Airport>,
    },
    Selection {
        from: Option<Airport>,
        to: Option<Airport>,
        ready: bool,
        distance_km: Option<f64>,
        estimated_flight_seconds: Option<u64>,
    },
    SeatMap {
        seats: Vec<SeatStatus>,
    },
    Snapshot {
        snapshot: Snapshot,
    },
    Notification {
        banner: Banner,
    },
}

impl ServerMessage {
    fn ok(message: impl Into<String>) -> Self {
        ServerMessage::Response {
            success: true,
            message: Some(message.into()),
        }
    }

    fn error(e: &AppError) -> Self {
        ServerMessage::Response {
            success: false,
            message: Some(e.to_string()),
        }
    }

    fn selection(picker: &RoutePicker) -> Self {
        let route = picker.route().and_then(Result::ok);
        ServerMessage::Selection {
            from: picker.from().cloned(),
            to: picker.to().cloned(),
            ready: picker.is_ready(),
            distance_km: route.as_ref().map(Route::distance_km),
            estimated_flight_seconds: route.as_ref().map(Route::estimated_flight_seconds),
        }
    }
}

pub async fn start_websocket_server(
    addr: SocketAddr,
    session: SessionHandle,
    catalog: Arc<AirportCatalog>,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(&addr).await?;
    info!("WebSocket server listening on: {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        info!("New WebSocket connection from: {}", peer_addr);
        tokio::spawn(handle_connection(
            stream,
            peer_addr,
            session.clone(),
            Arc::clone(&catalog),
        ));
    }

    Ok(())
}

/// Runs one client command against the session. `picker` holds this
/// client's map selection.
pub async fn dispatch(
    command: ClientCommand,
    session: &SessionHandle,
    catalog: &AirportCatalog,
    picker: &mut RoutePicker,
) -> ServerMessage {
    match execute(command, session, catalog, picker).await {
        Ok(message) => message,
        Err(e) => {
            debug!("command failed: {}", e);
            ServerMessage::error(&e)
        }
    }
}

/// The selection only changes on the ground.
async fn ensure_idle(session: &SessionHandle, operation: &'static str) -> Result<(), AppError> {
    let mode = session.query().await?.state.mode;
    if mode != SessionMode::Idle {
        return Err(SessionError::InvalidTransition { operation, mode }.into());
    }
    Ok(())
}

fn pick(
    iata: Option<String>,
    selected: Option<&Airport>,
    catalog: &AirportCatalog,
) -> Result<Airport, AppError> {
    match iata {
        Some(iata) => Ok(catalog.find(&iata)?.clone()),
        None => selected.cloned().ok_or(AppError::NoRoute),
    }
}

async fn execute(
    command: ClientCommand,
    session: &SessionHandle,
    catalog: &AirportCatalog,
    picker: &mut RoutePicker,
) -> Result<ServerMessage, AppError> {
    let message = match command {
        ClientCommand::Search { query } => ServerMessage::SearchResults {
            airports: catalog.search(&query).into_iter().cloned().collect(),
        },
        ClientCommand::Click { iata } => {
            ensure_idle(session, "pick an airport").await?;
            picker.click(catalog.find(&iata)?.clone());
            ServerMessage::selection(picker)
        }
        ClientCommand::ClearSelection => {
            ensure_idle(session, "clear the selection").await?;
            picker.reset();
            ServerMessage::selection(picker)
        }
        ClientCommand::Seats => ServerMessage::SeatMap {
            seats: seat::cabin().map(SeatStatus::from).collect(),
        },
        ClientCommand::Board { from, to, seat: seat_id } => {
            let origin = pick(from, picker.from(), catalog)?;
            let destination = pick(to, picker.to(), catalog)?;
            let route = Route::new(origin.clone(), destination.clone())?;
            let seat = seat_id.map(|id| seat::reserve(&id)).transpose()?;
            let context = FlightContext::new(route, seat.map(|s| s.id()));
            session.board(context).await?;
            picker.set_from(Some(origin));
            picker.set_to(Some(destination));
            ServerMessage::ok("Boarding")
        }
        ClientCommand::CancelBoarding => {
            session.cancel_boarding().await?;
            ServerMessage::ok("Boarding cancelled")
        }
        ClientCommand::Start { strategy } => {
            session.start(strategy).await?;
            ServerMessage::ok("Departed")
        }
        ClientCommand::Abort => {
            session.abort().await?;
            ServerMessage::ok("Flight aborted")
        }
        ClientCommand::Query => ServerMessage::Snapshot {
            snapshot: session.query().await?,
        },
    };
    Ok(message)
}

/// JSON frames to push to a client for one session update.
fn outgoing(update: &SessionUpdate) -> Vec<String> {
    let mut frames = Vec::new();
    if let Ok(json) = serde_json::to_string(update) {
        frames.push(json);
    }
    if let SessionUpdate::State { events, .. } = update {
        for banner in events.iter().filter_map(Banner::for_event) {
            if let Ok(json) = serde_json::to_string(&ServerMessage::Notification { banner }) {
                frames.push(json);
            }
        }
    }
    frames
}

async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    session: SessionHandle,
    catalog: Arc<AirportCatalog>,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed with {}: {}", peer_addr, e);
            return;
        }
    };

    debug!("WebSocket handshake completed with {}", peer_addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let mut updates = session.subscribe();
    let mut picker = RoutePicker::new();

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                let Some(msg) = msg else { break };
                let reply = match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ClientCommand>(&text) {
                        Ok(command) => {
                            debug!("[WebSocket] Received: {:?}", command);
                            dispatch(command, &session, &catalog, &mut picker).await
                        }
                        Err(e) => {
                            warn!("Failed to parse message: {}", e);
                            ServerMessage::Response {
                                success: false,
                                message: Some(format!("Parse error: {}", e)),
                            }
                        }
                    },
                    Ok(Message::Close(_)) => {
                        info!("WebSocket connection closed by {}", peer_addr);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                            warn!("Failed to send pong: {}", e);
                            break;
                        }
                        continue;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("WebSocket error from {}: {}", peer_addr, e);
                        break;
                    }
                };

                if let Ok(response_json) = serde_json::to_string(&reply) {
                    if let Err(e) = ws_sender.send(Message::Text(response_json)).await {
                        warn!("Failed to send WebSocket response: {}", e);
                        break;
                    }
                }
            }
            update = updates.recv() => match update {
                Ok(update) => {
                    for json in outgoing(&update) {
                        if let Err(e) = ws_sender.send(Message::Text(json)).await {
                            warn!("Failed to push update to {}: {}", peer_addr, e);
                            return;
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "client {} fell behind on updates", peer_addr);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("WebSocket connection with {} terminated", peer_addr);
}
