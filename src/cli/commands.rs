use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::airport::AirportCatalog;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::flight::{FlightContext, Route, SeatStatus, format_hms, seat};
use crate::notification::{self, Banner};
use crate::session::{
    FocusStrategy, SessionDriver, SessionEvent, SessionHandle, SessionMode, SessionState,
    SessionUpdate,
};
use crate::ws::websocket_server;

pub fn load_catalog(path: Option<PathBuf>, config: &Config) -> Result<AirportCatalog> {
    let path = path
        .or_else(|| config.airports_path.clone())
        .ok_or(AppError::NoCatalog)?;
    Ok(AirportCatalog::load(&path)?)
}

fn route(catalog: &AirportCatalog, from: &str, to: &str) -> Result<Route> {
    Ok(Route::new(
        catalog.find(from)?.clone(),
        catalog.find(to)?.clone(),
    )?)
}

pub fn show_route(catalog: &AirportCatalog, from: &str, to: &str) -> Result<()> {
    let route = route(catalog, from, to)?;
    let origin = route.origin();
    let destination = route.destination();
    println!(
        "{} ({}) -> {} ({})",
        origin.iata, origin.city, destination.iata, destination.city
    );
    println!("Distance:       {:.0} km", route.distance_km());
    println!("Initial heading: {:.1}°", route.initial_bearing());
    println!(
        "Flight time:    {}",
        format_hms(route.estimated_flight_seconds())
    );
    Ok(())
}

pub fn search(catalog: &AirportCatalog, query: &str) -> Result<()> {
    let results = catalog.search(query);
    if results.is_empty() {
        println!("No airports match '{}'", query);
    }
    for ap in results {
        println!("{}  {:<20} {}", ap.iata, ap.city, ap.name);
    }
    Ok(())
}

/// Cabin grid, one row per line: `3  .. | .x` with `x` for taken seats.
pub fn seat_map() -> String {
    let mut map = String::new();
    for (i, status) in seat::cabin().map(SeatStatus::from).enumerate() {
        let col = i % seat::COLUMNS.len();
        if col == 0 {
            map.push_str(&format!("{:>2}  ", i / seat::COLUMNS.len() + 1));
        } else if col == seat::COLUMNS.len() / 2 {
            map.push_str(" | ");
        }
        map.push(if status.taken { 'x' } else { '.' });
        if col == seat::COLUMNS.len() - 1 {
            map.push('\n');
        }
    }
    map
}

pub fn seats() {
    println!("    AB | CD");
    print!("{}", seat_map());
}

/// One-line cockpit display for the terminal.
pub fn status_line(state: &SessionState, progress: f64) -> String {
    format!(
        "{} {} {} | ✈ {} to go | {:>3.0}% of route",
        state.pomodoro_phase.emoji(),
        state.pomodoro_phase.as_str(),
        format_hms(state.pomodoro_seconds_remaining),
        format_hms(state.flight_seconds_remaining),
        progress * 100.0
    )
}

pub async fn fly(
    catalog: &AirportCatalog,
    config: &Config,
    from: &str,
    to: &str,
    snacks: bool,
    seat_id: Option<String>,
) -> Result<()> {
    let route = route(catalog, from, to)?;
    let seat = seat_id.map(|id| seat::reserve(&id)).transpose()?;
    let context = FlightContext::new(route, seat.map(|s| s.id()));
    let strategy = if snacks {
        FocusStrategy::Snacks
    } else {
        FocusStrategy::NoSnacks
    };

    println!(
        "🛫 {} -> {}, seat {}, flight time {}",
        context.route.origin().iata,
        context.route.destination().iata,
        context.seat.as_deref().unwrap_or("unassigned"),
        format_hms(context.estimated_flight_seconds)
    );
    println!("Press Ctrl+C to abort the flight\n");

    let (session, driver) = SessionDriver::spawn(config.driver());
    let updates = session.subscribe();
    session.board(context).await?;
    let state = session.start(strategy).await?;
    let result = cockpit(&session, updates, state, config, tokio::signal::ctrl_c()).await;

    session.shutdown();
    if let Err(e) = driver.await {
        warn!("session driver panicked: {}", e);
    }
    result
}

/// Shows the flight until it lands or `abort` resolves and the abort is
/// published.
async fn cockpit<F>(
    session: &SessionHandle,
    mut updates: broadcast::Receiver<SessionUpdate>,
    mut state: SessionState,
    config: &Config,
    abort: F,
) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(abort);
    let mut aborting = false;
    let mut progress = 0.0;

    loop {
        tokio::select! {
            _ = &mut abort, if !aborting => {
                aborting = true;
                session.abort().await?;
            }
            update = updates.recv() => match update {
                Ok(SessionUpdate::Frame { frame }) => progress = frame.progress,
                Ok(SessionUpdate::State { state: next, events, .. }) => {
                    state = next;
                    if report(&events, config) || state.mode == SessionMode::Idle {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "display fell behind"),
                Err(RecvError::Closed) => break,
            },
        }

        if state.mode == SessionMode::Flying {
            print!("\r{}", status_line(&state, progress));
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Prints what happened on this tick. Returns true once the flight is over.
fn report(events: &[SessionEvent], config: &Config) -> bool {
    let now = Local::now().format("%H:%M:%S");
    let mut over = false;
    for event in events {
        match event {
            SessionEvent::PhaseChanged { phase, seconds } if *seconds > 0 => {
                println!(
                    "\n{} [{}] {} for {}",
                    phase.emoji(),
                    now,
                    phase.as_str(),
                    format_hms(*seconds)
                );
            }
            SessionEvent::PhaseChanged { .. } => {}
            SessionEvent::BreakStartedWithSnacks => {
                let banner = Banner::snack_time();
                println!("\n🔔 {} - {}", banner.message, banner.detail);
                if config.notifications {
                    if let Err(e) = notification::send_notification(&banner) {
                        warn!("Failed to send notification: {}", e);
                    }
                }
            }
            SessionEvent::Landed => {
                println!("\n🛬 [{}] Landed. Welcome to your destination.", now);
                over = true;
            }
            SessionEvent::Aborted => {
                println!("\n⛔ [{}] Flight aborted.", now);
                over = true;
            }
        }
    }
    over
}

pub async fn daemon(catalog: AirportCatalog, config: &Config, addr: Option<SocketAddr>) -> Result<()> {
    let addr = addr.unwrap_or(config.ws_addr);
    println!("✈ flight_focus daemon on ws://{}", addr);

    let (session, driver) = SessionDriver::spawn(config.driver());
    let server = websocket_server::start_websocket_server(addr, session.clone(), Arc::new(catalog));

    let result = tokio::select! {
        result = server => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    };

    session.shutdown();
    if let Err(e) = driver.await {
        warn!("session driver panicked: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::catalog::tests::sample;
    use crate::pomodoro::pomodoro::PomodoroPhase;

    #[test]
    fn test_status_line() {
        let state = SessionState {
            mode: SessionMode::Flying,
            pomodoro_phase: PomodoroPhase::Break,
            pomodoro_seconds_remaining: 299,
            flight_seconds_remaining: 3661,
            strategy: Some(FocusStrategy::Snacks),
        };
        let line = status_line(&state, 0.5);
        assert!(line.contains("BREAK 00:04:59"));
        assert!(line.contains("01:01:01 to go"));
        assert!(line.contains(" 50% of route"));
    }

    #[test]
    fn test_report_ends_on_landing_or_abort() {
        let config = Config {
            notifications: false,
            ..Config::default()
        };
        assert!(!report(&[], &config));
        assert!(!report(
            &[SessionEvent::PhaseChanged {
                phase: PomodoroPhase::Break,
                seconds: 300
            }],
            &config
        ));
        assert!(report(&[SessionEvent::Landed], &config));
        assert!(report(&[SessionEvent::Aborted], &config));
    }

    #[test]
    fn test_seat_map_marks_taken_seats() {
        let map = seat_map();
        let rows: Vec<_> = map.lines().collect();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0], " 1  .. | ..");
        // 5B and 6A are taken
        assert_eq!(rows[4], " 5  .x | ..");
        assert!(rows[5].starts_with(" 6  x"));
    }

    #[test]
    fn test_load_catalog_requires_a_path() {
        let err = load_catalog(None, &Config::default()).unwrap_err();
        assert!(matches!(err, AppError::NoCatalog));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cockpit_aborts_once_on_signal() {
        let config = Config {
            notifications: false,
            ..Config::default()
        };
        let context = FlightContext::new(route(&sample(), "JFK", "LHR").unwrap(), None);
        let (session, _task) = SessionDriver::spawn(config.driver());
        let updates = session.subscribe();
        session.board(context).await.unwrap();
        let state = session.start(FocusStrategy::Snacks).await.unwrap();

        // a future that panics if polled again after resolving
        let signal = std::future::ready(Ok(()));
        cockpit(&session, updates, state, &config, signal).await.unwrap();

        let snapshot = session.query().await.unwrap();
        assert_eq!(snapshot.state, SessionState::default());
        assert!(snapshot.context.is_none());
    }
}
