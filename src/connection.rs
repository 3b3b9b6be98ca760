use std::net::TcpStream;

use crossbeam_channel::Sender;
use thiserror::Error;
use tungstenite::protocol::WebSocket;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::Message;

use crate::indicator::StatusIndicator;
use crate::telemetry::CollectorEvent;
use crate::types::{GestureEvent, GestureLabel};

/// Un objetivo remoto que puede recibir gestos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn uri(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// Estado del enlace con el objetivo actual. Exactamente una instancia
/// por sesión; solo la muta el gestor de conexión.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Switching,
}

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Target list is empty")]
    NoTargets,

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// Enlace vivo con un objetivo: enviar texto y cerrar
pub trait RemoteLink {
    fn send_text(&mut self, payload: &str) -> Result<(), ConnectionError>;
    fn close(&mut self);
}

/// Fábrica de enlaces: conectar por dirección
pub trait Connector {
    type Link: RemoteLink;

    fn connect(&mut self, target: &Target) -> Result<Self::Link, ConnectionError>;
}

/// Enlace WebSocket real sobre TCP
pub struct WsLink {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl RemoteLink for WsLink {
    fn send_text(&mut self, payload: &str) -> Result<(), ConnectionError> {
        self.socket.send(Message::Text(payload.to_string()))?;
        Ok(())
    }

    fn close(&mut self) {
        // Cierre de mejor esfuerzo: el enlace ya se considera perdido
        let _ = self.socket.close(None);
        let _ = self.socket.flush();
    }
}

pub struct WsConnector;

impl Connector for WsConnector {
    type Link = WsLink;

    fn connect(&mut self, target: &Target) -> Result<WsLink, ConnectionError> {
        let (socket, _response) = tungstenite::connect(target.uri())?;
        Ok(WsLink { socket })
    }
}

/// Gestor de conexión: posee el objetivo actual y el enlace vivo,
/// realiza connect/send/switch y se recupera de fallos sin detener el
/// lazo de muestreo. Los fallos degradan a "reintentar en el próximo
/// despacho", nunca a reintentos en bucle.
pub struct ConnectionManager<C: Connector, I: StatusIndicator> {
    connector: C,
    indicator: I,
    targets: Vec<Target>,
    current: usize,
    state: ConnectionState,
    link: Option<C::Link>,
    side_channel: Option<Sender<CollectorEvent>>,
}

impl<C: Connector, I: StatusIndicator> ConnectionManager<C, I> {
    pub fn new(
        connector: C,
        indicator: I,
        targets: Vec<Target>,
        side_channel: Option<Sender<CollectorEvent>>,
    ) -> Result<Self, ConnectionError> {
        if targets.is_empty() {
            return Err(ConnectionError::NoTargets);
        }

        Ok(Self {
            connector,
            indicator,
            targets,
            current: 0,
            state: ConnectionState::Disconnected,
            link: None,
            side_channel,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_target(&self) -> &Target {
        &self.targets[self.current]
    }

    /// Intenta establecer el enlace con el objetivo actual. El fallo no es
    /// fatal: queda Disconnected y se reintenta perezosamente en el próximo
    /// despacho.
    pub fn connect_current(&mut self) -> ConnectionState {
        self.state = ConnectionState::Connecting;
        let target = self.targets[self.current].clone();

        match self.connector.connect(&target) {
            Ok(link) => {
                self.link = Some(link);
                self.state = ConnectionState::Connected;
                self.indicator.set(self.current, true);
                println!("🔗 Conectado a {} ({})", target.name, target.uri());
            }
            Err(e) => {
                self.link = None;
                self.state = ConnectionState::Disconnected;
                eprintln!("❌ No se pudo conectar a {}: {}", target.uri(), e);
            }
        }

        self.state
    }

    /// Despacha un gesto admitido: switch rota de objetivo, los
    /// direccionales se envían al objetivo actual.
    pub fn dispatch(&mut self, event: &GestureEvent) {
        match event.label {
            GestureLabel::Switch => self.switch_target(),
            label => self.send_directional(label),
        }
    }

    /// Cierra el enlace actual (si existe), avanza el índice circularmente,
    /// notifica el canal lateral y reconecta. Con un solo objetivo es una
    /// reconexión al mismo.
    fn switch_target(&mut self) {
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Switching;
            self.drop_link();
        }

        self.current = (self.current + 1) % self.targets.len();
        println!(
            "🔀 Cambiando al objetivo {} ({})",
            self.current + 1,
            self.targets[self.current].name
        );

        if let Some(tx) = &self.side_channel {
            let _ = tx.try_send(CollectorEvent::Switch);
        }

        self.connect_current();
    }

    fn send_directional(&mut self, label: GestureLabel) {
        if self.state != ConnectionState::Connected {
            // Reconexión perezosa: un solo intento por despacho
            if self.connect_current() != ConnectionState::Connected {
                println!("📭 Gesto '{}' perdido: sin conexión", label);
                return;
            }
        }

        let payload = serde_json::json!({ "gesture": label.as_str() }).to_string();
        let target_name = self.targets[self.current].name.clone();

        if let Some(link) = self.link.as_mut() {
            match link.send_text(&payload) {
                Ok(()) => println!("📤 Gesto '{}' enviado a {}", label, target_name),
                Err(e) => {
                    // El enlace se considera perdido; se reconstruirá en la
                    // próxima oportunidad
                    eprintln!("❌ Error enviando '{}' a {}: {}", label, target_name, e);
                    self.drop_link();
                }
            }
        }
    }

    /// Cierra el enlace y apaga el indicador del objetivo actual
    fn drop_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
        }
        self.indicator.set(self.current, false);
        self.state = ConnectionState::Disconnected;
    }

    /// Contrato de limpieza: enlace cerrado e indicadores apagados en toda
    /// salida, incluidas las rutas de error.
    pub fn shutdown(&mut self) {
        if self.link.is_some() {
            self.drop_link();
        }
        self.state = ConnectionState::Disconnected;
        let num_targets = self.targets.len();
        self.indicator.all_off(num_targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    type Log = Arc<Mutex<Vec<String>>>;

    struct FakeLink {
        log: Log,
        fail_sends: bool,
    }

    impl RemoteLink for FakeLink {
        fn send_text(&mut self, payload: &str) -> Result<(), ConnectionError> {
            if self.fail_sends {
                self.log.lock().unwrap().push("send-failed".to_string());
                return Err(ConnectionError::WebSocket(
                    tungstenite::Error::ConnectionClosed,
                ));
            }
            self.log.lock().unwrap().push(format!("send {}", payload));
            Ok(())
        }

        fn close(&mut self) {
            self.log.lock().unwrap().push("close".to_string());
        }
    }

    struct FakeConnector {
        log: Log,
        /// Resultado programado de cada connect, en orden
        outcomes: VecDeque<bool>,
        fail_sends: bool,
    }

    impl Connector for FakeConnector {
        type Link = FakeLink;

        fn connect(&mut self, target: &Target) -> Result<FakeLink, ConnectionError> {
            let ok = self.outcomes.pop_front().unwrap_or(true);
            if ok {
                self.log
                    .lock()
                    .unwrap()
                    .push(format!("connect {}", target.name));
                Ok(FakeLink {
                    log: Arc::clone(&self.log),
                    fail_sends: self.fail_sends,
                })
            } else {
                self.log
                    .lock()
                    .unwrap()
                    .push(format!("refused {}", target.name));
                Err(ConnectionError::WebSocket(
                    tungstenite::Error::ConnectionClosed,
                ))
            }
        }
    }

    struct FakeIndicator {
        log: Log,
    }

    impl StatusIndicator for FakeIndicator {
        fn set(&mut self, target_idx: usize, on: bool) {
            self.log
                .lock()
                .unwrap()
                .push(format!("led {} {}", target_idx, if on { "on" } else { "off" }));
        }
    }

    fn targets(names: &[&str]) -> Vec<Target> {
        names
            .iter()
            .map(|name| Target {
                name: name.to_string(),
                host: "127.0.0.1".to_string(),
                port: 6789,
            })
            .collect()
    }

    fn manager(
        names: &[&str],
        outcomes: Vec<bool>,
        fail_sends: bool,
    ) -> (ConnectionManager<FakeConnector, FakeIndicator>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let connector = FakeConnector {
            log: Arc::clone(&log),
            outcomes: outcomes.into(),
            fail_sends,
        };
        let indicator = FakeIndicator {
            log: Arc::clone(&log),
        };
        let manager =
            ConnectionManager::new(connector, indicator, targets(names), None).unwrap();
        (manager, log)
    }

    fn event(label: GestureLabel) -> GestureEvent {
        GestureEvent {
            label,
            magnitude: 1.0,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_empty_target_list_rejected() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let connector = FakeConnector {
            log: Arc::clone(&log),
            outcomes: VecDeque::new(),
            fail_sends: false,
        };
        let indicator = FakeIndicator { log };
        let result = ConnectionManager::new(connector, indicator, vec![], None);
        assert!(matches!(result, Err(ConnectionError::NoTargets)));
    }

    #[test]
    fn test_connect_success_sets_indicator() {
        let (mut manager, log) = manager(&["laptop-a"], vec![true], false);

        assert_eq!(manager.connect_current(), ConnectionState::Connected);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["connect laptop-a", "led 0 on"]
        );
    }

    #[test]
    fn test_connect_failure_stays_disconnected() {
        let (mut manager, _log) = manager(&["laptop-a"], vec![false], false);

        assert_eq!(manager.connect_current(), ConnectionState::Disconnected);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_switch_single_target_reconnects_same_index() {
        let (mut manager, _log) = manager(&["laptop-a"], vec![true], false);

        manager.dispatch(&event(GestureLabel::Switch));
        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(manager.current_index(), 0);
    }

    #[test]
    fn test_switch_single_target_failed_connect_disconnected() {
        let (mut manager, _log) = manager(&["laptop-a"], vec![false], false);

        manager.dispatch(&event(GestureLabel::Switch));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert_eq!(manager.current_index(), 0);
    }

    #[test]
    fn test_switch_two_targets_orders_indicators() {
        let (mut manager, log) = manager(&["a", "b"], vec![true, true], false);
        manager.connect_current();
        log.lock().unwrap().clear();

        manager.dispatch(&event(GestureLabel::Switch));

        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(manager.current_index(), 1);
        // El indicador de A se apaga antes de encender el de B
        assert_eq!(
            *log.lock().unwrap(),
            vec!["close", "led 0 off", "connect b", "led 1 on"]
        );
    }

    #[test]
    fn test_switch_notifies_side_channel() {
        let (tx, rx) = unbounded();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let connector = FakeConnector {
            log: Arc::clone(&log),
            outcomes: VecDeque::from(vec![true]),
            fail_sends: false,
        };
        let indicator = FakeIndicator { log };
        let mut manager =
            ConnectionManager::new(connector, indicator, targets(&["a", "b"]), Some(tx))
                .unwrap();

        manager.dispatch(&event(GestureLabel::Switch));
        assert_eq!(rx.recv().unwrap(), CollectorEvent::Switch);
    }

    #[test]
    fn test_directional_sends_json_payload() {
        let (mut manager, log) = manager(&["a"], vec![true], false);
        manager.connect_current();

        manager.dispatch(&event(GestureLabel::Left));
        assert!(log
            .lock()
            .unwrap()
            .contains(&"send {\"gesture\":\"left\"}".to_string()));
    }

    #[test]
    fn test_directional_lazy_reconnect_then_send() {
        let (mut manager, log) = manager(&["a"], vec![true], false);

        // Sin conexión previa: un intento perezoso y luego el envío
        manager.dispatch(&event(GestureLabel::Up));
        assert_eq!(manager.state(), ConnectionState::Connected);
        assert!(log
            .lock()
            .unwrap()
            .contains(&"send {\"gesture\":\"up\"}".to_string()));
    }

    #[test]
    fn test_directional_lost_when_reconnect_fails() {
        let (mut manager, log) = manager(&["a"], vec![false], false);

        manager.dispatch(&event(GestureLabel::Right));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(!log.lock().unwrap().iter().any(|e| e.starts_with("send")));
    }

    #[test]
    fn test_send_failure_drops_link() {
        let (mut manager, log) = manager(&["a"], vec![true, true], true);
        manager.connect_current();

        manager.dispatch(&event(GestureLabel::Down));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        // El enlace se cerró y el indicador quedó apagado
        let entries = log.lock().unwrap().clone();
        assert!(entries.contains(&"close".to_string()));
        assert!(entries.contains(&"led 0 off".to_string()));
    }

    #[test]
    fn test_shutdown_closes_link_and_clears_indicators() {
        let (mut manager, log) = manager(&["a", "b"], vec![true], false);
        manager.connect_current();
        log.lock().unwrap().clear();

        manager.shutdown();
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        let entries = log.lock().unwrap().clone();
        assert_eq!(
            entries,
            vec!["close", "led 0 off", "led 0 off", "led 1 off"]
        );
    }
}
