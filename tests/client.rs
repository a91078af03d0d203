mod common;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use common::{FakeShell, init_tracing};
use jtagswitch::error::{ErrorKind, SwitchError, SwitchResult};
use jtagswitch::{
    CommandData, CommandResult, InterfaceType, JtagSwitch, RestParams, SerialParams,
    SerialTransport, Transport, TransportKind,
};

/// Transport that records every call and answers with canned results.
#[derive(Clone, Default)]
struct RecordingTransport {
    calls: Arc<Mutex<Vec<String>>>,
    refuse_connect: bool,
}

impl RecordingTransport {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: String) -> SwitchResult<CommandResult> {
        self.calls.lock().unwrap().push(call.clone());
        Ok(CommandResult::ok(CommandData::Empty, call))
    }
}

impl Transport for RecordingTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }

    fn connect(&mut self) -> SwitchResult<()> {
        self.calls.lock().unwrap().push("connect".to_string());
        if self.refuse_connect {
            return Err(SwitchError::Connection("refused".to_string()));
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.calls.lock().unwrap().push("disconnect".to_string());
    }

    fn select(&mut self, line: u8, value: u8) -> SwitchResult<CommandResult> {
        self.record(format!("select {} {}", line, value))
    }

    fn toggle(&mut self, line: u8) -> SwitchResult<CommandResult> {
        self.record(format!("toggle {}", line))
    }

    fn status(&mut self) -> SwitchResult<CommandResult> {
        self.record("status".to_string())
    }

    fn net_status(&mut self) -> SwitchResult<CommandResult> {
        self.record("net_status".to_string())
    }

    fn net_config(&mut self) -> SwitchResult<CommandResult> {
        self.record("net_config".to_string())
    }

    fn net_set_dhcp(&mut self) -> SwitchResult<CommandResult> {
        self.record("net_set_dhcp".to_string())
    }

    fn net_set_static(
        &mut self,
        ip: &str,
        netmask: &str,
        gateway: &str,
    ) -> SwitchResult<CommandResult> {
        self.record(format!("net_set_static {} {} {}", ip, netmask, gateway))
    }

    fn net_restart(&mut self) -> SwitchResult<CommandResult> {
        self.record("net_restart".to_string())
    }

    fn net_save(&mut self) -> SwitchResult<CommandResult> {
        self.record("net_save".to_string())
    }

    fn device_info(&mut self) -> SwitchResult<CommandResult> {
        self.record("device_info".to_string())
    }

    fn health_check(&mut self) -> SwitchResult<CommandResult> {
        self.record("health_check".to_string())
    }
}

fn client() -> (JtagSwitch, RecordingTransport) {
    let transport = RecordingTransport::default();
    (JtagSwitch::from_transport(Box::new(transport.clone())), transport)
}

#[test]
fn test_session_disconnects_on_success() {
    let (mut switch, transport) = client();

    let result = switch.with_session(|s| s.status()).unwrap();
    assert_eq!(result.message, "status");
    assert_eq!(transport.calls(), vec!["connect", "status", "disconnect"]);
}

#[test]
fn test_session_disconnects_on_error() {
    let (mut switch, transport) = client();

    let result: SwitchResult<()> = switch.with_session(|s| {
        s.select(0, 1)?;
        Err(SwitchError::CommandExecution("boom".to_string()))
    });

    assert!(result.is_err());
    assert_eq!(transport.count("disconnect"), 1);
}

#[test]
fn test_session_disconnects_on_panic() {
    let (mut switch, transport) = client();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut session = switch.session().unwrap();
        session.toggle(1).unwrap();
        panic!("caller bug");
    }));

    assert!(outcome.is_err());
    assert_eq!(
        transport.calls(),
        vec!["connect", "toggle 1", "disconnect"]
    );
}

#[test]
fn test_guard_scope() {
    let (mut switch, transport) = client();
    {
        let mut session = switch.session().unwrap();
        session.net_status().unwrap();
        assert_eq!(transport.count("disconnect"), 0);
    }
    assert_eq!(transport.count("disconnect"), 1);
}

#[test]
fn test_failed_connect_skips_disconnect() {
    let transport = RecordingTransport {
        refuse_connect: true,
        ..Default::default()
    };
    let mut switch = JtagSwitch::from_transport(Box::new(transport.clone()));

    let err = switch.with_session(|s| s.status()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ConnectionFailure));
    assert_eq!(transport.calls(), vec!["connect"]);
}

#[test]
fn test_commands_forward_to_transport() {
    let (mut switch, transport) = client();

    switch.connect().unwrap();
    switch.select(1, 0).unwrap();
    switch.toggle(0).unwrap();
    switch.status().unwrap();
    switch.net_status().unwrap();
    switch.net_config().unwrap();
    switch.net_set_dhcp().unwrap();
    switch
        .net_set_static("10.0.0.5", "255.0.0.0", "10.0.0.1")
        .unwrap();
    switch.net_restart().unwrap();
    switch.net_save().unwrap();
    switch.device_info().unwrap();
    switch.health_check().unwrap();
    switch.disconnect();

    assert_eq!(
        transport.calls(),
        vec![
            "connect",
            "select 1 0",
            "toggle 0",
            "status",
            "net_status",
            "net_config",
            "net_set_dhcp",
            "net_set_static 10.0.0.5 255.0.0.0 10.0.0.1",
            "net_restart",
            "net_save",
            "device_info",
            "health_check",
            "disconnect",
        ]
    );
    assert_eq!(switch.kind(), TransportKind::Rest);
}

#[test]
fn test_rest_requires_host() {
    assert!(matches!(
        JtagSwitch::new(InterfaceType::Rest(RestParams::new("  "))),
        Err(SwitchError::InvalidArgument(_))
    ));
    assert!(JtagSwitch::rest("", 80).is_err());
}

#[test]
fn test_constructors_pick_transport() {
    let serial = JtagSwitch::new(InterfaceType::Serial(SerialParams::with_port("/dev/ttyACM0")))
        .unwrap();
    assert_eq!(serial.kind(), TransportKind::Serial);

    let rest = JtagSwitch::rest("192.168.1.100", 8080).unwrap();
    assert_eq!(rest.kind(), TransportKind::Rest);

    assert_eq!(JtagSwitch::serial(None).kind(), TransportKind::Serial);
}

#[test]
fn test_session_over_fake_serial_shell() {
    init_tracing();
    let shell = FakeShell::new();
    let transport = SerialTransport::with_device(shell.boxed(), SerialParams::default());
    let mut switch = JtagSwitch::from_transport(Box::new(transport));

    let status = switch
        .with_session(|s| {
            s.select(0, 1)?;
            s.status()
        })
        .unwrap();
    assert_eq!(status.data.get("select0").map(|v| v.to_string()), Some("1".into()));

    // The guard released the shell
    assert_eq!(
        switch.status().unwrap_err().kind(),
        Some(ErrorKind::ConnectionFailure)
    );
}
