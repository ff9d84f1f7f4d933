//! Dispatcher behaviour against a mocked host.

use mockall::mock;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::host::{ConnectRequest, ConnectionId, ErrorCode, HostApi, HostResult};
use crate::registry::ConnectionRegistry;
use crate::transport::ResponseBuffer;

mock! {
    Host {}
    impl HostApi for Host {
        fn connect(&self, request: &ConnectRequest) -> HostResult<ConnectionId>;
        fn disconnect(&self, id: ConnectionId) -> HostResult<()>;
        fn list_known_ids(&self) -> HostResult<Vec<ConnectionId>>;
        fn display_name(&self, id: ConnectionId) -> HostResult<String>;
        fn send_channel_message(&self, id: ConnectionId, text: &str) -> HostResult<()>;
        fn describe_error(&self, code: ErrorCode) -> String;
    }
}

const HOST_FAILURE: ErrorCode = ErrorCode::new(0x0400);

fn id(raw: u64) -> ConnectionId {
    ConnectionId::new(raw)
}

#[fixture]
fn host() -> MockHost {
    let mut host = MockHost::new();
    host.expect_describe_error()
        .returning(|code| format!("failure {code}"));
    host
}

fn run(host: MockHost, registry: &ConnectionRegistry, line: &str) -> Vec<String> {
    let dispatcher = Dispatcher::new(host, registry.clone());
    let mut out = ResponseBuffer::new();
    dispatcher.dispatch_line(line, &mut out);
    out.take_lines()
}

#[rstest]
fn connect_registers_and_selects_new_connection(mut host: MockHost) {
    host.expect_connect()
        .withf(|request| {
            request.host == "host1"
                && request.identity == "id1"
                && request.nickname == "nick1"
                && request.password.is_empty()
                && request.capture_profile == "Default"
                && request.playback_profile == "Default"
                && request.sound_profile == "Default Sound Profile (Female)"
        })
        .once()
        .returning(|_| Ok(ConnectionId::new(42)));
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, "ts3.servers.connect host1 id1 nick1");

    assert_eq!(
        lines,
        vec![
            "ts3.servers.connect ok",
            "ts3.info New connection to server has ID 42"
        ]
    );
    let record = registry.get(id(42)).expect("registered connection");
    assert_eq!(record.hostname(), "host1");
    assert_eq!(registry.active_id(), Some(id(42)));
}

#[rstest]
fn connect_closed_during_the_host_call_stays_unregistered(mut host: MockHost) {
    let registry = ConnectionRegistry::new();
    let notifications = registry.clone();
    host.expect_connect().once().returning(move |_| {
        notifications.notify_connecting(ConnectionId::new(5));
        notifications.notify_closed(ConnectionId::new(5));
        Ok(ConnectionId::new(5))
    });

    let lines = run(host, &registry, "ts3.servers.connect host1 id1 nick1");

    assert_eq!(lines[0], "ts3.servers.connect ok");
    assert!(registry.get(id(5)).is_none());
}

#[rstest]
fn connect_passes_optional_arguments_in_order(mut host: MockHost) {
    host.expect_connect()
        .withf(|request| {
            request.capture_profile == "Mic"
                && request.playback_profile == "Speakers"
                && request.sound_profile == "Quiet"
                && request.password == "secret"
        })
        .once()
        .returning(|_| Ok(ConnectionId::new(7)));
    let registry = ConnectionRegistry::new();

    let lines = run(
        host,
        &registry,
        "ts3.servers.connect host1 id1 nick1 Mic Speakers Quiet secret",
    );

    assert_eq!(lines.first().map(String::as_str), Some("ts3.servers.connect ok"));
}

#[rstest]
#[case::no_arguments("ts3.servers.connect")]
#[case::missing_identity("ts3.servers.connect host1")]
#[case::missing_nickname("ts3.servers.connect host1 id1")]
fn connect_with_missing_arguments_fails_without_host_call(
    mut host: MockHost,
    #[case] line: &str,
) {
    host.expect_connect().never();
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, line);

    assert_eq!(lines, vec!["ts3.servers.connect fail"]);
    assert!(registry.is_empty());
}

#[rstest]
fn connect_rejected_by_host_fails(mut host: MockHost) {
    host.expect_connect().once().returning(|_| Err(HOST_FAILURE));
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, "ts3.servers.connect host1 id1 nick1");

    assert_eq!(lines, vec!["ts3.servers.connect fail"]);
    assert!(registry.is_empty());
    assert_eq!(registry.active_id(), None);
}

#[rstest]
fn disconnect_uses_active_selection(mut host: MockHost) {
    host.expect_disconnect()
        .with(eq(id(3)))
        .once()
        .returning(|_| Ok(()));
    let registry = ConnectionRegistry::new();
    registry.create(id(3), "host");
    registry.set_active(id(3));

    let lines = run(host, &registry, "ts3.servers.disconnect");

    assert_eq!(lines, vec!["ts3.servers.disconnect ok"]);
    assert!(registry.contains(id(3)), "only the host notification releases records");
}

#[rstest]
fn disconnect_explicit_id(mut host: MockHost) {
    host.expect_disconnect()
        .with(eq(id(8)))
        .once()
        .returning(|_| Ok(()));
    let registry = ConnectionRegistry::new();
    registry.create(id(8), "host");

    let lines = run(host, &registry, "ts3.servers.disconnect 8");

    assert_eq!(lines, vec!["ts3.servers.disconnect ok"]);
}

#[rstest]
#[case::unregistered("ts3.servers.disconnect 99")]
#[case::not_a_number("ts3.servers.disconnect abc")]
#[case::nothing_selected("ts3.servers.disconnect")]
fn disconnect_unknown_id_fails(mut host: MockHost, #[case] line: &str) {
    host.expect_disconnect().never();
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, line);

    assert_eq!(lines, vec!["ts3.servers.disconnect fail. Unknown connection ID"]);
}

#[rstest]
fn disconnect_rejected_by_host_fails(mut host: MockHost) {
    host.expect_disconnect().once().returning(|_| Err(HOST_FAILURE));
    let registry = ConnectionRegistry::new();
    registry.create(id(4), "host");

    let lines = run(host, &registry, "ts3.servers.disconnect 4");

    assert_eq!(lines, vec!["ts3.servers.disconnect fail"]);
}

#[rstest]
fn list_marks_active_selection_in_host_order(mut host: MockHost) {
    host.expect_list_known_ids()
        .returning(|| Ok(vec![ConnectionId::new(1), ConnectionId::new(2)]));
    host.expect_display_name()
        .returning(|id| Ok(format!("Server {id}")));
    let registry = ConnectionRegistry::new();
    registry.set_active(id(1));

    let lines = run(host, &registry, "ts3.servers.list");

    assert_eq!(lines, vec!["[*] 1:Server 1", "[ ] 2:Server 2"]);
}

#[rstest]
fn list_includes_ids_the_registry_does_not_track(mut host: MockHost) {
    host.expect_list_known_ids()
        .returning(|| Ok(vec![ConnectionId::new(5)]));
    host.expect_display_name()
        .returning(|_| Ok(String::from("Lobby")));
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, "ts3.servers.list");

    assert_eq!(lines, vec!["[ ] 5:Lobby"]);
}

#[rstest]
fn list_skips_unnamed_connections(mut host: MockHost) {
    host.expect_list_known_ids()
        .returning(|| Ok(vec![ConnectionId::new(1), ConnectionId::new(2)]));
    host.expect_display_name()
        .with(eq(id(1)))
        .returning(|_| Err(HOST_FAILURE));
    host.expect_display_name()
        .with(eq(id(2)))
        .returning(|_| Ok(String::from("Named")));
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, "ts3.servers.list");

    assert_eq!(lines, vec!["[ ] 2:Named"]);
}

#[rstest]
fn list_failure_is_reported(mut host: MockHost) {
    host.expect_list_known_ids().returning(|| Err(HOST_FAILURE));
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, "ts3.servers.list");

    assert_eq!(lines, vec!["ts3.servers.list fail"]);
}

#[rstest]
fn select_known_id_updates_selection(mut host: MockHost) {
    host.expect_list_known_ids()
        .returning(|| Ok(vec![ConnectionId::new(1), ConnectionId::new(2)]));
    let registry = ConnectionRegistry::new();
    registry.set_active(id(1));

    let lines = run(host, &registry, "ts3.servers.select 2");

    assert_eq!(lines, vec!["ts3.servers.select ok"]);
    assert_eq!(registry.active_id(), Some(id(2)));
}

#[rstest]
fn select_unknown_id_keeps_selection(mut host: MockHost) {
    host.expect_list_known_ids()
        .returning(|| Ok(vec![ConnectionId::new(1), ConnectionId::new(2)]));
    let registry = ConnectionRegistry::new();
    registry.set_active(id(1));

    let lines = run(host, &registry, "ts3.servers.select 99");

    assert_eq!(lines, vec!["ts3.servers.select fail. Unknown connection ID"]);
    assert_eq!(registry.active_id(), Some(id(1)));
}

#[rstest]
fn send_forwards_rest_of_line_verbatim(mut host: MockHost) {
    host.expect_send_channel_message()
        .withf(|target, text| *target == ConnectionId::new(6) && text == "hello,  world ")
        .once()
        .returning(|_, _| Ok(()));
    let registry = ConnectionRegistry::new();
    registry.set_active(id(6));

    let lines = run(host, &registry, "ts3.messaging.send hello,  world ");

    assert_eq!(lines, vec!["ts3.messaging.send ok"]);
}

#[rstest]
#[case::empty_text("ts3.messaging.send", Some(1))]
#[case::blank_text("ts3.messaging.send    ", Some(1))]
#[case::no_selection("ts3.messaging.send hi", None)]
fn send_without_text_or_target_fails(
    mut host: MockHost,
    #[case] line: &str,
    #[case] active: Option<u64>,
) {
    host.expect_send_channel_message().never();
    let registry = ConnectionRegistry::new();
    if let Some(raw) = active {
        registry.set_active(id(raw));
    }

    let lines = run(host, &registry, line);

    assert_eq!(lines, vec!["ts3.messaging.send fail"]);
}

#[rstest]
fn send_rejected_by_host_fails(mut host: MockHost) {
    host.expect_send_channel_message()
        .once()
        .returning(|_, _| Err(HOST_FAILURE));
    let registry = ConnectionRegistry::new();
    registry.set_active(id(1));

    let lines = run(host, &registry, "ts3.messaging.send hi");

    assert_eq!(lines, vec!["ts3.messaging.send fail"]);
}

#[rstest]
#[case::add("ts3.identifier.add", "ts3.identifier.add")]
#[case::remove("ts3.identifier.remove", "ts3.identifier.remove")]
#[case::add_with_arguments("ts3.identifier.add alice key", "ts3.identifier.add")]
fn identifier_actions_are_unavailable(
    host: MockHost,
    #[case] line: &str,
    #[case] word: &str,
) {
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, line);

    assert_eq!(
        lines,
        vec![format!(
            "{word} not available, as API does not support identity management"
        )]
    );
}

#[rstest]
#[case::unknown_category("ts3.weather.today", "ts3.error: today: weather is not a supported category")]
#[case::missing_category("ts3", "ts3.error: :  is not a supported category")]
#[case::unknown_action("ts3.servers.reboot", "ts3.error: reboot: not a supported servers action")]
#[case::missing_action("ts3.messaging", "ts3.error: : not a supported messaging action")]
fn unsupported_commands_yield_one_error_line(
    host: MockHost,
    #[case] line: &str,
    #[case] expected: &str,
) {
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, line);

    assert_eq!(lines, vec![expected]);
}

#[rstest]
#[case::foreign("hello there")]
#[case::empty("")]
#[case::near_miss("ts3x.servers.list")]
fn foreign_lines_produce_nothing(host: MockHost, #[case] line: &str) {
    let registry = ConnectionRegistry::new();
    let dispatcher = Dispatcher::new(host, registry);
    let mut out = ResponseBuffer::new();

    assert!(!dispatcher.dispatch_line(line, &mut out));
    assert!(out.is_empty());
}

#[rstest]
fn help_lists_every_command(host: MockHost) {
    let registry = ConnectionRegistry::new();

    let lines = run(host, &registry, "ts3.help");

    assert_eq!(
        lines.first().map(String::as_str),
        Some("The TeamSpeak3 interface supports the following commands:")
    );
    for word in [
        "ts3.identifier.add",
        "ts3.servers.connect",
        "ts3.servers.disconnect",
        "ts3.servers.list",
        "ts3.servers.select",
        "ts3.messaging.send",
    ] {
        assert!(
            lines.iter().any(|line| line.starts_with(word)),
            "usage should mention {word}"
        );
    }
}

#[rstest]
#[case::identifier("identifier", Category::Identifier)]
#[case::servers("servers", Category::Servers)]
#[case::messaging("messaging", Category::Messaging)]
#[case::help("help", Category::Help)]
fn category_round_trips(#[case] input: &str, #[case] expected: Category) {
    let parsed = Category::parse(input, "").expect("known category");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.as_str(), input);
}
