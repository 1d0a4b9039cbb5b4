use std::sync::Arc;
use std::time::Duration;
use rc_remote::device::command::{MotionCommand, MOTION_COMMANDS};
use rc_remote::device::fake::{FakeSerial, LinkCall, Operation};
use rc_remote::device::types::{Device, LinkEvent};
use rc_remote::remote::controller::{Controller, Intent};
use rc_remote::remote::state::{Tab, Transition};

fn car() -> Device {
    Device::new("98:D3:31:F5:8A:01", "RC Car")
}

fn hc05() -> Device {
    Device::new("00:14:03:05:0C:7E", "HC-05")
}

fn robot() -> Device {
    Device::new("F0:C7:7F:94:11:2B", "Robot Arm")
}

fn controller(link: &FakeSerial) -> Controller {
    Controller::new(Arc::new(link.clone()))
}

async fn initialized(link: &FakeSerial) -> Controller {
    let mut controller = controller(link);
    controller.dispatch(Intent::Initialize).await;
    link.clear_calls();
    controller
}

#[tokio::test]
async fn initialize_reads_adapter_state_and_paired_devices() {
    let link = FakeSerial::demo();
    let mut controller = controller(&link);

    controller.dispatch(Intent::Initialize).await;

    assert!(controller.state().enabled);
    assert_eq!(controller.state().paired, vec![car()]);
    assert!(link.calls().contains(&LinkCall::IsEnabled));
    assert!(link.calls().contains(&LinkCall::ListPaired));
}

#[tokio::test]
async fn initialize_keeps_what_succeeded() {
    let link = FakeSerial::demo();
    link.fail(Operation::IsEnabled);
    let mut controller = controller(&link);

    controller.dispatch(Intent::Initialize).await;

    assert!(!controller.state().enabled);
    assert_eq!(controller.state().paired, vec![car()]);
}

#[tokio::test]
async fn pairing_moves_device_to_paired_list() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;
    controller.dispatch(Intent::StartDiscovery).await;
    assert_eq!(controller.state().discovered, vec![hc05(), robot()]);

    controller.dispatch(Intent::Pair(hc05())).await;

    assert_eq!(controller.state().paired, vec![car(), hc05()]);
    assert_eq!(controller.state().discovered, vec![robot()]);
}

#[tokio::test]
async fn refused_or_failed_pairing_changes_nothing() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;
    controller.dispatch(Intent::StartDiscovery).await;
    let before = controller.state().clone();

    link.refuse_pairing(&hc05().id);
    controller.dispatch(Intent::Pair(hc05())).await;
    assert_eq!(controller.state(), &before);

    link.fail(Operation::Pair);
    controller.dispatch(Intent::Pair(robot())).await;
    assert_eq!(controller.state(), &before);
}

#[tokio::test]
async fn pairing_an_already_paired_device_duplicates_it() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;

    controller.dispatch(Intent::Pair(car())).await;

    assert_eq!(controller.state().paired, vec![car(), car()]);
}

#[tokio::test]
async fn connect_then_disconnect() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;

    controller.dispatch(Intent::Connect(car())).await;
    assert!(controller.state().connected);
    assert!(!controller.state().connecting);
    assert_eq!(controller.state().device, Some(car()));

    controller.dispatch(Intent::Disconnect).await;
    assert!(!controller.state().connected);
    assert_eq!(link.connected_to(), None);
}

#[tokio::test]
async fn connection_lost_resets_connected_flag() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;
    controller.dispatch(Intent::Connect(car())).await;

    controller.handle_event(LinkEvent::ConnectionLost);

    assert!(!controller.state().connected);
    // no reconnection attempt
    assert_eq!(link.calls(), vec![LinkCall::Connect(car().id)]);
}

#[tokio::test]
async fn failed_connect_clears_connecting() {
    let link = FakeSerial::demo();
    link.fail(Operation::Connect);
    let mut controller = initialized(&link).await;

    let pending = controller.begin(Intent::Connect(car())).expect("connect calls the link");
    assert!(controller.state().connecting);

    let transition = pending.await;
    assert_eq!(transition, Transition::ConnectFailed);
    controller.apply(transition);

    assert!(!controller.state().connecting);
    assert!(!controller.state().connected);
    assert_eq!(controller.state().device, None);
}

#[tokio::test]
async fn toggle_calls_link_once_and_updates_on_success() {
    let link = FakeSerial::new();
    let mut controller = initialized(&link).await;

    controller.dispatch(Intent::ToggleBluetooth(true)).await;
    assert!(controller.state().enabled);

    controller.dispatch(Intent::ToggleBluetooth(false)).await;
    assert!(!controller.state().enabled);

    assert_eq!(link.calls(), vec![LinkCall::Enable, LinkCall::Disable]);
}

#[tokio::test]
async fn failed_toggle_leaves_flag_unchanged() {
    let link = FakeSerial::new();
    link.fail(Operation::Enable);
    let mut controller = initialized(&link).await;

    controller.dispatch(Intent::ToggleBluetooth(true)).await;

    assert!(!controller.state().enabled);
    assert_eq!(link.calls(), vec![LinkCall::Enable]);
}

#[tokio::test]
async fn commands_are_attempted_while_disconnected() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;

    for command in MOTION_COMMANDS {
        controller.dispatch(Intent::Send(command)).await;
    }

    let writes: Vec<LinkCall> = [b"1", b"2", b"0", b"3", b"4"]
        .iter()
        .map(|byte| LinkCall::Write(byte.to_vec()))
        .collect();
    assert_eq!(link.calls(), writes);
    assert!(link.wire().is_empty());
    assert!(!controller.state().connected);
}

#[tokio::test]
async fn commands_reach_a_connected_device() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;
    controller.dispatch(Intent::Connect(car())).await;

    controller.dispatch(Intent::Send(MotionCommand::Forward)).await;
    controller.dispatch(Intent::Send(MotionCommand::Left)).await;
    controller.dispatch(Intent::Send(MotionCommand::Stop)).await;
    controller.dispatch(Intent::Send(MotionCommand::Right)).await;
    controller.dispatch(Intent::Send(MotionCommand::Reverse)).await;

    assert_eq!(link.wire(), b"12034".to_vec());
}

#[tokio::test]
async fn successful_write_marks_connected() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;
    controller.dispatch(Intent::Connect(car())).await;
    controller.handle_event(LinkEvent::ConnectionLost);
    assert!(!controller.state().connected);

    // the link still holds the session, so the write goes through
    controller.dispatch(Intent::Send(MotionCommand::Stop)).await;

    assert!(controller.state().connected);
}

#[tokio::test]
async fn cancel_discovery_is_a_no_op_when_idle() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;

    assert!(controller.begin(Intent::CancelDiscovery).is_none());
    controller.dispatch(Intent::CancelDiscovery).await;

    assert!(link.calls().is_empty());
    assert!(!controller.state().discovering);
}

#[tokio::test]
async fn cancel_discovery_stops_a_running_scan() {
    let link = FakeSerial::demo().with_held_discovery();
    let mut controller = initialized(&link).await;

    let scan = tokio::spawn(controller.begin(Intent::StartDiscovery).expect("discovery calls the link"));
    assert!(controller.state().discovering);

    controller.dispatch(Intent::CancelDiscovery).await;
    assert!(!controller.state().discovering);

    let transition = scan.await.expect("discovery task panicked");
    controller.apply(transition);

    assert!(!controller.state().discovering);
    assert_eq!(controller.state().discovered, vec![hc05(), robot()]);
    assert_eq!(link.calls().iter().filter(|c| **c == LinkCall::CancelDiscovery).count(), 1);
}

#[tokio::test]
async fn stale_scan_result_does_not_end_a_restarted_scan() {
    let link = FakeSerial::demo().with_held_discovery();
    let mut controller = initialized(&link).await;

    let first = tokio::spawn(controller.begin(Intent::StartDiscovery).expect("discovery calls the link"));
    tokio::task::yield_now().await;
    controller.dispatch(Intent::CancelDiscovery).await;

    let second = tokio::spawn(controller.begin(Intent::StartDiscovery).expect("a new scan starts after cancel"));
    tokio::task::yield_now().await;

    // the cancelled scan settles after the new one started
    controller.apply(first.await.expect("discovery task panicked"));
    assert!(controller.state().discovering);
    assert!(controller.state().discovered.is_empty());

    controller.dispatch(Intent::CancelDiscovery).await;
    let transition = tokio::time::timeout(Duration::from_secs(1), second)
        .await
        .expect("restarted scan did not stop")
        .expect("discovery task panicked");
    controller.apply(transition);

    assert!(!controller.state().discovering);
    assert_eq!(controller.state().discovered, vec![hc05(), robot()]);
    assert_eq!(link.calls().iter().filter(|c| **c == LinkCall::Discover).count(), 2);
}

#[tokio::test]
async fn discovery_events_fill_the_list_while_scanning() {
    let link = FakeSerial::demo().with_held_discovery();
    let mut controller = initialized(&link).await;

    let _scan = controller.begin(Intent::StartDiscovery);
    controller.handle_event(LinkEvent::DeviceDiscovered(robot()));

    assert_eq!(controller.state().discovered, vec![robot()]);
}

#[tokio::test]
async fn failed_discovery_ends_scanning_state() {
    let link = FakeSerial::demo();
    link.fail(Operation::Discover);
    let mut controller = initialized(&link).await;

    controller.dispatch(Intent::StartDiscovery).await;

    assert!(!controller.state().discovering);
    assert!(controller.state().discovered.is_empty());
}

#[tokio::test]
async fn tab_switch_makes_no_link_calls() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;

    assert!(controller.begin(Intent::SelectTab(Tab::Movement)).is_none());
    assert_eq!(controller.state().tab, Tab::Movement);

    controller.dispatch(Intent::SelectTab(Tab::PairedDevices)).await;
    assert_eq!(controller.state().tab, Tab::PairedDevices);

    assert!(link.calls().is_empty());
}

#[tokio::test]
async fn device_press_depends_on_tab() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;

    controller.dispatch(Intent::PressDevice(car())).await;
    controller.dispatch(Intent::SelectTab(Tab::Movement)).await;
    controller.dispatch(Intent::PressDevice(hc05())).await;

    assert_eq!(link.calls(), vec![LinkCall::Connect(car().id), LinkCall::Pair(hc05().id)]);
}

#[tokio::test]
async fn adapter_events_only_log() {
    let link = FakeSerial::demo();
    let mut controller = initialized(&link).await;
    let before = controller.state().clone();

    controller.handle_event(LinkEvent::AdapterDisabled);
    controller.handle_event(LinkEvent::AdapterEnabled);
    controller.handle_event(LinkEvent::Error("radio fault".to_string()));

    assert_eq!(controller.state(), &before);
}
