//! Acceptance tests for request/reply services

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use powersim_core::communication::{service_available, ServiceClient, ServiceServer};
use powersim_core::error::PowerError;

/// Run a server answering `req * 2` until the stop flag flips.
fn spawn_doubler(name: &str, stop: Arc<AtomicBool>) -> std::thread::JoinHandle<()> {
    let server = ServiceServer::<u32, u32>::new(name).expect("Failed to create server");
    std::thread::spawn(move || {
        while !stop.load(Ordering::SeqCst) {
            while let Some((id, payload)) = server.try_recv() {
                server.respond(id, payload * 2).expect("Failed to respond");
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    })
}

#[test]
fn test_scenario_1_call_round_trip() {
    // Scenario 1: Happy path
    // Given: A running server
    // When: A client calls with a payload
    // Then: The client gets the server's response

    let name = format!("svc_round_trip_{}", std::process::id());
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_doubler(&name, stop.clone());

    let client = ServiceClient::<u32, u32>::new(&name).expect("Failed to create client");
    client
        .wait_for_service(Some(Duration::from_secs(1)))
        .expect("Server should already be registered");

    let response = client
        .call(21, Duration::from_secs(1))
        .expect("Call should succeed");
    assert_eq!(response, 42);

    stop.store(true, Ordering::SeqCst);
    handle.join().unwrap();
}

#[test]
fn test_scenario_2_sequential_calls_correlate() {
    // Scenario 2: Correlation over repeated calls
    // Given: A running server
    // When: The client makes several calls in sequence
    // Then: Each call gets its own response

    let name = format!("svc_sequential_{}", std::process::id());
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_doubler(&name, stop.clone());

    let client = ServiceClient::<u32, u32>::new(&name).expect("Failed to create client");
    for i in 1..=5 {
        let response = client
            .call(i, Duration::from_secs(1))
            .expect("Call should succeed");
        assert_eq!(response, i * 2);
    }

    stop.store(true, Ordering::SeqCst);
    handle.join().unwrap();
}

#[test]
fn test_scenario_3_call_without_server_times_out() {
    // Scenario 3: No server
    // Given: No server registered on the name
    // When: A client calls with a bounded timeout
    // Then: The call fails with a timeout error

    let name = format!("svc_absent_{}", std::process::id());
    let client = ServiceClient::<u32, u32>::new(&name).expect("Failed to create client");

    let err = client.call(1, Duration::from_millis(30)).unwrap_err();
    assert!(matches!(err, PowerError::Timeout(_)));
}

#[test]
fn test_scenario_4_wait_for_late_server() {
    // Scenario 4: Late server registration
    // Given: A client waiting for a service that is not yet up
    // When: The server registers shortly after
    // Then: The wait returns Ok within the bound

    let name = format!("svc_late_{}", std::process::id());
    let client = ServiceClient::<u32, u32>::new(&name).expect("Failed to create client");
    assert!(!service_available(&name));

    let server_name = name.clone();
    let registrar = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        let _server = ServiceServer::<u32, u32>::new(&server_name).unwrap();
        // Hold the registration long enough for the waiter to see it
        std::thread::sleep(Duration::from_millis(200));
    });

    client
        .wait_for_service(Some(Duration::from_secs(2)))
        .expect("Service should come up within the bound");

    registrar.join().unwrap();
}

#[test]
fn test_scenario_5_presence_lifecycle() {
    // Scenario 5: Presence registration follows the server's lifetime

    let name = format!("svc_lifecycle_{}", std::process::id());
    {
        let _server = ServiceServer::<u32, u32>::new(&name).unwrap();
        assert!(service_available(&name));

        // A second server on the same name is rejected while the first lives
        assert!(ServiceServer::<u32, u32>::new(&name).is_err());
    }
    assert!(!service_available(&name));

    // After the first is gone, the name is free again
    let _server = ServiceServer::<u32, u32>::new(&name).unwrap();
    assert!(service_available(&name));
}
