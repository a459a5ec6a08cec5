//! Acceptance tests for topic communication (pub/sub)

use powersim_core::communication::Topic;

#[test]
fn test_scenario_1_basic_pub_sub() {
    // Scenario 1: Basic publish and subscribe
    // Given: Two handles share a topic name
    // When: Publisher sends a message
    // Then: Subscriber receives the message

    let topic = format!("test_basic_{}", std::process::id());

    let pub_handle = Topic::<i32>::new(&topic).expect("Failed to create publisher");
    let sub_handle = Topic::<i32>::new(&topic).expect("Failed to create subscriber");

    pub_handle.send(42).expect("Failed to send message");

    let msg = sub_handle.recv();
    assert_eq!(
        msg,
        Some(42),
        "Subscriber should receive the exact message sent"
    );
}

#[test]
fn test_scenario_2_multiple_subscribers() {
    // Scenario 2: Multiple subscribers (competing consumers)
    // Given: One publisher, three subscribers on the same topic
    // When: Publisher sends multiple messages
    // Then: Messages are distributed among subscribers, none lost

    let topic = format!("test_multi_sub_{}", std::process::id());

    let pub_handle = Topic::<i32>::new(&topic).expect("Failed to create publisher");
    let sub1 = Topic::<i32>::new(&topic).expect("Failed to create subscriber 1");
    let sub2 = Topic::<i32>::new(&topic).expect("Failed to create subscriber 2");
    let sub3 = Topic::<i32>::new(&topic).expect("Failed to create subscriber 3");

    pub_handle.send(100).expect("Failed to send message 1");
    pub_handle.send(200).expect("Failed to send message 2");
    pub_handle.send(300).expect("Failed to send message 3");

    let mut received = Vec::new();
    for sub in [&sub1, &sub2, &sub3] {
        while let Some(msg) = sub.recv() {
            received.push(msg);
        }
    }

    received.sort();
    assert_eq!(
        received,
        vec![100, 200, 300],
        "All messages should be received exactly once among subscribers"
    );
}

#[test]
fn test_scenario_3_multiple_publishers() {
    // Scenario 3: Multiple publishers
    // Given: Three publishers, one subscriber on the same topic
    // When: Each publisher sends a message
    // Then: Subscriber receives all messages

    let topic = format!("test_multi_pub_{}", std::process::id());

    let pub1 = Topic::<i32>::new(&topic).expect("Failed to create publisher 1");
    let pub2 = Topic::<i32>::new(&topic).expect("Failed to create publisher 2");
    let pub3 = Topic::<i32>::new(&topic).expect("Failed to create publisher 3");
    let sub = Topic::<i32>::new(&topic).expect("Failed to create subscriber");

    pub1.send(1).expect("Failed to send from pub1");
    pub2.send(2).expect("Failed to send from pub2");
    pub3.send(3).expect("Failed to send from pub3");

    let mut received = vec![];
    while let Some(msg) = sub.recv() {
        received.push(msg);
    }

    received.sort();
    assert_eq!(received, vec![1, 2, 3], "Should receive all 3 messages");
}

#[test]
fn test_scenario_4_type_safety() {
    // Scenario 4: Type safety across handles
    // Given: A topic registered with payload type i32
    // When: A handle with a different payload type attaches to the name
    // Then: Attachment fails with a communication error

    let topic = format!("test_type_safety_{}", std::process::id());

    let _int_handle = Topic::<i32>::new(&topic).expect("Failed to create i32 topic");
    let mismatched = Topic::<f64>::new(&topic);

    assert!(
        mismatched.is_err(),
        "Differently-typed handle on the same name must be rejected"
    );
}

#[test]
fn test_scenario_5_overflow_keeps_newest() {
    // Scenario 5: Ring overflow
    // Given: A topic at capacity
    // When: Another message is published
    // Then: The oldest message is dropped, the newest kept

    let topic = format!("test_overflow_{}", std::process::id());
    let handle = Topic::<u32>::with_capacity(&topic, 4).expect("Failed to create topic");

    for i in 0..5 {
        handle.send(i).expect("send should not fail on overflow");
    }

    let mut received = vec![];
    while let Some(msg) = handle.recv() {
        received.push(msg);
    }
    assert_eq!(received, vec![1, 2, 3, 4], "Oldest message should be dropped");
}

#[test]
fn test_scenario_6_len_and_metadata() {
    // Scenario 6: Introspection
    // Given: A topic with queued messages
    // Then: len() reports the backlog and metadata names the payload type

    let topic = format!("test_meta_{}", std::process::id());
    let handle = Topic::<u64>::new(&topic).expect("Failed to create topic");

    assert!(handle.is_empty());
    handle.send(7).unwrap();
    handle.send(8).unwrap();
    assert_eq!(handle.len(), 2);

    let meta = handle.metadata();
    assert_eq!(meta.topic_name, topic);
    assert_eq!(meta.type_name, "u64");
}
