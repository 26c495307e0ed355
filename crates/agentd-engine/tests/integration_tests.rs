//! End-to-end tests against the wired server: HTTP surface, bus dispatch
//! loop and health reporting, with a mock AMI client behind the seam.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

use agentd_engine::bus::BusMessage;
use agentd_engine::config::AgentEngineConfig;
use agentd_engine::server::{AgentServer, AgentServerBuilder};
use agentd_engine::testing::MockAmiClient;
use agentd_engine::{Agent, Queue};

async fn test_server() -> (AgentServer, Arc<MockAmiClient>) {
    let ami = Arc::new(MockAmiClient::new());
    let server = AgentServerBuilder::new(AgentEngineConfig::default())
        .with_ami_client(ami.clone())
        .build()
        .await
        .unwrap();
    (server, ami)
}

async fn seed_agent(server: &AgentServer, number: &str) -> Agent {
    server
        .database()
        .agent_directory()
        .insert_agent(number, Uuid::new_v4(), None)
        .await
        .unwrap()
}

async fn seed_extension(server: &AgentServer, exten: &str) {
    server
        .database()
        .agent_directory()
        .insert_extension(exten, "default")
        .await
        .unwrap()
}

async fn seed_queue(server: &AgentServer, name: &str) -> Queue {
    server
        .database()
        .agent_directory()
        .insert_queue(name, Uuid::new_v4())
        .await
        .unwrap()
}

async fn post(server: &AgentServer, uri: &str, body: Option<serde_json::Value>) -> StatusCode {
    let request = match body {
        Some(json) => Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::post(uri).body(Body::empty()).unwrap(),
    };
    server.router().oneshot(request).await.unwrap().status()
}

async fn get_json(server: &AgentServer, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = server
        .router()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
#[serial]
async fn login_updates_status_and_logoff_clears_it() {
    let (server, ami) = test_server().await;
    let agent = seed_agent(&server, "1001").await;
    seed_extension(&server, "100").await;

    let status = post(
        &server,
        &format!("/agents/by-id/{}/login", agent.id),
        Some(serde_json::json!({"extension": "100", "context": "default"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = get_json(&server, &format!("/agents/by-id/{}", agent.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logged"], true);
    assert_eq!(body["extension"], "100");
    assert_eq!(body["context"], "default");

    let status = post(&server, &format!("/agents/by-id/{}/logoff", agent.id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get_json(&server, &format!("/agents/by-id/{}", agent.id)).await;
    assert_eq!(body["logged"], false);
    assert_eq!(body["extension"], serde_json::Value::Null);

    assert_eq!(ami.sent_names(), vec!["AgentCallbackLogin", "AgentLogoff"]);
}

#[tokio::test]
#[serial]
async fn second_login_conflicts_and_unknown_agent_is_not_found() {
    let (server, _ami) = test_server().await;
    let agent = seed_agent(&server, "1001").await;
    seed_extension(&server, "100").await;
    let login_body = serde_json::json!({"extension": "100", "context": "default"});

    let uri = format!("/agents/by-id/{}/login", agent.id);
    assert_eq!(post(&server, &uri, Some(login_body.clone())).await, StatusCode::NO_CONTENT);
    assert_eq!(post(&server, &uri, Some(login_body.clone())).await, StatusCode::CONFLICT);

    assert_eq!(
        post(&server, "/agents/by-id/999/login", Some(login_body)).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
#[serial]
async fn login_on_an_unknown_extension_is_not_found() {
    let (server, ami) = test_server().await;
    let agent = seed_agent(&server, "1001").await;
    seed_extension(&server, "100").await;

    // "100" only exists in the default context.
    for body in [
        serde_json::json!({"extension": "200", "context": "default"}),
        serde_json::json!({"extension": "100", "context": "internal"}),
    ] {
        assert_eq!(
            post(&server, &format!("/agents/by-id/{}/login", agent.id), Some(body)).await,
            StatusCode::NOT_FOUND
        );
    }

    assert!(ami.sent().is_empty());
    let (_, body) = get_json(&server, &format!("/agents/by-id/{}", agent.id)).await;
    assert_eq!(body["logged"], false);
}

#[tokio::test]
#[serial]
async fn by_number_routes_cover_pause_and_unpause() {
    let (server, ami) = test_server().await;
    seed_agent(&server, "1001").await;
    seed_extension(&server, "100").await;

    let login = serde_json::json!({"extension": "100", "context": "default"});
    assert_eq!(
        post(&server, "/agents/by-number/1001/login", Some(login)).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        post(
            &server,
            "/agents/by-number/1001/pause",
            Some(serde_json::json!({"reason": "Lunch"})),
        )
        .await,
        StatusCode::NO_CONTENT
    );

    let (_, body) = get_json(&server, "/agents/by-number/1001").await;
    assert_eq!(body["paused"], true);
    assert_eq!(body["paused_reason"], "Lunch");

    assert_eq!(
        post(&server, "/agents/by-number/1001/unpause", None).await,
        StatusCode::NO_CONTENT
    );
    let (_, body) = get_json(&server, "/agents/by-number/1001").await;
    assert_eq!(body["paused"], false);

    assert!(ami.sent_names().contains(&"QueuePause".to_string()));
}

#[tokio::test]
#[serial]
async fn membership_routes_send_queue_add_only_when_logged() {
    let (server, ami) = test_server().await;
    let logged = seed_agent(&server, "1001").await;
    let idle = seed_agent(&server, "1002").await;
    let queue = seed_queue(&server, "support").await;
    seed_extension(&server, "100").await;

    let login = serde_json::json!({"extension": "100", "context": "default"});
    assert_eq!(
        post(&server, &format!("/agents/by-id/{}/login", logged.id), Some(login)).await,
        StatusCode::NO_CONTENT
    );

    let add_body = serde_json::json!({"queue_id": queue.id});
    assert_eq!(
        post(&server, &format!("/agents/by-id/{}/add", logged.id), Some(add_body.clone())).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        post(&server, &format!("/agents/by-id/{}/add", idle.id), Some(add_body.clone())).await,
        StatusCode::NO_CONTENT
    );

    let queue_adds = ami
        .sent_names()
        .iter()
        .filter(|n| *n == "QueueAdd")
        .count();
    assert_eq!(queue_adds, 1, "only the logged agent triggers QueueAdd");

    // Duplicate membership is rejected and not duplicated.
    assert_eq!(
        post(&server, &format!("/agents/by-id/{}/add", idle.id), Some(add_body.clone())).await,
        StatusCode::CONFLICT
    );
    assert_eq!(
        server
            .database()
            .queue_member_store()
            .member_count(idle.id, "support")
            .await
            .unwrap(),
        1
    );

    assert_eq!(
        post(&server, &format!("/agents/by-id/{}/remove", idle.id), Some(add_body.clone())).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        post(&server, &format!("/agents/by-id/{}/remove", idle.id), Some(add_body)).await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
#[serial]
async fn bulk_logoff_survives_one_agent_failing() {
    let (server, ami) = test_server().await;
    seed_agent(&server, "1001").await;
    seed_agent(&server, "1002").await;

    for number in ["1001", "1002"] {
        seed_extension(&server, &format!("10{number}")).await;
        let login = serde_json::json!({"extension": format!("10{number}"), "context": "default"});
        assert_eq!(
            post(&server, &format!("/agents/by-number/{number}/login"), Some(login)).await,
            StatusCode::NO_CONTENT
        );
    }
    ami.fail_action_for("AgentLogoff", "Agent", "1001");

    assert_eq!(post(&server, "/agents/logoff", None).await, StatusCode::NO_CONTENT);

    let (_, body) = get_json(&server, "/agents/by-number/1001").await;
    assert_eq!(body["logged"], true, "failed command leaves agent logged");
    let (_, body) = get_json(&server, "/agents/by-number/1002").await;
    assert_eq!(body["logged"], false);
}

#[tokio::test]
#[serial]
async fn relog_restores_extension_and_context() {
    let (server, ami) = test_server().await;
    seed_agent(&server, "1001").await;
    seed_extension(&server, "100").await;

    let login = serde_json::json!({"extension": "100", "context": "default"});
    assert_eq!(
        post(&server, "/agents/by-number/1001/login", Some(login)).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(post(&server, "/agents/relog", None).await, StatusCode::NO_CONTENT);

    assert_eq!(
        ami.sent_names(),
        vec!["AgentCallbackLogin", "AgentLogoff", "AgentCallbackLogin"]
    );
    let (_, body) = get_json(&server, "/agents/by-number/1001").await;
    assert_eq!(body["logged"], true);
    assert_eq!(body["extension"], "100");
    assert_eq!(body["context"], "default");
}

#[tokio::test]
#[serial]
async fn health_follows_the_dispatch_loop() {
    let (server, _ami) = test_server().await;

    let (status, body) = get_json(&server, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bus_consumer"]["status"], "fail");
    assert_eq!(body["service_token"]["status"], "ok");

    server.start();
    let (_, body) = get_json(&server, "/status").await;
    assert_eq!(body["bus_consumer"]["status"], "ok");

    server.stop();
    let (_, body) = get_json(&server, "/status").await;
    assert_eq!(body["bus_consumer"]["status"], "fail");
}

#[tokio::test]
#[serial]
async fn inbound_pause_notification_pauses_the_agent() {
    let (server, ami) = test_server().await;
    seed_agent(&server, "1001").await;
    seed_extension(&server, "100").await;

    let login = serde_json::json!({"extension": "100", "context": "default"});
    assert_eq!(
        post(&server, "/agents/by-number/1001/login", Some(login)).await,
        StatusCode::NO_CONTENT
    );

    server.start();
    let mut outbound = server.bus_sender().subscribe();
    let commands_before = ami.sent_names().len();

    server
        .bus_sender()
        .send(BusMessage::new(
            "ami.QueueMemberPause",
            serde_json::json!({
                "MemberName": "Agent/1001",
                "Queue": "support",
                "Paused": "1",
                "PausedReason": "Break"
            }),
        ))
        .unwrap();

    // The dispatch loop republishes the domain event once it has applied
    // the transition.
    loop {
        let message = tokio::time::timeout(std::time::Duration::from_secs(5), outbound.recv())
            .await
            .expect("no domain event within timeout")
            .unwrap();
        if message.routing_key == "status.agent.agent_paused" {
            assert_eq!(message.payload["data"]["agent_number"], "1001");
            assert_eq!(message.payload["data"]["reason"], "Break");
            assert_eq!(message.payload["data"]["queue"], "support");
            break;
        }
    }
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    while let Ok(message) = outbound.try_recv() {
        assert_ne!(message.routing_key, "status.agent.agent_paused", "pause applied twice");
    }

    let (_, body) = get_json(&server, "/agents/by-number/1001").await;
    assert_eq!(body["paused"], true);
    assert_eq!(body["paused_reason"], "Break");

    // Applying a bus-delivered transition never echoes a telephony command.
    assert_eq!(ami.sent_names().len(), commands_before);
    server.stop();
}

#[tokio::test]
#[serial]
async fn list_includes_logged_and_logged_out_agents() {
    let (server, _ami) = test_server().await;
    seed_agent(&server, "1001").await;
    seed_agent(&server, "1002").await;
    seed_extension(&server, "100").await;

    let login = serde_json::json!({"extension": "100", "context": "default"});
    assert_eq!(
        post(&server, "/agents/by-number/1001/login", Some(login)).await,
        StatusCode::NO_CONTENT
    );

    let (status, body) = get_json(&server, "/agents").await;
    assert_eq!(status, StatusCode::OK);
    let agents = body.as_array().unwrap();
    assert_eq!(agents.len(), 2);
    let logged: Vec<bool> = agents.iter().map(|a| a["logged"].as_bool().unwrap()).collect();
    assert!(logged.contains(&true));
    assert!(logged.contains(&false));
}
