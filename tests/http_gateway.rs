#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end tests of the HTTP gateway over an in-memory store.

use std::{net::SocketAddr, sync::Arc};

use pairchat::{AppState, ChatService, MemoryMessageStore, SenderPolicy, SqliteMessageStore};
use serde_json::Value;
use tokio::net::TcpListener;

async fn start_server(chat: ChatService) -> SocketAddr {
    let app = pairchat::app(AppState { chat });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn start_memory_server() -> SocketAddr {
    start_server(ChatService::new(
        Arc::new(MemoryMessageStore::new()),
        SenderPolicy::Participant,
    ))
    .await
}

async fn send(addr: SocketAddr, sender: &str, receiver: &str, text: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/api/send"))
        .query(&[("sender", sender), ("receiver", receiver), ("text", text)])
        .send()
        .await
        .unwrap()
}

async fn pull(addr: SocketAddr, params: &[(&str, &str)]) -> reqwest::Response {
    reqwest::Client::new()
        .get(format!("http://{addr}/api/pull"))
        .query(params)
        .send()
        .await
        .unwrap()
}

fn texts(body: &Value) -> Vec<&str> {
    body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn ping_answers_pong() {
    let addr = start_memory_server().await;
    let resp = reqwest::get(format!("http://{addr}/ping")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "pong");
}

#[tokio::test]
async fn send_then_pull_across_name_orders() {
    let addr = start_memory_server().await;
    assert_eq!(send(addr, "a", "b", "t1").await.status(), 200);
    assert_eq!(send(addr, "b", "a", "t2").await.status(), 200);
    assert_eq!(send(addr, "A", "b", "t3").await.status(), 200);

    let resp = pull(addr, &[("chat", "b:A"), ("limit", "10")]).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(texts(&body), ["t1", "t2", "t3"]);
    assert_eq!(body["has_more"], false);
    assert!(body.get("next_cursor").is_none());
    for message in body["messages"].as_array().unwrap() {
        assert_eq!(message["chat"], "a:b");
        assert!(message["send_time"].is_i64());
    }
    let senders: Vec<_> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["sender"].as_str().unwrap())
        .collect();
    assert_eq!(senders, ["a", "b", "A"]);
}

#[tokio::test]
async fn reverse_paging_with_cursor() {
    let addr = start_memory_server().await;
    for text in ["t1", "t2", "t3"] {
        send(addr, "a", "b", text).await;
    }

    let body: Value = pull(addr, &[("chat", "a:b"), ("cursor", "1"), ("limit", "1"), ("reverse", "TRUE")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(texts(&body), ["t2"]);
    assert_eq!(body["has_more"], true);
    assert_eq!(body["next_cursor"], 2);
}

#[tokio::test]
async fn default_limit_is_ten() {
    let addr = start_memory_server().await;
    for i in 0..12 {
        send(addr, "a", "b", &i.to_string()).await;
    }

    let body: Value = pull(addr, &[("chat", "a:b")]).await.json().await.unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 10);
    assert_eq!(body["has_more"], true);
    assert_eq!(body["next_cursor"], 10);
}

#[tokio::test]
async fn zero_limit_and_past_end() {
    let addr = start_memory_server().await;
    send(addr, "a", "b", "only").await;

    let body: Value = pull(addr, &[("chat", "a:b"), ("limit", "0")]).await.json().await.unwrap();
    assert!(body["messages"].as_array().unwrap().is_empty());
    assert_eq!(body["has_more"], true);
    assert_eq!(body["next_cursor"], 0);

    let body: Value = pull(addr, &[("chat", "a:b"), ("cursor", "5")]).await.json().await.unwrap();
    assert!(body["messages"].as_array().unwrap().is_empty());
    assert_eq!(body["has_more"], false);

    let body: Value = pull(addr, &[("chat", "x:y"), ("limit", "0")]).await.json().await.unwrap();
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn gateway_rejects_bad_send_parameters() {
    let addr = start_memory_server().await;
    assert_eq!(send(addr, "", "b", "x").await.status(), 400);
    assert_eq!(send(addr, "a", "", "x").await.status(), 400);

    let resp = send(addr, "a:c", "b", "x").await;
    assert_eq!(resp.status(), 400);
    assert!(resp.text().await.unwrap().contains("cannot contain"));
}

#[tokio::test]
async fn gateway_rejects_bad_pull_parameters() {
    let addr = start_memory_server().await;
    for params in [
        vec![("chat", "ab")],
        vec![("chat", "a:b"), ("cursor", "x")],
        vec![("chat", "a:b"), ("cursor", "-1")],
        vec![("chat", "a:b"), ("limit", "-1")],
        vec![("chat", "a:b"), ("limit", "2147483647")],
        vec![("chat", "a:b"), ("reverse", "sideways")],
    ] {
        let resp = pull(addr, &params).await;
        assert_eq!(resp.status(), 400, "{params:?}");
    }

    let resp = pull(addr, &[("chat", "a:b"), ("limit", "2147483647")]).await;
    assert!(resp.text().await.unwrap().contains("2147483646"));
}

#[tokio::test]
async fn sqlite_backed_gateway() {
    let store = SqliteMessageStore::connect("sqlite::memory:", 1).await.unwrap();
    let addr = start_server(ChatService::new(Arc::new(store), SenderPolicy::Participant)).await;

    for text in ["one", "two", "three", "four"] {
        assert_eq!(send(addr, "bob", "alice", text).await.status(), 200);
    }

    let first: Value = pull(addr, &[("chat", "alice:bob"), ("limit", "3")]).await.json().await.unwrap();
    assert_eq!(texts(&first), ["one", "two", "three"]);
    assert_eq!(first["next_cursor"], 3);

    let rest: Value = pull(addr, &[("chat", "Bob:Alice"), ("cursor", "3"), ("limit", "1")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(texts(&rest), ["four"]);
    assert_eq!(rest["has_more"], false);
}
