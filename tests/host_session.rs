//! The JSON-lines host loop driven end to end.

use razencheck::server::{serve, Session};
use serde_json::{json, Value};

async fn exchange(requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
    let mut session = Session::default();
    let mut output = Vec::new();
    serve(&mut session, input.as_bytes(), &mut output)
        .await
        .expect("loop should not fail on in-memory io");
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn test_edit_cycle() {
    let responses = exchange(&[
        json!({"id": 1, "method": "open", "params": {"document": "a.rzn", "text": "ArrLib[pop](items)\n"}}),
        json!({"id": 2, "method": "codeActions", "params": {"document": "a.rzn"}}),
        json!({"id": 3, "method": "change", "params": {"document": "a.rzn", "text": "arrlib::pop(items)\n"}}),
        json!({"id": 4, "method": "tokens", "params": {"document": "a.rzn"}}),
        json!({"id": 5, "method": "close", "params": {"document": "a.rzn"}}),
        json!({"id": 6, "method": "tokens", "params": {"document": "a.rzn"}}),
    ])
    .await;

    assert_eq!(responses.len(), 6);
    let ids: Vec<i64> = responses.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    let diagnostics = responses[0]["result"]["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics[0]["code"], "deprecated_call");
    assert_eq!(diagnostics[0]["source"], "razencheck");

    let action = &responses[1]["result"][0];
    assert_eq!(action["kind"], "quickfix");
    assert_eq!(action["document"], "a.rzn");
    assert_eq!(action["edit"]["newText"], "arrlib::pop(items)");
    assert_eq!(action["edit"]["range"], diagnostics[0]["range"]);

    assert_eq!(responses[2]["result"]["diagnostics"], json!([]));
    assert_eq!(responses[4]["result"], true);
    assert!(responses[5]["error"]["message"].as_str().unwrap().contains("a.rzn"));
}

#[tokio::test]
async fn test_client_supplied_diagnostics() {
    let responses = exchange(&[
        json!({"id": "x", "method": "open", "params": {"document": "b", "text": "let n = 1\nStrLib[trim](s)"}}),
        json!({"id": "y", "method": "codeActions", "params": {"document": "b", "diagnostics": []}}),
    ])
    .await;
    assert_eq!(responses[0]["id"], "x");
    assert_eq!(responses[1]["result"], json!([]));
}

#[tokio::test]
async fn test_loop_survives_garbage() {
    let mut input = String::from("garbage\n");
    input.push_str(&json!({"id": 1, "method": "completion", "params": {"document": "c"}}).to_string());
    input.push('\n');
    input.push_str(&json!({"id": 2, "method": "open", "params": {"document": "c", "text": "lib m"}}).to_string());
    input.push('\n');
    input.push_str(&json!({"id": 3, "method": "completion", "params": {"document": "c", "position": {"line": 0, "character": 5}}}).to_string());
    input.push('\n');

    let mut session = Session::default();
    let mut output = Vec::new();
    serve(&mut session, input.as_bytes(), &mut output).await.unwrap();
    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(responses.len(), 4);
    assert!(responses[0]["error"].is_object());
    assert!(responses[1]["error"].is_object());
    let labels: Vec<&str> = responses[3]["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["mathlib", "memorylib"]);
}
