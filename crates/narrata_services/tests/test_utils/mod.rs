//! A local stand-in for the collaborator services.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::Query,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use serde_json::{Value, json};
use std::collections::HashMap;

async fn split_scenes(Json(body): Json<Value>) -> Json<Value> {
    let text = body["text"].as_str().unwrap_or_default();
    let scenes: Vec<Value> = text
        .split('|')
        .map(|part| json!({ "text": part.trim(), "characters": ["Mara"], "mood": "calm", "action_level": 0.4 }))
        .collect();
    Json(json!({ "scenes": scenes }))
}

async fn fenced_scenes() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        "Sure!\n```json\n[{\"description\": \"fenced scene\", \"characters\": \"Tom, Ann\"}]\n```",
    )
}

async fn image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], vec![0x89, b'P', b'N', b'G'])
}

async fn audio(Json(body): Json<Value>) -> impl IntoResponse {
    let narration = body["narration"].as_str().unwrap_or_default().as_bytes().to_vec();
    (
        [
            (header::CONTENT_TYPE.as_str(), "audio/mpeg"),
            ("x-duration-seconds", "2.5"),
        ],
        narration,
    )
}

async fn video(Query(query): Query<HashMap<String, String>>, body: Bytes) -> impl IntoResponse {
    if !query.contains_key("scene_id") {
        return (StatusCode::BAD_REQUEST, "missing scene_id").into_response();
    }
    ([(header::CONTENT_TYPE, "video/mp4")], body).into_response()
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn json_error() -> impl IntoResponse {
    Json(json!({ "error": "quota exceeded" }))
}

async fn empty() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], Vec::<u8>::new())
}

/// Serves the stand-in routes and returns the base URL.
pub async fn spawn_services() -> String {
    let app = Router::new()
        .route("/split-scenes", post(split_scenes))
        .route("/fenced/split-scenes", post(fenced_scenes))
        .route("/empty/split-scenes", post(|| async { Json(json!({ "scenes": [] })) }))
        .route("/broken/split-scenes", post(broken))
        .route("/image", post(image))
        .route("/audio", post(audio))
        .route("/video", post(video))
        .route("/broken", post(broken))
        .route("/json", post(json_error))
        .route("/empty", post(empty));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
