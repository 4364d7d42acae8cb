mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn notes_without_token_are_unauthorized() -> Result<()> {
    let server = common::start_server().await?;

    let res = server.client.get(server.url("/api/notes")).send().await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body.get("error").is_some(), "missing error field: {}", body);

    let res = server.client.post(server.url("/api/notes/")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() -> Result<()> {
    let server = common::start_server().await?;

    let claims = serde_json::json!({ "sub": "user_1", "exp": 4_102_444_800i64 });
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-secret"),
    )?;

    let res = server
        .client
        .get(server.url("/api/notes"))
        .bearer_auth(forged)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_accepted() -> Result<()> {
    let server = common::start_server().await?;
    let token = common::token_for("cookie_user")?;

    let res = server
        .client
        .get(server.url("/api/notes"))
        .header("Cookie", format!("__session={}", token))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?, serde_json::json!([]));
    Ok(())
}
