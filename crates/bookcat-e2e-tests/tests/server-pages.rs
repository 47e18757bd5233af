use bookcat_e2e_tests::{client, prepare_env, spawn_server};
use reqwest::StatusCode;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_health() {
    let (args, _config_guard, _pool) = prepare_env("test_health").await.unwrap();
    let base_url = spawn_server(args).await.unwrap();

    let response = client()
        .unwrap()
        .get(base_url.join("health").unwrap())
        .send()
        .await
        .unwrap();
    info! {"Response: {:#?}", response};
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
#[traced_test]
async fn test_static_pages() {
    let (args, _config_guard, _pool) = prepare_env("test_static_pages").await.unwrap();
    let base_url = spawn_server(args).await.unwrap();
    let client = client().unwrap();

    for (path, heading) in [
        ("", "<h1>Book catalogue</h1>"),
        ("about/", "<h1>About</h1>"),
        ("contacts/", "<h1>Contacts</h1>"),
    ] {
        let response = client.get(base_url.join(path).unwrap()).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
        let body = response.text().await.unwrap();
        assert!(body.contains(heading), "path {path}");
        assert!(body.contains("href=\"/login/\""));
    }

    let response = client
        .get(base_url.join("no-such-page/").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
