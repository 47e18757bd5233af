use bookcat_dal::user::UserRepository;
use bookcat_e2e_tests::{READER, launch_env, location, login};
use reqwest::StatusCode;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_login_logout() {
    let (client, base_url, _pool, _config_guard) = launch_env("test_login_logout").await.unwrap();

    let response = client
        .get(base_url.join("login/?next=/book/1").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("name=\"next\""));

    let response = client
        .post(base_url.join("login/").unwrap())
        .form(&[("username", "reader"), ("password", "wrong-password")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Please enter a correct username and password."));
    assert!(body.contains("value=\"reader\""));

    let response = client
        .post(base_url.join("login/").unwrap())
        .form(&[
            ("username", READER.0),
            ("password", READER.1),
            ("next", "/book/1"),
        ])
        .send()
        .await
        .unwrap();
    info!("Login response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/book/1"));

    let body = client.get(base_url.clone()).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Hello, reader"));

    let response = client
        .post(base_url.join("logout/").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let body = client.get(base_url.clone()).send().await.unwrap().text().await.unwrap();
    assert!(!body.contains("Hello, reader"));
    assert!(body.contains("You have been logged out."));
}

#[tokio::test]
#[traced_test]
async fn test_login_ignores_foreign_next() {
    let (client, base_url, _pool, _config_guard) =
        launch_env("test_login_foreign_next").await.unwrap();

    for next in ["//evil.example.com/", "/\t/evil.example.com", "https://evil.example.com/"] {
        let response = client
            .post(base_url.join("login/").unwrap())
            .form(&[
                ("username", READER.0),
                ("password", READER.1),
                ("next", next),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "next {next:?}");
        assert_eq!(location(&response), Some("/"), "next {next:?}");
    }
}

#[tokio::test]
#[traced_test]
async fn test_register() {
    let (client, base_url, pool, _config_guard) = launch_env("test_register").await.unwrap();
    let url = base_url.join("register/").unwrap();

    let response = client.get(url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(url.clone())
        .form(&[
            ("username", "newbie"),
            ("password1", "kocour123"),
            ("password2", "kocour123"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login/"));

    let body = client
        .get(base_url.join("login/").unwrap())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Successfully registered!"));

    let users = UserRepository::new(pool);
    assert!(users.exists("newbie").await.unwrap());
    login(&client, &base_url, ("newbie", "kocour123")).await.unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_register_invalid() {
    let (client, base_url, pool, _config_guard) = launch_env("test_register_invalid").await.unwrap();
    let url = base_url.join("register/").unwrap();
    let users = UserRepository::new(pool);

    let cases: [(&str, &str, &str, &str); 4] = [
        ("mismatch", "kocour123", "kocour124", "mismatch"),
        ("numeric", "1234567890", "1234567890", "numeric"),
        ("short", "kocour", "kocour", "short"),
        ("bad name", "kocour123", "kocour123", "bad"),
    ];
    for (username, password1, password2, case) in cases {
        let response = client
            .post(url.clone())
            .form(&[
                ("username", username),
                ("password1", password1),
                ("password2", password2),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "case {case}");
        let body = response.text().await.unwrap();
        assert!(
            body.contains("Something goes wrong! Please try again."),
            "case {case}"
        );
        assert!(body.contains(&format!("value=\"{username}\"")), "case {case}");
        assert!(!users.exists(username).await.unwrap(), "case {case}");
    }

    let response = client
        .post(url)
        .form(&[
            ("username", READER.0),
            ("password1", "kocour123"),
            ("password2", "kocour123"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("A user with that username already exists."));
}
