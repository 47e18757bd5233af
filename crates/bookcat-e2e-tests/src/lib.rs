use std::path::Path;

use anyhow::{Result, anyhow};
use bookcat_dal::{
    Pool,
    author::{AuthorRepository, CreateAuthor},
    book::{BookRepository, CreateBook},
    genre::{CreateGenre, GenreRepository},
    rating::{CreateRating, RatingRepository},
    user::{CreateUser, UserRepository},
};
use bookcat_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::{StatusCode, Url};
use tempfile::TempDir;
use tracing::debug;

pub const READER: (&str, &str) = ("reader", "reader-secret");
pub const CRITIC: (&str, &str) = ("critic", "critic-secret");

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let args = &[
        "bookcat-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub fn base_url(args: &ServerConfig) -> Result<Url> {
    Url::parse(&format!("http://{}:{}/", args.listen_address, args.port)).map_err(|e| e.into())
}

/// Fresh data directory with migrated database filled by [`seed`]
pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard, Pool)> {
    let (args, guard) = test_config(test_name, &std::env::temp_dir())?;
    let pool = bookcat_dal::new_pool(&args.database_url()).await?;
    bookcat_dal::migrate(&pool).await?;
    seed(&pool).await?;
    Ok((args, guard, pool))
}

/// Authors 1..=3, genres 1..=3 (Science fiction, Fantasy, Philosophy), books 1..=8 and users 1..=2.
/// Solaris (1) is rated 5 and 4 by the two users, no other book is rated.
pub async fn seed(pool: &Pool) -> Result<()> {
    let authors = AuthorRepository::new(pool.clone());
    for (first_name, last_name, country, birth_year) in [
        ("Stanislaw", "Lem", "Poland", 1921),
        ("Arthur C.", "Clarke", "United Kingdom", 1917),
        ("Ursula K.", "Le Guin", "United States", 1929),
    ] {
        authors
            .create(CreateAuthor {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                country: Some(country.to_string()),
                birth_year: Some(birth_year),
            })
            .await?;
    }

    let genres = GenreRepository::new(pool.clone());
    for name in ["Science fiction", "Fantasy", "Philosophy"] {
        genres
            .create(CreateGenre {
                name: name.to_string(),
            })
            .await?;
    }

    let books = BookRepository::new(pool.clone());
    let catalogue: [(&str, Option<i32>, i64, &[i64]); 8] = [
        ("Solaris", Some(1961), 1, &[1, 3]),
        ("The Cyberiad", Some(1965), 1, &[1]),
        ("2001: A Space Odyssey", Some(1968), 2, &[1]),
        ("Rendezvous with Rama", Some(1973), 2, &[1]),
        ("A Wizard of Earthsea", Some(1968), 3, &[2]),
        ("The Left Hand of Darkness", Some(1969), 3, &[1, 3]),
        ("The Dispossessed", Some(1974), 3, &[1, 3]),
        ("Fiasco", None, 1, &[1]),
    ];
    for (idx, (title, year, author_id, genre_ids)) in catalogue.into_iter().enumerate() {
        books
            .create(CreateBook {
                title: title.to_string(),
                year,
                isbn: format!("978-0-00-00000{idx}-0"),
                author_id,
                genres: genre_ids.to_vec(),
            })
            .await?;
    }

    let users = UserRepository::new(pool.clone());
    for (username, password) in [READER, CRITIC] {
        users
            .create(CreateUser {
                username: username.parse()?,
                password: password.to_string(),
            })
            .await?;
    }

    let ratings = RatingRepository::new(pool.clone());
    for (user_id, stars) in [(1, 5), (2, 4)] {
        ratings
            .upsert(CreateRating {
                book_id: 1,
                user_id,
                stars,
            })
            .await?;
    }
    debug!("Test data seeded");
    Ok(())
}

/// Starts server in background task and waits until it accepts connections
pub async fn spawn_server(args: ServerConfig) -> Result<Url> {
    let base_url = base_url(&args)?;
    let state = bookcat_server::build_state(&args).await?;
    let addr = format!("{}:{}", args.listen_address, args.port);
    tokio::spawn(async move {
        if let Err(e) =
            bookcat_server::run_graceful_with_state(args, state, futures::future::pending()).await
        {
            tracing::error!("Server failed: {e}");
        }
    });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(&addr).await.is_ok() {
            return Ok(base_url);
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    Err(anyhow!("Server did not start on {addr}"))
}

/// Browser like client - keeps cookies, does not follow redirects
pub fn client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

pub async fn launch_env(test_name: &str) -> Result<(reqwest::Client, Url, Pool, ConfigGuard)> {
    let (args, guard, pool) = prepare_env(test_name).await?;
    let base_url = spawn_server(args).await?;
    Ok((client()?, base_url, pool, guard))
}

pub async fn login(client: &reqwest::Client, base_url: &Url, user: (&str, &str)) -> Result<()> {
    let response = client
        .post(base_url.join("login/")?)
        .form(&[("username", user.0), ("password", user.1)])
        .send()
        .await?;
    if response.status() != StatusCode::SEE_OTHER {
        return Err(anyhow!("Login failed with status {}", response.status()));
    }
    Ok(())
}

pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
