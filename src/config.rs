use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub images_dir: PathBuf,
    pub public_page_size: u64,
    pub admin_page_size: u64,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movies.db?mode=rwc".to_string());

        let images_dir = std::env::var("IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public/images"));

        let public_page_size: u64 =
            std::env::var("PUBLIC_PAGE_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(6);

        let admin_page_size: u64 =
            std::env::var("ADMIN_PAGE_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4 * 1024 * 1024);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            images_dir,
            public_page_size: public_page_size.max(1),
            admin_page_size: admin_page_size.max(1),
            max_body_bytes,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: "sqlite://movies.db?mode=rwc".to_string(),
            images_dir: PathBuf::from("public/images"),
            public_page_size: 6,
            admin_page_size: 10,
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}
