//! Stub download server

use mockito::{Matcher, Mock, Server, ServerGuard};

use runtime_installer::Installer;
use runtime_installer::config::EndpointsConfig;
use runtime_installer::endpoints::Endpoints;
use runtime_installer::fetch::HttpFetcher;

pub const USER_AGENT: &str = "runtime-installer-test";

/// Versions listed by every stub catalog
pub const CATALOG: [&str; 3] = ["1.1.1", "3.3.3", "2.2.2"];

/// Serves the catalog and one archive body, like the real endpoints.
///
/// Only requests carrying [`USER_AGENT`] are answered; anything else gets a
/// 404, as the real endpoints do.
pub struct StubFileServer {
    server: ServerGuard,
    _unknown_agent: Mock,
    _catalog: Mock,
    pub archive: Mock,
}

impl StubFileServer {
    /// Catalog answers 200; `http_status` overrides the archive status
    pub fn start(http_status: Option<usize>, archive: Option<Vec<u8>>) -> Self {
        Self::start_with_catalog_status(200, http_status, archive)
    }

    pub fn start_with_catalog_status(
        catalog_status: usize,
        http_status: Option<usize>,
        archive: Option<Vec<u8>>,
    ) -> Self {
        let mut server = Server::new();

        // Created first so any mock below wins for the expected agent
        let unknown_agent = server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .expect_at_least(0)
            .create();

        let catalog = server
            .mock("GET", "/")
            .match_header("user-agent", USER_AGENT)
            .match_query(Matcher::UrlEncoded(
                "getversions".to_string(),
                "1".to_string(),
            ))
            .with_status(catalog_status)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&CATALOG).unwrap())
            .create();

        let archive = server
            .mock("GET", "/")
            .match_header("user-agent", USER_AGENT)
            .match_query(Matcher::Regex("(^|&)version=".to_string()))
            .with_status(http_status.unwrap_or(200))
            .with_body(archive.unwrap_or_default())
            .create();

        Self {
            server,
            _unknown_agent: unknown_agent,
            _catalog: catalog,
            archive,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        let url = self.server.url();
        Endpoints::new(
            &EndpointsConfig {
                versions_url: format!("{url}/?runtime={{runtime}}&getversions=1"),
                tarball_url: format!("{url}/?runtime={{runtime}}&version={{version}}"),
                sdk_url: format!("{url}/?version={{version}}"),
            },
            "ubuntu2204",
        )
    }

    pub fn installer(&self) -> Installer<HttpFetcher> {
        self.installer_with_agent(USER_AGENT)
    }

    pub fn installer_with_agent(&self, user_agent: &str) -> Installer<HttpFetcher> {
        Installer::new(HttpFetcher::new(user_agent).unwrap(), self.endpoints())
    }
}
