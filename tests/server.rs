//! End-to-end tests for preflight, static files and server lifecycle.

use std::path::Path;

mod common;

fn static_toml(root: &Path) -> String {
    format!(
        "[static_files]\nroot = {:?}\n",
        root.display().to_string()
    )
}

fn write_site(root: &Path) {
    std::fs::write(root.join("fund_calculator.html"), "<h1>calculator</h1>").unwrap();
    std::fs::write(root.join("about.html"), "<p>about</p>").unwrap();
    std::fs::write(root.join("style.css"), "body {}").unwrap();
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    let server = common::start_proxy("").await;
    let client = common::client();

    for path in ["/", "/api/fund/000001", "/does/not/exist"] {
        let res = client
            .request(reqwest::Method::OPTIONS, server.url(path))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 200, "{path}");
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            res.headers()["access-control-allow-headers"],
            "Content-Type, Authorization, X-Requested-With"
        );
        assert!(res.text().await.unwrap().is_empty());
    }

    server.stop().await;
}

#[tokio::test]
async fn test_static_files_and_html_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());
    let server = common::start_proxy(&static_toml(dir.path())).await;
    let client = common::client();

    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), "<h1>calculator</h1>");

    let res = client.get(server.url("/about")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<p>about</p>");

    let res = client.get(server.url("/style.css")).send().await.unwrap();
    assert_eq!(res.headers()["content-type"], "text/css");

    let res = client.get(server.url("/missing.png")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "File not found");

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_fund_code_falls_through_to_static() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());
    let toml = format!(
        "{}[upstream]\nsnapshot_endpoint = \"http://127.0.0.1:1/js\"\n",
        static_toml(dir.path())
    );
    let server = common::start_proxy(&toml).await;

    let res = common::client()
        .get(server.url("/api/fund/12345"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = common::start_proxy("").await;
    let addr = server.addr;

    server.stop().await;

    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
