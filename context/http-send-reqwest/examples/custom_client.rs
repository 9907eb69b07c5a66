use anyhow::Result;
use bytes::Bytes;
use ossclient_core::Context;
use ossclient_http_send_reqwest::ReqwestHttpSend;
use reqwest::Client;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Pooling and TLS policy live entirely in the reqwest client.
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let req = http::Request::builder()
        .method("HEAD")
        .uri("https://oss-cn-hangzhou.aliyuncs.com/")
        .body(Bytes::new())?;

    match ctx.http_send(req).await {
        Ok(resp) => println!("status: {}", resp.status()),
        Err(e) => println!("request failed: {e}"),
    }

    Ok(())
}
