use std::error::Error;
use std::time::Duration;

use rxios::{Client, LoggingInterceptor, RequestConfig, Response};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Create a client with defaults shared by every request
    let client = Client::builder()
        .base_url("https://httpbin.org")
        .timeout(Duration::from_secs(10))
        .user_agent("rxios-demo/0.1.0")?
        .build();

    println!("=== Registering Interceptors ===");

    // Request interceptors run most recently registered first
    client.interceptors().request.add(LoggingInterceptor::new());
    let stamp = client.interceptors().request.add_fn(|config: RequestConfig| async move {
        config.header("X-Request-Source", "demo")
    });

    // Response interceptors run in registration order
    client.interceptors().response.add_fn(|response: Response| async move {
        println!("<- {} {}", response.status(), response.request().url);
        Ok(response)
    });

    println!("\n=== GET with Query Parameters ===");

    let config = RequestConfig::new().param("tags", vec!["rust", "http"]).param("page", 1);
    let response = client.get("/get", Some(config)).await?;
    println!("Status: {}", response.status());
    println!("Sent to: {}", response.request().url);

    println!("\n=== POST with JSON ===");

    let response = client
        .post("/post", Some(json!({"name": "rxios", "language": "rust"}).into()), None)
        .await?;
    println!("Status: {}", response.status());
    if let Some(echo) = response.data().as_json() {
        println!("Echoed json: {}", echo["json"]);
    }

    println!("\n=== Ejecting an Interceptor ===");

    client.interceptors().request.eject(stamp);
    let response = client.delete("/delete", None).await?;
    println!("Status: {}", response.status());
    println!("Request headers carried X-Request-Source: {}", response.request().headers.contains_key("x-request-source"));

    println!("\n=== Error Handling ===");

    // Statuses outside 2xx (and 304) reject, but keep the response
    match client.get("/status/404", None).await {
        Ok(response) => println!("Unexpected success: {}", response.status()),
        Err(e) => {
            println!("Expected error: {}", e);
            if let Some(response) = e.response() {
                println!("Rejected response status: {}", response.status());
            }
        }
    }

    println!("\n=== Building a URL without Sending ===");

    let uri = client.get_uri(Some(RequestConfig::new().url("/anything").param("q", "a b")))?;
    println!("URI: {}", uri);

    println!("\n=== All examples completed successfully! ===");

    Ok(())
}
