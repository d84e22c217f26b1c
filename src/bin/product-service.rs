//! Demo product service: the downstream dependency the user service guards.

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_service::upstream::Product;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

fn catalog() -> Vec<Product> {
    vec![
        Product {
            id: 101,
            name: "Laptop".into(),
            description: "Powerful gaming laptop".into(),
            price: 1200.00,
        },
        Product {
            id: 102,
            name: "Mouse".into(),
            description: "Ergonomic wireless mouse".into(),
            price: 25.50,
        },
        Product {
            id: 103,
            name: "Keyboard".into(),
            description: "Mechanical keyboard with RGB".into(),
            price: 75.00,
        },
    ]
}

async fn get_product(Path(id): Path<String>) -> Response {
    let Ok(product_id) = id.parse::<u32>() else {
        return (StatusCode::BAD_REQUEST, "Invalid product ID").into_response();
    };

    match catalog().into_iter().find(|p| p.id == product_id) {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, "Product not found").into_response(),
    }
}

async fn health() -> &'static str {
    "Product Service is healthy!\n"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PRODUCT_SERVICE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let app = Router::new()
        .route("/products/{id}", get(get_product))
        .route("/health", get(health));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Product Service is running");
    axum::serve(listener, app).await?;
    Ok(())
}
