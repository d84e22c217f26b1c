//! User lookups and guarded product recommendations.

use crate::config::ServiceConfig;
use crate::resilience::{ResilienceError, ResilientInvoker};
use crate::upstream::{FetchError, Product, ProductClient};
use crate::users::directory::{User, UserDirectory};

/// Application service behind the `/users` routes.
#[derive(Debug)]
pub struct UsersService {
    directory: UserDirectory,
    products: ProductClient,
    invoker: ResilientInvoker,
    recommended_product_id: u32,
}

impl UsersService {
    /// Wire the directory, the product client and its guard from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, FetchError> {
        let products = ProductClient::new(&config.upstream)?;
        let invoker = ResilientInvoker::new(
            config.upstream.name.clone(),
            &config.circuit_breaker,
            &config.retries,
        );
        Ok(Self::new(
            UserDirectory::default(),
            products,
            invoker,
            config.upstream.recommended_product_id,
        ))
    }

    pub fn new(
        directory: UserDirectory,
        products: ProductClient,
        invoker: ResilientInvoker,
        recommended_product_id: u32,
    ) -> Self {
        Self {
            directory,
            products,
            invoker,
            recommended_product_id,
        }
    }

    pub fn get_user_by_id(&self, id: &str) -> Option<&User> {
        self.directory.get(id)
    }

    pub fn invoker(&self) -> &ResilientInvoker {
        &self.invoker
    }

    /// Fetch the recommended product through the circuit breaker and retry loop.
    ///
    /// The attempts run on their own task, so a client that disconnects or an
    /// inbound timeout does not cut the retry loop short.
    pub async fn get_recommended_product(&self) -> Result<Product, ResilienceError> {
        let id = self.recommended_product_id;
        let products = self.products.clone();
        self.invoker
            .call_detached(move || {
                let products = products.clone();
                async move { products.fetch_product(id).await }
            })
            .await
    }
}
